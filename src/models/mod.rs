pub mod attendance;
pub mod embedding;
pub mod photo;
pub mod task;
pub mod training;
pub mod user;
