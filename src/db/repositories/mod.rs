pub mod attendance;
pub mod face_embedding;
pub mod task;
pub mod training;
pub mod user;
