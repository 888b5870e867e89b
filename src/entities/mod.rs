pub mod prelude;

pub mod attendance;
pub mod face_embeddings;
pub mod tasks;
pub mod trainings;
pub mod users;
