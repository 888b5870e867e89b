pub use super::attendance::Entity as Attendance;
pub use super::face_embeddings::Entity as FaceEmbeddings;
pub use super::tasks::Entity as Tasks;
pub use super::trainings::Entity as Trainings;
pub use super::users::Entity as Users;
