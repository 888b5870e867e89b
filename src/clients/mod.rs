pub mod assets;
pub mod face_recognition;
