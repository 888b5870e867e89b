mod check;
mod init;
mod training;
mod user;

pub use check::cmd_check;
pub use init::cmd_init;
pub use training::{cmd_training_add, cmd_training_list, cmd_training_remove};
pub use user::cmd_user_show;
