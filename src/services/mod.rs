pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

pub mod token;
pub use token::{Claims, TokenError, TokenIssuer};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod attendance_service;
pub mod attendance_service_impl;
pub use attendance_service::{AttendanceError, AttendanceService};
pub use attendance_service_impl::SeaOrmAttendanceService;

pub mod task_service;
pub mod task_service_impl;
pub use task_service::{NewTaskInput, TaskError, TaskService, TaskUpdateInput};
pub use task_service_impl::SeaOrmTaskService;

pub mod training_service;
pub use training_service::{SeaOrmTrainingService, TrainingError, TrainingService};

pub mod embedding_service;
pub use embedding_service::{EmbeddingError, EmbeddingService, SeaOrmEmbeddingService};
