use std::sync::Arc;
use std::time::Duration;

use crate::clients::assets::{AssetStore, CloudinaryStore, LocalAssetStore};
use crate::clients::face_recognition::{FaceVerifier, HttpFaceVerifier};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AttendanceService, AuthService, Clock, EmbeddingService, SeaOrmAttendanceService,
    SeaOrmAuthService, SeaOrmEmbeddingService, SeaOrmTaskService, SeaOrmTrainingService,
    SeaOrmUserService, SystemClock, TaskService, TokenIssuer, TrainingService, UserService,
};

/// Build a shared HTTP client for the external collaborators.
/// Per-request timeouts are set by each client; this is the upper bound.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Facegate/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// The external capabilities a deployment plugs into the workflows.
#[derive(Clone)]
pub struct Collaborators {
    pub verifier: Arc<dyn FaceVerifier>,
    pub assets: Arc<dyn AssetStore>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Production wiring: HTTP verifier, Cloudinary when configured (else local files), wall clock.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = config
            .face_recognition
            .timeout_seconds
            .max(config.asset_store.timeout_seconds);
        let http_client = build_shared_http_client(timeout)?;

        let verifier = Arc::new(HttpFaceVerifier::new(
            http_client.clone(),
            &config.face_recognition.url,
            config.face_recognition.timeout_seconds,
        ));

        let assets: Arc<dyn AssetStore> = if config.asset_store.enabled {
            Arc::new(CloudinaryStore::new(http_client, &config.asset_store))
        } else {
            Arc::new(LocalAssetStore::new(&config.general.uploads_path))
        };

        Ok(Self {
            verifier,
            assets,
            clock: Arc::new(SystemClock::new(config.attendance.utc_offset_minutes)),
        })
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub attendance_service: Arc<dyn AttendanceService>,

    pub task_service: Arc<dyn TaskService>,

    pub training_service: Arc<dyn TrainingService>,

    pub embedding_service: Arc<dyn EmbeddingService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let collaborators = Collaborators::from_config(&config)?;
        Ok(Self::with_collaborators(config, store, collaborators))
    }

    /// Wires every workflow around the given store and collaborators.
    #[must_use]
    pub fn with_collaborators(config: Config, store: Store, collaborators: Collaborators) -> Self {
        let tokens = TokenIssuer::new(&config.auth);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            tokens,
        ));

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
            collaborators.assets.clone(),
        ));

        let attendance_service = Arc::new(SeaOrmAttendanceService::new(
            store.clone(),
            collaborators.verifier,
            collaborators.assets,
            collaborators.clock,
        ));

        let task_service = Arc::new(SeaOrmTaskService::new(
            store.clone(),
            config.access.clone(),
        ));

        let training_service = Arc::new(SeaOrmTrainingService::new(store.clone()));
        let embedding_service = Arc::new(SeaOrmEmbeddingService::new(store.clone()));

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            attendance_service,
            task_service,
            training_service,
            embedding_service,
        }
    }
}
