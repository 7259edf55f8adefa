use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::mailer::{Mailer, mailer_from_config};
use crate::services::{AttachmentStore, AuthService, CourseService, SeaOrmAuthService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub course_service: CourseService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = mailer_from_config(&config.mail)?;
        Self::with_mailer(config, mailer).await
    }

    /// Builds the state with an explicit mail transport.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let attachments = AttachmentStore::new(&config.storage.attachments_path);
        tokio::fs::create_dir_all(attachments.root())
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create attachments directory {}: {e}",
                    attachments.root().display()
                )
            })?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            mailer,
        )) as Arc<dyn AuthService>;

        let course_service = CourseService::new(store.clone(), attachments);

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            course_service,
        })
    }
}
