//! # Engine Assembly
//!
//! Wires the three services onto one database from a [`QuotesConfig`].
//! The services stay separate types so a transport handler can take only
//! the one it needs.

use tracing::info;

use marquee_core::CoreResult;
use marquee_db::Database;

use crate::catalog::CatalogReader;
use crate::config::QuotesConfig;
use crate::lifecycle::QuoteLifecycleManager;
use crate::notify::NotificationDispatcher;
use crate::submission::QuoteSubmissionService;

#[derive(Debug, Clone)]
pub struct QuoteEngine<D: NotificationDispatcher> {
    pub db: Database,
    pub catalog: CatalogReader,
    pub submissions: QuoteSubmissionService,
    pub lifecycle: QuoteLifecycleManager<D>,
}

impl<D: NotificationDispatcher> QuoteEngine<D> {
    /// Opens the configured database and builds every service on it.
    pub async fn open(config: &QuotesConfig, dispatcher: D) -> CoreResult<Self> {
        let db = Database::new(config.to_db_config()).await?;
        Self::with_database(db, config, dispatcher).await
    }

    /// Builds every service on an already opened database.
    pub async fn with_database(db: Database, config: &QuotesConfig, dispatcher: D) -> CoreResult<Self> {
        let submissions =
            QuoteSubmissionService::with_prefix(db.clone(), &config.reference_prefix()).await?;

        info!(
            prefix = %submissions.references().prefix(),
            policy = %config.approval_policy(),
            "Quote engine ready"
        );

        Ok(QuoteEngine {
            catalog: CatalogReader::new(db.clone()),
            submissions,
            lifecycle: QuoteLifecycleManager::new(db.clone(), dispatcher, config.approval_policy()),
            db,
        })
    }
}
