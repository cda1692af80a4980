use std::sync::Arc;

use storage::repository::{Storage, SubmissionRepository};
use storage::load_pool;
use survey_core::ImageResolver;
use survey_core::model::{IdSource, MetadataPool};
use tracing::{info, warn};

use crate::Clock;
use crate::codec::StateCodec;
use crate::config::{ENV_STORE_CREDENTIALS, Secret, StoreTarget, SurveyConfig};
use crate::error::{AppServicesError, ConfigError};
use crate::flow::{FlowController, SurveyFlowService};
use crate::sheets::{ServiceAccountTokens, SheetsConfig, SheetsRepository};
use crate::submission_service::SubmissionService;

/// Assembles the request-facing services from a `SurveyConfig`.
#[derive(Clone, Debug)]
pub struct SurveyServices {
    flow: Arc<SurveyFlowService>,
}

impl SurveyServices {
    /// Build services for the configured store.
    ///
    /// An unreadable metadata file is not fatal: the pool stays empty and every
    /// request reports the metadata as unavailable.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the key, image template, or store cannot
    /// be initialized.
    pub async fn build(
        config: &SurveyConfig,
        clock: Clock,
        ids: IdSource,
    ) -> Result<Self, AppServicesError> {
        let codec = StateCodec::from_base64_key(config.encryption_key.expose())?;
        let resolver = ImageResolver::new(config.image_url_template.clone())?;
        let storage = open_storage(&config.store).await?;

        let pool = match load_pool(&config.pairs_path) {
            Ok(pool) => {
                info!(
                    path = %config.pairs_path.display(),
                    slots = pool.len(),
                    populated = pool.populated_slots(),
                    "loaded question metadata"
                );
                pool
            }
            Err(err) => {
                warn!(error = %err, "question metadata unavailable");
                MetadataPool::empty()
            }
        };

        Ok(Self::from_parts(
            codec,
            resolver,
            Arc::new(pool),
            storage.submissions,
            config.total_questions,
            clock,
            ids,
        ))
    }

    /// Wire already-built pieces together.
    #[must_use]
    pub fn from_parts(
        codec: StateCodec,
        resolver: ImageResolver,
        pool: Arc<MetadataPool>,
        submissions: Arc<dyn SubmissionRepository>,
        total_questions: usize,
        clock: Clock,
        ids: IdSource,
    ) -> Self {
        let controller = FlowController::new(pool, total_questions);
        let submissions = SubmissionService::new(clock, submissions, total_questions);
        let flow = SurveyFlowService::new(codec, controller, resolver, submissions)
            .with_id_source(ids);
        Self {
            flow: Arc::new(flow),
        }
    }

    #[must_use]
    pub fn flow(&self) -> Arc<SurveyFlowService> {
        Arc::clone(&self.flow)
    }
}

async fn open_storage(target: &StoreTarget) -> Result<Storage, AppServicesError> {
    match target {
        StoreTarget::Sqlite(url) => {
            let storage = Storage::sqlite(url).await?;
            info!(store = "sqlite", "submission store ready");
            Ok(storage)
        }
        StoreTarget::Sheets {
            spreadsheet_id,
            credentials,
            range,
        } => {
            let key = service_account_key(credentials)?;
            let tokens = ServiceAccountTokens::from_json(key.expose())?;
            let config = SheetsConfig::new(spreadsheet_id.clone()).with_range(range.clone());
            info!(store = "sheets", spreadsheet_id = %spreadsheet_id, "submission store ready");
            Ok(Storage::from_repository(Arc::new(SheetsRepository::new(
                config,
                Arc::new(tokens),
            ))))
        }
    }
}

/// The credentials value is either the key JSON itself or a path to it.
fn service_account_key(credentials: &Secret) -> Result<Secret, ConfigError> {
    let raw = credentials.expose();
    if raw.trim_start().starts_with('{') {
        return Ok(credentials.clone());
    }
    std::fs::read_to_string(raw)
        .map(Secret::new)
        .map_err(|e| ConfigError::Invalid {
            key: ENV_STORE_CREDENTIALS,
            reason: format!("cannot read service account key: {e}"),
        })
}
