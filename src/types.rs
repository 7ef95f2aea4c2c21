use crate::call_desk::CallDesk;
use crate::call_session::RandomJitter;
use crate::config::AppConfig;
use crate::profiles::ProfileStore;
use crate::tasks::SharedDesk;

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct AppState {
    pub config: AppConfig,
    pub profiles: ProfileStore,
    pub desk: SharedDesk,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let profiles = if config.seed_profiles {
            ProfileStore::seeded()
        } else {
            ProfileStore::new()
        };
        let jitter = RandomJitter::new(config.quality_seed);
        Self::with_parts(config, profiles, CallDesk::new(Box::new(jitter)))
    }

    pub fn with_parts(config: AppConfig, profiles: ProfileStore, desk: CallDesk) -> Self {
        Self {
            config,
            profiles,
            desk: Arc::new(Mutex::new(desk)),
        }
    }
}

/// Body of `PUT /api/call/volume`.
#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: i64,
}

/// Query of `GET /api/call/log`; defaults to the selected profile.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub profile_id: Option<Uuid>,
}
