//! Service layer providing the attendance business operations on top of models.
//! - Everything is held in one in-memory [`school::SchoolData`], optionally
//!   mirrored to a JSON snapshot.
//! - Each aggregate gets its own service; they all share the same store.
//! - Reporting lives in [`reports`] and only ever reads.

pub mod activities;
pub mod attendance;
pub mod classes;
pub mod errors;
pub mod identity;
pub mod reports;
pub mod runtime;
pub mod school;
pub mod storage;
pub mod students;
#[cfg(test)]
pub mod test_support;

use std::sync::Arc;

use tracing::info;

use activities::ActivityService;
use attendance::AttendanceService;
use classes::ClassService;
use errors::ServiceError;
use reports::ReportService;
use school::{SchoolData, SchoolStore, Settings};
use storage::SnapshotStore;
use students::StudentService;

/// Every service, wired to one shared store.
#[derive(Clone)]
pub struct Services {
    pub students: StudentService,
    pub classes: ClassService,
    pub attendance: AttendanceService,
    pub activities: ActivityService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(store: SchoolStore, settings: Settings) -> Self {
        Self {
            students: StudentService::new(Arc::clone(&store), settings),
            classes: ClassService::new(Arc::clone(&store), settings),
            attendance: AttendanceService::new(Arc::clone(&store), settings),
            activities: ActivityService::new(Arc::clone(&store)),
            reports: ReportService::new(store, settings),
        }
    }

    pub fn in_memory(settings: Settings) -> Self {
        Self::new(SnapshotStore::in_memory(SchoolData::default()), settings)
    }

    /// Open (or create) the store described by `cfg` and seed it.
    pub async fn from_config(cfg: &configs::AppConfig) -> Result<Self, ServiceError> {
        let settings = Settings::from(cfg);
        let store = match cfg.storage.snapshot_path.as_deref() {
            Some(path) => SnapshotStore::open(path).await?,
            None => SnapshotStore::in_memory(SchoolData::default()),
        };
        let services = Self::new(store, settings);
        if cfg.seed.default_classes {
            services.classes.seed_defaults().await?;
        }
        info!(
            persistent = cfg.storage.snapshot_path.is_some(),
            max_activities = settings.max_activities,
            max_range_days = settings.max_range_days,
            "services ready"
        );
        Ok(services)
    }
}
