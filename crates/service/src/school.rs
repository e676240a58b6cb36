//! The dataset behind every service and the helpers shared between them.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use models::{Activity, ActivityKind, AttendanceRecord, Class, Student};

use crate::storage::{SnapshotStore, Table};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolData {
    pub students: Table<Student>,
    pub classes: Table<Class>,
    pub attendance: Table<AttendanceRecord>,
    pub activities: Table<Activity>,
}

pub type SchoolStore = Arc<SnapshotStore<SchoolData>>;

/// Limits shared by the services, taken from config.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub max_activities: usize,
    pub max_range_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self { max_activities: 1000, max_range_days: 366 }
    }
}

impl From<&configs::AppConfig> for Settings {
    fn from(cfg: &configs::AppConfig) -> Self {
        Self {
            max_activities: cfg.activity.max_entries,
            max_range_days: cfg.reports.max_range_days,
        }
    }
}

impl SchoolData {
    pub fn student_by_code(&self, code: &str) -> Option<&Student> {
        self.students.values().find(|s| s.student_id == code)
    }

    pub fn class_by_name(&self, name: &str) -> Option<&Class> {
        self.classes.values().find(|c| c.name == name)
    }

    /// Append to the activity feed, dropping the oldest entries past `cap`.
    pub fn log_activity(&mut self, kind: ActivityKind, message: String, cap: usize) {
        let timestamp = Utc::now();
        self.activities.insert_with(|id| Activity { id, message, kind, timestamp });
        while self.activities.len() > cap {
            self.activities.pop_oldest();
        }
    }
}
