#![cfg(test)]
use chrono::NaiveDate;

use models::{AttendanceInput, StudentInput};

use crate::school::Settings;
use crate::Services;

/// In-memory services with the default classes seeded.
pub async fn services() -> Services {
    services_with(Settings::default()).await
}

pub async fn services_with(settings: Settings) -> Services {
    let svc = Services::in_memory(settings);
    svc.classes.seed_defaults().await.expect("seed classes");
    svc
}

pub fn sample_student(code: &str, class_name: &str) -> StudentInput {
    StudentInput {
        student_id: code.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: Some("ada@example.com".into()),
        class_name: class_name.into(),
        phone_number: None,
        parent_name: None,
        parent_phone: None,
        address: None,
        active: None,
    }
}

pub fn mark(student_id: u64, date: &str, status: &str) -> AttendanceInput {
    AttendanceInput {
        student_id,
        date: date.into(),
        status: status.into(),
        time: None,
        notes: None,
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}
