use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument};

use models::{ActivityKind, AttendanceInput, AttendancePatch, AttendanceRecord, Student};

use crate::errors::ServiceError;
use crate::school::{SchoolData, SchoolStore, Settings};

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub date: Option<NaiveDate>,
    pub student_id: Option<u64>,
    pub class_name: Option<String>,
}

/// A record together with the student it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceWithStudent {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub student: Student,
}

fn sort_records(records: &mut [AttendanceRecord]) {
    records.sort_by_key(|r| (r.date, r.id));
}

/// Records joined with their student, skipping any whose student is gone.
fn joined(data: &SchoolData, filter: &AttendanceFilter) -> Vec<AttendanceWithStudent> {
    let mut out: Vec<AttendanceWithStudent> = data
        .attendance
        .values()
        .filter(|r| filter.date.map_or(true, |d| r.date == d))
        .filter(|r| filter.student_id.map_or(true, |id| r.student_id == id))
        .filter_map(|r| {
            let student = data.students.get(r.student_id)?;
            if filter.class_name.as_deref().is_some_and(|c| student.class_name != c) {
                return None;
            }
            Some(AttendanceWithStudent { record: r.clone(), student: student.clone() })
        })
        .collect();
    out.sort_by_key(|j| (j.record.date, j.record.id));
    out
}

/// One record per student per day; marking the same day twice is a conflict
/// and the existing record should be updated instead.
#[derive(Clone)]
pub struct AttendanceService {
    store: SchoolStore,
    settings: Settings,
}

impl AttendanceService {
    pub fn new(store: SchoolStore, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> Vec<AttendanceWithStudent> {
        self.store.read(|data| joined(data, filter)).await
    }

    pub async fn get(&self, id: u64) -> Option<AttendanceRecord> {
        self.store.read(|data| data.attendance.get(id).cloned()).await
    }

    pub async fn for_student(&self, student_id: u64) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = self
            .store
            .read(|data| {
                data.attendance
                    .values()
                    .filter(|r| r.student_id == student_id)
                    .cloned()
                    .collect()
            })
            .await;
        sort_records(&mut records);
        records
    }

    pub async fn for_date(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
        self.store
            .read(|data| data.attendance.values().filter(|r| r.date == date).cloned().collect())
            .await
    }

    pub async fn for_class(&self, class_name: &str, date: Option<NaiveDate>) -> Vec<AttendanceWithStudent> {
        let filter = AttendanceFilter { date, student_id: None, class_name: Some(class_name.to_string()) };
        self.list(&filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: AttendanceInput) -> Result<AttendanceRecord, ServiceError> {
        let new = input.into_new()?;
        let cap = self.settings.max_activities;
        let record = self
            .store
            .update(move |data| {
                let name = data
                    .students
                    .get(new.student_id)
                    .map(Student::full_name)
                    .ok_or_else(|| ServiceError::Validation("Student not found".into()))?;
                if data.attendance.values().any(|r| r.student_id == new.student_id && r.date == new.date) {
                    return Err(ServiceError::Conflict(format!(
                        "attendance for student {} on {} already exists",
                        new.student_id, new.date
                    )));
                }
                let record = data.attendance.insert_with(|id| new.into_record(id)).clone();
                data.log_activity(
                    ActivityKind::Attendance,
                    format!("{name} was marked {}.", record.status),
                    cap,
                );
                Ok(record)
            })
            .await?;
        info!(
            attendance_id = record.id,
            student_id = record.student_id,
            date = %record.date,
            status = %record.status,
            "attendance_marked"
        );
        Ok(record)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: u64, patch: AttendancePatch) -> Result<AttendanceRecord, ServiceError> {
        let changes = patch.into_changes()?;
        let cap = self.settings.max_activities;
        let record = self
            .store
            .update(move |data| {
                let current = data.attendance.get(id).ok_or_else(|| ServiceError::not_found("attendance record"))?;
                let next = changes.applied(current);
                let name = data
                    .students
                    .get(next.student_id)
                    .map(Student::full_name)
                    .ok_or_else(|| ServiceError::Validation("Student not found".into()))?;
                let occupied = data
                    .attendance
                    .values()
                    .any(|r| r.id != id && r.student_id == next.student_id && r.date == next.date);
                if occupied {
                    return Err(ServiceError::Conflict(format!(
                        "attendance for student {} on {} already exists",
                        next.student_id, next.date
                    )));
                }
                if let Some(slot) = data.attendance.get_mut(id) {
                    *slot = next.clone();
                }
                data.log_activity(
                    ActivityKind::Attendance,
                    format!("Attendance for {name} was updated to {}.", next.status),
                    cap,
                );
                Ok(next)
            })
            .await?;
        info!(attendance_id = id, status = %record.status, "attendance_updated");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        self.store
            .update(move |data| {
                data.attendance
                    .remove(id)
                    .map(|_| ())
                    .ok_or_else(|| ServiceError::not_found("attendance record"))
            })
            .await?;
        info!(attendance_id = id, "attendance_deleted");
        Ok(())
    }
}
