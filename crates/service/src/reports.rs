//! Attendance aggregation: dashboard counters, per-day statistics over a
//! date range, and per-student summaries.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, instrument};

use models::{AttendanceRecord, AttendanceStatus, Student};

use crate::errors::ServiceError;
use crate::school::{SchoolData, SchoolStore, Settings};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ServiceError> {
        if start > end {
            return Err(ServiceError::Validation("start date must not be after end date".into()));
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late + self.excused
    }
}

/// `round(present / total * 100)`, 0 when nothing was recorded.
pub fn attendance_percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((u64::from(present) * 200 + u64::from(total)) / (u64::from(total) * 2)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub present_today: u32,
    pub absent_today: u32,
    pub late_today: u32,
    pub excused_today: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAttendance {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: u64,
    pub student_code: String,
    pub name: String,
    pub class_name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: u32,
    pub attendance_percentage: u32,
}

fn summarize<'a>(
    student: &Student,
    records: impl Iterator<Item = &'a AttendanceRecord>,
    range: Option<DateRange>,
) -> StudentSummary {
    let mut counts = StatusCounts::default();
    records
        .filter(|r| r.student_id == student.id)
        .filter(|r| range.map_or(true, |rg| rg.contains(r.date)))
        .for_each(|r| counts.add(r.status));
    let total = counts.total();
    StudentSummary {
        student_id: student.id,
        student_code: student.student_id.clone(),
        name: student.full_name(),
        class_name: student.class_name.clone(),
        counts,
        total,
        attendance_percentage: attendance_percentage(counts.present, total),
    }
}

fn daily_stats(data: &SchoolData, range: DateRange, class_name: Option<&str>) -> Vec<DailyAttendance> {
    let counted: HashSet<u64> = data
        .students
        .values()
        .filter(|s| class_name.map_or(true, |c| s.class_name == c))
        .map(|s| s.id)
        .collect();

    let mut per_day: HashMap<NaiveDate, StatusCounts> = HashMap::new();
    for r in data.attendance.values() {
        if range.contains(r.date) && counted.contains(&r.student_id) {
            per_day.entry(r.date).or_default().add(r.status);
        }
    }

    range
        .iter()
        .map(|date| DailyAttendance { date, counts: per_day.get(&date).copied().unwrap_or_default() })
        .collect()
}

#[derive(Clone)]
pub struct ReportService {
    store: SchoolStore,
    settings: Settings,
}

impl ReportService {
    pub fn new(store: SchoolStore, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Counters for the dashboard header. `today` is passed in so callers
    /// decide the clock.
    pub async fn dashboard_stats(&self, today: NaiveDate) -> DashboardStats {
        self.store
            .read(|data| {
                let mut counts = StatusCounts::default();
                data.attendance
                    .values()
                    .filter(|r| r.date == today && data.students.get(r.student_id).is_some())
                    .for_each(|r| counts.add(r.status));
                DashboardStats {
                    total_students: data.students.len(),
                    present_today: counts.present,
                    absent_today: counts.absent,
                    late_today: counts.late,
                    excused_today: counts.excused,
                }
            })
            .await
    }

    /// One entry per day of the range, zeros included.
    #[instrument(skip(self))]
    pub async fn attendance_stats(
        &self,
        range: DateRange,
        class_name: Option<&str>,
    ) -> Result<Vec<DailyAttendance>, ServiceError> {
        let max = u64::from(self.settings.max_range_days);
        if range.days() > max {
            return Err(ServiceError::Validation(format!("date range may span at most {max} days")));
        }
        let stats = self.store.read(|data| daily_stats(data, range, class_name)).await;
        debug!(days = stats.len(), "attendance stats computed");
        Ok(stats)
    }

    pub async fn student_summary(
        &self,
        student_id: u64,
        range: Option<DateRange>,
    ) -> Result<StudentSummary, ServiceError> {
        self.store
            .read(|data| {
                let student = data.students.get(student_id).ok_or_else(|| ServiceError::not_found("student"))?;
                Ok(summarize(student, data.attendance.values(), range))
            })
            .await
    }

    /// Summaries for every student, or only those of `class_name`.
    pub async fn class_summary(&self, class_name: Option<&str>, range: Option<DateRange>) -> Vec<StudentSummary> {
        self.store
            .read(|data| {
                data.students
                    .values()
                    .filter(|s| class_name.map_or(true, |c| s.class_name == c))
                    .map(|s| summarize(s, data.attendance.values(), range))
                    .collect()
            })
            .await
    }
}
