use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::sanitize::clean_opt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| ModelError::validation("status must be one of: present, absent, late, excused"))
    }
}

/// One student's attendance on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: u64,
    /// Store id of the student, not the school code.
    pub student_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub time: Option<String>,
    pub notes: Option<String>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ModelError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ModelError::validation("date is required"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ModelError::validation(format!("date `{raw}` must be YYYY-MM-DD")))
}

fn parse_time(raw: Option<String>) -> Result<Option<String>, ModelError> {
    match clean_opt(raw) {
        None => Ok(None),
        Some(t) => NaiveTime::parse_from_str(&t, TIME_FORMAT)
            .map(|parsed| Some(parsed.format(TIME_FORMAT).to_string()))
            .map_err(|_| ModelError::validation(format!("time `{t}` must be HH:MM"))),
    }
}

/// Payload for marking attendance. Dates and statuses arrive as strings so
/// that bad values surface as validation errors rather than parse failures.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub student_id: u64,
    pub date: String,
    pub status: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAttendance {
    pub student_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl NewAttendance {
    pub fn into_record(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id: self.student_id,
            date: self.date,
            status: self.status,
            time: self.time,
            notes: self.notes,
        }
    }
}

impl AttendanceInput {
    pub fn into_new(self) -> Result<NewAttendance, ModelError> {
        Ok(NewAttendance {
            student_id: self.student_id,
            date: parse_date(&self.date)?,
            status: self.status.parse()?,
            time: parse_time(self.time)?,
            notes: clean_opt(self.notes),
        })
    }
}

/// Partial update. For `time` and `notes` an empty string clears the value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    #[serde(default)]
    pub student_id: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttendanceChanges {
    pub student_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub time: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl AttendancePatch {
    pub fn into_changes(self) -> Result<AttendanceChanges, ModelError> {
        Ok(AttendanceChanges {
            student_id: self.student_id,
            date: self.date.as_deref().map(parse_date).transpose()?,
            status: self.status.as_deref().map(str::parse).transpose()?,
            time: match self.time {
                Some(t) => Some(parse_time(Some(t))?),
                None => None,
            },
            notes: self.notes.map(|n| clean_opt(Some(n))),
        })
    }
}

impl AttendanceChanges {
    /// The record as it would look after applying these changes.
    pub fn applied(&self, record: &AttendanceRecord) -> AttendanceRecord {
        AttendanceRecord {
            id: record.id,
            student_id: self.student_id.unwrap_or(record.student_id),
            date: self.date.unwrap_or(record.date),
            status: self.status.unwrap_or(record.status),
            time: self.time.clone().unwrap_or_else(|| record.time.clone()),
            notes: self.notes.clone().unwrap_or_else(|| record.notes.clone()),
        }
    }
}
