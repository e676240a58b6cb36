//! Domain types of the attendance service.
//!
//! Every `*Input` type is what a client sends; `normalize_and_validate` (or the
//! `into_*` conversions for attendance) turns it into something the store can
//! accept. Nothing here knows about storage or HTTP.

pub mod activity;
pub mod attendance;
pub mod class;
pub mod errors;
pub mod sanitize;
pub mod student;
pub mod user;

pub use activity::{Activity, ActivityKind};
pub use attendance::{
    AttendanceChanges, AttendanceInput, AttendancePatch, AttendanceRecord, AttendanceStatus,
    NewAttendance,
};
pub use class::{Class, ClassInput};
pub use errors::ModelError;
pub use student::{Student, StudentInput};
pub use user::{Role, User};
