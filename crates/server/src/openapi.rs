use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentInputDoc {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub class_name: String,
    pub phone_number: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct ClassInputDoc {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInputDoc {
    pub student_id: u64,
    /// YYYY-MM-DD
    pub date: String,
    /// present | absent | late | excused
    pub status: String,
    /// HH:MM
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatchDoc {
    pub student_id: Option<u64>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::students::list,
        crate::routes::students::get,
        crate::routes::students::create,
        crate::routes::students::update,
        crate::routes::students::delete,
        crate::routes::classes::list,
        crate::routes::classes::get,
        crate::routes::classes::create,
        crate::routes::classes::update,
        crate::routes::classes::delete,
        crate::routes::attendance::list,
        crate::routes::attendance::get,
        crate::routes::attendance::create,
        crate::routes::attendance::update,
        crate::routes::attendance::delete,
        crate::routes::activities::list,
        crate::routes::reports::dashboard,
        crate::routes::reports::attendance,
        crate::routes::reports::students,
        crate::routes::reports::student_summary,
        crate::routes::me::my_attendance,
        crate::routes::me::my_profile,
    ),
    components(
        schemas(
            HealthResponse,
            StudentInputDoc,
            ClassInputDoc,
            AttendanceInputDoc,
            AttendancePatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "students"),
        (name = "classes"),
        (name = "attendance"),
        (name = "activities"),
        (name = "reports"),
        (name = "me")
    )
)]
pub struct ApiDoc;
