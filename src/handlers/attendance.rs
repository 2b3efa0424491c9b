use axum::{extract::State, response::Json};
use chrono::NaiveDate;
use common::AttendanceSummary;
use compute::today_or_now;
use model::entities::activity_attendance::{self, AttendanceStatus};
use model::entities::volunteer;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::handlers::activities::parse_date;
use crate::schemas::{ApiResponse, AppState};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AttendanceEntry {
    pub volunteer_id: String,
    /// `present` or `absent`
    #[schema(value_type = String)]
    pub status: AttendanceStatus,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct MarkAttendanceRequest {
    pub activity_id: i32,
    #[validate(length(min = 1, message = "Attendance list must not be empty"))]
    pub attendance: Vec<AttendanceEntry>,
    /// Attendance date, `YYYY-MM-DD`. Defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ActivityAttendanceRequest {
    pub activity_id: i32,
}

/// An attendance row joined with the volunteer it belongs to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityAttendanceRow {
    pub volunteer_id: String,
    pub name: String,
    pub year: i32,
    pub branch: String,
    #[schema(value_type = String)]
    pub status: AttendanceStatus,
    pub date: NaiveDate,
}

/// Mark attendance for a roster of volunteers
#[utoipa::path(
    post,
    path = "/markAttendance",
    tag = "attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Roster processed; failures are listed", body = ApiResponse<AttendanceSummary>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request), fields(activity_id = request.activity_id))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<MarkAttendanceRequest>,
) -> ApiResult<Json<ApiResponse<AttendanceSummary>>> {
    let date = match request.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => today_or_now(None),
    };

    let roster: Vec<(String, AttendanceStatus)> = request
        .attendance
        .into_iter()
        .map(|entry| (entry.volunteer_id, entry.status))
        .collect();

    let summary = compute::attendance::mark_attendance(&state.db, request.activity_id, &roster, date).await?;
    state.invalidate_reports();

    if !summary.is_complete() {
        warn!("{} roster entries could not be recorded", summary.failed.len());
    }
    info!("Attendance marked for {} volunteers on {}", summary.processed, date);

    let message = format!("Attendance marked successfully for {} volunteers!", summary.processed);
    Ok(Json(ApiResponse::ok(summary, message)))
}

/// Attendance rows of one activity, by volunteer ID
#[utoipa::path(
    post,
    path = "/getActivityAttendance",
    tag = "attendance",
    request_body = ActivityAttendanceRequest,
    responses(
        (status = 200, description = "Attendance rows", body = ApiResponse<Vec<ActivityAttendanceRow>>)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_activity_attendance(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ActivityAttendanceRequest>,
) -> ApiResult<Json<ApiResponse<Vec<ActivityAttendanceRow>>>> {
    let rows = activity_attendance::Entity::find()
        .filter(activity_attendance::Column::ActivityId.eq(request.activity_id))
        .find_also_related(volunteer::Entity)
        .order_by_asc(activity_attendance::Column::VolunteerId)
        .order_by_asc(activity_attendance::Column::Date)
        .all(&state.db)
        .await?;

    let data: Vec<ActivityAttendanceRow> = rows
        .into_iter()
        .filter_map(|(attendance, volunteer)| {
            volunteer.map(|v| ActivityAttendanceRow {
                volunteer_id: v.volunteer_id,
                name: v.name,
                year: v.year,
                branch: v.branch,
                status: attendance.status,
                date: attendance.date,
            })
        })
        .collect();

    debug!("Found {} attendance rows for activity {}", data.len(), request.activity_id);
    Ok(Json(ApiResponse::ok(data, "Attendance retrieved successfully")))
}
