use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use common::VolunteerStatistics;
use compute::{today_or_now, volunteer_id::generate_volunteer_id};
use model::entities::activity_attendance::{self, AttendanceStatus};
use model::entities::{activity, individual_work, volunteer};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::password::{hash_password, temporary_password, verify_password};
use crate::auth::{Role, Session, issue_reset_token, issue_session_token, verify_reset_token};
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::handlers::activities::ActivityResponse;
use crate::handlers::reports::cached_statistics;
use crate::handlers::work::WorkResponse;
use crate::schemas::{ApiResponse, AppState};

/// Request body for registering a volunteer
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterVolunteerRequest {
    /// College roll number
    #[validate(length(min = 1, max = 50))]
    pub roll: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub contact: Option<String>,
    /// Course name; `btech` and `mtech` get their own ID prefix
    #[validate(length(min = 1, max = 50))]
    pub course: String,
    /// Year of study
    #[validate(range(min = 1, max = 6))]
    pub year: i32,
    #[validate(length(min = 1, max = 100))]
    pub branch: String,
    #[validate(range(min = 1, max = 12))]
    pub semester: i32,
    #[validate(length(min = 1))]
    pub password: String,
}

/// One row of a bulk registration. A temporary password is generated.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct BulkVolunteer {
    #[validate(length(min = 1, max = 50))]
    pub roll: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub contact: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub course: String,
    #[validate(range(min = 1, max = 6))]
    pub year: i32,
    #[validate(length(min = 1, max = 100))]
    pub branch: String,
    #[validate(range(min = 1, max = 12))]
    pub semester: i32,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct BulkRegisterRequest {
    #[validate(length(min = 1, message = "At least one volunteer is required"))]
    pub volunteers: Vec<BulkVolunteer>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkRegisterSuccess {
    pub name: String,
    pub email: String,
    pub volunteer_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkRegisterFailure {
    pub name: String,
    pub email: String,
    pub error: String,
}

/// Per-row outcome of a bulk registration
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkRegisterSummary {
    pub successful: Vec<BulkRegisterSuccess>,
    pub failed: Vec<BulkRegisterFailure>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginVolunteerRequest {
    #[validate(length(min = 1))]
    pub roll: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Volunteer profile. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VolunteerResponse {
    pub id: i32,
    pub volunteer_id: String,
    pub roll: String,
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
    pub course: String,
    pub year: i32,
    pub branch: String,
    pub semester: i32,
    pub created_at: NaiveDateTime,
}

impl From<volunteer::Model> for VolunteerResponse {
    fn from(model: volunteer::Model) -> Self {
        Self {
            id: model.id,
            volunteer_id: model.volunteer_id,
            roll: model.roll,
            name: model.name,
            email: model.email,
            contact: model.contact,
            course: model.course,
            year: model.year,
            branch: model.branch,
            semester: model.semester,
            created_at: model.created_at,
        }
    }
}

/// Returned by registration and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VolunteerAuthResponse {
    /// Bearer token for volunteer routes
    pub token: String,
    pub volunteer: VolunteerResponse,
}

/// An activity that has taken place, with this volunteer's attendance if any
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyAttendanceEntry {
    pub activity_id: i32,
    pub activity_code: String,
    pub name: String,
    pub activity_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub duration_hours: Decimal,
    pub location: Option<String>,
    pub category: Option<String>,
    /// `present`, `absent`, or null when no attendance was recorded
    #[schema(value_type = Option<String>)]
    pub status: Option<AttendanceStatus>,
    pub attendance_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    #[validate(length(min = 1))]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[serde(alias = "newPassword")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}

/// Fields shared by single and bulk registration
struct NewVolunteer<'a> {
    roll: &'a str,
    name: &'a str,
    email: &'a str,
    contact: Option<&'a str>,
    course: &'a str,
    year: i32,
    branch: &'a str,
    semester: i32,
}

async fn insert_volunteer(state: &AppState, new: NewVolunteer<'_>, password: &str) -> ApiResult<volunteer::Model> {
    let volunteer_id = generate_volunteer_id(&state.db, new.course, new.year, today_or_now(None)).await?;
    let password_hash = hash_password(password, state.config.password_iterations)?;

    let row = volunteer::ActiveModel {
        volunteer_id: Set(volunteer_id),
        roll: Set(new.roll.to_string()),
        name: Set(new.name.to_string()),
        email: Set(new.email.to_string()),
        contact: Set(new.contact.map(str::to_string)),
        course: Set(new.course.to_string()),
        year: Set(new.year),
        branch: Set(new.branch.to_string()),
        semester: Set(new.semester),
        password: Set(password_hash),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let model = row.insert(&state.db).await?;
    state.invalidate_reports();
    Ok(model)
}

/// Register a volunteer
#[utoipa::path(
    post,
    path = "/registerVolunteer",
    tag = "volunteers",
    request_body = RegisterVolunteerRequest,
    responses(
        (status = 201, description = "Volunteer registered", body = ApiResponse<VolunteerAuthResponse>),
        (status = 400, description = "Invalid request or already registered", body = ErrorResponse),
        (status = 409, description = "Generated ID or unique field collided", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(roll = %request.roll))]
pub async fn register_volunteer(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterVolunteerRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<VolunteerAuthResponse>>)> {
    trace!("Entering register_volunteer function");

    let existing = volunteer::Entity::find()
        .filter(
            Condition::any()
                .add(volunteer::Column::Roll.eq(request.roll.as_str()))
                .add(volunteer::Column::Email.eq(request.email.as_str())),
        )
        .one(&state.db)
        .await?;
    if existing.is_some() {
        warn!("Volunteer with roll {} or email {} already exists", request.roll, request.email);
        return Err(ApiError::Validation("Volunteer is already registered.".to_string()));
    }

    let model = insert_volunteer(
        &state,
        NewVolunteer {
            roll: &request.roll,
            name: &request.name,
            email: &request.email,
            contact: request.contact.as_deref(),
            course: &request.course,
            year: request.year,
            branch: &request.branch,
            semester: request.semester,
        },
        &request.password,
    )
    .await?;

    let token = issue_session_token(&state.config, &model.volunteer_id, Role::Volunteer, &model.name)?;
    info!("Volunteer registered successfully with ID: {}", model.volunteer_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            VolunteerAuthResponse {
                token,
                volunteer: model.into(),
            },
            "Registered Successfully!",
        )),
    ))
}

/// Register many volunteers at once. Each row gets a temporary password
/// that is mailed to the volunteer.
#[utoipa::path(
    post,
    path = "/bulkRegisterVolunteers",
    tag = "volunteers",
    request_body = BulkRegisterRequest,
    responses(
        (status = 200, description = "Bulk registration processed", body = ApiResponse<BulkRegisterSummary>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(count = request.volunteers.len()))]
pub async fn bulk_register_volunteers(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<BulkRegisterRequest>,
) -> ApiResult<Json<ApiResponse<BulkRegisterSummary>>> {
    let mut summary = BulkRegisterSummary::default();

    for entry in request.volunteers {
        let outcome = match entry.validate() {
            Ok(()) => {
                let password = temporary_password()?;
                insert_volunteer(
                    &state,
                    NewVolunteer {
                        roll: &entry.roll,
                        name: &entry.name,
                        email: &entry.email,
                        contact: entry.contact.as_deref(),
                        course: &entry.course,
                        year: entry.year,
                        branch: &entry.branch,
                        semester: entry.semester,
                    },
                    &password,
                )
                .await
                .map(|model| (model, password))
            }
            Err(errors) => Err(ApiError::from(errors)),
        };

        match outcome {
            Ok((model, password)) => {
                if let Err(e) = state
                    .mailer
                    .send_credentials(&model.email, &model.name, &model.volunteer_id, &password)
                    .await
                {
                    warn!("{}", e);
                }
                summary.successful.push(BulkRegisterSuccess {
                    name: model.name,
                    email: model.email,
                    volunteer_id: model.volunteer_id,
                });
            }
            Err(e) => {
                warn!("Bulk registration failed for {}: {}", entry.email, e);
                summary.failed.push(BulkRegisterFailure {
                    name: entry.name,
                    email: entry.email,
                    error: e.to_string(),
                });
            }
        }
    }

    let message = format!(
        "Bulk registration completed. Successful: {}, Failed: {}",
        summary.successful.len(),
        summary.failed.len()
    );
    info!("{}", message);
    Ok(Json(ApiResponse::ok(summary, message)))
}

/// Log in with roll number and password
#[utoipa::path(
    post,
    path = "/loginVolunteer",
    tag = "volunteers",
    request_body = LoginVolunteerRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<VolunteerAuthResponse>),
        (status = 401, description = "Unknown roll or wrong password", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(roll = %request.roll))]
pub async fn login_volunteer(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginVolunteerRequest>,
) -> ApiResult<Json<ApiResponse<VolunteerAuthResponse>>> {
    let model = volunteer::Entity::find()
        .filter(volunteer::Column::Roll.eq(request.roll.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Volunteer not registered!".to_string()))?;

    if !verify_password(&request.password, &model.password) {
        warn!("Invalid password for volunteer {}", model.volunteer_id);
        return Err(ApiError::Unauthorized("Invalid Credentials".to_string()));
    }

    let token = issue_session_token(&state.config, &model.volunteer_id, Role::Volunteer, &model.name)?;
    info!("Volunteer {} logged in", model.volunteer_id);

    Ok(Json(ApiResponse::ok(
        VolunteerAuthResponse {
            token,
            volunteer: model.into(),
        },
        "Logged in successfully!",
    )))
}

/// Upcoming activities, soonest first
#[utoipa::path(
    post,
    path = "/getVolunteerActivities",
    tag = "volunteers",
    responses(
        (status = 200, description = "Upcoming activities", body = ApiResponse<Vec<ActivityResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_volunteer_activities(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ActivityResponse>>>> {
    let today = today_or_now(None);
    let activities = activity::Entity::find()
        .filter(activity::Column::ActivityDate.gte(today))
        .order_by_asc(activity::Column::ActivityDate)
        .all(&state.db)
        .await?;

    debug!("Found {} upcoming activities", activities.len());
    Ok(Json(ApiResponse::ok(
        activities.into_iter().map(ActivityResponse::from).collect(),
        "Upcoming activities retrieved successfully",
    )))
}

/// Past activities joined with the caller's attendance
#[utoipa::path(
    post,
    path = "/getMyAttendance",
    tag = "volunteers",
    responses(
        (status = 200, description = "Attendance history", body = ApiResponse<Vec<MyAttendanceEntry>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not a volunteer session", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_attendance(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<ApiResponse<Vec<MyAttendanceEntry>>>> {
    let volunteer_id = session.volunteer_id()?;
    let today = today_or_now(None);

    let activities = activity::Entity::find()
        .filter(activity::Column::ActivityDate.lte(today))
        .order_by_desc(activity::Column::ActivityDate)
        .order_by_desc(activity::Column::Id)
        .all(&state.db)
        .await?;

    let mut marks: HashMap<i32, Vec<activity_attendance::Model>> = HashMap::new();
    for row in activity_attendance::Entity::find()
        .filter(activity_attendance::Column::VolunteerId.eq(volunteer_id))
        .order_by_asc(activity_attendance::Column::Date)
        .all(&state.db)
        .await?
    {
        marks.entry(row.activity_id).or_default().push(row);
    }

    let mut entries = Vec::with_capacity(activities.len());
    for a in activities {
        let rows = marks.remove(&a.id).unwrap_or_default();
        let entry = |status: Option<AttendanceStatus>, attendance_date: Option<NaiveDate>| MyAttendanceEntry {
            activity_id: a.id,
            activity_code: a.activity_code.clone(),
            name: a.name.clone(),
            activity_date: a.activity_date,
            duration_hours: a.duration_hours,
            location: a.location.clone(),
            category: a.category.clone(),
            status,
            attendance_date,
        };
        if rows.is_empty() {
            entries.push(entry(None, None));
        } else {
            entries.extend(rows.into_iter().map(|r| entry(Some(r.status), Some(r.date))));
        }
    }

    debug!("Returning {} attendance entries for {}", entries.len(), volunteer_id);
    Ok(Json(ApiResponse::ok(entries, "Attendance records retrieved successfully")))
}

/// Individual work assigned to the caller, newest first
#[utoipa::path(
    post,
    path = "/getMyWork",
    tag = "volunteers",
    responses(
        (status = 200, description = "Work records", body = ApiResponse<Vec<WorkResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_work(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<ApiResponse<Vec<WorkResponse>>>> {
    let volunteer_id = session.volunteer_id()?;
    let work = individual_work::Entity::find()
        .filter(individual_work::Column::VolunteerId.eq(volunteer_id))
        .order_by_desc(individual_work::Column::WorkDate)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        work.into_iter().map(WorkResponse::from).collect(),
        "Work records retrieved successfully",
    )))
}

/// Lifetime hours of the caller
#[utoipa::path(
    post,
    path = "/getMyStatistics",
    tag = "volunteers",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<VolunteerStatistics>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_statistics(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<ApiResponse<VolunteerStatistics>>> {
    let volunteer_id = session.volunteer_id()?;
    let statistics = cached_statistics(&state, volunteer_id).await?;
    Ok(Json(ApiResponse::ok(statistics, "Statistics calculated successfully")))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/changePassword",
    tag = "volunteers",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password too short", body = ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    ValidJson(request): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let volunteer_id = session.volunteer_id()?;
    let model = volunteer::Entity::find()
        .filter(volunteer::Column::VolunteerId.eq(volunteer_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Volunteer not found".to_string()))?;

    if !verify_password(&request.current_password, &model.password) {
        return Err(ApiError::Unauthorized("Current password is incorrect!".to_string()));
    }

    let mut active = model.into_active_model();
    active.password = Set(hash_password(&request.new_password, state.config.password_iterations)?);
    active.update(&state.db).await?;

    info!("Password changed for volunteer {}", volunteer_id);
    Ok(Json(ApiResponse::message("Password changed successfully!")))
}

/// Issue a password reset token and mail it to the volunteer
#[utoipa::path(
    post,
    path = "/forgotPassword",
    tag = "volunteers",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued"),
        (status = 404, description = "No account with this email", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let model = volunteer::Entity::find()
        .filter(volunteer::Column::Email.eq(request.email.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account found with this email!".to_string()))?;

    let (token, expires) = issue_reset_token(&state.config, model.id)?;
    let (email, name) = (model.email.clone(), model.name.clone());

    let mut active = model.into_active_model();
    active.password_reset_token = Set(Some(token.clone()));
    active.password_reset_expires = Set(Some(expires));
    active.update(&state.db).await?;

    if let Err(e) = state.mailer.send_password_reset(&email, &name, &token).await {
        warn!("{}", e);
    }

    info!("Password reset token issued, expires at {}", expires);
    Ok(Json(ApiResponse::message("Password reset link sent to your email!")))
}

/// Set a new password using a reset token
#[utoipa::path(
    post,
    path = "/resetPassword",
    tag = "volunteers",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 401, description = "Invalid or expired reset token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let invalid = || ApiError::Unauthorized("Invalid or expired reset token".to_string());

    let volunteer_pk = verify_reset_token(&state.config, &request.token).map_err(|e| {
        debug!("Reset token rejected: {}", e);
        invalid()
    })?;

    let model = volunteer::Entity::find_by_id(volunteer_pk)
        .filter(volunteer::Column::PasswordResetToken.eq(request.token.as_str()))
        .filter(volunteer::Column::PasswordResetExpires.gt(Utc::now().naive_utc()))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    let mut active = model.into_active_model();
    active.password = Set(hash_password(&request.new_password, state.config.password_iterations)?);
    active.password_reset_token = Set(None);
    active.password_reset_expires = Set(None);
    let updated = active.update(&state.db).await?;

    info!("Password reset for volunteer {}", updated.volunteer_id);
    Ok(Json(ApiResponse::message("Password reset successfully!")))
}
