use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use common::Pagination;
use model::entities::activity;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::extract::{OptionalJson, ValidJson};
use crate::schemas::{ApiResponse, AppState, PagedResponse};

/// Request body for creating an activity
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    /// Unique short code, e.g. `TREE-2025-01`
    #[validate(length(min = 1, max = 50))]
    pub activity_code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD` or an ISO 8601 datetime; only the date part is kept
    #[validate(length(min = 1))]
    pub activity_date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Hours credited to each volunteer marked present (default 0)
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub duration_hours: Option<Decimal>,
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

/// Request body for updating an activity. Omitted fields keep their value.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateActivityRequest {
    pub id: i32,
    #[validate(length(min = 1, max = 50))]
    pub activity_code: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub activity_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub duration_hours: Option<Decimal>,
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ActivityIdRequest {
    pub id: i32,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ListActivitiesRequest {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 50)
    pub limit: Option<u64>,
}

/// Activity response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i32,
    pub activity_code: String,
    pub name: String,
    pub description: Option<String>,
    pub activity_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub duration_hours: Decimal,
    pub location: Option<String>,
    pub category: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl From<activity::Model> for ActivityResponse {
    fn from(model: activity::Model) -> Self {
        Self {
            id: model.id,
            activity_code: model.activity_code,
            name: model.name,
            description: model.description,
            activity_date: model.activity_date,
            start_time: model.start_time,
            end_time: model.end_time,
            duration_hours: model.duration_hours,
            location: model.location,
            category: model.category,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

/// Accepts `YYYY-MM-DD` or an ISO datetime and keeps the date part.
pub(crate) fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    let date_part = value.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("Invalid date format. Please use YYYY-MM-DD format.".to_string()))
}

fn parse_time(value: Option<&str>) -> ApiResult<Option<NaiveTime>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map(Some)
        .map_err(|_| ApiError::Validation(format!("Invalid time '{}'. Please use HH:MM format.", value)))
}

pub(crate) fn non_negative_hours(hours: Decimal, field: &str) -> ApiResult<Decimal> {
    if hours.is_sign_negative() && !hours.is_zero() {
        return Err(ApiError::Validation(format!("{} must not be negative", field)));
    }
    Ok(hours)
}

/// Create a new activity
#[utoipa::path(
    post,
    path = "/createActivity",
    tag = "activities",
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity created", body = ApiResponse<ActivityResponse>),
        (status = 400, description = "Missing fields or bad date", body = ErrorResponse),
        (status = 409, description = "Activity code already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_activity(
    State(state): State<AppState>,
    session: Session,
    ValidJson(request): ValidJson<CreateActivityRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ActivityResponse>>)> {
    trace!("Entering create_activity function");
    let admin_id = session.admin_id()?;

    let activity_date = parse_date(&request.activity_date)?;
    let start_time = parse_time(request.start_time.as_deref())?;
    let end_time = parse_time(request.end_time.as_deref())?;
    let duration_hours = non_negative_hours(request.duration_hours.unwrap_or_default(), "duration_hours")?;

    let existing = activity::Entity::find()
        .filter(activity::Column::ActivityCode.eq(request.activity_code.as_str()))
        .count(&state.db)
        .await?;
    if existing > 0 {
        warn!("Activity code already exists: {}", request.activity_code);
        return Err(ApiError::Conflict("Activity code already exists.".to_string()));
    }

    let row = activity::ActiveModel {
        activity_code: Set(request.activity_code),
        name: Set(request.name),
        description: Set(request.description),
        activity_date: Set(activity_date),
        start_time: Set(start_time),
        end_time: Set(end_time),
        duration_hours: Set(duration_hours),
        location: Set(request.location),
        category: Set(request.category),
        created_by: Set(Some(admin_id)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let model = row.insert(&state.db).await?;

    info!("Activity created successfully with ID: {}, code: {}", model.id, model.activity_code);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(model.into(), "Activity created successfully!")),
    ))
}

/// List activities, newest first
#[utoipa::path(
    post,
    path = "/getActivities",
    tag = "activities",
    request_body(content = Option<ListActivitiesRequest>, description = "Optional page and limit"),
    responses(
        (status = 200, description = "Activities", body = PagedResponse<ActivityResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_activities(
    State(state): State<AppState>,
    OptionalJson(request): OptionalJson<ListActivitiesRequest>,
) -> ApiResult<Json<PagedResponse<ActivityResponse>>> {
    let total = activity::Entity::find().count(&state.db).await?;
    let pagination = Pagination::new(request.page, request.limit, total);

    let activities = activity::Entity::find()
        .order_by_desc(activity::Column::ActivityDate)
        .order_by_desc(activity::Column::CreatedAt)
        .order_by_desc(activity::Column::Id)
        .offset(pagination.offset())
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    debug!("Found {} of {} activities", activities.len(), total);
    Ok(Json(PagedResponse {
        data: activities.into_iter().map(ActivityResponse::from).collect(),
        pagination,
        message: "Activities retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update an activity
#[utoipa::path(
    post,
    path = "/updateActivity",
    tag = "activities",
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = ApiResponse<ActivityResponse>),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 409, description = "Activity code already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_activity(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateActivityRequest>,
) -> ApiResult<Json<ApiResponse<ActivityResponse>>> {
    let model = activity::Entity::find_by_id(request.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let mut active = model.into_active_model();
    if let Some(code) = request.activity_code {
        active.activity_code = Set(code);
    }
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(date) = request.activity_date.as_deref() {
        active.activity_date = Set(parse_date(date)?);
    }
    if request.start_time.is_some() {
        active.start_time = Set(parse_time(request.start_time.as_deref())?);
    }
    if request.end_time.is_some() {
        active.end_time = Set(parse_time(request.end_time.as_deref())?);
    }
    if let Some(hours) = request.duration_hours {
        active.duration_hours = Set(non_negative_hours(hours, "duration_hours")?);
    }
    if let Some(location) = request.location {
        active.location = Set(Some(location));
    }
    if let Some(category) = request.category {
        active.category = Set(Some(category));
    }

    let updated = active.update(&state.db).await?;
    state.invalidate_reports();

    info!("Activity {} updated", updated.id);
    Ok(Json(ApiResponse::ok(updated.into(), "Activity updated successfully!")))
}

/// Delete an activity and its attendance rows
#[utoipa::path(
    post,
    path = "/deleteActivity",
    tag = "activities",
    request_body = ActivityIdRequest,
    responses(
        (status = 200, description = "Activity deleted"),
        (status = 404, description = "Activity not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_activity(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ActivityIdRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let result = activity::Entity::delete_by_id(request.id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        warn!("Activity with ID {} not found for deletion", request.id);
        return Err(ApiError::NotFound("Activity not found".to_string()));
    }

    state.invalidate_reports();
    info!("Activity {} deleted", request.id);
    Ok(Json(ApiResponse::message("Activity deleted successfully!")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_iso_datetime() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(parse_date("2025-03-14").unwrap(), expected);
        assert_eq!(parse_date("2025-03-14T10:30:00.000Z").unwrap(), expected);
        assert!(matches!(parse_date("14/03/2025"), Err(ApiError::Validation(_))));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_time_formats() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(parse_time(Some("09:00")).unwrap(), Some(nine));
        assert_eq!(parse_time(Some("09:00:00")).unwrap(), Some(nine));
        assert_eq!(parse_time(Some("  ")).unwrap(), None);
        assert_eq!(parse_time(None).unwrap(), None);
        assert!(parse_time(Some("9am")).is_err());
    }

    #[test]
    fn test_negative_hours_rejected() {
        assert!(non_negative_hours(Decimal::new(-5, 1), "hours").is_err());
        assert_eq!(non_negative_hours(Decimal::ZERO, "hours").unwrap(), Decimal::ZERO);
    }
}
