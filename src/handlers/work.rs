use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use common::Pagination;
use model::entities::individual_work::{self, WorkType};
use model::entities::volunteer;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::extract::{OptionalJson, ValidJson};
use crate::handlers::activities::{non_negative_hours, parse_date};
use crate::schemas::{ApiResponse, AppState, PagedResponse};

/// Request body for assigning individual work
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddWorkRequest {
    #[validate(length(min = 1))]
    pub volunteer_id: String,
    /// One of `design`, `content`, `video`, `coordination`, `documentation`, `other`
    #[schema(value_type = String)]
    pub work_type: WorkType,
    /// `YYYY-MM-DD`
    pub work_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub hours_spent: Decimal,
    pub description: Option<String>,
}

/// Request body for updating work. Omitted fields keep their value.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateWorkRequest {
    pub id: i32,
    #[schema(value_type = Option<String>)]
    pub work_type: Option<WorkType>,
    pub work_date: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub hours_spent: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct WorkIdRequest {
    pub id: i32,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct VolunteerWorkRequest {
    #[validate(length(min = 1))]
    pub volunteer_id: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ListWorkRequest {
    pub page: Option<u64>,
    /// Page size (default 50)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkResponse {
    pub id: i32,
    pub volunteer_id: String,
    #[schema(value_type = String)]
    pub work_type: WorkType,
    pub work_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub hours_spent: Decimal,
    pub description: Option<String>,
    pub assigned_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl From<individual_work::Model> for WorkResponse {
    fn from(model: individual_work::Model) -> Self {
        Self {
            id: model.id,
            volunteer_id: model.volunteer_id,
            work_type: model.work_type,
            work_date: model.work_date,
            hours_spent: model.hours_spent,
            description: model.description,
            assigned_by: model.assigned_by,
            created_at: model.created_at,
        }
    }
}

/// A work record with the volunteer's name, branch and year
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkWithVolunteer {
    #[serde(flatten)]
    pub work: WorkResponse,
    pub volunteer_name: String,
    pub branch: String,
    pub year: i32,
}

/// Assign individual work to a volunteer
#[utoipa::path(
    post,
    path = "/addIndividualWork",
    tag = "work",
    request_body = AddWorkRequest,
    responses(
        (status = 201, description = "Work assigned", body = ApiResponse<WorkResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Volunteer not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_individual_work(
    State(state): State<AppState>,
    session: Session,
    ValidJson(request): ValidJson<AddWorkRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<WorkResponse>>)> {
    let admin_id = session.admin_id()?;
    let work_date = parse_date(&request.work_date)?;
    let hours_spent = non_negative_hours(request.hours_spent, "hours_spent")?;

    let volunteer_exists = volunteer::Entity::find()
        .filter(volunteer::Column::VolunteerId.eq(request.volunteer_id.as_str()))
        .count(&state.db)
        .await?;
    if volunteer_exists == 0 {
        warn!("Cannot assign work to unknown volunteer {}", request.volunteer_id);
        return Err(ApiError::NotFound("Volunteer not found".to_string()));
    }

    let row = individual_work::ActiveModel {
        volunteer_id: Set(request.volunteer_id),
        work_type: Set(request.work_type),
        work_date: Set(work_date),
        hours_spent: Set(hours_spent),
        description: Set(request.description),
        assigned_by: Set(Some(admin_id)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let model = row.insert(&state.db).await?;
    state.invalidate_reports();

    info!(
        "Work {} assigned to {}: {} hours of {}",
        model.id,
        model.volunteer_id,
        model.hours_spent,
        model.work_type.as_str()
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(model.into(), "Work assigned successfully!")),
    ))
}

/// Work records of one volunteer, newest first
#[utoipa::path(
    post,
    path = "/getVolunteerWork",
    tag = "work",
    request_body = VolunteerWorkRequest,
    responses(
        (status = 200, description = "Work records", body = ApiResponse<Vec<WorkResponse>>)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_volunteer_work(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<VolunteerWorkRequest>,
) -> ApiResult<Json<ApiResponse<Vec<WorkResponse>>>> {
    let work = individual_work::Entity::find()
        .filter(individual_work::Column::VolunteerId.eq(request.volunteer_id.as_str()))
        .order_by_desc(individual_work::Column::WorkDate)
        .order_by_desc(individual_work::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        work.into_iter().map(WorkResponse::from).collect(),
        "Work records retrieved successfully",
    )))
}

/// All work records joined with their volunteer, paginated
#[utoipa::path(
    post,
    path = "/getAllWork",
    tag = "work",
    request_body(content = Option<ListWorkRequest>, description = "Optional page and limit"),
    responses(
        (status = 200, description = "Work records", body = PagedResponse<WorkWithVolunteer>)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_all_work(
    State(state): State<AppState>,
    OptionalJson(request): OptionalJson<ListWorkRequest>,
) -> ApiResult<Json<PagedResponse<WorkWithVolunteer>>> {
    let total = individual_work::Entity::find().count(&state.db).await?;
    let pagination = Pagination::new(request.page, request.limit, total);

    let rows = individual_work::Entity::find()
        .find_also_related(volunteer::Entity)
        .order_by_desc(individual_work::Column::WorkDate)
        .order_by_desc(individual_work::Column::CreatedAt)
        .order_by_desc(individual_work::Column::Id)
        .offset(pagination.offset())
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    let data: Vec<WorkWithVolunteer> = rows
        .into_iter()
        .filter_map(|(work, volunteer)| {
            volunteer.map(|v| WorkWithVolunteer {
                work: work.into(),
                volunteer_name: v.name,
                branch: v.branch,
                year: v.year,
            })
        })
        .collect();

    debug!("Found {} of {} work records", data.len(), total);
    Ok(Json(PagedResponse {
        data,
        pagination,
        message: "Work records retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a work record
#[utoipa::path(
    post,
    path = "/updateWork",
    tag = "work",
    request_body = UpdateWorkRequest,
    responses(
        (status = 200, description = "Work updated", body = ApiResponse<WorkResponse>),
        (status = 404, description = "Work record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_work(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateWorkRequest>,
) -> ApiResult<Json<ApiResponse<WorkResponse>>> {
    let model = individual_work::Entity::find_by_id(request.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Work record not found".to_string()))?;

    let mut active = model.into_active_model();
    if let Some(work_type) = request.work_type {
        active.work_type = Set(work_type);
    }
    if let Some(date) = request.work_date.as_deref() {
        active.work_date = Set(parse_date(date)?);
    }
    if let Some(hours) = request.hours_spent {
        active.hours_spent = Set(non_negative_hours(hours, "hours_spent")?);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }

    let updated = active.update(&state.db).await?;
    state.invalidate_reports();

    info!("Work {} updated", updated.id);
    Ok(Json(ApiResponse::ok(updated.into(), "Work updated successfully!")))
}

/// Delete a work record
#[utoipa::path(
    post,
    path = "/deleteWork",
    tag = "work",
    request_body = WorkIdRequest,
    responses(
        (status = 200, description = "Work deleted"),
        (status = 404, description = "Work record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_work(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<WorkIdRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let result = individual_work::Entity::delete_by_id(request.id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        warn!("Work record {} not found for deletion", request.id);
        return Err(ApiError::NotFound("Work record not found".to_string()));
    }

    state.invalidate_reports();
    info!("Work {} deleted", request.id);
    Ok(Json(ApiResponse::message("Work deleted successfully!")))
}
