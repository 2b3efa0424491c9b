use axum::{extract::State, response::Json};
use chrono::Datelike;
use common::{ReportPeriod, VolunteerHours, VolunteerStatistics};
use compute::error::ComputeError;
use compute::hours::DEFAULT_TOP_PERFORMERS;
use compute::{HoursComputer, today_or_now};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{OptionalJson, ValidJson};
use crate::schemas::{ApiResponse, AppState, CachedReport};

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct TopPerformersRequest {
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
    /// Defaults to the current year
    pub year: Option<i32>,
    /// Number of volunteers to return (default 3)
    #[validate(range(max = 500))]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct VolunteerStatisticsRequest {
    #[validate(length(min = 1, message = "Volunteer ID is required"))]
    pub volunteer_id: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct DepartmentReportRequest {
    /// Year of study
    pub year: Option<i32>,
    /// Branch name
    pub department: Option<String>,
}

/// Serves a ranking from the report cache, computing it on a miss.
async fn cached_ranking<F>(state: &AppState, key: String, report: F) -> ApiResult<Vec<VolunteerHours>>
where
    F: std::future::Future<Output = compute::error::Result<Vec<VolunteerHours>>>,
{
    if let Some(CachedReport::Ranking(rows)) = state.cache.get(&key).await {
        debug!(%key, "Report served from cache");
        return Ok(rows);
    }

    let generation = state.report_generation();
    let rows = report.await?;
    if !state.store_report(key, CachedReport::Ranking(rows.clone()), generation).await {
        debug!("Report outdated by a concurrent write, not cached");
    }
    Ok(rows)
}

/// Lifetime statistics for one volunteer, cached per volunteer.
pub(crate) async fn cached_statistics(state: &AppState, volunteer_id: &str) -> ApiResult<VolunteerStatistics> {
    let key = format!("stats:{}", volunteer_id);
    if let Some(CachedReport::Statistics(stats)) = state.cache.get(&key).await {
        debug!(%key, "Statistics served from cache");
        return Ok(stats);
    }

    let generation = state.report_generation();
    let stats = HoursComputer::new().volunteer_statistics(&state.db, volunteer_id).await?;
    state
        .store_report(key, CachedReport::Statistics(stats.clone()), generation)
        .await;
    Ok(stats)
}

/// Volunteers with the most hours in a month
#[utoipa::path(
    post,
    path = "/getTopPerformers",
    tag = "reports",
    request_body(content = Option<TopPerformersRequest>, description = "Optional month, year and limit"),
    responses(
        (status = 200, description = "Ranked volunteers", body = ApiResponse<Vec<VolunteerHours>>),
        (status = 400, description = "Invalid month or year", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_top_performers(
    State(state): State<AppState>,
    OptionalJson(request): OptionalJson<TopPerformersRequest>,
) -> ApiResult<Json<ApiResponse<Vec<VolunteerHours>>>> {
    // Zero means "not given", as with an omitted field.
    let month = request.month.filter(|m| *m != 0);
    let year = request.year.filter(|y| *y != 0);
    let limit = request.limit.filter(|l| *l != 0).unwrap_or(DEFAULT_TOP_PERFORMERS);

    let today = today_or_now(None);
    let period = ReportPeriod::resolve(month, year, today).ok_or_else(|| ComputeError::InvalidPeriod {
        month: month.unwrap_or_else(|| today.month()),
        year: year.unwrap_or_else(|| today.year()),
    })?;

    let key = format!("top:{}:{}:{}", period.year, period.month, limit);
    let rows = cached_ranking(
        &state,
        key,
        HoursComputer::new().top_performers(&state.db, period, limit),
    )
    .await?;

    info!("Top performers for {}/{}: {} rows", period.month, period.year, rows.len());
    Ok(Json(ApiResponse::ok(rows, "Top performers retrieved successfully")))
}

/// Lifetime statistics for any volunteer
#[utoipa::path(
    post,
    path = "/getVolunteerStatistics",
    tag = "reports",
    request_body = VolunteerStatisticsRequest,
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<VolunteerStatistics>),
        (status = 404, description = "Volunteer not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_volunteer_statistics(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<VolunteerStatisticsRequest>,
) -> ApiResult<Json<ApiResponse<VolunteerStatistics>>> {
    let stats = cached_statistics(&state, &request.volunteer_id).await?;
    Ok(Json(ApiResponse::ok(stats, "Statistics calculated successfully")))
}

/// All-time hours per volunteer, optionally for one year and branch
#[utoipa::path(
    post,
    path = "/getDepartmentWiseReport",
    tag = "reports",
    request_body(content = Option<DepartmentReportRequest>, description = "Optional year and department"),
    responses(
        (status = 200, description = "Ranked volunteers", body = ApiResponse<Vec<VolunteerHours>>)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_department_wise_report(
    State(state): State<AppState>,
    OptionalJson(request): OptionalJson<DepartmentReportRequest>,
) -> ApiResult<Json<ApiResponse<Vec<VolunteerHours>>>> {
    let year = request.year.filter(|y| *y != 0);
    let department = request.department.as_deref().map(str::trim).filter(|d| !d.is_empty());

    let key = format!(
        "dept:{}:{}",
        year.map(|y| y.to_string()).unwrap_or_default(),
        department.unwrap_or_default()
    );
    let rows = cached_ranking(
        &state,
        key,
        HoursComputer::new().department_wise(&state.db, year, department),
    )
    .await?;

    Ok(Json(ApiResponse::ok(rows, "Department report generated successfully")))
}

/// The top volunteers by all-time hours, at most 50
#[utoipa::path(
    post,
    path = "/getCampEligibilityList",
    tag = "reports",
    responses(
        (status = 200, description = "Eligible volunteers", body = ApiResponse<Vec<VolunteerHours>>)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_camp_eligibility_list(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<VolunteerHours>>>> {
    let rows = cached_ranking(&state, "camp".to_string(), HoursComputer::new().camp_eligibility(&state.db)).await?;
    info!("Camp eligibility list has {} volunteers", rows.len());
    Ok(Json(ApiResponse::ok(rows, "Camp eligibility list generated successfully")))
}
