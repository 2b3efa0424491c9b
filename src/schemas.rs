use common::{
    AttendanceFailure, AttendanceSummary, Pagination, VolunteerHours, VolunteerStatistics, WorkBreakdown,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::config::AppConfig;
use crate::handlers::{activities, admins, attendance, reports, volunteers, work};
use crate::mailer::Mailer;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for report results, cleared whenever hours change
    pub cache: Cache<String, CachedReport>,
    pub config: Arc<AppConfig>,
    /// Outgoing mail for credentials and password resets
    pub mailer: Arc<dyn Mailer>,
    /// Bumped by every invalidation; reports computed under an older
    /// generation are not cached.
    pub report_generation: Arc<AtomicU64>,
}

impl AppState {
    /// Drop every cached report. Called after any write that changes hours.
    pub fn invalidate_reports(&self) {
        self.report_generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }

    /// Generation to capture before computing a report.
    pub fn report_generation(&self) -> u64 {
        self.report_generation.load(Ordering::SeqCst)
    }

    /// Caches a report computed under `generation`. Returns false, leaving the
    /// cache untouched, when an invalidation happened in the meantime.
    pub async fn store_report(&self, key: String, report: CachedReport, generation: u64) -> bool {
        if self.report_generation() != generation {
            return false;
        }
        self.cache.insert(key.clone(), report).await;
        // An invalidation racing the insert may have missed the new entry.
        if self.report_generation() != generation {
            self.cache.invalidate(&key).await;
            return false;
        }
        true
    }
}

/// Cached report types
#[derive(Clone, Debug)]
pub enum CachedReport {
    Ranking(Vec<VolunteerHours>),
    Statistics(VolunteerStatistics),
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// A response that only carries a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(serde_json::Value::Null, message)
    }
}

/// A list response with page metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
    pub message: String,
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
    /// Server time (RFC 3339)
    pub timestamp: String,
}

/// Service index returned by `GET /`
#[derive(Serialize, ToSchema)]
pub struct ServiceIndex {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::service_index,
        volunteers::register_volunteer,
        volunteers::bulk_register_volunteers,
        volunteers::login_volunteer,
        volunteers::get_volunteer_activities,
        volunteers::get_my_attendance,
        volunteers::get_my_work,
        volunteers::get_my_statistics,
        volunteers::change_password,
        volunteers::forgot_password,
        volunteers::reset_password,
        admins::register_admin,
        admins::login_admin,
        admins::get_admins,
        admins::update_admin_role,
        admins::delete_admin,
        activities::create_activity,
        activities::get_activities,
        activities::update_activity,
        activities::delete_activity,
        attendance::mark_attendance,
        attendance::get_activity_attendance,
        work::add_individual_work,
        work::get_volunteer_work,
        work::get_all_work,
        work::update_work,
        work::delete_work,
        reports::get_top_performers,
        reports::get_volunteer_statistics,
        reports::get_department_wise_report,
        reports::get_camp_eligibility_list,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ServiceIndex,
            Pagination,
            VolunteerHours,
            VolunteerStatistics,
            WorkBreakdown,
            AttendanceSummary,
            AttendanceFailure,
            volunteers::RegisterVolunteerRequest,
            volunteers::BulkRegisterRequest,
            volunteers::BulkVolunteer,
            volunteers::BulkRegisterSummary,
            volunteers::BulkRegisterSuccess,
            volunteers::BulkRegisterFailure,
            volunteers::LoginVolunteerRequest,
            volunteers::VolunteerResponse,
            volunteers::VolunteerAuthResponse,
            volunteers::MyAttendanceEntry,
            volunteers::ChangePasswordRequest,
            volunteers::ForgotPasswordRequest,
            volunteers::ResetPasswordRequest,
            admins::RegisterAdminRequest,
            admins::LoginAdminRequest,
            admins::AdminResponse,
            admins::AdminAuthResponse,
            admins::UpdateAdminRoleRequest,
            admins::DeleteAdminRequest,
            activities::CreateActivityRequest,
            activities::UpdateActivityRequest,
            activities::ActivityIdRequest,
            activities::ListActivitiesRequest,
            activities::ActivityResponse,
            attendance::MarkAttendanceRequest,
            attendance::AttendanceEntry,
            attendance::ActivityAttendanceRequest,
            attendance::ActivityAttendanceRow,
            work::AddWorkRequest,
            work::UpdateWorkRequest,
            work::WorkIdRequest,
            work::VolunteerWorkRequest,
            work::ListWorkRequest,
            work::WorkResponse,
            work::WorkWithVolunteer,
            reports::TopPerformersRequest,
            reports::VolunteerStatisticsRequest,
            reports::DepartmentReportRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "volunteers", description = "Volunteer registration, login and self-service"),
        (name = "admins", description = "Admin accounts and role management"),
        (name = "activities", description = "Activity management"),
        (name = "attendance", description = "Attendance marking"),
        (name = "work", description = "Individually assigned work"),
        (name = "reports", description = "Hour aggregation reports"),
    ),
    info(
        title = "NSS Tracker API",
        description = "Attendance and work-hour tracking for NSS volunteers",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
