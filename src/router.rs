use crate::auth::middleware::{require_admin, require_auth, require_volunteer};
use crate::handlers::{
    activities::{create_activity, delete_activity, get_activities, update_activity},
    admins::{delete_admin, get_admins, login_admin, register_admin, update_admin_role},
    attendance::{get_activity_attendance, mark_attendance},
    health::{health_check, service_index},
    reports::{get_camp_eligibility_list, get_department_wise_report, get_top_performers, get_volunteer_statistics},
    volunteers::{
        bulk_register_volunteers, change_password, forgot_password, get_my_attendance, get_my_statistics,
        get_my_work, get_volunteer_activities, login_volunteer, register_volunteer, reset_password,
    },
    work::{add_individual_work, delete_work, get_all_work, get_volunteer_work, update_work},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(service_index))
        .route("/health", get(health_check))
        .route("/registerVolunteer", post(register_volunteer))
        .route("/bulkRegisterVolunteers", post(bulk_register_volunteers))
        .route("/loginVolunteer", post(login_volunteer))
        .route("/getVolunteerActivities", post(get_volunteer_activities))
        .route("/forgotPassword", post(forgot_password))
        .route("/resetPassword", post(reset_password))
        .route("/registerAdmin", post(register_admin))
        .route("/loginAdmin", post(login_admin));

    // Any valid session
    let authenticated = Router::new()
        .route("/getActivities", post(get_activities))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let volunteer = Router::new()
        .route("/getMyAttendance", post(get_my_attendance))
        .route("/getMyWork", post(get_my_work))
        .route("/getMyStatistics", post(get_my_statistics))
        .route("/changePassword", post(change_password))
        .route_layer(from_fn(require_volunteer))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        // Activities and attendance
        .route("/createActivity", post(create_activity))
        .route("/updateActivity", post(update_activity))
        .route("/deleteActivity", post(delete_activity))
        .route("/markAttendance", post(mark_attendance))
        .route("/getActivityAttendance", post(get_activity_attendance))
        // Individual work
        .route("/addIndividualWork", post(add_individual_work))
        .route("/getVolunteerWork", post(get_volunteer_work))
        .route("/getAllWork", post(get_all_work))
        .route("/updateWork", post(update_work))
        .route("/deleteWork", post(delete_work))
        // Reports
        .route("/getTopPerformers", post(get_top_performers))
        .route("/getVolunteerStatistics", post(get_volunteer_statistics))
        .route("/getDepartmentWiseReport", post(get_department_wise_report))
        .route("/getCampEligibilityList", post(get_camp_eligibility_list))
        // Admin management
        .route("/getAdmins", post(get_admins))
        .route("/updateAdminRole", post(update_admin_role))
        .route("/deleteAdmin", post(delete_admin))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let request_timeout = state.config.request_timeout();

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(volunteer)
        .merge(admin)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
