use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{NaiveDateTime, Utc};
use model::entities::admin::{self, AdminRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Role, Session, issue_session_token};
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::schemas::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterAdminRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub contact: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub branch: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginAdminRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Admin account without the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
    pub branch: String,
    /// `admin` or `super_admin`
    #[schema(value_type = String)]
    pub role: AdminRole,
    pub created_at: NaiveDateTime,
}

impl From<admin::Model> for AdminResponse {
    fn from(model: admin::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            contact: model.contact,
            branch: model.branch,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminAuthResponse {
    pub token: String,
    pub admin: AdminResponse,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateAdminRoleRequest {
    #[serde(alias = "adminId")]
    pub admin_id: i32,
    #[schema(value_type = String)]
    pub role: AdminRole,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct DeleteAdminRequest {
    #[serde(alias = "adminId")]
    pub admin_id: i32,
}

/// Only a current super admin may manage other admins. The role is read from
/// the database so a demotion takes effect before the token expires.
async fn require_super_admin(state: &AppState, session: &Session, action: &str) -> ApiResult<i32> {
    let requester_id = session.admin_id()?;
    let requester = admin::Entity::find_by_id(requester_id).one(&state.db).await?;
    match requester {
        Some(requester) if requester.role == AdminRole::SuperAdmin => Ok(requester_id),
        _ => {
            warn!(requester_id, "Non super admin attempted to {}", action);
            Err(ApiError::Forbidden(format!("Only super admins can {}", action)))
        }
    }
}

/// Register an admin. New admins always get the `admin` role.
#[utoipa::path(
    post,
    path = "/registerAdmin",
    tag = "admins",
    request_body = RegisterAdminRequest,
    responses(
        (status = 201, description = "Admin registered", body = ApiResponse<AdminAuthResponse>),
        (status = 400, description = "Invalid request or already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterAdminRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AdminAuthResponse>>)> {
    let existing = admin::Entity::find()
        .filter(admin::Column::Email.eq(request.email.as_str()))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(ApiError::Validation("Admin is already registered.".to_string()));
    }

    let row = admin::ActiveModel {
        name: Set(request.name),
        email: Set(request.email),
        contact: Set(request.contact),
        branch: Set(request.branch),
        password: Set(hash_password(&request.password, state.config.password_iterations)?),
        role: Set(AdminRole::Admin),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let model = row.insert(&state.db).await?;

    let token = issue_session_token(&state.config, &model.id.to_string(), Role::Admin, &model.name)?;
    info!("Admin registered successfully with ID: {}", model.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            AdminAuthResponse {
                token,
                admin: model.into(),
            },
            "Admin Registered Successfully!",
        )),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/loginAdmin",
    tag = "admins",
    request_body = LoginAdminRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AdminAuthResponse>),
        (status = 401, description = "Unknown email or wrong password", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login_admin(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginAdminRequest>,
) -> ApiResult<Json<ApiResponse<AdminAuthResponse>>> {
    let model = admin::Entity::find()
        .filter(admin::Column::Email.eq(request.email.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Admin not registered!".to_string()))?;

    if !verify_password(&request.password, &model.password) {
        warn!("Invalid password for admin {}", model.id);
        return Err(ApiError::Unauthorized("Invalid Credentials".to_string()));
    }

    let token = issue_session_token(&state.config, &model.id.to_string(), model.role.into(), &model.name)?;
    info!("Admin {} logged in as {}", model.id, model.role.as_str());

    Ok(Json(ApiResponse::ok(
        AdminAuthResponse {
            token,
            admin: model.into(),
        },
        "Logged in successfully!",
    )))
}

/// List all admins
#[utoipa::path(
    post,
    path = "/getAdmins",
    tag = "admins",
    responses(
        (status = 200, description = "Admins", body = ApiResponse<Vec<AdminResponse>>)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_admins(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<AdminResponse>>>> {
    let admins = admin::Entity::find()
        .order_by_asc(admin::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        admins.into_iter().map(AdminResponse::from).collect(),
        "Admins retrieved successfully",
    )))
}

/// Change another admin's role. Super admins only.
#[utoipa::path(
    post,
    path = "/updateAdminRole",
    tag = "admins",
    request_body = UpdateAdminRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<AdminResponse>),
        (status = 403, description = "Requester is not a super admin", body = ErrorResponse),
        (status = 404, description = "Admin not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_admin_role(
    State(state): State<AppState>,
    session: Session,
    ValidJson(request): ValidJson<UpdateAdminRoleRequest>,
) -> ApiResult<Json<ApiResponse<AdminResponse>>> {
    require_super_admin(&state, &session, "update roles").await?;

    let target = admin::Entity::find_by_id(request.admin_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

    let mut active = target.into_active_model();
    active.role = Set(request.role);
    let updated = active.update(&state.db).await?;

    info!("Admin {} is now {}", updated.id, updated.role.as_str());
    Ok(Json(ApiResponse::ok(updated.into(), "Role updated successfully!")))
}

/// Remove an admin. Super admins only; super admins and the requester
/// themselves cannot be removed.
#[utoipa::path(
    post,
    path = "/deleteAdmin",
    tag = "admins",
    request_body = DeleteAdminRequest,
    responses(
        (status = 200, description = "Admin deleted"),
        (status = 400, description = "Attempted self deletion", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Admin not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_admin(
    State(state): State<AppState>,
    session: Session,
    ValidJson(request): ValidJson<DeleteAdminRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let requester_id = require_super_admin(&state, &session, "delete admins").await?;

    if requester_id == request.admin_id {
        return Err(ApiError::Validation("You cannot delete your own account".to_string()));
    }

    let target = admin::Entity::find_by_id(request.admin_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

    if target.role == AdminRole::SuperAdmin {
        return Err(ApiError::Forbidden("Super admins cannot be deleted".to_string()));
    }

    admin::Entity::delete_by_id(target.id).exec(&state.db).await?;
    // Work assigned by the removed admin is deleted with it.
    state.invalidate_reports();

    info!("Admin {} deleted by {}", target.id, requester_id);
    Ok(Json(ApiResponse::message("Admin deleted successfully!")))
}
