use anyhow::{Result, bail};
use model::entities::admin::{self, AdminRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, IntoActiveModel, QueryFilter, Set};
use tracing::{info, warn};

pub async fn grant_super_admin(database_url: &str, email: &str) -> Result<()> {
    let db = Database::connect(database_url).await?;

    let Some(model) = admin::Entity::find()
        .filter(admin::Column::Email.eq(email))
        .one(&db)
        .await?
    else {
        warn!("No admin registered with email {}", email);
        bail!("no admin registered with email {}", email);
    };

    if model.role == AdminRole::SuperAdmin {
        info!("Admin {} is already a super admin", model.id);
        return Ok(());
    }

    let mut active = model.into_active_model();
    active.role = Set(AdminRole::SuperAdmin);
    let updated = active.update(&db).await?;

    info!("Admin {} ({}) is now a super admin", updated.id, updated.email);
    Ok(())
}
