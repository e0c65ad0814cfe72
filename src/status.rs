use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter,
};
use tracing::info;

use crate::entities::poap::PoapStatus;
use crate::entities::{distribution_method, poap, poap_claim};

/// Claims make a POAP distributed; otherwise any live method publishes it.
pub fn derive_status(total_claims: u64, active_methods: u64) -> PoapStatus {
    if total_claims > 0 {
        PoapStatus::Distributed
    } else if active_methods > 0 {
        PoapStatus::Published
    } else {
        PoapStatus::Draft
    }
}

/// Recomputes and persists the status of `poap_id`. Returns `None` when the
/// POAP no longer exists.
pub async fn recompute_status<C>(db: &C, poap_id: i64) -> Result<Option<PoapStatus>, DbErr>
where
    C: ConnectionTrait,
{
    let Some(model) = poap::Entity::find_by_id(poap_id).one(db).await? else {
        return Ok(None);
    };

    let total_claims = poap_claim::Entity::find()
        .filter(poap_claim::Column::PoapId.eq(poap_id))
        .count(db)
        .await?;
    let active_methods = distribution_method::Entity::find()
        .filter(distribution_method::Column::PoapId.eq(poap_id))
        .filter(distribution_method::Column::Disabled.eq(false))
        .filter(distribution_method::Column::Deleted.eq(false))
        .count(db)
        .await?;

    let status = derive_status(total_claims, active_methods);
    if status != model.status {
        let previous = model.status;
        let mut active = model.into_active_model();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(db).await?;
        info!(
            "POAP {poap_id} status {} -> {}",
            previous.as_str(),
            status.as_str()
        );
    }

    Ok(Some(status))
}
