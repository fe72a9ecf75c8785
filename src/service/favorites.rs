use uuid::Uuid;

use crate::{
    db::RatingStore, errors::AppError, models::Actor, service::samples::get_visible_aggregate,
};

/// Flips the aggregate's membership in the actor's favorites and returns the new state.
pub async fn toggle_favorite(
    store: &dyn RatingStore,
    actor: Actor,
    aggregate_id: Uuid,
) -> Result<bool, AppError> {
    get_visible_aggregate(store, aggregate_id).await?;

    let favorited = store.toggle_favorite(actor.id, aggregate_id).await?;

    tracing::info!(
        "Aggregate {} {} favorites of {}",
        aggregate_id,
        if favorited { "added to" } else { "removed from" },
        actor.id
    );
    Ok(favorited)
}
