use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::RatingStore,
    engine::reaction::toggle,
    errors::AppError,
    models::{Actor, Direction, ReactionState},
    service::samples::get_active_sample,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionOutcome {
    pub new_state: ReactionState,
    pub likes: u64,
    pub dislikes: u64,
}

pub async fn toggle_reaction(
    store: &dyn RatingStore,
    actor: Actor,
    target_id: Uuid,
    direction: Direction,
    max_retries: u32,
) -> Result<ReactionOutcome, AppError> {
    get_active_sample(store, target_id).await?;

    let mut conflicts = 0;
    let new_state = loop {
        let current = store.get_reaction(actor.id, target_id).await?;
        let next = toggle(current, direction);
        if store
            .swap_reaction(actor.id, target_id, current, next)
            .await?
        {
            break next;
        }

        conflicts += 1;
        if conflicts > max_retries {
            return Err(AppError::StateConflict(format!(
                "Reaction of {} on {} kept changing",
                actor.id, target_id
            )));
        }
        tracing::warn!(
            "Reaction of {} on {} changed concurrently, retrying",
            actor.id,
            target_id
        );
    };

    let counts = store.reaction_counts(target_id).await?;

    tracing::info!(
        "Reaction of {} on {} is now {:?}",
        actor.id,
        target_id,
        new_state
    );
    Ok(ReactionOutcome {
        new_state,
        likes: counts.likes,
        dislikes: counts.dislikes,
    })
}
