use std::cmp::Ordering;

use crate::models::{
    reaction::{Direction, ReactionState},
    sample::{SampleOrder, SampleView},
};

/// Applying the current direction again clears it; any other direction replaces it.
pub fn toggle(current: ReactionState, direction: Direction) -> ReactionState {
    let target = ReactionState::from(direction);
    if current == target {
        ReactionState::None
    } else {
        target
    }
}

/// Orders annotated samples in place. Ties always fall back to newest first.
pub fn sort_samples(samples: &mut [SampleView], order: SampleOrder) {
    samples.sort_by(|a, b| {
        let primary = match order {
            SampleOrder::New => Ordering::Equal,
            SampleOrder::Likes => b.likes.cmp(&a.likes),
            SampleOrder::Dislikes => b.dislikes.cmp(&a.dislikes),
        };
        primary
            .then_with(|| b.sample.created_at.cmp(&a.sample.created_at))
            .then_with(|| a.sample.id.cmp(&b.sample.id))
    });
}
