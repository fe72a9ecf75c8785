//! Core operations. Every call takes the acting user explicitly and runs each
//! aggregate mutation as one versioned commit.

pub mod favorites;
pub mod listing;
pub mod reactions;
pub mod reconcile;
pub mod retry;
pub mod samples;

pub use favorites::toggle_favorite;
pub use listing::{list_aggregates, list_samples};
pub use reactions::{ReactionOutcome, toggle_reaction};
pub use reconcile::{ReconcileReport, reconcile, reconcile_all, spawn_reconciler};
pub use samples::{
    create_aggregate, create_sample, delete_sample, get_active_sample, get_visible_aggregate,
    update_sample,
};
