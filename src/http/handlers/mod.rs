pub mod aggregate;
pub mod reaction;
pub mod sample;

pub use aggregate::{
    create_aggregate_handler, get_aggregate_handler, list_aggregates_handler, reconcile_handler,
    toggle_favorite_handler,
};
pub use reaction::toggle_reaction_handler;
pub use sample::{
    create_sample_handler, delete_sample_handler, get_sample_handler, list_samples_handler,
    update_sample_handler,
};
