pub mod aggregate;
pub mod page;
pub mod reaction;
pub mod redis;
pub mod sample;
pub mod user;

pub use aggregate::{AggregateFilter, AggregateView, RatedAggregate};
pub use page::{FavoritesPage, PageQuery, PageRequest, PinnedPage, Slot};
pub use reaction::{Direction, ReactionCounts, ReactionState};
pub use sample::{SampleOrder, SampleView, ScoredSample};
pub use user::{Actor, Claims};
