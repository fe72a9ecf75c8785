pub mod pagination;
pub mod rating;
pub mod reaction;
