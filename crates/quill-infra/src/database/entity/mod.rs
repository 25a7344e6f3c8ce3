//! SeaORM entity definitions and conversions to the domain types.

pub mod comment;
pub mod post;
pub mod user;
