//! Domain model for reviews.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod values;
