//! Review bounded context for the book catalog service.
//!
//! Home of the review aggregate and its command handlers, plus trust
//! scoring and recommendation extraction over review comments.

pub mod application;
pub mod domain;
