//! Shared event-sourcing abstractions for the book catalog service.
//!
//! This crate defines the event envelope plus the aggregate, persistence,
//! transport, and clock contracts that every other crate depends on. It
//! contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod event;
pub mod publisher;
pub mod repository;
