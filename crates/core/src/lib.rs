//! `lessonbook-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, strongly-typed identifiers and the optimistic concurrency
//! precondition used by conditional store writes.

pub mod error;
pub mod id;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use id::{LessonId, OrderId};
pub use version::{ExpectedVersion, Versioned};
