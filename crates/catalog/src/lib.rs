//! Lesson catalog domain module.
//!
//! Contains the catalog record type and the free-text query translator,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod lesson;
pub mod query;

pub use lesson::{Lesson, NewLesson, SpacesRejection};
pub use query::{translate, FieldPredicate, LessonFilter, NumericField, TextField};
