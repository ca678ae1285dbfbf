//! Order domain module.
//!
//! Validation of client-submitted orders and the immutable order record.
//! Orders reference catalog lessons by id but are not checked against the
//! catalog here; availability is adjusted separately by the caller.

pub mod order;

pub use order::{NewOrder, Order, OrderDraft};
