//! Domain entities persisted by the record store.

pub mod customer;

pub use customer::*;
