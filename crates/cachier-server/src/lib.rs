//! # Cachier Server Library
//!
//! Dependency injection modules and application assembly for the
//! Cachier server binary.

pub mod app;
pub mod di;
pub mod startup;
