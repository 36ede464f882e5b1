//! # switchyard-std
//!
//! Standard implementations for the Switchyard URI router.
//!
//! This crate provides:
//! - **Collectors**: [`ControllerCollector`](collectors::ControllerCollector)
//!   derives routes from operation names,
//!   [`ResourceCollector`](collectors::ResourceCollector) registers
//!   resource-style routes
//! - **Strategies**: [`DecodeStrategy`](strategies::DecodeStrategy),
//!   [`MapStrategy`](strategies::MapStrategy)
//! - **Testing**: recording handlers and targets

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use switchyard_core;

// Modules
pub mod collectors;
pub mod strategies;
pub mod testing;
