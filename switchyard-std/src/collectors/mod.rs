//! Standard collector extensions.

pub mod controller;
pub mod resource;

pub use controller::ControllerCollector;
pub use resource::{RESOURCE_ACTIONS, ResourceCollector};
