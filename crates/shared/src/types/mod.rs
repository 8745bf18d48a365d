//! Common types used across the application.

pub mod capability;

#[cfg(test)]
mod capability_tests;

pub use capability::{Capability, CapabilitySet};
