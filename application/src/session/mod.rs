//! Per-room game sessions

pub mod registry;

pub use registry::{SessionRegistry, SharedGame};
