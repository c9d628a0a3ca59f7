//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! implement.

pub mod ai_backend;
pub mod retry_notifier;
pub mod template_store;
pub mod transport;
