//! Role-template store port
//!
//! Durable backing for the gateway's role-template cache. The whole cache
//! is loaded once and rewritten on every insert, oldest entry first.

use thiserror::Error;
use werewolf_domain::RoleTemplateRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),
}

pub trait RoleTemplateStore: Send + Sync {
    /// Every stored record, oldest first. A missing store is empty.
    fn load(&self) -> Result<Vec<RoleTemplateRecord>, StoreError>;

    /// Replace the stored records
    fn save(&self, records: &[RoleTemplateRecord]) -> Result<(), StoreError>;
}

/// Store that keeps nothing, for runs without a cache file
pub struct NoTemplateStore;

impl RoleTemplateStore for NoTemplateStore {
    fn load(&self) -> Result<Vec<RoleTemplateRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn save(&self, _records: &[RoleTemplateRecord]) -> Result<(), StoreError> {
        Ok(())
    }
}
