//! Collaborator seam for the external product catalog.
//!
//! The core never talks HTTP: catalog reads and writes go through this
//! trait. The application crate provides the ERP REST implementation;
//! tests use in-memory stubs.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CatalogProduct, Group, RegistrationData, Unit};

/// Abstract catalog read/write collaborator.
///
/// No pagination contract is assumed: `fetch_products` returns the full
/// record set, which the pre-filter indexes once per process.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch the full product catalog.
    async fn fetch_products(&self) -> Result<Vec<CatalogProduct>>;

    /// Create a catalog record; returns the created record as the
    /// backend reports it (including its assigned code).
    async fn create_product(&self, registration: &RegistrationData) -> Result<serde_json::Value>;

    /// Fetch the category groups reference data.
    async fn fetch_groups(&self) -> Result<Vec<Group>>;

    /// Fetch the units-of-measure reference data.
    async fn fetch_units(&self) -> Result<Vec<Unit>>;
}
