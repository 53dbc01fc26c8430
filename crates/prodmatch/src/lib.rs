//! # Prodmatch
//!
//! **Hybrid product matching and classification for ERP catalogs.**
//!
//! Prodmatch reconciles free-text product descriptions (typically from
//! supplier invoices) against an ERP product catalog and decides, per
//! item, whether to link it to an existing record or to register a new
//! one — classifying the category group and unit of measure for new
//! registrations.
//!
//! ## Data Flow
//!
//! 1. The **ERP client** ([`erp`]) loads the catalog snapshot and the
//!    groups/units reference data.
//! 2. The **engine** (`prodmatch-core`) pre-filters candidates
//!    deterministically, optionally re-ranks them through an **AI
//!    provider** ([`providers`]), and applies the link-or-register
//!    decision policy.
//! 3. Results are exposed via the **CLI** (`pmx`) as JSON outcomes that
//!    downstream automation interprets.
//!
//! AI providers are interchangeable and optional: without one (or when a
//! call fails) every decision degrades to the deterministic pre-filter
//! path, so the pipeline keeps working offline.

pub mod config;
pub mod erp;
pub mod providers;
