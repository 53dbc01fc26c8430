//! # Prodmatch Core
//!
//! Matching and classification engine for reconciling free-text invoice
//! product descriptions against an ERP product catalog.
//!
//! The pipeline has two ranking stages feeding a decision policy:
//!
//! 1. A deterministic **pre-filter** ([`prefilter`]) reduces the full
//!    catalog to a bounded candidate set using exact-code lookup,
//!    type-indexed retrieval ([`classify`]), and fuzzy similarity
//!    ([`similarity`]).
//! 2. An optional **AI re-ranking** stage ([`rerank`]) refines the
//!    candidate scores with semantic understanding; any provider failure
//!    degrades back to the pre-filter scores.
//!
//! The [`search::HybridMatcher`] blends both stages into a ranked
//! [`models::SearchResult`], and the [`analyzer::ProductAnalyzer`] turns
//! that result into a structured link-or-register decision, classifying
//! the category group and unit of measure for new registrations.
//!
//! This crate contains no HTTP clients, CLI, or configuration files.
//! External collaborators (the catalog REST API, AI providers) are
//! reached through the [`catalog::CatalogApi`] and [`rerank::AiProvider`]
//! traits; concrete bindings live in the `prodmatch` application crate.

pub mod analyzer;
pub mod catalog;
pub mod classify;
pub mod models;
pub mod normalize;
pub mod prefilter;
pub mod rerank;
pub mod search;
pub mod similarity;
