//! Use-case services on top of the storage contract.
//!
//! # Responsibility
//! - Orchestrate store calls into caller-facing operations.
//! - Stay backend-agnostic: services only see `Storage`.

pub mod catalog_service;
