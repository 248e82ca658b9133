//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and query-layer calls into one caller surface.
//! - Keep binaries and embedders decoupled from storage details.

pub mod discourse_service;
