//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into one method per roster action.
//! - Keep CLI callers decoupled from storage details.

pub mod roster_service;
