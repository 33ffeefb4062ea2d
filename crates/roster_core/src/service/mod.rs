//! Roster use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls behind the roster controller.
//! - Keep front ends decoupled from storage details.

pub mod csv_export;
pub mod roster_controller;
