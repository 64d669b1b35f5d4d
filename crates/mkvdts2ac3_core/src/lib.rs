//! mkvdts2ac3 core - backend logic for converting DTS audio tracks inside
//! Matroska containers to AC-3.
//!
//! This crate contains all decision logic with no terminal dependencies:
//! - Track catalog parsing (`extraction`)
//! - Selection policy resolution (`selection`)
//! - Conversion and remux planning (`convert`, `mux`)
//! - The per-file pipeline and batch driver (`orchestrator`)
//!
//! The actual audio work is delegated to external tools (mkvmerge,
//! mkvextract, dcadec, aften); this crate only plans and sequences their
//! invocations.

pub mod config;
pub mod convert;
pub mod extraction;
pub mod logging;
pub mod models;
pub mod mux;
pub mod orchestrator;
pub mod selection;
pub mod tools;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
