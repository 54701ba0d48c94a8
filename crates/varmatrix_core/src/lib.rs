//! Provide the canonical variant vocabulary and pure formatting helpers for the varmatrix runner.
//!
//! This crate is intentionally small and dependency-free. It contains the deterministic pieces that both:
//! - the catalog builder uses to turn a variant kind into the fixed leading tokens of a tool invocation, and
//! - the CLI uses to list variants and format storage connection strings.
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global state, and no process or runner types.
//! - Registry order is significant: downstream reports and override keys refer to variants by their position and
//!   name, so [`variants::VARIANTS`] must never be re-sorted.

pub mod connection;
pub mod variants;

pub use connection::{EMULATOR_HOST, connection_string, is_emulator_endpoint};
pub use variants::{VariantInfo, VariantKind};
