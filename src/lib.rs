//! Squad Guessr (workspace facade crate).
//!
//! Exposes `squad_guessr::{types, core, adapter}` while the implementation
//! lives in dedicated crates under `crates/`.

pub use squad_guessr_adapter as adapter;
pub use squad_guessr_core as core;
pub use squad_guessr_types as types;
