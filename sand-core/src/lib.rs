//! Core 3-D falling-sand simulation library.
//!
//! Main components:
//! - [`grid`] — dense occupancy grid, seeding and accessors.
//! - [`config`] — wind configuration and the per-direction scan policy.
//! - [`dynamics`] — the per-tick relaxation step and grain dropping.
//! - [`types`] — shared type aliases.

pub mod config;
pub mod dynamics;
pub mod grid;
pub mod types;
