//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the app (kernel-facing).
//! - `adapters`: OS/runtime specific implementations (tokio processes, settings file, documents).

#[cfg(feature = "tui")]
pub mod adapters;
pub mod ports;
