//! Kine Common Library
//!
//! Shared building blocks for the kine workspace: the rigid-body model
//! adapter consumed by the force observer and the Cartesian impedance
//! controller, system-wide constants, and TOML configuration loading.
//!
//! # Module Structure
//!
//! - [`model`] - `RigidBodyModel` adapter trait and model errors
//! - [`snapshot`] - `DynamicsSnapshot`, an owned per-cycle model adapter
//! - [`consts`] - Shared constants and defaults
//! - [`config`] - Session file loading (`ConfigLoader`, `SharedConfig`)
//! - [`prelude`] - Glob import of the items above
//!
//! # Usage
//!
//! ```rust
//! use kine_common::prelude::*;
//!
//! let snapshot = DynamicsSnapshot::new(2, "tip").unwrap();
//! assert_eq!(snapshot.nv(), 2);
//! ```

pub mod config;
pub mod consts;
pub mod model;
pub mod prelude;
pub mod snapshot;
