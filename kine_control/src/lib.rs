//! # kine Control Library
//!
//! Contact estimation and Cartesian impedance primitives for articulated
//! robots, driven once per control cycle from a [`RigidBodyModel`] adapter.
//!
//! ## Components
//!
//! 1. **MomentumObserver**: external joint efforts from generalized momentum,
//!    mapped to a contact wrench on a chosen frame
//! 2. **TrapezoidalIntegrator**: sliding-window trapezoidal integral
//! 3. **CartesianTask**: reference pose/twist/acceleration and task errors
//! 4. **CartesianImpController**: operational-space inertia and impedance wrench
//!
//! ## Cycle Contract
//!
//! The host refreshes the model first, then runs each dependent `update`
//! with the model passed by reference. Every structure is sized at
//! construction; the observer update reuses its scratch buffers.
//!
//! [`RigidBodyModel`]: kine_common::model::RigidBodyModel

pub mod cartesian;
pub mod config;
pub mod error;
pub mod estimation;
pub mod linalg;

pub use cartesian::impedance::{CartesianImpController, Impedance};
pub use cartesian::task::{CartesianTask, TaskReference};
pub use config::{ControlConfig, ImpedanceConfig, ObserverConfig, load_config, load_config_from_str};
pub use error::KineError;
pub use estimation::integrator::TrapezoidalIntegrator;
pub use estimation::observer::MomentumObserver;
pub use estimation::selector::{Selector, WrenchAxes};
