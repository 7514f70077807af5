//! heatsim: a 2D simulator of circular bodies that bounce off the walls of a
//! rectangle and exchange momentum and internal energy when they overlap.
//!
//! The crate is the physics core only. A presentation layer drives
//! [`Simulation::step`] once per frame with its own `delta_time` and reads
//! back [`Simulation::render_snapshot`], [`Simulation::history`] and the
//! energy distributions.
//!
//! ```
//! use heatsim::{Bounds, Simulation};
//!
//! let mut sim = Simulation::new(50, Bounds::new(800.0, 600.0)?, 0.02, Some(7))?;
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0)?;
//! }
//! assert_eq!(sim.history().len(), 60);
//! # Ok::<(), heatsim::error::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::{CollisionPolicy, SimConfig};
pub use crate::core::{
    BandGroups, Bounds, EnergyHistogram, EnergySample, MassBand, Particle, ParticleView, Rgb,
    Simulation,
};
