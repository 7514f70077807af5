//! Core simulation data structures for heatsim.
//!
//! [`Particle`] owns the per-body kernel (integration, wall reflection,
//! pairwise energy and momentum exchange); [`Simulation`] owns the particle
//! set, steps it and records energy statistics.

pub mod bounds;
pub mod particle;
pub mod sim;
pub mod stats;

pub use bounds::Bounds;
pub use particle::{Particle, Rgb};
pub use sim::{ParticleView, Simulation};
pub use stats::{BandGroups, EnergyHistogram, EnergySample, MassBand};
