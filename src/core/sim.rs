use crate::config::{CollisionPolicy, SimConfig};
use crate::core::particle::{Rgb, DIM};
use crate::core::stats::{BandGroups, EnergyHistogram, EnergySample};
use crate::core::{Bounds, Particle};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Read-only per-particle data for a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub position: [f64; DIM],
    pub radius: f64,
    pub color: Rgb,
}

/// Simulation domain: a fixed set of particles in a static rectangle with
/// reflecting walls, stepped by an externally supplied `delta_time`.
///
/// Each step moves every particle, resolves every overlapping pair according to
/// the [`CollisionPolicy`], then records an [`EnergySample`].
#[derive(Debug)]
pub struct Simulation {
    time_now: f64,
    steps: u64,
    bounds: Bounds,
    timestep: f64,
    policy: CollisionPolicy,
    particles: Vec<Particle>,
    bands: BandGroups,
    history: Vec<EnergySample>,
    initial_energies: Vec<f64>,
}

impl Simulation {
    /// Create a new simulation with `num_particles` randomly generated particles
    /// inside `bounds`, using the default generation ranges and policy.
    ///
    /// `seed` makes the run reproducible; `None` seeds from the thread RNG.
    pub fn new(
        num_particles: usize,
        bounds: Bounds,
        timestep: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        let defaults = SimConfig::default();
        let mut rng = seeded_rng(seed);
        let particles = create_particles(
            num_particles,
            &bounds,
            defaults.mass_range(),
            defaults.radius_range(),
            &mut rng,
        )?;
        Self::from_particles(bounds, timestep, particles)
    }

    /// Create a simulation from a validated [`SimConfig`].
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        config.validate()?;
        let bounds = Bounds::new(config.width, config.height)?;
        let mut rng = seeded_rng(config.seed);
        let particles = create_particles(
            config.num_particles,
            &bounds,
            config.mass_range(),
            config.radius_range(),
            &mut rng,
        )?;
        let mut sim = Self::from_particles(bounds, config.timestep, particles)?;
        sim.policy = config.collision_policy;
        Ok(sim)
    }

    /// Create a simulation from explicit particles.
    ///
    /// The mass-band snapshot and the initial energy distribution are taken here.
    pub fn from_particles(bounds: Bounds, timestep: f64, particles: Vec<Particle>) -> Result<Self> {
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(Error::InvalidParam("timestep must be finite and > 0".into()));
        }
        let bands = BandGroups::from_particles(&particles);
        let initial_energies = particles.iter().map(|p| p.internal_energy).collect();
        log::info!(
            "simulation ready: {} particles ({} small, {} medium, {} large) in {}x{}",
            particles.len(),
            bands.small.len(),
            bands.medium.len(),
            bands.large.len(),
            bounds.width(),
            bounds.height()
        );
        Ok(Self {
            time_now: 0.0,
            steps: 0,
            bounds,
            timestep,
            policy: CollisionPolicy::default(),
            particles,
            bands,
            history: Vec::new(),
            initial_energies,
        })
    }

    /// Returns accumulated simulated time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Particles in storage order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to particle state. The collection itself cannot be resized:
    /// the band snapshot indexes into it.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Nominal seconds per step used by [`Simulation::step_nominal`].
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn set_collision_policy(&mut self, policy: CollisionPolicy) {
        self.policy = policy;
    }

    /// Advance the simulation by `delta_time` seconds.
    ///
    /// Particles are mutated in place: a pair resolved later in the same step
    /// sees whatever an earlier resolution left behind.
    pub fn step(&mut self, delta_time: f64) -> Result<()> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(Error::InvalidParam(
                "delta_time must be finite and >= 0".into(),
            ));
        }

        for p in &mut self.particles {
            p.integrate(delta_time, &self.bounds);
        }

        let n = self.particles.len();
        let mut resolved = 0usize;
        for i in 0..n {
            let start = match self.policy {
                CollisionPolicy::ResolveBothOrders => 0,
                CollisionPolicy::ResolveOnce => i + 1,
            };
            for j in start..n {
                if i == j {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.particles, i, j);
                if a.resolve_collision(b) {
                    resolved += 1;
                }
            }
        }

        self.history
            .push(EnergySample::measure(&self.particles, &self.bands));
        self.time_now += delta_time;
        self.steps += 1;
        log::trace!(
            "step {} dt={} resolved {} collisions",
            self.steps,
            delta_time,
            resolved
        );
        Ok(())
    }

    /// Advance by the nominal timestep.
    pub fn step_nominal(&mut self) -> Result<()> {
        self.step(self.timestep)
    }

    /// Group the current particles by statistics mass band.
    pub fn classify(&self) -> BandGroups {
        BandGroups::from_particles(&self.particles)
    }

    /// Mass-band snapshot taken at construction, used for the energy series.
    pub fn bands(&self) -> &BandGroups {
        &self.bands
    }

    /// Sum of all internal energies.
    pub fn total_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.internal_energy).sum()
    }

    /// Internal energies in storage order.
    pub fn energy_snapshot(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.internal_energy).collect()
    }

    /// Internal energies at construction, in storage order.
    pub fn initial_energies(&self) -> &[f64] {
        &self.initial_energies
    }

    /// Energy metrics recorded after each step.
    pub fn history(&self) -> &[EnergySample] {
        &self.history
    }

    /// Position, radius and color of every particle.
    pub fn render_snapshot(&self) -> Vec<ParticleView> {
        self.particles
            .iter()
            .map(|p| ParticleView {
                position: p.position,
                radius: p.radius,
                color: p.color,
            })
            .collect()
    }

    /// Histograms of the initial and current energy distributions.
    pub fn energy_histograms(&self, bins: usize) -> Result<(EnergyHistogram, EnergyHistogram)> {
        let before = EnergyHistogram::new(&self.initial_energies, bins)?;
        let after = EnergyHistogram::new(&self.energy_snapshot(), bins)?;
        Ok((before, after))
    }
}

// ============ Internal helpers ============

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    }
}

/// Generate `num_particles` particles with uniformly drawn mass, radius and
/// position. Positions span the whole domain; no wall margin is enforced.
/// Initial energy is `0.5 * m * |v|^2` for `v` drawn from `[-1, 1]^2`.
fn create_particles<R: Rng + ?Sized>(
    num_particles: usize,
    bounds: &Bounds,
    mass_range: RangeInclusive<f64>,
    radius_range: RangeInclusive<f64>,
    rng: &mut R,
) -> Result<Vec<Particle>> {
    let mut particles = Vec::with_capacity(num_particles);
    for _ in 0..num_particles {
        let mass = rng.random_range(mass_range.clone());
        let radius = rng.random_range(radius_range.clone());
        let mut r = [0.0_f64; DIM];
        for (r_k, &l) in r.iter_mut().zip(bounds.extent().iter()) {
            *r_k = rng.random_range(0.0..=l);
        }
        let mut v = [0.0_f64; DIM];
        v.iter_mut().for_each(|x| *x = rng.random_range(-1.0..=1.0));
        let v_sq: f64 = v.iter().map(|c| c * c).sum();
        let energy = 0.5 * mass * v_sq;

        particles.push(Particle::new(mass, r, radius, energy, rng)?);
    }
    Ok(particles)
}

/// Two distinct mutable borrows into `particles`, in `(i, j)` order.
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = particles.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = particles.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::{norm, speed_from_energy};

    fn arena() -> Result<Bounds> {
        Bounds::new(800.0, 600.0)
    }

    #[test]
    fn make_small_sim_ok() -> Result<()> {
        let mut sim = Simulation::new(20, arena()?, 0.02, Some(1234))?;
        assert_eq!(sim.num_particles(), 20);
        assert!(sim.total_energy().is_finite());
        sim.step(0.016)?;
        assert_eq!(sim.steps(), 1);
        assert!((sim.time() - 0.016).abs() < 1e-12);
        assert_eq!(sim.history().len(), 1);
        Ok(())
    }

    #[test]
    fn generated_particles_respect_ranges() -> Result<()> {
        let sim = Simulation::new(200, arena()?, 0.02, Some(9))?;
        for p in sim.particles() {
            assert!((1.0..=30.0).contains(&p.mass));
            assert!((5.0..=20.0).contains(&p.radius));
            assert!((0.0..=800.0).contains(&p.position[0]));
            assert!((0.0..=600.0).contains(&p.position[1]));
            // |v|^2 <= 2 => E <= m
            assert!(p.internal_energy >= 0.0 && p.internal_energy <= p.mass);
            assert!((norm(&p.direction) - p.speed).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn pair_mut_orders_borrows() -> Result<()> {
        let mut ps = vec![
            Particle::with_direction(1.0, [0.0, 0.0], 1.0, 1.0, [1.0, 0.0])?,
            Particle::with_direction(2.0, [0.0, 0.0], 1.0, 1.0, [1.0, 0.0])?,
            Particle::with_direction(3.0, [0.0, 0.0], 1.0, 1.0, [1.0, 0.0])?,
        ];
        let (a, b) = pair_mut(&mut ps, 2, 0);
        assert_eq!((a.mass, b.mass), (3.0, 1.0));
        let (a, b) = pair_mut(&mut ps, 0, 1);
        assert_eq!((a.mass, b.mass), (1.0, 2.0));
        Ok(())
    }

    #[test]
    fn particle_edits_keep_collection_size() -> Result<()> {
        let mut sim = Simulation::new(10, arena()?, 0.02, Some(6))?;
        for p in sim.particles_mut().iter_mut() {
            p.internal_energy = 2.0;
            p.speed = speed_from_energy(p.internal_energy, p.mass);
            p.normalize_velocity();
        }
        sim.step_nominal()?;
        assert_eq!(sim.particles().len(), 10);
        let s = sim.history()[0];
        assert!((s.total - sim.total_energy()).abs() < 1e-9);
        assert_eq!(sim.initial_energies().len(), sim.num_particles());
        Ok(())
    }

    #[test]
    fn invalid_delta_time_rejected() -> Result<()> {
        let mut sim = Simulation::new(3, arena()?, 0.02, Some(5))?;
        assert!(sim.step(f64::NAN).is_err());
        assert!(sim.step(-0.1).is_err());
        assert_eq!(sim.steps(), 0);
        Ok(())
    }

    #[test]
    fn invalid_timestep_rejected() -> Result<()> {
        let err = Simulation::new(3, arena()?, 0.0, Some(5)).unwrap_err();
        assert!(err.to_string().contains("timestep"));
        Ok(())
    }

    #[test]
    fn empty_simulation_steps() -> Result<()> {
        let mut sim = Simulation::new(0, arena()?, 0.02, Some(5))?;
        sim.step_nominal()?;
        let s = sim.history()[0];
        assert_eq!(s.total, 0.0);
        assert_eq!(s.mean_small, None);
        Ok(())
    }

    #[test]
    fn band_snapshot_matches_classify() -> Result<()> {
        let mut sim = Simulation::new(40, arena()?, 0.02, Some(77))?;
        for _ in 0..10 {
            sim.step_nominal()?;
        }
        assert_eq!(sim.bands(), &sim.classify());
        let b = sim.bands();
        assert_eq!(b.small.len() + b.medium.len() + b.large.len(), 40);
        Ok(())
    }
}
