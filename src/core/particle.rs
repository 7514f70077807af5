use crate::core::bounds::Bounds;
use crate::error::{Error, Result};
use rand::Rng;

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// Scale from simulated motion to domain units per second of `delta_time`.
pub const MOTION_SCALE: f64 = 70.0;

/// Fraction of the energy gap moved from the hotter to the colder particle per collision.
pub const ENERGY_TRANSFER_FRACTION: f64 = 0.1;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);

    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// Display color for a mass: blue in `[0, 10]`, green in `(10, 20]`, red otherwise.
///
/// These bands are cosmetic and deliberately differ from the statistics
/// bands in [`crate::core::stats::MassBand`].
pub fn color_for_mass(mass: f64) -> Rgb {
    if (0.0..=10.0).contains(&mass) {
        Rgb::BLUE
    } else if mass > 10.0 && mass <= 20.0 {
        Rgb::GREEN
    } else {
        Rgb::RED
    }
}

/// Speed carried by `internal_energy` for a body of `mass`: sqrt(2 E / m).
#[inline]
pub fn speed_from_energy(internal_energy: f64, mass: f64) -> f64 {
    (2.0 * internal_energy / mass).sqrt()
}

/// A circular body with an internal-energy reservoir in D=2.
///
/// Fields:
/// - `mass`: fixed at creation (> 0)
/// - `position`: center [x, y]
/// - `radius`: collision and wall radius (> 0)
/// - `color`: derived from the mass via [`color_for_mass`]
/// - `direction`: heading, rescaled to magnitude `speed` by [`Particle::normalize_velocity`];
///   this vector is the particle's velocity in collision math
/// - `internal_energy`: scalar heat reservoir (>= 0)
/// - `speed`: sqrt(2 * internal_energy / mass), recomputed after every energy change
#[derive(Debug, Clone)]
pub struct Particle {
    /// Mass (> 0).
    pub mass: f64,
    /// Position (x, y).
    pub position: [f64; DIM],
    /// Radius (> 0).
    pub radius: f64,
    /// Mass-band color.
    pub color: Rgb,
    /// Heading scaled to `speed`.
    pub direction: [f64; DIM],
    /// Internal energy (>= 0).
    pub internal_energy: f64,
    /// Speed derived from `internal_energy`.
    pub speed: f64,
}

impl Particle {
    /// Create a particle with a random heading drawn uniformly from `[-1, 1]^2`.
    ///
    /// Errors: see [`Particle::with_direction`].
    pub fn new<R: Rng + ?Sized>(
        mass: f64,
        position: [f64; DIM],
        radius: f64,
        internal_energy: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let mut direction = [0.0_f64; DIM];
        direction
            .iter_mut()
            .for_each(|d| *d = rng.random_range(-1.0..=1.0));
        Self::with_direction(mass, position, radius, internal_energy, direction)
    }

    /// Create a particle with an explicit initial heading. Only the direction of
    /// `direction` matters; its magnitude is replaced by the energy-derived speed.
    ///
    /// Errors:
    /// - `Error::Domain` if `mass` or `radius` is non-positive, `internal_energy` is
    ///   negative, or any value is NaN/inf.
    pub fn with_direction(
        mass: f64,
        position: [f64; DIM],
        radius: f64,
        internal_energy: f64,
        direction: [f64; DIM],
    ) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::Domain("mass must be finite and > 0".into()));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::Domain("radius must be finite and > 0".into()));
        }
        if !internal_energy.is_finite() || internal_energy < 0.0 {
            return Err(Error::Domain(
                "internal energy must be finite and >= 0".into(),
            ));
        }
        if !position.iter().all(|x| x.is_finite()) {
            return Err(Error::Domain("position must be finite".into()));
        }
        if !direction.iter().all(|x| x.is_finite()) {
            return Err(Error::Domain("direction must be finite".into()));
        }
        let mut p = Self {
            mass,
            position,
            radius,
            color: color_for_mass(mass),
            direction,
            internal_energy,
            speed: speed_from_energy(internal_energy, mass),
        };
        p.normalize_velocity();
        Ok(p)
    }

    /// Rescale `direction` to unit length times `speed`.
    ///
    /// A zero (or NaN) norm leaves the heading untouched.
    pub fn normalize_velocity(&mut self) {
        let n = norm(&self.direction);
        if n > 0.0 {
            for d in &mut self.direction {
                *d = *d / n * self.speed;
            }
        }
    }

    /// Advance the particle by `delta_time` and reflect off the walls of `bounds`.
    ///
    /// A candidate position containing NaN is discarded. Reflection is checked on
    /// every call and per axis, inclusive at `radius` and `extent - radius`.
    pub fn integrate(&mut self, delta_time: f64, bounds: &Bounds) {
        let scale = self.speed * delta_time * MOTION_SCALE;
        let mut candidate = self.position;
        for (c, &d) in candidate.iter_mut().zip(self.direction.iter()) {
            *c += d * scale;
        }

        if candidate.iter().any(|c| c.is_nan()) {
            log::debug!(
                "discarding NaN position candidate; keeping {:?}",
                self.position
            );
        } else {
            self.position = candidate;
        }

        let extent = bounds.extent();
        for k in 0..DIM {
            let x = self.position[k];
            if x <= self.radius || x >= extent[k] - self.radius {
                self.direction[k] = -self.direction[k];
            }
        }

        self.normalize_velocity();
    }

    /// Resolve an overlap with `other`, exchanging internal energy and momentum.
    ///
    /// Returns `true` if the bodies overlapped and were approaching along the
    /// separation normal, i.e. an exchange took place.
    ///
    /// The exchange moves 10% of the energy gap to the colder body, rescales both
    /// energies back to the pre-exchange total, reflects both velocities with the
    /// unequal-mass elastic formula, then keeps only the direction of the
    /// reflected velocities: their magnitudes come from the new energies.
    pub fn resolve_collision(&mut self, other: &mut Particle) -> bool {
        let sep = sub(&self.position, &other.position);
        let distance = norm(&sep);
        if distance.is_nan() || distance >= self.radius + other.radius {
            return false;
        }
        if distance <= 0.0 {
            // Coincident centers have no separation normal.
            log::debug!("skipping collision between coincident particles");
            return false;
        }
        let n = scale(&sep, 1.0 / distance);

        let (v1, v2) = (self.direction, other.direction);
        let closing = dot(&sub(&v1, &v2), &n);
        if closing.is_nan() || closing >= 0.0 {
            return false;
        }

        let (e1, e2) = exchange_energy(self.internal_energy, other.internal_energy);
        self.internal_energy = e1;
        other.internal_energy = e2;
        self.speed = speed_from_energy(e1, self.mass);
        other.speed = speed_from_energy(e2, other.mass);

        let (m1, m2) = (self.mass, other.mass);
        let f1 = (2.0 * m2 / (m1 + m2)) * dot(&sub(&v1, &v2), &n);
        let f2 = (2.0 * m1 / (m1 + m2)) * dot(&sub(&v2, &v1), &n);
        for k in 0..DIM {
            self.direction[k] = v1[k] - f1 * n[k];
            other.direction[k] = v2[k] - f2 * n[k];
        }

        self.normalize_velocity();
        other.normalize_velocity();
        true
    }

    /// Current velocity vector (the heading scaled to `speed`).
    #[inline]
    pub fn velocity(&self) -> [f64; DIM] {
        self.direction
    }
}

/// Move a fraction of the energy gap from the higher to the lower value, then
/// rescale the pair so it sums to the original total. Results are clamped at 0.
fn exchange_energy(e1: f64, e2: f64) -> (f64, f64) {
    let total = e1 + e2;
    let (mut a, mut b) = if e1 > e2 {
        let delta = (e1 - e2) * ENERGY_TRANSFER_FRACTION;
        (e1 - delta, e2 + delta)
    } else {
        let delta = (e2 - e1) * ENERGY_TRANSFER_FRACTION;
        (e1 + delta, e2 - delta)
    };

    let new_total = a + b;
    if new_total > 0.0 && new_total.is_finite() {
        a = a / new_total * total;
        b = b / new_total * total;
    } else {
        log::debug!("skipping energy renormalization, post-transfer total {new_total}");
    }
    (a.max(0.0), b.max(0.0))
}

// ============ Vector helpers ============

#[inline]
pub(crate) fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
pub(crate) fn norm(a: &[f64; DIM]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn sub(a: &[f64; DIM], b: &[f64; DIM]) -> [f64; DIM] {
    let mut out = [0.0_f64; DIM];
    for (k, o) in out.iter_mut().enumerate() {
        *o = a[k] - b[k];
    }
    out
}

#[inline]
fn scale(a: &[f64; DIM], s: f64) -> [f64; DIM] {
    let mut out = *a;
    out.iter_mut().for_each(|x| *x *= s);
    out
}
