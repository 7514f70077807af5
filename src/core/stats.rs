use crate::core::Particle;
use crate::error::{Error, Result};
use ordered_float::NotNan;

/// Bin count used for before/after energy distributions.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Upper mass of the small band (inclusive).
pub const SMALL_MASS_MAX: f64 = 5.0;
/// Lower mass of the medium band (inclusive).
pub const MEDIUM_MASS_MIN: f64 = 5.0;
/// Upper mass of the medium band (inclusive).
pub const MEDIUM_MASS_MAX: f64 = 20.0;

/// Statistics mass band.
///
/// Small is tested first, so a mass of exactly 5 is small even though the
/// medium range also includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MassBand {
    Small,
    Medium,
    Large,
}

impl MassBand {
    pub fn classify(mass: f64) -> Self {
        if mass <= SMALL_MASS_MAX {
            MassBand::Small
        } else if (MEDIUM_MASS_MIN..=MEDIUM_MASS_MAX).contains(&mass) {
            MassBand::Medium
        } else {
            MassBand::Large
        }
    }
}

/// Particle indices grouped by [`MassBand`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandGroups {
    pub small: Vec<usize>,
    pub medium: Vec<usize>,
    pub large: Vec<usize>,
}

impl BandGroups {
    /// Partition `particles` by mass, preserving storage order within each band.
    pub fn from_particles(particles: &[Particle]) -> Self {
        let mut groups = Self::default();
        for (i, p) in particles.iter().enumerate() {
            match MassBand::classify(p.mass) {
                MassBand::Small => groups.small.push(i),
                MassBand::Medium => groups.medium.push(i),
                MassBand::Large => groups.large.push(i),
            }
        }
        groups
    }

    #[inline]
    pub fn band(&self, band: MassBand) -> &[usize] {
        match band {
            MassBand::Small => &self.small,
            MassBand::Medium => &self.medium,
            MassBand::Large => &self.large,
        }
    }

    /// Mean internal energy of the particles in `band`; `None` if the band is empty.
    pub fn mean_energy(&self, band: MassBand, particles: &[Particle]) -> Option<f64> {
        let idx = self.band(band);
        if idx.is_empty() {
            return None;
        }
        let sum: f64 = idx.iter().map(|&i| particles[i].internal_energy).sum();
        Some(sum / idx.len() as f64)
    }
}

/// Aggregate energy metrics recorded after one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
    pub total: f64,
    pub mean_small: Option<f64>,
    pub mean_medium: Option<f64>,
    pub mean_large: Option<f64>,
}

impl EnergySample {
    pub fn measure(particles: &[Particle], bands: &BandGroups) -> Self {
        Self {
            total: particles.iter().map(|p| p.internal_energy).sum(),
            mean_small: bands.mean_energy(MassBand::Small, particles),
            mean_medium: bands.mean_energy(MassBand::Medium, particles),
            mean_large: bands.mean_energy(MassBand::Large, particles),
        }
    }
}

/// Density-normalized histogram of energy values.
///
/// `edges` has `bins + 1` entries; `density[i] = count[i] / (n * width)`, so the
/// densities integrate to 1 over the range.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
    pub density: Vec<f64>,
}

impl EnergyHistogram {
    /// Bin `values` into `bins` equal-width bins spanning their min/max.
    ///
    /// A span too narrow to bin (all-equal values included) is widened by 0.5 on
    /// each side; empty input spans `[0, 1]` with zero densities.
    ///
    /// Errors: `Error::InvalidParam` if `bins == 0` or any value is NaN/inf.
    pub fn new(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidParam("bins must be > 0".into()));
        }
        let mut keyed = Vec::with_capacity(values.len());
        for &v in values {
            let v = NotNan::new(v)
                .map_err(|_| Error::InvalidParam("energy values cannot be NaN".into()))?;
            if v.is_infinite() {
                return Err(Error::InvalidParam("energy values must be finite".into()));
            }
            keyed.push(v);
        }

        let (mut lo, mut hi) = match (keyed.iter().min(), keyed.iter().max()) {
            (Some(lo), Some(hi)) => (lo.into_inner(), hi.into_inner()),
            _ => (0.0, 1.0),
        };
        let mut width = (hi - lo) / bins as f64;
        // Equal values, or a span too small to divide into bins.
        if width <= 0.0 {
            lo -= 0.5;
            hi += 0.5;
            width = (hi - lo) / bins as f64;
        }

        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0u64; bins];
        for v in &keyed {
            // The last bin is closed on the right.
            let mut b = ((v.into_inner() - lo) / width) as usize;
            if b >= bins {
                b = bins - 1;
            }
            counts[b] += 1;
        }

        let n = keyed.len() as f64;
        let density = counts
            .iter()
            .map(|&c| if n > 0.0 { c as f64 / (n * width) } else { 0.0 })
            .collect();

        Ok(Self {
            edges,
            counts,
            density,
        })
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(mass: f64, energy: f64) -> Particle {
        Particle::with_direction(mass, [0.0, 0.0], 1.0, energy, [1.0, 0.0]).unwrap()
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(MassBand::classify(1.0), MassBand::Small);
        assert_eq!(MassBand::classify(5.0), MassBand::Small);
        assert_eq!(MassBand::classify(5.0001), MassBand::Medium);
        assert_eq!(MassBand::classify(20.0), MassBand::Medium);
        assert_eq!(MassBand::classify(20.0001), MassBand::Large);
    }

    #[test]
    fn band_means() {
        let ps = vec![body(2.0, 1.0), body(12.0, 4.0), body(3.0, 3.0), body(25.0, 9.0)];
        let groups = BandGroups::from_particles(&ps);
        assert_eq!(groups.small, vec![0, 2]);
        assert_eq!(groups.medium, vec![1]);
        assert_eq!(groups.large, vec![3]);

        let s = EnergySample::measure(&ps, &groups);
        assert!((s.total - 17.0).abs() < 1e-12);
        assert_eq!(s.mean_small, Some(2.0));
        assert_eq!(s.mean_medium, Some(4.0));
        assert_eq!(s.mean_large, Some(9.0));
    }

    #[test]
    fn empty_band_has_no_mean() {
        let ps = vec![body(2.0, 1.0)];
        let groups = BandGroups::from_particles(&ps);
        assert_eq!(groups.mean_energy(MassBand::Large, &ps), None);
    }

    #[test]
    fn histogram_density_integrates_to_one() -> Result<()> {
        let values = [0.0, 0.5, 1.0, 1.5, 3.5, 4.0];
        let h = EnergyHistogram::new(&values, 4)?;
        assert_eq!(h.edges.len(), 5);
        assert_eq!(h.counts, vec![2, 2, 0, 2]);
        let area: f64 = h
            .density
            .iter()
            .zip(h.edges.windows(2))
            .map(|(d, e)| d * (e[1] - e[0]))
            .sum();
        assert!((area - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn histogram_degenerate_ranges() -> Result<()> {
        let h = EnergyHistogram::new(&[3.0, 3.0], 2)?;
        assert_eq!(h.edges, vec![2.5, 3.0, 3.5]);
        assert_eq!(h.counts, vec![0, 2]);

        let h = EnergyHistogram::new(&[], 3)?;
        assert_eq!(h.counts, vec![0, 0, 0]);
        assert!(h.density.iter().all(|&d| d == 0.0));
        Ok(())
    }

    #[test]
    fn histogram_subnormal_span_stays_finite() -> Result<()> {
        let h = EnergyHistogram::new(&[0.0, 5e-324], 30)?;
        assert_eq!(h.counts.iter().sum::<u64>(), 2);
        assert!(h.density.iter().all(|d| d.is_finite()));
        assert!(h.edges.windows(2).all(|e| e[1] > e[0]));
        Ok(())
    }

    #[test]
    fn histogram_rejects_bad_input() {
        assert!(EnergyHistogram::new(&[1.0], 0).is_err());
        let err = EnergyHistogram::new(&[1.0, f64::NAN], 3).unwrap_err();
        assert!(err.to_string().contains("NaN"));
        let err = EnergyHistogram::new(&[f64::INFINITY], 3).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }
}
