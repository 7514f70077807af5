use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::{CollisionPolicy, SimConfig};
use crate::core::particle::DIM;
use crate::core::stats::{EnergyHistogram, DEFAULT_HISTOGRAM_BINS};
use crate::core::Simulation;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_policy(name: &str) -> PyResult<CollisionPolicy> {
    match name {
        "both" | "resolve_both_orders" => Ok(CollisionPolicy::ResolveBothOrders),
        "once" | "resolve_once" => Ok(CollisionPolicy::ResolveOnce),
        other => Err(py_err(format!(
            "unknown collision policy '{other}', expected 'both' or 'once'"
        ))),
    }
}

fn histogram_dict<'py>(py: Python<'py>, h: EnergyHistogram) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new(py);
    out.set_item("edges", Array1::from_vec(h.edges).into_pyarray(py))?;
    out.set_item("density", Array1::from_vec(h.density).into_pyarray(py))?;
    out.set_item("counts", Array1::from_vec(h.counts).into_pyarray(py))?;
    Ok(out)
}

/// HeatSim Python-facing wrapper around the Rust Simulation core.
///
/// - __new__(num_particles, width=800, height=600, timestep=0.02, seed=None, policy="both")
/// - step(delta_time) / step_nominal()
/// - get_positions() -> (N, 2), get_radii() -> (N,), get_colors() -> (N, 3) uint8
/// - get_energy_history() -> (M, 4): total, mean small, mean medium, mean large
#[pyclass]
pub struct HeatSim {
    sim: Simulation,
}

#[pymethods]
impl HeatSim {
    /// Initialize a new simulation with randomly generated particles.
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        num_particles,
        width=800.0,
        height=600.0,
        timestep=0.02,
        seed=None,
        policy="both"
    ))]
    fn new(
        num_particles: usize,
        width: f64,
        height: f64,
        timestep: f64,
        seed: Option<u64>,
        policy: &str,
    ) -> PyResult<Self> {
        let cfg = SimConfig {
            width,
            height,
            num_particles,
            timestep,
            seed,
            collision_policy: parse_policy(policy)?,
            ..SimConfig::default()
        };
        let sim = Simulation::from_config(&cfg).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Advance by `delta_time` seconds (releases the GIL during computation).
    fn step(&mut self, py: Python<'_>, delta_time: f64) -> PyResult<()> {
        py.detach(|| self.sim.step(delta_time)).map_err(py_err)
    }

    /// Advance by the nominal timestep.
    fn step_nominal(&mut self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.sim.step_nominal()).map_err(py_err)
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.sim.particles().iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.position[k];
            }
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return radii as a NumPy array of shape (N,).
    fn get_radii<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        let radii: Vec<f64> = self.sim.particles().iter().map(|p| p.radius).collect();
        Ok(Array1::from_vec(radii).into_pyarray(py).to_owned().into())
    }

    /// Return colors as a NumPy array of shape (N, 3), dtype=uint8.
    fn get_colors<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<u8>>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<u8>::zeros((n, 3));
        for (i, view) in self.sim.render_snapshot().iter().enumerate() {
            for (k, c) in view.color.to_array().into_iter().enumerate() {
                arr[[i, k]] = c;
            }
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Current internal energies, shape (N,).
    fn get_energies<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        let e = self.sim.energy_snapshot();
        Ok(Array1::from_vec(e).into_pyarray(py).to_owned().into())
    }

    /// Internal energies at construction, shape (N,).
    fn get_initial_energies<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        let e = self.sim.initial_energies().to_vec();
        Ok(Array1::from_vec(e).into_pyarray(py).to_owned().into())
    }

    /// Per-step energy series as (M, 4); empty bands report NaN.
    fn get_energy_history<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let history = self.sim.history();
        let mut arr = Array2::<f64>::zeros((history.len(), 4));
        for (i, s) in history.iter().enumerate() {
            arr[[i, 0]] = s.total;
            arr[[i, 1]] = s.mean_small.unwrap_or(f64::NAN);
            arr[[i, 2]] = s.mean_medium.unwrap_or(f64::NAN);
            arr[[i, 3]] = s.mean_large.unwrap_or(f64::NAN);
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Sum of all internal energies.
    fn total_energy(&self) -> f64 {
        self.sim.total_energy()
    }

    /// Number of completed steps.
    fn steps(&self) -> u64 {
        self.sim.steps()
    }

    /// Before/after energy histograms.
    ///
    /// Returns: dict {"initial": {...}, "final": {...}} with "edges", "density", "counts".
    #[pyo3(signature = (bins=DEFAULT_HISTOGRAM_BINS))]
    fn get_energy_histograms<'py>(&self, py: Python<'py>, bins: usize) -> PyResult<Py<PyDict>> {
        let (before, after) = self.sim.energy_histograms(bins).map_err(py_err)?;
        let out = PyDict::new(py);
        out.set_item("initial", histogram_dict(py, before)?)?;
        out.set_item("final", histogram_dict(py, after)?)?;
        Ok(out.into())
    }
}

/// The heatsim Python module entry point.
#[pymodule]
fn heatsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<HeatSim>()?;
    Ok(())
}
