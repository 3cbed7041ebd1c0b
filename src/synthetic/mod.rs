//! Seeded synthetic data for demos and model training
//!
//! Two generators: per-visit EHR activity logs and per-stay clinical
//! admission records. Both are deterministic for a given seed, and both keep
//! the internal correlations plausible (severity raises blood pressure and
//! CRP, surgery lengthens the stay) so the KPI layer and the prediction
//! pipeline have something real to find.

pub mod activity;
pub mod admissions;

pub use activity::synthesize_events;
pub use admissions::synthesize_admissions;

use rand::Rng;
use rand::rngs::StdRng;

/// Draw from a normal distribution via the Box-Muller transform
pub(crate) fn sample_normal(rng: &mut StdRng, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + sd * z
}
