//! SEPHI — Statistical-likelihood Exo-Planetary Habitability Index.
//!
//! Geometric mean of four likelihoods:
//!
//! | Term | Meaning |
//! |------|---------|
//! | L1 | telluric (rocky) mass-radius fit |
//! | L2 | atmosphere retention via escape velocity |
//! | L3 | liquid water from insolation distance (Kopparapu fluxes) |
//! | L4 | magnetic moment proxy, penalized by tidal locking |
//!
//! Unlike ESI and PHI there is no partial aggregation: a single missing or
//! non-positive input makes SEPHI undetermined.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::{earth, kopparapu, physics, sun};
use crate::error::MissingInputError;
use crate::params::{ParamKey, ParameterRecord};

/// Inputs, all strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SephiInputs {
    /// Earth masses.
    pub mass: f64,
    /// Earth radii.
    pub radius: f64,
    /// Days.
    pub period: f64,
    /// Solar masses.
    pub stellar_mass: f64,
    /// Solar radii.
    pub stellar_radius: f64,
    /// K.
    pub stellar_teff: f64,
    /// Gyr.
    pub age: f64,
    /// g/cm³.
    pub density: f64,
}

const REQUIRED: [ParamKey; 8] = [
    ParamKey::Mass,
    ParamKey::Radius,
    ParamKey::OrbitalPeriod,
    ParamKey::StellarMass,
    ParamKey::StellarRadius,
    ParamKey::StellarTemp,
    ParamKey::StellarAge,
    ParamKey::Density,
];

impl SephiInputs {
    pub fn from_record(record: &ParameterRecord) -> Result<Self, MissingInputError> {
        let mut v = [0.0; 8];
        for (slot, key) in v.iter_mut().zip(REQUIRED) {
            *slot = record
                .number(key)
                .filter(|x| *x > 0.0)
                .ok_or_else(|| MissingInputError::new("SEPHI", key.column()))?;
        }
        let [mass, radius, period, stellar_mass, stellar_radius, stellar_teff, age, density] = v;
        Ok(Self {
            mass,
            radius,
            period,
            stellar_mass,
            stellar_radius,
            stellar_teff,
            age,
            density,
        })
    }
}

/// SEPHI and its four likelihoods, as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SephiScore {
    pub total: f64,
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,
}

fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-0.5 * ((x - mu) / sigma).powi(2)).exp()
}

/// `(b - a) / 3`, or 0.1 when that would be zero.
fn spread(a: f64, b: f64) -> f64 {
    let s = (b - a) / 3.0;
    if s == 0.0 {
        0.1
    } else {
        s
    }
}

fn effective_flux(coeff: [f64; 5], teff: f64) -> f64 {
    let t = teff - kopparapu::T_REF;
    let [s, a, b, c, d] = coeff;
    s + a * t + b * t.powi(2) + c * t.powi(3) + d * t.powi(4)
}

fn flux_distance(luminosity: f64, s_eff: f64) -> f64 {
    if s_eff > 0.0 {
        (luminosity / s_eff).sqrt()
    } else {
        0.0
    }
}

/// L1: likelihood of a telluric composition.
fn telluric(i: &SephiInputs) -> f64 {
    let mu1 = i.mass.powf(0.27);
    let mu2 = i.mass.powf(0.5);
    let sigma = spread(mu1, mu2);
    if i.radius <= mu1 {
        1.0
    } else if i.radius < mu2 {
        gaussian(i.radius, mu1, sigma)
    } else {
        0.0
    }
}

/// L2: atmosphere retention from escape velocity relative to Earth.
fn atmosphere(i: &SephiInputs) -> f64 {
    let earth_ve = (earth::MASS / earth::RADIUS.powi(2) * earth::RADIUS).sqrt();
    let gravity = i.mass / i.radius.powi(2);
    let ve = (gravity * i.radius).sqrt() / earth_ve;
    let (below, above) = (spread(0.0, 1.0), spread(1.0, 8.66));
    if ve < 1.0 {
        gaussian(ve, 1.0, below)
    } else {
        gaussian(ve, 1.0, above)
    }
}

/// Semi-major axis (AU) from the orbital period.
fn kepler_distance(i: &SephiInputs) -> f64 {
    let m = i.stellar_mass * sun::MASS_KG;
    let p = i.period * physics::SECONDS_PER_DAY;
    (physics::G * m * p.powi(2) / (4.0 * PI.powi(2))).cbrt() * physics::AU_PER_METER
}

/// L3: liquid-water likelihood. Returns the likelihood and the orbit used.
fn liquid_water(i: &SephiInputs) -> (f64, f64) {
    let lum = i.stellar_radius.powi(2) * (i.stellar_teff / sun::DEFAULT_TEFF).powi(4);
    let t = i.stellar_teff;
    let d1 = flux_distance(lum, effective_flux(kopparapu::RECENT_VENUS, t)) * kopparapu::INNER_SCALE;
    let d2 = flux_distance(lum, effective_flux(kopparapu::RUNAWAY_GREENHOUSE, t));
    let d3 = flux_distance(lum, effective_flux(kopparapu::MAXIMUM_GREENHOUSE, t));
    let d4 = flux_distance(lum, effective_flux(kopparapu::EARLY_MARS, t)) * kopparapu::OUTER_SCALE;
    let a = kepler_distance(i);

    let l3 = if (d2..=d3).contains(&a) {
        1.0
    } else if a < d2 {
        if a < d1 {
            0.0
        } else {
            gaussian(a, d2, spread(d1, d2))
        }
    } else if a > d4 {
        0.0
    } else {
        gaussian(a, d3, spread(d3, d4))
    };
    (l3, a)
}

/// L4: magnetic moment proxy.
fn magnetic(i: &SephiInputs, l1: f64, a: f64) -> f64 {
    let age = i.age / 10.0;
    let a_lock = i.stellar_mass.cbrt()
        * (i.density / earth::DENSITY).powf(-1.0 / 3.0)
        * age.powf(1.0 / 6.0)
        * 0.06;
    let tidally_locked = a <= a_lock;
    let r = i.radius;
    let (rho, r0, flux, alpha): (f64, f64, f64, f64) = if l1 > 0.5 {
        (1.0, r, r, if tidally_locked { 0.05 } else { 1.0 })
    } else if r <= 5.0 {
        (0.45, 1.8 * r, 4.0 * r, 1.0)
    } else if r <= 15.0 {
        (0.18, 4.8 * r, 20.0 * r, 1.0)
    } else {
        (0.16, 16.0 * r, 100.0 * r, 1.0)
    };
    let moment = alpha * rho.sqrt() * r0.powf(10.0 / 3.0) * flux.cbrt();
    if moment >= 1.0 {
        1.0
    } else {
        gaussian(moment, 1.0, spread(0.0, 1.0))
    }
}

pub fn sephi(i: &SephiInputs) -> SephiScore {
    let l1 = telluric(i);
    let l2 = atmosphere(i);
    let (l3, a) = liquid_water(i);
    let l4 = magnetic(i, l1, a);
    let product = l1 * l2 * l3 * l4;
    let total = if product > 0.0 { product.powf(0.25) } else { 0.0 };
    log::debug!(
        "SEPHI {:.2} (L1 {:.1}, L2 {:.1}, L3 {:.1}, L4 {:.1})",
        total * 100.0,
        l1 * 100.0,
        l2 * 100.0,
        l3 * 100.0,
        l4 * 100.0
    );
    SephiScore {
        total: total * 100.0,
        l1: l1 * 100.0,
        l2: l2 * 100.0,
        l3: l3 * 100.0,
        l4: l4 * 100.0,
    }
}

/// SEPHI for a resolved record, or why it is undetermined.
pub fn sephi_for(record: &ParameterRecord) -> Result<SephiScore, MissingInputError> {
    SephiInputs::from_record(record).map(|i| sephi(&i))
}
