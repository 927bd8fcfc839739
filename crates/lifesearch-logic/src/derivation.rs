//! Derived physical quantities — equilibrium temperature, mass from radius,
//! luminosity, habitable-zone edges, and travel times.
//!
//! The free functions are pure; [`fill_gaps`] applies them to a record in
//! dependency order, writing only into fields no source supplied.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::classification::Classification;
use crate::constants::{derivation as coeff, physics, sun, travel};
use crate::error::MissingInputError;
use crate::params::{ParamKey, ParamValue, ParameterRecord, Provenance};

/// log10(L / L_sun) from stellar radius (R_sun) and temperature (K).
pub fn log_luminosity(stellar_radius: f64, stellar_teff: f64) -> Option<f64> {
    if stellar_radius <= 0.0 || stellar_teff <= 0.0 {
        return None;
    }
    let l = stellar_radius.powi(2) * (stellar_teff / sun::DEFAULT_TEFF).powi(4);
    Some(l.log10())
}

/// Semi-major axis (AU) from Kepler's third law.
pub fn semi_major_axis(period_days: f64, stellar_mass: f64) -> Option<f64> {
    if period_days <= 0.0 || stellar_mass <= 0.0 {
        return None;
    }
    let m = stellar_mass * sun::MASS_KG;
    let p = period_days * physics::SECONDS_PER_DAY;
    let a_m = (physics::G * m * p.powi(2) / (4.0 * PI.powi(2))).cbrt();
    Some(a_m * physics::AU_PER_METER)
}

/// Equilibrium temperature (K) at Bond albedo 0.3.
///
/// Unknown stellar temperature and radius default to solar values; the
/// semi-major axis is required.
pub fn equilibrium_temperature(
    stellar_teff: Option<f64>,
    stellar_radius: Option<f64>,
    semi_major_axis: Option<f64>,
) -> Result<f64, MissingInputError> {
    let a = semi_major_axis
        .filter(|a| *a > 0.0)
        .ok_or_else(|| MissingInputError::new("equilibrium temperature", "pl_orbsmax"))?;
    let t = stellar_teff.filter(|t| *t > 0.0).unwrap_or(sun::DEFAULT_TEFF);
    let r = stellar_radius.filter(|r| *r > 0.0).unwrap_or(sun::DEFAULT_RADIUS);
    let r_au = r * sun::RADIUS_AU;
    Ok(t * (r_au / (2.0 * a)).sqrt() * (1.0 - coeff::ALBEDO).powf(0.25))
}

/// Mass (Earth masses) estimated from radius (Earth radii).
pub fn estimate_mass(radius: f64) -> Option<f64> {
    if radius.is_nan() || radius <= 0.0 {
        return None;
    }
    let exp = if radius < coeff::ROCKY_RADIUS_LIMIT {
        coeff::ROCKY_MASS_EXPONENT
    } else {
        coeff::GASEOUS_MASS_EXPONENT
    };
    Some(radius.powf(exp))
}

/// Bulk density (g/cm³) from mass and radius in Earth units.
pub fn bulk_density(mass: f64, radius: f64) -> Option<f64> {
    if mass <= 0.0 || radius <= 0.0 {
        return None;
    }
    Some(crate::constants::earth::DENSITY * mass / radius.powi(3))
}

/// Where habitable-zone edges came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HzSource {
    Catalog,
    Derived,
}

/// Habitable-zone edges in AU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitableZone {
    pub optimistic_inner: f64,
    pub conservative_inner: f64,
    pub conservative_outer: f64,
    pub optimistic_outer: f64,
    pub source: HzSource,
}

/// Where an orbit sits relative to the habitable zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HzPosition {
    Conservative,
    Optimistic,
    Outside,
}

impl HabitableZone {
    /// Edges from log luminosity via the effective-flux approximation.
    pub fn from_log_luminosity(log_lum: f64) -> Self {
        let l = 10f64.powf(log_lum);
        let inner = (l / coeff::HZ_INNER_FLUX).sqrt();
        let outer = (l / coeff::HZ_OUTER_FLUX).sqrt();
        Self {
            optimistic_inner: inner * coeff::HZ_OPTIMISTIC_INNER,
            conservative_inner: inner,
            conservative_outer: outer,
            optimistic_outer: outer * coeff::HZ_OPTIMISTIC_OUTER,
            source: HzSource::Derived,
        }
    }

    /// Catalogued edges if all four are present, else derived from luminosity.
    pub fn from_record(record: &ParameterRecord) -> Result<Self, MissingInputError> {
        let catalogued = (
            record.number(ParamKey::HzOptimisticInner),
            record.number(ParamKey::HzConservativeInner),
            record.number(ParamKey::HzConservativeOuter),
            record.number(ParamKey::HzOptimisticOuter),
        );
        if let (Some(oi), Some(ci), Some(co), Some(oo)) = catalogued {
            return Ok(Self {
                optimistic_inner: oi,
                conservative_inner: ci,
                conservative_outer: co,
                optimistic_outer: oo,
                source: HzSource::Catalog,
            });
        }
        record
            .number(ParamKey::Luminosity)
            .map(Self::from_log_luminosity)
            .ok_or_else(|| MissingInputError::new("habitable zone", "st_lum"))
    }

    pub fn position(&self, a: f64) -> HzPosition {
        if (self.conservative_inner..=self.conservative_outer).contains(&a) {
            HzPosition::Conservative
        } else if (self.optimistic_inner..=self.optimistic_outer).contains(&a) {
            HzPosition::Optimistic
        } else {
            HzPosition::Outside
        }
    }
}

/// Light-travel curiosities for the system distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelTimes {
    pub distance_ly: f64,
    /// Years at current probe speed.
    pub current_tech_years: f64,
    /// Years at 20% of light speed.
    pub twenty_percent_years: f64,
    /// Years at near light speed.
    pub near_light_years: f64,
}

impl TravelTimes {
    pub fn from_parsecs(distance_pc: Option<f64>) -> Result<Self, MissingInputError> {
        let pc = distance_pc
            .filter(|d| *d > 0.0)
            .ok_or_else(|| MissingInputError::new("travel times", "sy_dist"))?;
        let ly = pc * physics::LY_PER_PARSEC;
        Ok(Self {
            distance_ly: ly,
            current_tech_years: ly / travel::CURRENT_TECH,
            twenty_percent_years: ly / travel::TWENTY_PERCENT,
            near_light_years: ly / travel::NEAR_LIGHT,
        })
    }
}

/// Fill absent fields by derivation, in dependency order. Returns the keys
/// that were filled. Never overwrites a sourced value.
pub fn fill_gaps(record: &mut ParameterRecord) -> Vec<ParamKey> {
    let mut filled = Vec::new();
    let mut put = |record: &mut ParameterRecord, key: ParamKey, value: Option<f64>| {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            if record.fill(key, ParamValue::Number(v), Provenance::Derived) {
                log::debug!("{}: derived {key} = {v:.4}", record.name);
                filled.push(key);
            }
        }
    };

    if record.get(ParamKey::Luminosity).is_none() {
        let lum = record
            .number(ParamKey::StellarRadius)
            .zip(record.number(ParamKey::StellarTemp))
            .and_then(|(r, t)| log_luminosity(r, t));
        put(record, ParamKey::Luminosity, lum);
    }

    if record.get(ParamKey::SemiMajorAxis).is_none() {
        let a = record
            .number(ParamKey::OrbitalPeriod)
            .zip(record.number(ParamKey::StellarMass))
            .and_then(|(p, m)| semi_major_axis(p, m));
        put(record, ParamKey::SemiMajorAxis, a);
    }

    if record.get(ParamKey::EquilibriumTemp).is_none() {
        let teq = equilibrium_temperature(
            record.number(ParamKey::StellarTemp),
            record.number(ParamKey::StellarRadius),
            record.number(ParamKey::SemiMajorAxis),
        )
        .ok();
        put(record, ParamKey::EquilibriumTemp, teq);
    }

    if record.get(ParamKey::Mass).is_none() {
        let m = record.number(ParamKey::Radius).and_then(estimate_mass);
        put(record, ParamKey::Mass, m);
    }

    if record.get(ParamKey::Density).is_none() {
        let d = record
            .number(ParamKey::Mass)
            .zip(record.number(ParamKey::Radius))
            .and_then(|(m, r)| bulk_density(m, r));
        put(record, ParamKey::Density, d);
    }

    filled
}

/// Quantities computed once per resolved record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuantities {
    pub equilibrium_temp: Option<f64>,
    /// Set only when the mass was not measured.
    pub estimated_mass: Option<f64>,
    pub classification: Classification,
    pub habitable_zone: Option<HabitableZone>,
    pub travel: Option<TravelTimes>,
}

impl DerivedQuantities {
    /// Compute from a gap-filled record; undetermined quantities come back
    /// as errors alongside the result.
    pub fn from_record(record: &ParameterRecord) -> (Self, Vec<MissingInputError>) {
        let mut missing = Vec::new();
        let equilibrium_temp = record.number(ParamKey::EquilibriumTemp);
        if equilibrium_temp.is_none() {
            missing.push(MissingInputError::new("equilibrium temperature", "pl_orbsmax"));
        }
        let mass = record.number(ParamKey::Mass);
        let estimated_mass = mass.filter(|_| record.source(ParamKey::Mass) == Some(Provenance::Derived));
        let habitable_zone = HabitableZone::from_record(record)
            .map_err(|e| missing.push(e))
            .ok();
        let travel = TravelTimes::from_parsecs(record.number(ParamKey::Distance))
            .map_err(|e| missing.push(e))
            .ok();
        (
            Self {
                equilibrium_temp,
                estimated_mass,
                classification: Classification::classify(mass, equilibrium_temp),
                habitable_zone,
                travel,
            },
            missing,
        )
    }
}
