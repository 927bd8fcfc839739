//! Index aggregation — ESI, PHI, SPH, and the full score bundle.
//!
//! Weights come in as an explicit [`WeightSet`]; nothing here reads shared
//! state. Factors with missing input are dropped from ESI (shrinking its
//! denominator), while PHI always averages all four of its rules.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogKind, RawRow};
use crate::classification::MassClass;
use crate::constants::{earth, phi, sph as sph_bands, weights::PHI_MAX};
use crate::derivation::DerivedQuantities;
use crate::error::Warning;
use crate::factors::{self, spectral_class, FactorInputs, FactorScore};
use crate::params::{ParamKey, ParameterRecord, ParamValue};
use crate::sephi::{self, SephiScore};
use crate::weights::{WeightKey, WeightSet};

/// ESI factors: weight key, record field, Earth reference.
pub const ESI_FACTORS: [(WeightKey, ParamKey, f64); 3] = [
    (WeightKey::Size, ParamKey::Radius, earth::RADIUS),
    (WeightKey::Density, ParamKey::Density, earth::DENSITY),
    (WeightKey::HabitableZone, ParamKey::EquilibriumTemp, earth::EQUILIBRIUM_TEMP),
];

/// Why an ESI similarity could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityError {
    Negative,
    Singular,
}

/// Raw similarity `1 - |x - e| / (x + e)`, floored at zero.
pub fn similarity(x: f64, reference: f64) -> Result<f64, SimilarityError> {
    if x < 0.0 {
        return Err(SimilarityError::Negative);
    }
    let sum = x + reference;
    if sum == 0.0 {
        return Err(SimilarityError::Singular);
    }
    Ok((1.0 - (x - reference).abs() / sum).max(0.0))
}

/// One weighted index component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub key: WeightKey,
    /// Unweighted factor score in [0, 1].
    pub raw: f64,
    pub weight: f64,
    /// Weighted score in [0, 1].
    pub scaled: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsiResult {
    /// Percent; `None` when no factor could be computed.
    pub value: Option<f64>,
    pub components: Vec<Component>,
}

/// ESI over whichever of radius, density and equilibrium temperature are known.
pub fn esi(record: &ParameterRecord, weights: &WeightSet, warnings: &mut Vec<Warning>) -> EsiResult {
    let mut components = Vec::with_capacity(ESI_FACTORS.len());
    for (key, field, reference) in ESI_FACTORS {
        let Some(x) = record.number(field) else {
            warnings.push(Warning::excluded("ESI", key.label(), format!("missing {field}")));
            continue;
        };
        match similarity(x, reference) {
            Ok(raw) => {
                let weight = weights.get(key);
                components.push(Component {
                    key,
                    raw,
                    weight,
                    scaled: raw + (1.0 - raw) * weight,
                });
            }
            Err(SimilarityError::Negative) => {
                warnings.push(Warning::excluded("ESI", key.label(), format!("negative {field}")));
            }
            Err(SimilarityError::Singular) => {
                warnings.push(Warning::DivisionSingularity {
                    index: "ESI",
                    factor: key.label(),
                });
            }
        }
    }
    let value = mean(components.iter().map(|c| c.scaled)).map(|m| m * 100.0);
    EsiResult { value, components }
}

/// The four PHI rule scores, in [`WeightKey::PHI`] order. Absent data takes
/// the "no" branch.
pub fn phi_factors(
    class: MassClass,
    spectral_type: Option<&str>,
    age: Option<f64>,
    eccentricity: Option<f64>,
) -> [(WeightKey, f64); 4] {
    let solid = if class.has_solid_surface() { phi::SOLID_SURFACE } else { 0.0 };
    let star_ok = matches!(spectral_type.and_then(spectral_class), Some('G' | 'K'));
    let age_ok = age.is_some_and(|a| (phi::STABLE_AGE_MIN..=phi::STABLE_AGE_MAX).contains(&a));
    let energy = if star_ok && age_ok { phi::STABLE_ENERGY } else { 0.0 };
    let orbit = if eccentricity.is_some_and(|e| e < phi::STABLE_ORBIT_MAX_ECC) {
        phi::STABLE_ORBIT
    } else {
        0.0
    };
    [
        (WeightKey::SolidSurface, solid),
        (WeightKey::StableEnergy, energy),
        (WeightKey::LifeCompounds, phi::LIFE_COMPOUNDS),
        (WeightKey::StableOrbit, orbit),
    ]
}

fn record_phi_factors(record: &ParameterRecord, class: MassClass) -> [(WeightKey, f64); 4] {
    phi_factors(
        class,
        record.text(ParamKey::SpectralType),
        record.number(ParamKey::StellarAge),
        record.number(ParamKey::Eccentricity),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhiResult {
    /// Percent.
    pub value: f64,
    pub components: Vec<Component>,
}

pub fn phi(factors: &[(WeightKey, f64); 4], weights: &WeightSet) -> PhiResult {
    let components: Vec<Component> = factors
        .iter()
        .map(|&(key, raw)| {
            let weight = weights.get(key);
            Component {
                key,
                raw,
                weight,
                scaled: raw + (1.0 - raw) * (weight / PHI_MAX),
            }
        })
        .collect();
    let value = mean(components.iter().map(|c| c.scaled)).unwrap_or(0.0) * 100.0;
    PhiResult { value, components }
}

/// Surface potential for habitability from equilibrium temperature.
pub fn sph(temperature: Option<f64>) -> Option<f64> {
    let t = temperature?;
    let score = if (sph_bands::OPTIMAL_MIN..=sph_bands::OPTIMAL_MAX).contains(&t) {
        let mid = (sph_bands::OPTIMAL_MIN + sph_bands::OPTIMAL_MAX) / 2.0;
        let half = (sph_bands::OPTIMAL_MAX - sph_bands::OPTIMAL_MIN) / 2.0;
        sph_bands::OPTIMAL_BASE + (1.0 - (t - mid).abs() / half) * sph_bands::OPTIMAL_SPAN
    } else if (sph_bands::MARGINAL_MIN..sph_bands::OPTIMAL_MIN).contains(&t)
        || (t > sph_bands::OPTIMAL_MAX && t <= sph_bands::MARGINAL_MAX)
    {
        sph_bands::MARGINAL_SCORE
    } else {
        sph_bands::POOR_SCORE
    };
    Some(score)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Initial weights for a planet.
///
/// ESI weights are the raw similarities against the HWC catalog values when
/// the planet has an HWC row, else against its own resolved parameters;
/// uncomputable ones stay at the default. PHI weights are `S_i / 4` scaled
/// by the HWC habitability percentage; without one they stay at the default.
pub fn seed_weights(record: &ParameterRecord, derived: &DerivedQuantities, hwc: Option<&RawRow>) -> WeightSet {
    let hwc_values = hwc.map(|row| CatalogKind::Hwc.extract(row));
    let lookup = |field: ParamKey| match &hwc_values {
        Some(values) => values
            .iter()
            .find(|(k, _)| *k == field)
            .and_then(|(_, v)| ParamValue::as_number(v)),
        None => record.number(field),
    };

    let mut seed = WeightSet::default();
    for (key, field, reference) in ESI_FACTORS {
        if let Some(s) = lookup(field).and_then(|x| similarity(x, reference).ok()) {
            seed = seed.with(key, s);
        }
    }
    if let Some(hwc_phi) = record.hwc_phi {
        for (key, raw) in record_phi_factors(record, derived.classification.mass) {
            seed = seed.with(key, (raw / 4.0) * (hwc_phi / 100.0));
        }
    }
    seed
}

/// Everything computed for one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBundle {
    pub esi: EsiResult,
    pub phi: PhiResult,
    pub sph: Option<f64>,
    pub sephi: Option<SephiScore>,
    pub factors: Vec<FactorScore>,
    /// Mean of the factor scores.
    pub habitability: Option<f64>,
    pub derived: DerivedQuantities,
    pub weights: WeightSet,
}

/// Score a resolved record with the given weights.
pub fn score(record: &ParameterRecord, derived: &DerivedQuantities, weights: &WeightSet) -> (ScoreBundle, Vec<Warning>) {
    let mut warnings = Vec::new();
    let esi = esi(record, weights, &mut warnings);
    let phi = phi(&record_phi_factors(record, derived.classification.mass), weights);
    let sph = sph(derived.equilibrium_temp);
    if sph.is_none() {
        warnings.push(crate::error::MissingInputError::new("SPH", "pl_eqt").into());
    }
    let sephi = sephi::sephi_for(record).map_err(|e| warnings.push(e.into())).ok();
    let (factors, excluded) = factors::score_factors(&FactorInputs::new(record, derived));
    warnings.extend(excluded);
    let habitability = factors::composite(&factors);
    log::info!(
        "{}: ESI {} PHI {:.2} SPH {} SEPHI {}",
        record.display_name,
        fmt_opt(esi.value),
        phi.value,
        fmt_opt(sph),
        fmt_opt(sephi.map(|s| s.total))
    );
    (
        ScoreBundle {
            esi,
            phi,
            sph,
            sephi,
            factors,
            habitability,
            derived: derived.clone(),
            weights: *weights,
        },
        warnings,
    )
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
