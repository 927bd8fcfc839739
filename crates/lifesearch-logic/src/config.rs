//! Batch request — the already-fetched inputs for one analysis run.
//!
//! Callers (web layer, CLI harness) fetch API rows and load catalogs, then
//! hand everything over as one serde value. [`validate_request`] reports all
//! problems at once instead of stopping at the first.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{ApiResult, RawRow};
use crate::error::WeightRangeError;
use crate::names::normalize;
use crate::weights::{self, WeightOverrides};

/// Inputs for a multi-planet analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchRequest {
    /// Planet names as the user typed them.
    pub planets: Vec<String>,
    /// Override text, see [`crate::overrides`].
    pub overrides: String,
    /// API result per planet name. Planets without an entry count as not found.
    pub api: BTreeMap<String, ApiResult>,
    /// HWC catalog rows.
    pub hwc: Vec<RawRow>,
    /// HZGallery catalog rows.
    pub hz_gallery: Vec<RawRow>,
    /// Session-wide weight overrides.
    pub global_weights: WeightOverrides,
    /// Per-planet weight overrides keyed by planet name.
    pub planet_weights: BTreeMap<String, WeightOverrides>,
}

impl BatchRequest {
    /// API result for a planet by any spelling of its name.
    pub fn api_for(&self, name: &str) -> Option<&ApiResult> {
        let key = normalize(name);
        self.api.get(name).or_else(|| {
            self.api
                .iter()
                .find(|(k, _)| normalize(k) == key)
                .map(|(_, v)| v)
        })
    }
}

/// Request validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Nothing to analyze.
    #[error("no planets requested")]
    NoPlanets,
    /// A planet name normalizes to nothing.
    #[error("planet name {0:?} is empty")]
    EmptyPlanetName(String),
    /// Two names normalize to the same planet.
    #[error("planet {0:?} requested more than once")]
    DuplicatePlanet(String),
    /// A global weight is outside its domain.
    #[error("global weights: {0}")]
    GlobalWeight(WeightRangeError),
    /// A per-planet weight is outside its domain.
    #[error("weights for {planet}: {error}")]
    PlanetWeight {
        planet: String,
        error: WeightRangeError,
    },
}

/// Validate a batch request, returning all errors found.
pub fn validate_request(request: &BatchRequest) -> Vec<RequestError> {
    let mut errors = Vec::new();

    if request.planets.is_empty() {
        errors.push(RequestError::NoPlanets);
    }

    let mut seen = HashSet::new();
    for name in &request.planets {
        let key = normalize(name);
        if key.is_empty() {
            errors.push(RequestError::EmptyPlanetName(name.clone()));
        } else if !seen.insert(key) {
            errors.push(RequestError::DuplicatePlanet(name.clone()));
        }
    }

    if let Err(e) = weights::validate(&request.global_weights) {
        errors.push(RequestError::GlobalWeight(e));
    }
    for (planet, overrides) in &request.planet_weights {
        if let Err(error) = weights::validate(overrides) {
            errors.push(RequestError::PlanetWeight {
                planet: planet.clone(),
                error,
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WeightKey;

    fn request(planets: &[&str]) -> BatchRequest {
        BatchRequest {
            planets: planets.iter().map(|s| s.to_string()).collect(),
            ..BatchRequest::default()
        }
    }

    #[test]
    fn valid_request_has_no_errors() {
        assert!(validate_request(&request(&["Kepler-22 b", "TRAPPIST-1 e"])).is_empty());
    }

    #[test]
    fn empty_request() {
        assert_eq!(validate_request(&request(&[])), vec![RequestError::NoPlanets]);
    }

    #[test]
    fn duplicate_and_empty_names() {
        let errors = validate_request(&request(&["Kepler-22 b", "kepler 22b", " - "]));
        assert!(errors.contains(&RequestError::DuplicatePlanet("kepler 22b".into())));
        assert!(errors.contains(&RequestError::EmptyPlanetName(" - ".into())));
    }

    #[test]
    fn weight_errors_collected() {
        let mut r = request(&["X b"]);
        r.global_weights.insert(WeightKey::Size, 1.5);
        r.planet_weights
            .insert("X b".into(), [(WeightKey::StableOrbit, 0.5)].into_iter().collect());
        let errors = validate_request(&r);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .any(|e| matches!(e, RequestError::PlanetWeight { planet, .. } if planet == "X b")));
    }

    #[test]
    fn deserializes_with_defaults() {
        let r: BatchRequest = serde_json::from_str(
            r#"{
                "planets": ["Kepler-22 b"],
                "api": {"Kepler-22 b": {"status": "unavailable"}},
                "global_weights": {"density": 0.5}
            }"#,
        )
        .unwrap();
        assert_eq!(r.api_for("kepler 22b"), Some(&ApiResult::Unavailable));
        assert!(r.hwc.is_empty());
        assert_eq!(r.global_weights.get(&WeightKey::Density), Some(&0.5));
    }
}
