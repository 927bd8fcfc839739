//! User parameter overrides.
//!
//! Grammar, one or more planets separated by newlines or `;`:
//!
//! ```text
//! Kepler-452 b: pl_rade=2.4, st_age=6.0; TRAPPIST-1 e: pl_eqt=250
//! ```
//!
//! A `;`-separated segment without a `Planet:` prefix continues the previous
//! planet, so `Kepler-452 b: pl_rade=2.4; st_age=6.0` also works. Errors are
//! contained per segment and per key: the offending piece is dropped and
//! reported, the rest still applies.

use std::collections::BTreeMap;

use crate::error::OverrideError;
use crate::names::normalize;
use crate::params::{ParamKey, ParamValue};

/// Overrides for one planet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanetOverride {
    /// Planet name as the user typed it.
    pub display_name: String,
    pub values: BTreeMap<ParamKey, ParamValue>,
}

impl PlanetOverride {
    pub fn number(&self, key: ParamKey) -> Option<f64> {
        self.values.get(&key).and_then(ParamValue::as_number)
    }

    /// Whether the override carries enough to analyze an otherwise unknown planet.
    pub fn is_sufficient(&self) -> bool {
        self.number(ParamKey::Radius).is_some() || self.number(ParamKey::Mass).is_some()
    }
}

/// Parsed override text keyed by normalized planet name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverrideSet {
    planets: BTreeMap<String, PlanetOverride>,
}

impl OverrideSet {
    pub fn get(&self, name: &str) -> Option<&PlanetOverride> {
        self.planets.get(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PlanetOverride)> {
        self.planets.iter()
    }
}

/// Result of parsing: what applied, and what was dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedOverrides {
    pub set: OverrideSet,
    pub errors: Vec<OverrideError>,
}

impl ParsedOverrides {
    /// Errors that concern one planet (malformed pairs, unknown keys, bad values).
    pub fn errors_for(&self, name: &str) -> Vec<OverrideError> {
        let key = normalize(name);
        self.errors
            .iter()
            .filter(|e| match e {
                OverrideError::UnknownKey { planet, .. } | OverrideError::Type { planet, .. } => {
                    *planet == key
                }
                OverrideError::Parse { planet, .. } => planet.as_deref() == Some(key.as_str()),
            })
            .cloned()
            .collect()
    }

    /// Segment-level errors not tied to any planet.
    pub fn parse_errors(&self) -> impl Iterator<Item = &OverrideError> {
        self.errors
            .iter()
            .filter(|e| matches!(e, OverrideError::Parse { planet: None, .. }))
    }
}

/// Parse override text. Never fails as a whole.
pub fn parse_overrides(input: &str) -> ParsedOverrides {
    let mut out = ParsedOverrides::default();
    let mut current: Option<String> = None;

    for segment in input.split(['\n', ';']).map(str::trim) {
        if segment.is_empty() {
            continue;
        }
        let pairs = if let Some((planet, params)) = segment.split_once(':') {
            let display = planet.trim();
            let key = normalize(display);
            if key.is_empty() {
                out.errors.push(OverrideError::Parse {
                    planet: None,
                    segment: segment.to_string(),
                    reason: "missing planet name before ':'".into(),
                });
                current = None;
                continue;
            }
            out.set
                .planets
                .entry(key.clone())
                .or_insert_with(|| PlanetOverride {
                    display_name: display.to_string(),
                    values: BTreeMap::new(),
                });
            current = Some(key);
            params
        } else if segment.contains('=') && current.is_some() {
            segment
        } else {
            out.errors.push(OverrideError::Parse {
                planet: None,
                segment: segment.to_string(),
                reason: "expected 'Planet: key=value, ...'".into(),
            });
            continue;
        };

        let Some(planet) = current.clone() else {
            continue;
        };
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match parse_pair(&planet, pair) {
                Ok((key, value)) => {
                    if let Some(entry) = out.set.planets.get_mut(&planet) {
                        entry.values.insert(key, value);
                    }
                }
                Err(e) => {
                    log::warn!("override dropped: {e}");
                    out.errors.push(e);
                }
            }
        }
    }

    // A planet whose every key was rejected contributes nothing.
    out.set.planets.retain(|_, p| !p.values.is_empty());
    out
}

fn parse_pair(planet: &str, pair: &str) -> Result<(ParamKey, ParamValue), OverrideError> {
    let (raw_key, raw_value) = pair.split_once('=').ok_or_else(|| OverrideError::Parse {
        planet: Some(planet.to_string()),
        segment: pair.to_string(),
        reason: "expected key=value".into(),
    })?;
    let raw_key = raw_key.trim();
    let raw_value = raw_value.trim();
    let key = ParamKey::from_name(raw_key).ok_or_else(|| OverrideError::UnknownKey {
        planet: planet.to_string(),
        key: raw_key.to_string(),
    })?;
    if key.is_text() {
        if raw_value.is_empty() {
            return Err(OverrideError::Parse {
                planet: Some(planet.to_string()),
                segment: pair.to_string(),
                reason: "empty value".into(),
            });
        }
        return Ok((key, ParamValue::Text(raw_value.to_string())));
    }
    match raw_value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((key, ParamValue::Number(v))),
        _ => Err(OverrideError::Type {
            planet: planet.to_string(),
            key,
            value: raw_value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_grammar() {
        let p = parse_overrides("Kepler-452 b: pl_rade=2.4, st_age=6.0; TRAPPIST-1 e: pl_eqt=250");
        assert!(p.errors.is_empty());
        assert_eq!(p.set.len(), 2);
        let k = p.set.get("kepler452b").unwrap();
        assert_eq!(k.number(ParamKey::Radius), Some(2.4));
        assert_eq!(k.number(ParamKey::StellarAge), Some(6.0));
        assert_eq!(k.display_name, "Kepler-452 b");
        let t = p.set.get("TRAPPIST-1 e").unwrap();
        assert_eq!(t.number(ParamKey::EquilibriumTemp), Some(250.0));
    }

    #[test]
    fn semicolon_continues_previous_planet() {
        let p = parse_overrides("Kepler-452 b: pl_rade=2.4; st_age=6.0\nTRAPPIST-1 e: pl_eqt=250");
        assert!(p.errors.is_empty());
        let k = p.set.get("Kepler-452 b").unwrap();
        assert_eq!(k.values.len(), 2);
    }

    #[test]
    fn aliases_and_text_values() {
        let p = parse_overrides("X b: radius=1.1, st_spectype=G2 V");
        let x = p.set.get("x b").unwrap();
        assert_eq!(x.number(ParamKey::Radius), Some(1.1));
        assert_eq!(
            x.values.get(&ParamKey::SpectralType),
            Some(&ParamValue::Text("G2 V".into()))
        );
    }

    #[test]
    fn bad_number_drops_only_that_key() {
        let p = parse_overrides("X b: pl_rade=big, pl_masse=2.0");
        let x = p.set.get("X b").unwrap();
        assert_eq!(x.number(ParamKey::Radius), None);
        assert_eq!(x.number(ParamKey::Mass), Some(2.0));
        assert_eq!(p.errors.len(), 1);
        assert!(matches!(
            &p.errors[0],
            OverrideError::Type { key: ParamKey::Radius, .. }
        ));
        assert_eq!(p.errors_for("X b").len(), 1);
    }

    #[test]
    fn unknown_key_reported() {
        let p = parse_overrides("X b: albedo=0.3, pl_rade=1.0");
        assert!(matches!(&p.errors[0], OverrideError::UnknownKey { key, .. } if key == "albedo"));
        assert_eq!(p.set.get("X b").unwrap().values.len(), 1);
    }

    #[test]
    fn malformed_segment_does_not_affect_others() {
        let p = parse_overrides("garbage without colon\nY c: pl_masse=3");
        assert_eq!(p.parse_errors().count(), 1);
        assert_eq!(p.set.get("Y c").unwrap().number(ParamKey::Mass), Some(3.0));
    }

    #[test]
    fn malformed_pair_belongs_to_its_planet() {
        let p = parse_overrides("X b: pl_rade 2.0, pl_masse=2.0");
        assert_eq!(p.set.get("X b").unwrap().number(ParamKey::Mass), Some(2.0));
        let errs = p.errors_for("X b");
        assert_eq!(errs.len(), 1);
        assert!(matches!(&errs[0], OverrideError::Parse { planet: Some(planet), .. } if planet == "xb"));
        assert_eq!(p.parse_errors().count(), 0);
    }

    #[test]
    fn missing_planet_name() {
        let p = parse_overrides(": pl_rade=1.0");
        assert!(p.set.is_empty());
        assert_eq!(p.parse_errors().count(), 1);
    }

    #[test]
    fn planet_with_only_bad_keys_is_dropped() {
        let p = parse_overrides("X b: pl_rade=oops");
        assert!(p.set.is_empty());
        assert_eq!(p.errors.len(), 1);
    }

    #[test]
    fn sufficiency_needs_radius_or_mass() {
        let p = parse_overrides("A: pl_eqt=250\nB: pl_masse=1");
        assert!(!p.set.get("A").unwrap().is_sufficient());
        assert!(p.set.get("B").unwrap().is_sufficient());
    }

    #[test]
    fn empty_input() {
        let p = parse_overrides("   \n ; ");
        assert!(p.set.is_empty());
        assert!(p.errors.is_empty());
    }
}
