//! Canonical parameter model — one provenance-tagged record per planet.
//!
//! Every physical parameter is an explicit [`ParamValue`] that is either
//! present in [`ParameterRecord::values`] or absent. There are no sentinel
//! numbers: a missing radius is a missing key, never `0.0`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named planetary and stellar parameters.
///
/// The canonical column name of each key matches the API field it is read
/// from (`pl_rade`, `st_teff`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    /// Planet radius (Earth radii).
    Radius,
    /// Planet mass (Earth masses).
    Mass,
    /// Bulk density (g/cm³).
    Density,
    /// Equilibrium temperature (K).
    EquilibriumTemp,
    /// Orbital period (days).
    OrbitalPeriod,
    /// Semi-major axis (AU).
    SemiMajorAxis,
    Eccentricity,
    /// Orbital inclination (degrees).
    Inclination,
    /// Stellar effective temperature (K).
    StellarTemp,
    /// Stellar radius (solar radii).
    StellarRadius,
    /// Stellar mass (solar masses).
    StellarMass,
    /// Stellar age (Gyr).
    StellarAge,
    /// Stellar metallicity (dex).
    StellarMetallicity,
    SpectralType,
    /// log10(L / L_sun).
    Luminosity,
    /// Distance to the system (parsecs).
    Distance,
    HostName,
    /// Catalogued optimistic inner habitable-zone edge (AU).
    HzOptimisticInner,
    /// Catalogued conservative inner habitable-zone edge (AU).
    HzConservativeInner,
    /// Catalogued conservative outer habitable-zone edge (AU).
    HzConservativeOuter,
    /// Catalogued optimistic outer habitable-zone edge (AU).
    HzOptimisticOuter,
}

impl ParamKey {
    pub const ALL: [ParamKey; 21] = [
        ParamKey::Radius,
        ParamKey::Mass,
        ParamKey::Density,
        ParamKey::EquilibriumTemp,
        ParamKey::OrbitalPeriod,
        ParamKey::SemiMajorAxis,
        ParamKey::Eccentricity,
        ParamKey::Inclination,
        ParamKey::StellarTemp,
        ParamKey::StellarRadius,
        ParamKey::StellarMass,
        ParamKey::StellarAge,
        ParamKey::StellarMetallicity,
        ParamKey::SpectralType,
        ParamKey::Luminosity,
        ParamKey::Distance,
        ParamKey::HostName,
        ParamKey::HzOptimisticInner,
        ParamKey::HzConservativeInner,
        ParamKey::HzConservativeOuter,
        ParamKey::HzOptimisticOuter,
    ];

    /// Parameters whose absence is worth telling the user about.
    pub const CORE: [ParamKey; 12] = [
        ParamKey::Radius,
        ParamKey::Mass,
        ParamKey::Density,
        ParamKey::EquilibriumTemp,
        ParamKey::OrbitalPeriod,
        ParamKey::SemiMajorAxis,
        ParamKey::Eccentricity,
        ParamKey::StellarTemp,
        ParamKey::StellarRadius,
        ParamKey::StellarMass,
        ParamKey::StellarAge,
        ParamKey::SpectralType,
    ];

    /// Canonical column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Radius => "pl_rade",
            Self::Mass => "pl_masse",
            Self::Density => "pl_dens",
            Self::EquilibriumTemp => "pl_eqt",
            Self::OrbitalPeriod => "pl_orbper",
            Self::SemiMajorAxis => "pl_orbsmax",
            Self::Eccentricity => "pl_orbeccen",
            Self::Inclination => "pl_orbincl",
            Self::StellarTemp => "st_teff",
            Self::StellarRadius => "st_rad",
            Self::StellarMass => "st_mass",
            Self::StellarAge => "st_age",
            Self::StellarMetallicity => "st_met",
            Self::SpectralType => "st_spectype",
            Self::Luminosity => "st_lum",
            Self::Distance => "sy_dist",
            Self::HostName => "hostname",
            Self::HzOptimisticInner => "hz_ohzin",
            Self::HzConservativeInner => "hz_chzin",
            Self::HzConservativeOuter => "hz_chzout",
            Self::HzOptimisticOuter => "hz_ohzout",
        }
    }

    /// Friendly names accepted in override text besides the column name.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Radius => &["radius"],
            Self::Mass => &["mass"],
            Self::Density => &["density"],
            Self::EquilibriumTemp => &["teq", "eq_temp", "equilibrium_temperature", "temperature"],
            Self::OrbitalPeriod => &["period", "orbital_period"],
            Self::SemiMajorAxis => &["a", "semi_major_axis"],
            Self::Eccentricity => &["eccentricity", "ecc"],
            Self::Inclination => &["inclination"],
            Self::StellarTemp => &["teff", "stellar_temperature"],
            Self::StellarRadius => &["stellar_radius"],
            Self::StellarMass => &["stellar_mass"],
            Self::StellarAge => &["age", "stellar_age"],
            Self::StellarMetallicity => &["st_metfe", "metallicity"],
            Self::SpectralType => &["spectral_type", "spectype"],
            Self::Luminosity => &["luminosity"],
            Self::Distance => &["distance"],
            Self::HostName => &["star", "star_name"],
            Self::HzOptimisticInner => &[],
            Self::HzConservativeInner => &[],
            Self::HzConservativeOuter => &[],
            Self::HzOptimisticOuter => &[],
        }
    }

    /// Look up a key by column name or alias, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.column() == needle || k.aliases().contains(&needle.as_str()))
    }

    /// Whether the parameter holds free text rather than a number.
    pub fn is_text(self) -> bool {
        matches!(self, Self::SpectralType | Self::HostName)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A present parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Provenance {
    Override,
    Api,
    Hwc,
    HzGallery,
    Derived,
}

impl Provenance {
    /// Merge priority of the data sources, highest first. Derived values
    /// are only filled in after the merge, into gaps this order left.
    pub const MERGE_ORDER: [Provenance; 4] = [
        Provenance::Override,
        Provenance::Api,
        Provenance::Hwc,
        Provenance::HzGallery,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Override => "user override",
            Self::Api => "API",
            Self::Hwc => "HWC catalog",
            Self::HzGallery => "HZGallery catalog",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged {
    pub value: ParamValue,
    pub source: Provenance,
}

/// Canonical per-planet parameter set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Normalized planet key.
    pub name: String,
    /// Name as the user or the API spelled it.
    pub display_name: String,
    pub values: BTreeMap<ParamKey, Tagged>,
    /// HWC catalog ESI, percent.
    pub hwc_esi: Option<f64>,
    /// HWC habitability class as a percent (0, 50 or 100).
    pub hwc_phi: Option<f64>,
    /// When the API data was fetched, if it came from the API.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ParameterRecord {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, key: ParamKey) -> Option<&Tagged> {
        self.values.get(&key)
    }

    /// Numeric value of `key`, `None` when absent or non-finite.
    pub fn number(&self, key: ParamKey) -> Option<f64> {
        self.values
            .get(&key)
            .and_then(|t| t.value.as_number())
            .filter(|v| v.is_finite())
    }

    pub fn text(&self, key: ParamKey) -> Option<&str> {
        self.values.get(&key).and_then(|t| t.value.as_text())
    }

    pub fn source(&self, key: ParamKey) -> Option<Provenance> {
        self.values.get(&key).map(|t| t.source)
    }

    pub fn star_name(&self) -> Option<&str> {
        self.text(ParamKey::HostName)
    }

    /// Set `key` unconditionally.
    pub fn insert(&mut self, key: ParamKey, value: ParamValue, source: Provenance) {
        self.values.insert(key, Tagged { value, source });
    }

    /// Set `key` only if nothing is there yet. Returns whether it was set.
    pub fn fill(&mut self, key: ParamKey, value: ParamValue, source: Provenance) -> bool {
        if self.values.contains_key(&key) {
            return false;
        }
        self.insert(key, value, source);
        true
    }

    /// Core parameters that no source supplied and nothing could derive.
    pub fn missing_core(&self) -> Vec<ParamKey> {
        ParamKey::CORE
            .iter()
            .copied()
            .filter(|k| !self.values.contains_key(k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_lookup_by_column_and_alias() {
        assert_eq!(ParamKey::from_name("pl_rade"), Some(ParamKey::Radius));
        assert_eq!(ParamKey::from_name(" Radius "), Some(ParamKey::Radius));
        assert_eq!(ParamKey::from_name("ST_TEFF"), Some(ParamKey::StellarTemp));
        assert_eq!(ParamKey::from_name("st_metfe"), Some(ParamKey::StellarMetallicity));
        assert_eq!(ParamKey::from_name("albedo"), None);
    }

    #[test]
    fn columns_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for k in ParamKey::ALL {
            assert!(seen.insert(k.column()), "duplicate column {}", k.column());
        }
    }

    #[test]
    fn text_keys() {
        assert!(ParamKey::SpectralType.is_text());
        assert!(ParamKey::HostName.is_text());
        assert!(!ParamKey::Radius.is_text());
    }

    #[test]
    fn fill_does_not_overwrite() {
        let mut r = ParameterRecord::new("x", "X");
        assert!(r.fill(ParamKey::Radius, ParamValue::Number(2.0), Provenance::Api));
        assert!(!r.fill(ParamKey::Radius, ParamValue::Number(9.0), Provenance::Derived));
        assert_eq!(r.number(ParamKey::Radius), Some(2.0));
        assert_eq!(r.source(ParamKey::Radius), Some(Provenance::Api));
    }

    #[test]
    fn absent_is_none_not_zero() {
        let r = ParameterRecord::new("x", "X");
        assert_eq!(r.number(ParamKey::Mass), None);
        assert_eq!(r.missing_core().len(), ParamKey::CORE.len());
    }

    #[test]
    fn non_finite_reads_as_absent() {
        let mut r = ParameterRecord::new("x", "X");
        r.insert(ParamKey::Mass, ParamValue::Number(f64::NAN), Provenance::Api);
        assert_eq!(r.number(ParamKey::Mass), None);
    }

    #[test]
    fn merge_order_is_override_first() {
        assert_eq!(Provenance::MERGE_ORDER[0], Provenance::Override);
        assert_eq!(Provenance::MERGE_ORDER[3], Provenance::HzGallery);
    }
}
