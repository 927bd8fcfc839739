//! Index weights and the per-session weight store.
//!
//! A [`WeightSet`] is a complete, immutable set of ESI and PHI weights that
//! the scoring functions take by reference. The [`WeightStore`] holds the
//! partial overrides at global and per-planet scope and resolves them into
//! a `WeightSet` with per-planet → global → seed → default fallback. Seeds
//! are kept apart from explicit overrides so a global write still reaches
//! every planet that has not set the key itself.
//!
//! Writes replace a whole scope at once. Stored overrides sit behind `Arc`,
//! so a reader holding a snapshot never sees a half-applied write.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::weights::{ESI_MAX, PHI_MAX};
use crate::error::WeightRangeError;
use crate::names::normalize;

/// Which index a weight belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Esi,
    Phi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKey {
    Size,
    Density,
    HabitableZone,
    SolidSurface,
    StableEnergy,
    LifeCompounds,
    StableOrbit,
}

impl WeightKey {
    pub const ESI: [WeightKey; 3] = [WeightKey::Size, WeightKey::Density, WeightKey::HabitableZone];
    pub const PHI: [WeightKey; 4] = [
        WeightKey::SolidSurface,
        WeightKey::StableEnergy,
        WeightKey::LifeCompounds,
        WeightKey::StableOrbit,
    ];

    pub fn index(self) -> Index {
        match self {
            Self::Size | Self::Density | Self::HabitableZone => Index::Esi,
            _ => Index::Phi,
        }
    }

    /// Upper bound of the weight domain; also the system default.
    pub fn max(self) -> f64 {
        match self.index() {
            Index::Esi => ESI_MAX,
            Index::Phi => PHI_MAX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Density => "density",
            Self::HabitableZone => "habitable_zone",
            Self::SolidSurface => "solid_surface",
            Self::StableEnergy => "stable_energy",
            Self::LifeCompounds => "life_compounds",
            Self::StableOrbit => "stable_orbit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Size => "Size",
            Self::Density => "Density",
            Self::HabitableZone => "Habitable Zone",
            Self::SolidSurface => "Solid Surface",
            Self::StableEnergy => "Stable Energy",
            Self::LifeCompounds => "Life Compounds",
            Self::StableOrbit => "Stable Orbit",
        }
    }

    /// Check `value` against this key's domain.
    pub fn check(self, value: f64) -> Result<f64, WeightRangeError> {
        if value.is_finite() && (0.0..=self.max()).contains(&value) {
            Ok(value)
        } else {
            Err(WeightRangeError {
                key: self.name().to_string(),
                value,
                min: 0.0,
                max: self.max(),
            })
        }
    }
}

impl fmt::Display for WeightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete set of index weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    pub size: f64,
    pub density: f64,
    pub habitable_zone: f64,
    pub solid_surface: f64,
    pub stable_energy: f64,
    pub life_compounds: f64,
    pub stable_orbit: f64,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            size: ESI_MAX,
            density: ESI_MAX,
            habitable_zone: ESI_MAX,
            solid_surface: PHI_MAX,
            stable_energy: PHI_MAX,
            life_compounds: PHI_MAX,
            stable_orbit: PHI_MAX,
        }
    }
}

impl WeightSet {
    pub fn get(&self, key: WeightKey) -> f64 {
        match key {
            WeightKey::Size => self.size,
            WeightKey::Density => self.density,
            WeightKey::HabitableZone => self.habitable_zone,
            WeightKey::SolidSurface => self.solid_surface,
            WeightKey::StableEnergy => self.stable_energy,
            WeightKey::LifeCompounds => self.life_compounds,
            WeightKey::StableOrbit => self.stable_orbit,
        }
    }

    fn slot(&mut self, key: WeightKey) -> &mut f64 {
        match key {
            WeightKey::Size => &mut self.size,
            WeightKey::Density => &mut self.density,
            WeightKey::HabitableZone => &mut self.habitable_zone,
            WeightKey::SolidSurface => &mut self.solid_surface,
            WeightKey::StableEnergy => &mut self.stable_energy,
            WeightKey::LifeCompounds => &mut self.life_compounds,
            WeightKey::StableOrbit => &mut self.stable_orbit,
        }
    }

    /// Copy with one weight replaced. The value is clamped to its domain.
    pub fn with(mut self, key: WeightKey, value: f64) -> Self {
        *self.slot(key) = if value.is_nan() {
            key.max()
        } else {
            value.clamp(0.0, key.max())
        };
        self
    }
}

/// Partial weights for one scope. Unset keys fall through.
pub type WeightOverrides = BTreeMap<WeightKey, f64>;

/// Validate every key of a write; the first bad key rejects the whole map.
pub fn validate(overrides: &WeightOverrides) -> Result<(), WeightRangeError> {
    overrides
        .iter()
        .try_for_each(|(k, v)| k.check(*v).map(|_| ()))
}

/// Where a weight read or write applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    /// Normalized planet name.
    Planet(String),
}

impl Scope {
    pub fn planet(name: &str) -> Self {
        Self::Planet(normalize(name))
    }
}

/// Global and per-planet weight overrides with HWC-derived seeds.
///
/// `planets` only holds keys written through [`WeightStore::set`].
#[derive(Debug, Clone, Default)]
pub struct WeightStore {
    global: Arc<WeightOverrides>,
    planets: HashMap<String, Arc<WeightOverrides>>,
    seeds: HashMap<String, WeightSet>,
    version: u64,
}

impl WeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every successful write or reset.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Resolved weights for a scope. Never fails.
    pub fn get(&self, scope: &Scope) -> WeightSet {
        let (planet, seed) = match scope {
            Scope::Global => (None, None),
            Scope::Planet(name) => (self.planets.get(name), self.seeds.get(name)),
        };
        let mut set = WeightSet::default();
        for key in WeightKey::ESI.iter().chain(WeightKey::PHI.iter()) {
            let value = planet
                .and_then(|p| p.get(key).copied())
                .or_else(|| self.global.get(key).copied())
                .or_else(|| seed.map(|s| s.get(*key)));
            if let Some(v) = value {
                set = set.with(*key, v);
            }
        }
        set
    }

    /// Stored overrides for a scope, without fallback.
    pub fn overrides(&self, scope: &Scope) -> Option<Arc<WeightOverrides>> {
        match scope {
            Scope::Global => Some(Arc::clone(&self.global)),
            Scope::Planet(name) => self.planets.get(name).cloned(),
        }
    }

    /// Replace a scope's overrides. Rejected as a whole if any key is out of range.
    pub fn set(&mut self, scope: &Scope, overrides: WeightOverrides) -> Result<WeightSet, WeightRangeError> {
        if let Err(e) = validate(&overrides) {
            log::warn!("weight write rejected: {e}");
            return Err(e);
        }
        let stored = Arc::new(overrides);
        match scope {
            Scope::Global => self.global = stored,
            Scope::Planet(name) => {
                self.planets.insert(name.clone(), stored);
            }
        }
        self.version += 1;
        log::debug!("weights updated for {scope:?} (version {})", self.version);
        Ok(self.get(scope))
    }

    /// Drop a scope's explicit overrides. A planet then resolves through
    /// global, then its seed, then the hard defaults; global goes back to
    /// the hard defaults.
    pub fn reset(&mut self, scope: &Scope) -> WeightSet {
        match scope {
            Scope::Global => self.global = Arc::new(WeightOverrides::new()),
            Scope::Planet(name) => {
                self.planets.remove(name);
            }
        }
        self.version += 1;
        self.get(scope)
    }

    pub fn seed(&self, name: &str) -> Option<&WeightSet> {
        self.seeds.get(&normalize(name))
    }

    /// Register a planet on first access by remembering its seed. Explicit
    /// overrides already stored for the planet are left alone.
    pub fn ensure_planet(&mut self, name: &str, seed: Option<WeightSet>) -> WeightSet {
        let key = normalize(name);
        if let Some(seed) = seed {
            self.seeds.insert(key.clone(), seed);
        }
        self.get(&Scope::Planet(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(WeightKey, f64)]) -> WeightOverrides {
        pairs.iter().copied().collect()
    }

    #[test]
    fn defaults() {
        let w = WeightStore::new().get(&Scope::Global);
        assert_eq!(w, WeightSet::default());
        assert_eq!(w.size, 1.0);
        assert_eq!(w.stable_orbit, 0.25);
    }

    #[test]
    fn planet_falls_back_to_global_then_default() {
        let mut store = WeightStore::new();
        store
            .set(&Scope::Global, overrides(&[(WeightKey::Size, 0.5), (WeightKey::Density, 0.4)]))
            .unwrap();
        store
            .set(&Scope::planet("Kepler-22 b"), overrides(&[(WeightKey::Size, 0.2)]))
            .unwrap();
        let w = store.get(&Scope::planet("kepler 22b"));
        assert_eq!(w.size, 0.2);
        assert_eq!(w.density, 0.4);
        assert_eq!(w.habitable_zone, 1.0);
    }

    #[test]
    fn out_of_range_write_is_atomic() {
        let mut store = WeightStore::new();
        let scope = Scope::planet("X b");
        store.set(&scope, overrides(&[(WeightKey::Size, 0.3)])).unwrap();
        let before = store.get(&scope);
        let v = store.version();
        let err = store
            .set(
                &scope,
                overrides(&[(WeightKey::Size, 0.9), (WeightKey::StableOrbit, 0.3)]),
            )
            .unwrap_err();
        assert_eq!(err.key, "stable_orbit");
        assert_eq!(err.max, 0.25);
        assert_eq!(store.get(&scope), before);
        assert_eq!(store.version(), v);
    }

    #[test]
    fn nan_and_negative_rejected() {
        assert!(WeightKey::Size.check(f64::NAN).is_err());
        assert!(WeightKey::Size.check(-0.01).is_err());
        assert!(WeightKey::Size.check(1.0).is_ok());
        assert!(WeightKey::LifeCompounds.check(0.25).is_ok());
        assert!(WeightKey::LifeCompounds.check(0.2501).is_err());
    }

    #[test]
    fn reset_restores_seed_and_is_idempotent() {
        let mut store = WeightStore::new();
        let seed = WeightSet::default().with(WeightKey::Size, 0.65).with(WeightKey::StableOrbit, 0.0);
        store.ensure_planet("X b", Some(seed));
        let scope = Scope::planet("X b");
        store.set(&scope, overrides(&[(WeightKey::Size, 0.1)])).unwrap();
        let first = store.reset(&scope);
        let second = store.reset(&scope);
        assert_eq!(first, seed);
        assert_eq!(first, second);
    }

    #[test]
    fn reset_without_seed_falls_back_to_global_then_defaults() {
        let mut store = WeightStore::new();
        store.set(&Scope::Global, overrides(&[(WeightKey::Size, 0.1)])).unwrap();
        let scope = Scope::planet("Y c");
        store.set(&scope, overrides(&[(WeightKey::Density, 0.1)])).unwrap();
        assert_eq!(store.reset(&scope), WeightSet::default().with(WeightKey::Size, 0.1));
        assert_eq!(store.reset(&Scope::Global), WeightSet::default());
        assert_eq!(store.get(&scope), WeightSet::default());
    }

    #[test]
    fn global_write_reaches_seeded_planet() {
        let mut store = WeightStore::new();
        let seed = WeightSet::default().with(WeightKey::Size, 0.65).with(WeightKey::Density, 0.4);
        store.ensure_planet("X b", Some(seed));
        let scope = Scope::planet("X b");
        store.set(&Scope::Global, overrides(&[(WeightKey::Size, 0.0)])).unwrap();
        let w = store.get(&scope);
        assert_eq!(w.size, 0.0);
        assert_eq!(w.density, 0.4);

        store.set(&scope, overrides(&[(WeightKey::Size, 0.3)])).unwrap();
        assert_eq!(store.get(&scope).size, 0.3);
    }

    #[test]
    fn ensure_planet_keeps_existing_overrides() {
        let mut store = WeightStore::new();
        let scope = Scope::planet("Z d");
        store.set(&scope, overrides(&[(WeightKey::Size, 0.3)])).unwrap();
        let seed = WeightSet::default().with(WeightKey::Size, 0.9);
        let w = store.ensure_planet("Z d", Some(seed));
        assert_eq!(w.size, 0.3);
        assert_eq!(store.seed("Z d"), Some(&seed));
    }

    #[test]
    fn snapshot_survives_later_writes() {
        let mut store = WeightStore::new();
        store.set(&Scope::Global, overrides(&[(WeightKey::Size, 0.3)])).unwrap();
        let snapshot = store.overrides(&Scope::Global).unwrap();
        store.set(&Scope::Global, overrides(&[(WeightKey::Size, 0.6)])).unwrap();
        assert_eq!(snapshot.get(&WeightKey::Size), Some(&0.3));
    }

    #[test]
    fn overrides_deserialize_from_snake_case_keys() {
        let o: WeightOverrides = serde_json::from_str(r#"{"size": 0.5, "stable_orbit": 0.1}"#).unwrap();
        assert_eq!(o.get(&WeightKey::Size), Some(&0.5));
        assert!(validate(&o).is_ok());
    }
}
