//! Mass and temperature classification.
//!
//! Both scales are lower-bound inclusive: mass 0.1 M⊕ is Subterran, not
//! Mercurian; 273 K is Temperate 2, not Temperate 1.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassClass {
    Asteroidan,
    Mercurian,
    Subterran,
    Terran,
    Superterran,
    Neptunian,
    Jovian,
    Unknown,
}

/// Exclusive upper bounds (Earth masses), ascending.
const MASS_BOUNDS: [(f64, MassClass); 7] = [
    (0.00001, MassClass::Asteroidan),
    (0.1, MassClass::Mercurian),
    (0.5, MassClass::Subterran),
    (2.0, MassClass::Terran),
    (10.0, MassClass::Superterran),
    (50.0, MassClass::Neptunian),
    (5000.0, MassClass::Jovian),
];

impl MassClass {
    /// Classify a mass in Earth masses. Missing, non-positive and
    /// super-Jovian masses are [`MassClass::Unknown`].
    pub fn from_mass(mass: Option<f64>) -> Self {
        let Some(m) = mass.filter(|m| m.is_finite() && *m > 0.0) else {
            return Self::Unknown;
        };
        MASS_BOUNDS
            .iter()
            .find(|(upper, _)| m < *upper)
            .map(|(_, class)| *class)
            .unwrap_or(Self::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Asteroidan => "Asteroidan",
            Self::Mercurian => "Mercurian",
            Self::Subterran => "Subterran",
            Self::Terran => "Terran",
            Self::Superterran => "Superterran",
            Self::Neptunian => "Neptunian",
            Self::Jovian => "Jovian",
            Self::Unknown => "Unknown Mass Class",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Classes credited with a solid surface. Subterran bodies are too small
    /// to hold the atmosphere the surface rule assumes.
    pub fn has_solid_surface(self) -> bool {
        matches!(self, Self::Terran | Self::Superterran)
    }
}

impl fmt::Display for MassClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureClass {
    Hypopsychroplanet,
    Psychroplanet,
    Mesoplanet1,
    Mesoplanet2,
    Thermoplanet,
    Hyperthermoplanet,
    Unknown,
}

/// Exclusive upper bounds (K), ascending; anything above is Hyperthermoplanet.
const TEMPERATURE_BOUNDS: [(f64, TemperatureClass); 5] = [
    (170.0, TemperatureClass::Hypopsychroplanet),
    (220.0, TemperatureClass::Psychroplanet),
    (273.0, TemperatureClass::Mesoplanet1),
    (323.0, TemperatureClass::Mesoplanet2),
    (373.0, TemperatureClass::Thermoplanet),
];

impl TemperatureClass {
    /// Classify an equilibrium temperature in K. Missing or negative is
    /// [`TemperatureClass::Unknown`].
    pub fn from_temperature(temp: Option<f64>) -> Self {
        let Some(t) = temp.filter(|t| t.is_finite() && *t >= 0.0) else {
            return Self::Unknown;
        };
        TEMPERATURE_BOUNDS
            .iter()
            .find(|(upper, _)| t < *upper)
            .map(|(_, class)| *class)
            .unwrap_or(Self::Hyperthermoplanet)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hypopsychroplanet => "Hypopsychroplanet (Very Cold)",
            Self::Psychroplanet => "Psychroplanet (Cold)",
            Self::Mesoplanet1 => "Mesoplanet (Temperate 1)",
            Self::Mesoplanet2 => "Mesoplanet (Temperate 2 - Optimal for Earth Life)",
            Self::Thermoplanet => "Thermoplanet (Warm)",
            Self::Hyperthermoplanet => "Hyperthermoplanet (Hot)",
            Self::Unknown => "Unknown Temperature Class",
        }
    }
}

impl fmt::Display for TemperatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Combined mass and temperature classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub mass: MassClass,
    pub temperature: TemperatureClass,
}

impl Classification {
    pub fn classify(mass: Option<f64>, temperature: Option<f64>) -> Self {
        Self {
            mass: MassClass::from_mass(mass),
            temperature: TemperatureClass::from_temperature(temperature),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.mass, self.temperature)
    }
}
