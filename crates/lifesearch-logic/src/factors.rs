//! Per-factor habitability scores as ordered rule tables.
//!
//! Each factor is a list of `(predicate, score)` pairs checked top to
//! bottom, with a default when nothing matches. A factor whose input is
//! missing is left out entirely, never scored as zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classification::MassClass;
use crate::derivation::{DerivedQuantities, HabitableZone, HzPosition, HzSource};
use crate::error::Warning;
use crate::params::{ParamKey, ParameterRecord};

/// One row of a rule table.
pub struct Rule<I> {
    pub score: f64,
    pub when: fn(&I) -> bool,
}

/// Ordered rules with a fallback score.
pub struct RuleTable<I: 'static> {
    pub rules: &'static [Rule<I>],
    pub default: f64,
}

impl<I> RuleTable<I> {
    /// Score of the first matching rule, or the default.
    pub fn score(&self, input: &I) -> f64 {
        self.rules
            .iter()
            .find(|rule| (rule.when)(input))
            .map_or(self.default, |rule| rule.score)
    }
}

/// A body measurement paired with the planet's mass class.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub value: f64,
    pub class: MassClass,
}

#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub mass: f64,
    pub semi_major_axis: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Magnetism {
    pub class: MassClass,
    pub star: Option<char>,
}

fn rocky_core(c: MassClass) -> bool {
    matches!(c, MassClass::Terran | MassClass::Superterran)
}

pub const SIZE: RuleTable<Body> = RuleTable {
    rules: &[
        Rule {
            score: 100.0,
            when: |b| b.class == MassClass::Terran && (0.8..=1.5).contains(&b.value),
        },
        Rule {
            score: 90.0,
            when: |b| {
                (b.class == MassClass::Subterran && (0.5..0.8).contains(&b.value))
                    || (b.class == MassClass::Terran && b.value > 1.5 && b.value <= 2.0)
                    || (b.class == MassClass::Superterran && b.value <= 2.5)
            },
        },
        Rule {
            score: 70.0,
            when: |b| {
                (b.class == MassClass::Superterran && b.value > 2.5 && b.value <= 4.5)
                    || (b.class == MassClass::Neptunian && b.value <= 5.0)
            },
        },
    ],
    default: 30.0,
};

pub const DENSITY: RuleTable<Body> = RuleTable {
    rules: &[
        Rule {
            score: 100.0,
            when: |b| b.class == MassClass::Terran && (4.5..=6.5).contains(&b.value),
        },
        Rule {
            score: 90.0,
            when: |b| {
                rocky_core(b.class)
                    && ((3.0..4.5).contains(&b.value) || (b.value > 6.5 && b.value <= 8.0))
            },
        },
        Rule {
            score: 70.0,
            when: |b| {
                matches!(b.class, MassClass::Subterran | MassClass::Superterran)
                    && (b.value < 3.0 || b.value > 8.0)
            },
        },
    ],
    default: 50.0,
};

pub const MASS: RuleTable<Body> = RuleTable {
    rules: &[
        Rule {
            score: 100.0,
            when: |b| b.class == MassClass::Terran && (0.8..=1.5).contains(&b.value),
        },
        Rule {
            score: 90.0,
            when: |b| {
                (b.class == MassClass::Subterran && (0.1..0.8).contains(&b.value))
                    || (b.class == MassClass::Terran && b.value > 1.5 && b.value <= 2.0)
                    || (b.class == MassClass::Superterran && b.value <= 5.0)
            },
        },
        Rule {
            score: 70.0,
            when: |b| {
                (b.class == MassClass::Superterran && b.value > 5.0 && b.value <= 10.0)
                    || (b.class == MassClass::Neptunian && b.value <= 20.0)
            },
        },
    ],
    default: 30.0,
};

/// Shared by atmosphere and liquid-water potential.
pub const TEMPERATE: RuleTable<f64> = RuleTable {
    rules: &[
        Rule {
            score: 90.0,
            when: |t| *t > 273.15 && *t <= 373.15,
        },
        Rule {
            score: 50.0,
            when: |t| (200.0..=273.15).contains(t) || (*t > 373.15 && *t <= 450.0),
        },
    ],
    default: 20.0,
};

pub const HZ_CATALOG: RuleTable<HzPosition> = RuleTable {
    rules: &[
        Rule {
            score: 95.0,
            when: |p| *p == HzPosition::Conservative,
        },
        Rule {
            score: 65.0,
            when: |p| *p == HzPosition::Optimistic,
        },
    ],
    default: 20.0,
};

pub const HZ_DERIVED: RuleTable<HzPosition> = RuleTable {
    rules: &[
        Rule {
            score: 85.0,
            when: |p| *p == HzPosition::Conservative,
        },
        Rule {
            score: 60.0,
            when: |p| *p == HzPosition::Optimistic,
        },
    ],
    default: 20.0,
};

pub const HOST_STAR: RuleTable<char> = RuleTable {
    rules: &[
        Rule {
            score: 95.0,
            when: |c| *c == 'G',
        },
        Rule {
            score: 85.0,
            when: |c| *c == 'K',
        },
        Rule {
            score: 70.0,
            when: |c| *c == 'F',
        },
        Rule {
            score: 60.0,
            when: |c| *c == 'M',
        },
    ],
    default: 30.0,
};

pub const SYSTEM_AGE: RuleTable<f64> = RuleTable {
    rules: &[
        Rule {
            score: 90.0,
            when: |a| (1.0..=8.0).contains(a),
        },
        Rule {
            score: 60.0,
            when: |a| (0.5..1.0).contains(a) || (*a > 8.0 && *a <= 10.0),
        },
    ],
    default: 30.0,
};

pub const METALLICITY: RuleTable<f64> = RuleTable {
    rules: &[
        Rule {
            score: 90.0,
            when: |m| (-0.5..=0.5).contains(m),
        },
        Rule {
            score: 60.0,
            when: |m| (-1.0..-0.5).contains(m) || (*m > 0.5 && *m <= 1.0),
        },
    ],
    default: 30.0,
};

pub const ECCENTRICITY: RuleTable<f64> = RuleTable {
    rules: &[
        Rule {
            score: 95.0,
            when: |e| *e <= 0.1,
        },
        Rule {
            score: 70.0,
            when: |e| *e <= 0.3,
        },
        Rule {
            score: 40.0,
            when: |e| *e <= 0.5,
        },
    ],
    default: 10.0,
};

pub const MOONS: RuleTable<Orbit> = RuleTable {
    rules: &[
        Rule {
            score: 90.0,
            when: |o| o.mass >= 10.0 && o.semi_major_axis >= 0.5,
        },
        Rule {
            score: 70.0,
            when: |o| o.mass >= 0.5 && o.semi_major_axis >= 1.0,
        },
        Rule {
            score: 50.0,
            when: |o| o.mass >= 0.5 && o.semi_major_axis >= 0.3,
        },
    ],
    default: 20.0,
};

pub const MAGNETIC: RuleTable<Magnetism> = RuleTable {
    rules: &[
        Rule {
            score: 40.0,
            when: |m| m.star == Some('M'),
        },
        Rule {
            score: 85.0,
            when: |m| rocky_core(m.class) && matches!(m.star, Some('G' | 'K')),
        },
        Rule {
            score: 70.0,
            when: |m| rocky_core(m.class),
        },
    ],
    default: 30.0,
};

/// Habitability factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    Size,
    Density,
    Mass,
    Atmosphere,
    LiquidWater,
    HabitableZone,
    HostStar,
    SystemAge,
    Metallicity,
    Eccentricity,
    Moons,
    MagneticActivity,
}

impl Factor {
    pub const ALL: [Factor; 12] = [
        Factor::Size,
        Factor::Density,
        Factor::Mass,
        Factor::Atmosphere,
        Factor::LiquidWater,
        Factor::HabitableZone,
        Factor::HostStar,
        Factor::SystemAge,
        Factor::Metallicity,
        Factor::Eccentricity,
        Factor::Moons,
        Factor::MagneticActivity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Size => "Size",
            Self::Density => "Density",
            Self::Mass => "Mass",
            Self::Atmosphere => "Atmosphere Potential",
            Self::LiquidWater => "Liquid Water Potential",
            Self::HabitableZone => "Habitable Zone Position",
            Self::HostStar => "Host Star Type",
            Self::SystemAge => "System Age",
            Self::Metallicity => "Star Metallicity",
            Self::Eccentricity => "Orbital Eccentricity",
            Self::Moons => "Presence of Moons",
            Self::MagneticActivity => "Magnetic Activity",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub score: f64,
}

/// Spectral class letter (`"G2 V"` → `'G'`).
pub fn spectral_class(spectral_type: &str) -> Option<char> {
    spectral_type
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii_alphabetic)
}

/// Everything the rule tables read, pulled from a resolved record.
#[derive(Debug, Clone, Copy)]
pub struct FactorInputs {
    pub radius: Option<f64>,
    pub mass: Option<f64>,
    pub density: Option<f64>,
    pub equilibrium_temp: Option<f64>,
    pub semi_major_axis: Option<f64>,
    pub habitable_zone: Option<HabitableZone>,
    pub star: Option<char>,
    pub age: Option<f64>,
    pub metallicity: Option<f64>,
    pub eccentricity: Option<f64>,
    pub class: MassClass,
}

impl FactorInputs {
    pub fn new(record: &ParameterRecord, derived: &DerivedQuantities) -> Self {
        Self {
            radius: record.number(ParamKey::Radius),
            mass: record.number(ParamKey::Mass),
            density: record.number(ParamKey::Density),
            equilibrium_temp: derived.equilibrium_temp,
            semi_major_axis: record.number(ParamKey::SemiMajorAxis),
            habitable_zone: derived.habitable_zone,
            star: record.text(ParamKey::SpectralType).and_then(spectral_class),
            age: record.number(ParamKey::StellarAge),
            metallicity: record.number(ParamKey::StellarMetallicity),
            eccentricity: record.number(ParamKey::Eccentricity),
            class: derived.classification.mass,
        }
    }

    /// Score one factor, or explain why it was left out.
    pub fn score(&self, factor: Factor) -> Result<f64, &'static str> {
        let body = |v: Option<f64>, what: &'static str| {
            v.map(|value| Body {
                value,
                class: self.class,
            })
            .ok_or(what)
        };
        match factor {
            Factor::Size => body(self.radius, "pl_rade").map(|b| SIZE.score(&b)),
            Factor::Density => body(self.density, "pl_dens").map(|b| DENSITY.score(&b)),
            Factor::Mass => body(self.mass, "pl_masse").map(|b| MASS.score(&b)),
            Factor::Atmosphere | Factor::LiquidWater => self
                .equilibrium_temp
                .map(|t| TEMPERATE.score(&t))
                .ok_or("pl_eqt"),
            Factor::HabitableZone => {
                let hz = self.habitable_zone.ok_or("habitable zone edges")?;
                let a = self.semi_major_axis.ok_or("pl_orbsmax")?;
                let table = match hz.source {
                    HzSource::Catalog => &HZ_CATALOG,
                    HzSource::Derived => &HZ_DERIVED,
                };
                Ok(table.score(&hz.position(a)))
            }
            Factor::HostStar => self.star.map(|c| HOST_STAR.score(&c)).ok_or("st_spectype"),
            Factor::SystemAge => self.age.map(|a| SYSTEM_AGE.score(&a)).ok_or("st_age"),
            Factor::Metallicity => self
                .metallicity
                .map(|m| METALLICITY.score(&m))
                .ok_or("st_met"),
            Factor::Eccentricity => self
                .eccentricity
                .map(|e| ECCENTRICITY.score(&e))
                .ok_or("pl_orbeccen"),
            Factor::Moons => {
                let mass = self.mass.ok_or("pl_masse")?;
                let semi_major_axis = self.semi_major_axis.ok_or("pl_orbsmax")?;
                Ok(MOONS.score(&Orbit {
                    mass,
                    semi_major_axis,
                }))
            }
            Factor::MagneticActivity => {
                if self.star.is_none() && !self.class.is_known() {
                    return Err("st_spectype and mass class");
                }
                Ok(MAGNETIC.score(&Magnetism {
                    class: self.class,
                    star: self.star,
                }))
            }
        }
    }
}

/// Score every factor whose inputs are present.
pub fn score_factors(inputs: &FactorInputs) -> (Vec<FactorScore>, Vec<Warning>) {
    let mut scores = Vec::new();
    let mut warnings = Vec::new();
    for factor in Factor::ALL {
        match inputs.score(factor) {
            Ok(score) => scores.push(FactorScore { factor, score }),
            Err(missing) => {
                warnings.push(Warning::excluded(
                    "habitability",
                    factor.label(),
                    format!("missing {missing}"),
                ));
            }
        }
    }
    (scores, warnings)
}

/// Mean of included factor scores; `None` when nothing could be scored.
pub fn composite(scores: &[FactorScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: f64, class: MassClass) -> Body {
        Body { value, class }
    }

    fn inputs() -> FactorInputs {
        FactorInputs {
            radius: None,
            mass: None,
            density: None,
            equilibrium_temp: None,
            semi_major_axis: None,
            habitable_zone: None,
            star: None,
            age: None,
            metallicity: None,
            eccentricity: None,
            class: MassClass::Unknown,
        }
    }

    #[test]
    fn size_table() {
        let cases = [
            (1.0, MassClass::Terran, 100.0),
            (1.5, MassClass::Terran, 100.0),
            (1.8, MassClass::Terran, 90.0),
            (0.6, MassClass::Subterran, 90.0),
            (2.5, MassClass::Superterran, 90.0),
            (3.0, MassClass::Superterran, 70.0),
            (4.0, MassClass::Neptunian, 70.0),
            (11.0, MassClass::Jovian, 30.0),
            (1.0, MassClass::Unknown, 30.0),
        ];
        for (r, class, want) in cases {
            assert_eq!(SIZE.score(&body(r, class)), want, "radius {r} {class}");
        }
    }

    #[test]
    fn density_table() {
        let cases = [
            (5.5, MassClass::Terran, 100.0),
            (3.5, MassClass::Superterran, 90.0),
            (7.0, MassClass::Terran, 90.0),
            (2.0, MassClass::Subterran, 70.0),
            (9.0, MassClass::Superterran, 70.0),
            (1.3, MassClass::Jovian, 50.0),
        ];
        for (d, class, want) in cases {
            assert_eq!(DENSITY.score(&body(d, class)), want, "density {d} {class}");
        }
    }

    #[test]
    fn mass_table() {
        assert_eq!(MASS.score(&body(1.0, MassClass::Terran)), 100.0);
        assert_eq!(MASS.score(&body(0.3, MassClass::Subterran)), 90.0);
        assert_eq!(MASS.score(&body(7.0, MassClass::Superterran)), 70.0);
        assert_eq!(MASS.score(&body(15.0, MassClass::Neptunian)), 70.0);
        assert_eq!(MASS.score(&body(300.0, MassClass::Jovian)), 30.0);
    }

    #[test]
    fn temperate_table_edges() {
        assert_eq!(TEMPERATE.score(&273.15), 50.0);
        assert_eq!(TEMPERATE.score(&273.16), 90.0);
        assert_eq!(TEMPERATE.score(&373.15), 90.0);
        assert_eq!(TEMPERATE.score(&400.0), 50.0);
        assert_eq!(TEMPERATE.score(&199.9), 20.0);
        assert_eq!(TEMPERATE.score(&500.0), 20.0);
    }

    #[test]
    fn star_age_metallicity_eccentricity() {
        assert_eq!(HOST_STAR.score(&'G'), 95.0);
        assert_eq!(HOST_STAR.score(&'K'), 85.0);
        assert_eq!(HOST_STAR.score(&'F'), 70.0);
        assert_eq!(HOST_STAR.score(&'M'), 60.0);
        assert_eq!(HOST_STAR.score(&'A'), 30.0);

        assert_eq!(SYSTEM_AGE.score(&1.0), 90.0);
        assert_eq!(SYSTEM_AGE.score(&0.7), 60.0);
        assert_eq!(SYSTEM_AGE.score(&9.0), 60.0);
        assert_eq!(SYSTEM_AGE.score(&12.0), 30.0);

        assert_eq!(METALLICITY.score(&0.0), 90.0);
        assert_eq!(METALLICITY.score(&-0.8), 60.0);
        assert_eq!(METALLICITY.score(&1.5), 30.0);

        assert_eq!(ECCENTRICITY.score(&0.1), 95.0);
        assert_eq!(ECCENTRICITY.score(&0.2), 70.0);
        assert_eq!(ECCENTRICITY.score(&0.5), 40.0);
        assert_eq!(ECCENTRICITY.score(&0.9), 10.0);
    }

    #[test]
    fn moons_and_magnetism() {
        let moons = |mass, semi_major_axis| MOONS.score(&Orbit { mass, semi_major_axis });
        assert_eq!(moons(300.0, 5.0), 90.0);
        assert_eq!(moons(1.0, 2.0), 70.0);
        assert_eq!(moons(1.0, 0.4), 50.0);
        assert_eq!(moons(0.1, 1.0), 20.0);

        let mag = |class, star| MAGNETIC.score(&Magnetism { class, star });
        assert_eq!(mag(MassClass::Terran, Some('M')), 40.0);
        assert_eq!(mag(MassClass::Terran, Some('G')), 85.0);
        assert_eq!(mag(MassClass::Superterran, Some('F')), 70.0);
        assert_eq!(mag(MassClass::Jovian, Some('G')), 30.0);
    }

    #[test]
    fn hz_position_scores_by_source() {
        let mut hz = HabitableZone::from_log_luminosity(0.0);
        let mut i = inputs();
        i.semi_major_axis = Some(1.0);
        i.habitable_zone = Some(hz);
        assert_eq!(i.score(Factor::HabitableZone), Ok(85.0));
        hz.source = HzSource::Catalog;
        i.habitable_zone = Some(hz);
        assert_eq!(i.score(Factor::HabitableZone), Ok(95.0));
        i.semi_major_axis = Some(0.8);
        assert_eq!(i.score(Factor::HabitableZone), Ok(65.0));
        i.semi_major_axis = None;
        assert!(i.score(Factor::HabitableZone).is_err());
    }

    #[test]
    fn missing_inputs_are_excluded_not_zero() {
        let mut i = inputs();
        i.radius = Some(1.0);
        i.class = MassClass::Terran;
        let (scores, warnings) = score_factors(&i);
        let factors: Vec<_> = scores.iter().map(|s| s.factor).collect();
        assert_eq!(factors, vec![Factor::Size, Factor::MagneticActivity]);
        assert_eq!(warnings.len(), Factor::ALL.len() - 2);
        assert_eq!(composite(&scores), Some((100.0 + 70.0) / 2.0));
    }

    #[test]
    fn nothing_scored_is_undetermined() {
        let (scores, _) = score_factors(&inputs());
        assert!(scores.is_empty());
        assert_eq!(composite(&scores), None);
    }

    #[test]
    fn spectral_class_parsing() {
        assert_eq!(spectral_class("G2 V"), Some('G'));
        assert_eq!(spectral_class(" m4.5v"), Some('M'));
        assert_eq!(spectral_class(""), None);
        assert_eq!(spectral_class("1"), None);
    }
}
