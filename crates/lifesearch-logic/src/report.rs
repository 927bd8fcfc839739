//! Report data assembly — shapes analyses for the presentation layer.
//!
//! Nothing here renders. Values are pre-formatted strings with `"N/A"` for
//! anything undetermined, plus a color and a short verdict per score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{BatchOutcome, PlanetAnalysis};
use crate::derivation::{HabitableZone, HzPosition, HzSource};
use crate::params::{ParamKey, ParameterRecord};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_AVAILABLE_COLOR: &str = "#757575";

/// Format an optional number with fixed precision, `"N/A"` when absent.
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Traffic-light color for a 0–100 score.
pub fn score_color(score: Option<f64>) -> &'static str {
    match score {
        None => NOT_AVAILABLE_COLOR,
        Some(s) if s >= 80.0 => "#4CAF50",
        Some(s) if s >= 60.0 => "#8BC34A",
        Some(s) if s >= 40.0 => "#FFC107",
        Some(s) if s >= 20.0 => "#FF9800",
        Some(_) => "#F44336",
    }
}

/// One-word verdict for a 0–100 score.
pub fn describe(score: Option<f64>) -> &'static str {
    match score {
        None => NOT_AVAILABLE,
        Some(s) if s >= 70.0 => "Likely",
        Some(s) if s >= 40.0 => "Possible",
        Some(_) => "Unlikely",
    }
}

/// A labelled score line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub label: String,
    pub value: Option<f64>,
    pub display: String,
    pub color: String,
    pub description: String,
}

impl ScoreLine {
    pub fn new(label: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            label: label.into(),
            value,
            display: format_value(value, 2),
            color: score_color(value).to_string(),
            description: describe(value).to_string(),
        }
    }
}

/// A labelled parameter with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoLine {
    pub label: String,
    pub display: String,
    pub source: Option<String>,
}

fn info(record: &ParameterRecord, key: ParamKey, label: &str, precision: usize) -> InfoLine {
    let display = if key.is_text() {
        record
            .text(key)
            .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string)
    } else {
        format_value(record.number(key), precision)
    };
    InfoLine {
        label: label.to_string(),
        display,
        source: record.source(key).map(|p| p.label().to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitableZoneInfo {
    pub optimistic_inner: String,
    pub conservative_inner: String,
    pub conservative_outer: String,
    pub optimistic_outer: String,
    pub source: String,
    pub position: String,
}

fn hz_info(hz: &HabitableZone, semi_major_axis: Option<f64>) -> HabitableZoneInfo {
    let position = match semi_major_axis.map(|a| hz.position(a)) {
        Some(HzPosition::Conservative) => "Inside the conservative habitable zone",
        Some(HzPosition::Optimistic) => "Inside the optimistic habitable zone",
        Some(HzPosition::Outside) => "Outside the habitable zone",
        None => "Orbit unknown",
    };
    HabitableZoneInfo {
        optimistic_inner: format_value(Some(hz.optimistic_inner), 3),
        conservative_inner: format_value(Some(hz.conservative_inner), 3),
        conservative_outer: format_value(Some(hz.conservative_outer), 3),
        optimistic_outer: format_value(Some(hz.optimistic_outer), 3),
        source: match hz.source {
            HzSource::Catalog => "HZGallery catalog",
            HzSource::Derived => "derived from stellar luminosity",
        }
        .to_string(),
        position: position.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelLine {
    pub label: String,
    pub years: String,
}

/// Everything the presentation layer needs for one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetReport {
    pub name: String,
    pub display_name: String,
    pub star_name: String,
    pub classification: String,
    pub indices: Vec<ScoreLine>,
    pub factors: Vec<ScoreLine>,
    pub sephi_components: Vec<ScoreLine>,
    pub planet_info: Vec<InfoLine>,
    pub star_info: Vec<InfoLine>,
    pub orbit_info: Vec<InfoLine>,
    pub habitable_zone: Option<HabitableZoneInfo>,
    pub distance_ly: String,
    pub travel: Vec<TravelLine>,
    pub warnings: Vec<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

pub fn planet_report(analysis: &PlanetAnalysis) -> PlanetReport {
    let record = &analysis.record;
    let scores = &analysis.scores;
    let derived = &scores.derived;

    let indices = vec![
        ScoreLine::new("ESI", scores.esi.value),
        ScoreLine::new("PHI", Some(scores.phi.value)),
        ScoreLine::new("SPH", scores.sph),
        ScoreLine::new("SEPHI", scores.sephi.map(|s| s.total)),
        ScoreLine::new("Habitability", scores.habitability),
    ];
    let factors = scores
        .factors
        .iter()
        .map(|f| ScoreLine::new(f.factor.label(), Some(f.score)))
        .collect();
    let sephi_components = scores
        .sephi
        .map(|s| {
            vec![
                ScoreLine::new("L1 Telluric planet", Some(s.l1)),
                ScoreLine::new("L2 Atmosphere", Some(s.l2)),
                ScoreLine::new("L3 Liquid water", Some(s.l3)),
                ScoreLine::new("L4 Magnetic field", Some(s.l4)),
            ]
        })
        .unwrap_or_default();

    let planet_info = vec![
        info(record, ParamKey::Radius, "Radius (R⊕)", 2),
        info(record, ParamKey::Mass, "Mass (M⊕)", 2),
        info(record, ParamKey::Density, "Density (g/cm³)", 2),
        info(record, ParamKey::EquilibriumTemp, "Equilibrium temperature (K)", 1),
    ];
    let star_info = vec![
        info(record, ParamKey::SpectralType, "Spectral type", 0),
        info(record, ParamKey::StellarTemp, "Effective temperature (K)", 0),
        info(record, ParamKey::StellarRadius, "Radius (R☉)", 2),
        info(record, ParamKey::StellarMass, "Mass (M☉)", 2),
        info(record, ParamKey::StellarAge, "Age (Gyr)", 2),
        info(record, ParamKey::StellarMetallicity, "Metallicity [Fe/H]", 2),
        info(record, ParamKey::Luminosity, "Luminosity log(L/L☉)", 3),
        info(record, ParamKey::Distance, "Distance (pc)", 2),
    ];
    let orbit_info = vec![
        info(record, ParamKey::OrbitalPeriod, "Orbital period (days)", 2),
        info(record, ParamKey::SemiMajorAxis, "Semi-major axis (AU)", 4),
        info(record, ParamKey::Eccentricity, "Eccentricity", 3),
        info(record, ParamKey::Inclination, "Inclination (deg)", 2),
    ];

    let travel = derived
        .travel
        .map(|t| {
            vec![
                TravelLine {
                    label: "Current technology (~0.0057% c)".into(),
                    years: format_value(Some(t.current_tech_years), 0),
                },
                TravelLine {
                    label: "20% of light speed".into(),
                    years: format_value(Some(t.twenty_percent_years), 1),
                },
                TravelLine {
                    label: "Near light speed (99.99% c)".into(),
                    years: format_value(Some(t.near_light_years), 2),
                },
            ]
        })
        .unwrap_or_default();

    PlanetReport {
        name: record.name.clone(),
        display_name: record.display_name.clone(),
        star_name: record
            .star_name()
            .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string),
        classification: derived.classification.to_string(),
        indices,
        factors,
        sephi_components,
        planet_info,
        star_info,
        orbit_info,
        habitable_zone: derived
            .habitable_zone
            .as_ref()
            .map(|hz| hz_info(hz, record.number(ParamKey::SemiMajorAxis))),
        distance_ly: format_value(derived.travel.map(|t| t.distance_ly), 2),
        travel,
        warnings: analysis.warnings.iter().map(ToString::to_string).collect(),
        fetched_at: record.fetched_at,
    }
}

/// One row of the ranked summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub rank: usize,
    pub display_name: String,
    pub classification: String,
    pub esi: ScoreLine,
    pub phi: ScoreLine,
    pub sph: ScoreLine,
    pub sephi: ScoreLine,
}

/// Cross-planet comparison, ranked by ESI with undetermined ESI last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub rows: Vec<SummaryRow>,
    /// Averages over determined values only.
    pub average_esi: Option<f64>,
    pub average_phi: Option<f64>,
    pub average_sph: Option<f64>,
    pub average_sephi: Option<f64>,
    /// Requested names that could not be analyzed, with the reason.
    pub failures: Vec<(String, String)>,
}

fn average(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let determined: Vec<f64> = values.flatten().collect();
    if determined.is_empty() {
        None
    } else {
        Some(determined.iter().sum::<f64>() / determined.len() as f64)
    }
}

pub fn summary_report(outcome: &BatchOutcome) -> SummaryReport {
    let mut ranked: Vec<&PlanetAnalysis> = outcome.analyses.iter().collect();
    ranked.sort_by(|a, b| match (a.scores.esi.value, b.scores.esi.value) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let rows = ranked
        .iter()
        .enumerate()
        .map(|(i, a)| SummaryRow {
            rank: i + 1,
            display_name: a.record.display_name.clone(),
            classification: a.scores.derived.classification.to_string(),
            esi: ScoreLine::new("ESI", a.scores.esi.value),
            phi: ScoreLine::new("PHI", Some(a.scores.phi.value)),
            sph: ScoreLine::new("SPH", a.scores.sph),
            sephi: ScoreLine::new("SEPHI", a.scores.sephi.map(|s| s.total)),
        })
        .collect();

    let analyses = &outcome.analyses;
    SummaryReport {
        rows,
        average_esi: average(analyses.iter().map(|a| a.scores.esi.value)),
        average_phi: average(analyses.iter().map(|a| Some(a.scores.phi.value))),
        average_sph: average(analyses.iter().map(|a| a.scores.sph)),
        average_sephi: average(analyses.iter().map(|a| a.scores.sephi.map(|s| s.total))),
        failures: outcome
            .failures
            .iter()
            .map(|(name, e)| (name.clone(), e.to_string()))
            .collect(),
    }
}
