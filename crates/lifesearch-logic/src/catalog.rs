//! Source rows and catalog lookup.
//!
//! The three upstream sources (archive API, HWC catalog, HZGallery catalog)
//! all arrive as loose column → value rows. Each source has a column map
//! that lifts a row into canonical [`ParamKey`] values.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::physics::CELSIUS_TO_KELVIN;
use crate::names::normalize;
use crate::params::{ParamKey, ParamValue};

/// One cell of a source row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric reading; numeric text is coerced, blanks and junk are `None`.
    pub fn as_number(&self) -> Option<f64> {
        let v = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Null | Self::Bool(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Non-blank text reading.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A column → value row as delivered by a source.
pub type RawRow = BTreeMap<String, RawValue>;

fn cell<'a>(row: &'a RawRow, column: &str) -> Option<&'a RawValue> {
    row.get(column).or_else(|| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    })
}

pub fn row_number(row: &RawRow, column: &str) -> Option<f64> {
    cell(row, column).and_then(RawValue::as_number)
}

pub fn row_text<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    cell(row, column).and_then(RawValue::as_text)
}

/// Outcome of asking the archive API about one planet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiResult {
    Found {
        row: RawRow,
        #[serde(default)]
        fetched_at: Option<DateTime<Utc>>,
    },
    #[default]
    NotFound,
    /// Timed out or failed; treated as absent.
    Unavailable,
}

/// Canonical values lifted from an API row.
pub fn api_values(row: &RawRow) -> Vec<(ParamKey, ParamValue)> {
    let mut out = Vec::new();
    for key in ParamKey::ALL {
        if key.is_text() {
            if let Some(s) = row_text(row, key.column()) {
                out.push((key, ParamValue::Text(s.to_string())));
            }
        } else if let Some(v) = row_number(row, key.column()) {
            out.push((key, ParamValue::Number(v)));
        }
    }
    out
}

/// Which offline catalog a [`Catalog`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogKind {
    Hwc,
    HzGallery,
}

const HWC_NUMERIC: [(&str, ParamKey); 12] = [
    ("P_MASS", ParamKey::Mass),
    ("P_RADIUS", ParamKey::Radius),
    ("P_DENSITY", ParamKey::Density),
    ("P_PERIOD", ParamKey::OrbitalPeriod),
    ("P_SEMI_MAJOR_AXIS", ParamKey::SemiMajorAxis),
    ("P_ECCENTRICITY", ParamKey::Eccentricity),
    ("S_TEMPERATURE", ParamKey::StellarTemp),
    ("S_RADIUS", ParamKey::StellarRadius),
    ("S_MASS", ParamKey::StellarMass),
    ("S_AGE", ParamKey::StellarAge),
    ("S_METALLICITY", ParamKey::StellarMetallicity),
    ("S_DISTANCE", ParamKey::Distance),
];

const HWC_TEXT: [(&str, ParamKey); 2] = [
    ("S_TYPE", ParamKey::SpectralType),
    ("S_NAME", ParamKey::HostName),
];

const HZ_GALLERY_NUMERIC: [(&str, ParamKey); 5] = [
    ("OHZIN", ParamKey::HzOptimisticInner),
    ("CHZIN", ParamKey::HzConservativeInner),
    ("CHZOUT", ParamKey::HzConservativeOuter),
    ("OHZOUT", ParamKey::HzOptimisticOuter),
    ("TEQA", ParamKey::EquilibriumTemp),
];

impl CatalogKind {
    /// Column holding the planet name.
    pub fn name_column(self) -> &'static str {
        match self {
            Self::Hwc => "P_NAME",
            Self::HzGallery => "PLANET",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hwc => "HWC catalog",
            Self::HzGallery => "HZGallery catalog",
        }
    }

    /// Canonical values lifted from a row of this catalog.
    pub fn extract(self, row: &RawRow) -> Vec<(ParamKey, ParamValue)> {
        let mut out = Vec::new();
        match self {
            Self::Hwc => {
                for (col, key) in HWC_NUMERIC {
                    if let Some(v) = row_number(row, col) {
                        out.push((key, ParamValue::Number(v)));
                    }
                }
                for (col, key) in HWC_TEXT {
                    if let Some(s) = row_text(row, col) {
                        out.push((key, ParamValue::Text(s.to_string())));
                    }
                }
                let teq = row_number(row, "P_TEMP_EQUIL")
                    .or_else(|| row_number(row, "P_SURFACE_TEMP_C").map(|c| c + CELSIUS_TO_KELVIN));
                if let Some(t) = teq {
                    out.push((ParamKey::EquilibriumTemp, ParamValue::Number(t)));
                }
            }
            Self::HzGallery => {
                for (col, key) in HZ_GALLERY_NUMERIC {
                    if let Some(v) = row_number(row, col) {
                        out.push((key, ParamValue::Number(v)));
                    }
                }
            }
        }
        out
    }
}

/// HWC ESI as a percent.
pub fn hwc_esi(row: &RawRow) -> Option<f64> {
    row_number(row, "P_ESI").map(|v| v * 100.0)
}

/// HWC habitability class mapped to a percent: 0 → 0, 1 → 50, above → 100.
pub fn hwc_phi(row: &RawRow) -> Option<f64> {
    row_number(row, "P_HABITABLE").map(|v| {
        if v <= 0.0 {
            0.0
        } else if v <= 1.0 {
            50.0
        } else {
            100.0
        }
    })
}

/// An offline catalog indexed by normalized planet name.
#[derive(Debug, Clone)]
pub struct Catalog {
    rows: HashMap<String, RawRow>,
}

impl Catalog {
    /// Index rows by normalized name. Rows without a name are skipped; on
    /// duplicate names the first row wins.
    pub fn from_rows(kind: CatalogKind, rows: impl IntoIterator<Item = RawRow>) -> Self {
        let mut index = HashMap::new();
        for row in rows {
            let Some(name) = row_text(&row, kind.name_column()).map(normalize) else {
                log::debug!("{}: skipping row without {}", kind.label(), kind.name_column());
                continue;
            };
            if name.is_empty() {
                continue;
            }
            if index.contains_key(&name) {
                log::warn!("{}: duplicate entry for {name}, keeping first", kind.label());
                continue;
            }
            index.insert(name, row);
        }
        log::info!("{}: indexed {} planets", kind.label(), index.len());
        Self { rows: index }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a planet, by any spelling of its name.
    pub fn lookup(&self, name: &str) -> Option<&RawRow> {
        self.rows.get(&normalize(name))
    }
}
