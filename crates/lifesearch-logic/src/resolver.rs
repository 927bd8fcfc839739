//! Parameter resolution — merge all sources into one canonical record.
//!
//! Merge is field by field in [`Provenance::MERGE_ORDER`], so a planet may
//! take its radius from the API and its eccentricity from HWC. Gaps left
//! after the merge are filled by derivation.

use std::collections::BTreeMap;

use crate::catalog::{self, ApiResult, CatalogKind, RawRow};
use crate::derivation;
use crate::error::{ResolveError, Warning};
use crate::names::normalize;
use crate::overrides::PlanetOverride;
use crate::params::{ParamKey, ParamValue, ParameterRecord, Provenance, Tagged};

/// Already-fetched source data for one planet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sources<'a> {
    pub api: Option<&'a ApiResult>,
    pub hwc: Option<&'a RawRow>,
    pub hz_gallery: Option<&'a RawRow>,
}

/// A resolved record plus the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub record: ParameterRecord,
    pub warnings: Vec<Warning>,
}

/// Merge layered source values into one tagged map.
///
/// Layers are consulted in [`Provenance::MERGE_ORDER`] whatever order they
/// are passed in; the first layer to supply a key wins.
pub fn merge(layers: &[(Provenance, Vec<(ParamKey, ParamValue)>)]) -> BTreeMap<ParamKey, Tagged> {
    let mut out = BTreeMap::new();
    for source in Provenance::MERGE_ORDER {
        for (_, values) in layers.iter().filter(|(p, _)| *p == source) {
            for (key, value) in values {
                out.entry(*key).or_insert_with(|| Tagged {
                    value: value.clone(),
                    source,
                });
            }
        }
    }
    out
}

/// Build the canonical record for `name`.
///
/// Fails only when no source knows the planet and the override gives
/// neither radius nor mass.
pub fn resolve(
    name: &str,
    sources: Sources<'_>,
    overrides: Option<&PlanetOverride>,
) -> Result<Resolved, ResolveError> {
    let key = normalize(name);
    if key.is_empty() {
        return Err(ResolveError::EmptyName {
            raw: name.to_string(),
        });
    }

    let mut warnings = Vec::new();
    let mut layers = Vec::with_capacity(4);
    let mut fetched_at = None;
    let mut api_name = None;

    match sources.api {
        Some(ApiResult::Found {
            row,
            fetched_at: at,
        }) => {
            layers.push((Provenance::Api, catalog::api_values(row)));
            fetched_at = *at;
            api_name = catalog::row_text(row, "pl_name");
        }
        Some(ApiResult::Unavailable) => {
            log::warn!("{name}: archive API unavailable, using catalogs");
            warnings.push(Warning::SourceUnavailable {
                source_name: "archive API",
            });
        }
        Some(ApiResult::NotFound) | None => {}
    }
    if let Some(row) = sources.hwc {
        layers.push((Provenance::Hwc, CatalogKind::Hwc.extract(row)));
    }
    if let Some(row) = sources.hz_gallery {
        layers.push((Provenance::HzGallery, CatalogKind::HzGallery.extract(row)));
    }

    let sufficient_override = overrides.is_some_and(PlanetOverride::is_sufficient);
    if layers.is_empty() && !sufficient_override {
        log::warn!("{name}: no source recognizes this planet");
        return Err(ResolveError::PlanetNotFound {
            name: name.trim().to_string(),
        });
    }

    if let Some(o) = overrides {
        layers.push((
            Provenance::Override,
            o.values.iter().map(|(k, v)| (*k, v.clone())).collect(),
        ));
    }

    let display = api_name
        .map(str::to_string)
        .or_else(|| overrides.map(|o| o.display_name.clone()))
        .unwrap_or_else(|| name.trim().to_string());

    let mut record = ParameterRecord::new(key, display);
    record.values = merge(&layers);
    record.fetched_at = fetched_at;
    if let Some(row) = sources.hwc {
        record.hwc_esi = catalog::hwc_esi(row);
        record.hwc_phi = catalog::hwc_phi(row);
    }

    let filled = derivation::fill_gaps(&mut record);
    if !filled.is_empty() {
        log::debug!("{}: derived {} fields", record.name, filled.len());
    }

    warnings.extend(record.missing_core().into_iter().map(Warning::MissingField));
    log::info!(
        "{}: resolved {} parameters ({} derived)",
        record.display_name,
        record.values.len(),
        filled.len()
    );
    Ok(Resolved { record, warnings })
}
