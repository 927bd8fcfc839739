//! Per-planet pipeline: resolve → derive → seed weights → score.
//!
//! A batch never aborts because one planet fails; failures are collected
//! next to the successful analyses.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, CatalogKind};
use crate::config::BatchRequest;
use crate::derivation::DerivedQuantities;
use crate::error::{ResolveError, Warning};
use crate::overrides::{parse_overrides, ParsedOverrides};
use crate::params::ParameterRecord;
use crate::resolver::{self, Sources};
use crate::scoring::{self, ScoreBundle};
use crate::weights::{Scope, WeightSet, WeightStore};

/// Result of analyzing one planet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetAnalysis {
    pub record: ParameterRecord,
    pub scores: ScoreBundle,
    pub warnings: Vec<Warning>,
    /// Warnings from resolution only, kept so a rescore can start from them.
    resolve_warnings: Vec<Warning>,
}

impl PlanetAnalysis {
    /// Score a resolved record with explicit weights.
    pub fn score(record: ParameterRecord, resolve_warnings: Vec<Warning>, weights: &WeightSet) -> Self {
        let (derived, undetermined) = DerivedQuantities::from_record(&record);
        let (scores, score_warnings) = scoring::score(&record, &derived, weights);
        let mut warnings = resolve_warnings.clone();
        warnings.extend(undetermined.into_iter().map(Warning::from));
        warnings.extend(score_warnings);
        dedup(&mut warnings);
        Self {
            record,
            scores,
            warnings,
            resolve_warnings,
        }
    }

    /// Recompute scores after a weight change. Resolution is not repeated.
    pub fn rescore(&self, weights: &WeightSet) -> Self {
        Self::score(self.record.clone(), self.resolve_warnings.clone(), weights)
    }
}

fn dedup(warnings: &mut Vec<Warning>) {
    let mut seen = Vec::with_capacity(warnings.len());
    warnings.retain(|w| {
        if seen.contains(w) {
            false
        } else {
            seen.push(w.clone());
            true
        }
    });
}

/// Loaded catalogs and parsed overrides shared by every planet in a batch.
#[derive(Debug, Clone)]
pub struct Context {
    pub hwc: Catalog,
    pub hz_gallery: Catalog,
    pub overrides: ParsedOverrides,
}

impl Context {
    pub fn from_request(request: &BatchRequest) -> Self {
        Self {
            hwc: Catalog::from_rows(CatalogKind::Hwc, request.hwc.iter().cloned()),
            hz_gallery: Catalog::from_rows(CatalogKind::HzGallery, request.hz_gallery.iter().cloned()),
            overrides: parse_overrides(&request.overrides),
        }
    }
}

/// Analyze one planet. Registers its seeded weights in `store` on first
/// sight and scores with whatever the store resolves for it.
pub fn analyze_planet(
    name: &str,
    request: &BatchRequest,
    context: &Context,
    store: &mut WeightStore,
) -> Result<PlanetAnalysis, ResolveError> {
    let hwc = context.hwc.lookup(name);
    let sources = Sources {
        api: request.api_for(name),
        hwc,
        hz_gallery: context.hz_gallery.lookup(name),
    };
    let resolved = resolver::resolve(name, sources, context.overrides.set.get(name))?;
    let mut resolve_warnings = resolved.warnings;
    resolve_warnings.extend(
        context
            .overrides
            .errors_for(name)
            .into_iter()
            .map(Warning::from),
    );

    let record = resolved.record;
    let (derived, _) = DerivedQuantities::from_record(&record);
    let seed = scoring::seed_weights(&record, &derived, hwc);
    store.ensure_planet(&record.name, Some(seed));
    let weights = store.get(&Scope::Planet(record.name.clone()));

    Ok(PlanetAnalysis::score(record, resolve_warnings, &weights))
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub analyses: Vec<PlanetAnalysis>,
    /// Planets that could not be analyzed, by requested name.
    pub failures: BTreeMap<String, ResolveError>,
    /// Override segments that could not be tied to any planet.
    pub override_errors: Vec<Warning>,
}

/// Apply the request's weight overrides to the store. Invalid sets are
/// skipped with a warning; validation reports them separately.
pub fn apply_request_weights(request: &BatchRequest, store: &mut WeightStore) {
    if !request.global_weights.is_empty() {
        if let Err(e) = store.set(&Scope::Global, request.global_weights.clone()) {
            log::warn!("ignoring global weights: {e}");
        }
    }
    for (planet, overrides) in &request.planet_weights {
        if let Err(e) = store.set(&Scope::planet(planet), overrides.clone()) {
            log::warn!("ignoring weights for {planet}: {e}");
        }
    }
}

/// Analyze every requested planet. Individual failures are collected; the
/// batch always completes.
pub fn analyze_batch(request: &BatchRequest, store: &mut WeightStore) -> BatchOutcome {
    let context = Context::from_request(request);
    apply_request_weights(request, store);

    let mut outcome = BatchOutcome {
        override_errors: context
            .overrides
            .parse_errors()
            .cloned()
            .map(Warning::from)
            .collect(),
        ..BatchOutcome::default()
    };
    for name in &request.planets {
        match analyze_planet(name, request, &context, store) {
            Ok(analysis) => outcome.analyses.push(analysis),
            Err(e) => {
                log::warn!("{name}: {e}");
                outcome.failures.insert(name.clone(), e);
            }
        }
    }
    log::info!(
        "batch complete: {} analyzed, {} failed",
        outcome.analyses.len(),
        outcome.failures.len()
    );
    outcome
}
