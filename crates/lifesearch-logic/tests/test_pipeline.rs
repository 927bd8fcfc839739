//! Integration tests for the full analysis pipeline.
//!
//! Exercises: BatchRequest → Resolver → Derivation → WeightStore seeding
//! → Scoring → Report assembly
//!
//! All tests are pure logic — no network, no rendering.

use approx::assert_relative_eq;

use lifesearch_logic::analysis::{analyze_batch, BatchOutcome, PlanetAnalysis};
use lifesearch_logic::catalog::{ApiResult, RawRow, RawValue};
use lifesearch_logic::classification::MassClass;
use lifesearch_logic::config::{validate_request, BatchRequest};
use lifesearch_logic::derivation::HzSource;
use lifesearch_logic::error::{ResolveError, Warning};
use lifesearch_logic::params::{ParamKey, Provenance};
use lifesearch_logic::report::{planet_report, summary_report};
use lifesearch_logic::weights::{Scope, WeightKey, WeightStore};

// ── Helpers ────────────────────────────────────────────────────────────

const SAMPLE: &str = include_str!("../../../data/sample_batch.json");

fn sample() -> BatchRequest {
    serde_json::from_str(SAMPLE).expect("sample batch parses")
}

fn run(request: &BatchRequest) -> (BatchOutcome, WeightStore) {
    let mut store = WeightStore::new();
    let outcome = analyze_batch(request, &mut store);
    (outcome, store)
}

fn find<'a>(outcome: &'a BatchOutcome, name: &str) -> &'a PlanetAnalysis {
    outcome
        .analyses
        .iter()
        .find(|a| a.record.display_name == name)
        .unwrap_or_else(|| panic!("{name} not analyzed"))
}

fn row(cells: &[(&str, RawValue)]) -> RawRow {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn single(name: &str, api: ApiResult) -> BatchRequest {
    let mut r = BatchRequest {
        planets: vec![name.to_string()],
        ..BatchRequest::default()
    };
    r.api.insert(name.to_string(), api);
    r
}

// ── Sample batch ───────────────────────────────────────────────────────

#[test]
fn sample_request_is_valid() {
    assert!(validate_request(&sample()).is_empty());
}

#[test]
fn sample_batch_skips_only_unknown_planet() {
    let (outcome, _) = run(&sample());
    assert_eq!(outcome.analyses.len(), 4);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        outcome.failures.get("Ghost b"),
        Some(ResolveError::PlanetNotFound { .. })
    ));
    assert!(outcome.override_errors.is_empty());
}

#[test]
fn merge_is_field_by_field_across_sources() {
    let (outcome, _) = run(&sample());
    let k22 = find(&outcome, "Kepler-22 b");
    assert_eq!(k22.record.source(ParamKey::Radius), Some(Provenance::Api));
    // API mass is null, so HWC supplies it.
    assert_eq!(k22.record.source(ParamKey::Mass), Some(Provenance::Hwc));
    assert_eq!(k22.record.number(ParamKey::Mass), Some(20.3));
    assert_eq!(k22.record.source(ParamKey::StellarAge), Some(Provenance::Hwc));
    assert_eq!(k22.scores.derived.classification.mass, MassClass::Neptunian);
    assert!(k22.record.fetched_at.is_some());
}

#[test]
fn unavailable_api_falls_back_to_catalog() {
    let (outcome, _) = run(&sample());
    let proxima = find(&outcome, "Proxima Cen b");
    assert_eq!(proxima.record.source(ParamKey::Radius), Some(Provenance::Hwc));
    assert_eq!(proxima.record.number(ParamKey::EquilibriumTemp), Some(234.0));
    assert!(proxima
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::SourceUnavailable { .. })));
    assert!(proxima.record.fetched_at.is_none());
}

#[test]
fn override_wins_over_catalog() {
    let (outcome, _) = run(&sample());
    let k452 = find(&outcome, "Kepler-452 b");
    assert_eq!(k452.record.number(ParamKey::Radius), Some(1.5));
    assert_eq!(k452.record.source(ParamKey::Radius), Some(Provenance::Override));
    assert_eq!(k452.record.source(ParamKey::StellarMetallicity), Some(Provenance::Override));
    // 1.5 R⊕ is at the gaseous limit: m = r².
    assert_relative_eq!(k452.record.number(ParamKey::Mass).unwrap(), 2.25);
    assert_eq!(k452.scores.derived.classification.mass, MassClass::Superterran);
}

#[test]
fn catalog_habitable_zone_used_when_complete() {
    let (outcome, _) = run(&sample());
    let t1e = find(&outcome, "TRAPPIST-1 e");
    let hz = t1e.scores.derived.habitable_zone.as_ref().unwrap();
    assert_eq!(hz.source, HzSource::Catalog);
    // Measured API temperature beats the HZGallery estimate.
    assert_eq!(t1e.record.number(ParamKey::EquilibriumTemp), Some(251.3));

    let k452 = find(&outcome, "Kepler-452 b");
    assert_eq!(
        k452.scores.derived.habitable_zone.as_ref().map(|hz| hz.source),
        Some(HzSource::Derived)
    );
}

#[test]
fn index_ranges_hold_for_every_planet() {
    let (outcome, _) = run(&sample());
    for a in &outcome.analyses {
        let s = &a.scores;
        if let Some(esi) = s.esi.value {
            assert!((0.0..=100.0).contains(&esi), "{} ESI {esi}", a.record.name);
        }
        assert!((0.0..=100.0).contains(&s.phi.value), "{} PHI", a.record.name);
        if let Some(sph) = s.sph {
            assert!(
                sph == 10.0 || sph == 40.0 || (70.0..=100.0).contains(&sph),
                "{} SPH {sph}",
                a.record.name
            );
        }
        if let Some(sephi) = s.sephi {
            assert!((0.0..=100.0).contains(&sephi.total));
        }
        for f in &s.factors {
            assert!((0.0..=100.0).contains(&f.score));
        }
    }
}

#[test]
fn deterministic_output() {
    let (a, _) = run(&sample());
    let (b, _) = run(&sample());
    assert_eq!(a.analyses, b.analyses);
}

// ── Documented properties ──────────────────────────────────────────────

#[test]
fn override_radius_beats_api_radius() {
    let mut r = single(
        "Test b",
        ApiResult::Found {
            row: row(&[("pl_rade", 2.0.into())]),
            fetched_at: None,
        },
    );
    r.overrides = "Test b: pl_rade=3.0".into();
    let (outcome, _) = run(&r);
    assert_eq!(outcome.analyses[0].record.number(ParamKey::Radius), Some(3.0));
}

#[test]
fn missing_temperature_limits_esi_and_leaves_phi_alone() {
    let base = [
        ("pl_rade", RawValue::from(1.1)),
        ("pl_dens", 5.0.into()),
        ("pl_orbeccen", 0.05.into()),
        ("st_spectype", "K2 V".into()),
        ("st_age", 3.0.into()),
    ];
    let (without, _) = run(&single(
        "Cold b",
        ApiResult::Found {
            row: row(&base),
            fetched_at: None,
        },
    ));
    let a = &without.analyses[0];
    assert_eq!(a.scores.esi.components.len(), 2);
    assert!(a.scores.esi.value.is_some());
    assert_eq!(a.scores.sph, None);
    assert_eq!(a.scores.sephi, None);

    let mut with_teq = base.to_vec();
    with_teq.push(("pl_eqt", 280.0.into()));
    let (with, _) = run(&single(
        "Cold b",
        ApiResult::Found {
            row: row(&with_teq),
            fetched_at: None,
        },
    ));
    let b = &with.analyses[0];
    assert_eq!(b.scores.esi.components.len(), 3);
    assert_relative_eq!(a.scores.phi.value, b.scores.phi.value);
}

#[test]
fn worked_example_phi() {
    // HWC class 0 seeds every PHI weight to zero, leaving the raw rule mean.
    let mut r = single("Worked b", ApiResult::NotFound);
    r.hwc.push(row(&[
        ("P_NAME", "Worked b".into()),
        ("P_RADIUS", 2.07.into()),
        ("P_DENSITY", 3.06.into()),
        ("P_ECCENTRICITY", 0.1.into()),
        ("S_TYPE", "M2 V".into()),
        ("P_HABITABLE", 0.0.into()),
    ]));
    let (outcome, store) = run(&r);
    let a = &outcome.analyses[0];
    assert_relative_eq!(a.scores.phi.value, 42.5, epsilon = 1e-9);

    let seed = store.seed("Worked b").unwrap();
    assert_relative_eq!(seed.size, 1.0 - 1.07 / 3.07, epsilon = 1e-12);
    assert_relative_eq!(seed.density, 1.0 - 2.45 / 8.57, epsilon = 1e-12);
    assert_eq!(seed.stable_orbit, 0.0);

    let size = a.scores.esi.components.iter().find(|c| c.key == WeightKey::Size).unwrap();
    assert_relative_eq!(size.weight, seed.size);
}

#[test]
fn unit_weights_give_full_esi() {
    let (outcome, _) = run(&sample());
    let a = find(&outcome, "Kepler-22 b");
    let ones = lifesearch_logic::weights::WeightSet::default();
    assert_relative_eq!(a.rescore(&ones).scores.esi.value.unwrap(), 100.0);
}

// ── Weight store round trip ────────────────────────────────────────────

#[test]
fn weight_change_then_reset_restores_seeded_scores() {
    let request = sample();
    let (outcome, mut store) = run(&request);
    let before = find(&outcome, "TRAPPIST-1 e").clone();
    let scope = Scope::planet("TRAPPIST-1 e");

    let zero_esi = WeightKey::ESI.iter().map(|k| (*k, 0.0)).collect();
    let changed = store.set(&scope, zero_esi).unwrap();
    let rescored = before.rescore(&changed);
    assert!(rescored.scores.esi.value.unwrap() <= before.scores.esi.value.unwrap());

    let rejected = store.set(&scope, [(WeightKey::Density, 2.0)].into_iter().collect());
    assert!(rejected.is_err());
    assert_eq!(store.get(&scope), changed);

    let restored = store.reset(&scope);
    assert_eq!(before.rescore(&restored).scores, before.scores);
}

#[test]
fn global_weights_reach_seeded_planets() {
    let mut r = single(
        "Global b",
        ApiResult::Found {
            row: row(&[("pl_rade", 2.0.into()), ("pl_dens", 3.0.into())]),
            fetched_at: None,
        },
    );
    r.global_weights.insert(WeightKey::Size, 0.0);
    let (outcome, mut store) = run(&r);
    let a = &outcome.analyses[0];
    assert_eq!(a.scores.weights.size, 0.0);
    // Density was not set globally, so the seed still applies.
    let seed = *store.seed("Global b").unwrap();
    assert_relative_eq!(a.scores.weights.density, seed.density);
    assert_relative_eq!(seed.size, 1.0 - 1.0 / 3.0);

    let scope = Scope::planet("Global b");
    store
        .set(&Scope::Global, [(WeightKey::Density, 0.2)].into_iter().collect())
        .unwrap();
    let w = store.get(&scope);
    assert_eq!(w.density, 0.2);
    // The new global write replaced the old one, so size is seeded again.
    assert_relative_eq!(w.size, seed.size);
}

// ── Reports ────────────────────────────────────────────────────────────

#[test]
fn summary_lists_failures_and_ranks() {
    let (outcome, _) = run(&sample());
    let summary = summary_report(&outcome);
    assert_eq!(summary.rows.len(), 4);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].0, "Ghost b");
    let esis: Vec<f64> = summary.rows.iter().filter_map(|r| r.esi.value).collect();
    assert!(esis.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn planet_report_is_serializable() {
    let (outcome, _) = run(&sample());
    let report = planet_report(find(&outcome, "TRAPPIST-1 e"));
    assert_eq!(report.star_name, "TRAPPIST-1");
    assert_eq!(report.sephi_components.len(), 4);
    assert!(report.habitable_zone.is_some());
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"display_name\":\"TRAPPIST-1 e\""));
}
