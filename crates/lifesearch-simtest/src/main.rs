//! LifeSearch Headless Scoring Harness
//!
//! Validates the pure scoring logic and reference values without the web
//! app. Runs entirely in-process — no network, no rendering.
//!
//! Usage:
//!   cargo run -p lifesearch-simtest
//!   cargo run -p lifesearch-simtest -- --verbose
//!   cargo run -p lifesearch-simtest -- --input batch.json --json

use std::path::PathBuf;

use clap::Parser;
use lifesearch_logic::analysis::{analyze_batch, BatchOutcome};
use lifesearch_logic::classification::{MassClass, TemperatureClass};
use lifesearch_logic::config::{validate_request, BatchRequest};
use lifesearch_logic::constants::earth;
use lifesearch_logic::derivation::{equilibrium_temperature, estimate_mass, semi_major_axis};
use lifesearch_logic::overrides::parse_overrides;
use lifesearch_logic::params::{ParamKey, ParamValue, ParameterRecord, Provenance};
use lifesearch_logic::report::{planet_report, summary_report};
use lifesearch_logic::scoring::{esi, phi, phi_factors, sph};
use lifesearch_logic::sephi::{sephi, SephiInputs};
use lifesearch_logic::weights::{Scope, WeightKey, WeightSet, WeightStore};

// ── Sample batch (same JSON the integration tests use) ──────────────────
const SAMPLE_JSON: &str = include_str!("../../../data/sample_batch.json");

#[derive(Parser)]
#[command(name = "lifesearch-simtest")]
#[command(about = "Headless scoring harness for LifeSearch")]
struct Cli {
    /// Print every check, not only failures
    #[arg(short, long)]
    verbose: bool,

    /// Batch request JSON to run instead of the bundled sample
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print the summary and per-planet reports as JSON
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    println!("=== LifeSearch Scoring Harness ===\n");

    let json = match &cli.input {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                log::error!("cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => SAMPLE_JSON.to_string(),
    };

    let mut results = Vec::new();

    // 1. Request parsing and validation
    let request = validate_batch_request(&json, &mut results);

    // 2. Derivation reference values
    results.extend(validate_derivation(cli.verbose));

    // 3. Classification boundaries
    results.extend(validate_classification());

    // 4. Index reference values
    results.extend(validate_indices(cli.verbose));

    // 5. SEPHI reference planet
    results.extend(validate_sephi(cli.verbose));

    // 6. Weight store
    results.extend(validate_weight_store());

    // 7. Override parsing
    results.extend(validate_overrides());

    // 8. Full batch
    let outcome = request.map(|r| {
        let mut store = WeightStore::new();
        let outcome = analyze_batch(&r, &mut store);
        results.extend(validate_batch(&outcome));
        outcome
    });

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    if let Some(outcome) = &outcome {
        print_summary(outcome, cli.json);
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Request ──────────────────────────────────────────────────────────

fn validate_batch_request(json: &str, results: &mut Vec<TestResult>) -> Option<BatchRequest> {
    println!("--- Batch Request ---");
    let request: BatchRequest = match serde_json::from_str(json) {
        Ok(r) => r,
        Err(e) => {
            results.push(check("request_parse", false, format!("JSON parse error: {e}")));
            return None;
        }
    };
    results.push(check(
        "request_parse",
        true,
        format!(
            "{} planets, {} HWC rows, {} HZGallery rows",
            request.planets.len(),
            request.hwc.len(),
            request.hz_gallery.len()
        ),
    ));

    let errors = validate_request(&request);
    results.push(check(
        "request_valid",
        errors.is_empty(),
        if errors.is_empty() {
            "no validation errors".to_string()
        } else {
            errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
        },
    ));
    Some(request)
}

// ── 2. Derivation ───────────────────────────────────────────────────────

fn validate_derivation(verbose: bool) -> Vec<TestResult> {
    println!("--- Derivation ---");
    let mut results = Vec::new();

    // Earth around the Sun at 1 AU
    let teq = equilibrium_temperature(Some(5778.0), Some(1.0), Some(1.0));
    if verbose {
        println!("  Earth T_eq: {teq:?}");
    }
    results.push(check(
        "derivation_earth_teq",
        teq.as_ref().is_ok_and(|t| (t - earth::EQUILIBRIUM_TEMP).abs() < 1.0),
        format!("{teq:?} (reference {} K)", earth::EQUILIBRIUM_TEMP),
    ));

    results.push(check(
        "derivation_teq_needs_axis",
        equilibrium_temperature(Some(5778.0), Some(1.0), None).is_err(),
        "missing semi-major axis is undetermined",
    ));

    let a = semi_major_axis(365.25, 1.0);
    results.push(check(
        "derivation_kepler_one_au",
        a.is_some_and(|a| (a - 1.0).abs() < 0.01),
        format!("1 yr around 1 M☉ → {a:?} AU"),
    ));

    let rocky = estimate_mass(1.0);
    let gaseous = estimate_mass(2.0);
    results.push(check(
        "derivation_mass_estimate",
        rocky == Some(1.0) && gaseous == Some(4.0) && estimate_mass(0.0).is_none(),
        format!("r=1 → {rocky:?}, r=2 → {gaseous:?}"),
    ));

    results
}

// ── 3. Classification ───────────────────────────────────────────────────

fn validate_classification() -> Vec<TestResult> {
    println!("--- Classification ---");
    let mut results = Vec::new();

    let boundaries = [
        (0.1, MassClass::Subterran),
        (0.099_99, MassClass::Mercurian),
        (1.0, MassClass::Terran),
        (20.3, MassClass::Neptunian),
    ];
    let wrong: Vec<_> = boundaries
        .iter()
        .filter(|(m, class)| MassClass::from_mass(Some(*m)) != *class)
        .collect();
    results.push(check(
        "class_mass_boundaries",
        wrong.is_empty(),
        if wrong.is_empty() {
            "lower bounds inclusive".to_string()
        } else {
            format!("misclassified: {wrong:?}")
        },
    ));

    results.push(check(
        "class_temperature_boundary",
        TemperatureClass::from_temperature(Some(273.0)) != TemperatureClass::from_temperature(Some(272.999)),
        "273 K starts a new class",
    ));

    results.push(check(
        "class_unknown_without_data",
        !MassClass::from_mass(None).is_known()
            && TemperatureClass::from_temperature(None) == TemperatureClass::Unknown,
        "missing inputs give unknown classes",
    ));

    results
}

// ── 4. Indices ──────────────────────────────────────────────────────────

fn earth_record() -> ParameterRecord {
    let mut r = ParameterRecord::new("earth", "Earth");
    for (key, value) in [
        (ParamKey::Radius, earth::RADIUS),
        (ParamKey::Density, earth::DENSITY),
        (ParamKey::EquilibriumTemp, earth::EQUILIBRIUM_TEMP),
    ] {
        r.insert(key, ParamValue::Number(value), Provenance::Override);
    }
    r
}

fn validate_indices(verbose: bool) -> Vec<TestResult> {
    println!("--- Indices ---");
    let mut results = Vec::new();

    let earth = esi(&earth_record(), &WeightSet::default(), &mut Vec::new());
    results.push(check(
        "esi_earth_is_100",
        earth.value.is_some_and(|v| (v - 100.0).abs() < 1e-9),
        format!("ESI(Earth) = {:?}", earth.value),
    ));

    let zero_phi = WeightSet {
        solid_surface: 0.0,
        stable_energy: 0.0,
        life_compounds: 0.0,
        stable_orbit: 0.0,
        ..WeightSet::default()
    };
    let worked = phi(
        &phi_factors(MassClass::Superterran, Some("M2 V"), None, Some(0.1)),
        &zero_phi,
    );
    if verbose {
        for c in &worked.components {
            println!("  PHI {}: raw {:.2} weight {:.2}", c.key, c.raw, c.weight);
        }
    }
    results.push(check(
        "phi_worked_example",
        (worked.value - 42.5).abs() < 1e-9,
        format!("PHI = {:.2} (expected 42.50)", worked.value),
    ));

    let full = phi(
        &phi_factors(MassClass::Jovian, None, None, None),
        &WeightSet::default(),
    );
    results.push(check(
        "phi_full_weights_saturate",
        (full.value - 100.0).abs() < 1e-9,
        format!("PHI at default weights = {:.2}", full.value),
    ));

    let bands = [
        (298.15, 100.0),
        (273.15, 70.0),
        (260.0, 40.0),
        (400.0, 10.0),
    ];
    let off: Vec<_> = bands
        .iter()
        .filter(|(t, expected)| sph(Some(*t)).map_or(true, |s| (s - expected).abs() > 1e-9))
        .collect();
    results.push(check(
        "sph_bands",
        off.is_empty() && sph(None).is_none(),
        if off.is_empty() {
            "band scores match".to_string()
        } else {
            format!("off-band: {off:?}")
        },
    ));

    results
}

// ── 5. SEPHI ────────────────────────────────────────────────────────────

fn validate_sephi(verbose: bool) -> Vec<TestResult> {
    println!("--- SEPHI ---");
    let mut results = Vec::new();

    let earth = SephiInputs {
        mass: 1.0,
        radius: 1.0,
        period: 365.25,
        stellar_mass: 1.0,
        stellar_radius: 1.0,
        stellar_teff: 5778.0,
        age: 4.6,
        density: earth::DENSITY,
    };
    let s = sephi(&earth);
    if verbose {
        println!(
            "  Earth SEPHI {:.2} (L1 {:.2} L2 {:.2} L3 {:.2} L4 {:.2})",
            s.total, s.l1, s.l2, s.l3, s.l4
        );
    }
    results.push(check(
        "sephi_earth",
        (s.total - 100.0).abs() < 1.0,
        format!("SEPHI(Earth) = {:.2}", s.total),
    ));

    let hot = sephi(&SephiInputs {
        period: 10.0,
        ..earth
    });
    results.push(check(
        "sephi_hot_orbit_no_water",
        hot.l3 == 0.0 && hot.total == 0.0,
        format!("10-day orbit: L3 {:.2}, total {:.2}", hot.l3, hot.total),
    ));

    results
}

// ── 6. Weight store ─────────────────────────────────────────────────────

fn validate_weight_store() -> Vec<TestResult> {
    println!("--- Weight Store ---");
    let mut results = Vec::new();
    let mut store = WeightStore::new();
    let scope = Scope::planet("Kepler-22 b");

    let seed = WeightSet::default().with(WeightKey::Size, 0.65);
    store.ensure_planet("Kepler-22 b", Some(seed));
    results.push(check(
        "weights_seeded",
        store.get(&scope) == seed,
        "first access starts from the seed",
    ));

    let before = store.get(&scope);
    let rejected = store.set(
        &scope,
        [(WeightKey::Size, 0.2), (WeightKey::StableOrbit, 0.5)]
            .into_iter()
            .collect(),
    );
    results.push(check(
        "weights_write_atomic",
        rejected.is_err() && store.get(&scope) == before,
        "out-of-range write leaves the scope untouched",
    ));

    let accepted = store.set(&scope, [(WeightKey::Size, 0.2)].into_iter().collect());
    let first = store.reset(&scope);
    let second = store.reset(&scope);
    results.push(check(
        "weights_reset_to_seed",
        accepted.is_ok() && first == seed && second == seed,
        "reset restores the seed and is idempotent",
    ));

    results
}

// ── 7. Overrides ────────────────────────────────────────────────────────

fn validate_overrides() -> Vec<TestResult> {
    println!("--- Overrides ---");
    let mut results = Vec::new();

    let parsed = parse_overrides("Kepler-22 b: pl_rade=2.4, st_spectype=G5 V, bogus=1");
    let k22 = parsed.set.get("kepler 22b");
    results.push(check(
        "overrides_parsed",
        k22.and_then(|o| o.number(ParamKey::Radius)) == Some(2.4),
        format!("{} planet(s) parsed", parsed.set.len()),
    ));
    results.push(check(
        "overrides_unknown_key_reported",
        parsed.errors_for("Kepler-22 b").len() == 1,
        format!("{} error(s) for Kepler-22 b", parsed.errors_for("Kepler-22 b").len()),
    ));

    results
}

// ── 8. Batch ────────────────────────────────────────────────────────────

fn validate_batch(outcome: &BatchOutcome) -> Vec<TestResult> {
    println!("--- Batch ---");
    let mut results = Vec::new();

    results.push(check(
        "batch_completes",
        !outcome.analyses.is_empty(),
        format!(
            "{} analyzed, {} failed",
            outcome.analyses.len(),
            outcome.failures.len()
        ),
    ));

    let out_of_range: Vec<&str> = outcome
        .analyses
        .iter()
        .filter(|a| {
            let s = &a.scores;
            let pct = |v: f64| (0.0..=100.0).contains(&v);
            !(s.esi.value.map_or(true, pct)
                && pct(s.phi.value)
                && s.sph.map_or(true, |v| v == 10.0 || v == 40.0 || (70.0..=100.0).contains(&v))
                && s.sephi.map_or(true, |v| pct(v.total))
                && s.factors.iter().all(|f| pct(f.score)))
        })
        .map(|a| a.record.display_name.as_str())
        .collect();
    results.push(check(
        "batch_scores_in_range",
        out_of_range.is_empty(),
        if out_of_range.is_empty() {
            "every index within its range".to_string()
        } else {
            format!("out of range: {}", out_of_range.join(", "))
        },
    ));

    let unsourced: Vec<&str> = outcome
        .analyses
        .iter()
        .filter(|a| a.record.values.is_empty())
        .map(|a| a.record.display_name.as_str())
        .collect();
    results.push(check(
        "batch_records_populated",
        unsourced.is_empty(),
        format!("{} record(s) without values", unsourced.len()),
    ));

    results
}

fn print_summary(outcome: &BatchOutcome, json: bool) {
    let summary = summary_report(outcome);
    if json {
        let planets: Vec<_> = outcome.analyses.iter().map(planet_report).collect();
        let doc = serde_json::json!({ "summary": summary, "planets": planets });
        match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("\n{s}"),
            Err(e) => log::error!("cannot serialize summary: {e}"),
        }
        return;
    }

    println!("\n--- Summary ---");
    println!(
        "  {:>3}  {:<20} {:>8} {:>8} {:>8} {:>8}  {}",
        "#", "Planet", "ESI", "PHI", "SPH", "SEPHI", "Class"
    );
    for row in &summary.rows {
        println!(
            "  {:>3}  {:<20} {:>8} {:>8} {:>8} {:>8}  {}",
            row.rank,
            row.display_name,
            row.esi.display,
            row.phi.display,
            row.sph.display,
            row.sephi.display,
            row.classification
        );
    }
    for (name, reason) in &summary.failures {
        println!("  ✗ {name}: {reason}");
    }
}
