use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn fma() -> Command {
    Command::cargo_bin("fma").unwrap()
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn version_prints_binary_name() {
    fma()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("fma "));
}

#[test]
fn convert_per_hectare_to_per_tonne() {
    fma()
        .args([
            "convert", "--value", "400", "--from", "per_hectare", "--to", "per_tonne", "--area", "100",
            "--yield-per-ha", "8",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"value\": \"50\""))
        .stdout(predicate::str::contains("\"unit\": \"per_tonne\""));
}

#[test]
fn convert_minimal_prints_value_and_unit() {
    fma()
        .args([
            "--output", "minimal", "convert", "--value", "400", "--from", "per-hectare", "--to", "total",
            "--area", "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("40000 total"));
}

#[test]
fn convert_to_per_tonne_with_zero_yield_is_not_available() {
    fma()
        .args([
            "--output", "minimal", "convert", "--value", "400", "--from", "per_hectare", "--to", "per_tonne",
            "--area", "100", "--yield-per-ha", "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("N/A"));
}

#[test]
fn convert_per_tonne_requires_yield_flag() {
    for to in ["total", "per_hectare"] {
        fma()
            .args(["--output", "minimal", "convert", "--value", "50", "--from", "per_tonne", "--to", to, "--area", "100"])
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("--yield-per-ha is required for per-tonne figures"));
    }
    fma()
        .args(["convert", "--value", "400", "--from", "per_hectare", "--to", "per_tonne", "--area", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yield-per-ha is required"));
}

#[test]
fn convert_area_only_units_need_no_yield() {
    fma()
        .args(["--output", "minimal", "convert", "--value", "400", "--from", "per_hectare", "--to", "total", "--area", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40000 total"));
}

#[test]
fn convert_rejects_unknown_unit() {
    fma()
        .args(["convert", "--value", "1", "--from", "per_acre", "--to", "total", "--area", "1"])
        .assert()
        .failure();
}

#[test]
fn convert_rejects_zero_area() {
    fma()
        .args(["convert", "--value", "1", "--from", "per_hectare", "--to", "total", "--area", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn variance_from_flags() {
    fma()
        .args(["variance", "--actual", "230", "--reference", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"direction\": \"over\""));
}

#[test]
fn benchmark_degenerate_range_sits_mid_scale() {
    fma()
        .args([
            "--output", "minimal", "benchmark", "--name", "seed", "--min", "100", "--max", "100", "--average",
            "100", "--current", "90",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("seed: below_average (50%)"));
}

#[test]
fn benchmark_accepts_negative_figures() {
    fma()
        .args([
            "--output", "minimal", "benchmark", "--name", "margin", "--min", "-20", "--max", "20", "--average", "0",
            "--current", "-10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("margin: below_average (25"));
}

#[test]
fn aggregate_places_synthetic_totals() {
    fma()
        .args(["aggregate", "--input", &fixture("aggregate.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Input Costs"))
        .stdout(predicate::str::contains("Total Operation Costs"));
}

#[test]
fn aggregate_drill_down_lists_sub_categories() {
    fma()
        .args([
            "--output", "csv", "aggregate", "--input", &fixture("aggregate.json"), "--drill-down", "chemicals",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("herbicide"))
        .stdout(predicate::str::contains("fungicide"));
}

#[test]
fn aggregate_unknown_drill_down_fails() {
    fma()
        .args(["aggregate", "--input", &fixture("aggregate.json"), "--drill-down", "labour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("labour"));
}

#[test]
fn profitability_reference_break_even() {
    fma()
        .args(["--output", "minimal", "profitability", "--input", &fixture("profitability.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("68.75"));
}

#[test]
fn profitability_reads_stdin() {
    let body = std::fs::read_to_string(fixture("profitability.json")).unwrap();
    fma()
        .arg("profitability")
        .write_stdin(body)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"profit_loss\": \"60500"));
}

#[test]
fn profitability_rejects_scenario_with_negative_costs() {
    let body = r#"{
        "financials": {
            "area": 100, "yield_per_ha": 8, "achieved_price": 220, "percent_sold": 50,
            "costs": {
                "variable": [{"name": "inputs", "current": 400}],
                "operations": [{"name": "operations", "current": 150}]
            }
        },
        "scenarios": [{"name": "cuts", "variable_cost_change_pct": -300}]
    }"#;
    fma()
        .arg("profitability")
        .write_stdin(body)
        .assert()
        .failure()
        .stderr(predicate::str::contains("scenarios.cuts"));
}

#[test]
fn profitability_without_input_fails() {
    fma()
        .arg("profitability")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input file is required"));
}

#[test]
fn analyze_uses_store_budget() {
    fma()
        .args([
            "analyze",
            "--input",
            &fixture("crop.json"),
            "--budgets",
            &fixture("budgets.json"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"ww-2026\""))
        .stdout(predicate::str::contains("\"yield_source\": \"crop_defaults\""));
}

#[test]
fn analyze_with_yaml_crop_defaults() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "fallback:\n  yield_per_ha: 7\n  price_per_tonne: 180\ncrops:\n  winter wheat:\n    yield_per_ha: 8\n    price_per_tonne: 220"
    )
    .unwrap();

    fma()
        .args([
            "--output",
            "minimal",
            "analyze",
            "--input",
            &fixture("crop.json"),
            "--crop-defaults",
            file.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("68.75"));
}

#[test]
fn analyze_warns_when_no_budget_in_table_output() {
    fma()
        .args(["--output", "table", "analyze", "--input", &fixture("crop.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings:"))
        .stdout(predicate::str::contains("No budget"));
}

#[test]
fn analyze_table_splits_nested_sections() {
    fma()
        .args(["--output", "table", "analyze", "--input", &fixture("crop.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\nprofitability:"))
        .stdout(predicate::str::contains("\nterms:"))
        .stdout(predicate::str::contains("\ncosts.rows:"))
        .stdout(predicate::str::contains("\nvariances.categories:"))
        .stdout(predicate::str::contains("{\"include_operations\"").not());
}

#[test]
fn debug_logs_go_to_stderr() {
    fma()
        .env_remove("RUST_LOG")
        .args([
            "--log-level",
            "debug",
            "--output",
            "minimal",
            "profitability",
            "--input",
            &fixture("profitability.json"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("68.75"))
        .stdout(predicate::str::contains("DEBUG").not());
}
