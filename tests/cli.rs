//! E2E tests for the taxopt commands

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::process::{Command, Output};

fn taxopt(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taxopt"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn json(output: &Output) -> Value {
    assert!(output.status.success(), "Command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Amounts serialize as decimal strings
fn amount(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("not a decimal"),
        Value::Number(n) => n.to_string().parse().expect("not a decimal"),
        other => panic!("expected an amount, got {}", other),
    }
}

/// Optimising 60k of profit in 2024-25 pays a salary at the personal allowance
#[test]
fn optimise_json_picks_personal_allowance_salary() {
    let output = taxopt(&[
        "optimise", "--profit", "60000", "--year", "2024-25", "--as-of", "2024-06-25", "--json",
    ]);
    let result = json(&output);

    assert_eq!(result["calculationType"], "salaryOptimisation");
    assert_eq!(result["taxYear"], "2024-25");
    assert_eq!(amount(&result["summary"]["salary"]), dec!(12570));
    assert_eq!(amount(&result["summary"]["takeHome"]), dec!(47233.90));
    assert_eq!(result["id"].as_str().unwrap().len(), 32);

    let report = &result["report"]["results"];
    assert!(report["personal"].is_object());
    assert!(report["company"].is_object());
    assert!(report["optimisation"].is_object());
    assert!(report["soleTrader"].is_null());
    assert!(!result["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn optimise_text_output() {
    let output = taxopt(&[
        "optimise", "-p", "60000", "-y", "2024-25", "--as-of", "2024-06-25", "--top", "3",
    ]);
    let text = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(text.contains("OPTIMISATION (maximum take-home)"));
    assert!(text.contains("TOP SCENARIOS"));
    assert!(text.contains("£12570.00"));
    assert!(text.contains("RECOMMENDATIONS"));
    assert!(text.contains("CT600"));
    assert!(text.contains("due 2025-12-31"));
}

#[test]
fn optimise_cost_objective() {
    let output = taxopt(&[
        "optimise", "-p", "50000", "-y", "2024-25", "--objective", "cost", "--json",
    ]);
    let result = json(&output);
    assert_eq!(amount(&result["summary"]["salary"]), dec!(0));
    assert_eq!(
        result["report"]["results"]["optimisation"]["objective"],
        "minCostToCompany"
    );
}

#[test]
fn optimise_csv_header() {
    let output = taxopt(&["optimise", "-p", "60000", "-y", "2024-25", "--csv"]);
    let text = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        taxopt::export::ScenarioCsvRecord::csv_header()
    );
    assert!(lines.next().unwrap().starts_with("1,12570,"));
}

#[test]
fn optimise_target_take_home() {
    let output = taxopt(&["optimise", "--target", "40000", "-y", "2024-25", "--json"]);
    let result = json(&output);
    let target = &result["report"]["results"]["optimisation"]["target"];
    assert!(amount(&target["requiredProfit"]) > dec!(40000));
    assert!(amount(&result["summary"]["takeHome"]) >= dec!(40000));
}

#[test]
fn optimise_requires_profit_or_target() {
    let output = taxopt(&["optimise", "-y", "2024-25"]);
    assert!(!output.status.success());
}

#[test]
fn unknown_year_falls_back_to_latest_rates() {
    let output = taxopt(&["optimise", "-p", "60000", "-y", "2031-32", "--json"]);
    let result = json(&output);
    assert_eq!(result["taxYear"], "2031-32");
    assert_eq!(result["ratesTaxYear"], "2025-26");
    let titles: Vec<_> = result["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect();
    assert!(titles.iter().any(|t| t.contains("different tax year")));
}

#[test]
fn malformed_year_is_rejected() {
    let output = taxopt(&["optimise", "-p", "60000", "-y", "2024/25"]);
    assert!(!output.status.success());
}

#[test]
fn compare_marks_best_and_unaffordable() {
    let output = taxopt(&[
        "compare", "-p", "60000", "-s", "0,12570,70000", "-y", "2024-25",
    ]);
    let text = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(text.contains("SCENARIO COMPARISON"));
    assert!(text.contains("best"));
    assert!(text.contains("unaffordable"));
}

#[test]
fn corp_tax_marginal_relief() {
    let output = taxopt(&["corp-tax", "-p", "150000", "-y", "2024-25", "--json"]);
    let result = json(&output);
    assert_eq!(amount(&result["summary"]["totalTax"]), dec!(36000));
    let ct = &result["report"]["results"]["corporationTax"];
    assert_eq!(ct["regime"], "marginalRelief");
    assert_eq!(amount(&ct["marginalRelief"]), dec!(1500));
}

#[test]
fn corp_tax_from_revenue_and_expenses() {
    let output = taxopt(&[
        "corp-tax", "--revenue", "80000", "--expenses", "30000", "-y", "2024-25", "--json",
    ]);
    let result = json(&output);
    assert_eq!(amount(&result["summary"]["totalTax"]), dec!(9500));
}

#[test]
fn income_tax_figures() {
    let output = taxopt(&[
        "income-tax", "-s", "12570", "-d", "38030.42", "-y", "2024-25", "--json",
    ]);
    let result = json(&output);
    let personal = &result["report"]["results"]["personal"];
    assert_eq!(amount(&personal["incomeTax"]), dec!(0));
    assert_eq!(amount(&personal["dividendTax"]), dec!(3366.52));
}

#[test]
fn sole_trader_class4() {
    let output = taxopt(&["sole-trader", "-p", "50000", "-y", "2024-25", "--json"]);
    let result = json(&output);
    let sole_trader = &result["report"]["results"]["soleTrader"];
    assert_eq!(amount(&sole_trader["class4Ni"]["total"]), dec!(2245.80));
    assert_eq!(amount(&result["summary"]["takeHome"]), dec!(40268.20));
}

#[test]
fn calc_from_parameter_file() {
    let output = taxopt(&[
        "calc",
        "tests/data/salary_optimisation.json",
        "--as-of",
        "2024-06-25",
        "--json",
    ]);
    let result = json(&output);
    assert_eq!(result["clientId"], "client-001");
    assert_eq!(result["companyId"], "acme-ltd");
    let optimisation = &result["report"]["results"]["optimisation"];
    assert_eq!(amount(&optimisation["salaryIncrement"]), dec!(500));
    assert!(amount(&optimisation["current"]["improvement"]) > dec!(0));
    assert_eq!(result["report"]["inputs"]["type"], "salaryOptimisation");
}

#[test]
fn calc_scenario_comparison_file() {
    let output = taxopt(&["calc", "tests/data/scenario_comparison.json", "--json"]);
    let result = json(&output);
    let rows = result["report"]["results"]["scenarioComparison"]
        .as_array()
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(result["scenarios"].as_array().unwrap().len(), 4);
}

#[test]
fn calc_rejects_bad_parameters() {
    let output = taxopt(&["calc", "tests/data/invalid_tax_year.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid calculation parameters"));

    let output = taxopt(&["calc", "tests/data/missing_profit.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("availableProfit"));
}

#[test]
fn saved_result_can_be_shown_and_recalculated() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().to_str().unwrap();

    let output = taxopt(&[
        "calc",
        "tests/data/salary_optimisation.json",
        "--save",
        store,
        "--json",
    ]);
    let saved = json(&output);
    let id = saved["id"].as_str().unwrap();

    let shown = json(&taxopt(&["show", id, "--store", store, "--json"]));
    assert_eq!(shown, saved);

    let recommendations = json(&taxopt(&["show", id, "--store", store, "--recommendations"]));
    assert_eq!(recommendations, saved["recommendations"]);

    let output = taxopt(&[
        "calc",
        "tests/data/scenario_comparison.json",
        "--recalculate",
        id,
        "--save",
        store,
        "--json",
    ]);
    let recalculated = json(&output);
    assert_eq!(recalculated["id"], saved["id"]);
    assert_eq!(recalculated["calculationType"], "scenarioComparison");

    let shown = json(&taxopt(&["show", id, "--store", store, "--json"]));
    assert_eq!(shown["calculationType"], "scenarioComparison");
}

#[test]
fn show_missing_result_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = taxopt(&["show", "deadbeef", "--store", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn rates_json_and_override_file() {
    let builtin = json(&taxopt(&["rates", "-y", "2024-25", "--json"]));
    assert_eq!(amount(&builtin["incomeTax"]["personalAllowance"]), dec!(12570));
    assert_eq!(amount(&builtin["corporationTax"]["marginalReliefFraction"]), dec!(0.015));

    let overridden = json(&taxopt(&[
        "rates",
        "--rates",
        "tests/data/rates_2026_27.json",
        "-y",
        "2026-27",
        "--json",
    ]));
    assert_eq!(overridden["taxYear"], "2026-27");
    assert_eq!(amount(&overridden["dividends"]["basicRate"]), dec!(0.1075));
    assert_eq!(amount(&overridden["dividends"]["higherRate"]), dec!(0.3575));
}

#[test]
fn rates_text_lists_years() {
    let output = taxopt(&["rates"]);
    let text = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(text.contains("2023-24, 2024-25, 2025-26"));
    assert!(text.contains("Personal allowance"));
}

#[test]
fn schema_formats() {
    let params = json(&taxopt(&["schema"]));
    assert!(params["properties"]["calculation"].is_object());

    let result = json(&taxopt(&["schema", "result"]));
    assert!(result["properties"]["recommendations"].is_object());

    let output = taxopt(&["schema", "csv-fields"]);
    let text = stdout(&output);
    assert!(text.contains("student_loan"));
    assert!(text.contains("optional"));
}
