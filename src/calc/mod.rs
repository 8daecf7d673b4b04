//! Runs a calculation request end to end and shapes the stored record.

pub mod params;
pub mod result;

pub use params::{
    Calculation, CalculationParams, CalculationType, CorporationTaxParams, IncomeTaxParams,
    SalaryOptimisationParams, ScenarioComparisonParams, SoleTraderParams,
};
pub use result::{
    ComparisonRow, CurrentComparison, OptimisationReport, Report, ReportResults, ResultSummary,
    SoleTraderResult, TargetReport, TaxCalculationResult,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::tax::bands::{
    calculate_income_tax, class4_ni, student_loan_repayment, tapered_personal_allowance,
};
use crate::tax::recommend::current_take_home;
use crate::tax::{
    calculate_corporation_tax, evaluate, evaluate_personal, generate_recommendations, optimise,
    ratio, solve_target_take_home, CompanyResult, EngineError, RateRegistry, RateTable,
    RecommendationContext, ScenarioInput, ScenarioResult,
};
use params::OptimisationGoal;

/// Number of ranked scenarios repeated in an optimisation's comparison section
const COMPARISON_TOP_N: usize = 5;
const ID_HEX_LEN: usize = 32;

/// Stable identifier for a request: the same client, year, type and inputs
/// always hash to the same id.
pub fn calculation_id(params: &CalculationParams) -> String {
    let inputs = serde_json::to_vec(&params.calculation).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(params.client_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(params.tax_year.display().as_bytes());
    hasher.update([0u8]);
    hasher.update(params.calculation.calculation_type().as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(&inputs);
    let mut id = hex::encode(hasher.finalize());
    id.truncate(ID_HEX_LEN);
    id
}

/// Run a calculation against the registry's rates for its tax year.
///
/// `as_of` anchors the compliance deadlines; nothing else depends on the
/// current date.
pub fn run(
    registry: &RateRegistry,
    params: &CalculationParams,
    as_of: NaiveDate,
) -> Result<TaxCalculationResult, EngineError> {
    let resolved = registry.resolve(params.tax_year);
    let table = resolved.table;
    let context = RecommendationContext::new(table, params.tax_year, as_of);

    let assembled = match &params.calculation {
        Calculation::SalaryOptimisation(p) => salary_optimisation(table, p, context)?,
        Calculation::ScenarioComparison(p) => scenario_comparison(table, p, context)?,
        Calculation::CorporationTax(p) => corporation_tax(table, p, context)?,
        Calculation::IncomeTax(p) => income_tax(table, p, context)?,
        Calculation::SoleTrader(p) => sole_trader(table, p, context)?,
    };

    let result = TaxCalculationResult {
        id: calculation_id(params),
        client_id: params.client_id.clone(),
        company_id: params.company_id.clone(),
        tax_year: params.tax_year,
        rates_tax_year: table.tax_year,
        calculation_type: params.calculation.calculation_type(),
        as_of,
        summary: assembled.summary,
        scenarios: assembled.scenarios,
        report: Report {
            inputs: params.calculation.clone(),
            results: assembled.results,
        },
        recommendations: assembled.recommendations,
    };

    log::info!(
        "Calculation {} ({}) for client {}: total tax {}, take-home {}, {} recommendations",
        result.id,
        result.calculation_type,
        result.client_id,
        result.summary.total_tax,
        result.summary.take_home,
        result.recommendations.len()
    );
    Ok(result)
}

/// Rerun with new parameters, producing a fresh record that keeps the
/// existing identifier. The existing record is left untouched.
pub fn recalculate(
    registry: &RateRegistry,
    existing: &TaxCalculationResult,
    params: &CalculationParams,
    as_of: NaiveDate,
) -> Result<TaxCalculationResult, EngineError> {
    let mut result = run(registry, params, as_of)?;
    log::debug!("Recalculated {} (new inputs hash to {})", existing.id, result.id);
    result.id = existing.id.clone();
    Ok(result)
}

struct Assembled {
    summary: ResultSummary,
    scenarios: Vec<ScenarioResult>,
    results: ReportResults,
    recommendations: Vec<crate::tax::Recommendation>,
}

fn salary_optimisation(
    table: &RateTable,
    p: &SalaryOptimisationParams,
    context: RecommendationContext<'_>,
) -> Result<Assembled, EngineError> {
    let (outcome, target) = match p.goal()? {
        OptimisationGoal::Profit(profit) => (optimise(table, profit, &p.constraints)?, None),
        OptimisationGoal::TargetTakeHome(take_home) => {
            let solution = solve_target_take_home(table, take_home, &p.constraints)?;
            let target = TargetReport {
                target_take_home: solution.target_take_home,
                required_profit: solution.required_profit,
                iterations: solution.iterations,
            };
            (solution.outcome, Some(target))
        }
    };
    let optimal = &outcome.optimal;

    let current = p.current_arrangement.map(|arrangement| {
        let take_home = current_take_home(table, optimal, arrangement);
        CurrentComparison {
            salary: arrangement.salary,
            take_home,
            improvement: optimal.take_home() - take_home,
        }
    });

    let recommendations = generate_recommendations(
        &context
            .with_scenario(optimal)
            .with_current(p.current_arrangement),
    );

    let top: Vec<ScenarioResult> = outcome
        .scenarios
        .iter()
        .take(COMPARISON_TOP_N)
        .cloned()
        .collect();

    let results = ReportResults {
        personal: Some(optimal.personal.clone()),
        company: Some(optimal.company.clone()),
        corporation_tax: Some(calculate_corporation_tax(table, optimal.company.taxable_profit)),
        sole_trader: None,
        optimisation: Some(OptimisationReport {
            objective: outcome.objective,
            available_profit: outcome.available_profit,
            min_salary: outcome.min_salary,
            max_salary: outcome.max_salary,
            salary_increment: outcome.salary_increment,
            candidates_evaluated: outcome.candidates_evaluated,
            candidates_discarded: outcome.candidates_discarded,
            optimal_salary: optimal.salary(),
            optimal_dividends: optimal.personal.dividends,
            target,
            current,
        }),
        scenario_comparison: Some(ComparisonRow::rows(&top)),
    };

    Ok(Assembled {
        summary: ResultSummary::from_scenario(optimal),
        results,
        recommendations,
        scenarios: outcome.scenarios,
    })
}

fn scenario_comparison(
    table: &RateTable,
    p: &ScenarioComparisonParams,
    context: RecommendationContext<'_>,
) -> Result<Assembled, EngineError> {
    let (profit, salaries) = p.validated()?;
    let scenarios: Vec<ScenarioResult> = salaries
        .iter()
        .map(|&salary| {
            evaluate(
                table,
                &ScenarioInput {
                    available_profit: profit,
                    salary,
                    tax_year: table.tax_year,
                    other_income: p.other_income,
                    flags: p.flags,
                },
            )
        })
        .collect();

    // first of equal take-homes wins
    let best = scenarios
        .iter()
        .filter(|s| !s.is_unaffordable())
        .fold(None::<&ScenarioResult>, |best, s| match best {
            Some(b) if b.take_home() >= s.take_home() => Some(b),
            _ => Some(s),
        })
        .ok_or(EngineError::NoAffordableCandidate {
            min: salaries.iter().copied().min().unwrap_or(Decimal::ZERO),
            max: salaries.iter().copied().max().unwrap_or(Decimal::ZERO),
        })?;

    let recommendations = generate_recommendations(&context.with_scenario(best));
    let results = ReportResults {
        personal: Some(best.personal.clone()),
        company: Some(best.company.clone()),
        corporation_tax: Some(calculate_corporation_tax(table, best.company.taxable_profit)),
        scenario_comparison: Some(ComparisonRow::rows(&scenarios)),
        ..Default::default()
    };

    Ok(Assembled {
        summary: ResultSummary::from_scenario(best),
        results,
        recommendations,
        scenarios,
    })
}

fn corporation_tax(
    table: &RateTable,
    p: &CorporationTaxParams,
    context: RecommendationContext<'_>,
) -> Result<Assembled, EngineError> {
    let profit = p.taxable_profit()?;
    let breakdown = calculate_corporation_tax(table, profit);
    let profit_after_tax = profit - breakdown.tax;
    let company = CompanyResult {
        salary: Decimal::ZERO,
        employer_ni: Decimal::ZERO,
        taxable_profit: profit,
        regime: breakdown.regime,
        marginal_relief: breakdown.marginal_relief,
        corporation_tax: breakdown.tax,
        profit_after_tax,
        dividend_pool: profit_after_tax.max(Decimal::ZERO),
    };

    let recommendations = generate_recommendations(&context.with_company(&company));
    let summary = ResultSummary {
        total_tax: breakdown.tax,
        effective_rate: breakdown.effective_rate,
        ..Default::default()
    };

    Ok(Assembled {
        summary,
        scenarios: Vec::new(),
        results: ReportResults {
            company: Some(company),
            corporation_tax: Some(breakdown),
            ..Default::default()
        },
        recommendations,
    })
}

fn income_tax(
    table: &RateTable,
    p: &IncomeTaxParams,
    context: RecommendationContext<'_>,
) -> Result<Assembled, EngineError> {
    p.validate()?;
    let personal = evaluate_personal(table, p.salary, p.dividends, p.other_income, p.flags);

    let recommendations = generate_recommendations(&context.with_personal(&personal));
    let summary = ResultSummary {
        salary: Some(personal.salary),
        dividends: Some(personal.dividends),
        total_tax: personal.total_tax,
        take_home: personal.net_personal_cash,
        effective_rate: ratio(personal.total_tax, personal.gross_income()).round_dp(4),
        cost_to_company: None,
    };

    Ok(Assembled {
        summary,
        scenarios: Vec::new(),
        results: ReportResults {
            personal: Some(personal),
            ..Default::default()
        },
        recommendations,
    })
}

/// Income tax and Class 4 NI on self-employed profit.
pub fn sole_trader_result(
    table: &RateTable,
    trading_profit: Decimal,
    other_income: Decimal,
    flags: crate::tax::ScenarioFlags,
) -> SoleTraderResult {
    let income = trading_profit + other_income;
    let personal_allowance = tapered_personal_allowance(table, income);
    let income_tax = calculate_income_tax(table, income, personal_allowance, flags.scottish_taxpayer);
    let class4 = class4_ni(table, trading_profit);
    let student_loan = if flags.student_loan {
        student_loan_repayment(table, trading_profit, other_income)
    } else {
        Decimal::ZERO
    };
    let total_tax = income_tax.total + class4.total;

    SoleTraderResult {
        trading_profit,
        other_income,
        personal_allowance,
        income_tax: income_tax.total,
        class4_ni: class4,
        student_loan,
        total_tax,
        take_home: income - total_tax - student_loan,
        effective_rate: ratio(total_tax, income).round_dp(4),
        income_tax_detail: income_tax,
    }
}

fn sole_trader(
    table: &RateTable,
    p: &SoleTraderParams,
    context: RecommendationContext<'_>,
) -> Result<Assembled, EngineError> {
    let profit = p.validated_profit()?;
    let result = sole_trader_result(table, profit, p.other_income, p.flags);

    let recommendations = generate_recommendations(&context.with_trading_profit(profit));
    let summary = ResultSummary {
        total_tax: result.total_tax,
        take_home: result.take_home,
        effective_rate: result.effective_rate,
        ..Default::default()
    };

    Ok(Assembled {
        summary,
        scenarios: Vec::new(),
        results: ReportResults {
            sole_trader: Some(result),
            ..Default::default()
        },
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{Priority, ScenarioFlags, SearchConstraints, TaxYear};
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 25).unwrap()
    }

    fn params(calculation: Calculation) -> CalculationParams {
        CalculationParams {
            client_id: "client-1".to_string(),
            company_id: Some("company-9".to_string()),
            tax_year: TaxYear(2025),
            calculation,
        }
    }

    fn optimisation(profit: Decimal) -> CalculationParams {
        params(Calculation::SalaryOptimisation(SalaryOptimisationParams {
            available_profit: Some(profit),
            ..Default::default()
        }))
    }

    #[test]
    fn optimisation_envelope_is_fully_populated() {
        let result = run(&RateRegistry::builtin(), &optimisation(dec!(60000)), as_of()).unwrap();

        assert_eq!(result.id.len(), 32);
        assert_eq!(result.calculation_type, CalculationType::SalaryOptimisation);
        assert_eq!(result.summary.salary, Some(dec!(12570)));
        assert!(!result.rates_fell_back());
        assert!(!result.scenarios.is_empty());
        assert!(result
            .scenarios
            .windows(2)
            .all(|w| w[0].take_home() >= w[1].take_home()));

        let results = &result.report.results;
        assert!(results.personal.is_some());
        assert!(results.company.is_some());
        assert_eq!(results.scenario_comparison.as_ref().unwrap().len(), 5);
        let optimisation = results.optimisation.as_ref().unwrap();
        assert_eq!(optimisation.optimal_salary, dec!(12570));
        assert!(optimisation.candidates_evaluated >= result.scenarios.len());
        assert!(!result.recommendations.is_empty());
    }

    #[test]
    fn identical_requests_share_an_id() {
        let a = calculation_id(&optimisation(dec!(60000)));
        let b = calculation_id(&optimisation(dec!(60000)));
        let c = calculation_id(&optimisation(dec!(60001)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn recalculate_keeps_the_id() {
        let registry = RateRegistry::builtin();
        let original = run(&registry, &optimisation(dec!(60000)), as_of()).unwrap();
        let updated = recalculate(&registry, &original, &optimisation(dec!(90000)), as_of()).unwrap();
        assert_eq!(updated.id, original.id);
        assert_ne!(updated.summary, original.summary);
        assert_eq!(
            original.report.results.optimisation.unwrap().available_profit,
            dec!(60000)
        );
    }

    #[test]
    fn unknown_year_falls_back_and_warns() {
        let mut p = optimisation(dec!(60000));
        p.tax_year = TaxYear(2031);
        let result = run(&RateRegistry::builtin(), &p, as_of()).unwrap();
        assert!(result.rates_fell_back());
        assert_eq!(result.rates_tax_year, TaxYear(2026));
        let warning = result
            .recommendations
            .iter()
            .find(|r| r.title.contains("different tax year"))
            .unwrap();
        assert_eq!(warning.priority, Priority::High);
    }

    #[test]
    fn current_arrangement_reported() {
        let p = params(Calculation::SalaryOptimisation(SalaryOptimisationParams {
            available_profit: Some(dec!(60000)),
            current_arrangement: Some(crate::tax::CurrentArrangement {
                salary: dec!(40000),
                dividends: None,
            }),
            ..Default::default()
        }));
        let result = run(&RateRegistry::builtin(), &p, as_of()).unwrap();
        let current = result.report.results.optimisation.unwrap().current.unwrap();
        assert!(current.improvement > dec!(0));
        assert_eq!(current.take_home + current.improvement, result.summary.take_home);
    }

    #[test]
    fn target_take_home_reports_required_profit() {
        let p = params(Calculation::SalaryOptimisation(SalaryOptimisationParams {
            target_take_home: Some(dec!(40000)),
            ..Default::default()
        }));
        let result = run(&RateRegistry::builtin(), &p, as_of()).unwrap();
        let target = result.report.results.optimisation.unwrap().target.unwrap();
        assert!(result.summary.take_home >= dec!(40000));
        assert!(target.required_profit > dec!(40000));
    }

    #[test]
    fn comparison_keeps_order_and_picks_best() {
        let p = params(Calculation::ScenarioComparison(ScenarioComparisonParams {
            available_profit: Some(dec!(60000)),
            salaries: vec![dec!(0), dec!(12570), dec!(70000)],
            ..Default::default()
        }));
        let result = run(&RateRegistry::builtin(), &p, as_of()).unwrap();
        assert_eq!(result.summary.salary, Some(dec!(12570)));
        let rows = result.report.results.scenario_comparison.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].salary, dec!(0));
        assert_eq!(rows[1].shortfall, dec!(0));
        assert!(!rows[2].affordable);
        assert!(result.report.results.optimisation.is_none());
    }

    #[test]
    fn corporation_tax_only() {
        let p = params(Calculation::CorporationTax(CorporationTaxParams {
            revenue: Some(dec!(200000)),
            expenses: Some(dec!(50000)),
            ..Default::default()
        }));
        let result = run(&RateRegistry::builtin(), &p, as_of()).unwrap();
        assert_eq!(result.summary.total_tax, dec!(36000));
        assert_eq!(result.summary.take_home, dec!(0));
        assert!(result.scenarios.is_empty());
        let ct = result.report.results.corporation_tax.unwrap();
        assert_eq!(ct.marginal_relief, dec!(1500));
        assert!(result.report.results.personal.is_none());
    }

    #[test]
    fn income_tax_on_known_figures() {
        let p = params(Calculation::IncomeTax(IncomeTaxParams {
            salary: dec!(60000),
            ..Default::default()
        }));
        let result = run(&RateRegistry::builtin(), &p, as_of()).unwrap();
        let personal = result.report.results.personal.unwrap();
        assert_eq!(personal.income_tax, dec!(11432));
        assert_eq!(personal.employee_ni, dec!(3210.60));
        assert_eq!(result.summary.take_home, dec!(45357.40));
    }

    #[test]
    fn sole_trader_class4() {
        let table = RateTable::builtin(TaxYear(2025)).unwrap();
        let result = sole_trader_result(&table, dec!(50000), dec!(0), ScenarioFlags::default());
        // (50,000 - 12,570) at 6%
        assert_eq!(result.class4_ni.total, dec!(2245.80));
        assert_eq!(result.income_tax, dec!(7486));
        assert_eq!(result.take_home, dec!(40268.20));
    }

    #[test]
    fn missing_fields_are_errors() {
        let p = params(Calculation::SoleTrader(SoleTraderParams::default()));
        assert_eq!(
            run(&RateRegistry::builtin(), &p, as_of()).unwrap_err(),
            EngineError::MissingField {
                calculation: "soleTrader",
                field: "tradingProfit"
            }
        );
    }

    #[test]
    fn invalid_constraints_are_errors() {
        let p = params(Calculation::SalaryOptimisation(SalaryOptimisationParams {
            available_profit: Some(dec!(60000)),
            constraints: SearchConstraints {
                min_salary: Some(dec!(20000)),
                max_salary: Some(dec!(10000)),
                ..Default::default()
            },
            ..Default::default()
        }));
        assert!(matches!(
            run(&RateRegistry::builtin(), &p, as_of()),
            Err(EngineError::EmptySalaryRange { .. })
        ));
    }
}
