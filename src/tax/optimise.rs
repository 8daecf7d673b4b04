//! Salary/dividend split search.
//!
//! Every tax in play is piecewise linear in salary. Some kinks sit at fixed
//! salaries (the NI and income tax thresholds); others move with the
//! available profit: where the company's taxable profit crosses a corporation
//! tax threshold or zero, and where the owner's total income crosses a
//! dividend band edge or the allowance taper. The search evaluates a regular
//! grid plus every kink inside the range, and the best candidate under the
//! chosen objective is taken from that set.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::bands::{employer_ni, tapered_personal_allowance};
use super::corporation::calculate_corporation_tax;
use super::rates::{NiTiers, RateTable};
use super::scenario::{evaluate, ScenarioFlags, ScenarioInput, ScenarioResult};
use super::EngineError;

pub const DEFAULT_SALARY_INCREMENT: Decimal = dec!(1000);
const MAX_CANDIDATES: usize = 200_000;
const TARGET_TOLERANCE: Decimal = dec!(1);
const MAX_BISECTION_STEPS: u32 = 64;
const MAX_DOUBLINGS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Objective {
    /// Highest net personal cash
    #[default]
    MaxTakeHome,
    /// Lowest salary + employer NI + corporation tax
    MinCostToCompany,
    /// Lowest combined company and personal tax
    MinTotalTax,
}

impl Objective {
    /// Lower is better.
    pub fn score(&self, scenario: &ScenarioResult) -> Decimal {
        match self {
            Objective::MaxTakeHome => -scenario.summary.take_home,
            Objective::MinCostToCompany => scenario.summary.cost_to_company,
            Objective::MinTotalTax => scenario.summary.total_tax,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Objective::MaxTakeHome => "maximum take-home",
            Objective::MinCostToCompany => "minimum cost to company",
            Objective::MinTotalTax => "minimum total tax",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConstraints {
    #[schemars(with = "Option<f64>")]
    pub min_salary: Option<Decimal>,
    /// Defaults to the available profit
    #[schemars(with = "Option<f64>")]
    pub max_salary: Option<Decimal>,
    /// Defaults to 1,000
    #[schemars(with = "Option<f64>")]
    pub salary_increment: Option<Decimal>,
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    pub flags: ScenarioFlags,
    pub objective: Objective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub objective: Objective,
    #[schemars(with = "f64")]
    pub available_profit: Decimal,
    #[schemars(with = "f64")]
    pub min_salary: Decimal,
    #[schemars(with = "f64")]
    pub max_salary: Decimal,
    #[schemars(with = "f64")]
    pub salary_increment: Decimal,
    pub candidates_evaluated: usize,
    /// Candidates dropped because the company could not afford them
    pub candidates_discarded: usize,
    pub optimal: ScenarioResult,
    /// Affordable scenarios, highest take-home first
    pub scenarios: Vec<ScenarioResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetSolution {
    #[schemars(with = "f64")]
    pub target_take_home: Decimal,
    /// Smallest profit (to the pound) whose optimum reaches the target
    #[schemars(with = "f64")]
    pub required_profit: Decimal,
    pub iterations: u32,
    pub outcome: SearchOutcome,
}

struct SalaryRange {
    min: Decimal,
    max: Decimal,
    increment: Decimal,
}

fn salary_range(
    available_profit: Decimal,
    constraints: &SearchConstraints,
) -> Result<SalaryRange, EngineError> {
    if available_profit <= Decimal::ZERO {
        return Err(EngineError::NonPositiveProfit(available_profit));
    }
    if constraints.other_income < Decimal::ZERO {
        return Err(EngineError::NegativeAmount {
            field: "otherIncome",
            value: constraints.other_income,
        });
    }
    let min = constraints.min_salary.unwrap_or(Decimal::ZERO);
    if min < Decimal::ZERO {
        return Err(EngineError::NegativeAmount {
            field: "minSalary",
            value: min,
        });
    }
    let max = constraints.max_salary.unwrap_or(available_profit);
    if min > max {
        return Err(EngineError::EmptySalaryRange { min, max });
    }
    let increment = constraints
        .salary_increment
        .unwrap_or(DEFAULT_SALARY_INCREMENT);
    if increment <= Decimal::ZERO {
        return Err(EngineError::NonPositiveIncrement(increment));
    }
    let count = (max - min)
        .checked_div(increment)
        .map_or(Decimal::MAX, |steps| steps.floor());
    if count > Decimal::from(MAX_CANDIDATES) {
        return Err(EngineError::TooManyCandidates {
            count,
            limit: MAX_CANDIDATES,
        });
    }
    Ok(SalaryRange { min, max, increment })
}

/// Salaries where the tax position changes slope.
pub fn key_thresholds(table: &RateTable) -> Vec<Decimal> {
    let ni = &table.national_insurance;
    let mut thresholds = vec![
        Decimal::ZERO,
        ni.lower_earnings_limit,
        ni.employer.threshold,
        ni.employee.threshold,
        table.income_tax.personal_allowance,
        table.income_tax.basic_threshold,
        table.income_tax.higher_threshold,
    ];
    thresholds.extend(ni.employee.upper_limit);
    thresholds.extend(ni.employer.upper_limit);
    thresholds.push(table.student_loan.threshold);
    thresholds
}

/// Regular grid from `min` to `max` (inclusive) plus the key thresholds in
/// range, ascending and without duplicates.
pub fn candidate_salaries(
    table: &RateTable,
    min: Decimal,
    max: Decimal,
    increment: Decimal,
) -> Vec<Decimal> {
    let mut candidates = Vec::new();
    let mut salary = min;
    while salary < max {
        candidates.push(salary);
        salary += increment;
    }
    candidates.push(max);
    candidates.extend(
        key_thresholds(table)
            .into_iter()
            .filter(|t| *t >= min && *t <= max),
    );
    candidates.sort();
    candidates.dedup();
    candidates
}

/// Salary whose cost to the company (salary plus employer NI) is `cost`.
///
/// Employer NI is linear within each tier, so each tier inverts in closed form.
fn salary_costing(tiers: &NiTiers, cost: Decimal) -> Decimal {
    if cost <= tiers.threshold {
        return cost;
    }
    let cost_at_upper = tiers
        .upper_limit
        .map(|upper| (upper, upper + (upper - tiers.threshold) * tiers.main_rate));
    match cost_at_upper {
        Some((upper, at_upper)) if cost > at_upper => {
            upper + (cost - at_upper) / (Decimal::ONE + tiers.additional_rate)
        }
        _ => tiers.threshold + (cost - tiers.threshold) / (Decimal::ONE + tiers.main_rate),
    }
}

/// The pennies either side of an exact kink, plus one below in case rounded
/// employer NI tips the lower penny over.
fn pennies_around(salary: Decimal) -> [Decimal; 3] {
    let down = salary.round_dp_with_strategy(2, RoundingStrategy::ToZero);
    [
        down - dec!(0.01),
        down,
        salary.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero),
    ]
}

/// Dividend pool when the whole post-tax profit is paid out.
fn dividend_pool(
    table: &RateTable,
    available_profit: Decimal,
    salary: Decimal,
    constraints: &SearchConstraints,
) -> Decimal {
    let employer = if constraints.flags.consider_employer_ni {
        employer_ni(table, salary).total
    } else {
        Decimal::ZERO
    };
    let taxable_profit = available_profit - salary - employer;
    (taxable_profit - calculate_corporation_tax(table, taxable_profit).tax).max(Decimal::ZERO)
}

/// Bisect `[low, high]` for where `value` crosses `level`, returning the
/// pennies either side. `value` must be monotone over the range.
fn crossing(
    mut low: Decimal,
    mut high: Decimal,
    level: Decimal,
    value: impl Fn(Decimal) -> Decimal,
) -> Option<[Decimal; 6]> {
    let below = |salary: Decimal| value(salary) < level;
    let low_below = below(low);
    if low_below == below(high) {
        return None;
    }
    let mut steps = 0;
    while high - low > dec!(0.01) && steps < MAX_BISECTION_STEPS {
        steps += 1;
        let mid = low + (high - low) / dec!(2);
        if below(mid) == low_below {
            low = mid;
        } else {
            high = mid;
        }
    }
    let [a, b, c] = pennies_around(low);
    let [d, e, f] = pennies_around(high);
    Some([a, b, c, d, e, f])
}

/// Salaries, for this available profit, where the taxable company profit
/// reaches zero or a corporation tax threshold, and where the owner's total
/// income, dividends or taxable salary reach a band edge, an allowance or
/// the taper.
///
/// Only kinks within `[min, max]` are returned.
pub fn profit_dependent_kinks(
    table: &RateTable,
    available_profit: Decimal,
    min: Decimal,
    max: Decimal,
    constraints: &SearchConstraints,
) -> Vec<Decimal> {
    let salary_for_profit = |taxable_profit: Decimal| {
        let cost = available_profit - taxable_profit;
        if constraints.flags.consider_employer_ni {
            salary_costing(&table.national_insurance.employer, cost)
        } else {
            cost
        }
    };
    let ct = &table.corporation_tax;
    let mut kinks = Vec::new();
    for threshold in [Decimal::ZERO, ct.lower_threshold, ct.upper_threshold] {
        if threshold <= available_profit {
            kinks.extend(pennies_around(salary_for_profit(threshold)));
        }
    }

    // beyond the zero-profit salary nothing is affordable
    let affordable_max = salary_for_profit(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::ToZero)
        .min(max);
    if affordable_max > min {
        let pool = |salary: Decimal| dividend_pool(table, available_profit, salary, constraints);
        let income = |salary: Decimal| salary + pool(salary) + constraints.other_income;
        let it = &table.income_tax;
        let mut income_levels = vec![
            it.personal_allowance + table.dividends.allowance,
            it.basic_threshold,
            it.taper_threshold,
            it.higher_threshold,
        ];
        let mut pool_levels = vec![table.dividends.allowance];
        if constraints.flags.student_loan {
            income_levels.push(table.student_loan.threshold);
            let unearned = table.student_loan.unearned_income_threshold;
            pool_levels.push(unearned - constraints.other_income);
        }
        // salary bands start above the allowance, which tapers with total income
        let mut band_starts = vec![Decimal::ZERO, it.basic_threshold - it.personal_allowance];
        if constraints.flags.scottish_taxpayer {
            if let Some(bands) = &table.scottish_income_tax {
                band_starts.extend(bands.iter().filter_map(|band| band.upper));
            }
        }
        let taxable_salary = |salary: Decimal| {
            salary + constraints.other_income - tapered_personal_allowance(table, income(salary))
        };
        let crossings = band_starts
            .into_iter()
            .filter_map(|level| crossing(min, affordable_max, level, &taxable_salary))
            .chain(
                income_levels
                    .into_iter()
                    .filter_map(|level| crossing(min, affordable_max, level, &income)),
            )
            .chain(
                pool_levels
                    .into_iter()
                    .filter_map(|level| crossing(min, affordable_max, level, &pool)),
            );
        kinks.extend(crossings.flatten());
    }

    kinks.retain(|salary| *salary >= min && *salary <= max);
    kinks
}

/// Evaluate every candidate and select the best under the objective.
///
/// Candidates the company cannot afford are dropped. Ties go to the lowest
/// salary. The returned scenarios are ordered by take-home, highest first.
pub fn optimise(
    table: &RateTable,
    available_profit: Decimal,
    constraints: &SearchConstraints,
) -> Result<SearchOutcome, EngineError> {
    let range = salary_range(available_profit, constraints)?;
    let mut candidates = candidate_salaries(table, range.min, range.max, range.increment);
    candidates.extend(profit_dependent_kinks(
        table,
        available_profit,
        range.min,
        range.max,
        constraints,
    ));
    candidates.sort();
    candidates.dedup();
    let candidates_evaluated = candidates.len();

    let affordable: Vec<ScenarioResult> = candidates
        .into_iter()
        .map(|salary| {
            evaluate(
                table,
                &ScenarioInput {
                    available_profit,
                    salary,
                    tax_year: table.tax_year,
                    other_income: constraints.other_income,
                    flags: constraints.flags,
                },
            )
        })
        .filter(|scenario| !scenario.is_unaffordable())
        .collect();
    let candidates_discarded = candidates_evaluated - affordable.len();

    let objective = constraints.objective;
    let optimal = affordable
        .iter()
        .fold(None::<&ScenarioResult>, |best, scenario| match best {
            Some(b) if objective.score(b) <= objective.score(scenario) => Some(b),
            _ => Some(scenario),
        })
        .cloned()
        .ok_or(EngineError::NoAffordableCandidate {
            min: range.min,
            max: range.max,
        })?;

    let mut scenarios = affordable;
    scenarios.sort_by(|a, b| b.take_home().cmp(&a.take_home()));

    log::info!(
        "Evaluated {} salaries for profit {} ({} unaffordable): optimal salary {} ({})",
        candidates_evaluated,
        available_profit,
        candidates_discarded,
        optimal.salary(),
        objective.display()
    );

    Ok(SearchOutcome {
        objective,
        available_profit,
        min_salary: range.min,
        max_salary: range.max,
        salary_increment: range.increment,
        candidates_evaluated,
        candidates_discarded,
        optimal,
        scenarios,
    })
}

/// Ranked scenarios only, highest take-home first.
pub fn search(
    table: &RateTable,
    available_profit: Decimal,
    constraints: &SearchConstraints,
) -> Result<Vec<ScenarioResult>, EngineError> {
    optimise(table, available_profit, constraints).map(|outcome| outcome.scenarios)
}

/// Smallest available profit whose best split reaches `target` take-home.
///
/// Take-home grows with profit, so the profit is bracketed by doubling and
/// then narrowed by bisection to within a pound.
pub fn solve_target_take_home(
    table: &RateTable,
    target: Decimal,
    constraints: &SearchConstraints,
) -> Result<TargetSolution, EngineError> {
    if target <= Decimal::ZERO {
        return Err(EngineError::NonPositiveTarget(target));
    }
    let constraints = SearchConstraints {
        objective: Objective::MaxTakeHome,
        ..constraints.clone()
    };
    let unreachable = |max_profit: Decimal| EngineError::UnreachableTarget { target, max_profit };
    let reaches = |profit: Decimal| -> Result<bool, EngineError> {
        match optimise(table, profit, &constraints) {
            Ok(outcome) => Ok(outcome.optimal.take_home() >= target),
            Err(EngineError::NoAffordableCandidate { .. } | EngineError::EmptySalaryRange { .. }) => {
                Ok(false)
            }
            // a profit too large to search cannot be bracketed
            Err(EngineError::TooManyCandidates { .. }) => Err(unreachable(profit)),
            Err(e) => Err(e),
        }
    };

    // take-home never exceeds profit, so the target itself is a lower bound
    let mut low = target;
    let mut high = target.checked_mul(dec!(2)).ok_or_else(|| unreachable(target))?;
    let mut iterations = 0;
    while !reaches(high)? {
        iterations += 1;
        if iterations > MAX_DOUBLINGS {
            return Err(unreachable(high));
        }
        low = high;
        high = high.checked_mul(dec!(2)).ok_or_else(|| unreachable(low))?;
    }

    while high - low > TARGET_TOLERANCE && iterations < MAX_DOUBLINGS + MAX_BISECTION_STEPS {
        iterations += 1;
        let mid = (low + (high - low) / dec!(2)).round_dp(2);
        if reaches(mid)? {
            high = mid;
        } else {
            low = mid;
        }
    }

    let required_profit = high.ceil();
    let outcome = optimise(table, required_profit, &constraints)?;
    log::info!(
        "Target take-home {} needs profit {} ({} iterations)",
        target,
        required_profit,
        iterations
    );

    Ok(TargetSolution {
        target_take_home: target,
        required_profit,
        iterations,
        outcome,
    })
}
