//! Actionable suggestions derived from a finished calculation.
//!
//! Each rule looks at the parts of the result it needs (and the current arrangement when
//! one is given) on its own; rules never see each other's output. Savings
//! for the pension and NI rules are rough heuristics, not recomputations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::rates::RateTable;
use super::scenario::{evaluate, evaluate_personal, CompanyResult, PersonalResult, ScenarioResult};
use super::year::{next_rti_deadline, TaxYear};

const HIGH_SAVING: Decimal = dec!(2000);
const MEDIUM_SAVING: Decimal = dec!(1000);
/// Margin above the NI primary threshold worth flagging
const NI_ALIGNMENT_MARGIN: Decimal = dec!(1000);
const NI_ALIGNMENT_HEURISTIC_RATE: Decimal = dec!(0.02);
const PENSION_INCOME_TRIGGER: Decimal = dec!(50000);
const PENSION_CONTRIBUTION_SHARE: Decimal = dec!(0.10);
const PENSION_RELIEF_HEURISTIC_RATE: Decimal = dec!(0.40);
const DIVIDEND_ALLOWANCE_HEADROOM_SHARE: Decimal = dec!(0.80);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationType {
    SalaryOptimisation,
    Pension,
    Compliance,
    Planning,
    Warning,
    Optimisation,
}

impl RecommendationType {
    pub fn display(&self) -> &'static str {
        match self {
            RecommendationType::SalaryOptimisation => "Salary",
            RecommendationType::Pension => "Pension",
            RecommendationType::Compliance => "Compliance",
            RecommendationType::Planning => "Planning",
            RecommendationType::Warning => "Warning",
            RecommendationType::Optimisation => "Optimisation",
        }
    }
}

/// Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Tiering by potential saving: above 2,000 high, above 1,000 medium.
    pub fn for_saving(saving: Decimal) -> Priority {
        if saving > HIGH_SAVING {
            Priority::High
        } else if saving > MEDIUM_SAVING {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[schemars(with = "f64")]
    pub potential_saving: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

/// How the director is paid today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentArrangement {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    /// When absent, the whole post-tax profit is assumed paid as dividends
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub dividends: Option<Decimal>,
}

/// What the rules can see. Calculations fill in whichever parts they
/// produce; rules whose inputs are missing stay silent.
pub struct RecommendationContext<'a> {
    pub table: &'a RateTable,
    /// Year the calculation was asked for, which may differ from `table.tax_year`
    pub requested_year: TaxYear,
    /// Date the reminders are computed from
    pub as_of: NaiveDate,
    pub optimal: Option<&'a ScenarioResult>,
    pub company: Option<&'a CompanyResult>,
    pub personal: Option<&'a PersonalResult>,
    pub current: Option<CurrentArrangement>,
    /// Self-employed profit reported through Self Assessment
    pub trading_profit: Option<Decimal>,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(table: &'a RateTable, requested_year: TaxYear, as_of: NaiveDate) -> Self {
        RecommendationContext {
            table,
            requested_year,
            as_of,
            optimal: None,
            company: None,
            personal: None,
            current: None,
            trading_profit: None,
        }
    }

    pub fn with_scenario(mut self, scenario: &'a ScenarioResult) -> Self {
        self.optimal = Some(scenario);
        self.company = Some(&scenario.company);
        self.personal = Some(&scenario.personal);
        self
    }

    pub fn with_company(mut self, company: &'a CompanyResult) -> Self {
        self.company = Some(company);
        self
    }

    pub fn with_personal(mut self, personal: &'a PersonalResult) -> Self {
        self.personal = Some(personal);
        self
    }

    pub fn with_current(mut self, current: Option<CurrentArrangement>) -> Self {
        self.current = current;
        self
    }

    pub fn with_trading_profit(mut self, trading_profit: Decimal) -> Self {
        self.trading_profit = Some(trading_profit);
        self
    }

    fn rates_fell_back(&self) -> bool {
        self.requested_year != self.table.tax_year
    }
}

/// Take-home under the current arrangement, with the optimal scenario's
/// profit, year and flags.
pub fn current_take_home(
    table: &RateTable,
    optimal: &ScenarioResult,
    current: CurrentArrangement,
) -> Decimal {
    match current.dividends {
        Some(dividends) => {
            evaluate_personal(
                table,
                current.salary,
                dividends,
                optimal.input.other_income,
                optimal.input.flags,
            )
            .net_personal_cash
        }
        None => {
            let mut input = optimal.input.clone();
            input.salary = current.salary;
            evaluate(table, &input).take_home()
        }
    }
}

pub fn generate_recommendations(ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = [
        rebalancing(ctx),
        ni_alignment(ctx),
        pension_headroom(ctx),
        marginal_relief_timing(ctx),
        dividend_allowance_headroom(ctx),
        lower_earnings_limit_warning(ctx),
        fallback_rates_warning(ctx),
    ]
    .into_iter()
    .flatten()
    .chain(compliance_reminders(ctx))
    .collect();

    sort_recommendations(&mut recommendations);
    log::debug!("Generated {} recommendations", recommendations.len());
    recommendations
}

/// Priority descending, then potential saving descending. Stable.
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.potential_saving.cmp(&a.potential_saving))
    });
}

fn gbp(amount: Decimal) -> String {
    format!("£{:.2}", amount)
}

fn rebalancing(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    let optimal = ctx.optimal?;
    let current = ctx.current?;
    let current_take_home = current_take_home(ctx.table, optimal, current);
    let saving = (optimal.take_home() - current_take_home).round_dp(2);
    if saving <= Decimal::ZERO {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationType::SalaryOptimisation,
        priority: Priority::for_saving(saving),
        title: "Rebalance salary and dividends".to_string(),
        description: format!(
            "Paying a salary of {} with dividends of {} instead of a salary of {} raises take-home from {} to {}.",
            gbp(optimal.salary()),
            gbp(optimal.company.dividend_pool),
            gbp(current.salary),
            gbp(current_take_home),
            gbp(optimal.take_home())
        ),
        potential_saving: saving,
        deadline: None,
    })
}

fn ni_alignment(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    let personal = ctx.personal?;
    let threshold = ctx.table.national_insurance.employee.threshold;
    let margin = personal.salary - threshold;
    if margin <= NI_ALIGNMENT_MARGIN {
        return None;
    }
    // rough estimate, not a recomputation at the threshold
    let saving = (margin * NI_ALIGNMENT_HEURISTIC_RATE).round_dp(2);
    Some(Recommendation {
        kind: RecommendationType::Optimisation,
        priority: Priority::for_saving(saving),
        title: "Review salary against the NI primary threshold".to_string(),
        description: format!(
            "Salary is {} above the employee NI threshold of {}. Moving the excess into dividends or pension contributions may reduce NI.",
            gbp(margin),
            gbp(threshold)
        ),
        potential_saving: saving,
        deadline: None,
    })
}

fn pension_headroom(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    let income = match (ctx.personal, ctx.trading_profit) {
        (Some(personal), _) => personal.gross_income(),
        (None, Some(profit)) => profit,
        (None, None) => return None,
    };
    if income <= PENSION_INCOME_TRIGGER {
        return None;
    }
    let contribution = (income * PENSION_CONTRIBUTION_SHARE)
        .min(ctx.table.pension_annual_allowance)
        .round_dp(2);
    let saving = (contribution * PENSION_RELIEF_HEURISTIC_RATE).round_dp(2);
    let route = if ctx.company.is_some() {
        "An employer contribution is deductible for corporation tax and free of NI."
    } else {
        "Personal contributions receive relief at your marginal rate."
    };
    Some(Recommendation {
        kind: RecommendationType::Pension,
        priority: Priority::for_saving(saving),
        title: "Use pension contributions".to_string(),
        description: format!(
            "With income of {}, contributing {} (annual allowance {}) shelters income from higher-rate tax. {}",
            gbp(income),
            gbp(contribution),
            gbp(ctx.table.pension_annual_allowance),
            route
        ),
        potential_saving: saving,
        deadline: None,
    })
}

fn marginal_relief_timing(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    let company = ctx.company?;
    let ct = &ctx.table.corporation_tax;
    let profit = company.taxable_profit;
    if profit <= ct.lower_threshold || profit >= ct.upper_threshold {
        return None;
    }
    let saving = (company.corporation_tax - profit * ct.small_rate)
        .max(Decimal::ZERO)
        .round_dp(2);
    Some(Recommendation {
        kind: RecommendationType::Planning,
        priority: Priority::for_saving(saving),
        title: "Profits fall in the marginal relief band".to_string(),
        description: format!(
            "Taxable profit of {} sits between {} and {}, where each extra pound is taxed above the main rate. Timing expenditure or pension contributions into this period reduces the charge.",
            gbp(profit),
            gbp(ct.lower_threshold),
            gbp(ct.upper_threshold)
        ),
        potential_saving: saving,
        deadline: None,
    })
}

fn dividend_allowance_headroom(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    // only directors can choose to pay themselves dividends
    ctx.company?;
    let personal = ctx.personal?;
    let allowance = ctx.table.dividends.allowance;
    if personal.dividends >= allowance * DIVIDEND_ALLOWANCE_HEADROOM_SHARE {
        return None;
    }
    let headroom = allowance - personal.dividends;
    let saving = (headroom * ctx.table.dividends.basic_rate).round_dp(2);
    Some(Recommendation {
        kind: RecommendationType::Optimisation,
        priority: Priority::Low,
        title: "Dividend allowance unused".to_string(),
        description: format!(
            "Dividends of {} leave {} of the {} dividend allowance unused.",
            gbp(personal.dividends),
            gbp(headroom),
            gbp(allowance)
        ),
        potential_saving: saving,
        deadline: None,
    })
}

fn lower_earnings_limit_warning(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    let personal = ctx.personal?;
    let lel = ctx.table.national_insurance.lower_earnings_limit;
    if personal.salary >= lel {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationType::Warning,
        priority: Priority::Medium,
        title: "Salary below the lower earnings limit".to_string(),
        description: format!(
            "A salary below {} does not earn a qualifying year towards the state pension.",
            gbp(lel)
        ),
        potential_saving: Decimal::ZERO,
        deadline: None,
    })
}

fn fallback_rates_warning(ctx: &RecommendationContext<'_>) -> Option<Recommendation> {
    if !ctx.rates_fell_back() {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationType::Warning,
        priority: Priority::High,
        title: "Rates for a different tax year used".to_string(),
        description: format!(
            "No rates are held for {}; figures use the {} rates and must be rechecked once published.",
            ctx.requested_year, ctx.table.tax_year
        ),
        potential_saving: Decimal::ZERO,
        deadline: None,
    })
}

fn compliance_reminders(ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
    let tax_year = ctx.requested_year;
    let mut reminders = Vec::new();

    if let Some(company) = ctx.company {
        if company.salary > Decimal::ZERO {
            reminders.push(Recommendation {
                kind: RecommendationType::Compliance,
                priority: Priority::Medium,
                title: "Update PAYE / RTI submissions".to_string(),
                description: format!(
                    "Report the salary of {} through payroll (FPS on or before each payday, EPS by the 19th).",
                    gbp(company.salary)
                ),
                potential_saving: Decimal::ZERO,
                deadline: Some(next_rti_deadline(ctx.as_of)),
            });
        }

        reminders.push(Recommendation {
            kind: RecommendationType::Compliance,
            priority: Priority::High,
            title: "File the company tax return (CT600)".to_string(),
            description: format!(
                "Corporation tax of {} for {} must be reported on the CT600.",
                gbp(company.corporation_tax),
                tax_year
            ),
            potential_saving: Decimal::ZERO,
            deadline: Some(tax_year.ct600_deadline()),
        });
    }

    let dividends_over_allowance = ctx
        .personal
        .filter(|p| p.dividends > ctx.table.dividends.allowance);
    if let Some(personal) = dividends_over_allowance {
        reminders.push(Recommendation {
            kind: RecommendationType::Compliance,
            priority: Priority::High,
            title: "Self Assessment return required".to_string(),
            description: format!(
                "Dividends of {} exceed the {} allowance; dividend tax of {} is due through Self Assessment.",
                gbp(personal.dividends),
                gbp(ctx.table.dividends.allowance),
                gbp(personal.dividend_tax)
            ),
            potential_saving: Decimal::ZERO,
            deadline: Some(tax_year.self_assessment_deadline()),
        });
    } else if let Some(profit) = ctx.trading_profit {
        reminders.push(Recommendation {
            kind: RecommendationType::Compliance,
            priority: Priority::High,
            title: "Self Assessment return required".to_string(),
            description: format!(
                "Trading profit of {} and the Class 4 NI on it are reported through Self Assessment.",
                gbp(profit)
            ),
            potential_saving: Decimal::ZERO,
            deadline: Some(tax_year.self_assessment_deadline()),
        });
    }

    reminders
}
