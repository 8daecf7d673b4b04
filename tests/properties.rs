use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use taxopt::tax::bands::{calculate_dividend_tax, tapered_personal_allowance};
use taxopt::tax::{
    calculate_corporation_tax, evaluate, optimise, Objective, RateTable, ScenarioFlags,
    ScenarioInput, SearchConstraints, TaxYear,
};

fn table(year: i32) -> RateTable {
    RateTable::builtin(TaxYear(year)).unwrap()
}

fn pounds(amount: u32) -> Decimal {
    Decimal::from(amount)
}

fn flags(scottish: bool, student_loan: bool, employer_ni: bool) -> ScenarioFlags {
    ScenarioFlags {
        scottish_taxpayer: scottish,
        student_loan,
        consider_employer_ni: employer_ni,
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_evaluation_is_deterministic(
        year in 2024i32..2027,
        profit in 1u32..500_000,
        salary_pct in 0u32..101,
        scottish in proptest::bool::ANY,
        student_loan in proptest::bool::ANY
    ) {
        let table = table(year);
        let input = ScenarioInput {
            available_profit: pounds(profit),
            salary: pounds(profit * salary_pct / 100),
            tax_year: table.tax_year,
            other_income: Decimal::ZERO,
            flags: flags(scottish, student_loan, true),
        };
        prop_assert_eq!(evaluate(&table, &input), evaluate(&table, &input));
    }

    #[test]
    fn prop_affordable_split_conserves_profit(
        year in 2024i32..2027,
        profit in 1u32..500_000,
        salary_pct in 0u32..101,
        scottish in proptest::bool::ANY,
        student_loan in proptest::bool::ANY,
        employer_ni in proptest::bool::ANY
    ) {
        let table = table(year);
        let available_profit = pounds(profit);
        let input = ScenarioInput {
            available_profit,
            salary: pounds(profit * salary_pct / 100),
            tax_year: table.tax_year,
            other_income: Decimal::ZERO,
            flags: flags(scottish, student_loan, employer_ni),
        };
        let result = evaluate(&table, &input);
        if result.is_unaffordable() {
            return Ok(());
        }

        let company = &result.company;
        let paid_out = company.salary + company.employer_ni + company.corporation_tax
            + result.personal.dividends;
        prop_assert!((paid_out - available_profit).abs() <= dec!(0.01));

        let accounted = result.summary.take_home + result.summary.total_tax
            + result.personal.student_loan;
        prop_assert!((accounted - available_profit).abs() <= dec!(0.01));
    }

    #[test]
    fn prop_taxes_are_non_negative_and_take_home_bounded(
        year in 2024i32..2027,
        profit in 1u32..500_000,
        salary_pct in 0u32..101,
        scottish in proptest::bool::ANY,
        student_loan in proptest::bool::ANY
    ) {
        let table = table(year);
        let available_profit = pounds(profit);
        let input = ScenarioInput {
            available_profit,
            salary: pounds(profit * salary_pct / 100),
            tax_year: table.tax_year,
            other_income: Decimal::ZERO,
            flags: flags(scottish, student_loan, true),
        };
        let result = evaluate(&table, &input);

        prop_assert!(result.company.employer_ni >= Decimal::ZERO);
        prop_assert!(result.company.corporation_tax >= Decimal::ZERO);
        prop_assert!(result.personal.income_tax >= Decimal::ZERO);
        prop_assert!(result.personal.employee_ni >= Decimal::ZERO);
        prop_assert!(result.personal.dividend_tax >= Decimal::ZERO);
        prop_assert!(result.personal.student_loan >= Decimal::ZERO);
        prop_assert!(result.summary.total_tax >= Decimal::ZERO);
        if !result.is_unaffordable() {
            prop_assert!(result.summary.take_home <= available_profit);
        }
    }

    #[test]
    fn prop_larger_dividend_allowance_never_increases_tax(
        year in 2024i32..2027,
        dividends in 0u32..300_000,
        other in 0u32..200_000,
        allowance in 0u32..5_000,
        extra in 1u32..5_000
    ) {
        let table = table(year);
        let dividends = pounds(dividends);
        let other = pounds(other);
        let pa = tapered_personal_allowance(&table, dividends + other);

        let smaller = calculate_dividend_tax(&table, dividends, other, pa, pounds(allowance));
        let larger = calculate_dividend_tax(&table, dividends, other, pa, pounds(allowance + extra));
        prop_assert!(larger.total <= smaller.total);
    }

    #[test]
    fn prop_marginal_relief_rate_lies_between_small_and_main(
        year in 2024i32..2027,
        profit in 50_001u32..250_000
    ) {
        let table = table(year);
        let profit = pounds(profit);
        let ct = calculate_corporation_tax(&table, profit);
        prop_assert!(ct.tax > profit * table.corporation_tax.small_rate);
        prop_assert!(ct.tax < profit * table.corporation_tax.main_rate);
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(16))]

    #[test]
    fn prop_optimum_beats_every_listed_scenario(
        year in 2024i32..2027,
        profit in 1_000u32..300_000,
        objective_index in 0usize..3,
        student_loan in proptest::bool::ANY
    ) {
        let table = table(year);
        let objective = [
            Objective::MaxTakeHome,
            Objective::MinCostToCompany,
            Objective::MinTotalTax,
        ][objective_index];
        let constraints = SearchConstraints {
            salary_increment: Some(dec!(2500)),
            flags: flags(false, student_loan, true),
            objective,
            ..Default::default()
        };
        let outcome = optimise(&table, pounds(profit), &constraints).unwrap();

        let best = objective.score(&outcome.optimal);
        for scenario in &outcome.scenarios {
            prop_assert!(best <= objective.score(scenario));
            prop_assert!(!scenario.is_unaffordable());
        }
        for pair in outcome.scenarios.windows(2) {
            prop_assert!(pair[0].take_home() >= pair[1].take_home());
        }
    }
}
