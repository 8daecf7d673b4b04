pub mod bands;
pub mod corporation;
pub mod error;
pub mod optimise;
pub mod rates;
pub mod recommend;
pub mod scenario;
pub mod year;

pub use bands::{BandCharge, DividendTaxBreakdown, IncomeTaxBreakdown, NiBreakdown};
pub use corporation::{calculate_corporation_tax, CorporationTaxBreakdown, ProfitRegime};
pub use error::EngineError;
pub use optimise::{
    optimise, search, solve_target_take_home, Objective, SearchConstraints, SearchOutcome,
    TargetSolution,
};
pub use rates::{RateRegistry, RateTable, ResolvedRates};
pub use recommend::{
    generate_recommendations, CurrentArrangement, Priority, Recommendation, RecommendationContext,
    RecommendationType,
};
pub use scenario::{
    evaluate, evaluate_personal, CompanyResult, PersonalResult, ScenarioFlags, ScenarioInput,
    ScenarioResult, ScenarioSummary,
};
pub use year::{TaxBand, TaxYear};

use rust_decimal::Decimal;

/// `numerator / denominator`, or zero when the denominator is not positive.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
