use rust_decimal::Decimal;

/// Errors surfaced by the tax engine. All of them are input validation
/// failures; nothing in the engine is transient.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid tax year '{0}': expected YYYY-YY, e.g. 2024-25")]
    InvalidTaxYear(String),
    #[error("available profit must be greater than zero, got {0}")]
    NonPositiveProfit(Decimal),
    #[error("target take-home must be greater than zero, got {0}")]
    NonPositiveTarget(Decimal),
    #[error("target take-home of {target} is not reachable with profit up to {max_profit}")]
    UnreachableTarget { target: Decimal, max_profit: Decimal },
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("salary range is empty: minimum {min} exceeds maximum {max}")]
    EmptySalaryRange { min: Decimal, max: Decimal },
    #[error("salary increment must be greater than zero, got {0}")]
    NonPositiveIncrement(Decimal),
    #[error("salary search would evaluate {count} candidates, more than the limit of {limit}")]
    TooManyCandidates { count: Decimal, limit: usize },
    #[error("no affordable salary candidate in range {min}..={max}")]
    NoAffordableCandidate { min: Decimal, max: Decimal },
    #[error("missing required field for {calculation}: {field}")]
    MissingField {
        calculation: &'static str,
        field: &'static str,
    },
    #[error("invalid rate table for {tax_year}: {reason}")]
    InvalidRateTable { tax_year: String, reason: String },
}
