//! Per-year rate tables and the registry that serves them.
//!
//! Every rate held by a [`RateTable`] is a fraction of one. Rate files may
//! carry legacy flat fields in percentages; those are normalised once, when
//! the table is built, and never at the point of use.

use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{EngineError, TaxBand, TaxYear};

/// Marginal relief fraction used when a rate file leaves it out.
pub const DEFAULT_MARGINAL_RELIEF_FRACTION: Decimal = dec!(0.015);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxRates {
    #[schemars(with = "f64")]
    pub personal_allowance: Decimal,
    /// Adjusted net income above which the personal allowance tapers
    #[schemars(with = "f64")]
    pub taper_threshold: Decimal,
    /// Pounds of income above the taper threshold per pound of allowance lost
    #[schemars(with = "f64")]
    pub taper_ratio: Decimal,
    #[schemars(with = "f64")]
    pub basic_rate: Decimal,
    /// Gross income at which the higher rate starts (e.g. 50,270)
    #[schemars(with = "f64")]
    pub basic_threshold: Decimal,
    #[schemars(with = "f64")]
    pub higher_rate: Decimal,
    /// Income at which the additional rate starts (e.g. 125,140)
    #[schemars(with = "f64")]
    pub higher_threshold: Decimal,
    #[schemars(with = "f64")]
    pub additional_rate: Decimal,
}

/// One band of the Scottish schedule. `upper` is in taxable-income terms
/// (income after the personal allowance); `None` marks the top band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScottishBand {
    pub band: TaxBand,
    #[schemars(with = "Option<f64>")]
    pub upper: Option<Decimal>,
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

/// A three tier NI schedule: nothing up to `threshold`, `main_rate` up to
/// `upper_limit`, `additional_rate` beyond it. A schedule with no upper tier
/// has `upper_limit: None` and an additional rate of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NiTiers {
    #[schemars(with = "f64")]
    pub threshold: Decimal,
    #[schemars(with = "Option<f64>")]
    pub upper_limit: Option<Decimal>,
    #[schemars(with = "f64")]
    pub main_rate: Decimal,
    #[schemars(with = "f64")]
    pub additional_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NationalInsuranceRates {
    /// Earnings needed for a qualifying year towards the state pension
    #[schemars(with = "f64")]
    pub lower_earnings_limit: Decimal,
    /// Primary threshold / upper earnings limit
    pub employee: NiTiers,
    /// Secondary threshold onwards
    pub employer: NiTiers,
    /// Self-employed profits (lower/upper profits limits)
    pub class4: NiTiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DividendRates {
    #[schemars(with = "f64")]
    pub allowance: Decimal,
    #[schemars(with = "f64")]
    pub basic_rate: Decimal,
    #[schemars(with = "f64")]
    pub higher_rate: Decimal,
    #[schemars(with = "f64")]
    pub additional_rate: Decimal,
}

impl DividendRates {
    pub fn rate(&self, band: TaxBand) -> Decimal {
        match band {
            TaxBand::Starter | TaxBand::Basic | TaxBand::Intermediate => self.basic_rate,
            TaxBand::Higher | TaxBand::Advanced => self.higher_rate,
            TaxBand::Additional => self.additional_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporationTaxRates {
    #[schemars(with = "f64")]
    pub small_rate: Decimal,
    #[schemars(with = "f64")]
    pub main_rate: Decimal,
    #[schemars(with = "f64")]
    pub lower_threshold: Decimal,
    #[schemars(with = "f64")]
    pub upper_threshold: Decimal,
    #[serde(default = "default_marginal_relief_fraction")]
    #[schemars(with = "f64")]
    pub marginal_relief_fraction: Decimal,
}

fn default_marginal_relief_fraction() -> Decimal {
    DEFAULT_MARGINAL_RELIEF_FRACTION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoanRates {
    #[schemars(with = "f64")]
    pub threshold: Decimal,
    #[schemars(with = "f64")]
    pub rate: Decimal,
    /// Unearned income only counts once it exceeds this amount
    #[schemars(with = "f64")]
    pub unearned_income_threshold: Decimal,
}

/// Immutable constants for one tax year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub tax_year: TaxYear,
    pub income_tax: IncomeTaxRates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scottish_income_tax: Option<Vec<ScottishBand>>,
    pub national_insurance: NationalInsuranceRates,
    pub dividends: DividendRates,
    pub corporation_tax: CorporationTaxRates,
    pub student_loan: StudentLoanRates,
    pub pension_annual_allowance: Decimal,
}

impl RateTable {
    /// Built-in table for a supported year.
    pub fn builtin(tax_year: TaxYear) -> Option<RateTable> {
        match tax_year.0 {
            2024 => Some(table_2023_24()),
            2025 => Some(table_2024_25()),
            2026 => Some(table_2025_26()),
            _ => None,
        }
    }

    /// Top of the basic rate band in taxable-income terms (e.g. 37,700).
    pub fn basic_band_width(&self) -> Decimal {
        (self.income_tax.basic_threshold - self.income_tax.personal_allowance).max(Decimal::ZERO)
    }

    /// Check the invariants every computation relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fail = |reason: String| {
            Err(EngineError::InvalidRateTable {
                tax_year: self.tax_year.display(),
                reason,
            })
        };

        let it = &self.income_tax;
        if !(it.personal_allowance < it.basic_threshold && it.basic_threshold < it.higher_threshold)
        {
            return fail(format!(
                "income tax thresholds must increase: allowance {} < basic {} < higher {}",
                it.personal_allowance, it.basic_threshold, it.higher_threshold
            ));
        }
        if it.taper_ratio <= Decimal::ZERO {
            return fail(format!("taper ratio must be positive, got {}", it.taper_ratio));
        }

        let ni = &self.national_insurance;
        for (name, tiers) in [
            ("employee", &ni.employee),
            ("employer", &ni.employer),
            ("class 4", &ni.class4),
        ] {
            if let Some(upper) = tiers.upper_limit {
                if upper <= tiers.threshold {
                    return fail(format!(
                        "{name} NI upper limit {upper} must exceed threshold {}",
                        tiers.threshold
                    ));
                }
            } else if !tiers.additional_rate.is_zero() {
                return fail(format!("{name} NI has an additional rate but no upper limit"));
            }
        }

        let ct = &self.corporation_tax;
        if ct.lower_threshold >= ct.upper_threshold {
            return fail(format!(
                "marginal relief thresholds must increase: {} < {}",
                ct.lower_threshold, ct.upper_threshold
            ));
        }
        if ct.small_rate > ct.main_rate {
            return fail("corporation tax small rate exceeds main rate".to_string());
        }

        if let Some(bands) = &self.scottish_income_tax {
            let mut previous = Decimal::ZERO;
            for (i, band) in bands.iter().enumerate() {
                match band.upper {
                    Some(upper) if upper > previous => previous = upper,
                    Some(upper) => {
                        return fail(format!("Scottish band limits must increase at {upper}"))
                    }
                    None if i + 1 == bands.len() => {}
                    None => return fail("only the last Scottish band may be open".to_string()),
                }
            }
        }

        let rates = [
            ("basic rate", it.basic_rate),
            ("higher rate", it.higher_rate),
            ("additional rate", it.additional_rate),
            ("employee NI main rate", ni.employee.main_rate),
            ("employee NI additional rate", ni.employee.additional_rate),
            ("employer NI main rate", ni.employer.main_rate),
            ("employer NI additional rate", ni.employer.additional_rate),
            ("class 4 main rate", ni.class4.main_rate),
            ("class 4 additional rate", ni.class4.additional_rate),
            ("dividend basic rate", self.dividends.basic_rate),
            ("dividend higher rate", self.dividends.higher_rate),
            ("dividend additional rate", self.dividends.additional_rate),
            ("corporation tax small rate", ct.small_rate),
            ("corporation tax main rate", ct.main_rate),
            ("marginal relief fraction", ct.marginal_relief_fraction),
            ("student loan rate", self.student_loan.rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return fail(format!("{name} {rate} is not a fraction between 0 and 1"));
            }
        }
        if let Some(band) = self
            .scottish_income_tax
            .iter()
            .flatten()
            .find(|b| b.rate < Decimal::ZERO || b.rate > Decimal::ONE)
        {
            return fail(format!("Scottish {} rate {} is out of range", band.band, band.rate));
        }
        Ok(())
    }

    /// Build a table from a rate file entry, normalising legacy units.
    ///
    /// Starts from the built-in table named by `base` (or the built-in table
    /// for the same year, or the latest built-in), applies legacy flat
    /// fields, then nested sections, then validates.
    pub fn from_config(config: RateTableConfig) -> Result<RateTable, EngineError> {
        let tax_year = TaxYear::parse(&config.tax_year)?;
        let base_year = match &config.base {
            Some(base) => TaxYear::parse(base)?,
            None => tax_year,
        };
        let mut table = RateTable::builtin(base_year).unwrap_or_else(latest_builtin);
        table.tax_year = tax_year;

        if let Some(legacy) = &config.legacy {
            legacy.apply(&mut table);
        }
        if let Some(income_tax) = config.income_tax {
            table.income_tax = income_tax;
        }
        if let Some(scottish) = config.scottish_income_tax {
            table.scottish_income_tax = Some(scottish);
        }
        if let Some(ni) = config.national_insurance {
            table.national_insurance = ni;
        }
        if let Some(dividends) = config.dividends {
            table.dividends = dividends;
        }
        if let Some(ct) = config.corporation_tax {
            table.corporation_tax = ct;
        }
        if let Some(student_loan) = config.student_loan {
            table.student_loan = student_loan;
        }
        if let Some(allowance) = config.pension_annual_allowance {
            table.pension_annual_allowance = allowance;
        }

        table.validate()?;
        Ok(table)
    }
}

/// Rate file entry: nested sections hold fractions, `legacy` holds the flat
/// fields older files carry, where rates may be percentages.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateTableConfig {
    pub tax_year: String,
    /// Built-in year whose values fill anything not given here
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub income_tax: Option<IncomeTaxRates>,
    #[serde(default)]
    pub scottish_income_tax: Option<Vec<ScottishBand>>,
    #[serde(default)]
    pub national_insurance: Option<NationalInsuranceRates>,
    #[serde(default)]
    pub dividends: Option<DividendRates>,
    #[serde(default)]
    pub corporation_tax: Option<CorporationTaxRates>,
    #[serde(default)]
    pub student_loan: Option<StudentLoanRates>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub pension_annual_allowance: Option<Decimal>,
    #[serde(default)]
    pub legacy: Option<LegacyRates>,
}

/// Flat rate fields. Rates of 1 or more are read as percentages.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyRates {
    #[schemars(with = "Option<f64>")]
    pub personal_allowance: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub basic_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub basic_threshold: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub higher_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub higher_threshold: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub additional_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub ni_primary_threshold: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub ni_upper_earnings_limit: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub ni_employee_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub ni_employee_additional_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub ni_secondary_threshold: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub ni_employer_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub dividend_allowance: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub dividend_basic_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub dividend_higher_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub dividend_additional_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub corporation_tax_small_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub corporation_tax_main_rate: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub marginal_relief_lower: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub marginal_relief_upper: Option<Decimal>,
    #[schemars(with = "Option<f64>")]
    pub marginal_relief_fraction: Option<Decimal>,
}

impl LegacyRates {
    fn apply(&self, table: &mut RateTable) {
        fn set(target: &mut Decimal, value: Option<Decimal>) {
            if let Some(v) = value {
                *target = v;
            }
        }
        fn set_rate(target: &mut Decimal, value: Option<Decimal>) {
            if let Some(v) = value {
                *target = normalise_rate(v);
            }
        }

        let it = &mut table.income_tax;
        set(&mut it.personal_allowance, self.personal_allowance);
        set_rate(&mut it.basic_rate, self.basic_rate);
        set(&mut it.basic_threshold, self.basic_threshold);
        set_rate(&mut it.higher_rate, self.higher_rate);
        set(&mut it.higher_threshold, self.higher_threshold);
        set_rate(&mut it.additional_rate, self.additional_rate);

        let ni = &mut table.national_insurance;
        set(&mut ni.employee.threshold, self.ni_primary_threshold);
        if let Some(uel) = self.ni_upper_earnings_limit {
            ni.employee.upper_limit = Some(uel);
        }
        set_rate(&mut ni.employee.main_rate, self.ni_employee_rate);
        set_rate(&mut ni.employee.additional_rate, self.ni_employee_additional_rate);
        set(&mut ni.employer.threshold, self.ni_secondary_threshold);
        set_rate(&mut ni.employer.main_rate, self.ni_employer_rate);

        let div = &mut table.dividends;
        set(&mut div.allowance, self.dividend_allowance);
        set_rate(&mut div.basic_rate, self.dividend_basic_rate);
        set_rate(&mut div.higher_rate, self.dividend_higher_rate);
        set_rate(&mut div.additional_rate, self.dividend_additional_rate);

        let ct = &mut table.corporation_tax;
        set_rate(&mut ct.small_rate, self.corporation_tax_small_rate);
        set_rate(&mut ct.main_rate, self.corporation_tax_main_rate);
        set(&mut ct.lower_threshold, self.marginal_relief_lower);
        set(&mut ct.upper_threshold, self.marginal_relief_upper);
        set_rate(&mut ct.marginal_relief_fraction, self.marginal_relief_fraction);
    }
}

/// Legacy files mix `20` and `0.20` for the same rate. A bare `1` is read as
/// one percent: no rate in a table is ever 100%, but 1% rates are written
/// that way (a marginal relief fraction of `1.5` is 1.5%).
fn normalise_rate(value: Decimal) -> Decimal {
    if value >= Decimal::ONE {
        value / dec!(100)
    } else {
        value
    }
}

/// The table a lookup resolved to, and whether it was a fallback.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRates<'a> {
    pub requested: TaxYear,
    pub table: &'a RateTable,
}

impl ResolvedRates<'_> {
    pub fn fell_back(&self) -> bool {
        self.requested != self.table.tax_year
    }
}

/// Read-only set of rate tables keyed by tax year, loaded once at startup.
#[derive(Debug, Clone)]
pub struct RateRegistry {
    tables: BTreeMap<TaxYear, RateTable>,
    latest: RateTable,
}

impl Default for RateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RateRegistry {
    pub fn builtin() -> Self {
        let latest = table_2025_26();
        let tables = [table_2023_24(), table_2024_25(), latest.clone()]
            .into_iter()
            .map(|t| (t.tax_year, t))
            .collect();
        RateRegistry { tables, latest }
    }

    fn insert(&mut self, table: RateTable) {
        if table.tax_year >= self.latest.tax_year {
            self.latest = table.clone();
        }
        self.tables.insert(table.tax_year, table);
    }

    /// Built-in tables plus (or replaced by) the given rate file entries.
    pub fn with_configs(configs: Vec<RateTableConfig>) -> Result<Self, EngineError> {
        let mut registry = Self::builtin();
        for config in configs {
            let table = RateTable::from_config(config)?;
            log::debug!("Loaded rate table for {}", table.tax_year);
            registry.insert(table);
        }
        Ok(registry)
    }

    /// Read a JSON array of rate file entries.
    pub fn from_json_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let configs: Vec<RateTableConfig> = serde_json::from_reader(reader)?;
        Ok(Self::with_configs(configs)?)
    }

    pub fn get(&self, tax_year: TaxYear) -> Option<&RateTable> {
        self.tables.get(&tax_year)
    }

    pub fn latest(&self) -> &RateTable {
        &self.latest
    }

    pub fn years(&self) -> impl Iterator<Item = TaxYear> + '_ {
        self.tables.keys().copied()
    }

    /// Look up a year, falling back to the latest known table.
    pub fn resolve(&self, tax_year: TaxYear) -> ResolvedRates<'_> {
        let table = match self.get(tax_year) {
            Some(table) => table,
            None => {
                let latest = self.latest();
                log::warn!(
                    "No rate table for {}, falling back to {}",
                    tax_year,
                    latest.tax_year
                );
                latest
            }
        };
        ResolvedRates {
            requested: tax_year,
            table,
        }
    }
}

fn latest_builtin() -> RateTable {
    table_2025_26()
}

fn rest_of_uk_income_tax() -> IncomeTaxRates {
    IncomeTaxRates {
        personal_allowance: dec!(12570),
        taper_threshold: dec!(100000),
        taper_ratio: dec!(2),
        basic_rate: dec!(0.20),
        basic_threshold: dec!(50270),
        higher_rate: dec!(0.40),
        higher_threshold: dec!(125140),
        additional_rate: dec!(0.45),
    }
}

fn scottish(bands: &[(TaxBand, Option<Decimal>, Decimal)]) -> Option<Vec<ScottishBand>> {
    Some(
        bands
            .iter()
            .map(|&(band, upper, rate)| ScottishBand { band, upper, rate })
            .collect(),
    )
}

fn corporation_tax_from_april_2023() -> CorporationTaxRates {
    CorporationTaxRates {
        small_rate: dec!(0.19),
        main_rate: dec!(0.25),
        lower_threshold: dec!(50000),
        upper_threshold: dec!(250000),
        marginal_relief_fraction: DEFAULT_MARGINAL_RELIEF_FRACTION,
    }
}

fn table_2023_24() -> RateTable {
    RateTable {
        tax_year: TaxYear(2024),
        income_tax: rest_of_uk_income_tax(),
        scottish_income_tax: scottish(&[
            (TaxBand::Starter, Some(dec!(2162)), dec!(0.19)),
            (TaxBand::Basic, Some(dec!(13118)), dec!(0.20)),
            (TaxBand::Intermediate, Some(dec!(31092)), dec!(0.21)),
            (TaxBand::Higher, Some(dec!(125140)), dec!(0.42)),
            (TaxBand::Additional, None, dec!(0.47)),
        ]),
        national_insurance: NationalInsuranceRates {
            lower_earnings_limit: dec!(6396),
            // main rate before the January 2024 cut
            employee: NiTiers {
                threshold: dec!(12570),
                upper_limit: Some(dec!(50270)),
                main_rate: dec!(0.12),
                additional_rate: dec!(0.02),
            },
            employer: NiTiers {
                threshold: dec!(9100),
                upper_limit: None,
                main_rate: dec!(0.138),
                additional_rate: Decimal::ZERO,
            },
            class4: NiTiers {
                threshold: dec!(12570),
                upper_limit: Some(dec!(50270)),
                main_rate: dec!(0.09),
                additional_rate: dec!(0.02),
            },
        },
        dividends: DividendRates {
            allowance: dec!(1000),
            basic_rate: dec!(0.0875),
            higher_rate: dec!(0.3375),
            additional_rate: dec!(0.3935),
        },
        corporation_tax: corporation_tax_from_april_2023(),
        student_loan: StudentLoanRates {
            threshold: dec!(27295),
            rate: dec!(0.09),
            unearned_income_threshold: dec!(2000),
        },
        pension_annual_allowance: dec!(60000),
    }
}

fn table_2024_25() -> RateTable {
    RateTable {
        tax_year: TaxYear(2025),
        income_tax: rest_of_uk_income_tax(),
        scottish_income_tax: scottish(&[
            (TaxBand::Starter, Some(dec!(2306)), dec!(0.19)),
            (TaxBand::Basic, Some(dec!(13991)), dec!(0.20)),
            (TaxBand::Intermediate, Some(dec!(31092)), dec!(0.21)),
            (TaxBand::Higher, Some(dec!(62430)), dec!(0.42)),
            (TaxBand::Advanced, Some(dec!(125140)), dec!(0.45)),
            (TaxBand::Additional, None, dec!(0.48)),
        ]),
        national_insurance: NationalInsuranceRates {
            lower_earnings_limit: dec!(6396),
            employee: NiTiers {
                threshold: dec!(12570),
                upper_limit: Some(dec!(50270)),
                main_rate: dec!(0.08),
                additional_rate: dec!(0.02),
            },
            employer: NiTiers {
                threshold: dec!(9100),
                upper_limit: None,
                main_rate: dec!(0.138),
                additional_rate: Decimal::ZERO,
            },
            class4: NiTiers {
                threshold: dec!(12570),
                upper_limit: Some(dec!(50270)),
                main_rate: dec!(0.06),
                additional_rate: dec!(0.02),
            },
        },
        dividends: DividendRates {
            allowance: dec!(500),
            basic_rate: dec!(0.0875),
            higher_rate: dec!(0.3375),
            additional_rate: dec!(0.3935),
        },
        corporation_tax: corporation_tax_from_april_2023(),
        student_loan: StudentLoanRates {
            threshold: dec!(27295),
            rate: dec!(0.09),
            unearned_income_threshold: dec!(2000),
        },
        pension_annual_allowance: dec!(60000),
    }
}

fn table_2025_26() -> RateTable {
    RateTable {
        tax_year: TaxYear(2026),
        income_tax: rest_of_uk_income_tax(),
        scottish_income_tax: scottish(&[
            (TaxBand::Starter, Some(dec!(2827)), dec!(0.19)),
            (TaxBand::Basic, Some(dec!(14921)), dec!(0.20)),
            (TaxBand::Intermediate, Some(dec!(31092)), dec!(0.21)),
            (TaxBand::Higher, Some(dec!(62430)), dec!(0.42)),
            (TaxBand::Advanced, Some(dec!(125140)), dec!(0.45)),
            (TaxBand::Additional, None, dec!(0.48)),
        ]),
        national_insurance: NationalInsuranceRates {
            lower_earnings_limit: dec!(6500),
            employee: NiTiers {
                threshold: dec!(12570),
                upper_limit: Some(dec!(50270)),
                main_rate: dec!(0.08),
                additional_rate: dec!(0.02),
            },
            employer: NiTiers {
                threshold: dec!(5000),
                upper_limit: None,
                main_rate: dec!(0.15),
                additional_rate: Decimal::ZERO,
            },
            class4: NiTiers {
                threshold: dec!(12570),
                upper_limit: Some(dec!(50270)),
                main_rate: dec!(0.06),
                additional_rate: dec!(0.02),
            },
        },
        dividends: DividendRates {
            allowance: dec!(500),
            basic_rate: dec!(0.0875),
            higher_rate: dec!(0.3375),
            additional_rate: dec!(0.3935),
        },
        corporation_tax: corporation_tax_from_april_2023(),
        student_loan: StudentLoanRates {
            threshold: dec!(28470),
            rate: dec!(0.09),
            unearned_income_threshold: dec!(2000),
        },
        pension_annual_allowance: dec!(60000),
    }
}
