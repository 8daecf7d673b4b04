//! Salary and dividend tax engine for UK owner-managed companies.
//!
//! [`tax`] holds the pure calculators and the optimiser, [`calc`] runs a
//! request end to end and shapes the stored record, [`store`] is the
//! persistence hand-off and [`export`] the CSV rendering.

pub mod calc;
pub mod export;
pub mod store;
pub mod tax;
