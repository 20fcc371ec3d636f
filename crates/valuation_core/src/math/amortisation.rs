//! Fixed-payment loan amortisation.
//!
//! Debt-financed sites repay their GPU loan with a constant monthly payment
//! derived from the standard annuity formula:
//!
//! ```text
//! r       = annual_rate_pct / 100 / 12
//! n       = term_years * 12
//! payment = principal * r (1 + r)^n / ((1 + r)^n - 1)
//! ```
//!
//! The yearly breakdown is produced by simulating each month (interest on the
//! running balance, remainder of the payment to principal) and aggregating
//! per year. A closed-form annual approximation would drift from the monthly
//! figures shown in the calculation trace, so the simulation is the
//! reference behaviour.
//!
//! # Examples
//!
//! ```
//! use valuation_core::math::amortisation::{monthly_payment, yearly_schedule};
//!
//! // Zero-interest loans repay principal evenly.
//! assert_eq!(monthly_payment(120.0, 0.0, 1), 10.0);
//!
//! let schedule = yearly_schedule(1000.0, 7.0, 5);
//! assert_eq!(schedule.years().len(), 5);
//! assert!((schedule.total_principal() - 1000.0).abs() < 1e-6);
//! ```

use crate::types::input::MAX_TERM_YEARS;

/// Number of payment periods per year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Monthly rate for an annual percentage rate.
#[inline]
fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / MONTHS_PER_YEAR as f64
}

#[inline]
fn guarded_term(term_years: u32) -> u32 {
    term_years.clamp(1, MAX_TERM_YEARS)
}

/// Fixed monthly payment that fully amortises `principal` over `term_years`.
///
/// A zero term is treated as one year. A zero rate degrades to straight-line
/// repayment (`principal / n`) instead of the `0 / 0` the annuity formula
/// would produce.
///
/// # Arguments
///
/// * `principal` - Loan principal ($M)
/// * `annual_rate_pct` - Annual interest rate as a percentage (7.0 = 7%)
/// * `term_years` - Loan term in whole years
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    let r = monthly_rate(annual_rate_pct);
    let n = (guarded_term(term_years) * MONTHS_PER_YEAR) as f64;

    if r == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    let denominator = growth - 1.0;
    if denominator == 0.0 || !denominator.is_finite() {
        return principal / n;
    }
    principal * (r * growth) / denominator
}

/// One year of a loan's amortisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyBreakdown {
    /// 1-based year number.
    pub year: u32,
    /// Outstanding balance at the start of the year.
    pub start_balance: f64,
    /// Interest paid over the year's twelve payments.
    pub interest_paid: f64,
    /// Principal repaid over the year's twelve payments.
    pub principal_paid: f64,
    /// Outstanding balance after the year's last payment.
    pub end_balance: f64,
}

/// Full amortisation of a loan, aggregated per year.
///
/// Transient: built fresh by [`yearly_schedule`] whenever a calculator needs
/// the interest figures.
#[derive(Debug, Clone, PartialEq)]
pub struct AmortisationSchedule {
    principal: f64,
    monthly_payment: f64,
    years: Vec<YearlyBreakdown>,
}

impl AmortisationSchedule {
    /// Loan principal the schedule was built from.
    #[inline]
    pub fn principal(&self) -> f64 {
        self.principal
    }

    /// Per-year breakdown, ordered by year.
    #[inline]
    pub fn years(&self) -> &[YearlyBreakdown] {
        &self.years
    }

    /// Number of years in the term.
    #[inline]
    pub fn term_years(&self) -> u32 {
        self.years.len() as u32
    }

    /// Fixed monthly payment.
    #[inline]
    pub fn monthly_payment(&self) -> f64 {
        self.monthly_payment
    }

    /// Monthly payment times twelve.
    #[inline]
    pub fn annual_payment(&self) -> f64 {
        self.monthly_payment * MONTHS_PER_YEAR as f64
    }

    /// Interest paid over the whole term.
    pub fn total_interest(&self) -> f64 {
        self.years.iter().map(|y| y.interest_paid).sum()
    }

    /// Principal repaid over the whole term. Equals the principal up to
    /// rounding.
    pub fn total_principal(&self) -> f64 {
        self.years.iter().map(|y| y.principal_paid).sum()
    }

    /// Total interest spread evenly across the term.
    pub fn average_interest_per_year(&self) -> f64 {
        self.total_interest() / self.term_years().max(1) as f64
    }

    /// Balance remaining after the final payment (≈ 0).
    pub fn final_balance(&self) -> f64 {
        self.years
            .last()
            .map(|y| y.end_balance)
            .unwrap_or(self.principal)
    }
}

/// Simulates a fixed-payment loan month by month and aggregates each year.
///
/// The schedule always has `max(term_years, 1)` entries. Negative principals
/// (a prepayment exceeding the hardware cost) are simulated as-is and yield
/// negative interest, matching the cash position they represent.
pub fn yearly_schedule(principal: f64, annual_rate_pct: f64, term_years: u32) -> AmortisationSchedule {
    let term = guarded_term(term_years);
    let r = monthly_rate(annual_rate_pct);
    let payment = monthly_payment(principal, annual_rate_pct, term);

    let mut balance = principal;
    let mut years = Vec::with_capacity(term as usize);

    for year in 1..=term {
        let start_balance = balance;
        let mut interest_paid = 0.0;
        let mut principal_paid = 0.0;

        for _ in 0..MONTHS_PER_YEAR {
            let month_interest = balance * r;
            let month_principal = payment - month_interest;
            interest_paid += month_interest;
            principal_paid += month_principal;
            balance -= month_principal;
        }

        years.push(YearlyBreakdown {
            year,
            start_balance,
            interest_paid,
            principal_paid,
            end_balance: balance,
        });
    }

    AmortisationSchedule {
        principal,
        monthly_payment: payment,
        years,
    }
}
