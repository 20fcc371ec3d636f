//! Financial mathematics shared by the site calculators.
//!
//! - [`amortisation`]: Fixed-payment loan amortisation simulated month by month

pub mod amortisation;

pub use amortisation::{monthly_payment, yearly_schedule, AmortisationSchedule, YearlyBreakdown};
