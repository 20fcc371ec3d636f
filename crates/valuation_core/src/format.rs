//! Display formatting for valuation figures.
//!
//! Monetary amounts throughout the workspace are in millions of dollars.
//! These helpers render them the way the valuation summary and the
//! calculation trace show them:
//!
//! - [`format_value`]: `$1.94B` / `$672M`
//! - [`format_shares`]: `470.5M` / `1.20B`
//! - [`format_payback_years`]: `16.3 Years` / `N/A`
//! - [`fixed`], [`plain`], [`grouped`]: number fragments used inside trace lines

/// Renders a $M amount in `M` or `B` notation.
///
/// Values of 1000 or more are shown in billions with two decimals; smaller
/// values in whole millions. Non-finite input renders as zero.
///
/// # Examples
/// ```
/// use valuation_core::format::format_value;
///
/// assert_eq!(format_value(8946.056, "$", "/yr"), "$8.95B/yr");
/// assert_eq!(format_value(217.42, "$", ""), "$217M");
/// assert_eq!(format_value(f64::NAN, "$", ""), "$0M");
/// ```
pub fn format_value(value: f64, prefix: &str, suffix: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    if value >= 1000.0 {
        format!("{}{}B{}", prefix, fixed(value / 1000.0, 2), suffix)
    } else {
        format!("{}{}M{}", prefix, fixed(value, 0), suffix)
    }
}

/// Renders a share count (in millions) in `M` or `B` notation.
///
/// # Examples
/// ```
/// use valuation_core::format::format_shares;
///
/// assert_eq!(format_shares(470.4949), "470.5M");
/// assert_eq!(format_shares(1200.0), "1.20B");
/// ```
pub fn format_shares(value: f64) -> String {
    if !value.is_finite() {
        return "0M".to_string();
    }
    if value >= 1000.0 {
        format!("{}B", fixed(value / 1000.0, 2))
    } else {
        format!("{}M", fixed(value, 1))
    }
}

/// Renders positive-cashflow years, or `N/A` when zero or not finite.
///
/// # Examples
/// ```
/// use valuation_core::format::format_payback_years;
///
/// assert_eq!(format_payback_years(16.26), "16.3 Years");
/// assert_eq!(format_payback_years(0.0), "N/A");
/// ```
pub fn format_payback_years(years: f64) -> String {
    if years == 0.0 || !years.is_finite() {
        return "N/A".to_string();
    }
    format!("{} Years", fixed(years, 1))
}

/// Renders a dollar share price with two decimals.
pub fn format_price(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("${}", fixed(value, 2))
}

/// Fixed-point rendering with `decimals` places.
///
/// An exact tie rounds away from zero, so `0.125` renders as `0.13` at two
/// places. Zero renders without a sign; a negative value that rounds to zero
/// keeps it.
///
/// # Examples
/// ```
/// use valuation_core::format::fixed;
///
/// assert_eq!(fixed(3.14159, 2), "3.14");
/// assert_eq!(fixed(0.125, 2), "0.13");
/// assert_eq!(fixed(-0.0, 1), "0.0");
/// assert_eq!(fixed(-0.0001, 0), "-0");
/// ```
pub fn fixed(value: f64, decimals: usize) -> String {
    if value == 0.0 {
        return format!("{:.*}", decimals, 0.0);
    }
    let value = if is_exact_tie(value, decimals) {
        next_away_from_zero(value)
    } else {
        value
    };
    format!("{:.*}", decimals, value)
}

/// Largest place count for which ties are detected; beyond it the scaling
/// below stops being exact.
const MAX_TIE_DECIMALS: usize = 60;

/// True when `value` lies exactly halfway between two `decimals`-place numbers.
///
/// Such a value is `m / 2^(decimals + 1)` with `m` odd, and scaling by a
/// power of two is exact.
fn is_exact_tie(value: f64, decimals: usize) -> bool {
    if !value.is_finite() || decimals > MAX_TIE_DECIMALS {
        return false;
    }
    let scaled = value.abs() * 2f64.powi(decimals as i32 + 1);
    scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}

fn next_away_from_zero(value: f64) -> f64 {
    let magnitude = f64::from_bits(value.abs().to_bits() + 1);
    magnitude.copysign(value)
}

/// Shortest round-trip rendering of a raw input value (`15`, `1.83`, `87.9`).
pub fn plain(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

/// Thousands-grouped rendering with at most three decimals, trailing zeros
/// dropped (`95,000`, `76,315.78`).
///
/// # Examples
/// ```
/// use valuation_core::format::grouped;
///
/// assert_eq!(grouped(95_000.0), "95,000");
/// assert_eq!(grouped(76_315.78), "76,315.78");
/// assert_eq!(grouped(-1234.5), "-1,234.5");
/// ```
pub fn grouped(value: f64) -> String {
    let rendered = fixed(value, 3);
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(rendered.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
