//! Blank-tolerant numeric input handling.
//!
//! Site parameters arrive from a form or a JSON snapshot where a field may be
//! blank, a numeric string, or missing altogether. Blank values are carried as
//! `NaN` and coerced to a field-specific default immediately before use, so no
//! `NaN` or infinity can reach a calculation result.
//!
//! This module provides:
//! - [`Coerce`]: default substitution for blank or zero values
//! - [`lenient_f64`] / [`lenient_counts`]: serde helpers that never reject a number field
//! - [`LenientTag`] / [`deserialize_tag`]: forgiving parsing of mode and unit tags

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Substitutes defaults for blank numeric inputs.
///
/// A value is *blank* when it is not finite (`NaN` from an empty field, or an
/// infinity). The three helpers differ only in whether zero also counts as
/// blank.
///
/// # Examples
/// ```
/// use valuation_core::types::input::Coerce;
///
/// assert_eq!(f64::NAN.or_zero(), 0.0);
/// assert_eq!(0.0_f64.or_default(1.0), 1.0);
/// assert_eq!(0.0_f64.nullish_or(5.0), 0.0);
/// assert_eq!(1.5_f64.or_default(1.0), 1.5);
/// ```
pub trait Coerce {
    /// Blank becomes 0.
    fn or_zero(self) -> f64;

    /// Blank or zero becomes `default`. Used for divisors such as lifetimes,
    /// contract years and PUE.
    fn or_default(self, default: f64) -> f64;

    /// Blank becomes `default`; an explicit zero is kept.
    fn nullish_or(self, default: f64) -> f64;
}

impl Coerce for f64 {
    #[inline]
    fn or_zero(self) -> f64 {
        if self.is_finite() {
            self
        } else {
            0.0
        }
    }

    #[inline]
    fn or_default(self, default: f64) -> f64 {
        if self.is_finite() && self != 0.0 {
            self
        } else {
            default
        }
    }

    #[inline]
    fn nullish_or(self, default: f64) -> f64 {
        if self.is_finite() {
            self
        } else {
            default
        }
    }
}

/// The blank value (`NaN`), used as the serde default for missing numeric fields.
#[inline]
pub fn blank() -> f64 {
    f64::NAN
}

/// Divides, returning 0 when the denominator is zero or the quotient is not finite.
///
/// # Examples
/// ```
/// use valuation_core::types::input::safe_div;
///
/// assert_eq!(safe_div(10.0, 4.0), 2.5);
/// assert_eq!(safe_div(10.0, 0.0), 0.0);
/// ```
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        0.0
    }
}

/// Converts a coerced year count into a whole number of loan years.
///
/// Rounds to the nearest year (half up), never below 1 and never above
/// [`MAX_TERM_YEARS`], which bounds the monthly amortisation loop. The
/// payment and the schedule both use the rounded term, so a fractional
/// term still amortises fully.
#[inline]
pub fn whole_years(years: f64) -> u32 {
    let years = years.or_default(1.0).round();
    years.clamp(1.0, MAX_TERM_YEARS as f64) as u32
}

/// Upper bound on any loan term, in years.
pub const MAX_TERM_YEARS: u32 = 100;

struct LenientF64Visitor;

impl<'de> Visitor<'de> for LenientF64Visitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, an empty string or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        Ok(v.trim().parse::<f64>().unwrap_or(f64::NAN))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(LenientF64Visitor)
    }
}

/// Wrapper that deserialises any scalar into an `f64`, mapping blanks to `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LenientF64(pub f64);

impl<'de> Deserialize<'de> for LenientF64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(LenientF64Visitor)
            .map(LenientF64)
    }
}

/// serde `deserialize_with` helper for a single numeric field.
///
/// # Examples
/// ```
/// use serde::Deserialize;
/// use valuation_core::types::input::lenient_f64;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(deserialize_with = "lenient_f64")]
///     pue: f64,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"pue": "1.4"}"#).unwrap();
/// assert_eq!(row.pue, 1.4);
/// let row: Row = serde_json::from_str(r#"{"pue": ""}"#).unwrap();
/// assert!(row.pue.is_nan());
/// ```
pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    LenientF64::deserialize(deserializer).map(|v| v.0)
}

/// serde `deserialize_with` helper for an optional numeric field.
///
/// `null`, blanks and non-numeric strings all become `None`.
pub fn lenient_opt_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let value = lenient_f64(deserializer)?;
    Ok(value.is_finite().then_some(value))
}

struct CountsVisitor;

impl<'de> Visitor<'de> for CountsVisitor {
    type Value = BTreeMap<String, f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of GPU type to count")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut counts = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, LenientF64>()? {
            counts.insert(key, value.0);
        }
        Ok(counts)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(CountsVisitor)
    }
}

/// serde `deserialize_with` helper for a `key -> number` map.
///
/// `null` becomes an empty map; blank values inside the map become `NaN`.
pub fn lenient_counts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error> {
    deserializer.deserialize_any(CountsVisitor)
}

/// A mode or unit selector parsed from a free-form string tag.
///
/// Unknown or missing tags resolve to the type's default rather than failing,
/// matching how the input form treats anything but the recognised value.
pub trait LenientTag: Sized + Default {
    /// Resolves a tag to a variant.
    fn from_tag(tag: &str) -> Self;
}

/// Deserialises a [`LenientTag`] from an optional string.
pub fn deserialize_tag<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: LenientTag,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.map(|t| T::from_tag(&t)).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_default_treats_zero_and_nan_as_blank() {
        assert_eq!(0.0_f64.or_default(20.0), 20.0);
        assert_eq!(f64::NAN.or_default(20.0), 20.0);
        assert_eq!(f64::INFINITY.or_default(20.0), 20.0);
        assert_eq!(7.0_f64.or_default(20.0), 7.0);
    }

    #[test]
    fn test_nullish_keeps_zero() {
        assert_eq!(0.0_f64.nullish_or(3.0), 0.0);
        assert_eq!(f64::NAN.nullish_or(3.0), 3.0);
    }

    #[test]
    fn test_safe_div_never_infinite() {
        assert_eq!(safe_div(1.0, 0.0), 0.0);
        assert_eq!(safe_div(f64::MAX, 1e-300), 0.0);
        assert_eq!(safe_div(-6.0, 3.0), -2.0);
    }

    #[test]
    fn test_whole_years_bounds() {
        assert_eq!(whole_years(0.0), 1);
        assert_eq!(whole_years(f64::NAN), 1);
        assert_eq!(whole_years(5.0), 5);
        assert_eq!(whole_years(4.6), 5);
        assert_eq!(whole_years(4.5), 5);
        assert_eq!(whole_years(4.4), 4);
        assert_eq!(whole_years(-3.0), 1);
        assert_eq!(whole_years(1e9), MAX_TERM_YEARS);
    }

    #[test]
    fn test_lenient_counts_accepts_blanks() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(deserialize_with = "lenient_counts")]
            gpus: BTreeMap<String, f64>,
        }

        let holder: Holder =
            serde_json::from_str(r#"{"gpus": {"b200": 10, "b300": "", "gb300": "4"}}"#).unwrap();
        assert_eq!(holder.gpus["b200"], 10.0);
        assert!(holder.gpus["b300"].is_nan());
        assert_eq!(holder.gpus["gb300"], 4.0);

        let holder: Holder = serde_json::from_str(r#"{"gpus": null}"#).unwrap();
        assert!(holder.gpus.is_empty());
    }

    #[test]
    fn test_lenient_opt_f64() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(deserialize_with = "lenient_opt_f64")]
            rate: Option<f64>,
        }

        let holder: Holder = serde_json::from_str(r#"{"rate": null}"#).unwrap();
        assert_eq!(holder.rate, None);
        let holder: Holder = serde_json::from_str(r#"{"rate": 2.5}"#).unwrap();
        assert_eq!(holder.rate, Some(2.5));
    }
}
