//! Reward parser for free-text task values.
//!
//! # Responsibility
//! - Turn a catalog `Value` cell into `TaskEconomics`.
//!
//! # Invariants
//! - A value containing `Must do` (case-sensitive) is always must-do with no
//!   reward, whatever else it contains.
//! - Only the first character decides whether a value is monetary.
//! - Values that are neither monetary nor must-do are economically inert.

use crate::model::economics::{RewardAmount, TaskEconomics};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Marker phrase for obligation tasks.
pub const MUST_DO_MARKER: &str = "Must do";

/// Leading glyphs that make a value monetary.
pub const CURRENCY_SYMBOLS: [char; 3] = ['£', '$', '€'];

static AMOUNT_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[£$€,]").expect("valid currency noise regex"));

/// A currency-prefixed value whose remainder is not a usable amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardParseError {
    InvalidAmount { raw: String },
}

impl Display for RewardParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount { raw } => {
                write!(f, "value `{raw}` is not a valid non-negative amount")
            }
        }
    }
}

impl Error for RewardParseError {}

/// Parses one raw value into task economics.
///
/// # Errors
/// - `InvalidAmount` when the value starts with a currency symbol but the
///   remainder (after removing currency symbols and commas) is not a plain
///   non-negative decimal (`12`, `12.5`, `.5`) that fits in hundredths.
///
/// Amounts are rounded to hundredths on the decimal digits themselves, half
/// away from zero.
pub fn parse_reward(raw: &str) -> Result<TaskEconomics, RewardParseError> {
    if raw.contains(MUST_DO_MARKER) {
        return Ok(TaskEconomics::must_do());
    }

    match raw.chars().next() {
        Some(first) if CURRENCY_SYMBOLS.contains(&first) => {
            parse_amount(raw).map(TaskEconomics::paid)
        }
        _ => Ok(TaskEconomics::inert()),
    }
}

/// Fail-closed variant: malformed amounts become inert economics.
pub fn parse_reward_or_inert(raw: &str) -> TaskEconomics {
    parse_reward(raw).unwrap_or_else(|err| {
        warn!("event=reward_parse module=reward status=error error={err}");
        TaskEconomics::inert()
    })
}

fn parse_amount(raw: &str) -> Result<RewardAmount, RewardParseError> {
    let invalid = || RewardParseError::InvalidAmount {
        raw: raw.to_string(),
    };

    let stripped = AMOUNT_NOISE_RE.replace_all(raw, "");
    let text = stripped.trim();
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    let has_digits = !whole.is_empty() || !fraction.is_empty();
    if !has_digits || !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid());
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid())?
    };
    let mut digits = fraction.bytes().map(|byte| u64::from(byte - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    // Half away from zero on the third fraction digit.
    let carry = u64::from(digits.next().is_some_and(|digit| digit >= 5));

    whole_units
        .checked_mul(100)
        .and_then(|units| units.checked_add(tenths * 10 + hundredths + carry))
        .map(RewardAmount::from_minor_units)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::{parse_reward, parse_reward_or_inert, RewardParseError};
    use crate::model::economics::{RewardAmount, TaskEconomics};

    #[test]
    fn strips_symbols_and_thousands_separators() {
        let economics = parse_reward("£1,250.75").expect("amount should parse");
        assert_eq!(economics.reward, RewardAmount::from_minor_units(125_075));
        assert!(!economics.is_must_do);
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        for raw in ["£-2", "$inf", "€NaN", "£"] {
            assert!(
                matches!(parse_reward(raw), Err(RewardParseError::InvalidAmount { .. })),
                "expected `{raw}` to be rejected"
            );
        }
    }

    #[test]
    fn rounds_to_nearest_hundredth() {
        let economics = parse_reward("$0.125").expect("amount should parse");
        assert_eq!(economics.reward, RewardAmount::from_minor_units(13));
    }

    #[test]
    fn rounding_works_on_decimal_text_not_binary_floats() {
        let cases = [("£0.285", 29), ("£1.005", 101), ("£2.675", 268), ("£2.674", 267)];
        for (raw, minor_units) in cases {
            let economics = parse_reward(raw).expect("amount should parse");
            assert_eq!(
                economics.reward,
                RewardAmount::from_minor_units(minor_units),
                "{raw}"
            );
        }
    }

    #[test]
    fn accepts_bare_fraction_and_trailing_dot() {
        assert_eq!(
            parse_reward("£.5").expect("amount should parse").reward,
            RewardAmount::from_minor_units(50)
        );
        assert_eq!(
            parse_reward("£5.").expect("amount should parse").reward,
            RewardAmount::from_minor_units(500)
        );
    }

    #[test]
    fn rejects_exponents_and_overflowing_amounts() {
        for raw in ["£1e3", "£1.2.3", "£.", "£99999999999999999999"] {
            assert!(parse_reward(raw).is_err(), "expected `{raw}` to be rejected");
        }
    }

    #[test]
    fn empty_value_is_inert() {
        assert_eq!(parse_reward("").expect("empty parses"), TaskEconomics::inert());
    }

    #[test]
    fn or_inert_swallows_malformed_amounts() {
        assert_eq!(parse_reward_or_inert("£abc"), TaskEconomics::inert());
    }
}
