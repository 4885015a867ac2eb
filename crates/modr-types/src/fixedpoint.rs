//! Fixed-point token amount type
//!
//! # Motivation
//!
//! Every stake, price, pool and ratio in the engine is carried as an unsigned
//! 128-bit integer scaled by 10^18 (the 18-decimal token precision used by the
//! wallets that fund the pools).  Binary floats are never used for money:
//! repeated splitting of a pool must produce the same integers on every
//! platform, and the sum of the parts must be checkable against the whole.
//!
//! `Atto` wraps the raw `u128` so the type system prevents:
//! - Implicit construction from raw integers (no `From<u128>` impl).
//! - Mixing token amounts with vote counts, XP, or timestamps.
//!
//! # Scale
//!
//! 1 token = `Atto::ONE` = 1_000_000_000_000_000_000 raw.  Ratios (scores,
//! shares, factors) use the same scale, so `0.5` is `Atto::new(ATTO_SCALE / 2)`.
//!
//! # Arithmetic
//!
//! All arithmetic is checked and returns `None` on overflow or underflow;
//! callers convert that into `EngineError::ArithmeticOverflow`.  There are no
//! operator impls on purpose: a silent wrap in a payout is worse than a halt.
//!
//! Multiplication and division go through a 256-bit intermediate and round
//! down (floor).  Flooring leaves a surplus that the settlement layer assigns
//! to the platform, never an unbacked credit.

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 10^18.
pub const ATTO_SCALE: u128 = 1_000_000_000_000_000_000;

/// Number of decimal places carried by [`Atto`].
pub const ATTO_DECIMALS: usize = 18;

// ---------------------------------------------------------------------------
// Atto newtype
// ---------------------------------------------------------------------------

/// A non-negative fixed-point quantity at 1e-18 scale.
///
/// Use [`Atto::new`] for raw construction, [`Atto::from_units`] for whole
/// tokens, and [`Atto::from_ratio`] for fractions of two integers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atto(u128);

impl Atto {
    pub const ZERO: Atto = Atto(0);

    /// 1.0
    pub const ONE: Atto = Atto(ATTO_SCALE);

    pub const MAX: Atto = Atto(u128::MAX);

    #[inline]
    pub const fn new(raw: u128) -> Self {
        Atto(raw)
    }

    #[inline]
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Whole units.  `u64::MAX * 10^18` fits in `u128`, so this cannot overflow.
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Atto(units as u128 * ATTO_SCALE)
    }

    /// `num / den` as a fixed-point ratio, floored.  `None` when `den == 0`
    /// or the result does not fit.
    pub fn from_ratio(num: u128, den: u128) -> Option<Self> {
        mul_div_floor(num, ATTO_SCALE, den).map(Atto)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn checked_add(self, rhs: Atto) -> Option<Atto> {
        self.0.checked_add(rhs.0).map(Atto)
    }

    /// `None` when `rhs > self` (amounts are never negative).
    #[inline]
    pub fn checked_sub(self, rhs: Atto) -> Option<Atto> {
        self.0.checked_sub(rhs.0).map(Atto)
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Atto) -> Atto {
        Atto(self.0.saturating_sub(rhs.0))
    }

    /// `|self - rhs|`.
    #[inline]
    pub fn abs_diff(self, rhs: Atto) -> Atto {
        Atto(self.0.abs_diff(rhs.0))
    }

    /// `floor(self * num / den)` with a 256-bit intermediate.
    ///
    /// Returns `None` when `den == 0` or the quotient exceeds `u128`.
    #[inline]
    pub fn mul_frac(self, num: u128, den: u128) -> Option<Atto> {
        mul_div_floor(self.0, num, den).map(Atto)
    }

    /// Multiply by a fixed-point ratio (`0.25` → a quarter), floored.
    #[inline]
    pub fn mul_ratio(self, ratio: Atto) -> Option<Atto> {
        self.mul_frac(ratio.0, ATTO_SCALE)
    }

    /// `floor(self * numer / denom)` where both factors are `Atto`.
    ///
    /// This is the pro-rata primitive: `pool.mul_div(stake, total_stake)`.
    #[inline]
    pub fn mul_div(self, numer: Atto, denom: Atto) -> Option<Atto> {
        self.mul_frac(numer.0, denom.0)
    }

    /// `self / denom` as a ratio (both in the same unit), floored.
    #[inline]
    pub fn ratio_of(self, denom: Atto) -> Option<Atto> {
        mul_div_floor(self.0, ATTO_SCALE, denom.0).map(Atto)
    }

    /// Clamp into `[0, 1]` for ratio-typed values.
    #[inline]
    pub fn clamp_unit(self) -> Atto {
        self.min(Atto::ONE)
    }
}

fn mul_div_floor(a: u128, b: u128, den: u128) -> Option<u128> {
    if den == 0 {
        return None;
    }
    // a * b < 2^256 always, so the product itself cannot overflow U256.
    let q = U256::from(a) * U256::from(b) / U256::from(den);
    if q.bits() > 128 {
        return None;
    }
    Some(q.low_u128())
}

/// Checked sum over an iterator of amounts.
pub fn checked_sum<I>(items: I) -> Option<Atto>
where
    I: IntoIterator<Item = Atto>,
{
    items
        .into_iter()
        .try_fold(Atto::ZERO, |acc, x| acc.checked_add(x))
}

// ---------------------------------------------------------------------------
// Decimal text form
// ---------------------------------------------------------------------------

/// Failure to parse a decimal string into [`Atto`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseAttoError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for ParseAttoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fixed-point value '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseAttoError {}

impl FromStr for Atto {
    type Err = ParseAttoError;

    /// Exact decimal parse: `"12"`, `"0.5"`, `"1.000000000000000001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseAttoError {
            input: s.to_string(),
            reason,
        };
        let t = s.trim();
        if t.is_empty() {
            return Err(err("empty"));
        }
        if t.starts_with('-') {
            return Err(err("negative values are not representable"));
        }
        let t = t.strip_prefix('+').unwrap_or(t);

        let (int_part, frac_part) = match t.split_once('.') {
            Some((i, f)) => (i, f),
            None => (t, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err("no digits"));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err("non-digit character"));
        }
        if frac_part.len() > ATTO_DECIMALS {
            return Err(err("more than 18 fractional digits"));
        }

        let int_val: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err("integer part out of range"))?
        };
        let frac_val: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{frac_part:0<width$}", width = ATTO_DECIMALS);
            padded.parse().map_err(|_| err("fraction out of range"))?
        };

        int_val
            .checked_mul(ATTO_SCALE)
            .and_then(|v| v.checked_add(frac_val))
            .map(Atto)
            .ok_or_else(|| err("value out of range"))
    }
}

impl fmt::Display for Atto {
    /// Shortest exact decimal: `10`, `0.5`, `3.000000000000000001`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / ATTO_SCALE;
        let frac = self.0 % ATTO_SCALE;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{frac:0width$}", width = ATTO_DECIMALS);
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

// ---------------------------------------------------------------------------
// Serde: decimal strings on the wire
// ---------------------------------------------------------------------------

impl Serialize for Atto {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Atto {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AttoVisitor)
    }
}

struct AttoVisitor;

impl<'de> Visitor<'de> for AttoVisitor {
    type Value = Atto;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal string or whole number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Atto, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Atto, E> {
        Ok(Atto::from_units(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Atto, E> {
        u64::try_from(v)
            .map(Atto::from_units)
            .map_err(|_| E::custom(format!("negative value {v} is not representable")))
    }

    /// YAML configs write shares as bare `0.8`.  The float is re-read through
    /// its shortest round-trip decimal form, never used arithmetically.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Atto, E> {
        if !v.is_finite() {
            return Err(E::custom("non-finite value"));
        }
        format!("{v}").parse().map_err(E::custom)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
