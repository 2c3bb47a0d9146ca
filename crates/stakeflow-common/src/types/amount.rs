//! Fixed-point stake amounts
//!
//! Amounts are counted in micro-units of the chain's native token (CCD).
//! Everything is integer arithmetic on that count; the decimal point only
//! exists when an amount is printed or parsed.

use {
    serde::{
        de::{self, Visitor},
        Deserialize, Deserializer, Serialize, Serializer,
    },
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

use crate::errors::Error;

/// Number of fractional digits shown for an amount.
pub const DECIMALS: usize = 6;

/// Micro-units per whole token.
pub const MICRO_PER_UNIT: u64 = 1_000_000;

/// An exact, non-negative amount of micro-CCD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StakeAmount(u64);

impl StakeAmount {
    pub const ZERO: StakeAmount = StakeAmount(0);

    pub const fn from_micro(micro: u64) -> Self {
        Self(micro)
    }

    /// Whole tokens; saturates instead of wrapping.
    pub const fn from_whole(units: u64) -> Self {
        Self(units.saturating_mul(MICRO_PER_UNIT))
    }

    pub const fn micro(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: StakeAmount) -> Option<StakeAmount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: StakeAmount) -> Option<StakeAmount> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: StakeAmount) -> StakeAmount {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: StakeAmount) -> StakeAmount {
        Self(self.0.saturating_sub(other.0))
    }

    /// True when `self` is strictly more than `percent`% of `total`.
    pub fn exceeds_share_of(&self, total: StakeAmount, percent: u8) -> bool {
        u128::from(self.0) * 100 > u128::from(total.0) * u128::from(percent)
    }

    /// Scales by a fraction given in parts per 100 000, rounding down.
    pub fn scale_parts_per_100k(&self, parts: u32) -> StakeAmount {
        let scaled = u128::from(self.0) * u128::from(parts) / 100_000;
        Self(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}

impl From<u64> for StakeAmount {
    fn from(micro: u64) -> Self {
        Self(micro)
    }
}

impl From<StakeAmount> for u64 {
    fn from(amount: StakeAmount) -> Self {
        amount.0
    }
}

impl Display for StakeAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / MICRO_PER_UNIT,
            self.0 % MICRO_PER_UNIT,
            width = DECIMALS
        )
    }
}

impl FromStr for StakeAmount {
    type Err = Error;

    /// Parses user input such as `"12"`, `"12.5"` or `"0.000001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(Error::Amount(format!("'{}' is not an amount", s)));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Amount(format!("'{}' is not an amount", s)));
        }
        if fraction.len() > DECIMALS {
            return Err(Error::Amount(format!(
                "'{}' has more than {} decimals",
                s, DECIMALS
            )));
        }

        let overflow = || Error::Amount(format!("'{}' is too large", s));
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = DECIMALS);
            padded.parse().map_err(|_| overflow())?
        };

        whole
            .checked_mul(MICRO_PER_UNIT)
            .and_then(|micro| micro.checked_add(fraction))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl Serialize for StakeAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for StakeAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MicroVisitor;

        impl<'de> Visitor<'de> for MicroVisitor {
            type Value = StakeAmount;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("an amount of micro-CCD as a string or integer")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<StakeAmount, E> {
                Ok(StakeAmount(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<StakeAmount, E> {
                u64::try_from(value)
                    .map(StakeAmount)
                    .map_err(|_| E::custom("amounts cannot be negative"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<StakeAmount, E> {
                value.parse::<u64>().map(StakeAmount).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MicroVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_six_decimals() {
        assert_eq!(StakeAmount::ZERO.to_string(), "0.000000");
        assert_eq!(StakeAmount::from_micro(1).to_string(), "0.000001");
        assert_eq!(StakeAmount::from_micro(12_500_000).to_string(), "12.500000");
        assert_eq!(StakeAmount::from_whole(1000).to_string(), "1000.000000");
    }

    #[test]
    fn test_parse_user_input() {
        assert_eq!("12".parse::<StakeAmount>().unwrap(), StakeAmount::from_whole(12));
        assert_eq!("12.5".parse::<StakeAmount>().unwrap(), StakeAmount::from_micro(12_500_000));
        assert_eq!(" 0.000001 ".parse::<StakeAmount>().unwrap(), StakeAmount::from_micro(1));
        assert_eq!(".25".parse::<StakeAmount>().unwrap(), StakeAmount::from_micro(250_000));
        assert_eq!("3.".parse::<StakeAmount>().unwrap(), StakeAmount::from_whole(3));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", ".", "-1", "1.2.3", "1,5", "0.0000001", "abc", "18446744073709551616"] {
            assert!(input.parse::<StakeAmount>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_serde_as_micro_string() {
        let amount = StakeAmount::from_micro(1_500_000);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"1500000\"");
        let from_str: StakeAmount = serde_json::from_str("\"1500000\"").unwrap();
        let from_int: StakeAmount = serde_json::from_str("1500000").unwrap();
        assert_eq!(from_str, amount);
        assert_eq!(from_int, amount);
        assert!(serde_json::from_str::<StakeAmount>("-5").is_err());
    }

    #[test]
    fn test_share_threshold_is_exact() {
        let total = StakeAmount::from_micro(1000);
        assert!(!StakeAmount::from_micro(950).exceeds_share_of(total, 95));
        assert!(StakeAmount::from_micro(951).exceeds_share_of(total, 95));
        assert!(StakeAmount::from_micro(u64::MAX).exceeds_share_of(StakeAmount::from_micro(u64::MAX - 1), 100));
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = StakeAmount::from_micro(u64::MAX);
        assert_eq!(max.checked_add(StakeAmount::from_micro(1)), None);
        assert_eq!(StakeAmount::ZERO.checked_sub(StakeAmount::from_micro(1)), None);
        assert_eq!(StakeAmount::from_micro(5).saturating_sub(StakeAmount::from_micro(9)), StakeAmount::ZERO);
        assert_eq!(StakeAmount::from_whole(1).scale_parts_per_100k(10_000), StakeAmount::from_micro(100_000));
    }
}
