use std::fmt::{Display, Formatter};
use std::str::FromStr;
use crate::error::TonTypesError;

const DECIMALS: usize = 9;
const NANO_IN_TON: u128 = 1_000_000_000;

/// Amount of nanotons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coins(u128);

impl Coins {
    pub const ZERO: Coins = Coins(0);

    pub const fn from_nano(nano: u128) -> Self {
        Self(nano)
    }

    pub const fn nano(&self) -> u128 {
        self.0
    }
}

impl Display for Coins {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let int = self.0 / NANO_IN_TON;
        let frac = self.0 % NANO_IN_TON;
        if frac == 0 {
            return write!(f, "{}", int);
        }

        let frac = format!("{:09}", frac);
        write!(f, "{}.{}", int, frac.trim_end_matches('0'))
    }
}

impl FromStr for Coins {
    type Err = TonTypesError;

    /// Parses a decimal amount of TON, e.g. `1`, `0.5`, `.25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TonTypesError::InvalidAmount(s.to_owned());

        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        if int.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS {
            return Err(invalid());
        }
        if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let int: u128 = if int.is_empty() { 0 } else { int.parse().map_err(|_| invalid())? };
        let frac: u128 = if frac.is_empty() {
            0
        } else {
            format!("{:0<9}", frac).parse().map_err(|_| invalid())?
        };

        int.checked_mul(NANO_IN_TON)
            .and_then(|n| n.checked_add(frac))
            .map(Coins)
            .ok_or_else(invalid)
    }
}
