//! The worldline generator.
//!
//! Maps the integer divergence counter to a reading such as `1.048596`: one
//! leading digit and exactly six fractional digits.
//!
//! # Encoding
//!
//! ```text
//! tier      = 0                              if divergence < 0
//!           = min(9, 1 + divergence / 1000)  otherwise
//! signature = splitmix64(divergence) mod 1_000_000
//! reading   = tier + signature / 1_000_000
//! ```
//!
//! The signature uses the `SplitMix64` output function, so neighbouring
//! divergence values produce unrelated digits while the same value always
//! produces the same reading, in every process.
//!
//! # Proximity
//!
//! `proximity = max(0, 100 - |current - target| * 1_000_000)`. Readings are
//! stored in micro-units (millionths), so this is plain integer arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fractional digits in every reading.
pub const WORLDLINE_SCALE: u32 = 6;

/// Micro-units per whole unit.
const MICRO_PER_UNIT: u64 = 1_000_000;

/// Divergence per integer tier step.
const DIVERGENCE_PER_TIER: i64 = 1_000;

/// Highest integer tier.
const MAX_TIER: u64 = 9;

/// Errors produced when parsing a worldline reading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldlineError {
    /// The input is not one digit, a point, and six digits.
    #[error("malformed worldline reading '{input}': expected D.DDDDDD")]
    Malformed {
        /// The rejected input.
        input: String,
    },
}

// ---------------------------------------------------------------------------
// Worldline
// ---------------------------------------------------------------------------

/// A worldline reading, held exactly in micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Worldline {
    /// Reading times one million. Always below `10_000_000`.
    micro: u64,
}

impl Worldline {
    /// The reading as an exact decimal with scale 6.
    pub fn value(&self) -> Decimal {
        i64::try_from(self.micro)
            .map(|m| Decimal::new(m, WORLDLINE_SCALE))
            .unwrap_or(Decimal::ZERO)
    }

    /// The leading digit.
    pub const fn tier(&self) -> u64 {
        match self.micro.checked_div(MICRO_PER_UNIT) {
            Some(t) => t,
            None => 0,
        }
    }

    /// The six fractional digits as an integer.
    pub const fn signature(&self) -> u64 {
        match self.micro.checked_rem(MICRO_PER_UNIT) {
            Some(s) => s,
            None => 0,
        }
    }

    /// The reading in millionths.
    pub const fn micro_units(&self) -> u64 {
        self.micro
    }

    /// `|self - other|` in millionths.
    pub const fn difference_micro_units(&self, other: &Self) -> u64 {
        self.micro.abs_diff(other.micro)
    }

    /// Closeness to `target` as a percentage in `[0, 100]`.
    pub fn proximity_to(&self, target: &Self) -> Decimal {
        Decimal::from(100_u64.saturating_sub(self.difference_micro_units(target)))
    }

    const fn from_parts(tier: u64, signature: u64) -> Self {
        Self {
            micro: tier
                .saturating_mul(MICRO_PER_UNIT)
                .saturating_add(signature),
        }
    }
}

impl fmt::Display for Worldline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.tier(), self.signature())
    }
}

impl FromStr for Worldline {
    type Err = WorldlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WorldlineError::Malformed {
            input: s.to_owned(),
        };

        let (whole, fraction) = s.split_once('.').ok_or_else(malformed)?;
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.len() != 1 || fraction.len() != 6 || !digits_only(whole) || !digits_only(fraction)
        {
            return Err(malformed());
        }

        let tier: u64 = whole.parse().ok().ok_or_else(malformed)?;
        let signature: u64 = fraction.parse().ok().ok_or_else(malformed)?;
        Ok(Self::from_parts(tier, signature))
    }
}

impl TryFrom<String> for Worldline {
    type Error = WorldlineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Worldline> for String {
    fn from(value: Worldline) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The reading for a divergence counter.
pub fn worldline_of(divergence: i64) -> Worldline {
    let tier = if divergence < 0 {
        0
    } else {
        let steps = divergence.checked_div(DIVERGENCE_PER_TIER).unwrap_or(0);
        u64::try_from(steps)
            .unwrap_or(MAX_TIER)
            .saturating_add(1)
            .min(MAX_TIER)
    };

    let bits = u64::from_le_bytes(divergence.to_le_bytes());
    let signature = splitmix64(bits).checked_rem(MICRO_PER_UNIT).unwrap_or(0);

    Worldline::from_parts(tier, signature)
}

/// Proximity of `value` to `target`, as a percentage in `[0, 100]`.
pub fn proximity(value: &Worldline, target: &Worldline) -> Decimal {
    value.proximity_to(target)
}

/// `SplitMix64`: golden-ratio increment followed by the output mixer.
const fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ z.wrapping_shr(30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ z.wrapping_shr(27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ z.wrapping_shr(31)
}

// ---------------------------------------------------------------------------
// Reference worldlines
// ---------------------------------------------------------------------------

/// The named worldlines shown on the divergence map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceWorldline {
    /// The dystopia line, `1.130205`.
    Alpha,
    /// Steins Gate, `1.048596`. The default target.
    Beta,
    /// `0.523307`.
    Gamma,
}

impl ReferenceWorldline {
    /// Every reference line, highest reading first.
    pub const ALL: [Self; 3] = [Self::Alpha, Self::Beta, Self::Gamma];

    /// The line's reading.
    pub const fn worldline(self) -> Worldline {
        match self {
            Self::Alpha => Worldline::from_parts(1, 130_205),
            Self::Beta => Worldline::from_parts(1, 48_596),
            Self::Gamma => Worldline::from_parts(0, 523_307),
        }
    }

    /// Label for the divergence map.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alpha => "\u{3b1} Worldline (SERN Dystopia)",
            Self::Beta => "\u{3b2} Worldline (Steins Gate)",
            Self::Gamma => "\u{3b3} Worldline",
        }
    }
}

/// The default target reading, Steins Gate.
pub const STEINS_GATE: Worldline = ReferenceWorldline::Beta.worldline();
