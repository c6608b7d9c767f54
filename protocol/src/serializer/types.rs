//! Value types that have their own wire encoding.
//!
//! These are the protocol's vocabulary: amounts with a symbol, authorities,
//! and second-resolution timestamps. Each one has a canonical text form
//! (what node APIs speak) and a binary form (what gets signed). Both are
//! defined here so the two can't drift apart.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::ByteBuffer;
use crate::config::MAX_ASSET_SYMBOL_LENGTH;
use crate::crypto::PublicKey;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// AssetSymbol
// ---------------------------------------------------------------------------

/// The fixed set of symbols the ledger knows about.
///
/// Precision is a property of the symbol, never stored alongside the
/// amount: liquid tokens have 3 decimals, vesting shares have 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSymbol {
    /// Liquid native token.
    Steem,
    /// Dollar-pegged debt token.
    Sbd,
    /// Vesting shares (staked native token).
    Vests,
    /// Test network's liquid token.
    Tests,
    /// Test network's dollar token.
    Tbd,
}

impl AssetSymbol {
    /// The ticker as it appears on the wire and in text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Steem => "STEEM",
            Self::Sbd => "SBD",
            Self::Vests => "VESTS",
            Self::Tests => "TESTS",
            Self::Tbd => "TBD",
        }
    }

    /// Number of fractional digits.
    pub fn precision(self) -> u8 {
        match self {
            Self::Vests => 6,
            Self::Steem | Self::Sbd | Self::Tests | Self::Tbd => 3,
        }
    }
}

impl FromStr for AssetSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STEEM" => Ok(Self::Steem),
            "SBD" => Ok(Self::Sbd),
            "VESTS" => Ok(Self::Vests),
            "TESTS" => Ok(Self::Tests),
            "TBD" => Ok(Self::Tbd),
            other => Err(Error::serialization("asset", format!("unknown asset symbol {other:?}"))),
        }
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// An amount of a known symbol, held as an integer count of the smallest
/// unit. No floating point anywhere near money.
///
/// # Examples
///
/// ```
/// use steem_protocol::serializer::{Asset, AssetSymbol};
///
/// let amount: Asset = "1.500 STEEM".parse().unwrap();
/// assert_eq!(amount.units(), 1_500);
/// assert_eq!(amount.symbol(), AssetSymbol::Steem);
/// assert_eq!(amount.to_string(), "1.500 STEEM");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Asset {
    units: i64,
    symbol: AssetSymbol,
}

impl Asset {
    /// Builds an asset from a count of smallest units.
    pub fn new(units: i64, symbol: AssetSymbol) -> Self {
        Self { units, symbol }
    }

    /// Builds an asset from a decimal amount, rounding to the symbol's
    /// precision.
    pub fn from_amount(amount: f64, symbol: AssetSymbol) -> Result<Self> {
        let scaled = (amount * 10f64.powi(i32::from(symbol.precision()))).round();
        if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
            return Err(Error::serialization("asset", format!("amount {amount} out of range")));
        }
        Ok(Self::new(scaled as i64, symbol))
    }

    /// Smallest-unit count.
    pub fn units(&self) -> i64 {
        self.units
    }

    /// Symbol.
    pub fn symbol(&self) -> AssetSymbol {
        self.symbol
    }

    /// Fractional digits, derived from the symbol.
    pub fn precision(&self) -> u8 {
        self.symbol.precision()
    }

    /// Writes `i64(units) || u8(precision) || symbol[7]`.
    pub fn write(&self, buf: &mut ByteBuffer) -> Result<()> {
        let mut symbol = [0u8; MAX_ASSET_SYMBOL_LENGTH];
        let ticker = self.symbol.as_str().as_bytes();
        symbol[..ticker.len()].copy_from_slice(ticker);

        buf.write_i64(self.units)?;
        buf.write_u8(self.precision())?;
        buf.write_bytes(&symbol)?;
        Ok(())
    }

    /// Reads the binary form and checks the precision against the symbol.
    pub fn read(buf: &mut ByteBuffer) -> Result<Self> {
        let units = buf.read_i64()?;
        let precision = buf.read_u8()?;
        let raw = buf.read_bytes(MAX_ASSET_SYMBOL_LENGTH)?;
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        let ticker = std::str::from_utf8(&raw[..end])
            .map_err(|_| Error::serialization("asset", "symbol is not ASCII"))?;
        let symbol: AssetSymbol = ticker.parse()?;
        if symbol.precision() != precision {
            return Err(Error::serialization(
                "asset",
                format!("{symbol} has precision {}, wire says {precision}", symbol.precision()),
            ));
        }
        Ok(Self { units, symbol })
    }
}

impl FromStr for Asset {
    type Err = Error;

    /// Parses `"<amount> <SYMBOL>"`. Extra fractional digits round half away
    /// from zero.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(amount), Some(symbol), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::serialization("asset", format!("expected \"<amount> <SYMBOL>\", got {s:?}")));
        };
        let symbol: AssetSymbol = symbol.parse()?;
        let units = parse_decimal(amount, symbol.precision())
            .ok_or_else(|| Error::serialization("asset", format!("invalid amount {amount:?}")))?;
        Ok(Self { units, symbol })
    }
}

/// Parses a decimal string into an integer scaled by `10^precision`.
fn parse_decimal(text: &str, precision: u8) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let precision = usize::from(precision);
    let scale = 10i64.checked_pow(precision as u32)?;
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let kept = &frac[..frac.len().min(precision)];
    let mut fraction: i64 = if kept.is_empty() { 0 } else { kept.parse().ok()? };
    fraction *= 10i64.pow((precision - kept.len()) as u32);
    if frac.as_bytes().get(precision).is_some_and(|d| *d >= b'5') {
        fraction += 1;
    }

    let magnitude = whole.checked_mul(scale)?.checked_add(fraction)?;
    Some(if negative { -magnitude } else { magnitude })
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = u32::from(self.precision());
        let scale = 10u64.pow(precision);
        let magnitude = self.units.unsigned_abs();
        let sign = if self.units < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0>width$} {}",
            magnitude / scale,
            magnitude % scale,
            self.symbol,
            width = precision as usize
        )
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

/// A weighted multi-party authorization rule.
///
/// Satisfied when the summed weights of signing accounts and keys reach
/// `weight_threshold`. Entry order is preserved exactly as given: the ledger
/// expects both lists sorted, and sorting is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    /// Minimum total weight required.
    pub weight_threshold: u32,
    /// `(account name, weight)` pairs.
    pub account_auths: Vec<(String, u16)>,
    /// `(public key, weight)` pairs.
    pub key_auths: Vec<(PublicKey, u16)>,
}

impl Authority {
    /// The common case: one key that alone satisfies the threshold.
    pub fn single_key(key: PublicKey) -> Self {
        Self {
            weight_threshold: 1,
            account_auths: Vec::new(),
            key_auths: vec![(key, 1)],
        }
    }
}

// ---------------------------------------------------------------------------
// TimePointSec
// ---------------------------------------------------------------------------

/// Seconds since the Unix epoch, UTC, as a `u32`.
///
/// Text form is `YYYY-MM-DDTHH:MM:SS` with no zone suffix; it is always UTC.
/// Parsing also accepts a trailing `Z` and fractional seconds, which are
/// truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePointSec(u32);

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl TimePointSec {
    /// Wraps a raw second count.
    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Current wall-clock time, truncated to the second.
    pub fn now() -> Result<Self> {
        Self::from_datetime(Utc::now())
    }

    /// Converts a chrono timestamp. Fails outside the `u32` range.
    pub fn from_datetime(time: DateTime<Utc>) -> Result<Self> {
        u32::try_from(time.timestamp())
            .map(Self)
            .map_err(|_| Error::serialization("time_point_sec", format!("{time} outside u32 seconds")))
    }

    /// Raw second count.
    pub fn secs(self) -> u32 {
        self.0
    }

    /// Adds a duration, failing on overflow.
    pub fn checked_add(self, duration: Duration) -> Result<Self> {
        u32::try_from(duration.as_secs())
            .ok()
            .and_then(|secs| self.0.checked_add(secs))
            .map(Self)
            .ok_or_else(|| Error::serialization("time_point_sec", "expiration overflows u32 seconds"))
    }
}

impl FromStr for TimePointSec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.strip_suffix('Z').unwrap_or(s);
        let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|e| Error::serialization("time_point_sec", format!("{s:?}: {e}")))?;
        Self::from_datetime(naive.and_utc())
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(i64::from(self.0), 0) {
            Some(time) => write!(f, "{}", time.format(TIME_FORMAT)),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for TimePointSec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimePointSec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
