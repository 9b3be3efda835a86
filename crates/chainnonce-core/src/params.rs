//! Query parameters for a single nonce lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Block reference accepted by `eth_getTransactionCount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockRef {
    /// Explicit block height, sent as a hex quantity.
    Number(u64),
    #[default]
    Latest,
    Earliest,
    Pending,
    Safe,
    Finalized,
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", encode_quantity(*n)),
            Self::Latest => write!(f, "latest"),
            Self::Earliest => write!(f, "earliest"),
            Self::Pending => write!(f, "pending"),
            Self::Safe => write!(f, "safe"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

impl FromStr for BlockRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Self::Latest),
            "earliest" => Ok(Self::Earliest),
            "pending" => Ok(Self::Pending),
            "safe" => Ok(Self::Safe),
            "finalized" => Ok(Self::Finalized),
            other if other.starts_with("0x") || other.starts_with("0X") => {
                parse_quantity(other).map(Self::Number)
            }
            other => other
                .parse::<u64>()
                .map(Self::Number)
                .map_err(|_| format!("unrecognised block reference '{other}'")),
        }
    }
}

impl Serialize for BlockRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parameters of one `eth_getTransactionCount` query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonceParams {
    /// Account address, passed through to the node as given.
    pub address: String,
    /// Block at which the nonce is read.
    pub block: BlockRef,
}

impl NonceParams {
    pub fn new(address: impl Into<String>, block: BlockRef) -> Self {
        Self {
            address: address.into(),
            block,
        }
    }
}

/// Encode a `u64` as a JSON-RPC quantity (`0x`-prefixed, no leading zeros).
pub fn encode_quantity(n: u64) -> String {
    format!("0x{n:x}")
}

/// Parse a JSON-RPC quantity string into a `u64`.
///
/// Requires the `0x` prefix and between 1 and 16 hex digits.
pub fn parse_quantity(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| "missing 0x prefix".to_string())?;
    if digits.is_empty() {
        return Err("empty quantity".into());
    }
    if digits.len() > 16 {
        return Err("quantity overflows u64".into());
    }
    u64::from_str_radix(digits, 16).map_err(|e| e.to_string())
}
