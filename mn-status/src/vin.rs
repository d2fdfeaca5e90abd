//! Collateral outpoint ("vin") identifiers.
//!
//! A masternode is identified by the transaction output bonding its
//! collateral, written `<txid>-<index>`. Legacy daemons only expose it inside
//! the text of a `CTxIn`, e.g.
//! `CTxIn(COutPoint(<txid>, <index>), scriptSig=)`; newer ones report the
//! `<txid>-<index>` form directly. Both parsers map the null outpoint (all
//! zero txid) to `None`: that is how dashd says "not a masternode".

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Hex txid of the null outpoint.
pub const NULL_TXID: &str = "0000000000000000000000000000000000000000000000000000000000000000";

const CTXIN_PREFIX: &str = "CTxIn(COutPoint(";

/// A collateral outpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vin {
    txid: String,
    index: u32,
}

impl Vin {
    /// Build a vin, validating the txid. The null txid is rejected; use the
    /// parsers when the sentinel is an acceptable input.
    pub fn new(txid: &str, index: u32) -> Result<Vin, VinParseError> {
        check_txid(txid)?;
        if txid == NULL_TXID {
            return Err(VinParseError::NullOutPoint);
        }
        Ok(Vin {
            txid: txid.to_string(),
            index,
        })
    }

    pub fn txid(&self) -> &str {
        &self.txid
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.txid, self.index)
    }
}

impl FromStr for Vin {
    type Err = VinParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_outpoint(s)?.ok_or(VinParseError::NullOutPoint)
    }
}

/// Errors from parsing a vin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VinParseError {
    #[error("no `CTxIn(COutPoint(` in {0:?}")]
    MissingOutPoint(String),

    #[error("malformed outpoint in {0:?}")]
    Malformed(String),

    #[error("txid is not 64 hex characters: {0:?}")]
    InvalidTxid(String),

    #[error("invalid output index: {0:?}")]
    InvalidIndex(String),

    #[error("null outpoint")]
    NullOutPoint,
}

/// Parse the `vin` text of a legacy `masternode status` reply.
///
/// The text must start with `CTxIn(COutPoint(`, and the closing parenthesis
/// of the outpoint must be followed by a comma. Whitespace after the comma
/// separating txid and index is ignored.
pub fn parse_status_vin(text: &str) -> Result<Option<Vin>, VinParseError> {
    let rest = text
        .strip_prefix(CTXIN_PREFIX)
        .ok_or_else(|| VinParseError::MissingOutPoint(text.to_string()))?;
    let (txid, rest) =
        rest.split_once(',').ok_or_else(|| VinParseError::Malformed(text.to_string()))?;
    let (index, rest) = rest
        .trim_start()
        .split_once(')')
        .ok_or_else(|| VinParseError::Malformed(text.to_string()))?;
    if !rest.starts_with(',') {
        return Err(VinParseError::Malformed(text.to_string()));
    }

    from_parts(txid, index)
}

/// Parse a `<txid>-<index>` outpoint.
pub fn parse_outpoint(text: &str) -> Result<Option<Vin>, VinParseError> {
    let (txid, index) =
        text.rsplit_once('-').ok_or_else(|| VinParseError::Malformed(text.to_string()))?;
    from_parts(txid, index)
}

fn from_parts(txid: &str, index: &str) -> Result<Option<Vin>, VinParseError> {
    check_txid(txid)?;
    let index = parse_index(index)?;
    if txid == NULL_TXID {
        return Ok(None);
    }
    Ok(Some(Vin {
        txid: txid.to_string(),
        index,
    }))
}

fn check_txid(txid: &str) -> Result<(), VinParseError> {
    if txid.len() != 64 || hex::decode(txid).is_err() {
        return Err(VinParseError::InvalidTxid(txid.to_string()));
    }
    Ok(())
}

fn parse_index(index: &str) -> Result<u32, VinParseError> {
    // u32::from_str accepts a leading '+'
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VinParseError::InvalidIndex(index.to_string()));
    }
    index.parse().map_err(|_| VinParseError::InvalidIndex(index.to_string()))
}
