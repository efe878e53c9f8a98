//! Ingress coercion of JSON transaction descriptions.
//!
//! The only place untyped input becomes a [`PreparedTransaction`]. Numeric
//! fields may arrive as JSON numbers, decimal strings or `0x` hex strings;
//! every conversion is lossless or fails.

use std::str::FromStr;

use alloy::primitives::{Bytes, U256};
use serde_json::{Map, Number, Value};

use crate::blockchain::address::normalize_address;
use crate::blockchain::transaction::{PreparedTransaction, TxType};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// More digits than any U256 has; longer expansions are rejected early.
const MAX_DIGITS: usize = 80;

/// Parse JSON text and coerce it.
pub fn parse_prepared_tx(json: &str) -> BlockchainResult<PreparedTransaction> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| BlockchainError::InvalidInput(format!("malformed transaction JSON: {}", e)))?;
    coerce_prepared_tx(&value)
}

/// Turn a JSON object into a typed transaction.
pub fn coerce_prepared_tx(value: &Value) -> BlockchainResult<PreparedTransaction> {
    let obj = value.as_object().ok_or_else(|| {
        BlockchainError::InvalidInput("transaction JSON must be an object".to_string())
    })?;

    let to = match field(obj, "to") {
        Some(Value::String(s)) => normalize_address(s)?,
        Some(other) => return Err(BlockchainError::MalformedAddress(other.to_string())),
        None => return Err(missing("to")),
    };

    let data = match field(obj, "data") {
        None => Bytes::new(),
        Some(Value::String(s)) => Bytes::from_str(s.trim()).map_err(|_| {
            BlockchainError::InvalidInput(format!("data is not valid hex: '{}'", s))
        })?,
        Some(other) => {
            return Err(BlockchainError::InvalidInput(format!(
                "data must be a hex string, got {}",
                other
            )))
        }
    };

    let tx_type = match field(obj, "type") {
        None => None,
        Some(Value::String(s)) => Some(s.parse::<TxType>()?),
        Some(other) => {
            return Err(BlockchainError::InvalidInput(format!(
                "type must be a string, got {}",
                other
            )))
        }
    };

    Ok(PreparedTransaction {
        to,
        data,
        value: optional_big(obj, "value")?.unwrap_or(U256::ZERO),
        gas: optional_big(obj, "gas")?.ok_or_else(|| missing("gas"))?,
        nonce: optional_small(obj, "nonce")?.ok_or_else(|| missing("nonce"))?,
        chain_id: optional_small(obj, "chainId")?.ok_or_else(|| missing("chainId"))?,
        tx_type,
        gas_price: optional_big(obj, "gasPrice")?,
        max_fee_per_gas: optional_big(obj, "maxFeePerGas")?,
        max_priority_fee_per_gas: optional_big(obj, "maxPriorityFeePerGas")?,
    })
}

/// Coerce one value into an arbitrary-precision unsigned integer.
pub fn coerce_big(name: &str, value: &Value) -> BlockchainResult<U256> {
    match value {
        Value::String(s) => parse_big(name, s),
        Value::Number(n) => number_to_big(name, n),
        other => Err(BlockchainError::InvalidInput(format!(
            "{} must be an integer or integer string, got {}",
            name, other
        ))),
    }
}

/// Parse a decimal or `0x` hex string into an unsigned integer.
pub fn parse_big(name: &str, raw: &str) -> BlockchainResult<U256> {
    let s = raw.trim();
    let invalid = || {
        BlockchainError::InvalidInput(format!("{} is not an unsigned integer: '{}'", name, raw))
    };
    if s.is_empty() {
        return Err(invalid());
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        return U256::from_str_radix(hex, 16).map_err(|_| invalid());
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    U256::from_str_radix(s, 10).map_err(|_| invalid())
}

/// Coerce one value into a plain `u64` (nonce, chain id).
pub fn coerce_small(name: &str, value: &Value) -> BlockchainResult<u64> {
    let big = coerce_big(name, value)?;
    big.try_into()
        .map_err(|_| BlockchainError::InvalidInput(format!("{} {} does not fit in 64 bits", name, big)))
}

/// Coerce a JSON number from its literal text, never through `f64`.
///
/// `serde_json` keeps the source text (`arbitrary_precision`), so
/// `100000000000000000000` and `1e20` both come out exact. A literal with a
/// fraction or exponent counts only if its value is a whole number.
fn number_to_big(name: &str, n: &Number) -> BlockchainResult<U256> {
    let literal = n.to_string();
    if literal.starts_with('-') {
        return Err(BlockchainError::InvalidInput(format!(
            "{} must not be negative, got {}",
            name, literal
        )));
    }
    if literal.bytes().all(|b| b.is_ascii_digit()) {
        return parse_big(name, &literal);
    }
    let digits = integral_digits(&literal).ok_or_else(|| {
        BlockchainError::InvalidInput(format!(
            "{} must be a non-negative integer, got {}",
            name, literal
        ))
    })?;
    parse_big(name, &digits)
}

/// Expand `123.4e1` style literals to plain digits. `None` if the value
/// has a non-zero fractional part or does not fit in [`MAX_DIGITS`].
fn integral_digits(literal: &str) -> Option<String> {
    let (mantissa, exponent) = match literal.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&literal[..i], literal[i + 1..].parse::<i64>().ok()?),
        None => (literal, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut digits = format!("{}{}", whole, fraction);
    let point = (whole.len() as i64).saturating_add(exponent);

    if point <= 0 {
        return digits.bytes().all(|b| b == b'0').then(|| "0".to_string());
    }
    let point = usize::try_from(point).ok()?;
    if point >= digits.len() {
        if point > MAX_DIGITS {
            return None;
        }
        digits.push_str(&"0".repeat(point - digits.len()));
        return Some(digits);
    }
    let (int_part, frac_part) = digits.split_at(point);
    frac_part
        .bytes()
        .all(|b| b == b'0')
        .then(|| int_part.to_string())
}

/// A present, non-null field.
fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

fn optional_big(obj: &Map<String, Value>, name: &str) -> BlockchainResult<Option<U256>> {
    field(obj, name).map(|v| coerce_big(name, v)).transpose()
}

fn optional_small(obj: &Map<String, Value>, name: &str) -> BlockchainResult<Option<u64>> {
    field(obj, name).map(|v| coerce_small(name, v)).transpose()
}

fn missing(name: &str) -> BlockchainError {
    BlockchainError::InvalidInput(format!("missing required field '{}'", name))
}
