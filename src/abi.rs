//! Contract ABI loading, call encoding and result decoding.
//!
//! Used by the caller to build `data` for contract writes and to decode
//! read-only call results. Arguments arrive as a JSON array and are coerced
//! per parameter type; results leave as JSON with integers as decimal strings.

use std::path::{Path, PathBuf};

use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{hex, Bytes};
use serde_json::Value;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Where the function definition comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
    /// Path to a pure JSON ABI file.
    File(PathBuf),
    /// Inline JSON ABI array.
    Json(String),
    /// Human-readable signature, e.g. `function balanceOf(address) view returns (uint256)`.
    Signature(String),
}

/// Read a JSON ABI file.
///
/// Files containing TypeScript/JavaScript `export` syntax are rejected with a
/// hint instead of a JSON parse error.
pub fn load_abi_file(path: &Path) -> BlockchainResult<JsonAbi> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        BlockchainError::InvalidInput(format!("cannot read ABI file {}: {}", path.display(), e))
    })?;
    if raw.trim_start().starts_with("export ") {
        return Err(BlockchainError::InvalidInput(format!(
            "ABI file at {} looks like TypeScript/JavaScript export syntax. \
             Use a pure JSON ABI file (array), or pass --signature / --abi-json.",
            path.display()
        )));
    }
    parse_abi_json(&raw)
}

/// Parse an inline JSON ABI; it must be an array.
pub fn parse_abi_json(raw: &str) -> BlockchainResult<JsonAbi> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| BlockchainError::InvalidInput(format!("ABI is not valid JSON: {}", e)))?;
    if !value.is_array() {
        return Err(BlockchainError::InvalidInput(
            "ABI JSON must be an array".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| BlockchainError::InvalidInput(format!("invalid ABI: {}", e)))
}

/// Parse `--args-json`; absent means no arguments.
pub fn parse_args_json(raw: Option<&str>) -> BlockchainResult<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(raw) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(BlockchainError::InvalidInput(
            "--args-json must be a JSON array".to_string(),
        )),
        Err(e) => Err(BlockchainError::InvalidInput(format!(
            "--args-json is not valid JSON: {}",
            e
        ))),
    }
}

/// Find `name` in the ABI, choosing the overload whose arity matches `arg_count`.
pub fn resolve_function(
    source: &AbiSource,
    name: &str,
    arg_count: usize,
) -> BlockchainResult<Function> {
    let abi = match source {
        AbiSource::File(path) => load_abi_file(path)?,
        AbiSource::Json(raw) => parse_abi_json(raw)?,
        AbiSource::Signature(sig) => {
            let func = Function::parse(sig.trim()).map_err(|e| {
                BlockchainError::InvalidInput(format!("invalid signature '{}': {}", sig, e))
            })?;
            if func.name != name {
                return Err(BlockchainError::InvalidInput(format!(
                    "signature declares '{}' but --function is '{}'",
                    func.name, name
                )));
            }
            return Ok(func);
        }
    };

    let overloads = abi.function(name).ok_or_else(|| {
        BlockchainError::InvalidInput(format!("function '{}' not found in ABI", name))
    })?;
    overloads
        .iter()
        .find(|f| f.inputs.len() == arg_count)
        .cloned()
        .ok_or_else(|| {
            BlockchainError::InvalidInput(format!(
                "no overload of '{}' takes {} argument(s)",
                name, arg_count
            ))
        })
}

/// ABI-encode a call: 4-byte selector followed by the encoded arguments.
pub fn encode_call(func: &Function, args: &[Value]) -> BlockchainResult<Bytes> {
    if func.inputs.len() != args.len() {
        return Err(BlockchainError::InvalidInput(format!(
            "{} expects {} argument(s), got {}",
            func.signature(),
            func.inputs.len(),
            args.len()
        )));
    }

    let values = func
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param.resolve().map_err(|e| {
                BlockchainError::InvalidInput(format!("unsupported parameter type {}: {}", param.ty, e))
            })?;
            json_to_sol(&ty, arg)
        })
        .collect::<BlockchainResult<Vec<_>>>()?;

    func.abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|e| BlockchainError::InvalidInput(format!("cannot encode call: {}", e)))
}

/// Decode return data. A single output is returned bare, several as an array.
pub fn decode_output(func: &Function, data: &[u8]) -> BlockchainResult<Value> {
    let mut values = func
        .abi_decode_output(data)
        .map_err(|e| BlockchainError::InvalidInput(format!("cannot decode result: {}", e)))?;
    if values.len() == 1 {
        return Ok(sol_to_json(&values.remove(0)));
    }
    Ok(Value::Array(values.iter().map(sol_to_json).collect()))
}

fn json_to_sol(ty: &DynSolType, value: &Value) -> BlockchainResult<DynSolValue> {
    let mismatch = || {
        BlockchainError::InvalidInput(format!("argument {} does not match type {}", value, ty))
    };

    match (ty, value) {
        (DynSolType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| json_to_sol(inner, item))
            .collect::<BlockchainResult<Vec<_>>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(mismatch());
            }
            items
                .iter()
                .map(|item| json_to_sol(inner, item))
                .collect::<BlockchainResult<Vec<_>>>()
                .map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                return Err(mismatch());
            }
            types
                .iter()
                .zip(items)
                .map(|(t, item)| json_to_sol(t, item))
                .collect::<BlockchainResult<Vec<_>>>()
                .map(DynSolValue::Tuple)
        }
        (_, Value::String(s)) => coerce_scalar(ty, s),
        (_, Value::Number(n)) => coerce_scalar(ty, &n.to_string()),
        (_, Value::Bool(b)) => coerce_scalar(ty, if *b { "true" } else { "false" }),
        _ => Err(mismatch()),
    }
}

fn coerce_scalar(ty: &DynSolType, raw: &str) -> BlockchainResult<DynSolValue> {
    ty.coerce_str(raw).map_err(|e| {
        BlockchainError::InvalidInput(format!("cannot use '{}' as {}: {}", raw, ty, e))
    })
}

fn sol_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::Function(f) => Value::String(f.to_string()),
        DynSolValue::Bytes(b) => Value::String(hex::encode_prefixed(b)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(sol_to_json).collect())
        }
        #[allow(unreachable_patterns)]
        other => Value::String(format!("{:?}", other)),
    }
}
