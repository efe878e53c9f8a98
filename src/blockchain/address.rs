//! EIP-55 address normalization.

use alloy::primitives::Address;
use serde::Serializer;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Parse an address and validate its checksum.
///
/// Single-case input (all lowercase or all uppercase hex) carries no checksum
/// and is accepted as-is. Mixed-case input must match its EIP-55 checksum.
pub fn normalize_address(raw: &str) -> BlockchainResult<Address> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BlockchainError::MalformedAddress(raw.to_string()));
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{}", hex), None)
            .map_err(|_| BlockchainError::MalformedAddress(raw.to_string()))
    } else {
        hex.parse::<Address>()
            .map_err(|_| BlockchainError::MalformedAddress(raw.to_string()))
    }
}

/// `serialize_with` helper writing the EIP-55 form; alloy's own impl is lowercase.
pub fn serialize_checksummed<S: Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&address.to_checksum(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_checksummed_roundtrip() {
        let address = normalize_address(CHECKSUMMED).unwrap();
        assert_eq!(address.to_checksum(None), CHECKSUMMED);
    }

    #[test]
    fn test_lowercase_is_checksummed() {
        let address = normalize_address(&CHECKSUMMED.to_lowercase()).unwrap();
        assert_eq!(address.to_string(), CHECKSUMMED);
    }

    #[test]
    fn test_uppercase_without_prefix() {
        let upper = CHECKSUMMED[2..].to_uppercase();
        assert_eq!(normalize_address(&upper).unwrap().to_string(), CHECKSUMMED);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // Flip the case of one letter.
        let broken = "0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let err = normalize_address(broken).unwrap_err();
        assert!(matches!(err, BlockchainError::MalformedAddress(_)));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(normalize_address("0x1234").is_err());
        assert!(normalize_address("").is_err());
        assert!(normalize_address("0xzz0000000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_serialized_form_is_checksummed() {
        #[derive(serde::Serialize)]
        struct Out {
            #[serde(serialize_with = "serialize_checksummed")]
            to: Address,
        }
        let to = normalize_address(&CHECKSUMMED.to_lowercase()).unwrap();
        let json = serde_json::to_value(Out { to }).unwrap();
        assert_eq!(json["to"], CHECKSUMMED);
    }
}
