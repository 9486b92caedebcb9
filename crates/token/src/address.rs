//! Strict address parsing for caller-supplied strings.

use crate::TokenError;
use alloy_primitives::Address;

const ADDRESS_HEX_LEN: usize = 40;

/// Parse a 20-byte address from 40 hex characters, `0x` prefix optional.
///
/// Case is not checked against the EIP-55 checksum: all-lowercase, all-uppercase
/// and mixed-case inputs are accepted alike.
pub fn parse_address(input: &str) -> Result<Address, TokenError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let invalid = |reason: String| TokenError::Parse {
        input: input.to_string(),
        reason,
    };

    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(invalid(format!("invalid hex character {c:?}")));
    }

    if hex.len() != ADDRESS_HEX_LEN {
        return Err(invalid(format!(
            "expected {ADDRESS_HEX_LEN} hex characters, got {}",
            hex.len()
        )));
    }

    hex.parse().map_err(|e| invalid(format!("{e}")))
}

/// Canonical EIP-55 rendering of an address.
pub fn to_checksum(address: &Address) -> String {
    address.to_checksum(None)
}
