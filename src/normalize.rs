//! Input normalisation helpers for host names and MAC addresses.
//!
//! Every user-supplied string passes through one of these functions before
//! reaching the profile store, so lookups and wake packets always see a
//! single canonical representation.

/// Normalise a host string: trim surrounding whitespace.
///
/// The host is both the SSH address and the profile key, so its case and
/// domain suffix are preserved. Returns an error if the result is empty.
pub fn normalize_host(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Host name cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Parse a MAC address into its six bytes.
///
/// Accepts `AA:BB:CC:DD:EE:FF`, `aa-bb-cc-dd-ee-ff`, Cisco-style
/// `aabb.ccdd.eeff`, and 12 bare hex digits.
pub fn parse_mac(input: &str) -> Result<[u8; 6], String> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();

    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!(
            "'{}' is not a MAC address (expected 12 hex digits)",
            input.trim()
        ));
    }

    let mut bytes = [0u8; 6];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|e| format!("'{}' is not a MAC address: {}", input.trim(), e))?;
    }
    Ok(bytes)
}

/// Normalise a MAC address to uppercase colon-separated form.
pub fn normalize_mac(input: &str) -> Result<String, String> {
    let bytes = parse_mac(input)?;
    Ok(format_mac(&bytes))
}

/// Render six bytes as `AA:BB:CC:DD:EE:FF`.
pub fn format_mac(bytes: &[u8; 6]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
