//! Validation of user-supplied PC settings
//!
//! Runs before a profile reaches the store so that wake and connect never
//! see a malformed MAC or an empty host.

use crate::models::{HostProfile, SecureString};
use crate::normalize::{normalize_host, normalize_mac};
use crate::utils::ValidationError;

/// Build a profile from raw form input, normalising host and MAC.
///
/// `port` is taken as `u32` so out-of-range user input is reported instead
/// of silently truncated.
pub fn validate_profile(
    host: &str,
    mac: &str,
    user: &str,
    password: &str,
    port: u32,
) -> Result<HostProfile, ValidationError> {
    let host = normalize_host(host).map_err(|_| ValidationError::EmptyHost)?;
    let mac = normalize_mac(mac).map_err(|_| ValidationError::InvalidMac(mac.trim().to_string()))?;

    let user = user.trim();
    if user.is_empty() {
        return Err(ValidationError::EmptyUser);
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }

    let port = u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or(ValidationError::InvalidPort(port))?;

    Ok(HostProfile::new(host, mac, user, SecureString::new(password)).with_port(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profile_is_normalised() {
        let profile = validate_profile(" 10.0.0.5 ", "aa-bb-cc-dd-ee-ff", "DESK\\u", "p", 22).unwrap();
        assert_eq!(profile.host, "10.0.0.5");
        assert_eq!(profile.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(profile.user, "DESK\\u");
        assert_eq!(profile.password.as_str(), "p");
        assert_eq!(profile.port, 22);
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        assert_eq!(
            validate_profile("", "aa:bb:cc:dd:ee:ff", "u", "p", 22).unwrap_err(),
            ValidationError::EmptyHost
        );
        assert_eq!(
            validate_profile("pc", "aa:bb", "u", "p", 22).unwrap_err(),
            ValidationError::InvalidMac("aa:bb".to_string())
        );
        assert_eq!(
            validate_profile("pc", "aa:bb:cc:dd:ee:ff", " ", "p", 22).unwrap_err(),
            ValidationError::EmptyUser
        );
        assert_eq!(
            validate_profile("pc", "aa:bb:cc:dd:ee:ff", "u", "", 22).unwrap_err(),
            ValidationError::EmptyPassword
        );
    }

    #[test]
    fn test_port_must_fit_tcp_range() {
        assert_eq!(
            validate_profile("pc", "aa:bb:cc:dd:ee:ff", "u", "p", 0).unwrap_err(),
            ValidationError::InvalidPort(0)
        );
        assert_eq!(
            validate_profile("pc", "aa:bb:cc:dd:ee:ff", "u", "p", 70000).unwrap_err(),
            ValidationError::InvalidPort(70000)
        );
        assert_eq!(
            validate_profile("pc", "aa:bb:cc:dd:ee:ff", "u", "p", 2222).unwrap().port,
            2222
        );
    }
}
