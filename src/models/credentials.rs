//! Host profile and credential types
//!
//! SECURITY: Credential types implement Drop to clear sensitive data.

use crate::constants::DEFAULT_SSH_PORT;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Password that zeros memory on drop
///
/// SECURITY: This type never implements Display or Debug in a way that reveals the password.
pub struct SecureString(String);

impl Clone for SecureString {
    fn clone(&self) -> Self {
        SecureString(self.0.clone())
    }
}

impl SecureString {
    /// Create a new secure string
    pub fn new(password: impl Into<String>) -> Self {
        SecureString(password.into())
    }

    /// Get the password as a string slice
    ///
    /// Use this sparingly and only when necessary for API calls.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        // SAFETY: We own this String and are zeroing it before drop
        unsafe {
            let bytes = self.0.as_bytes_mut();
            for byte in bytes {
                std::ptr::write_volatile(byte, 0);
            }
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SECURITY: Never reveal the password content
        write!(f, "SecureString(*** {} bytes ***)", self.0.len())
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecureString {}

// The profile cache stores the password as a plain JSON string, the same
// layout the front-end has always written.
impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecureString)
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// Identity and credentials for one controllable PC
///
/// The host string doubles as the profile's unique name: it is both the
/// store key and the address the SSH channel connects to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    pub host: String,
    /// Hardware address targeted by Wake-on-LAN
    pub mac: String,
    pub user: String,
    pub password: SecureString,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl HostProfile {
    /// Create a profile on the default SSH port
    pub fn new(
        host: impl Into<String>,
        mac: impl Into<String>,
        user: impl Into<String>,
        password: SecureString,
    ) -> Self {
        Self {
            host: host.into(),
            mac: mac.into(),
            user: user.into(),
            password,
            port: DEFAULT_SSH_PORT,
        }
    }

    /// Override the SSH port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Profile name, identical to the connection host string
    pub fn name(&self) -> &str {
        &self.host
    }

    /// Whether this profile can be persisted and looked up
    pub fn is_addressable(&self) -> bool {
        !self.host.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HostProfile {
        HostProfile::new(
            "10.0.0.5",
            "AA:BB:CC:DD:EE:FF",
            "u",
            SecureString::new("p"),
        )
    }

    #[test]
    fn test_secure_string_debug_no_leak() {
        let password = SecureString::new("secret123");
        let debug_output = format!("{:?}", password);
        assert!(!debug_output.contains("secret"));
        assert!(debug_output.contains("9 bytes"));
    }

    #[test]
    fn test_profile_debug_hides_password() {
        let profile = HostProfile::new("pc", "aa:bb:cc:dd:ee:ff", "u", SecureString::new("hunter2"));
        assert!(!format!("{:?}", profile).contains("hunter2"));
    }

    #[test]
    fn test_profile_name_is_host() {
        let profile = sample();
        assert_eq!(profile.name(), "10.0.0.5");
        assert_eq!(profile.port, 22);
        assert!(profile.is_addressable());
    }

    #[test]
    fn test_blank_host_is_not_addressable() {
        let profile = HostProfile::new("  ", "", "", SecureString::new(""));
        assert!(!profile.is_addressable());
    }

    #[test]
    fn test_stored_profile_without_port_defaults_to_22() {
        let json = r#"{"host":"pc","mac":"aa:bb:cc:dd:ee:ff","user":"u","password":"p"}"#;
        let profile: HostProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.port, 22);
        assert_eq!(profile.password.as_str(), "p");
    }

    #[test]
    fn test_profile_serializes_password_as_plain_string() {
        let value = serde_json::to_value(sample().with_port(2222)).unwrap();
        assert_eq!(value["password"], "p");
        assert_eq!(value["port"], 2222);
        assert_eq!(value["mac"], "AA:BB:CC:DD:EE:FF");
    }
}
