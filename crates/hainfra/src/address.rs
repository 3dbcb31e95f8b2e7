//! IP literal validation

use std::fmt;
use std::net::IpAddr;

/// Result of checking an address string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressValidity {
    Valid,
    Invalid,
}

impl fmt::Display for AddressValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressValidity::Valid => write!(f, "valid"),
            AddressValidity::Invalid => write!(f, "invalid"),
        }
    }
}

/// Check that `address` is a dotted-decimal IPv4 or colon-hex IPv6 literal.
///
/// Purely syntactic: no DNS lookup, no trimming, host names are invalid.
pub fn validate(address: &str) -> AddressValidity {
    match address.parse::<IpAddr>() {
        Ok(_) => AddressValidity::Valid,
        Err(_) => AddressValidity::Invalid,
    }
}

pub fn is_valid_ip(address: &str) -> bool {
    validate(address) == AddressValidity::Valid
}
