//! Representation of an email address

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    net::IpAddr,
    str::FromStr,
};

use email_address::EmailAddress;
use idna::domain_to_ascii;

/// Represents an email address with a local part and a domain name.
///
/// This type contains the address in canonical form (_local@domain.tld_).
///
/// # Examples
///
/// You can create an `Address` from a local part and a domain:
///
/// ```
/// use courriel::Address;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let address = Address::new("postmaster", "example.com")?;
/// assert_eq!(address.local_part(), "postmaster");
/// assert_eq!(address.domain(), "example.com");
/// # Ok(())
/// # }
/// ```
///
/// You can also create an `Address` from a string literal by parsing it:
///
/// ```
/// use courriel::Address;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let address = "postmaster@example.com".parse::<Address>()?;
/// assert_eq!(address.local_part(), "postmaster");
/// assert_eq!(address.domain(), "example.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Address {
    /// Complete address, `local@domain`
    repr: String,
    /// Index into `repr` of the `@` separating local part and domain
    at: usize,
}

impl Address {
    /// Creates a new email address from a local part and a domain,
    /// validating both.
    pub fn new<L: AsRef<str>, D: AsRef<str>>(local_part: L, domain: D) -> Result<Self, AddressError> {
        (local_part, domain).try_into()
    }

    /// Gets the local part of the `Address` (everything before the `@`).
    pub fn local_part(&self) -> &str {
        &self.repr[..self.at]
    }

    /// Gets the domain of the `Address` (everything after the `@`).
    pub fn domain(&self) -> &str {
        &self.repr[self.at + 1..]
    }

    pub(crate) fn check_local_part(local_part: &str) -> Result<(), AddressError> {
        if EmailAddress::is_valid_local_part(local_part) {
            Ok(())
        } else {
            Err(AddressError::InvalidLocalPart)
        }
    }

    pub(crate) fn check_domain(domain: &str) -> Result<(), AddressError> {
        Address::check_domain_ascii(domain).or_else(|_| {
            domain_to_ascii(domain)
                .map_err(|_| AddressError::InvalidDomain)
                .and_then(|domain| Address::check_domain_ascii(&domain))
        })
    }

    fn check_domain_ascii(domain: &str) -> Result<(), AddressError> {
        if EmailAddress::is_valid_domain(domain) {
            return Ok(());
        }

        // Address literals, `[127.0.0.1]` and friends
        let ip = domain
            .strip_prefix('[')
            .and_then(|ip| ip.strip_suffix(']'))
            .unwrap_or(domain);

        if ip.parse::<IpAddr>().is_ok() {
            return Ok(());
        }

        Err(AddressError::InvalidDomain)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.repr)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(val: &str) -> Result<Self, AddressError> {
        let at = check_address(val)?;
        Ok(Address {
            repr: val.into(),
            at,
        })
    }
}

impl<L, D> TryFrom<(L, D)> for Address
where
    L: AsRef<str>,
    D: AsRef<str>,
{
    type Error = AddressError;

    fn try_from((local_part, domain): (L, D)) -> Result<Self, Self::Error> {
        let local_part = local_part.as_ref();
        Address::check_local_part(local_part)?;

        let domain = domain.as_ref();
        Address::check_domain(domain)?;

        let repr = format!("{local_part}@{domain}");
        Ok(Address {
            repr,
            at: local_part.len(),
        })
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(repr: String) -> Result<Self, AddressError> {
        let at = check_address(&repr)?;
        Ok(Address { repr, at })
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.repr
    }
}

fn check_address(val: &str) -> Result<usize, AddressError> {
    let mut parts = val.rsplitn(2, '@');
    let domain = parts.next().ok_or(AddressError::MissingParts)?;
    let local_part = parts.next().ok_or(AddressError::MissingParts)?;

    Address::check_local_part(local_part)?;
    Address::check_domain(domain)?;
    Ok(local_part.len())
}

/// Errors in email address parsing
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum AddressError {
    /// Missing domain or local part
    MissingParts,
    /// Invalid local part
    InvalidLocalPart,
    /// Invalid domain
    InvalidDomain,
    /// Invalid input found
    InvalidInput,
}

impl Error for AddressError {}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AddressError::MissingParts => f.write_str("missing domain or local part"),
            AddressError::InvalidLocalPart => f.write_str("invalid local part"),
            AddressError::InvalidDomain => f.write_str("invalid domain"),
            AddressError::InvalidInput => f.write_str("invalid input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_address() {
        let addr = Address::from_str("someone@example.com").unwrap();
        let addr2 = Address::new("someone", "example.com").unwrap();
        assert_eq!(addr, addr2);
        assert_eq!(addr.local_part(), "someone");
        assert_eq!(addr.domain(), "example.com");
        assert_eq!(addr.to_string(), "someone@example.com");
    }

    #[test]
    fn address_with_dots() {
        let addr = Address::from_str("a.b@c.org").unwrap();
        assert_eq!(addr.local_part(), "a.b");
        assert_eq!(addr.domain(), "c.org");
    }

    #[test]
    fn ascii_address_ipv4() {
        let addr = Address::from_str("someone@[127.0.0.1]").unwrap();
        assert_eq!(addr.domain(), "[127.0.0.1]");
    }

    #[test]
    fn missing_at_is_rejected() {
        assert_eq!(
            Address::from_str("someoneexample.com"),
            Err(AddressError::MissingParts)
        );
    }

    #[test]
    fn empty_local_part_is_rejected() {
        assert!(Address::from_str("@example.com").is_err());
    }

    #[test]
    fn empty_domain_is_rejected() {
        assert!(Address::from_str("someone@").is_err());
    }

    #[test]
    fn overlong_parts_are_rejected() {
        let local = "a".repeat(100);
        assert!(Address::check_local_part(&local).is_err());
        let domain = format!("{}.com", "a".repeat(100));
        assert!(Address::check_domain(&domain).is_err());
    }
}
