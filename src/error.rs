//! Error type for email composition

use std::{error::Error as StdError, fmt};

use crate::address::AddressError;

/// Boxed error source kept inside [`Error`].
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The errors that may occur while composing an email.
///
/// Two kinds exist: *invalid argument* errors are raised synchronously by
/// mutators when an input violates a structural rule (empty header name,
/// malformed address, port zero), and *configuration* errors are raised
/// when finalization or session materialization finds required state
/// missing (no host name, no sender, no recipients).
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    /// An input violated a structural rule and was rejected
    InvalidArgument,
    /// Required state was missing at session materialization or build time
    Configuration,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the error comes from a rejected mutator argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidArgument)
    }

    /// Returns true if the error comes from missing or inconsistent
    /// configuration discovered at build or session-materialization time
    pub fn is_configuration(&self) -> bool {
        matches!(self.inner.kind, Kind::Configuration)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("courriel::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::InvalidArgument => f.write_str("invalid argument")?,
            Kind::Configuration => f.write_str("email configuration error")?,
        }

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn StdError + 'static) = &**e;
            r
        })
    }
}

impl From<AddressError> for Error {
    fn from(err: AddressError) -> Error {
        invalid_argument(err)
    }
}

pub(crate) fn invalid_argument<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidArgument, Some(e))
}

pub(crate) fn configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Configuration, Some(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        assert!(invalid_argument("empty header name").is_invalid_argument());
        assert!(!invalid_argument("empty header name").is_configuration());
        assert!(configuration("mail host not configured").is_configuration());
    }

    #[test]
    fn display_includes_source() {
        let err = configuration("from address required");
        assert_eq!(
            err.to_string(),
            "email configuration error: from address required"
        );
    }
}
