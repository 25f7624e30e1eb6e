use std::time::SystemTime;

use httpdate::HttpDate;

use super::{Header, HeaderName};
use crate::error::BoxError;

/// Message `Date` header
///
/// Defined in [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Date(HttpDate);

impl Date {
    /// Builds a `Date` from [`SystemTime`]
    pub fn new(st: SystemTime) -> Self {
        Self(st.into())
    }

    /// Gets the current date
    ///
    /// Shortcut for `Date::new(SystemTime::now())`
    pub fn now() -> Self {
        Self::new(SystemTime::now())
    }
}

impl Header for Date {
    fn name() -> HeaderName {
        HeaderName::new_static("Date")
    }

    fn parse_value(s: &str) -> Result<Self, BoxError> {
        let mut s = String::from(s);
        if s.ends_with("-0000") {
            // The httpdate crate expects the date to end in ` GMT`, but
            // email uses `-0000` for an unknown-offset UTC date
            s.truncate(s.len() - "-0000".len());
            s.push_str("GMT");
        }

        Ok(Self(s.parse::<HttpDate>()?))
    }

    fn display(&self) -> String {
        let mut s = self.0.to_string();
        if s.ends_with(" GMT") {
            // `GMT` is an obsolete date format for email
            // (https://tools.ietf.org/html/rfc5322#appendix-A.6.2)
            s.truncate(s.len() - "GMT".len());
            s.push_str("-0000");
        }

        s
    }
}

impl From<SystemTime> for Date {
    fn from(st: SystemTime) -> Self {
        Self::new(st)
    }
}

impl From<Date> for SystemTime {
    fn from(this: Date) -> SystemTime {
        this.0.into()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use pretty_assertions::assert_eq;

    use super::Date;
    use crate::message::header::Headers;

    #[test]
    fn format_date() {
        let mut headers = Headers::new();

        // Tue, 15 Nov 1994 08:12:31 GMT
        headers.set(Date::from(
            SystemTime::UNIX_EPOCH + Duration::from_secs(784887151),
        ));

        assert_eq!(
            headers.to_string(),
            "Date: Tue, 15 Nov 1994 08:12:31 -0000\r\n"
        );
    }

    #[test]
    fn parse_date() {
        let mut headers = Headers::new();
        headers.set_raw(
            crate::message::header::HeaderName::new_static("Date"),
            "Tue, 15 Nov 1994 08:12:31 -0000".into(),
        );

        assert_eq!(
            headers.get::<Date>(),
            Some(Date::from(
                SystemTime::UNIX_EPOCH + Duration::from_secs(784887151),
            ))
        );
    }
}
