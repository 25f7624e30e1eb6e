use super::{Header, HeaderName};
use crate::error::BoxError;

macro_rules! text_header {
    ($(#[$attr:meta])* Header($type: ident, $name: expr )) => {
        #[derive(Debug, Clone, PartialEq)]
        $(#[$attr])*
        pub struct $type(String);

        impl Header for $type {
            fn name() -> HeaderName {
                HeaderName::new_static($name)
            }

            fn parse_value(s: &str) -> Result<Self, BoxError> {
                Ok(Self(String::from(s)))
            }

            fn display(&self) -> String {
                self.0.clone()
            }
        }

        impl From<String> for $type {
            #[inline]
            fn from(text: String) -> Self {
                Self(text)
            }
        }

        impl AsRef<str> for $type {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

text_header!(
    /// `Subject` of the message, defined in
    /// [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.5)
    Header(Subject, "Subject")
);
text_header!(
    /// `Comments` of the message, defined in
    /// [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.5)
    Header(Comments, "Comments")
);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Subject;
    use crate::message::header::Headers;

    #[test]
    fn format_ascii() {
        let mut headers = Headers::new();
        headers.set(Subject::from(String::from("Sample subject")));

        assert_eq!(headers.to_string(), "Subject: Sample subject\r\n");
    }

    #[test]
    fn format_utf8() {
        let mut headers = Headers::new();
        headers.set(Subject::from(String::from("Тема сообщения")));

        assert_eq!(
            headers.to_string(),
            "Subject: =?utf-8?b?0KLQtdC80LAg0YHQvtC+0LHRidC10L3QuNGP?=\r\n"
        );
    }
}
