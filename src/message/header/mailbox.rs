use super::{Header, HeaderName};
use crate::{
    error::BoxError,
    message::mailbox::{Mailbox, Mailboxes},
};

/// A header which can contain multiple mailboxes
pub trait MailboxesHeader {
    /// Appends the mailboxes of `other` to this header
    fn join_mailboxes(&mut self, other: Self);
}

macro_rules! mailbox_header {
    ($(#[$doc:meta])*($type_name: ident, $header_name: expr)) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $type_name(pub(crate) Mailbox);

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_static($header_name)
            }

            fn parse_value(s: &str) -> Result<Self, BoxError> {
                Ok(Self(s.parse()?))
            }

            fn display(&self) -> String {
                self.0.to_string()
            }
        }

        impl std::convert::From<Mailbox> for $type_name {
            #[inline]
            fn from(mailbox: Mailbox) -> Self {
                Self(mailbox)
            }
        }

        impl std::convert::From<$type_name> for Mailbox {
            #[inline]
            fn from(this: $type_name) -> Mailbox {
                this.0
            }
        }
    };
}

macro_rules! mailboxes_header {
    ($(#[$doc:meta])*($type_name: ident, $header_name: expr)) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $type_name(pub(crate) Mailboxes);

        impl MailboxesHeader for $type_name {
            fn join_mailboxes(&mut self, other: Self) {
                self.0.extend(other.0);
            }
        }

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_static($header_name)
            }

            fn parse_value(s: &str) -> Result<Self, BoxError> {
                Ok(Self(s.parse()?))
            }

            fn display(&self) -> String {
                self.0.to_string()
            }
        }

        impl std::convert::From<Mailboxes> for $type_name {
            #[inline]
            fn from(mailboxes: Mailboxes) -> Self {
                Self(mailboxes)
            }
        }

        impl std::convert::From<$type_name> for Mailboxes {
            #[inline]
            fn from(this: $type_name) -> Mailboxes {
                this.0
            }
        }

        impl IntoIterator for $type_name {
            type Item = Mailbox;
            type IntoIter = <Mailboxes as IntoIterator>::IntoIter;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

mailbox_header! {
    /// `Sender` header, defined in
    /// [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.2).
    ///
    /// Required when several `From` mailboxes are present.
    (Sender, "Sender")
}

mailboxes_header! {
    /// `From` header, defined in
    /// [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.2)
    (From, "From")
}

mailboxes_header! {
    /// `Reply-To` header, defined in
    /// [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.2)
    (ReplyTo, "Reply-To")
}

mailboxes_header! {
    /// `To` header
    (To, "To")
}

mailboxes_header! {
    /// `Cc` header
    (Cc, "Cc")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{From, Header, Mailboxes};
    use crate::message::header::Headers;

    #[test]
    fn format_single_without_name() {
        let from = Mailboxes::new().with("kayo@example.com".parse().unwrap());

        let mut headers = Headers::new();
        headers.set(From(from));

        assert_eq!(headers.to_string(), "From: kayo@example.com\r\n");
    }

    #[test]
    fn format_single_with_name() {
        let from = Mailboxes::new().with("K. <kayo@example.com>".parse().unwrap());

        let mut headers = Headers::new();
        headers.set(From(from));

        assert_eq!(headers.to_string(), "From: \"K.\" <kayo@example.com>\r\n");
    }

    #[test]
    fn format_multi_without_name() {
        let from = Mailboxes::new()
            .with("kayo@example.com".parse().unwrap())
            .with("pony@domain.tld".parse().unwrap());

        let mut headers = Headers::new();
        headers.set(From(from));

        assert_eq!(
            headers.to_string(),
            "From: kayo@example.com, pony@domain.tld\r\n"
        );
    }

    #[test]
    fn parse_single_without_name() {
        let from = Mailboxes::new().with("kayo@example.com".parse().unwrap());

        let mut headers = Headers::new();
        headers.set_raw(super::From::name(), "kayo@example.com".into());

        assert_eq!(headers.get::<From>(), Some(From(from)));
    }

    #[test]
    fn parse_multi_without_name() {
        let from = Mailboxes::new()
            .with("kayo@example.com".parse().unwrap())
            .with("pony@domain.tld".parse().unwrap());

        let mut headers = Headers::new();
        headers.set_raw(
            super::From::name(),
            "kayo@example.com, pony@domain.tld".into(),
        );

        assert_eq!(headers.get::<From>(), Some(From(from)));
    }
}
