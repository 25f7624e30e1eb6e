//! Mailbox grammar, a pragmatic subset of
//! [RFC2822 §3.4](https://datatracker.ietf.org/doc/html/rfc2822#section-3.4)
//!
//! The parsers split the input into display name, local part and domain;
//! validation of the parts happens afterwards in [`crate::Address`].

use chumsky::prelude::*;

// *WSP, freely allowed around tokens
fn fill() -> impl Parser<char, (), Error = Simple<char>> {
    one_of([' ', '\t']).repeated().ignored()
}

// addr-spec = local-part "@" domain
//
// Both sides are taken permissively; `Address::new` applies the real
// local-part and domain rules.
fn addr_spec() -> impl Parser<char, (String, String), Error = Simple<char>> {
    let local_part = filter(|c: &char| !matches!(c, '@' | '<' | '>' | '"' | ',' | ' ' | '\t'))
        .repeated()
        .at_least(1)
        .collect::<String>();
    let domain = filter(|c: &char| !matches!(c, '@' | '<' | '>' | '"' | ',' | ' ' | '\t'))
        .repeated()
        .at_least(1)
        .collect::<String>();

    local_part.then_ignore(just('@')).then(domain)
}

// angle-addr = [fill] "<" addr-spec ">" [fill]
fn angle_addr() -> impl Parser<char, (String, String), Error = Simple<char>> {
    fill()
        .ignore_then(addr_spec().delimited_by(just('<').ignored(), just('>').ignored()))
        .then_ignore(fill())
}

// name-addr = [display-name] angle-addr
//
// The display name does not follow the RFC to the letter: everything up
// to the angle-addr is taken, optionally stripped of surrounding quotes.
fn name_addr() -> impl Parser<char, (Option<String>, (String, String)), Error = Simple<char>> {
    just('"').or_not().ignore_then(
        take_until(just('"').or_not().ignore_then(angle_addr())).map(|(name, address)| {
            let name = String::from_iter(name);
            let name = name.trim();
            (
                if name.is_empty() {
                    None
                } else {
                    Some(name.to_owned())
                },
                address,
            )
        }),
    )
}

// mailbox = name-addr / addr-spec
pub(super) fn mailbox() -> impl Parser<char, (Option<String>, (String, String)), Error = Simple<char>>
{
    fill()
        .ignore_then(choice((
            addr_spec().map(|addr| (None, addr)),
            name_addr(),
        )))
        .then_ignore(fill())
}

// mailbox-list = mailbox *("," mailbox)
pub(super) fn mailbox_list(
) -> impl Parser<char, Vec<(Option<String>, (String, String))>, Error = Simple<char>> {
    mailbox().separated_by(just(',')).at_least(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_addr_spec() {
        assert_eq!(
            mailbox().parse("kayo@example.com"),
            Ok((None, ("kayo".into(), "example.com".into())))
        );
    }

    #[test]
    fn named_mailbox() {
        assert_eq!(
            mailbox().parse("K. <kayo@example.com>"),
            Ok((Some("K.".into()), ("kayo".into(), "example.com".into())))
        );
    }

    #[test]
    fn quoted_name() {
        assert_eq!(
            mailbox().parse("\"Last, First\" <kayo@example.com>"),
            Ok((
                Some("Last, First".into()),
                ("kayo".into(), "example.com".into())
            ))
        );
    }

    #[test]
    fn angle_only() {
        assert_eq!(
            mailbox().parse("<kayo@example.com>"),
            Ok((None, ("kayo".into(), "example.com".into())))
        );
    }

    #[test]
    fn list_of_mailboxes() {
        assert_eq!(
            mailbox_list().parse("kayo@example.com, Pony P. <pony@domain.tld>"),
            Ok(vec![
                (None, ("kayo".into(), "example.com".into())),
                (
                    Some("Pony P.".into()),
                    ("pony".into(), "domain.tld".into())
                ),
            ])
        );
    }

    #[test]
    fn missing_at_fails() {
        assert!(mailbox().parse("kayoexample.com").is_err());
    }
}
