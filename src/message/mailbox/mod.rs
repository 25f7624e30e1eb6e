//! Mailboxes: addresses with an optional display name

pub use self::types::{Mailbox, Mailboxes};

mod parsers;
mod types;
