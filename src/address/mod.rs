//! Email addresses and envelopes

pub use self::{
    envelope::Envelope,
    types::{Address, AddressError},
};

mod envelope;
mod types;
