//! # trafficmodel: traffic generator configuration model
//!
//! Typed configuration for a network traffic generator: flows, packet headers and the
//! value patterns their fields are made of, with JSON/YAML marshaling and validation.
//!
//! ## Building blocks
//!
//! - **Choice engine** ([`choice`]): every "exactly one of" field is a [`ChoiceField`] over a
//!   Rust enum. Decoded wire forms (a `choice` discriminator plus one slot per variant) are
//!   reconciled by [`choice::resolve`], which applies schema defaults.
//! - **Patterns** ([`pattern`]): a field is a `value`, a list of `values`, an `increment` or
//!   `decrement` counter, or (where declared) `auto`, over `u32`, IPv4, IPv6 or MAC.
//! - **Sequences** ([`sequence`]): `start ± i·step mod 2^bits`, pure and lazy.
//! - **Validation** ([`validate`]): a [`ValidationContext`] is passed through a pass and turned
//!   into a flat [`ValidationReport`] of error and warning strings.
//!
//! ## Example
//!
//! ```text
//! flows:
//!   - name: f1
//!     tx_rx:
//!       port: { tx_name: p1, rx_name: p2 }
//!     packet:
//!       - ethernet:
//!           src: { value: "00:11:22:33:44:55" }
//!       - ipv4:
//!           src: { increment: { start: 10.0.0.1, step: 0.0.0.1, count: 100 } }
//!           time_to_live: { values: [32, 64] }
//!     rate: { pps: 5000 }
//! ```
//!
//! Decode with [`codec::load`] or [`codec::from_yaml`]; the returned [`Decoded`] carries
//! the resolved [`Config`] and the report.

pub mod checksum;
pub mod choice;
pub mod codec;
pub mod config;
pub mod dump;
pub mod flow;
pub mod headers;
pub mod parser;
pub mod pattern;
pub mod schema;
pub mod sequence;
pub mod validate;
pub mod value;

pub use checksum::{Checksum, ChecksumField, Generated};
pub use choice::{resolve, Choice, ChoiceField, Resolution};
pub use codec::{CodecError, Decoded, Encoding, Message};
pub use config::{Ambiguity, ValidationOptions};
pub use flow::{Config, Flow, FlowDuration, FlowRate, FlowSize, TxRx};
pub use headers::{FlowCustom, FlowEthernet, FlowHeader, FlowIpv4, FlowIpv6, FlowUdp, FlowVlan};
pub use pattern::{Counter, Pattern, PatternField};
pub use sequence::{decrement, increment, Direction};
pub use validate::{ValidationContext, ValidationError, ValidationReport};
pub use value::{Domain, MacAddress};
