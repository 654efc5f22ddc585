//! Scalar domains of pattern fields and their wire representation.
//!
//! Every pattern is defined over one [`Domain`]: `u32`, [`Ipv4Addr`], [`Ipv6Addr`] or
//! [`MacAddress`]. A domain value maps to an unsigned integer of `BITS` bits (big-endian for
//! addresses), which is what counter arithmetic operates on.

use crate::parser;
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Text formats a scalar can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Integer,
    Mac,
    Ipv4,
    Ipv6,
    Hex,
    Oid,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Integer => "integer",
            Format::Mac => "mac address",
            Format::Ipv4 => "ipv4 address",
            Format::Ipv6 => "ipv6 address",
            Format::Hex => "hex string",
            Format::Oid => "oid",
        };
        f.write_str(s)
    }
}

/// Why a wire scalar could not be converted into its domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScalarError {
    #[error("invalid {format} `{text}`")]
    Format { format: Format, text: String },
    #[error("{value} does not fit the domain")]
    OutOfRange { value: i64 },
}

impl ScalarError {
    pub fn format(format: Format, text: impl Into<String>) -> Self {
        ScalarError::Format {
            format,
            text: text.into(),
        }
    }
}

/// A scalar as it appears in decoded JSON/YAML: integers for `u32` fields, strings for addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Int(i64),
    Text(String),
}

impl fmt::Display for WireScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireScalar::Int(i) => write!(f, "{}", i),
            WireScalar::Text(s) => f.write_str(s),
        }
    }
}

/// 48-bit IEEE 802 MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const ZERO: MacAddress = MacAddress([0; 6]);
    pub const BROADCAST: MacAddress = MacAddress([0xff; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = ScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_mac(s)
    }
}

/// A scalar domain usable as the value type of a pattern.
pub trait Domain: Copy + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    /// Domain name used in diagnostics and dumps.
    const NAME: &'static str;
    /// Width of the integer representation; counter arithmetic is modulo `2^BITS`.
    const BITS: u32;
    /// Domain zero (`0`, `0.0.0.0`, `::`, `00:00:00:00:00:00`).
    const ZERO: Self;
    /// Default counter step (`1`, `0.0.0.1`, `::1`, `00:00:00:00:00:01`).
    const UNIT: Self;

    fn to_int(self) -> u128;

    /// Builds a value from the low `BITS` bits of `bits`.
    fn from_int(bits: u128) -> Self;

    fn from_wire(raw: &WireScalar) -> Result<Self, ScalarError>;

    fn to_wire(self) -> WireScalar;

    /// Numeric view used by declared range constraints; `None` for address domains.
    fn range_value(self) -> Option<i64> {
        None
    }
}

/// Mask selecting the `BITS` low bits of a domain's integer representation.
pub fn domain_mask<T: Domain>() -> u128 {
    if T::BITS >= 128 {
        u128::MAX
    } else {
        (1u128 << T::BITS) - 1
    }
}

impl Domain for u32 {
    const NAME: &'static str = "uint32";
    const BITS: u32 = 32;
    const ZERO: Self = 0;
    const UNIT: Self = 1;

    fn to_int(self) -> u128 {
        self as u128
    }

    fn from_int(bits: u128) -> Self {
        bits as u32
    }

    fn from_wire(raw: &WireScalar) -> Result<Self, ScalarError> {
        let value = match raw {
            WireScalar::Int(i) => *i,
            WireScalar::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ScalarError::format(Format::Integer, s.as_str()))?,
        };
        u32::try_from(value).map_err(|_| ScalarError::OutOfRange { value })
    }

    fn to_wire(self) -> WireScalar {
        WireScalar::Int(self as i64)
    }

    fn range_value(self) -> Option<i64> {
        Some(self as i64)
    }
}

impl Domain for Ipv4Addr {
    const NAME: &'static str = "ipv4";
    const BITS: u32 = 32;
    const ZERO: Self = Ipv4Addr::new(0, 0, 0, 0);
    const UNIT: Self = Ipv4Addr::new(0, 0, 0, 1);

    fn to_int(self) -> u128 {
        BigEndian::read_u32(&self.octets()) as u128
    }

    fn from_int(bits: u128) -> Self {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, bits as u32);
        Ipv4Addr::from(buf)
    }

    fn from_wire(raw: &WireScalar) -> Result<Self, ScalarError> {
        match raw {
            WireScalar::Text(s) => parser::parse_ipv4(s),
            WireScalar::Int(i) => Err(ScalarError::format(Format::Ipv4, i.to_string())),
        }
    }

    fn to_wire(self) -> WireScalar {
        WireScalar::Text(self.to_string())
    }
}

impl Domain for Ipv6Addr {
    const NAME: &'static str = "ipv6";
    const BITS: u32 = 128;
    const ZERO: Self = Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0);
    const UNIT: Self = Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1);

    fn to_int(self) -> u128 {
        BigEndian::read_u128(&self.octets())
    }

    fn from_int(bits: u128) -> Self {
        let mut buf = [0u8; 16];
        BigEndian::write_u128(&mut buf, bits);
        Ipv6Addr::from(buf)
    }

    fn from_wire(raw: &WireScalar) -> Result<Self, ScalarError> {
        match raw {
            WireScalar::Text(s) => parser::parse_ipv6(s),
            WireScalar::Int(i) => Err(ScalarError::format(Format::Ipv6, i.to_string())),
        }
    }

    fn to_wire(self) -> WireScalar {
        WireScalar::Text(self.to_string())
    }
}

impl Domain for MacAddress {
    const NAME: &'static str = "mac";
    const BITS: u32 = 48;
    const ZERO: Self = MacAddress::ZERO;
    const UNIT: Self = MacAddress([0, 0, 0, 0, 0, 1]);

    fn to_int(self) -> u128 {
        BigEndian::read_u48(&self.0) as u128
    }

    fn from_int(bits: u128) -> Self {
        let mut buf = [0u8; 6];
        BigEndian::write_u48(&mut buf, (bits & domain_mask::<MacAddress>()) as u64);
        MacAddress(buf)
    }

    fn from_wire(raw: &WireScalar) -> Result<Self, ScalarError> {
        match raw {
            WireScalar::Text(s) => parser::parse_mac(s),
            WireScalar::Int(i) => Err(ScalarError::format(Format::Mac, i.to_string())),
        }
    }

    fn to_wire(self) -> WireScalar {
        WireScalar::Text(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_bits_are_big_endian() {
        let mac = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(mac.to_int(), 0x0011_2233_4455);
        assert_eq!(MacAddress::from_int(0x0011_2233_4455), mac);
        assert_eq!(MacAddress::from_int(1u128 << 48), MacAddress::ZERO);
    }

    #[test]
    fn ipv4_bits_round_trip() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(ip.to_int(), 0x0a00_0001);
        assert_eq!(Ipv4Addr::from_int(0x0a00_0001), ip);
    }

    #[test]
    fn uint32_wire_rejects_negative() {
        assert_eq!(
            u32::from_wire(&WireScalar::Int(-1)),
            Err(ScalarError::OutOfRange { value: -1 })
        );
        assert_eq!(u32::from_wire(&WireScalar::Int(7)), Ok(7));
    }

    #[test]
    fn address_wire_rejects_integers() {
        assert!(Ipv4Addr::from_wire(&WireScalar::Int(1)).is_err());
        assert!(MacAddress::from_wire(&WireScalar::Text("00:11:22:33:44:55".into())).is_ok());
    }

    #[test]
    fn wire_scalar_is_untagged() {
        let v: Vec<WireScalar> = serde_json::from_str(r#"[5, "10.0.0.1"]"#).expect("decode");
        assert_eq!(v[0], WireScalar::Int(5));
        assert_eq!(v[1], WireScalar::Text("10.0.0.1".to_string()));
    }
}
