//! Parse scalar text formats (MAC, IPv4, IPv6, hex, OID) using PEST.

use crate::value::{Format, MacAddress, ScalarError};
use pest::iterators::Pairs;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(PestParser)]
#[grammar = "formats.pest"]
struct FormatParser;

fn parse_rule<'a>(rule: Rule, format: Format, text: &'a str) -> Result<Pairs<'a, Rule>, ScalarError> {
    FormatParser::parse(rule, text).map_err(|_| ScalarError::format(format, text))
}

/// Parse `aa:bb:cc:dd:ee:ff` (six colon-separated two-digit hex octets).
pub fn parse_mac(text: &str) -> Result<MacAddress, ScalarError> {
    let pairs = parse_rule(Rule::mac, Format::Mac, text)?;
    let mut octets = [0u8; 6];
    let digits = pairs.flatten().filter(|p| p.as_rule() == Rule::hex_octet);
    for (slot, pair) in octets.iter_mut().zip(digits) {
        *slot = u8::from_str_radix(pair.as_str(), 16)
            .map_err(|_| ScalarError::format(Format::Mac, text))?;
    }
    Ok(MacAddress::new(octets))
}

/// Parse a dotted quad; every octet must be at most 255.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr, ScalarError> {
    let pairs = parse_rule(Rule::ipv4, Format::Ipv4, text)?;
    let mut octets = [0u8; 4];
    let parts = pairs.flatten().filter(|p| p.as_rule() == Rule::dec_octet);
    for (slot, pair) in octets.iter_mut().zip(parts) {
        *slot = pair
            .as_str()
            .parse::<u8>()
            .map_err(|_| ScalarError::format(Format::Ipv4, text))?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Parse colon-hex IPv6 notation (including `::` compression and embedded IPv4).
pub fn parse_ipv6(text: &str) -> Result<Ipv6Addr, ScalarError> {
    text.parse::<Ipv6Addr>()
        .map_err(|_| ScalarError::format(Format::Ipv6, text))
}

/// Parse a `0x`-prefixed hex string with an even number of digits into bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, ScalarError> {
    let pairs = parse_rule(Rule::hex, Format::Hex, text)?;
    let body = pairs
        .flatten()
        .find(|p| p.as_rule() == Rule::hex_body)
        .ok_or_else(|| ScalarError::format(Format::Hex, text))?;
    let digits = body.as_str().as_bytes();
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| ScalarError::format(Format::Hex, text))
        })
        .collect()
}

/// Parse a dot-separated object identifier; each arc must fit in 32 bits.
pub fn parse_oid(text: &str) -> Result<Vec<u32>, ScalarError> {
    let pairs = parse_rule(Rule::oid, Format::Oid, text)?;
    pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::arc)
        .map(|p| {
            p.as_str()
                .parse::<u32>()
                .map_err(|_| ScalarError::format(Format::Oid, text))
        })
        .collect()
}

/// Check `text` against `format` without keeping the parsed value.
pub fn check(format: Format, text: &str) -> Result<(), ScalarError> {
    match format {
        Format::Integer => text
            .trim()
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| ScalarError::format(Format::Integer, text)),
        Format::Mac => parse_mac(text).map(|_| ()),
        Format::Ipv4 => parse_ipv4(text).map(|_| ()),
        Format::Ipv6 => parse_ipv6(text).map(|_| ()),
        Format::Hex => parse_hex(text).map(|_| ()),
        Format::Oid => parse_oid(text).map(|_| ()),
    }
}
