//! Format fuzz target: feed arbitrary text to the scalar format parsers.
//! No parser may panic; each returns the parsed value or a `ScalarError`.
//! Build with: cargo fuzz run formats_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = trafficmodel::parser::parse_mac(s);
    let _ = trafficmodel::parser::parse_ipv4(s);
    let _ = trafficmodel::parser::parse_ipv6(s);
    let _ = trafficmodel::parser::parse_hex(s);
    let _ = trafficmodel::parser::parse_oid(s);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run formats_fuzz");
}
