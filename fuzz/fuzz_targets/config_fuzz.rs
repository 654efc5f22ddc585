//! Config fuzz target: decode arbitrary JSON as a configuration, validate it and
//! re-encode it. Decoding may fail, but resolution and validation must not panic.
//! Build with: cargo fuzz run config_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let options = trafficmodel::ValidationOptions::default();
    if let Ok(decoded) = trafficmodel::codec::from_json::<trafficmodel::Config>(s, options) {
        let _ = trafficmodel::codec::to_json(&decoded.message);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run config_fuzz");
}
