//! Pattern and sequence properties: first element and step relation per domain,
//! decrement/increment symmetry, wraparound, choice exclusivity and default idempotence.

use std::net::{Ipv4Addr, Ipv6Addr};
use trafficmodel::pattern::{Counter, Pattern, PatternField, WirePattern};
use trafficmodel::schema::{PatternSpec, Range, DECREMENT, VALUE};
use trafficmodel::sequence::{self, nth, Direction};
use trafficmodel::value::Domain;
use trafficmodel::{MacAddress, ValidationContext};

static TTL: PatternSpec<u32> = PatternSpec::new("FlowIpv4", "time_to_live", 64, Some(Range::new(0, 255)));
static SRC: PatternSpec<Ipv4Addr> = PatternSpec::new("FlowIpv4", "src", Ipv4Addr::new(0, 0, 0, 0), None);
static SRC6: PatternSpec<Ipv6Addr> = PatternSpec::new("FlowIpv6", "src", Ipv6Addr::UNSPECIFIED, None);
static DST_MAC: PatternSpec<MacAddress> =
    PatternSpec::with_auto("FlowEthernet", "dst", MacAddress::ZERO, MacAddress::ZERO, None);

fn check_step_relation<T: Domain>(start: T, step: T, count: u32) {
    let mask = if T::BITS >= 128 { u128::MAX } else { (1u128 << T::BITS) - 1 };
    let up = sequence::increment(start, step, count);
    let down = sequence::decrement(start, step, count);
    assert_eq!(up.len(), count as usize);
    assert_eq!(up[0], start);
    assert_eq!(down[0], start);
    for i in 1..up.len() {
        assert_eq!(up[i].to_int(), up[i - 1].to_int().wrapping_add(step.to_int()) & mask);
        assert_eq!(down[i].to_int(), down[i - 1].to_int().wrapping_sub(step.to_int()) & mask);
    }
    assert_eq!(down, sequence::increment(start, sequence::negate(step), count));
}

#[test]
fn test_step_relation_every_domain() {
    check_step_relation(4_000_000_000u32, 100_000_000, 10);
    check_step_relation(Ipv4Addr::new(255, 255, 255, 250), Ipv4Addr::new(0, 0, 0, 3), 5);
    check_step_relation(
        Ipv6Addr::new(0xffff, 0xffff, 0xffff, 0xffff, 0xffff, 0xffff, 0xffff, 0xfffe),
        Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1),
        4,
    );
    check_step_relation(
        MacAddress::new([0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]),
        MacAddress::new([0, 0, 0, 0, 0, 1]),
        4,
    );
}

#[test]
fn test_uint32_wraparound() {
    assert_eq!(sequence::increment(4_294_967_295u32, 1, 2), vec![4_294_967_295, 0]);
}

#[test]
fn test_ipv4_wraparound() {
    assert_eq!(
        sequence::increment(Ipv4Addr::new(255, 255, 255, 255), Ipv4Addr::new(0, 0, 0, 1), 2),
        vec![Ipv4Addr::new(255, 255, 255, 255), Ipv4Addr::new(0, 0, 0, 0)]
    );
}

#[test]
fn test_ipv4_decrement_borrows_across_octets() {
    assert_eq!(
        sequence::decrement(Ipv4Addr::new(10, 0, 1, 0), Ipv4Addr::new(0, 0, 0, 1), 2),
        vec![Ipv4Addr::new(10, 0, 1, 0), Ipv4Addr::new(10, 0, 0, 255)]
    );
}

#[test]
fn test_nth_agrees_with_iteration() {
    let start = MacAddress::new([0, 0x11, 0x22, 0x33, 0x44, 0x55]);
    let step = MacAddress::new([0, 0, 0, 0, 0x01, 0x00]);
    let all = sequence::decrement(start, step, 50);
    assert_eq!(nth(start, step, 49, Direction::Decrement), all[49]);
}

#[test]
fn test_set_value_clears_other_variants() {
    let mut ttl = PatternField::new(&TTL);
    ttl.set_increment(Counter::new(1, 1, 10));
    ttl.set_value(5);
    assert_eq!(ttl.value(), Some(5));
    assert_eq!(ttl.increment(), None);
    assert_eq!(ttl.decrement(), None);
    assert_eq!(ttl.values(), None);
    assert_eq!(ttl.active_variant(), Some(VALUE));
}

#[test]
fn test_peek_does_not_switch_variant() {
    let mut ttl = PatternField::new(&TTL);
    assert_eq!(ttl.decrement(), None);
    assert_eq!(ttl.active_variant(), Some(VALUE));
    ttl.decrement_or_default().step = 2;
    assert_eq!(ttl.active_variant(), Some(DECREMENT));
    assert_eq!(ttl.decrement(), Some(&Counter::new(64, 2, 1)));
}

#[test]
fn test_value_or_default_on_ipv4() {
    let mut src = PatternField::new(&SRC);
    src.set_values(vec![Ipv4Addr::new(1, 2, 3, 4)]);
    assert_eq!(src.value_or_default(), Ipv4Addr::new(0, 0, 0, 0));
    assert_eq!(src.values(), None);
}

#[test]
fn test_values_or_default_appends_in_place() {
    let mut src = PatternField::new(&SRC);
    src.values_or_default().push(Ipv4Addr::new(10, 0, 0, 9));
    assert_eq!(
        src.values(),
        Some(&[Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::new(10, 0, 0, 9)][..])
    );
}

#[test]
fn test_set_default_is_idempotent() {
    let mut ttl = PatternField::new(&TTL);
    let before = ttl.clone();
    ttl.set_default();
    ttl.set_default();
    assert_eq!(ttl, before);

    let mut unset = PatternField::unset(&TTL);
    unset.set_default();
    assert_eq!(unset, before);
}

#[test]
fn test_wire_round_trip_every_variant() {
    let patterns = vec![
        Pattern::Value(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
        Pattern::Values(vec![Ipv6Addr::LOCALHOST, Ipv6Addr::UNSPECIFIED]),
        Pattern::Increment(Counter::new(Ipv6Addr::LOCALHOST, Ipv6Addr::new(0, 0, 0, 0, 0, 0, 1, 0), 7)),
        Pattern::Decrement(Counter::new(Ipv6Addr::LOCALHOST, Ipv6Addr::LOCALHOST, 3)),
    ];
    for pattern in patterns {
        let mut ctx = ValidationContext::default();
        let field = PatternField::with(&SRC6, pattern);
        let json = serde_json::to_string(&field.to_wire::<WirePattern>()).expect("encode");
        let wire: Option<WirePattern> = serde_json::from_str(&json).expect("decode");
        let back = PatternField::from_wire(wire, &SRC6, &mut ctx);
        assert_eq!(back, field, "{}", json);
        assert!(!ctx.has_errors());
    }
}

#[test]
fn test_auto_placeholder_must_be_a_mac() {
    let mut ctx = ValidationContext::default();
    let wire: WirePattern = serde_json::from_str(r#"{"choice": "auto", "auto": "00:00:00:00:00"}"#).expect("json");
    let dst = PatternField::from_wire(Some(wire), &DST_MAC, &mut ctx);
    assert_eq!(dst.auto(), Some(MacAddress::ZERO));
    assert_eq!(
        ctx.errors()[0].to_string(),
        "invalid mac address `00:00:00:00:00` on FlowEthernet.dst"
    );
}

#[test]
fn test_materialize_auto_is_none() {
    let dst = PatternField::new(&DST_MAC);
    assert_eq!(dst.peek().and_then(Pattern::materialize), None);
    assert_eq!(dst.peek().and_then(Pattern::len), None);
}
