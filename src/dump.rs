//! Human-readable rendering of a resolved configuration (used by `validate_config --dump`).
//!
//! Counters are previewed lazily: only the first `preview` values are generated, so a counter
//! with a count of `u32::MAX` is as cheap to print as a literal.

use crate::checksum::{Checksum, ChecksumField, Generated};
use crate::choice::Choice;
use crate::flow::{Config, Flow, FlowDuration, FlowRate, FlowSize, TxRx};
use crate::headers::FlowHeader;
use crate::pattern::{Counter, Pattern, PatternField};
use crate::sequence::Direction;
use crate::value::Domain;
use std::fmt::Write;

/// One-line description of a field's active variant.
pub trait Describe {
    fn describe(&self, preview: usize) -> String;
}

impl<T: Domain> Describe for PatternField<T> {
    fn describe(&self, preview: usize) -> String {
        match self.peek() {
            Some(p) => describe_pattern(p, preview),
            None => "unset".to_string(),
        }
    }
}

impl Describe for ChecksumField {
    fn describe(&self, _preview: usize) -> String {
        match self.peek() {
            Some(Checksum::Generated(Generated::Good)) => "generated (good)".to_string(),
            Some(Checksum::Generated(Generated::Bad)) => "generated (bad)".to_string(),
            Some(Checksum::Custom(v)) => format!("custom 0x{:04x}", v),
            None => "unset".to_string(),
        }
    }
}

pub fn describe_pattern<T: Domain>(pattern: &Pattern<T>, preview: usize) -> String {
    match pattern {
        Pattern::Value(v) => v.to_string(),
        Pattern::Values(vs) => format!("values [{}]", join(vs.iter())),
        Pattern::Increment(c) => describe_counter("increment", c, Direction::Increment, preview),
        Pattern::Decrement(c) => describe_counter("decrement", c, Direction::Decrement, preview),
        Pattern::Auto(v) => format!("auto ({})", v),
    }
}

fn describe_counter<T: Domain>(kind: &str, c: &Counter<T>, direction: Direction, preview: usize) -> String {
    let mut out = format!("{} start={} step={} count={}", kind, c.start, c.step, c.count);
    if preview > 0 && c.count > 0 {
        let shown = c.sequence(direction).take(preview);
        let ellipsis = if c.count as usize > preview { ", ..." } else { "" };
        let _ = write!(out, " -> [{}{}]", join(shown), ellipsis);
    }
    out
}

fn join<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    items.into_iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn describe_tx_rx(tx_rx: Option<&TxRx>) -> String {
    match tx_rx {
        Some(TxRx::Port(p)) => match &p.rx_name {
            Some(rx) => format!("port {} -> {}", p.tx_name, rx),
            None => format!("port {}", p.tx_name),
        },
        Some(TxRx::Device(d)) => format!("device [{}] -> [{}]", d.tx_names.join(", "), d.rx_names.join(", ")),
        None => "unset".to_string(),
    }
}

fn describe_size(size: Option<&FlowSize>) -> String {
    match size {
        Some(FlowSize::Fixed(n)) => format!("fixed {}", n),
        Some(FlowSize::Increment(i)) => format!("increment {}..={} step {}", i.start, i.end, i.step),
        Some(FlowSize::Random(r)) => format!("random {}..={}", r.min, r.max),
        None => "unset".to_string(),
    }
}

fn describe_rate(rate: Option<&FlowRate>) -> String {
    match rate {
        Some(FlowRate::Pps(v)) => format!("{} pps", v),
        Some(FlowRate::Bps(v)) => format!("{} bps", v),
        Some(FlowRate::Kbps(v)) => format!("{} kbps", v),
        Some(FlowRate::Mbps(v)) => format!("{} mbps", v),
        Some(FlowRate::Gbps(v)) => format!("{} gbps", v),
        Some(FlowRate::Percentage(v)) => format!("{}% of line rate", v),
        None => "unset".to_string(),
    }
}

fn describe_duration(duration: Option<&FlowDuration>) -> String {
    match duration {
        Some(FlowDuration::FixedPackets(p)) => format!("{} packet(s), gap {}", p.packets, p.gap),
        Some(FlowDuration::FixedSeconds(s)) => format!("{} second(s), gap {}", s.seconds, s.gap),
        Some(FlowDuration::Burst(b)) if b.bursts == 0 => {
            format!("bursts of {} packet(s) forever, gap {}", b.packets, b.gap)
        }
        Some(FlowDuration::Burst(b)) => format!("{} burst(s) of {} packet(s), gap {}", b.bursts, b.packets, b.gap),
        Some(FlowDuration::Continuous(c)) => format!("continuous, gap {}", c.gap),
        None => "unset".to_string(),
    }
}

fn header_fields(header: &FlowHeader, preview: usize) -> Vec<(&'static str, String)> {
    match header {
        FlowHeader::Ethernet(h) => h.describe_fields(preview),
        FlowHeader::Vlan(h) => h.describe_fields(preview),
        FlowHeader::Ipv4(h) => h.describe_fields(preview),
        FlowHeader::Ipv6(h) => h.describe_fields(preview),
        FlowHeader::Udp(h) => h.describe_fields(preview),
        FlowHeader::Custom(h) => vec![("bytes", h.bytes.clone())],
    }
}

/// Multi-line dump of one flow.
pub fn dump_flow(flow: &Flow, preview: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "flow {}", flow.name);
    let _ = writeln!(out, "  tx_rx: {}", describe_tx_rx(flow.tx_rx.peek()));
    let _ = writeln!(out, "  size: {}", describe_size(flow.size.peek()));
    let _ = writeln!(out, "  rate: {}", describe_rate(flow.rate.peek()));
    let _ = writeln!(out, "  duration: {}", describe_duration(flow.duration.peek()));
    for (i, header) in flow.packet.iter().enumerate() {
        let Some(h) = header.peek() else {
            let _ = writeln!(out, "  packet[{}]: unset", i);
            continue;
        };
        let _ = writeln!(out, "  packet[{}]: {}", i, h.variant());
        for (name, text) in header_fields(h, preview) {
            let _ = writeln!(out, "    {}: {}", name, text);
        }
    }
    out
}

pub fn dump_config(config: &Config, preview: usize) -> String {
    config.flows.iter().map(|f| dump_flow(f, preview)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::FlowIpv4;
    use std::net::Ipv4Addr;

    #[test]
    fn counter_preview_is_truncated() {
        let c = Counter::new(Ipv4Addr::new(10, 0, 0, 254), Ipv4Addr::new(0, 0, 0, 1), 1000);
        let text = describe_pattern(&Pattern::Increment(c), 3);
        assert_eq!(
            text,
            "increment start=10.0.0.254 step=0.0.0.1 count=1000 -> [10.0.0.254, 10.0.0.255, 10.0.1.0, ...]"
        );
    }

    #[test]
    fn preview_disabled() {
        let c = Counter::new(5u32, 1, 2);
        assert_eq!(describe_pattern(&Pattern::Decrement(c), 0), "decrement start=5 step=1 count=2");
    }

    #[test]
    fn flow_dump_lists_headers() {
        let mut flow = Flow::new("f1");
        flow.set_port("p1", None);
        flow.push_header(FlowHeader::Ipv4(FlowIpv4::new()));
        let text = dump_flow(&flow, 2);
        assert!(text.starts_with("flow f1\n  tx_rx: port p1\n"));
        assert!(text.contains("  packet[0]: ipv4\n"));
        assert!(text.contains("    time_to_live: 64\n"));
        assert!(text.contains("    header_length: auto (5)\n"));
        assert!(text.contains("    header_checksum: generated (good)\n"));
    }
}
