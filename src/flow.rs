//! Flow configuration: the top-level `Config` and the choice fields of a `Flow`.
//!
//! Each choice follows the same shape as the header and pattern choices: a Rust enum for the
//! resolved model and a sibling-slot `Wire*` struct for JSON/YAML.

use crate::choice::{Choice, ChoiceField, ChoiceSlots, WireChoice};
use crate::codec::Message;
use crate::headers::{FlowHeader, FlowHeaderField, WireFlowHeader, FLOW_HEADER};
use crate::schema::{ChoiceSpec, VariantSpec};
use crate::validate::{validate_range, validate_required, ValidationContext, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Returns the field names of the populated slots, in declaration order.
fn populated<const N: usize>(slots: [(&'static str, bool); N]) -> Vec<&'static str> {
    slots.iter().filter(|(_, set)| *set).map(|(name, _)| *name).collect()
}

// tx/rx endpoints

pub const PORT: &str = "port";
pub const DEVICE: &str = "device";

pub static TX_RX: ChoiceSpec = ChoiceSpec {
    type_name: "FlowTxRx",
    field: "choice",
    variants: &[VariantSpec::stable(PORT), VariantSpec::stable(DEVICE)],
    default: None,
    required: true,
};

/// Port-based endpoints: one transmit port, optional receive port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowPort {
    pub tx_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_name: Option<String>,
}

/// Device-based endpoints: emulated devices on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowRouter {
    pub tx_names: Vec<String>,
    pub rx_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxRx {
    Port(FlowPort),
    Device(FlowRouter),
}

impl Choice for TxRx {
    type Schema = ChoiceSpec;

    fn spec(schema: &ChoiceSpec) -> &ChoiceSpec {
        schema
    }

    fn variant(&self) -> &'static str {
        match self {
            TxRx::Port(_) => PORT,
            TxRx::Device(_) => DEVICE,
        }
    }

    fn default_for(variant: &str, _schema: &ChoiceSpec) -> Option<Self> {
        match variant {
            PORT => Some(TxRx::Port(FlowPort::default())),
            DEVICE => Some(TxRx::Device(FlowRouter::default())),
            _ => None,
        }
    }

    fn validate(&self, _schema: &ChoiceSpec, ctx: &mut ValidationContext) {
        match self {
            TxRx::Port(p) => {
                validate_required(ctx, "FlowPort.tx_name", &p.tx_name);
            }
            TxRx::Device(d) => {
                if d.tx_names.is_empty() {
                    ctx.error(ValidationError::RequiredFieldMissing {
                        field: "FlowRouter.tx_names".to_string(),
                    });
                }
                if d.rx_names.is_empty() {
                    ctx.error(ValidationError::RequiredFieldMissing {
                        field: "FlowRouter.rx_names".to_string(),
                    });
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireTxRx {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<FlowPort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<FlowRouter>,
}

impl ChoiceSlots for WireTxRx {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        populated([(PORT, self.port.is_some()), (DEVICE, self.device.is_some())])
    }
}

impl WireChoice<TxRx> for WireTxRx {
    fn take(self, variant: &'static str, _schema: &ChoiceSpec, _ctx: &mut ValidationContext) -> Option<TxRx> {
        match variant {
            PORT => self.port.map(TxRx::Port),
            DEVICE => self.device.map(TxRx::Device),
            _ => None,
        }
    }

    fn from_choice(choice: &TxRx) -> Self {
        let mut wire = WireTxRx {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match choice {
            TxRx::Port(p) => wire.port = Some(p.clone()),
            TxRx::Device(d) => wire.device = Some(d.clone()),
        }
        wire
    }
}

// frame size

pub const FIXED: &str = "fixed";
pub const INCREMENT: &str = "increment";
pub const RANDOM: &str = "random";

pub static SIZE: ChoiceSpec = ChoiceSpec {
    type_name: "FlowSize",
    field: "choice",
    variants: &[
        VariantSpec::stable(FIXED),
        VariantSpec::stable(INCREMENT),
        VariantSpec::under_review(RANDOM, "random frame sizes are not supported by every port type"),
    ],
    default: Some(FIXED),
    required: false,
};

/// Frame sizes stepping from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeIncrement {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl Default for SizeIncrement {
    fn default() -> Self {
        SizeIncrement {
            start: 64,
            end: 1518,
            step: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeRandom {
    pub min: u32,
    pub max: u32,
}

impl Default for SizeRandom {
    fn default() -> Self {
        SizeRandom { min: 64, max: 1518 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSize {
    Fixed(u32),
    Increment(SizeIncrement),
    Random(SizeRandom),
}

impl Choice for FlowSize {
    type Schema = ChoiceSpec;

    fn spec(schema: &ChoiceSpec) -> &ChoiceSpec {
        schema
    }

    fn variant(&self) -> &'static str {
        match self {
            FlowSize::Fixed(_) => FIXED,
            FlowSize::Increment(_) => INCREMENT,
            FlowSize::Random(_) => RANDOM,
        }
    }

    fn default_for(variant: &str, _schema: &ChoiceSpec) -> Option<Self> {
        match variant {
            FIXED => Some(FlowSize::Fixed(64)),
            INCREMENT => Some(FlowSize::Increment(SizeIncrement::default())),
            RANDOM => Some(FlowSize::Random(SizeRandom::default())),
            _ => None,
        }
    }

    fn validate(&self, _schema: &ChoiceSpec, ctx: &mut ValidationContext) {
        match self {
            FlowSize::Fixed(n) => {
                validate_range(ctx, "FlowSize.fixed", *n, 1, u32::MAX);
            }
            FlowSize::Increment(inc) => {
                validate_range(ctx, "FlowSizeIncrement.step", inc.step, 1, u32::MAX);
                validate_range(ctx, "FlowSizeIncrement.end", inc.end, inc.start, u32::MAX);
            }
            FlowSize::Random(r) => {
                validate_range(ctx, "FlowSizeRandom.max", r.max, r.min, u32::MAX);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireFlowSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<SizeIncrement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<SizeRandom>,
}

impl ChoiceSlots for WireFlowSize {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        populated([
            (FIXED, self.fixed.is_some()),
            (INCREMENT, self.increment.is_some()),
            (RANDOM, self.random.is_some()),
        ])
    }
}

impl WireChoice<FlowSize> for WireFlowSize {
    fn take(self, variant: &'static str, _schema: &ChoiceSpec, _ctx: &mut ValidationContext) -> Option<FlowSize> {
        match variant {
            FIXED => self.fixed.map(FlowSize::Fixed),
            INCREMENT => self.increment.map(FlowSize::Increment),
            RANDOM => self.random.map(FlowSize::Random),
            _ => None,
        }
    }

    fn from_choice(choice: &FlowSize) -> Self {
        let mut wire = WireFlowSize {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match choice {
            FlowSize::Fixed(n) => wire.fixed = Some(*n),
            FlowSize::Increment(inc) => wire.increment = Some(*inc),
            FlowSize::Random(r) => wire.random = Some(*r),
        }
        wire
    }
}

// transmit rate

pub const PPS: &str = "pps";
pub const BPS: &str = "bps";
pub const KBPS: &str = "kbps";
pub const MBPS: &str = "mbps";
pub const GBPS: &str = "gbps";
pub const PERCENTAGE: &str = "percentage";

pub static RATE: ChoiceSpec = ChoiceSpec {
    type_name: "FlowRate",
    field: "choice",
    variants: &[
        VariantSpec::stable(PPS),
        VariantSpec::stable(BPS),
        VariantSpec::stable(KBPS),
        VariantSpec::stable(MBPS),
        VariantSpec::stable(GBPS),
        VariantSpec::stable(PERCENTAGE),
    ],
    default: Some(PPS),
    required: false,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowRate {
    Pps(u64),
    Bps(u64),
    Kbps(u64),
    Mbps(u64),
    Gbps(u32),
    /// Share of the port line rate, `0..=100`.
    Percentage(f32),
}

impl Choice for FlowRate {
    type Schema = ChoiceSpec;

    fn spec(schema: &ChoiceSpec) -> &ChoiceSpec {
        schema
    }

    fn variant(&self) -> &'static str {
        match self {
            FlowRate::Pps(_) => PPS,
            FlowRate::Bps(_) => BPS,
            FlowRate::Kbps(_) => KBPS,
            FlowRate::Mbps(_) => MBPS,
            FlowRate::Gbps(_) => GBPS,
            FlowRate::Percentage(_) => PERCENTAGE,
        }
    }

    fn default_for(variant: &str, _schema: &ChoiceSpec) -> Option<Self> {
        match variant {
            PPS => Some(FlowRate::Pps(1000)),
            BPS => Some(FlowRate::Bps(1_000_000_000)),
            KBPS => Some(FlowRate::Kbps(1_000_000)),
            MBPS => Some(FlowRate::Mbps(1000)),
            GBPS => Some(FlowRate::Gbps(1)),
            PERCENTAGE => Some(FlowRate::Percentage(100.0)),
            _ => None,
        }
    }

    fn validate(&self, _schema: &ChoiceSpec, ctx: &mut ValidationContext) {
        match *self {
            FlowRate::Pps(v) => {
                validate_range(ctx, "FlowRate.pps", v, 1, u64::MAX);
            }
            FlowRate::Bps(v) => {
                validate_range(ctx, "FlowRate.bps", v, 672, u64::MAX);
            }
            FlowRate::Kbps(v) => {
                validate_range(ctx, "FlowRate.kbps", v, 1, u64::MAX);
            }
            FlowRate::Mbps(v) => {
                validate_range(ctx, "FlowRate.mbps", v, 1, u64::MAX);
            }
            FlowRate::Gbps(v) => {
                validate_range(ctx, "FlowRate.gbps", v, 1, u32::MAX);
            }
            FlowRate::Percentage(v) => {
                validate_range(ctx, "FlowRate.percentage", v, 0.0, 100.0);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireFlowRate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kbps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f32>,
}

impl ChoiceSlots for WireFlowRate {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        populated([
            (PPS, self.pps.is_some()),
            (BPS, self.bps.is_some()),
            (KBPS, self.kbps.is_some()),
            (MBPS, self.mbps.is_some()),
            (GBPS, self.gbps.is_some()),
            (PERCENTAGE, self.percentage.is_some()),
        ])
    }
}

impl WireChoice<FlowRate> for WireFlowRate {
    fn take(self, variant: &'static str, _schema: &ChoiceSpec, _ctx: &mut ValidationContext) -> Option<FlowRate> {
        match variant {
            PPS => self.pps.map(FlowRate::Pps),
            BPS => self.bps.map(FlowRate::Bps),
            KBPS => self.kbps.map(FlowRate::Kbps),
            MBPS => self.mbps.map(FlowRate::Mbps),
            GBPS => self.gbps.map(FlowRate::Gbps),
            PERCENTAGE => self.percentage.map(FlowRate::Percentage),
            _ => None,
        }
    }

    fn from_choice(choice: &FlowRate) -> Self {
        let mut wire = WireFlowRate {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match *choice {
            FlowRate::Pps(v) => wire.pps = Some(v),
            FlowRate::Bps(v) => wire.bps = Some(v),
            FlowRate::Kbps(v) => wire.kbps = Some(v),
            FlowRate::Mbps(v) => wire.mbps = Some(v),
            FlowRate::Gbps(v) => wire.gbps = Some(v),
            FlowRate::Percentage(v) => wire.percentage = Some(v),
        }
        wire
    }
}

// transmit duration

pub const FIXED_PACKETS: &str = "fixed_packets";
pub const FIXED_SECONDS: &str = "fixed_seconds";
pub const BURST: &str = "burst";
pub const CONTINUOUS: &str = "continuous";

pub static DURATION: ChoiceSpec = ChoiceSpec {
    type_name: "FlowDuration",
    field: "choice",
    variants: &[
        VariantSpec::stable(FIXED_PACKETS),
        VariantSpec::deprecated(FIXED_SECONDS, "use fixed_packets with a matching rate"),
        VariantSpec::stable(BURST),
        VariantSpec::stable(CONTINUOUS),
    ],
    default: Some(CONTINUOUS),
    required: false,
};

/// Minimum inter-packet gap in bytes.
const DEFAULT_GAP: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixedPackets {
    pub packets: u32,
    pub gap: u32,
}

impl Default for FixedPackets {
    fn default() -> Self {
        FixedPackets {
            packets: 1,
            gap: DEFAULT_GAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixedSeconds {
    pub seconds: f32,
    pub gap: u32,
}

impl Default for FixedSeconds {
    fn default() -> Self {
        FixedSeconds {
            seconds: 1.0,
            gap: DEFAULT_GAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Burst {
    /// Number of bursts; 0 repeats forever.
    pub bursts: u32,
    pub packets: u32,
    pub gap: u32,
}

impl Default for Burst {
    fn default() -> Self {
        Burst {
            bursts: 0,
            packets: 1,
            gap: DEFAULT_GAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Continuous {
    pub gap: u32,
}

impl Default for Continuous {
    fn default() -> Self {
        Continuous { gap: DEFAULT_GAP }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowDuration {
    FixedPackets(FixedPackets),
    FixedSeconds(FixedSeconds),
    Burst(Burst),
    Continuous(Continuous),
}

impl Choice for FlowDuration {
    type Schema = ChoiceSpec;

    fn spec(schema: &ChoiceSpec) -> &ChoiceSpec {
        schema
    }

    fn variant(&self) -> &'static str {
        match self {
            FlowDuration::FixedPackets(_) => FIXED_PACKETS,
            FlowDuration::FixedSeconds(_) => FIXED_SECONDS,
            FlowDuration::Burst(_) => BURST,
            FlowDuration::Continuous(_) => CONTINUOUS,
        }
    }

    fn default_for(variant: &str, _schema: &ChoiceSpec) -> Option<Self> {
        match variant {
            FIXED_PACKETS => Some(FlowDuration::FixedPackets(FixedPackets::default())),
            FIXED_SECONDS => Some(FlowDuration::FixedSeconds(FixedSeconds::default())),
            BURST => Some(FlowDuration::Burst(Burst::default())),
            CONTINUOUS => Some(FlowDuration::Continuous(Continuous::default())),
            _ => None,
        }
    }

    fn validate(&self, _schema: &ChoiceSpec, ctx: &mut ValidationContext) {
        match self {
            FlowDuration::FixedPackets(p) => {
                validate_range(ctx, "FlowFixedPackets.packets", p.packets, 1, u32::MAX);
            }
            FlowDuration::FixedSeconds(s) => {
                validate_range(ctx, "FlowFixedSeconds.seconds", s.seconds, 0.0, f32::MAX);
            }
            FlowDuration::Burst(b) => {
                validate_range(ctx, "FlowBurst.packets", b.packets, 1, u32::MAX);
            }
            FlowDuration::Continuous(_) => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireFlowDuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_packets: Option<FixedPackets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_seconds: Option<FixedSeconds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst: Option<Burst>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuous: Option<Continuous>,
}

impl ChoiceSlots for WireFlowDuration {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        populated([
            (FIXED_PACKETS, self.fixed_packets.is_some()),
            (FIXED_SECONDS, self.fixed_seconds.is_some()),
            (BURST, self.burst.is_some()),
            (CONTINUOUS, self.continuous.is_some()),
        ])
    }
}

impl WireChoice<FlowDuration> for WireFlowDuration {
    fn take(
        self,
        variant: &'static str,
        _schema: &ChoiceSpec,
        _ctx: &mut ValidationContext,
    ) -> Option<FlowDuration> {
        match variant {
            FIXED_PACKETS => self.fixed_packets.map(FlowDuration::FixedPackets),
            FIXED_SECONDS => self.fixed_seconds.map(FlowDuration::FixedSeconds),
            BURST => self.burst.map(FlowDuration::Burst),
            CONTINUOUS => self.continuous.map(FlowDuration::Continuous),
            _ => None,
        }
    }

    fn from_choice(choice: &FlowDuration) -> Self {
        let mut wire = WireFlowDuration {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match *choice {
            FlowDuration::FixedPackets(p) => wire.fixed_packets = Some(p),
            FlowDuration::FixedSeconds(s) => wire.fixed_seconds = Some(s),
            FlowDuration::Burst(b) => wire.burst = Some(b),
            FlowDuration::Continuous(c) => wire.continuous = Some(c),
        }
        wire
    }
}

// flow and config

/// One traffic flow: where it is sent, what packets it carries, and how many.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub name: String,
    pub tx_rx: ChoiceField<TxRx>,
    pub packet: Vec<FlowHeaderField>,
    pub size: ChoiceField<FlowSize>,
    pub rate: ChoiceField<FlowRate>,
    pub duration: ChoiceField<FlowDuration>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        Flow {
            name: name.into(),
            tx_rx: ChoiceField::new(&TX_RX),
            packet: Vec::new(),
            size: ChoiceField::new(&SIZE),
            rate: ChoiceField::new(&RATE),
            duration: ChoiceField::new(&DURATION),
        }
    }

    /// Appends a header to the packet and returns it for further configuration.
    pub fn push_header(&mut self, header: FlowHeader) -> &mut FlowHeaderField {
        self.packet.push(FlowHeaderField::header(header));
        let last = self.packet.len() - 1;
        &mut self.packet[last]
    }

    pub fn set_port(&mut self, tx_name: impl Into<String>, rx_name: Option<String>) {
        self.tx_rx.set(TxRx::Port(FlowPort {
            tx_name: tx_name.into(),
            rx_name,
        }));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireFlow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_rx: Option<WireTxRx>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packet: Vec<WireFlowHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<WireFlowSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<WireFlowRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<WireFlowDuration>,
}

impl Message for Flow {
    type Wire = WireFlow;

    fn from_wire(wire: WireFlow, ctx: &mut ValidationContext) -> Self {
        Flow {
            name: wire.name,
            tx_rx: ChoiceField::from_wire(wire.tx_rx, &TX_RX, ctx),
            packet: wire
                .packet
                .into_iter()
                .enumerate()
                .map(|(i, h)| {
                    ctx.scoped(format!("packet[{}]", i), |ctx| {
                        ChoiceField::from_wire(Some(h), &FLOW_HEADER, ctx)
                    })
                })
                .collect(),
            size: ChoiceField::from_wire(wire.size, &SIZE, ctx),
            rate: ChoiceField::from_wire(wire.rate, &RATE, ctx),
            duration: ChoiceField::from_wire(wire.duration, &DURATION, ctx),
        }
    }

    fn to_wire(&self) -> WireFlow {
        WireFlow {
            name: self.name.clone(),
            tx_rx: self.tx_rx.to_wire(),
            packet: self.packet.iter().filter_map(|h| h.to_wire()).collect(),
            size: self.size.to_wire(),
            rate: self.rate.to_wire(),
            duration: self.duration.to_wire(),
        }
    }

    fn validate(&self, ctx: &mut ValidationContext) {
        validate_required(ctx, "Flow.name", &self.name);
        self.tx_rx.validate(ctx);
        for (i, header) in self.packet.iter().enumerate() {
            ctx.scoped(format!("packet[{}]", i), |ctx| header.validate(ctx));
        }
        self.size.validate(ctx);
        self.rate.validate(ctx);
        self.duration.validate(ctx);
    }
}

/// Location prefix of the `index`th flow in diagnostics.
fn flow_scope(index: usize) -> String {
    format!("flows[{}]", index)
}

/// Top-level traffic configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub flows: Vec<Flow>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn flow(&self, name: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.name == name)
    }

    /// Appends a flow with defaults and returns it.
    pub fn add_flow(&mut self, name: impl Into<String>) -> &mut Flow {
        self.flows.push(Flow::new(name));
        let last = self.flows.len() - 1;
        &mut self.flows[last]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<WireFlow>,
}

impl Message for Config {
    type Wire = WireConfig;

    fn from_wire(wire: WireConfig, ctx: &mut ValidationContext) -> Self {
        Config {
            flows: wire
                .flows
                .into_iter()
                .enumerate()
                .map(|(i, f)| ctx.scoped(flow_scope(i), |ctx| Flow::from_wire(f, ctx)))
                .collect(),
        }
    }

    fn to_wire(&self) -> WireConfig {
        WireConfig {
            flows: self.flows.iter().map(Flow::to_wire).collect(),
        }
    }

    fn validate(&self, ctx: &mut ValidationContext) {
        let mut seen = HashSet::new();
        for (i, flow) in self.flows.iter().enumerate() {
            let duplicate = !flow.name.is_empty() && !seen.insert(flow.name.as_str());
            ctx.scoped(flow_scope(i), |ctx| {
                if duplicate {
                    ctx.error(ValidationError::DuplicateName {
                        field: "Flow.name".to_string(),
                        name: flow.name.clone(),
                    });
                }
                flow.validate(ctx);
            });
        }
    }
}
