//! Packet header messages of a flow and the `FlowHeader` choice over them.
//!
//! | Header | Pattern fields |
//! |--------|----------------|
//! | `ethernet` | dst (mac, auto), src (mac), ether_type (auto), pfc_queue |
//! | `vlan` | priority, cfi, id, tpid (auto) |
//! | `ipv4` | version, header_length (auto), total_length (auto), time_to_live, protocol (auto), header_checksum, src, dst |
//! | `ipv6` | version, traffic_class, flow_label, payload_length (auto), next_header (auto), hop_limit, src, dst |
//! | `udp` | src_port, dst_port, length (auto), checksum |
//! | `custom` | raw bytes as a `0x` hex string |

use crate::checksum::{ChecksumField, WireChecksum};
use crate::choice::{Choice, ChoiceField, ChoiceSlots, WireChoice};
use crate::codec::Message;
use crate::dump::Describe;
use crate::parser;
use crate::pattern::{PatternField, WirePattern};
use crate::schema::{ChecksumSpec, ChoiceSpec, PatternSpec, Range, VariantSpec};
use crate::validate::{validate_hex, validate_required, ValidationContext};
use crate::value::{MacAddress, ScalarError};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Declares a header message made of choice fields, its wire form and its [`Message`] impl.
macro_rules! header {
    (
        $(#[$meta:meta])*
        $name:ident, $wire:ident {
            $($field:ident: $ty:ty => $wty:ty = $spec:ident,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: $ty,)*
        }

        impl $name {
            pub fn new() -> Self {
                $name {
                    $($field: ChoiceField::new(&$spec),)*
                }
            }

            /// `(field, description)` pairs in declaration order.
            pub fn describe_fields(&self, preview: usize) -> Vec<(&'static str, String)> {
                vec![$((stringify!($field), self.$field.describe(preview)),)*]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $wire {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$wty>,
            )*
        }

        impl Message for $name {
            type Wire = $wire;

            fn from_wire(wire: $wire, ctx: &mut ValidationContext) -> Self {
                $name {
                    $($field: ChoiceField::from_wire(wire.$field, &$spec, ctx),)*
                }
            }

            fn to_wire(&self) -> $wire {
                $wire {
                    $($field: self.$field.to_wire(),)*
                }
            }

            fn validate(&self, ctx: &mut ValidationContext) {
                $(self.$field.validate(ctx);)*
            }
        }
    };
}

const BYTE: Option<Range> = Some(Range::new(0, 255));
const WORD: Option<Range> = Some(Range::new(0, 65535));
const NIBBLE: Option<Range> = Some(Range::new(0, 15));

static ETHERNET_DST: PatternSpec<MacAddress> =
    PatternSpec::with_auto("FlowEthernet", "dst", MacAddress::ZERO, MacAddress::ZERO, None);
static ETHERNET_SRC: PatternSpec<MacAddress> = PatternSpec::new("FlowEthernet", "src", MacAddress::ZERO, None);
static ETHERNET_ETHER_TYPE: PatternSpec<u32> = PatternSpec::with_auto("FlowEthernet", "ether_type", 65535, 65535, WORD);
static ETHERNET_PFC_QUEUE: PatternSpec<u32> =
    PatternSpec::new("FlowEthernet", "pfc_queue", 0, Some(Range::new(0, 7)));

header! {
    /// Ethernet II header.
    FlowEthernet, WireFlowEthernet {
        dst: PatternField<MacAddress> => WirePattern = ETHERNET_DST,
        src: PatternField<MacAddress> => WirePattern = ETHERNET_SRC,
        ether_type: PatternField<u32> => WirePattern = ETHERNET_ETHER_TYPE,
        pfc_queue: PatternField<u32> => WirePattern = ETHERNET_PFC_QUEUE,
    }
}

static VLAN_PRIORITY: PatternSpec<u32> = PatternSpec::new("FlowVlan", "priority", 0, Some(Range::new(0, 7)));
static VLAN_CFI: PatternSpec<u32> = PatternSpec::new("FlowVlan", "cfi", 0, Some(Range::new(0, 1)));
static VLAN_ID: PatternSpec<u32> = PatternSpec::new("FlowVlan", "id", 1, Some(Range::new(0, 4095)));
static VLAN_TPID: PatternSpec<u32> = PatternSpec::with_auto("FlowVlan", "tpid", 65535, 65535, WORD);

header! {
    /// IEEE 802.1Q tag.
    FlowVlan, WireFlowVlan {
        priority: PatternField<u32> => WirePattern = VLAN_PRIORITY,
        cfi: PatternField<u32> => WirePattern = VLAN_CFI,
        id: PatternField<u32> => WirePattern = VLAN_ID,
        tpid: PatternField<u32> => WirePattern = VLAN_TPID,
    }
}

static IPV4_VERSION: PatternSpec<u32> = PatternSpec::new("FlowIpv4", "version", 4, NIBBLE);
static IPV4_HEADER_LENGTH: PatternSpec<u32> = PatternSpec::with_auto("FlowIpv4", "header_length", 5, 5, NIBBLE);
static IPV4_TOTAL_LENGTH: PatternSpec<u32> = PatternSpec::with_auto("FlowIpv4", "total_length", 46, 46, WORD);
static IPV4_TIME_TO_LIVE: PatternSpec<u32> = PatternSpec::new("FlowIpv4", "time_to_live", 64, BYTE);
static IPV4_PROTOCOL: PatternSpec<u32> = PatternSpec::with_auto("FlowIpv4", "protocol", 61, 61, BYTE);
static IPV4_HEADER_CHECKSUM: ChecksumSpec = ChecksumSpec::new("FlowIpv4", "header_checksum", 65535);
static IPV4_SRC: PatternSpec<Ipv4Addr> = PatternSpec::new("FlowIpv4", "src", Ipv4Addr::UNSPECIFIED, None);
static IPV4_DST: PatternSpec<Ipv4Addr> = PatternSpec::new("FlowIpv4", "dst", Ipv4Addr::UNSPECIFIED, None);

header! {
    /// IPv4 header.
    FlowIpv4, WireFlowIpv4 {
        version: PatternField<u32> => WirePattern = IPV4_VERSION,
        header_length: PatternField<u32> => WirePattern = IPV4_HEADER_LENGTH,
        total_length: PatternField<u32> => WirePattern = IPV4_TOTAL_LENGTH,
        time_to_live: PatternField<u32> => WirePattern = IPV4_TIME_TO_LIVE,
        protocol: PatternField<u32> => WirePattern = IPV4_PROTOCOL,
        header_checksum: ChecksumField => WireChecksum = IPV4_HEADER_CHECKSUM,
        src: PatternField<Ipv4Addr> => WirePattern = IPV4_SRC,
        dst: PatternField<Ipv4Addr> => WirePattern = IPV4_DST,
    }
}

static IPV6_VERSION: PatternSpec<u32> = PatternSpec::new("FlowIpv6", "version", 6, NIBBLE);
static IPV6_TRAFFIC_CLASS: PatternSpec<u32> = PatternSpec::new("FlowIpv6", "traffic_class", 0, BYTE);
static IPV6_FLOW_LABEL: PatternSpec<u32> =
    PatternSpec::new("FlowIpv6", "flow_label", 0, Some(Range::new(0, 1_048_575)));
static IPV6_PAYLOAD_LENGTH: PatternSpec<u32> = PatternSpec::with_auto("FlowIpv6", "payload_length", 0, 0, WORD);
static IPV6_NEXT_HEADER: PatternSpec<u32> = PatternSpec::with_auto("FlowIpv6", "next_header", 59, 59, BYTE);
static IPV6_HOP_LIMIT: PatternSpec<u32> = PatternSpec::new("FlowIpv6", "hop_limit", 64, BYTE);
static IPV6_SRC: PatternSpec<Ipv6Addr> = PatternSpec::new("FlowIpv6", "src", Ipv6Addr::UNSPECIFIED, None);
static IPV6_DST: PatternSpec<Ipv6Addr> = PatternSpec::new("FlowIpv6", "dst", Ipv6Addr::UNSPECIFIED, None);

header! {
    /// IPv6 fixed header.
    FlowIpv6, WireFlowIpv6 {
        version: PatternField<u32> => WirePattern = IPV6_VERSION,
        traffic_class: PatternField<u32> => WirePattern = IPV6_TRAFFIC_CLASS,
        flow_label: PatternField<u32> => WirePattern = IPV6_FLOW_LABEL,
        payload_length: PatternField<u32> => WirePattern = IPV6_PAYLOAD_LENGTH,
        next_header: PatternField<u32> => WirePattern = IPV6_NEXT_HEADER,
        hop_limit: PatternField<u32> => WirePattern = IPV6_HOP_LIMIT,
        src: PatternField<Ipv6Addr> => WirePattern = IPV6_SRC,
        dst: PatternField<Ipv6Addr> => WirePattern = IPV6_DST,
    }
}

static UDP_SRC_PORT: PatternSpec<u32> = PatternSpec::new("FlowUdp", "src_port", 0, WORD);
static UDP_DST_PORT: PatternSpec<u32> = PatternSpec::new("FlowUdp", "dst_port", 0, WORD);
static UDP_LENGTH: PatternSpec<u32> = PatternSpec::with_auto("FlowUdp", "length", 0, 0, WORD);
static UDP_CHECKSUM: ChecksumSpec = ChecksumSpec::new("FlowUdp", "checksum", 65535);

header! {
    /// UDP header.
    FlowUdp, WireFlowUdp {
        src_port: PatternField<u32> => WirePattern = UDP_SRC_PORT,
        dst_port: PatternField<u32> => WirePattern = UDP_DST_PORT,
        length: PatternField<u32> => WirePattern = UDP_LENGTH,
        checksum: ChecksumField => WireChecksum = UDP_CHECKSUM,
    }
}

/// Opaque header given as raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowCustom {
    /// `0x`-prefixed hex string.
    pub bytes: String,
}

impl FlowCustom {
    pub fn new(bytes: impl Into<String>) -> Self {
        FlowCustom { bytes: bytes.into() }
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, ScalarError> {
        parser::parse_hex(&self.bytes)
    }
}

impl Message for FlowCustom {
    type Wire = FlowCustom;

    fn from_wire(wire: FlowCustom, _ctx: &mut ValidationContext) -> Self {
        wire
    }

    fn to_wire(&self) -> FlowCustom {
        self.clone()
    }

    fn validate(&self, ctx: &mut ValidationContext) {
        if validate_required(ctx, "FlowCustom.bytes", &self.bytes) {
            validate_hex(ctx, "FlowCustom.bytes", &self.bytes);
        }
    }
}

pub const ETHERNET: &str = "ethernet";
pub const VLAN: &str = "vlan";
pub const IPV4: &str = "ipv4";
pub const IPV6: &str = "ipv6";
pub const UDP: &str = "udp";
pub const CUSTOM: &str = "custom";

pub static FLOW_HEADER: ChoiceSpec = ChoiceSpec {
    type_name: "FlowHeader",
    field: "choice",
    variants: &[
        VariantSpec::stable(ETHERNET),
        VariantSpec::stable(VLAN),
        VariantSpec::stable(IPV4),
        VariantSpec::stable(IPV6),
        VariantSpec::stable(UDP),
        VariantSpec::stable(CUSTOM),
    ],
    default: Some(ETHERNET),
    required: false,
};

/// One header of a flow's packet.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowHeader {
    Ethernet(FlowEthernet),
    Vlan(FlowVlan),
    Ipv4(FlowIpv4),
    Ipv6(FlowIpv6),
    Udp(FlowUdp),
    Custom(FlowCustom),
}

impl Choice for FlowHeader {
    type Schema = ChoiceSpec;

    fn spec(schema: &ChoiceSpec) -> &ChoiceSpec {
        schema
    }

    fn variant(&self) -> &'static str {
        match self {
            FlowHeader::Ethernet(_) => ETHERNET,
            FlowHeader::Vlan(_) => VLAN,
            FlowHeader::Ipv4(_) => IPV4,
            FlowHeader::Ipv6(_) => IPV6,
            FlowHeader::Udp(_) => UDP,
            FlowHeader::Custom(_) => CUSTOM,
        }
    }

    fn default_for(variant: &str, _schema: &ChoiceSpec) -> Option<Self> {
        match variant {
            ETHERNET => Some(FlowHeader::Ethernet(FlowEthernet::new())),
            VLAN => Some(FlowHeader::Vlan(FlowVlan::new())),
            IPV4 => Some(FlowHeader::Ipv4(FlowIpv4::new())),
            IPV6 => Some(FlowHeader::Ipv6(FlowIpv6::new())),
            UDP => Some(FlowHeader::Udp(FlowUdp::new())),
            CUSTOM => Some(FlowHeader::Custom(FlowCustom::default())),
            _ => None,
        }
    }

    fn validate(&self, _schema: &ChoiceSpec, ctx: &mut ValidationContext) {
        match self {
            FlowHeader::Ethernet(h) => h.validate(ctx),
            FlowHeader::Vlan(h) => h.validate(ctx),
            FlowHeader::Ipv4(h) => h.validate(ctx),
            FlowHeader::Ipv6(h) => h.validate(ctx),
            FlowHeader::Udp(h) => h.validate(ctx),
            FlowHeader::Custom(h) => h.validate(ctx),
        }
    }
}

pub type FlowHeaderField = ChoiceField<FlowHeader>;

impl ChoiceField<FlowHeader> {
    pub fn header(header: FlowHeader) -> Self {
        ChoiceField::with(&FLOW_HEADER, header)
    }

    pub fn ethernet(&self) -> Option<&FlowEthernet> {
        match self.peek() {
            Some(FlowHeader::Ethernet(h)) => Some(h),
            _ => None,
        }
    }

    pub fn ipv4(&self) -> Option<&FlowIpv4> {
        match self.peek() {
            Some(FlowHeader::Ipv4(h)) => Some(h),
            _ => None,
        }
    }

    pub fn ipv6(&self) -> Option<&FlowIpv6> {
        match self.peek() {
            Some(FlowHeader::Ipv6(h)) => Some(h),
            _ => None,
        }
    }

    pub fn udp(&self) -> Option<&FlowUdp> {
        match self.peek() {
            Some(FlowHeader::Udp(h)) => Some(h),
            _ => None,
        }
    }

    /// Switches the header to IPv4 (with defaults) unless it already is one.
    pub fn ipv4_or_default(&mut self) -> &mut FlowIpv4 {
        ipv4_slot(self.get_or_insert_with(|| FlowHeader::Ipv4(FlowIpv4::new())))
    }

    pub fn ethernet_or_default(&mut self) -> &mut FlowEthernet {
        ethernet_slot(self.get_or_insert_with(|| FlowHeader::Ethernet(FlowEthernet::new())))
    }
}

fn ipv4_slot(header: &mut FlowHeader) -> &mut FlowIpv4 {
    match header {
        FlowHeader::Ipv4(h) => h,
        _ => {
            *header = FlowHeader::Ipv4(FlowIpv4::new());
            ipv4_slot(header)
        }
    }
}

fn ethernet_slot(header: &mut FlowHeader) -> &mut FlowEthernet {
    match header {
        FlowHeader::Ethernet(h) => h,
        _ => {
            *header = FlowHeader::Ethernet(FlowEthernet::new());
            ethernet_slot(header)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireFlowHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethernet: Option<WireFlowEthernet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<WireFlowVlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<WireFlowIpv4>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<WireFlowIpv6>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<WireFlowUdp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<FlowCustom>,
}

impl ChoiceSlots for WireFlowHeader {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        let slots = [
            (ETHERNET, self.ethernet.is_some()),
            (VLAN, self.vlan.is_some()),
            (IPV4, self.ipv4.is_some()),
            (IPV6, self.ipv6.is_some()),
            (UDP, self.udp.is_some()),
            (CUSTOM, self.custom.is_some()),
        ];
        slots.iter().filter(|(_, set)| *set).map(|(name, _)| *name).collect()
    }
}

impl WireChoice<FlowHeader> for WireFlowHeader {
    fn take(self, variant: &'static str, _schema: &ChoiceSpec, ctx: &mut ValidationContext) -> Option<FlowHeader> {
        match variant {
            ETHERNET => self.ethernet.map(|w| FlowHeader::Ethernet(FlowEthernet::from_wire(w, ctx))),
            VLAN => self.vlan.map(|w| FlowHeader::Vlan(FlowVlan::from_wire(w, ctx))),
            IPV4 => self.ipv4.map(|w| FlowHeader::Ipv4(FlowIpv4::from_wire(w, ctx))),
            IPV6 => self.ipv6.map(|w| FlowHeader::Ipv6(FlowIpv6::from_wire(w, ctx))),
            UDP => self.udp.map(|w| FlowHeader::Udp(FlowUdp::from_wire(w, ctx))),
            CUSTOM => self.custom.map(FlowHeader::Custom),
            _ => None,
        }
    }

    fn from_choice(choice: &FlowHeader) -> Self {
        let mut wire = WireFlowHeader {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match choice {
            FlowHeader::Ethernet(h) => wire.ethernet = Some(h.to_wire()),
            FlowHeader::Vlan(h) => wire.vlan = Some(h.to_wire()),
            FlowHeader::Ipv4(h) => wire.ipv4 = Some(h.to_wire()),
            FlowHeader::Ipv6(h) => wire.ipv6 = Some(h.to_wire()),
            FlowHeader::Udp(h) => wire.udp = Some(h.to_wire()),
            FlowHeader::Custom(h) => wire.custom = Some(h.clone()),
        }
        wire
    }
}
