//! Integration tests: decode JSON/YAML configurations, choice resolution, validation reports,
//! and resolve -> encode -> decode round trips.

use std::net::{Ipv4Addr, Ipv6Addr};
use trafficmodel::codec::{self, CodecError, Encoding};
use trafficmodel::flow::{FixedPackets, CONTINUOUS};
use trafficmodel::pattern::Counter;
use trafficmodel::schema::{AUTO, INCREMENT, VALUE};
use trafficmodel::{
    Ambiguity, Config, FlowDuration, FlowHeader, FlowIpv4, FlowRate, FlowSize, Generated, MacAddress, Message,
    TxRx, ValidationContext, ValidationOptions,
};

const BASIC_YAML: &str = r#"
flows:
  - name: f1
    tx_rx:
      port:
        tx_name: p1
        rx_name: p2
    packet:
      - ethernet:
          src:
            value: "00:11:22:33:44:55"
      - ipv4:
          src:
            increment:
              start: 10.0.0.1
              step: 0.0.0.1
              count: 100
          dst:
            values: ["192.0.2.1", "192.0.2.2"]
          time_to_live:
            value: 32
      - udp:
          dst_port:
            decrement:
              start: 5000
              step: 2
              count: 10
          checksum:
            generated: bad
    rate:
      percentage: 50
    duration:
      fixed_packets:
        packets: 1000
"#;

const IPV6_JSON: &str = r#"{
  "flows": [{
    "name": "v6",
    "tx_rx": {"choice": "device", "device": {"tx_names": ["d1"], "rx_names": ["d2"]}},
    "packet": [
      {"choice": "ipv6", "ipv6": {
        "src": {"choice": "increment", "increment": {"start": "2001:db8::1", "step": "::1", "count": 4}},
        "flow_label": {"value": 1048575},
        "hop_limit": {"choice": "value"}
      }}
    ]
  }]
}"#;

fn options() -> ValidationOptions {
    ValidationOptions::default()
}

#[test]
fn test_decode_yaml_config() {
    let decoded = codec::from_yaml::<Config>(BASIC_YAML, options()).expect("decode");
    assert!(decoded.is_ok(), "{}", decoded.report);
    assert!(decoded.report.warnings.is_empty());

    let flow = decoded.message.flow("f1").expect("flow f1");
    match flow.tx_rx.peek() {
        Some(TxRx::Port(p)) => {
            assert_eq!(p.tx_name, "p1");
            assert_eq!(p.rx_name.as_deref(), Some("p2"));
        }
        other => panic!("unexpected tx_rx {:?}", other),
    }
    assert_eq!(flow.packet.len(), 3);

    let eth = flow.packet[0].ethernet().expect("ethernet");
    assert_eq!(eth.src.value(), Some(MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55])));
    assert_eq!(eth.dst.active_variant(), Some(AUTO));

    let ip = flow.packet[1].ipv4().expect("ipv4");
    assert_eq!(
        ip.src.increment(),
        Some(&Counter::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(0, 0, 0, 1), 100))
    );
    assert_eq!(
        ip.dst.values(),
        Some(&[Ipv4Addr::new(192, 0, 2, 1), Ipv4Addr::new(192, 0, 2, 2)][..])
    );
    assert_eq!(ip.time_to_live.value(), Some(32));
    assert_eq!(ip.header_checksum.generated(), Some(Generated::Good));

    let udp = flow.packet[2].udp().expect("udp");
    assert_eq!(
        udp.dst_port.materialize().map(|v| v[..3].to_vec()),
        Some(vec![5000, 4998, 4996])
    );
    assert_eq!(udp.checksum.generated(), Some(Generated::Bad));

    assert_eq!(flow.size.peek(), Some(&FlowSize::Fixed(64)));
    assert_eq!(flow.rate.peek(), Some(&FlowRate::Percentage(50.0)));
    assert_eq!(
        flow.duration.peek(),
        Some(&FlowDuration::FixedPackets(FixedPackets { packets: 1000, gap: 12 }))
    );
}

#[test]
fn test_decode_json_ipv6_device() {
    let decoded = codec::from_json::<Config>(IPV6_JSON, options()).expect("decode");
    assert!(decoded.is_ok(), "{}", decoded.report);
    let flow = &decoded.message.flows[0];
    assert!(matches!(flow.tx_rx.peek(), Some(TxRx::Device(_))));
    let ip = flow.packet[0].ipv6().expect("ipv6");
    let base: Ipv6Addr = "2001:db8::1".parse().expect("addr");
    assert_eq!(
        ip.src.materialize(),
        Some(vec![
            base,
            "2001:db8::2".parse().expect("addr"),
            "2001:db8::3".parse().expect("addr"),
            "2001:db8::4".parse().expect("addr"),
        ])
    );
    assert_eq!(ip.flow_label.value(), Some(1_048_575));
    assert_eq!(ip.hop_limit.value(), Some(64));
    assert_eq!(flow.duration.active_variant(), Some(CONTINUOUS));
}

#[test]
fn test_report_collects_all_errors() {
    let json = r#"{"flows": [
        {"name": "a", "tx_rx": {"port": {"tx_name": "p1"}}, "packet": [
            {"ipv4": {"time_to_live": {"value": 256}, "src": {"value": "10.0.0.256"}}},
            {"vlan": {"id": {"choice": "auto"}}}
        ]},
        {"name": "a", "tx_rx": {"port": {"tx_name": ""}}}
    ]}"#;
    let decoded = codec::from_json::<Config>(json, options()).expect("decode");
    let errors = &decoded.report.errors;
    assert!(!decoded.is_ok());
    assert!(errors.contains(&"invalid ipv4 address `10.0.0.256` on flows[0].packet[0].FlowIpv4.src".to_string()));
    assert!(errors.contains(&"invalid choice `auto` for flows[0].packet[1].FlowVlan.id, expected one of [value, values, increment, decrement]".to_string()));
    assert!(errors.contains(&"0 <= flows[0].packet[0].FlowIpv4.time_to_live <= 255 but Got 256".to_string()));
    assert!(errors.contains(&"flows[1].Flow.name: duplicate name `a`".to_string()));
    assert!(errors.contains(&"flows[1].FlowPort.tx_name is a required field".to_string()));
    assert_eq!(errors.len(), 5, "{}", decoded.report);
}

#[test]
fn test_invalid_choice_falls_back_to_default_variant() {
    let json = r#"{"flows": [{"name": "f", "tx_rx": {"port": {"tx_name": "p"}},
        "packet": [{"vlan": {"id": {"choice": "auto"}}}]}]}"#;
    let decoded = codec::from_json::<Config>(json, options()).expect("decode");
    let vlan = match decoded.message.flows[0].packet[0].peek() {
        Some(FlowHeader::Vlan(v)) => v.clone(),
        other => panic!("unexpected header {:?}", other),
    };
    assert_eq!(vlan.id.active_variant(), Some(VALUE));
    assert_eq!(vlan.id.value(), Some(1));
}

#[test]
fn test_same_fault_in_two_flows_reported_per_flow() {
    let yaml = r#"
flows:
  - name: a
    tx_rx: { port: { tx_name: p1 } }
    packet: [ { ipv4: { time_to_live: { value: 300 } } } ]
  - name: b
    tx_rx: { port: { tx_name: p2 } }
    packet: [ { ethernet: {} }, { ipv4: { time_to_live: { value: 300 } } } ]
"#;
    let decoded = codec::from_yaml::<Config>(yaml, options()).expect("decode");
    assert_eq!(
        decoded.report.errors,
        vec![
            "0 <= flows[0].packet[0].FlowIpv4.time_to_live <= 255 but Got 300".to_string(),
            "0 <= flows[1].packet[1].FlowIpv4.time_to_live <= 255 but Got 300".to_string(),
        ]
    );
}

#[test]
fn test_missing_required_choice_reported_once() {
    let decoded = codec::from_json::<Config>(r#"{"flows": [{"name": "a"}, {"name": "b"}]}"#, options())
        .expect("decode");
    assert_eq!(
        decoded.report.errors,
        vec![
            "flows[0].FlowTxRx.choice is a required field".to_string(),
            "flows[1].FlowTxRx.choice is a required field".to_string(),
        ]
    );
}

#[test]
fn test_undeclared_auto_slot_is_reported() {
    let json = r#"{"flows": [{"name": "f", "tx_rx": {"port": {"tx_name": "p"}},
        "packet": [{"ipv4": {"time_to_live": {"auto": 5}, "protocol": {"auto": 6}}}]}]}"#;
    let decoded = codec::from_json::<Config>(json, options()).expect("decode");
    assert_eq!(
        decoded.report.errors,
        vec![
            "invalid choice `auto` for flows[0].packet[0].FlowIpv4.time_to_live, expected one of [value, values, increment, decrement]"
                .to_string()
        ]
    );
    let ip = decoded.message.flows[0].packet[0].ipv4().expect("ipv4");
    assert_eq!(ip.time_to_live.value(), Some(64));
    assert_eq!(ip.protocol.auto(), Some(6));

    let text = codec::to_json(&decoded.message).expect("encode");
    let again = codec::from_json::<Config>(&text, options()).expect("decode again");
    assert!(again.is_ok(), "{}", again.report);
    assert_eq!(again.message, decoded.message);
}

#[test]
fn test_auto_placeholder_out_of_range() {
    let json = r#"{"flows": [{"name": "f", "tx_rx": {"port": {"tx_name": "p"}},
        "packet": [{"ethernet": {"ether_type": {"auto": 70000}}}]}]}"#;
    let decoded = codec::from_json::<Config>(json, options()).expect("decode");
    assert_eq!(
        decoded.report.errors,
        vec!["0 <= flows[0].packet[0].FlowEthernet.ether_type <= 65535 but Got 70000".to_string()]
    );
}

#[test]
fn test_ambiguous_choice_policy() {
    let json = r#"{"flows": [{"name": "f", "tx_rx": {"port": {"tx_name": "p"}},
        "rate": {"pps": 10, "gbps": 1}}]}"#;

    let strict = codec::from_json::<Config>(json, options()).expect("decode");
    assert_eq!(
        strict.report.errors,
        vec!["flows[0].FlowRate.choice: choice not matching with property (choice unset, populated pps, gbps)".to_string()]
    );
    assert_eq!(strict.message.flows[0].rate.peek(), Some(&FlowRate::Pps(10)));

    let lenient_options = ValidationOptions {
        ambiguity: Ambiguity::FirstWins,
        ..Default::default()
    };
    let lenient = codec::from_json::<Config>(json, lenient_options).expect("decode");
    assert!(lenient.is_ok());
    assert_eq!(lenient.message.flows[0].rate.peek(), Some(&FlowRate::Pps(10)));
}

#[test]
fn test_declared_choice_disagrees_with_payload() {
    let json = r#"{"flows": [{"name": "f", "tx_rx": {"port": {"tx_name": "p"}},
        "size": {"choice": "increment", "fixed": 128}}]}"#;
    let decoded = codec::from_json::<Config>(json, options()).expect("decode");
    assert_eq!(
        decoded.report.errors,
        vec!["flows[0].FlowSize.choice: choice not matching with property (choice increment, populated fixed)".to_string()]
    );
    assert_eq!(decoded.message.flows[0].size.peek(), Some(&FlowSize::Fixed(128)));
}

#[test]
fn test_deprecated_and_under_review_warnings() {
    let yaml = r#"
flows:
  - name: f
    tx_rx: { port: { tx_name: p } }
    size: { random: { min: 64, max: 128 } }
    duration: { fixed_seconds: { seconds: 2.5 } }
"#;
    let decoded = codec::from_yaml::<Config>(yaml, options()).expect("decode");
    assert!(decoded.is_ok());
    assert_eq!(decoded.report.warnings.len(), 2, "{}", decoded.report);

    let promoted = ValidationOptions {
        warnings_as_errors: true,
        ..Default::default()
    };
    let decoded = codec::from_yaml::<Config>(yaml, promoted).expect("decode");
    assert!(!decoded.is_ok());
}

#[test]
fn test_round_trip_json_and_yaml() {
    let first = codec::from_yaml::<Config>(BASIC_YAML, options()).expect("decode");
    for encoding in [Encoding::Json, Encoding::Yaml] {
        let text = codec::encode(&first.message, encoding).expect("encode");
        let mut ctx = ValidationContext::default();
        let second: Config = codec::decode(&text, encoding, &mut ctx).expect("decode again");
        assert!(!ctx.has_errors());
        assert_eq!(second, first.message);
    }
}

#[test]
fn test_encoded_form_carries_discriminators() {
    let mut config = Config::new();
    let flow = config.add_flow("f1");
    flow.set_port("p1", None);
    flow.push_header(FlowHeader::Ipv4(FlowIpv4::new()))
        .ipv4_or_default()
        .src
        .increment_or_default()
        .count = 5;
    let json: serde_json::Value = serde_json::from_str(&codec::to_json(&config).expect("encode")).expect("json");
    let src = &json["flows"][0]["packet"][0]["ipv4"]["src"];
    assert_eq!(src["choice"], INCREMENT);
    assert_eq!(src["increment"]["start"], "0.0.0.0");
    assert_eq!(src["increment"]["step"], "0.0.0.1");
    assert_eq!(src["increment"]["count"], 5);
    assert!(src.get("value").is_none());
}

#[test]
fn test_defaults_are_idempotent() {
    let mut ctx = ValidationContext::default();
    let once = Config::from_wire(
        serde_json::from_str(r#"{"flows": [{"name": "f", "packet": [{}]}]}"#).expect("wire"),
        &mut ctx,
    );
    let twice = Config::from_wire(once.to_wire(), &mut ctx);
    assert_eq!(once, twice);
    assert!(twice.flows[0].packet[0].ethernet().is_some());
}

#[test]
fn test_apply_defaults_disabled_leaves_choices_unset() {
    let options = ValidationOptions {
        apply_defaults: false,
        ..Default::default()
    };
    let decoded =
        codec::from_json::<Config>(r#"{"flows": [{"name": "f", "tx_rx": {"port": {"tx_name": "p"}}}]}"#, options)
            .expect("decode");
    let flow = &decoded.message.flows[0];
    assert!(!flow.size.is_set());
    assert!(!flow.rate.is_set());
    assert!(decoded.is_ok());
}

#[test]
fn test_load_rejects_unknown_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.txt");
    std::fs::write(&path, "flows: []").expect("write");
    assert!(matches!(
        codec::load::<Config>(&path, options()),
        Err(CodecError::UnknownFormat(_))
    ));
}

#[test]
fn test_load_yaml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, BASIC_YAML).expect("write");
    let decoded = codec::load::<Config>(&path, options()).expect("load");
    assert!(decoded.is_ok());
    assert_eq!(decoded.message.flows.len(), 1);
}
