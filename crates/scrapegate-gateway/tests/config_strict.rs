#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use scrapegate_gateway::config::{self, TelemetryKind};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
telemetry:
  hosts:
    default:
      kind: json
      pathh: "/telemetry" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.bind().unwrap().to_string(), "0.0.0.0:9348");
    assert_eq!(cfg.gateway.gzip_pool_capacity, 16);
    assert!(cfg.telemetry.hosts.is_empty());
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(err.to_string().contains("version"));
}

#[test]
fn host_lookup_falls_back_to_default() {
    let cfg = config::load_from_str(
        r#"
version: 1
gateway:
  address: "127.0.0.1"
  port: 9000
telemetry:
  timeout_ms: 2000
  hosts:
    default:
      kind: json
    "10.0.0.5":
      kind: text
      scheme: https
      port: 9100
      path: "/metrics"
"#,
    )
    .expect("must parse");

    assert_eq!(cfg.gateway.bind().unwrap().to_string(), "127.0.0.1:9000");

    let exact = cfg.telemetry.host("10.0.0.5").unwrap();
    assert_eq!(exact.kind, TelemetryKind::Text);
    assert_eq!(exact.url("10.0.0.5"), "https://10.0.0.5:9100/metrics");

    let fallback = cfg.telemetry.host("10.0.0.6").unwrap();
    assert_eq!(fallback.kind, TelemetryKind::Json);
    assert_eq!(fallback.url("10.0.0.6"), "http://10.0.0.6/telemetry");
}

#[test]
fn no_default_means_no_host() {
    let cfg = config::load_from_str(
        r#"
version: 1
telemetry:
  hosts:
    only-this: {}
"#,
    )
    .expect("must parse");
    assert!(cfg.telemetry.host("only-this").is_some());
    assert!(cfg.telemetry.host("other").is_none());
}

#[test]
fn ipv6_bind_address() {
    let cfg = config::load_from_str(
        r#"
version: 1
gateway:
  address: "::1"
  port: 9348
"#,
    )
    .expect("must parse");
    assert_eq!(cfg.gateway.bind().unwrap().to_string(), "[::1]:9348");
}

#[test]
fn out_of_range_values_are_rejected() {
    for bad in [
        "version: 1\ngateway:\n  gzip_pool_capacity: 0\n",
        "version: 1\ntelemetry:\n  timeout_ms: 5\n",
        "version: 1\ntelemetry:\n  hosts:\n    default: { scheme: ftp }\n",
        "version: 1\ntelemetry:\n  hosts:\n    default: { path: \"metrics\" }\n",
        "version: 1\ngateway:\n  address: \"not an ip\"\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.client_code().as_str(), "CONFIG", "{bad}");
    }
}
