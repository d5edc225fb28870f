#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use vitals_core::BoundMode;
use vitals_gateway::config::{self, FailurePolicy, SinkKind};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
auth:
  secret: "s3cret"
publisher:
  intervl_ms: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
auth:
  secret: "s3cret"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8001");
    assert_eq!(cfg.store.bounds, BoundMode::Overwrite);
    assert_eq!(cfg.publisher.interval_ms, 5000);
    assert_eq!(cfg.publisher.on_failure, FailurePolicy::Stop);
    assert_eq!(cfg.publisher.sink.kind, SinkKind::Stdout);
    assert_eq!(cfg.auth.secret_bytes().unwrap(), b"s3cret");
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  max_body_bytes: 1024
auth:
  secret: "c2VjcmV0LWtleQ=="
  secret_encoding: base64
  leeway_secs: 5
  required_role: external
store:
  bounds: running
publisher:
  interval_ms: 250
  on_failure: continue
  sink:
    kind: file
    path: "/tmp/snapshot.json"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.auth.secret_bytes().unwrap(), b"secret-key");
    assert_eq!(cfg.auth.required_role.as_deref(), Some("external"));
    assert_eq!(cfg.store.bounds, BoundMode::Running);
    assert_eq!(cfg.publisher.on_failure, FailurePolicy::Continue);
    assert_eq!(cfg.publisher.sink.path.as_deref(), Some("/tmp/snapshot.json"));
}

#[test]
fn missing_auth_section_fails() {
    let err = config::load_from_str("version: 1\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_CONFIG");
}

#[test]
fn wrong_version_fails() {
    let bad = r#"
version: 2
auth:
  secret: "s3cret"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn range_checks() {
    let cases = [
        // empty secret
        "version: 1\nauth:\n  secret: \"\"\n",
        // bad base64
        "version: 1\nauth:\n  secret: \"***\"\n  secret_encoding: base64\n",
        // leeway too large
        "version: 1\nauth:\n  secret: x\n  leeway_secs: 3600\n",
        // interval too small
        "version: 1\nauth:\n  secret: x\npublisher:\n  interval_ms: 10\n",
        // file sink without path
        "version: 1\nauth:\n  secret: x\npublisher:\n  sink:\n    kind: file\n",
        // stdout sink with path
        "version: 1\nauth:\n  secret: x\npublisher:\n  sink:\n    kind: stdout\n    path: a.json\n",
        // body limit too small
        "version: 1\ngateway:\n  max_body_bytes: 1\nauth:\n  secret: x\n",
        // unknown bound mode
        "version: 1\nauth:\n  secret: x\nstore:\n  bounds: average\n",
    ];

    for yaml in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.client_code().as_str(), "INVALID_CONFIG", "yaml={yaml}");
    }
}

#[test]
fn debug_output_redacts_secret() {
    let cfg = config::load_from_str("version: 1\nauth:\n  secret: hunter2\n").unwrap();
    let dbg = format!("{cfg:?}");
    assert!(!dbg.contains("hunter2"));
}
