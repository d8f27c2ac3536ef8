// tests/integration/config_test.rs

use ringforge::config::{DeploymentOptions, PropertySource, SystemProperties, keys};
use ringforge::core::errors::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn load(contents: &str, overrides: &SystemProperties) -> Result<DeploymentOptions, ConfigError> {
    let source = PropertySource::parse(contents)?;
    let mut options = DeploymentOptions::new();
    options.load(&source, overrides)?;
    Ok(options)
}

#[test]
fn test_defaults_apply_when_source_is_empty() {
    let options = assert_ok!(load("", &SystemProperties::new()));
    assert!(options.is_loaded());
    assert_eq!(options.bundle_file_name(), PathBuf::from("storage-bundle"));
    assert_eq!(options.bundle_name(), "storage-node");
    assert_eq!(options.bundle_version(), "1.0");
    assert_eq!(options.cluster_dir(), PathBuf::from("storage_cluster"));
    assert_eq!(options.num_nodes(), 2);
    assert!(options.auto_deploy());
    assert!(options.embedded());
    assert_eq!(options.logging_level(), "INFO");
    assert_eq!(options.ring_delay(), None);
    assert_eq!(options.num_tokens(), 1);
    assert_eq!(options.native_transport_port(), 9042);
    assert_eq!(options.native_transport_max_threads(), 64);
    assert_eq!(options.rpc_port(), 9160);
    assert!(options.start_rpc());
    assert_eq!(options.jmx_port(), 7200);
    assert_eq!(options.storage_port(), 7000);
    assert_eq!(options.ssl_storage_port(), 7001);
    assert_eq!(options.username(), "storage");
    assert_eq!(options.password(), "storage");
    assert_eq!(options.authenticator(), "AllowAllAuthenticator");
    assert_eq!(options.authorizer(), "AllowAllAuthorizer");
    assert_eq!(options.heap_size(), None);
    assert!(options.seeds().is_empty());
    assert_eq!(options.launcher_script(), "cassandra");
    assert_eq!(options.verify_timeout(), None);
}

#[test]
fn test_nested_and_flat_keys_are_both_read() {
    let contents = r#"
"rpc-port" = 9999
"cluster.dir" = "/tmp/flat"

[cluster]
num-nodes = 4
auto-deploy = false
verify-timeout-ms = 1500

[ring]
delay = 250
"#;
    let options = assert_ok!(load(contents, &SystemProperties::new()));
    assert_eq!(options.rpc_port(), 9999);
    assert_eq!(options.cluster_dir(), PathBuf::from("/tmp/flat"));
    assert_eq!(options.num_nodes(), 4);
    assert!(!options.auto_deploy());
    assert_eq!(options.verify_timeout(), Some(Duration::from_millis(1500)));
    assert_eq!(options.ring_delay(), Some(Duration::from_millis(250)));
}

#[test]
fn test_flat_key_wins_over_nested_key() {
    let contents = r#"
"cluster.num-nodes" = 5

[cluster]
num-nodes = 3
"#;
    let options = assert_ok!(load(contents, &SystemProperties::new()));
    assert_eq!(options.num_nodes(), 5);
}

#[test]
fn test_system_property_overrides_file_value() {
    let overrides = SystemProperties::new().with(keys::NUM_NODES, "3");
    let options = assert_ok!(load("[cluster]\nnum-nodes = 7\n", &overrides));
    assert_eq!(options.num_nodes(), 3);
}

#[test]
fn test_empty_system_property_falls_back_to_file() {
    let overrides = SystemProperties::new().with(keys::NUM_NODES, "");
    let options = assert_ok!(load("[cluster]\nnum-nodes = 7\n", &overrides));
    assert_eq!(options.num_nodes(), 7);
}

#[test]
fn test_environment_variables_are_normalized() {
    let overrides = SystemProperties::from_vars(vec![
        ("RINGFORGE_CLUSTER_NUM_NODES".to_string(), "6".to_string()),
        ("RINGFORGE_JMX_PORT".to_string(), "8100".to_string()),
        ("CLUSTER_NUM_NODES".to_string(), "99".to_string()),
        ("PATH".to_string(), "/usr/bin".to_string()),
    ]);
    assert_eq!(overrides.get("cluster.num-nodes"), Some("6"));
    assert_eq!(overrides.get("jmx-port"), Some("8100"));
    assert_eq!(overrides.get("path"), None);

    let options = assert_ok!(load("", &overrides));
    assert_eq!(options.num_nodes(), 6);
    assert_eq!(options.jmx_port(), 8100);
}

#[test]
fn test_parse_define() {
    assert_eq!(
        SystemProperties::parse_define("-Dcluster.num-nodes=3"),
        Some(("cluster.num-nodes".to_string(), "3".to_string()))
    );
    assert_eq!(
        SystemProperties::parse_define("-Dseeds=a=b"),
        Some(("seeds".to_string(), "a=b".to_string()))
    );
    assert_eq!(SystemProperties::parse_define("-Dmissing-equals"), None);
    assert_eq!(SystemProperties::parse_define("-D=value"), None);
    assert_eq!(SystemProperties::parse_define("--config"), None);
}

#[test]
fn test_pre_seeded_value_wins_over_every_source() {
    let mut options = DeploymentOptions::new();
    options.set_num_nodes(9);
    let source = assert_ok!(PropertySource::parse("[cluster]\nnum-nodes = 4\n"));
    let overrides = SystemProperties::new().with(keys::NUM_NODES, "5");
    assert_ok!(options.load(&source, &overrides));
    assert_eq!(options.num_nodes(), 9);
}

#[test]
fn test_setters_are_first_write_wins() {
    let mut options = DeploymentOptions::new();
    options.set_rpc_port(1111);
    options.set_rpc_port(2222);
    options.set_logging_level("DEBUG".to_string());
    options.set_logging_level("TRACE".to_string());
    assert_eq!(options.rpc_port(), 1111);
    assert_eq!(options.logging_level(), "DEBUG");
}

#[test]
fn test_second_load_is_a_no_op() {
    let mut options = assert_ok!(load("[cluster]\nnum-nodes = 3\n", &SystemProperties::new()));
    let other = assert_ok!(PropertySource::parse("[cluster]\nnum-nodes = \"not-a-number\"\n"));
    assert_ok!(options.load(&other, &SystemProperties::new()));
    assert_eq!(options.num_nodes(), 3);
}

#[test]
fn test_merge_keeps_existing_values() {
    let mut base = DeploymentOptions::new();
    base.set_rpc_port(1234);

    let mut other = DeploymentOptions::new();
    other.set_rpc_port(4321);
    other.set_num_nodes(3);
    other.set_seeds("10.0.0.1,10.0.0.2".to_string());

    base.merge(&other);
    assert_eq!(base.rpc_port(), 1234);
    assert_eq!(base.num_nodes(), 3);
    assert_eq!(base.seeds(), vec!["10.0.0.1", "10.0.0.2"]);
}

#[test]
fn test_invalid_integer_is_rejected() {
    let err = assert_err!(load("\"rpc-port\" = \"ninety\"\n", &SystemProperties::new()));
    match err {
        ConfigError::InvalidInteger { key, value } => {
            assert_eq!(key, keys::RPC_PORT);
            assert_eq!(value, "ninety");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_port_out_of_range_is_rejected() {
    let err = assert_err!(load("\"jmx-port\" = 70000\n", &SystemProperties::new()));
    assert!(matches!(err, ConfigError::InvalidInteger { .. }));
}

#[test]
fn test_invalid_bool_is_rejected() {
    let err = assert_err!(load("[cluster]\nauto-deploy = \"yes\"\n", &SystemProperties::new()));
    assert!(matches!(err, ConfigError::InvalidBool { .. }));

    let options = assert_ok!(load(
        "[cluster]\nauto-deploy = \"FALSE\"\n",
        &SystemProperties::new()
    ));
    assert!(!options.auto_deploy());
}

#[test]
fn test_parse_error_is_raised_even_when_pre_seeded() {
    let mut options = DeploymentOptions::new();
    options.set_num_nodes(3);
    let source = assert_ok!(PropertySource::parse("[cluster]\nnum-nodes = \"three\"\n"));
    let err = assert_err!(options.load(&source, &SystemProperties::new()));
    assert!(matches!(err, ConfigError::InvalidInteger { .. }));
    assert!(!options.is_loaded());
}

#[test]
fn test_node_count_bounds() {
    let err = assert_err!(load("[cluster]\nnum-nodes = 0\n", &SystemProperties::new()));
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = assert_err!(load("[cluster]\nnum-nodes = 255\n", &SystemProperties::new()));
    assert!(matches!(err, ConfigError::Invalid(_)));

    assert_ok!(load("[cluster]\nnum-nodes = 254\n", &SystemProperties::new()));

    // External clusters are not bound by the loopback address space.
    assert_ok!(load(
        "[cluster]\nnum-nodes = 300\nis-embedded = false\n",
        &SystemProperties::new()
    ));
}

#[test]
fn test_zero_tokens_is_rejected() {
    let err = assert_err!(load("[node]\nnum-tokens = 0\n", &SystemProperties::new()));
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_jmx_port_range_must_fit_every_node() {
    let err = assert_err!(load(
        "\"jmx-port\" = 65535\n[cluster]\nnum-nodes = 2\n",
        &SystemProperties::new()
    ));
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let err = assert_err!(PropertySource::parse("[cluster\nnum-nodes = 3"));
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = assert_err!(DeploymentOptions::from_file(
        dir.path().join("absent.toml"),
        &SystemProperties::new()
    ));
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_from_file_reads_the_resource() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ringforge.toml");
    std::fs::write(
        &path,
        "seeds = \"db1, db2 ,,db3\"\n[cluster]\nis-embedded = false\n",
    )
    .unwrap();
    let options = assert_ok!(DeploymentOptions::from_file(&path, &SystemProperties::new()));
    assert!(!options.embedded());
    assert_eq!(options.seeds(), vec!["db1", "db2", "db3"]);
}

#[test]
fn test_to_properties_omits_unset_optionals() {
    let options = assert_ok!(load("\"heap-size\" = \"512M\"\n", &SystemProperties::new()));
    let props = options.to_properties();
    assert_eq!(props.get(keys::RPC_PORT).map(String::as_str), Some("9160"));
    assert_eq!(props.get(keys::HEAP_SIZE).map(String::as_str), Some("512M"));
    assert!(!props.contains_key(keys::HEAP_NEW_SIZE));
    assert!(!props.contains_key(keys::RING_DELAY));
}

#[test]
fn test_override_of_five_beats_file_value_of_three() {
    let overrides = SystemProperties::new().with("cluster.num-nodes", "5");
    let options = assert_ok!(load("[cluster]\nnum-nodes = 3\n", &overrides));
    assert_eq!(options.num_nodes(), 5);
    assert_eq!(options.to_properties()[keys::NUM_NODES], "5");
}
