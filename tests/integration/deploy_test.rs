// tests/integration/deploy_test.rs

use super::test_helpers::{
    BINARY_PAYLOAD, RecordingInstaller, RecordingLauncher, TestCluster,
};
use ringforge::config::{DeploymentOptions, PropertySource, SystemProperties};
use ringforge::core::deploy::installer::replace_tokens;
use ringforge::core::deploy::{
    BootstrapDeployer, DirectoryBundle, INSTALLED_MARKER, InstallSummary, TemplateInstaller,
    marker_path,
};
use ringforge::core::errors::DeployError;
use ringforge::core::ring;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio_test::{assert_err, assert_ok};

fn deployer(installer: Arc<RecordingInstaller>, launcher: Arc<RecordingLauncher>) -> BootstrapDeployer {
    BootstrapDeployer::new(Arc::new(DirectoryBundle), installer, launcher)
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

#[tokio::test]
async fn test_deploy_installs_every_node_in_ring_order() {
    let cluster = TestCluster::new();
    let options = cluster.options(3);
    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());

    let nodes = assert_ok!(deployer(installer.clone(), launcher.clone()).deploy(&options).await);

    assert_eq!(nodes.len(), 3);
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node.index, i);
        assert_eq!(node.address, format!("127.0.0.{}", i + 1));
        assert_eq!(node.path, cluster.node_path(i));
        assert!(node.path.join("conf").join("storage.yaml").is_file());
    }
    assert_eq!(installer.installed(), vec![0, 1, 2]);
    assert_eq!(launcher.launched(), vec![0, 1, 2]);
    assert!(marker_path(&cluster.cluster_dir).is_file());
}

#[tokio::test]
async fn test_deploy_substitutes_node_properties() {
    let cluster = TestCluster::new();
    let options = cluster.options(3);
    let launcher = Arc::new(RecordingLauncher::default());
    let deployer = BootstrapDeployer::new(
        Arc::new(DirectoryBundle),
        Arc::new(TemplateInstaller),
        launcher,
    );
    assert_ok!(deployer.deploy(&options).await);

    let conf = fs::read_to_string(cluster.node_path(1).join("conf").join("storage.yaml")).unwrap();
    let token = ring::initial_token(2, 3);
    let expected = format!(
        "listen_address: 127.0.0.2\n\
seeds: \"127.0.0.1,127.0.0.3\"\n\
initial_token: {token}\n\
jmx_port: 7201\n\
log_level: INFO\n\
untouched: ${{not.a.key}}\n"
    );
    assert_eq!(conf, expected);

    let script = fs::read_to_string(cluster.node_path(2).join("bin").join("cassandra")).unwrap();
    assert!(script.contains("# node 2"));

    let binary = fs::read(cluster.node_path(0).join("lib").join("engine.bin")).unwrap();
    assert_eq!(binary, BINARY_PAYLOAD);
}

#[cfg(unix)]
#[tokio::test]
async fn test_deploy_preserves_script_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let cluster = TestCluster::new();
    let script = cluster.template.join("bin").join("cassandra");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let options = cluster.options(1);
    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    assert_ok!(deployer(installer, launcher).deploy(&options).await);

    let mode = fs::metadata(cluster.node_path(0).join("bin").join("cassandra"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[tokio::test]
async fn test_single_node_seeds_itself() {
    let cluster = TestCluster::new();
    let options = cluster.options(1);
    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    assert_ok!(deployer(installer, launcher).deploy(&options).await);

    let conf = fs::read_to_string(cluster.node_path(0).join("conf").join("storage.yaml")).unwrap();
    assert!(conf.contains("seeds: \"127.0.0.1\""));
    assert!(conf.contains(&format!("initial_token: {}", ring::RING_SIZE)));
}

#[tokio::test]
async fn test_multiple_tokens_leave_initial_token_unset() {
    let cluster = TestCluster::new();
    let mut options = DeploymentOptions::new();
    options.set_cluster_dir(cluster.cluster_dir.clone());
    options.set_bundle_file_name(cluster.template.clone());
    options.set_num_tokens(256);
    assert_ok!(options.load(&PropertySource::default(), &SystemProperties::new()));

    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    assert_ok!(deployer(installer, launcher).deploy(&options).await);

    let conf = fs::read_to_string(cluster.node_path(0).join("conf").join("storage.yaml")).unwrap();
    assert!(conf.contains("initial_token: ${initial.token}"));
}

#[tokio::test]
async fn test_second_deploy_with_marker_is_a_no_op() {
    let cluster = TestCluster::new();
    let options = cluster.options(2);
    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    let deployer = deployer(installer.clone(), launcher.clone());

    let first = assert_ok!(deployer.deploy(&options).await);
    let conf = cluster.node_path(0).join("conf").join("storage.yaml");
    let marker = marker_path(&cluster.cluster_dir);
    let conf_mtime = modified(&conf);
    let marker_mtime = modified(&marker);

    let second = assert_ok!(deployer.deploy(&options).await);

    assert_eq!(first, second);
    assert_eq!(installer.installed(), vec![0, 1]);
    assert_eq!(launcher.launched(), vec![0, 1]);
    assert_eq!(modified(&conf), conf_mtime);
    assert_eq!(modified(&marker), marker_mtime);
}

#[tokio::test]
async fn test_marker_records_install_summary() {
    let cluster = TestCluster::new();
    let options = cluster.options(2);
    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    assert_ok!(deployer(installer, launcher).deploy(&options).await);

    let body = fs::read_to_string(cluster.cluster_dir.join(INSTALLED_MARKER)).unwrap();
    let summary: InstallSummary = serde_json::from_str(&body).unwrap();
    assert_eq!(summary.num_nodes, 2);
    assert_eq!(summary.hosts, vec!["127.0.0.1", "127.0.0.2"]);
    assert!(!summary.installed_at.is_empty());
}

#[tokio::test]
async fn test_install_failure_leaves_no_marker_and_next_deploy_purges() {
    let cluster = TestCluster::new();
    let options = cluster.options(3);

    let failing = Arc::new(RecordingInstaller::failing_at(1));
    let launcher = Arc::new(RecordingLauncher::default());
    let err = assert_err!(deployer(failing.clone(), launcher.clone()).deploy(&options).await);

    match err {
        DeployError::Install { node, path, .. } => {
            assert_eq!(node, 1);
            assert_eq!(path, cluster.node_path(1));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(failing.installed(), vec![0]);
    assert_eq!(launcher.launched(), vec![0]);
    assert!(!marker_path(&cluster.cluster_dir).exists());

    // Leftover state from the failed attempt must not survive the retry.
    let stale = cluster.cluster_dir.join("stale.txt");
    fs::write(&stale, "left behind").unwrap();

    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    let nodes = assert_ok!(deployer(installer.clone(), launcher.clone()).deploy(&options).await);

    assert_eq!(nodes.len(), 3);
    assert_eq!(installer.installed(), vec![0, 1, 2]);
    assert!(!stale.exists());
    assert!(marker_path(&cluster.cluster_dir).is_file());
}

#[tokio::test]
async fn test_launch_failure_does_not_abort_deploy() {
    let cluster = TestCluster::new();
    let options = cluster.options(3);
    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::failing_for(&[1]));

    let nodes = assert_ok!(deployer(installer, launcher.clone()).deploy(&options).await);

    assert_eq!(nodes.len(), 3);
    assert_eq!(launcher.launched(), vec![0, 1, 2]);
    assert!(marker_path(&cluster.cluster_dir).is_file());
}

#[tokio::test]
async fn test_missing_bundle_is_a_bundle_error() {
    let cluster = TestCluster::new();
    let mut options = DeploymentOptions::new();
    options.set_cluster_dir(cluster.cluster_dir.clone());
    options.set_bundle_file_name(cluster.root.path().join("no-such-bundle"));
    assert_ok!(options.load(&PropertySource::default(), &SystemProperties::new()));

    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    let err = assert_err!(deployer(installer.clone(), launcher).deploy(&options).await);

    assert!(matches!(err, DeployError::Bundle { .. }));
    assert!(installer.installed().is_empty());
    assert!(!marker_path(&cluster.cluster_dir).exists());
}

#[tokio::test]
async fn test_bundle_that_is_a_file_is_rejected() {
    let cluster = TestCluster::new();
    let archive = cluster.root.path().join("bundle.tar.gz");
    fs::write(&archive, b"not a directory").unwrap();
    let mut options = DeploymentOptions::new();
    options.set_cluster_dir(cluster.cluster_dir.clone());
    options.set_bundle_file_name(archive);
    assert_ok!(options.load(&PropertySource::default(), &SystemProperties::new()));

    let launcher = Arc::new(RecordingLauncher::default());
    let err = assert_err!(
        deployer(Arc::new(RecordingInstaller::new()), launcher)
            .deploy(&options)
            .await
    );
    match err {
        DeployError::Bundle { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::InvalidInput)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_options_are_rejected_before_touching_disk() {
    let cluster = TestCluster::new();
    let mut options = DeploymentOptions::new();
    options.set_cluster_dir(cluster.cluster_dir.clone());
    options.set_num_nodes(0);

    let installer = Arc::new(RecordingInstaller::new());
    let launcher = Arc::new(RecordingLauncher::default());
    let err = assert_err!(deployer(installer, launcher).deploy(&options).await);

    assert!(matches!(err, DeployError::Config(_)));
    assert!(!cluster.cluster_dir.exists());
}

#[test]
fn test_replace_tokens_edge_cases() {
    let mut props = BTreeMap::new();
    props.insert("a".to_string(), "1".to_string());

    assert_eq!(replace_tokens("${a}${a}", &props), "11");
    assert_eq!(replace_tokens("${missing} ${a}", &props), "${missing} 1");
    assert_eq!(replace_tokens("$${a}}", &props), "$1}");
    assert_eq!(replace_tokens("x ${a", &props), "x ${a");
    assert_eq!(replace_tokens("${}", &props), "${}");
    assert_eq!(replace_tokens("${a${a}", &props), "${a${a}");
}
