// src/config.rs

//! Manages deployment options: layered loading, sticky assignment, and validation.
//!
//! Every option is resolved from three layers. A value assigned through a setter before
//! [`DeploymentOptions::load`] always wins; otherwise a non-empty [`SystemProperties`]
//! override is used; otherwise the value from the TOML properties resource. Options
//! are "sticky": once a field holds a value, later assignments are ignored.

use crate::core::errors::ConfigError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variables with this prefix are treated as system-property overrides.
pub const PROPERTY_OVERRIDE_PREFIX: &str = "RINGFORGE_";

/// The largest cluster that fits in the synthesized `127.0.0.x` loopback range.
pub const MAX_EMBEDDED_NODES: usize = 254;

/// The property keys understood by [`DeploymentOptions`].
pub mod keys {
    pub const BUNDLE_FILE_NAME: &str = "bundle.file-name";
    pub const BUNDLE_NAME: &str = "bundle.name";
    pub const BUNDLE_VERSION: &str = "bundle.version";
    pub const CLUSTER_DIR: &str = "cluster.dir";
    pub const NUM_NODES: &str = "cluster.num-nodes";
    pub const AUTO_DEPLOY: &str = "cluster.auto-deploy";
    pub const EMBEDDED: &str = "cluster.is-embedded";
    pub const VERIFY_TIMEOUT: &str = "cluster.verify-timeout-ms";
    pub const LOGGING_LEVEL: &str = "logging.level";
    pub const RING_DELAY: &str = "ring.delay";
    pub const NUM_TOKENS: &str = "node.num-tokens";
    pub const NATIVE_TRANSPORT_PORT: &str = "native-transport-port";
    pub const NATIVE_TRANSPORT_MAX_THREADS: &str = "native-transport-max-threads";
    pub const RPC_PORT: &str = "rpc-port";
    pub const START_RPC: &str = "start-rpc";
    pub const JMX_PORT: &str = "jmx-port";
    pub const STORAGE_PORT: &str = "storage-port";
    pub const SSL_STORAGE_PORT: &str = "ssl-storage-port";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const AUTHENTICATOR: &str = "authenticator";
    pub const AUTHORIZER: &str = "authorizer";
    pub const HEAP_SIZE: &str = "heap-size";
    pub const HEAP_NEW_SIZE: &str = "heap-new-size";
    pub const STACK_SIZE: &str = "stack-size";
    pub const SEEDS: &str = "seeds";
    pub const LAUNCHER_SCRIPT: &str = "launcher.script";
}

/// Process-level overrides, the equivalent of JVM-style system properties.
///
/// Keys are normalized so that `cluster.num-nodes`, `CLUSTER_NUM_NODES` and the
/// environment variable `RINGFORGE_CLUSTER_NUM_NODES` all address the same entry.
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    values: HashMap<String, String>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Collects overrides from `(name, value)` pairs, keeping only prefixed names.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values = vars
            .into_iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(PROPERTY_OVERRIDE_PREFIX)
                    .map(|key| (normalize_key(key), value))
            })
            .collect();
        Self { values }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Parses a `-Dkey=value` command-line definition.
    pub fn parse_define(arg: &str) -> Option<(String, String)> {
        let (key, value) = arg.strip_prefix("-D")?.split_once('=')?;
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }

    /// Returns the override for `key` if one is set and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// The parsed TOML properties resource.
///
/// Keys may be nested tables (`[cluster] num-nodes = 3`) or quoted flat keys
/// (`"cluster.num-nodes" = 3`). Scalars of any type resolve to their string form.
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    table: toml::Table,
}

impl PropertySource {
    /// Reads and parses a properties resource from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_from(&contents, path)
    }

    /// Parses a properties resource held in memory.
    pub fn parse(contents: &str) -> Result<Self> {
        Self::parse_from(contents, Path::new("<inline>"))
    }

    fn parse_from(contents: &str, origin: &Path) -> Result<Self> {
        let table: toml::Table = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { table })
    }

    /// Looks up a dotted key, preferring a flat top-level entry over a nested one.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.table.get(key) {
            return scalar_to_string(value);
        }
        let mut segments = key.split('.');
        let mut current = self.table.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        scalar_to_string(current)
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Generates the "first write wins" setters.
macro_rules! sticky_setters {
    ($($(#[$meta:meta])* $setter:ident => $field:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $setter(&mut self, value: $ty) {
                if self.$field.is_none() {
                    self.$field = Some(value);
                }
            }
        )*
    };
}

/// Cluster-wide deployment parameters.
#[derive(Debug, Clone, Default)]
pub struct DeploymentOptions {
    loaded: bool,
    bundle_file_name: Option<PathBuf>,
    bundle_name: Option<String>,
    bundle_version: Option<String>,
    cluster_dir: Option<PathBuf>,
    num_nodes: Option<usize>,
    auto_deploy: Option<bool>,
    embedded: Option<bool>,
    verify_timeout_ms: Option<u64>,
    logging_level: Option<String>,
    ring_delay_ms: Option<u64>,
    num_tokens: Option<u32>,
    native_transport_port: Option<u16>,
    native_transport_max_threads: Option<u32>,
    rpc_port: Option<u16>,
    start_rpc: Option<bool>,
    jmx_port: Option<u16>,
    storage_port: Option<u16>,
    ssl_storage_port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    authenticator: Option<String>,
    authorizer: Option<String>,
    heap_size: Option<String>,
    heap_new_size: Option<String>,
    stack_size: Option<String>,
    seeds: Option<String>,
    launcher_script: Option<String>,
}

fn default_bundle_file_name() -> PathBuf {
    PathBuf::from("storage-bundle")
}
fn default_bundle_name() -> &'static str {
    "storage-node"
}
fn default_bundle_version() -> &'static str {
    "1.0"
}
fn default_cluster_dir() -> PathBuf {
    PathBuf::from("storage_cluster")
}
fn default_num_nodes() -> usize {
    2
}
fn default_logging_level() -> &'static str {
    "INFO"
}
fn default_native_transport_port() -> u16 {
    9042
}
fn default_native_transport_max_threads() -> u32 {
    64
}
fn default_rpc_port() -> u16 {
    9160
}
fn default_jmx_port() -> u16 {
    7200
}
fn default_storage_port() -> u16 {
    7000
}
fn default_ssl_storage_port() -> u16 {
    7001
}
fn default_credential() -> &'static str {
    "storage"
}
fn default_authenticator() -> &'static str {
    "AllowAllAuthenticator"
}
fn default_authorizer() -> &'static str {
    "AllowAllAuthorizer"
}
fn default_launcher_script() -> &'static str {
    "cassandra"
}

impl DeploymentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options populated from the properties file at `path`.
    pub fn from_file(path: impl AsRef<Path>, overrides: &SystemProperties) -> Result<Self> {
        let mut options = Self::new();
        options.load_file(path, overrides)?;
        Ok(options)
    }

    /// Reads the properties resource at `path` and loads it. See [`Self::load`].
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        overrides: &SystemProperties,
    ) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let source = PropertySource::from_file(path.as_ref())?;
        debug!("Loaded deployment properties from {}", path.as_ref().display());
        self.load(&source, overrides)
    }

    /// Initializes every option that is not already set, then validates the result.
    ///
    /// Calling `load` again after a successful load does nothing.
    pub fn load(&mut self, source: &PropertySource, overrides: &SystemProperties) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let resolve = |key: &str| -> Option<String> {
            overrides
                .get(key)
                .map(str::to_string)
                .or_else(|| source.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = resolve(keys::BUNDLE_FILE_NAME) {
            self.set_bundle_file_name(PathBuf::from(v));
        }
        if let Some(v) = resolve(keys::BUNDLE_NAME) {
            self.set_bundle_name(v);
        }
        if let Some(v) = resolve(keys::BUNDLE_VERSION) {
            self.set_bundle_version(v);
        }
        if let Some(v) = resolve(keys::CLUSTER_DIR) {
            self.set_cluster_dir(PathBuf::from(v));
        }
        if let Some(v) = resolve(keys::NUM_NODES) {
            self.set_num_nodes(parse_integer(keys::NUM_NODES, &v)?);
        }
        if let Some(v) = resolve(keys::AUTO_DEPLOY) {
            self.set_auto_deploy(parse_bool(keys::AUTO_DEPLOY, &v)?);
        }
        if let Some(v) = resolve(keys::EMBEDDED) {
            self.set_embedded(parse_bool(keys::EMBEDDED, &v)?);
        }
        if let Some(v) = resolve(keys::VERIFY_TIMEOUT) {
            self.set_verify_timeout_ms(parse_integer(keys::VERIFY_TIMEOUT, &v)?);
        }
        if let Some(v) = resolve(keys::LOGGING_LEVEL) {
            self.set_logging_level(v);
        }
        if let Some(v) = resolve(keys::RING_DELAY) {
            self.set_ring_delay_ms(parse_integer(keys::RING_DELAY, &v)?);
        }
        if let Some(v) = resolve(keys::NUM_TOKENS) {
            self.set_num_tokens(parse_integer(keys::NUM_TOKENS, &v)?);
        }
        if let Some(v) = resolve(keys::NATIVE_TRANSPORT_PORT) {
            self.set_native_transport_port(parse_integer(keys::NATIVE_TRANSPORT_PORT, &v)?);
        }
        if let Some(v) = resolve(keys::NATIVE_TRANSPORT_MAX_THREADS) {
            self.set_native_transport_max_threads(parse_integer(
                keys::NATIVE_TRANSPORT_MAX_THREADS,
                &v,
            )?);
        }
        if let Some(v) = resolve(keys::RPC_PORT) {
            self.set_rpc_port(parse_integer(keys::RPC_PORT, &v)?);
        }
        if let Some(v) = resolve(keys::START_RPC) {
            self.set_start_rpc(parse_bool(keys::START_RPC, &v)?);
        }
        if let Some(v) = resolve(keys::JMX_PORT) {
            self.set_jmx_port(parse_integer(keys::JMX_PORT, &v)?);
        }
        if let Some(v) = resolve(keys::STORAGE_PORT) {
            self.set_storage_port(parse_integer(keys::STORAGE_PORT, &v)?);
        }
        if let Some(v) = resolve(keys::SSL_STORAGE_PORT) {
            self.set_ssl_storage_port(parse_integer(keys::SSL_STORAGE_PORT, &v)?);
        }
        if let Some(v) = resolve(keys::USERNAME) {
            self.set_username(v);
        }
        if let Some(v) = resolve(keys::PASSWORD) {
            self.set_password(v);
        }
        if let Some(v) = resolve(keys::AUTHENTICATOR) {
            self.set_authenticator(v);
        }
        if let Some(v) = resolve(keys::AUTHORIZER) {
            self.set_authorizer(v);
        }
        if let Some(v) = resolve(keys::HEAP_SIZE) {
            self.set_heap_size(v);
        }
        if let Some(v) = resolve(keys::HEAP_NEW_SIZE) {
            self.set_heap_new_size(v);
        }
        if let Some(v) = resolve(keys::STACK_SIZE) {
            self.set_stack_size(v);
        }
        if let Some(v) = resolve(keys::SEEDS) {
            self.set_seeds(v);
        }
        if let Some(v) = resolve(keys::LAUNCHER_SCRIPT) {
            self.set_launcher_script(v);
        }

        self.validate()?;
        self.loaded = true;
        info!(
            "Deployment options loaded: {} node(s) in '{}', embedded={}, auto-deploy={}",
            self.num_nodes(),
            self.cluster_dir().display(),
            self.embedded(),
            self.auto_deploy()
        );
        Ok(())
    }

    /// Returns true once [`Self::load`] has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Copies every field of `other` through the sticky setters.
    pub fn merge(&mut self, other: &DeploymentOptions) {
        macro_rules! merge_field {
            ($($setter:ident => $field:ident),* $(,)?) => {
                $(
                    if let Some(value) = other.$field.clone() {
                        self.$setter(value);
                    }
                )*
            };
        }
        merge_field!(
            set_bundle_file_name => bundle_file_name,
            set_bundle_name => bundle_name,
            set_bundle_version => bundle_version,
            set_cluster_dir => cluster_dir,
            set_num_nodes => num_nodes,
            set_auto_deploy => auto_deploy,
            set_embedded => embedded,
            set_verify_timeout_ms => verify_timeout_ms,
            set_logging_level => logging_level,
            set_ring_delay_ms => ring_delay_ms,
            set_num_tokens => num_tokens,
            set_native_transport_port => native_transport_port,
            set_native_transport_max_threads => native_transport_max_threads,
            set_rpc_port => rpc_port,
            set_start_rpc => start_rpc,
            set_jmx_port => jmx_port,
            set_storage_port => storage_port,
            set_ssl_storage_port => ssl_storage_port,
            set_username => username,
            set_password => password,
            set_authenticator => authenticator,
            set_authorizer => authorizer,
            set_heap_size => heap_size,
            set_heap_new_size => heap_new_size,
            set_stack_size => stack_size,
            set_seeds => seeds,
            set_launcher_script => launcher_script,
        );
    }

    /// Validates the resolved options to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        let num_nodes = self.num_nodes();
        if num_nodes == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be at least 1",
                keys::NUM_NODES
            )));
        }
        if self.embedded() && num_nodes > MAX_EMBEDDED_NODES {
            return Err(ConfigError::Invalid(format!(
                "{} cannot exceed {} for an embedded cluster, got {}",
                keys::NUM_NODES,
                MAX_EMBEDDED_NODES,
                num_nodes
            )));
        }
        if self.num_tokens() == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be at least 1",
                keys::NUM_TOKENS
            )));
        }
        if self.cluster_dir().as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{} cannot be empty",
                keys::CLUSTER_DIR
            )));
        }
        if self.native_transport_max_threads() == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} cannot be 0",
                keys::NATIVE_TRANSPORT_MAX_THREADS
            )));
        }
        for (key, port) in [
            (keys::NATIVE_TRANSPORT_PORT, self.native_transport_port()),
            (keys::RPC_PORT, self.rpc_port()),
            (keys::JMX_PORT, self.jmx_port()),
            (keys::STORAGE_PORT, self.storage_port()),
            (keys::SSL_STORAGE_PORT, self.ssl_storage_port()),
        ] {
            if port == 0 {
                return Err(ConfigError::Invalid(format!("{key} cannot be 0")));
            }
        }
        if usize::from(self.jmx_port()) + num_nodes - 1 > usize::from(u16::MAX) {
            return Err(ConfigError::Invalid(format!(
                "{} {} leaves no room for {} sequential JMX ports",
                keys::JMX_PORT,
                self.jmx_port(),
                num_nodes
            )));
        }
        Ok(())
    }

    /// Exports every option as a `key -> value` map for template substitution.
    /// Optional options that are unset are omitted.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            props.insert(key.to_string(), value);
        };
        put(
            keys::BUNDLE_FILE_NAME,
            self.bundle_file_name().display().to_string(),
        );
        put(keys::BUNDLE_NAME, self.bundle_name().to_string());
        put(keys::BUNDLE_VERSION, self.bundle_version().to_string());
        put(keys::CLUSTER_DIR, self.cluster_dir().display().to_string());
        put(keys::NUM_NODES, self.num_nodes().to_string());
        put(keys::AUTO_DEPLOY, self.auto_deploy().to_string());
        put(keys::EMBEDDED, self.embedded().to_string());
        put(keys::LOGGING_LEVEL, self.logging_level().to_string());
        put(keys::NUM_TOKENS, self.num_tokens().to_string());
        put(
            keys::NATIVE_TRANSPORT_PORT,
            self.native_transport_port().to_string(),
        );
        put(
            keys::NATIVE_TRANSPORT_MAX_THREADS,
            self.native_transport_max_threads().to_string(),
        );
        put(keys::RPC_PORT, self.rpc_port().to_string());
        put(keys::START_RPC, self.start_rpc().to_string());
        put(keys::JMX_PORT, self.jmx_port().to_string());
        put(keys::STORAGE_PORT, self.storage_port().to_string());
        put(keys::SSL_STORAGE_PORT, self.ssl_storage_port().to_string());
        put(keys::USERNAME, self.username().to_string());
        put(keys::PASSWORD, self.password().to_string());
        put(keys::AUTHENTICATOR, self.authenticator().to_string());
        put(keys::AUTHORIZER, self.authorizer().to_string());
        put(keys::LAUNCHER_SCRIPT, self.launcher_script().to_string());
        if let Some(ms) = self.ring_delay_ms {
            put(keys::RING_DELAY, ms.to_string());
        }
        if let Some(ms) = self.verify_timeout_ms {
            put(keys::VERIFY_TIMEOUT, ms.to_string());
        }
        if let Some(v) = &self.heap_size {
            put(keys::HEAP_SIZE, v.clone());
        }
        if let Some(v) = &self.heap_new_size {
            put(keys::HEAP_NEW_SIZE, v.clone());
        }
        if let Some(v) = &self.stack_size {
            put(keys::STACK_SIZE, v.clone());
        }
        if let Some(v) = &self.seeds {
            put(keys::SEEDS, v.clone());
        }
        props
    }

    sticky_setters! {
        /// The bundle to unpack. For the directory bundle this is the template directory.
        set_bundle_file_name => bundle_file_name: PathBuf;
        set_bundle_name => bundle_name: String;
        set_bundle_version => bundle_version: String;
        /// The directory under which every node directory is created.
        set_cluster_dir => cluster_dir: PathBuf;
        set_num_nodes => num_nodes: usize;
        set_auto_deploy => auto_deploy: bool;
        /// An embedded cluster runs every node on this host on a loopback address.
        set_embedded => embedded: bool;
        set_verify_timeout_ms => verify_timeout_ms: u64;
        set_logging_level => logging_level: String;
        set_ring_delay_ms => ring_delay_ms: u64;
        set_num_tokens => num_tokens: u32;
        set_native_transport_port => native_transport_port: u16;
        set_native_transport_max_threads => native_transport_max_threads: u32;
        set_rpc_port => rpc_port: u16;
        set_start_rpc => start_rpc: bool;
        /// The JMX port of node 0; node `i` listens on `jmx_port + i`.
        set_jmx_port => jmx_port: u16;
        set_storage_port => storage_port: u16;
        set_ssl_storage_port => ssl_storage_port: u16;
        set_username => username: String;
        set_password => password: String;
        set_authenticator => authenticator: String;
        set_authorizer => authorizer: String;
        set_heap_size => heap_size: String;
        set_heap_new_size => heap_new_size: String;
        set_stack_size => stack_size: String;
        /// Comma-separated hosts of an external (non-embedded) cluster.
        set_seeds => seeds: String;
        set_launcher_script => launcher_script: String;
    }

    pub fn bundle_file_name(&self) -> PathBuf {
        self.bundle_file_name
            .clone()
            .unwrap_or_else(default_bundle_file_name)
    }

    pub fn bundle_name(&self) -> &str {
        self.bundle_name.as_deref().unwrap_or(default_bundle_name())
    }

    pub fn bundle_version(&self) -> &str {
        self.bundle_version
            .as_deref()
            .unwrap_or(default_bundle_version())
    }

    pub fn cluster_dir(&self) -> PathBuf {
        self.cluster_dir.clone().unwrap_or_else(default_cluster_dir)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes.unwrap_or_else(default_num_nodes)
    }

    pub fn auto_deploy(&self) -> bool {
        self.auto_deploy.unwrap_or(true)
    }

    pub fn embedded(&self) -> bool {
        self.embedded.unwrap_or(true)
    }

    /// How long the orchestrator waits for the started cluster. `None` skips verification.
    pub fn verify_timeout(&self) -> Option<Duration> {
        self.verify_timeout_ms.map(Duration::from_millis)
    }

    /// The log level the nodes are configured with (not the level of this process).
    pub fn logging_level(&self) -> &str {
        self.logging_level
            .as_deref()
            .unwrap_or(default_logging_level())
    }

    /// `None` means the storage engine default applies.
    pub fn ring_delay(&self) -> Option<Duration> {
        self.ring_delay_ms.map(Duration::from_millis)
    }

    pub fn num_tokens(&self) -> u32 {
        self.num_tokens.unwrap_or(1)
    }

    pub fn native_transport_port(&self) -> u16 {
        self.native_transport_port
            .unwrap_or_else(default_native_transport_port)
    }

    pub fn native_transport_max_threads(&self) -> u32 {
        self.native_transport_max_threads
            .unwrap_or_else(default_native_transport_max_threads)
    }

    /// The lightweight RPC port used by the liveness probe.
    pub fn rpc_port(&self) -> u16 {
        self.rpc_port.unwrap_or_else(default_rpc_port)
    }

    pub fn start_rpc(&self) -> bool {
        self.start_rpc.unwrap_or(true)
    }

    pub fn jmx_port(&self) -> u16 {
        self.jmx_port.unwrap_or_else(default_jmx_port)
    }

    pub fn storage_port(&self) -> u16 {
        self.storage_port.unwrap_or_else(default_storage_port)
    }

    pub fn ssl_storage_port(&self) -> u16 {
        self.ssl_storage_port
            .unwrap_or_else(default_ssl_storage_port)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(default_credential())
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(default_credential())
    }

    pub fn authenticator(&self) -> &str {
        self.authenticator
            .as_deref()
            .unwrap_or(default_authenticator())
    }

    pub fn authorizer(&self) -> &str {
        self.authorizer.as_deref().unwrap_or(default_authorizer())
    }

    pub fn heap_size(&self) -> Option<&str> {
        self.heap_size.as_deref()
    }

    pub fn heap_new_size(&self) -> Option<&str> {
        self.heap_new_size.as_deref()
    }

    pub fn stack_size(&self) -> Option<&str> {
        self.stack_size.as_deref()
    }

    /// The hosts of an external cluster, parsed from the comma-separated `seeds` option.
    pub fn seeds(&self) -> Vec<String> {
        self.seeds
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn launcher_script(&self) -> &str {
        self.launcher_script
            .as_deref()
            .unwrap_or(default_launcher_script())
    }
}

type Result<T> = std::result::Result<T, ConfigError>;

fn parse_integer<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| ConfigError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
