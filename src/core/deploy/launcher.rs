// src/core/deploy/launcher.rs

//! Starts storage nodes as detached background processes.

use crate::config::DeploymentOptions;
use crate::core::node::NodeDir;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// What happened when a node's start command was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started { pid: Option<u32> },
    AlreadyRunning,
}

/// Issues a node's start command without waiting for the node to become ready.
#[async_trait]
pub trait NodeLauncher: Send + Sync {
    async fn launch(&self, node: &NodeDir) -> io::Result<LaunchOutcome>;
}

/// Runs the node's platform start script from its `bin/` directory.
///
/// A node counts as running if this launcher already started it or if its pid file
/// names a live process, so issuing the start command twice does not start a second
/// process. A pid file left behind by a dead process is removed and the node started.
#[derive(Debug)]
pub struct ScriptLauncher {
    script: String,
    launched: Mutex<HashSet<PathBuf>>,
}

impl ScriptLauncher {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            launched: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_options(options: &DeploymentOptions) -> Self {
        Self::new(options.launcher_script())
    }

    /// The pid file the start script is asked to write: `<node>/bin/<script>.pid`.
    pub fn pid_file(&self, node: &NodeDir) -> PathBuf {
        node.path.join("bin").join(format!("{}.pid", self.script))
    }

    fn command(&self, node: &NodeDir) -> Command {
        let bin_dir = node.path.join("bin");
        let pid_file = self.pid_file(node);

        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd.exe");
            cmd.arg("/C").arg(format!("{}.bat", self.script));
            cmd
        };
        #[cfg(not(windows))]
        let mut cmd = Command::new(bin_dir.join(&self.script));

        cmd.arg("-p")
            .arg(pid_file)
            .current_dir(bin_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);
        cmd
    }
}

#[async_trait]
impl NodeLauncher for ScriptLauncher {
    async fn launch(&self, node: &NodeDir) -> io::Result<LaunchOutcome> {
        self.launch_once(node)
    }
}

impl ScriptLauncher {
    fn launch_once(&self, node: &NodeDir) -> io::Result<LaunchOutcome> {
        let mut launched = self.launched.lock();
        let pid_file = self.pid_file(node);
        if launched.contains(&node.path) || pid_is_running(&pid_file) {
            debug!("node{} at {} is already running", node.index, node.address);
            return Ok(LaunchOutcome::AlreadyRunning);
        }
        if pid_file.exists() {
            warn!(
                "Removing stale pid file {} of node{}",
                pid_file.display(),
                node.index
            );
            std::fs::remove_file(&pid_file)?;
        }

        // The child is detached; dropping the handle leaves it running.
        let child = self.command(node).spawn()?;
        let pid = child.id();
        launched.insert(node.path.clone());
        info!(
            "Started node{} at {} (pid {:?})",
            node.index, node.address, pid
        );
        Ok(LaunchOutcome::Started { pid })
    }
}

/// Returns true if `pid_file` holds the pid of a live, non-zombie process.
fn pid_is_running(pid_file: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(pid_file) else {
        return false;
    };
    let Ok(pid) = contents.trim().parse::<u32>() else {
        warn!("Ignoring unreadable pid file {}", pid_file.display());
        return false;
    };
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid)
        .is_some_and(|process| process.status() != ProcessStatus::Zombie)
}
