use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// The external collaborator every `Device` talks through: something that
/// runs a smartctl query and hands back its output as an ordered line
/// sequence plus the process exit code.
///
/// Queries are read-only and safely retryable; `-t`/`-X` invocations
/// mutate firmware state and must not be retried blindly (the running-test
/// check in `Device::run_selftest` is the guard against duplicate starts).
///
/// Errors mean the tool could not be located or started at all; a nonzero
/// exit code is returned in-band and means "no usable data" for queries.
pub trait SmartctlInvoker {
    fn invoke(&self, args: &[&str]) -> Result<(Vec<String>, i32)>;
}

/// Process-spawning implementation wrapping the real smartctl binary.
///
/// Construct one and share it across devices explicitly; there is no
/// process-wide default instance.
pub struct Smartctl {
    path: PathBuf,
    extra_options: Vec<String>,
    sudo: bool,
}

impl Smartctl {
    pub fn new() -> Self {
        Self { path: PathBuf::from("smartctl"), extra_options: Vec::new(), sudo: false }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::new() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            path: PathBuf::from(&cfg.smartctl.path),
            extra_options: cfg.smartctl.extra_options.clone(),
            sudo: cfg.smartctl.sudo,
        }
    }

    /// Extra options passed before the per-call arguments on every
    /// invocation (e.g. `-T permissive`).
    pub fn add_options(&mut self, options: &[&str]) {
        self.extra_options.extend(options.iter().map(|s| s.to_string()));
    }
}

impl Default for Smartctl {
    fn default() -> Self {
        Self::new()
    }
}

impl SmartctlInvoker for Smartctl {
    fn invoke(&self, args: &[&str]) -> Result<(Vec<String>, i32)> {
        let mut cmd = if self.sudo {
            let mut c = Command::new("sudo");
            c.arg("-E").arg(&self.path);
            c
        } else {
            Command::new(&self.path)
        };
        // Parsing depends on untranslated field names.
        cmd.env("LANG", "C");
        cmd.args(&self.extra_options);
        cmd.args(args);

        tracing::debug!("running {} {:?}", self.path.display(), args);
        let out = cmd
            .output()
            .with_context(|| format!("failed to run {}", self.path.display()))?;

        let lines = String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        let code = out.status.code().unwrap_or(-1);
        tracing::trace!("smartctl exited with {}", code);
        Ok((lines, code))
    }
}
