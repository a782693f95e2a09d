use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub smartctl: SmartctlConfig,

    #[serde(default)]
    pub selftest: SelftestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartctlConfig {
    /// Path or command name of the smartctl binary.
    pub path: String,
    /// Extra options passed on every invocation (raw smartctl syntax).
    #[serde(default)]
    pub extra_options: Vec<String>,
    /// Run smartctl under `sudo -E`.
    #[serde(default)]
    pub sudo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelftestConfig {
    /// Default interval between progress polls while waiting on a self-test.
    pub poll_interval_sec: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self { smartctl: SmartctlConfig::default(), selftest: SelftestConfig::default() }
    }
}

impl Default for SmartctlConfig {
    fn default() -> Self {
        Self { path: "smartctl".into(), extra_options: Vec::new(), sudo: false }
    }
}

impl Default for SelftestConfig {
    fn default() -> Self {
        Self { poll_interval_sec: 5 }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c) => c,
            Err(_) => {
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("smartpoll").join("smartpoll.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&text)?;
    Ok(cfg)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# smartpoll configuration\n# Generated on first run — edit freely\n\n{}", text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.smartctl.path, "smartctl");
        assert_eq!(back.selftest.poll_interval_sec, 5);
        assert!(!back.smartctl.sudo);
    }
}
