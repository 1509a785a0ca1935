use std::path::PathBuf;

use log::{debug, info};
use serde::Deserialize;

use crate::color::Color;

// ---------------------------------------------------------------------------
// ConfigFile — deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(default)]
    pub scroll: ScrollConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ScrollConfigFile {
    pub step_size: Option<u32>,
    pub page_gap: Option<u32>,
    pub separation_color: Option<Color>,
    pub page_background: Option<Color>,
    pub evict_outside_window: Option<bool>,
    pub forward_key: Option<char>,
    pub backward_key: Option<char>,
}

// ---------------------------------------------------------------------------
// Config — resolved (all fields concrete)
// ---------------------------------------------------------------------------

pub struct Config {
    pub scroll: ScrollConfig,
    pub keys: KeyConfig,
}

/// Settings consumed by the scroll machinery.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollConfig {
    /// Pixels per discrete scroll command.
    pub step_size: u32,
    /// Gap between pages in device units.
    pub page_gap: u32,
    pub separation_color: Color,
    pub page_background: Color,
    /// Clear pages that leave the window after each step instead of keeping
    /// every page rendered so far.
    pub evict_outside_window: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_size: 50,
            page_gap: 5,
            separation_color: Color::neutral_gray(),
            page_background: Color::neutral_gray(),
            evict_outside_window: false,
        }
    }
}

/// Single-key triggers for the step commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyConfig {
    pub forward: char,
    pub backward: char,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            forward: 'j',
            backward: 'k',
        }
    }
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(&mut self, step_size: Option<u32>, page_gap: Option<u32>) {
        if let Some(v) = step_size {
            debug!("config: CLI override step_size={v}");
            self.scroll.step_size = step_size;
        }
        if let Some(v) = page_gap {
            debug!("config: CLI override page_gap={v}");
            self.scroll.page_gap = page_gap;
        }
    }

    /// Resolve to a Config by applying defaults to missing fields.
    pub fn resolve(self) -> Config {
        let defaults = ScrollConfig::default();
        let default_keys = KeyConfig::default();
        let s = self.scroll;
        let config = Config {
            scroll: ScrollConfig {
                step_size: s.step_size.unwrap_or(defaults.step_size),
                page_gap: s.page_gap.unwrap_or(defaults.page_gap),
                separation_color: s.separation_color.unwrap_or(defaults.separation_color),
                page_background: s.page_background.unwrap_or(defaults.page_background),
                evict_outside_window: s
                    .evict_outside_window
                    .unwrap_or(defaults.evict_outside_window),
            },
            keys: KeyConfig {
                forward: s.forward_key.unwrap_or(default_keys.forward),
                backward: s.backward_key.unwrap_or(default_keys.backward),
            },
        };
        info!(
            "config: resolved step_size={}, page_gap={}, separation_color={}, \
             page_background={}, evict_outside_window={}, keys={}/{}",
            config.scroll.step_size,
            config.scroll.page_gap,
            config.scroll.separation_color,
            config.scroll.page_background,
            config.scroll.evict_outside_window,
            config.keys.forward,
            config.keys.backward,
        );
        config
    }
}

/// Resolve the XDG config path for pagescroll.
fn config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("pagescroll").join("config.toml"))
}

/// Load config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        let resolved = cfg.resolve();
        assert_eq!(resolved.scroll, ScrollConfig::default());
        assert_eq!(resolved.scroll.step_size, 50);
        assert_eq!(resolved.scroll.page_gap, 5);
        assert!(!resolved.scroll.evict_outside_window);
        assert_eq!(resolved.keys, KeyConfig::default());
    }

    #[test]
    fn partial_toml() {
        let text = r##"
            [scroll]
            step_size = 120
            separation_color = "#202020"
            forward_key = " "
        "##;
        let cfg: ConfigFile = toml::from_str(text).unwrap();
        let resolved = cfg.resolve();
        assert_eq!(resolved.scroll.step_size, 120);
        assert_eq!(resolved.scroll.separation_color, Color::rgb(0x20, 0x20, 0x20));
        assert_eq!(resolved.keys.forward, ' ');
        // Defaults for unspecified fields
        assert_eq!(resolved.scroll.page_gap, 5);
        assert_eq!(resolved.scroll.page_background, Color::neutral_gray());
        assert_eq!(resolved.keys.backward, 'k');
    }

    #[test]
    fn invalid_toml() {
        let text = "this is not valid toml [[[";
        let result = toml::from_str::<ConfigFile>(text);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_color_is_rejected() {
        let text = "[scroll]\nseparation_color = \"not-a-colour\"\n";
        assert!(toml::from_str::<ConfigFile>(text).is_err());
    }

    #[test]
    fn cli_overrides() {
        let mut cfg: ConfigFile = toml::from_str("[scroll]\nstep_size = 10").unwrap();
        cfg.merge_cli(Some(75), None);
        let resolved = cfg.resolve();
        assert_eq!(resolved.scroll.step_size, 75); // CLI wins
        assert_eq!(resolved.scroll.page_gap, 5); // default (neither config nor CLI)
    }
}
