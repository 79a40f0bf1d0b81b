/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tick_rate_ms: u64,
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    /// XSB pack replacing the built-in stages.
    pub levels_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    /// MAX_UNDO_COUNT: undo budget per level attempt.
    pub max_undo: u32,
    /// NEXT_LEVEL_DELAY: pause between a clear and the next stage.
    pub next_level_delay: Duration,
    /// Stop the stopwatch when play leaves this 1-based stage, i.e. when
    /// its deferred advance fires rather than at the winning move.
    /// `None` runs it until the final stage's advance fires.
    pub timer_stop_after_stage: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub undo: Vec<String>,
    pub reset: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    timer: TomlTimer,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    levels_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_max_undo")]
    max_undo: u32,
    #[serde(default = "default_next_level_delay")]
    next_level_delay_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlTimer {
    /// 0 = final stage
    #[serde(default)]
    stop_after_stage: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_undo")]
    undo: Vec<String>,
    #[serde(default = "default_reset")]
    reset: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 33 }
fn default_max_undo() -> u32 { 2 }
fn default_next_level_delay() -> u64 { 1000 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_undo() -> Vec<String> { vec!["B".into()] }
fn default_reset() -> Vec<String> { vec!["Y".into()] }
fn default_restart() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            levels_file: String::new(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            max_undo: default_max_undo(),
            next_level_delay_ms: default_next_level_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            undo: default_undo(),
            reset: default_reset(),
            restart: default_restart(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        GameConfig::default().rules
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Invalid TOML yields defaults.
    #[cfg(test)]
    pub fn parse(text: &str) -> Self {
        GameConfig::from_toml(parse_toml(text, Path::new("<inline>")), &[])
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let tick_rate_ms = if toml_cfg.general.tick_rate_ms == 0 {
            tracing::warn!("general.tick_rate_ms must be positive, using {}", default_tick_rate());
            default_tick_rate()
        } else {
            toml_cfg.general.tick_rate_ms
        };

        let timer_stop_after_stage = match toml_cfg.timer.stop_after_stage {
            0 => None,
            n => Some(n),
        };

        GameConfig {
            tick_rate_ms,
            rules: RulesConfig {
                max_undo: toml_cfg.rules.max_undo,
                next_level_delay: Duration::from_millis(toml_cfg.rules.next_level_delay_ms),
                timer_stop_after_stage,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                undo: toml_cfg.gamepad.undo,
                reset: toml_cfg.gamepad.reset,
                restart: toml_cfg.gamepad.restart,
            },
            levels_file: resolve_levels_file(&toml_cfg.general.levels_file, search_dirs),
        }
    }
}

/// Relative pack paths are looked up in the candidate dirs; the first
/// existing match wins, otherwise the path is kept relative to CWD.
fn resolve_levels_file(raw: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return Some(path);
    }
    let found = search_dirs.iter()
        .map(|d| d.join(&path))
        .find(|p| p.is_file());
    Some(found.unwrap_or(path))
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::info!(path = %path.display(), "using config file");
                    return parse_toml(&text, &path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not read config file");
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config parse error, using default settings");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.tick_rate_ms, 33);
        assert_eq!(cfg.rules.max_undo, 2);
        assert_eq!(cfg.rules.next_level_delay, Duration::from_millis(1000));
        assert_eq!(cfg.rules.timer_stop_after_stage, None);
        assert_eq!(cfg.levels_file, None);
        assert_eq!(cfg.gamepad.undo, vec!["B".to_string()]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = GameConfig::parse("[rules]\nmax_undo = 5\n");
        assert_eq!(cfg.rules.max_undo, 5);
        assert_eq!(cfg.rules.next_level_delay, Duration::from_millis(1000));
        assert_eq!(cfg.tick_rate_ms, 33);
    }

    #[test]
    fn timer_stage_zero_means_final() {
        let cfg = GameConfig::parse("[timer]\nstop_after_stage = 0\n");
        assert_eq!(cfg.rules.timer_stop_after_stage, None);
        let cfg = GameConfig::parse("[timer]\nstop_after_stage = 5\n");
        assert_eq!(cfg.rules.timer_stop_after_stage, Some(5));
    }

    #[test]
    fn invalid_toml_falls_back() {
        let cfg = GameConfig::parse("[rules\nmax_undo = ");
        assert_eq!(cfg.rules.max_undo, 2);
    }

    #[test]
    fn zero_tick_rate_rejected() {
        let cfg = GameConfig::parse("[general]\ntick_rate_ms = 0\n");
        assert_eq!(cfg.tick_rate_ms, 33);
    }

    #[test]
    fn levels_file_absolute_and_relative() {
        let cfg = GameConfig::parse("[general]\nlevels_file = \"/tmp/pack.xsb\"\n");
        assert_eq!(cfg.levels_file, Some(PathBuf::from("/tmp/pack.xsb")));
        let cfg = GameConfig::parse("[general]\nlevels_file = \"packs/mine.xsb\"\n");
        assert_eq!(cfg.levels_file, Some(PathBuf::from("packs/mine.xsb")));
        let cfg = GameConfig::parse("[general]\nlevels_file = \"  \"\n");
        assert_eq!(cfg.levels_file, None);
    }

    #[test]
    fn gamepad_lists_override() {
        let cfg = GameConfig::parse("[gamepad]\nundo = [\"L1\", \"X\"]\n");
        assert_eq!(cfg.gamepad.undo, vec!["L1".to_string(), "X".to_string()]);
        assert_eq!(cfg.gamepad.reset, vec!["Y".to_string()]);
    }
}
