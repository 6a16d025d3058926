/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub board: BoardConfig,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    /// Room registry file. `None` uses the built-in rooms.
    pub map_file: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub sound_enabled: bool,
    /// Problems found while loading, logged once logging is up.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct PlayerConfig {
    pub name: String,
    pub race: String,
    pub races: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

/// Key names per command. Parsed into a keymap by the input layer.
#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub backpack: Vec<String>,
    pub enemies: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub backpack: Vec<String>,
    pub enemies: Vec<String>,
    pub confirm: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    logging: TomlLogging,
    #[serde(default)]
    sound: TomlSound,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_race")]
    race: String,
    #[serde(default = "default_races")]
    races: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_key_up")]
    up: Vec<String>,
    #[serde(default = "default_key_down")]
    down: Vec<String>,
    #[serde(default = "default_key_left")]
    left: Vec<String>,
    #[serde(default = "default_key_right")]
    right: Vec<String>,
    #[serde(default = "default_key_backpack")]
    backpack: Vec<String>,
    #[serde(default = "default_key_enemies")]
    enemies: Vec<String>,
    #[serde(default = "default_key_restart")]
    restart: Vec<String>,
    #[serde(default = "default_key_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_backpack")]
    backpack: Vec<String>,
    #[serde(default = "default_pad_enemies")]
    enemies: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    map_file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_true")]
    enabled: bool,
}

// ── Defaults ──

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_name() -> String { "Legolas".into() }
fn default_race() -> String { "Elf".into() }
fn default_races() -> Vec<String> { names(&["Elf", "Human", "Dwarf", "Orc"]) }
fn default_width() -> usize { 80 }
fn default_height() -> usize { 24 }

fn default_key_up() -> Vec<String> { names(&["w", "Up"]) }
fn default_key_down() -> Vec<String> { names(&["s", "Down"]) }
fn default_key_left() -> Vec<String> { names(&["a", "Left"]) }
fn default_key_right() -> Vec<String> { names(&["d", "Right"]) }
fn default_key_backpack() -> Vec<String> { names(&["i"]) }
fn default_key_enemies() -> Vec<String> { names(&["e"]) }
fn default_key_restart() -> Vec<String> { names(&["r"]) }
fn default_key_quit() -> Vec<String> { names(&["q", "Esc"]) }

fn default_pad_backpack() -> Vec<String> { names(&["Y"]) }
fn default_pad_enemies() -> Vec<String> { names(&["X"]) }
fn default_pad_confirm() -> Vec<String> { names(&["A", "Start"]) }
fn default_pad_restart() -> Vec<String> { names(&["Start"]) }
fn default_pad_quit() -> Vec<String> { names(&["Select"]) }

fn default_log_level() -> String { "info".into() }
fn default_true() -> bool { true }

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { name: default_name(), race: default_race(), races: default_races() }
    }
}

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard { width: default_width(), height: default_height() }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            up: default_key_up(),
            down: default_key_down(),
            left: default_key_left(),
            right: default_key_right(),
            backpack: default_key_backpack(),
            enemies: default_key_enemies(),
            restart: default_key_restart(),
            quit: default_key_quit(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            backpack: default_pad_backpack(),
            enemies: default_pad_enemies(),
            confirm: default_pad_confirm(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging { file: None, level: default_log_level() }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: true }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::resolve(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// A missing file or missing keys fall back to defaults; a broken file
    /// is reported and ignored.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();

        for dir in &search_dirs {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match Self::read_file(&path, &search_dirs) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    warnings.push(format!("{e}; using defaults"));
                    break;
                }
            }
        }

        let mut cfg = Self::resolve(TomlConfig::default(), &search_dirs);
        cfg.warnings = warnings;
        cfg
    }

    /// Read and parse one config file.
    pub fn read_file(path: &Path, search_dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, search_dirs)
    }

    /// Parse config text. Relative paths resolve against `search_dirs`.
    pub fn from_toml_str(text: &str, search_dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        Ok(Self::resolve(toml_cfg, search_dirs))
    }

    fn resolve(t: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mut warnings = Vec::new();

        let mut board = BoardConfig { width: t.board.width, height: t.board.height };
        if board.width < 3 || board.height < 3 {
            warnings.push(format!(
                "board {}x{} too small, using {}x{}",
                board.width, board.height, default_width(), default_height()
            ));
            board = BoardConfig { width: default_width(), height: default_height() };
        }

        let mut races = t.player.races;
        if races.is_empty() {
            races = default_races();
        }

        GameConfig {
            player: PlayerConfig { name: t.player.name, race: t.player.race, races },
            board,
            keys: KeyConfig {
                up: t.keys.up,
                down: t.keys.down,
                left: t.keys.left,
                right: t.keys.right,
                backpack: t.keys.backpack,
                enemies: t.keys.enemies,
                restart: t.keys.restart,
                quit: t.keys.quit,
            },
            gamepad: GamepadConfig {
                backpack: t.gamepad.backpack,
                enemies: t.gamepad.enemies,
                confirm: t.gamepad.confirm,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
            },
            map_file: t.general.map_file.map(|f| find_in(&f, search_dirs)),
            logging: LoggingConfig {
                file: t.logging.file.map(PathBuf::from),
                level: t.logging.level,
            },
            sound_enabled: t.sound.enabled,
            warnings,
        }
    }
}

/// Absolute paths are kept; relative ones resolve to the first search
/// directory that contains them, else stay relative to CWD.
fn find_in(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
        .unwrap_or(path)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("", &[]).unwrap();
        assert_eq!(cfg.player.name, "Legolas");
        assert_eq!(cfg.player.race, "Elf");
        assert_eq!(cfg.player.races.len(), 4);
        assert_eq!((cfg.board.width, cfg.board.height), (80, 24));
        assert_eq!(cfg.keys.up, vec!["w".to_string(), "Up".to_string()]);
        assert_eq!(cfg.keys.quit, vec!["q".to_string(), "Esc".to_string()]);
        assert_eq!(cfg.map_file, None);
        assert_eq!(cfg.logging.file, None);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.sound_enabled);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [player]
            name = "Gimli"
            [keys]
            backpack = ["b", "Tab"]
            [sound]
            enabled = false
            [logging]
            file = "dungeon.log"
            level = "debug"
        "#;
        let cfg = GameConfig::from_toml_str(text, &[]).unwrap();
        assert_eq!(cfg.player.name, "Gimli");
        assert_eq!(cfg.player.race, "Elf");
        assert_eq!(cfg.keys.backpack, vec!["b".to_string(), "Tab".to_string()]);
        assert_eq!(cfg.keys.enemies, vec!["e".to_string()]);
        assert!(!cfg.sound_enabled);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("dungeon.log")));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn absolute_map_file_is_kept() {
        let cfg = GameConfig::from_toml_str("[general]\nmap_file = \"/srv/maps/keep.toml\"\n", &[]).unwrap();
        assert_eq!(cfg.map_file, Some(PathBuf::from("/srv/maps/keep.toml")));
    }

    #[test]
    fn tiny_board_falls_back() {
        let cfg = GameConfig::from_toml_str("[board]\nwidth = 2\n", &[]).unwrap();
        assert_eq!((cfg.board.width, cfg.board.height), (80, 24));
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let r = GameConfig::from_toml_str("[board\nwidth = ", &[]);
        assert!(matches!(r, Err(ConfigError::Parse(_))));
        let r = GameConfig::from_toml_str("[board]\nwidth = \"wide\"\n", &[]);
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameConfig::from_toml_str(include_str!("../config.toml"), &[]).unwrap();
        let def = GameConfig::default();
        assert_eq!(cfg.player.races, def.player.races);
        assert_eq!(cfg.keys.quit, def.keys.quit);
        assert_eq!(cfg.gamepad.confirm, def.gamepad.confirm);
        assert_eq!(cfg.map_file, None);
        assert!(cfg.sound_enabled);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let r = GameConfig::read_file(Path::new("/nonexistent/dungeon/config.toml"), &[]);
        assert!(matches!(r, Err(ConfigError::Io { .. })));
    }
}
