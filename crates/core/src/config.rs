//! Playfield geometry and simulation roster settings.
//! Defaults reproduce the classic 650x650 field with 50-cell corridors; any field can be
//! overridden from a TOML document.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Pos;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayfieldConfig {
    /// Side length of the square playfield in cells.
    pub size: i32,
    /// Rows above this line belong to the status band and count as off-field.
    pub play_area_top: i32,
    /// Walkable thickness of every corridor.
    pub corridor_width: i32,
    /// Distance from the field centre the starting tunnels reach on level 0.
    pub start_tunnel_reach: i32,
    /// Extra starting-tunnel reach added per level.
    pub start_tunnel_growth: i32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            size: 650,
            play_area_top: 50,
            corridor_width: 50,
            start_tunnel_reach: 150,
            start_tunnel_growth: 30,
        }
    }
}

impl PlayfieldConfig {
    pub fn half_width(&self) -> i32 {
        self.corridor_width / 2
    }

    pub fn mid(&self) -> i32 {
        self.size / 2
    }

    /// Where the digger appears and where the vertical starting tunnel begins.
    pub fn spawn(&self) -> Pos {
        Pos { y: self.play_area_top + self.half_width(), x: self.mid() }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.corridor_width < 2 {
            return Err(ConfigError::Invalid("corridor_width must be at least 2"));
        }
        if self.size <= self.corridor_width * 2 {
            return Err(ConfigError::Invalid("size must exceed two corridor widths"));
        }
        if self.play_area_top < 0 || self.play_area_top + self.corridor_width >= self.size {
            return Err(ConfigError::Invalid("play_area_top must leave room for a corridor"));
        }
        if self.start_tunnel_reach < 0 || self.start_tunnel_growth < 0 {
            return Err(ConfigError::Invalid("starting tunnel sizing must not be negative"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub level: u32,
    pub pursuers: usize,
    pub foragers: usize,
    pub drifters: usize,
    pub boulders: usize,
    /// Upper bound on roamers; the level's own quota may allow fewer.
    pub roamers: usize,
    /// Bury nuggets at level start. Without them a level never clears.
    pub nuggets: bool,
    /// An enemy closer than this to the digger catches it.
    pub catch_radius: f64,
    pub playfield: PlayfieldConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            level: 1,
            pursuers: 3,
            foragers: 1,
            drifters: 1,
            boulders: 4,
            roamers: 2,
            nuggets: true,
            catch_radius: 20.0,
            playfield: PlayfieldConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playfield.validate()?;
        if self.level == 0 {
            return Err(ConfigError::Invalid("level numbering starts at 1"));
        }
        if !(self.catch_radius.is_finite() && self.catch_radius >= 0.0) {
            return Err(ConfigError::Invalid("catch_radius must be a non-negative number"));
        }
        if self.boulders > 4 {
            return Err(ConfigError::Invalid("at most 4 boulders fit the quadrant layout"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "failed to read config: {msg}"),
            ConfigError::Parse(msg) => write!(f, "failed to parse config: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_classic_field() {
        let config = SimConfig::default();
        assert_eq!(config.playfield.size, 650);
        assert_eq!(config.playfield.half_width(), 25);
        assert_eq!(config.playfield.spawn(), Pos { y: 75, x: 325 });
        assert_eq!(config.roamers, 2);
        assert!(config.nuggets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn spawn_follows_the_top_corridor() {
        let playfield =
            PlayfieldConfig { play_area_top: 80, corridor_width: 40, ..Default::default() };
        assert_eq!(playfield.spawn(), Pos { y: 100, x: 325 });
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            level = 4
            pursuers = 6
            nuggets = false

            [playfield]
            corridor_width = 40
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.level, 4);
        assert_eq!(config.pursuers, 6);
        assert_eq!(config.foragers, 1);
        assert!(!config.nuggets);
        assert_eq!(config.roamers, 2);
        assert_eq!(config.playfield.corridor_width, 40);
        assert_eq!(config.playfield.size, 650);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SimConfig::from_toml_str("levle = 3").expect_err("typo should be rejected");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let err = SimConfig::from_toml_str("[playfield]\ncorridor_width = 400")
            .expect_err("corridor wider than half the field");
        assert_eq!(err, ConfigError::Invalid("size must exceed two corridor widths"));
    }

    #[test]
    fn load_reads_config_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("burrow.toml");
        fs::write(&path, "boulders = 2\ncatch_radius = 12.5\n").unwrap();

        let config = SimConfig::load(&path).unwrap();
        assert_eq!(config.boulders, 2);
        assert_eq!(config.catch_radius, 12.5);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempdir().unwrap();
        let err = SimConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
