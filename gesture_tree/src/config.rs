//! Application configuration.
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs the keys
//! it changes:
//!
//! ```json
//! { "field": { "count": 12000 }, "input": "pointer", "photos_dir": "photos" }
//! ```
//!
//! Command-line flags are applied on top of the file.

use std::fmt;
use std::path::{Path, PathBuf};

use hand_gesture::ClassifierConfig;
use morph_field::{FieldConfig, MorphParams};
use serde::{Deserialize, Serialize};

use crate::mode::ModeConfig;
use crate::source::InputMode;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: usize,
    pub height: usize,
    pub pixel_ratio: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Pixels covered by a size-1 particle at unit depth.
    pub attenuation: f32,
    /// Luminance above which pixels feed the bloom.
    pub bloom_threshold: f32,
    pub bloom_strength: f32,
    /// Blur radius in downsampled pixels.
    pub bloom_radius: usize,
    pub exposure: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            width:           960,
            height:          640,
            pixel_ratio:     1.0,
            fov_y:           50.0,
            attenuation:     morph_field::DEFAULT_ATTENUATION,
            bloom_threshold: 0.55,
            bloom_strength:  0.9,
            bloom_radius:    3,
            exposure:        1.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field:      FieldConfig,
    pub morph:      MorphParams,
    pub mode:       ModeConfig,
    pub classifier: ClassifierConfig,
    pub view:       ViewConfig,
    pub input:      InputMode,
    pub photos_dir: Option<PathBuf>,
    pub camera_fps: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            field:      FieldConfig::default(),
            morph:      MorphParams::default(),
            mode:       ModeConfig::default(),
            classifier: ClassifierConfig::default(),
            view:       ViewConfig::default(),
            input:      InputMode::default(),
            photos_dir: None,
            camera_fps: 30.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    /// Unknown flag, missing value or unparsable value.
    Flag(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source }    => write!(f, "cannot read {}: {}", path.display(), source),
            ConfigError::Parse { path, source } => write!(f, "invalid config {}: {}", path.display(), source),
            ConfigError::Flag(msg)              => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. }    => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Flag(_)              => None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    /// Build from command-line arguments (program name excluded).
    ///
    /// | Flag | Effect |
    /// |---|---|
    /// | `--quick` | defaults (the same as no flags) |
    /// | `--config <file>` | load a JSON file first |
    /// | `--pointer` | mouse instead of hands |
    /// | `--leap` | LeapMotion hands |
    /// | `--photos <dir>` | photo wall directory |
    /// | `--particles <n>` | particle count |
    /// | `--seed <n>` | field seed |
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut cfg = match flag_value(args, "--config")? {
            Some(path) => AppConfig::load(Path::new(path))?,
            None       => AppConfig::default(),
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--quick"   => {}
                "--pointer" => cfg.input = InputMode::Pointer,
                "--leap"    => cfg.input = InputMode::Leap,
                "--config"  => i += 1,
                "--photos"  => {
                    i += 1;
                    cfg.photos_dir = Some(PathBuf::from(required(args, i, "--photos")?));
                }
                "--particles" => {
                    i += 1;
                    cfg.field.count = parse_number(required(args, i, "--particles")?, "--particles")?;
                }
                "--seed" => {
                    i += 1;
                    cfg.field.seed = parse_number(required(args, i, "--seed")?, "--seed")?;
                }
                other => return Err(ConfigError::Flag(format!("unknown argument {:?}", other))),
            }
            i += 1;
        }
        Ok(cfg)
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, ConfigError> {
    match args.iter().position(|a| a == flag) {
        Some(i) => required(args, i + 1, flag).map(Some),
        None    => Ok(None),
    }
}

fn required<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, ConfigError> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::Flag(format!("{} needs a value", flag)))
}

fn parse_number<T: std::str::FromStr>(text: &str, flag: &str) -> Result<T, ConfigError> {
    text.parse()
        .map_err(|_| ConfigError::Flag(format!("{} expects a number, got {:?}", flag, text)))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{ "field": { "count": 12000 }, "input": "pointer", "mode": { "pitch_scale": 0.5 } }"#,
        ).unwrap();
        assert_eq!(cfg.field.count, 12_000);
        assert_eq!(cfg.field.seed, FieldConfig::default().seed);
        assert_eq!(cfg.input, InputMode::Pointer);
        assert_eq!(cfg.mode.pitch_scale, 0.5);
        assert_eq!(cfg.mode.yaw_scale, ModeConfig::default().yaw_scale);
        assert_eq!(cfg.camera_fps, 30.0);
    }

    #[test]
    fn empty_args_are_defaults() {
        assert_eq!(AppConfig::from_args(&[]).unwrap(), AppConfig::default());
        assert_eq!(AppConfig::from_args(&args(&["--quick"])).unwrap(), AppConfig::default());
    }

    #[test]
    fn flags_override() {
        let cfg = AppConfig::from_args(&args(&[
            "--pointer", "--particles", "3000", "--seed", "7", "--photos", "pics",
        ])).unwrap();
        assert_eq!(cfg.input, InputMode::Pointer);
        assert_eq!(cfg.field.count, 3000);
        assert_eq!(cfg.field.seed, 7);
        assert_eq!(cfg.photos_dir, Some(PathBuf::from("pics")));
    }

    #[test]
    fn bad_flags_are_reported() {
        assert!(matches!(AppConfig::from_args(&args(&["--seed"])), Err(ConfigError::Flag(_))));
        assert!(matches!(AppConfig::from_args(&args(&["--particles", "many"])), Err(ConfigError::Flag(_))));
        assert!(matches!(AppConfig::from_args(&args(&["--fast"])), Err(ConfigError::Flag(_))));
    }

    #[test]
    fn config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("gesture_tree_cfg_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "field": { "count": 9000, "seed": 3 }, "camera_fps": 24 }"#).unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let cfg = AppConfig::from_args(&args(&["--config", &path_str, "--seed", "11"])).unwrap();
        assert_eq!(cfg.field.count, 9000);
        assert_eq!(cfg.field.seed, 11);
        assert_eq!(cfg.camera_fps, 24.0);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("config.json"));
    }
}
