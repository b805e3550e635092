use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest tick the roll flicker may use; anything faster is just noise on screen.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read or write settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings at {path} are not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub roll_volume: f32,
    pub draw_volume: f32,
    pub mute_all: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            roll_volume: 1.0,
            draw_volume: 1.0,
            mute_all: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = clamp_unit(self.master_volume);
        self.roll_volume = clamp_unit(self.roll_volume);
        self.draw_volume = clamp_unit(self.draw_volume);
        self
    }

    pub fn effective_roll_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.roll_volume
        }
    }

    pub fn effective_draw_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.draw_volume
        }
    }
}

// NaN compares false everywhere, so it has to be caught before `clamp`.
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// How long each part of a round takes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RollTiming {
    #[serde(with = "crate::serde_duration")]
    pub tick_interval: Duration,
    #[serde(with = "crate::serde_duration")]
    pub roll_duration: Duration,
    /// Delay after a draw before the draw sound is cut off.
    #[serde(with = "crate::serde_duration")]
    pub draw_silence: Duration,
}

impl Default for RollTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(70),
            roll_duration: Duration::from_millis(4000),
            draw_silence: Duration::from_millis(3000),
        }
    }
}

impl RollTiming {
    pub fn sanitized(mut self) -> Self {
        self.tick_interval = self.tick_interval.max(MIN_TICK_INTERVAL);
        self.roll_duration = self.roll_duration.max(self.tick_interval);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
            vsync: true,
        }
    }
}

/// Optional audio files that replace the built-in sounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SoundFiles {
    pub roll: Option<PathBuf>,
    pub draw: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BingoSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub timing: RollTiming,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub sounds: SoundFiles,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BingoSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            audio: AudioSettings::default(),
            timing: RollTiming::default(),
            window: WindowSettings::default(),
            sounds: SoundFiles::default(),
            seed: None,
        }
    }
}

impl BingoSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self.timing = self.timing.sanitized();
        self.window.width = self.window.width.max(320);
        self.window.height = self.window.height.max(240);
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("BINGO_SETTINGS_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::at(base.join("bingo-roulette").join("settings.json"))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file, falling back to defaults when it is missing or broken.
    pub fn load(&self) -> BingoSettings {
        match self.try_load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                log::debug!("no settings at {}; using defaults", self.path.display());
                BingoSettings::default()
            }
            Err(err) => {
                log::warn!("{err}; using defaults");
                BingoSettings::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn try_load(&self) -> Result<Option<BingoSettings>, SettingsError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice::<BingoSettings>(&bytes)
            .map(|s| Some(s.sanitized()))
            .map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save(&self, settings: &BingoSettings) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(settings).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}
