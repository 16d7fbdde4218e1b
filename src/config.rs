use crate::time::DEFAULT_MAX_DELTA_SECONDS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "data/game.config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub game_name: String,
    pub fullscreen: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub scene_file: PathBuf,
    pub max_delta_seconds: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_name: "Game".to_string(),
            fullscreen: false,
            window_width: 1280,
            window_height: 720,
            scene_file: PathBuf::from("data/game.scene"),
            max_delta_seconds: DEFAULT_MAX_DELTA_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameConfigOverrides {
    pub scene_file: Option<PathBuf>,
    pub max_delta_seconds: Option<f32>,
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:#}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &GameConfigOverrides) {
        if let Some(scene_file) = &overrides.scene_file {
            self.scene_file = scene_file.clone();
        }
        if let Some(max_delta) = overrides.max_delta_seconds {
            self.max_delta_seconds = max_delta;
        }
    }

    /// Per-tick clamp used by the runtime. The configured value may tighten the clamp, never loosen it.
    pub fn tick_limit(&self) -> f32 {
        let configured = self.max_delta_seconds;
        if !configured.is_finite() || configured < 0.0 {
            log::warn!("maxDeltaSeconds {configured} is invalid; using {DEFAULT_MAX_DELTA_SECONDS}");
            return DEFAULT_MAX_DELTA_SECONDS;
        }
        if configured > DEFAULT_MAX_DELTA_SECONDS {
            log::warn!("maxDeltaSeconds {configured} exceeds {DEFAULT_MAX_DELTA_SECONDS}; clamping");
            return DEFAULT_MAX_DELTA_SECONDS;
        }
        configured
    }
}

impl GameConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.scene_file.is_none() && self.max_delta_seconds.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.scene_file.is_some() {
            fields.push("sceneFile");
        }
        if self.max_delta_seconds.is_some() {
            fields.push("maxDeltaSeconds");
        }
        fields
    }
}
