use crate::config::{GameConfigOverrides, DEFAULT_CONFIG_PATH};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TICKS: u32 = 600;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    scene: Option<PathBuf>,
    ticks: Option<u32>,
    fixed_dt: Option<f32>,
    max_dt: Option<f32>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Use --config/--scene/--ticks/--fixed-dt/--max-dt with values.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "scene" => overrides.scene = Some(PathBuf::from(value)),
                "ticks" => {
                    overrides.ticks =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid tick count '{value}'"))?);
                }
                "fixed-dt" => {
                    let dt = value.parse::<f32>().with_context(|| format!("Invalid fixed-dt '{value}'"))?;
                    if !dt.is_finite() || dt < 0.0 {
                        bail!("Invalid fixed-dt '{value}'. Use a non-negative number of seconds.");
                    }
                    overrides.fixed_dt = Some(dt);
                }
                "max-dt" => {
                    let dt = value.parse::<f32>().with_context(|| format!("Invalid max-dt '{value}'"))?;
                    if !dt.is_finite() || dt < 0.0 {
                        bail!("Invalid max-dt '{value}'. Use a non-negative number of seconds.");
                    }
                    overrides.max_dt = Some(dt);
                }
                _ => bail!("Unknown flag '{flag}'. Supported flags: --config, --scene, --ticks, --fixed-dt, --max-dt."),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.unwrap_or(DEFAULT_TICKS)
    }

    pub fn fixed_dt(&self) -> Option<f32> {
        self.fixed_dt
    }

    pub fn config_overrides(&self) -> GameConfigOverrides {
        GameConfigOverrides { scene_file: self.scene.clone(), max_delta_seconds: self.max_dt }
    }
}
