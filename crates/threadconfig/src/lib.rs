use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Largest line count the renderer's shader loop accepts.
pub const MAX_LINE_COUNT: u32 = 128;
/// Upper bound for `render.max_pixel_ratio`.
pub const MAX_PIXEL_RATIO_LIMIT: f64 = 4.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of `threadpaper.toml`. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreadsConfig {
    pub threads: ThreadsSection,
    pub render: RenderSection,
    pub window: WindowSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreadsSection {
    pub amplitude: f32,
    pub distance_skew: f32,
    pub pointer_interaction: bool,
}

impl Default for ThreadsSection {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            distance_skew: 0.0,
            pointer_interaction: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub line_count: u32,
    pub max_pixel_ratio: f64,
    #[serde(deserialize_with = "deserialize_duration")]
    pub resize_debounce: Duration,
    pub power: PowerSetting,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            line_count: 40,
            max_pixel_ratio: 1.5,
            resize_debounce: Duration::from_millis(100),
            power: PowerSetting::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "threadpaper".into(),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration must be non-negative"))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Duration::try_from_secs_f64(v)
                .map_err(|_| E::custom("duration must be a finite, non-negative number"))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl ThreadsConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ThreadsConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threads.amplitude.is_finite() {
            return Err(ConfigError::Invalid(
                "threads.amplitude must be a finite number".into(),
            ));
        }

        if !self.threads.distance_skew.is_finite() {
            return Err(ConfigError::Invalid(
                "threads.distance_skew must be a finite number".into(),
            ));
        }

        if !(1..=MAX_LINE_COUNT).contains(&self.render.line_count) {
            return Err(ConfigError::Invalid(format!(
                "render.line_count must be between 1 and {MAX_LINE_COUNT}, got {}",
                self.render.line_count
            )));
        }

        let ratio = self.render.max_pixel_ratio;
        if !(ratio > 0.0 && ratio <= MAX_PIXEL_RATIO_LIMIT) {
            return Err(ConfigError::Invalid(format!(
                "render.max_pixel_ratio must be in (0, {MAX_PIXEL_RATIO_LIMIT}], got {ratio}"
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        Ok(())
    }
}
