use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Upper bound on `render.line_count`; keeps per-frame cost bounded.
pub const MAX_LINE_COUNT: u32 = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level document: line-field tunables, viewport bounds and toast text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldConfig {
    pub version: u32,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub toast: ToastConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            version: 1,
            render: RenderConfig::default(),
            viewport: ViewportConfig::default(),
            toast: ToastConfig::default(),
        }
    }
}

/// Tunables read by the line field generator and the frame renderer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub line_count: u32,
    pub speed: f64,
    /// Line direction in radians; negative slants down to the right.
    pub tilt: f64,
    pub spacing: f64,
    pub jitter: f64,
    /// Jitter angular rate per millisecond of elapsed time.
    pub jitter_rate: f64,
    pub glow: f64,
    pub opacity: f64,
    pub width: ValueRange,
    pub brightness: ValueRange,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_count: 42,
            speed: 0.28,
            tilt: -0.65,
            spacing: 26.0,
            jitter: 10.0,
            jitter_rate: 0.0012,
            glow: 10.0,
            opacity: 0.18,
            width: ValueRange::new(1.0, 2.2),
            brightness: ValueRange::new(0.6, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_pixel_ratio: f64,
    pub max_pixel_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_pixel_ratio: 1.0,
            max_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToastConfig {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub duration: Duration,
    pub copied: String,
    pub blocked: String,
    /// Copied instead of the page address when the address is empty.
    pub fallback_link: String,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration: default_toast_duration(),
            copied: "Copied page link!".to_string(),
            blocked: "Copy blocked - copy from address bar.".to_string(),
            fallback_link: "index.html".to_string(),
        }
    }
}

/// Half-open `[min, max)` sampling range, written as `[min, max]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        if self.span() == 0.0 {
            value == self.min
        } else {
            value >= self.min && value < self.max
        }
    }
}

impl TryFrom<[f64; 2]> for ValueRange {
    type Error = String;

    fn try_from([min, max]: [f64; 2]) -> Result<Self, Self::Error> {
        if !min.is_finite() || !max.is_finite() {
            return Err(format!("range bounds must be finite, got [{min}, {max}]"));
        }
        if min > max {
            return Err(format!("range minimum {min} exceeds maximum {max}"));
        }
        Ok(Self { min, max })
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(range: ValueRange) -> Self {
        [range.min, range.max]
    }
}

fn default_toast_duration() -> Duration {
    Duration::from_millis(2200)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
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
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl FieldConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FieldConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        self.render.validate()?;
        self.viewport.validate()?;
        self.toast.validate()?;
        Ok(())
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.line_count > MAX_LINE_COUNT {
            return Err(ConfigError::Invalid(format!(
                "render.line_count {} exceeds the maximum of {MAX_LINE_COUNT}",
                self.line_count
            )));
        }

        for (name, value) in [
            ("speed", self.speed),
            ("tilt", self.tilt),
            ("jitter_rate", self.jitter_rate),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "render.{name} must be a finite number"
                )));
            }
        }

        for (name, value) in [
            ("spacing", self.spacing),
            ("jitter", self.jitter),
            ("glow", self.glow),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("render.{name} must be >= 0")));
            }
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::Invalid(
                "render.opacity must be between 0 and 1".into(),
            ));
        }

        if self.width.min < 0.0 {
            return Err(ConfigError::Invalid(
                "render.width must not contain negative widths".into(),
            ));
        }

        if self.brightness.min < 0.0 {
            return Err(ConfigError::Invalid(
                "render.brightness must not contain negative values".into(),
            ));
        }

        Ok(())
    }
}

impl ViewportConfig {
    /// Clamps a host-reported pixel ratio into the configured bounds.
    ///
    /// Non-finite or non-positive ratios (some hosts report 0 while a page
    /// is hidden) fall back to the minimum.
    pub fn clamp_pixel_ratio(&self, raw: f64) -> f64 {
        if !raw.is_finite() || raw <= 0.0 {
            return self.min_pixel_ratio;
        }
        raw.clamp(self.min_pixel_ratio, self.max_pixel_ratio)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_pixel_ratio.is_finite() || self.min_pixel_ratio <= 0.0 {
            return Err(ConfigError::Invalid(
                "viewport.min_pixel_ratio must be greater than zero".into(),
            ));
        }
        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio < self.min_pixel_ratio {
            return Err(ConfigError::Invalid(format!(
                "viewport.max_pixel_ratio must be >= min_pixel_ratio ({})",
                self.min_pixel_ratio
            )));
        }
        Ok(())
    }
}

impl ToastConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "toast.duration must be greater than zero".into(),
            ));
        }

        for (name, value) in [
            ("copied", &self.copied),
            ("blocked", &self.blocked),
            ("fallback_link", &self.fallback_link),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("toast.{name} may not be empty")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[render]
line_count = 64
speed = 0.5
tilt = -0.4
width = [0.5, 1.5]

[viewport]
max_pixel_ratio = 3

[toast]
duration = "3s"
copied = "Link copied"
"#;

    #[test]
    fn parses_sample_config() {
        let config = FieldConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.render.line_count, 64);
        assert_eq!(config.render.width, ValueRange::new(0.5, 1.5));
        assert_eq!(config.render.spacing, 26.0, "unset fields keep defaults");
        assert_eq!(config.viewport.max_pixel_ratio, 3.0);
        assert_eq!(config.toast.duration, Duration::from_secs(3));
        assert_eq!(config.toast.copied, "Link copied");
        assert_eq!(config.toast.fallback_link, "index.html");
    }

    #[test]
    fn version_only_document_yields_defaults() {
        let config = FieldConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config, FieldConfig::default());
        assert_eq!(config.toast.duration, Duration::from_millis(2200));
    }

    #[test]
    fn numeric_durations_are_seconds() {
        let config = FieldConfig::from_toml_str(
            r#"
version = 1
[toast]
duration = 1.5
"#,
        )
        .unwrap();
        assert_eq!(config.toast.duration, Duration::from_millis(1500));
    }

    #[test]
    fn default_blocked_message_is_plain_text() {
        let toast = ToastConfig::default();
        assert!(toast.blocked.is_ascii());
        assert!(toast.blocked.contains(" - "));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = FieldConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = FieldConfig::from_toml_str(
            r#"
version = 1
[render]
brightness = [1.0, 0.5]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_out_of_range_tunables() {
        for doc in [
            "version = 1\n[render]\nopacity = 1.5\n",
            "version = 1\n[render]\nspacing = -1\n",
            "version = 1\n[render]\nline_count = 100000\n",
            "version = 1\n[viewport]\nmin_pixel_ratio = 0\n",
            "version = 1\n[viewport]\nmin_pixel_ratio = 2\nmax_pixel_ratio = 1\n",
            "version = 1\n[toast]\nduration = 0\n",
            "version = 1\n[toast]\ncopied = \"  \"\n",
        ] {
            let err = FieldConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted: {doc}");
        }
    }

    #[test]
    fn clamps_pixel_ratio() {
        let viewport = ViewportConfig::default();
        assert_eq!(viewport.clamp_pixel_ratio(0.5), 1.0);
        assert_eq!(viewport.clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(viewport.clamp_pixel_ratio(3.0), 2.0);
        assert_eq!(viewport.clamp_pixel_ratio(0.0), 1.0);
        assert_eq!(viewport.clamp_pixel_ratio(f64::NAN), 1.0);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = FieldConfig::default();
        config.render.line_count = 7;
        config.toast.duration = Duration::from_millis(1250);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("line_count = 7"));
        let parsed = FieldConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn range_membership_handles_degenerate_ranges() {
        let point = ValueRange::new(2.0, 2.0);
        assert!(point.contains(2.0));
        let range = ValueRange::new(0.6, 1.0);
        assert!(range.contains(0.6));
        assert!(!range.contains(1.0));
    }
}
