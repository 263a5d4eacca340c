use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coverflow")
        .join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: Settings,
}

/// Read-only snapshot injected into every switcher session.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Largest preview as a fraction of the monitor size.
    #[serde(default = "default_preview_scale")]
    pub preview_scale: f64,
    /// Seconds.
    #[serde(default = "default_animation_time")]
    pub animation_time: f64,
    #[serde(default)]
    pub animation_easing: AnimationEasing,
    #[serde(default = "default_dim_factor")]
    pub dim_factor: f64,
    #[serde(default = "yes")]
    pub hide_panel: bool,
    #[serde(default)]
    pub icon_style: IconStyle,
    #[serde(default = "default_icon_size")]
    pub icon_size: f64,
    #[serde(default = "default_icon_size_big")]
    pub icon_size_big: f64,
    #[serde(default = "default_icon_title_spacing")]
    pub icon_title_spacing: f64,
    /// Title row, in eighths of the monitor height from the top.
    #[serde(default = "default_title_position")]
    pub title_position: f64,
    /// Vertical shift applied to the title and every preview.
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_check_destroyed_ms")]
    pub check_destroyed_ms: u64,
    #[serde(default = "default_switch_interval_ms")]
    pub switch_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_scale: default_preview_scale(),
            animation_time: default_animation_time(),
            animation_easing: AnimationEasing::default(),
            dim_factor: default_dim_factor(),
            hide_panel: true,
            icon_style: IconStyle::default(),
            icon_size: default_icon_size(),
            icon_size_big: default_icon_size_big(),
            icon_title_spacing: default_icon_title_spacing(),
            title_position: default_title_position(),
            offset: 0.0,
            initial_delay_ms: default_initial_delay_ms(),
            check_destroyed_ms: default_check_destroyed_ms(),
            switch_interval_ms: default_switch_interval_ms(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconStyle {
    /// Small icon to the left of the title.
    #[default]
    Classic,
    /// Large icon centered over the monitor.
    Big,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default, Copy)]
#[serde(rename_all = "snake_case")]
pub enum AnimationEasing {
    Linear,
    EaseInQuad,
    #[default]
    EaseOutQuad,
    EaseInOutQuad,
    EaseOutCubic,
    EaseInOutSine,
}

/// Longest accepted `animation_time`, in seconds.
pub const MAX_ANIMATION_TIME: f64 = 10.0;

impl Settings {
    pub fn animation_duration(&self) -> Duration {
        // NaN falls through to zero.
        Duration::try_from_secs_f64(self.animation_time.clamp(0.0, MAX_ANIMATION_TIME))
            .unwrap_or(Duration::ZERO)
    }

    pub fn initial_delay(&self) -> Duration { Duration::from_millis(self.initial_delay_ms) }

    pub fn check_destroyed_delay(&self) -> Duration {
        Duration::from_millis(self.check_destroyed_ms)
    }

    pub fn switch_interval(&self) -> Duration { Duration::from_millis(self.switch_interval_ms) }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.preview_scale > 0.0 && self.preview_scale <= 1.0) {
            issues.push(format!(
                "preview_scale must be in (0, 1], got {}",
                self.preview_scale
            ));
        }

        if !(0.0..=MAX_ANIMATION_TIME).contains(&self.animation_time) {
            issues.push(format!(
                "animation_time must be in [0, {MAX_ANIMATION_TIME}] seconds, got {}",
                self.animation_time
            ));
        }

        if !(0.0..=1.0).contains(&self.dim_factor) {
            issues.push(format!("dim_factor must be in [0, 1], got {}", self.dim_factor));
        }

        for (name, value) in [("icon_size", self.icon_size), ("icon_size_big", self.icon_size_big)]
        {
            if !(value.is_finite() && value > 0.0) {
                issues.push(format!("{name} must be positive, got {value}"));
            }
        }

        if !(self.icon_title_spacing.is_finite() && self.icon_title_spacing >= 0.0) {
            issues.push(format!(
                "icon_title_spacing must be non-negative, got {}",
                self.icon_title_spacing
            ));
        }

        for (name, value) in [("title_position", self.title_position), ("offset", self.offset)] {
            if !value.is_finite() {
                issues.push(format!("{name} must be finite, got {value}"));
            }
        }

        issues
    }
}

fn yes() -> bool { true }

fn default_preview_scale() -> f64 { 0.5 }

fn default_animation_time() -> f64 { 0.25 }

fn default_dim_factor() -> f64 { 0.4 }

fn default_icon_size() -> f64 { 64.0 }

fn default_icon_size_big() -> f64 { 128.0 }

fn default_icon_title_spacing() -> f64 { 10.0 }

fn default_title_position() -> f64 { 7.0 }

fn default_initial_delay_ms() -> u64 { 150 }

fn default_check_destroyed_ms() -> u64 { 100 }

fn default_switch_interval_ms() -> u64 { 150 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../coverflow.default.toml"))
            .expect("embedded default config must parse")
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_file = ConfigFile { settings: self.settings.clone() };
        let toml_string = toml::to_string_pretty(&config_file)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<ConfigFile>(buf) {
            Ok(c) => Ok(Config { settings: c.settings }),
            Err(e) => bail!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config_matches_settings_default() {
        let config = Config::default();
        assert_eq!(config.settings, Settings::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let cfg = Config::parse(
            r#"
            [settings]
            icon_style = "big"
            animation_time = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.settings.icon_style, IconStyle::Big);
        assert_eq!(cfg.settings.animation_duration(), Duration::from_millis(500));
        assert_eq!(cfg.settings.preview_scale, 0.5);
        assert_eq!(cfg.settings.initial_delay(), Duration::from_millis(150));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Config::parse("[settings]\npreview_scael = 0.3\n").unwrap_err();
        assert!(err.to_string().contains("preview_scael"));
    }

    #[test]
    fn test_validation_reports_each_issue() {
        let settings = Settings {
            preview_scale: 1.5,
            animation_time: -1.0,
            dim_factor: 2.0,
            icon_size: 0.0,
            ..Settings::default()
        };
        let issues = settings.validate();
        assert_eq!(issues.len(), 4, "{issues:?}");
        assert!(issues.iter().any(|i| i.contains("preview_scale")));
        assert!(issues.iter().any(|i| i.contains("icon_size must be positive")));
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.settings.hide_panel = false;
        config.settings.offset = 24.0;
        config.save(&path).unwrap();

        let read = Config::read(&path).unwrap();
        assert_eq!(read, config);
    }

    #[test]
    fn test_easing_names() {
        let serialized = serde_json::to_string(&AnimationEasing::EaseOutQuad).unwrap();
        assert_eq!(serialized, "\"ease_out_quad\"");
        let cfg = Config::parse("[settings]\nanimation_easing = \"ease_in_out_sine\"\n").unwrap();
        assert_eq!(cfg.settings.animation_easing, AnimationEasing::EaseInOutSine);
    }

    #[test]
    fn test_unbounded_animation_time_is_rejected_and_clamped() {
        for raw in ["inf", "1e300", "nan"] {
            let cfg = Config::parse(&format!("[settings]\nanimation_time = {raw}\n")).unwrap();
            let issues = cfg.validate();
            assert_eq!(issues.len(), 1, "{raw}: {issues:?}");
            assert!(issues[0].contains("animation_time"), "{raw}: {issues:?}");
        }

        let huge = Settings { animation_time: 1e300, ..Settings::default() };
        assert_eq!(huge.animation_duration(), Duration::from_secs(10));
        let infinite = Settings { animation_time: f64::INFINITY, ..Settings::default() };
        assert_eq!(infinite.animation_duration(), Duration::from_secs(10));
        let nan = Settings { animation_time: f64::NAN, ..Settings::default() };
        assert_eq!(nan.animation_duration(), Duration::ZERO);
    }

    #[test]
    fn test_non_finite_geometry_is_rejected() {
        let settings = Settings {
            preview_scale: f64::INFINITY,
            icon_size_big: f64::INFINITY,
            icon_title_spacing: f64::NAN,
            title_position: f64::NEG_INFINITY,
            offset: f64::NAN,
            ..Settings::default()
        };
        let issues = settings.validate();
        assert_eq!(issues.len(), 5, "{issues:?}");
        for name in ["preview_scale", "icon_size_big", "icon_title_spacing", "title_position", "offset"]
        {
            assert!(issues.iter().any(|i| i.starts_with(name)), "{name}: {issues:?}");
        }
    }
}
