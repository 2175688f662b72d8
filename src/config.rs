use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::bands::{Palette, Rgb, StatusTable};
use crate::error::ConfigError;
use crate::snapshot::parse_endpoint;

pub const MAX_HISTORY_CAPACITY: usize = 10_000;

pub const CONFIG_PATH_ENV: &str = "NEUROCURSOR_CONFIG";
pub const ENDPOINT_ENV: &str = "NEUROCURSOR_ENDPOINT";
pub const DEBUG_ENV: &str = "NEUROCURSOR_DEBUG";

/// Plausible-motion band, in raster pixels. Segments at or below `min` are
/// noise, at or above `max` are jumps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub min: f64,
    pub max: f64,
}

impl DistanceBand {
    pub fn contains(&self, distance: f64) -> bool {
        distance > self.min && distance < self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

/// Every tunable of a monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Telemetry endpoint. Default `http://localhost:5000/data`.
    pub endpoint: String,

    /// Nominal cycle budget after a successful fetch. Default 100.
    pub target_interval_ms: u64,
    /// Delay after a failed fetch. Default 500.
    pub failure_backoff_ms: u64,
    /// Per-request timeout. Default 2000.
    pub fetch_timeout_ms: u64,

    /// Samples kept for the trend display. Default 30; 0 keeps nothing.
    pub history_capacity: usize,

    /// Minimum time between two tremor alerts. Default 20000.
    pub alert_cooldown_ms: u64,
    /// Play the chime on alerts. Default true.
    pub audio_alerts: bool,

    /// Default (2, 100).
    pub distance_band: DistanceBand,
    /// Coordinate frame of incoming positions. Default 1920x1080.
    pub reference_frame: Frame,
    /// Trail surface size. Default 480x270.
    pub raster_size: RasterSize,
    pub trail_palette: Palette,
    /// Default black.
    pub background: Rgb,
    /// Opacity of the background composite applied after every draw. Default 0.1.
    pub decay_alpha: f32,
    /// Stroke width in pixels. Default 3.
    pub line_width: u32,

    /// Source-side classification, used when a payload has no status.
    pub status_thresholds: StatusTable,
    /// Consecutive failures before the link is reported offline. Default 3.
    pub offline_after_failures: u32,

    /// Console dashboard refresh cadence. Default 1000.
    pub refresh_interval_ms: u64,
    /// Where the console dashboard writes the trail image, if anywhere.
    pub trail_png_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/data".into(),
            target_interval_ms: 100,
            failure_backoff_ms: 500,
            fetch_timeout_ms: 2_000,
            history_capacity: 30,
            alert_cooldown_ms: 20_000,
            audio_alerts: true,
            distance_band: DistanceBand { min: 2.0, max: 100.0 },
            reference_frame: Frame {
                width: 1920.0,
                height: 1080.0,
            },
            raster_size: RasterSize {
                width: 480,
                height: 270,
            },
            trail_palette: Palette::default(),
            background: [0, 0, 0],
            decay_alpha: 0.1,
            line_width: 3,
            status_thresholds: StatusTable::default(),
            offline_after_failures: 3,
            refresh_interval_ms: 1_000,
            trail_png_path: None,
        }
    }
}

impl MonitorConfig {
    /// Reads a JSON config file. A missing file yields the defaults; a present
    /// but unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Defaults, then the file named by `NEUROCURSOR_CONFIG`, then
    /// `NEUROCURSOR_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_endpoint(&self.endpoint)?;

        if self.target_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("target_interval_ms"));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("fetch_timeout_ms"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("refresh_interval_ms"));
        }
        if self.failure_backoff_ms < self.target_interval_ms {
            return Err(ConfigError::BackoffTooShort {
                backoff_ms: self.failure_backoff_ms,
                target_ms: self.target_interval_ms,
            });
        }
        if self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::HistoryCapacity {
                capacity: self.history_capacity,
                max: MAX_HISTORY_CAPACITY,
            });
        }

        let band = self.distance_band;
        if !(band.min >= 0.0 && band.min < band.max) {
            return Err(ConfigError::DistanceBand {
                min: band.min,
                max: band.max,
            });
        }
        if !(self.reference_frame.width > 0.0 && self.reference_frame.height > 0.0) {
            return Err(ConfigError::EmptyDimensions {
                what: "reference frame",
                width: self.reference_frame.width,
                height: self.reference_frame.height,
            });
        }
        if self.raster_size.width == 0 || self.raster_size.height == 0 {
            return Err(ConfigError::EmptyDimensions {
                what: "raster",
                width: f64::from(self.raster_size.width),
                height: f64::from(self.raster_size.height),
            });
        }
        if !(self.decay_alpha > 0.0 && self.decay_alpha <= 1.0) {
            return Err(ConfigError::DecayAlpha(self.decay_alpha));
        }
        if self.line_width == 0 {
            return Err(ConfigError::LineWidth);
        }

        self.trail_palette.validate("trail palette")?;
        self.status_thresholds.validate("status")?;
        Ok(())
    }

    pub fn target_interval(&self) -> Duration {
        Duration::from_millis(self.target_interval_ms)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.failure_backoff_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_millis(self.alert_cooldown_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::Band;
    use crate::snapshot::Status;
    use std::io::Write;
    use std::sync::Mutex;

    // Tests that touch process environment variables take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_interval(), Duration::from_millis(100));
        assert_eq!(config.failure_backoff(), Duration::from_millis(500));
        assert_eq!(config.history_capacity, 30);
        assert_eq!(config.alert_cooldown(), Duration::from_millis(20_000));
        assert_eq!(config.distance_band, DistanceBand { min: 2.0, max: 100.0 });
    }

    #[test]
    fn distance_band_is_exclusive() {
        let band = DistanceBand { min: 2.0, max: 100.0 };
        assert!(!band.contains(2.0));
        assert!(band.contains(2.5));
        assert!(band.contains(99.9));
        assert!(!band.contains(100.0));
    }

    #[test]
    fn zero_history_capacity_is_allowed() {
        let config = MonitorConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn oversized_history_is_rejected() {
        let config = MonitorConfig {
            history_capacity: MAX_HISTORY_CAPACITY + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HistoryCapacity { .. })
        ));
    }

    #[test]
    fn inverted_distance_band_is_rejected() {
        let config = MonitorConfig {
            distance_band: DistanceBand { min: 50.0, max: 10.0 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DistanceBand { .. })
        ));
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let config = MonitorConfig {
            raster_size: RasterSize { width: 0, height: 270 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyDimensions { what: "raster", .. })
        ));

        let config = MonitorConfig {
            reference_frame: Frame { width: 1920.0, height: 0.0 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyDimensions { what: "reference frame", .. })
        ));
    }

    #[test]
    fn decay_alpha_must_be_a_fraction() {
        for alpha in [0.0, -0.5, 1.5, f32::NAN] {
            let config = MonitorConfig {
                decay_alpha: alpha,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "alpha {alpha} accepted");
        }
    }

    #[test]
    fn backoff_must_not_undercut_target() {
        let config = MonitorConfig {
            failure_backoff_ms: 50,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BackoffTooShort {
                backoff_ms: 50,
                target_ms: 100
            })
        );
    }

    #[test]
    fn unordered_palette_is_rejected() {
        let config = MonitorConfig {
            trail_palette: Palette::new(
                vec![
                    Band { upto: 70, value: [0, 0, 0] },
                    Band { upto: 30, value: [1, 1, 1] },
                ],
                [2, 2, 2],
            ),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ThresholdOrder("trail palette"))
        );
    }

    #[test]
    fn empty_threshold_tables_are_rejected() {
        let config = MonitorConfig {
            trail_palette: Palette::new(Vec::new(), [1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyThresholds("trail palette"))
        );

        let config = MonitorConfig {
            status_thresholds: StatusTable::new(Vec::new(), Status::Tremor),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyThresholds("status"))
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"history_capacity": 60, "distance_band": {{"min": 1.0, "max": 80.0}}}}"#
        )
        .unwrap();

        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.history_capacity, 60);
        assert_eq!(config.distance_band, DistanceBand { min: 1.0, max: 80.0 });
        assert_eq!(config.target_interval_ms, 100);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(MonitorConfig::load(&path).is_err());
    }

    #[test]
    fn env_overrides_file_then_endpoint() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.json");
        fs::write(
            &path,
            r#"{"endpoint": "http://file-host:5000/data", "alert_cooldown_ms": 5000}"#,
        )
        .unwrap();

        std::env::set_var(CONFIG_PATH_ENV, &path);
        std::env::remove_var(ENDPOINT_ENV);
        let from_file = MonitorConfig::from_env().unwrap();
        assert_eq!(from_file.endpoint, "http://file-host:5000/data");
        assert_eq!(from_file.alert_cooldown_ms, 5000);

        std::env::set_var(ENDPOINT_ENV, "http://env-host:6000/data");
        let overridden = MonitorConfig::from_env().unwrap();
        assert_eq!(overridden.endpoint, "http://env-host:6000/data");
        assert_eq!(overridden.alert_cooldown_ms, 5000);

        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(ENDPOINT_ENV);
        assert_eq!(MonitorConfig::from_env().unwrap(), MonitorConfig::default());
    }

    #[test]
    fn debug_flag_accepts_one_or_true() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let cases = [
            ("1", true),
            ("true", true),
            ("TRUE", true),
            ("0", false),
            ("yes", false),
        ];
        for (value, expected) in cases {
            std::env::set_var(DEBUG_ENV, value);
            assert_eq!(debug_enabled(), expected, "value {value}");
        }
        std::env::remove_var(DEBUG_ENV);
        assert!(!debug_enabled());
    }
}
