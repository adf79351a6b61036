//! Loading [`DeviceSettings`] from documents and host option maps

use core::fmt::Display;
use core::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use crate::types::{AngleSource, DeviceSettings, Mode, MotionSource};

/// Failure to read or write a settings document
///
/// Individual out-of-range values never fail; they are clamped by
/// [`DeviceSettings::sanitized`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Values that can be read from a host option string
trait OptionValue: Sized + Display {
    fn parse_option(raw: &str) -> Option<Self>;
}

macro_rules! from_str_option {
    ($($ty:ty),*) => {
        $(impl OptionValue for $ty {
            fn parse_option(raw: &str) -> Option<Self> {
                <$ty as FromStr>::from_str(raw.trim()).ok()
            }
        })*
    };
}

from_str_option!(i32, u32);

impl OptionValue for f64 {
    fn parse_option(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

impl OptionValue for bool {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "on" | "yes" | "true" => Some(true),
            "0" | "off" | "no" | "false" => Some(false),
            _ => None,
        }
    }
}

impl OptionValue for Mode {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pointer" => Some(Mode::Pointer),
            "game" => Some(Mode::Game),
            _ => None,
        }
    }
}

impl OptionValue for MotionSource {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(MotionSource::None),
            "ir" => Some(MotionSource::Ir),
            "accelerometer" => Some(MotionSource::Accelerometer),
            "motionplus" => Some(MotionSource::MotionPlus),
            _ => None,
        }
    }
}

/// Read `key` through `lookup`, keeping `current` when absent or unparsable
fn read_option<'a, T, F>(lookup: &F, key: &str, current: T) -> T
where
    T: OptionValue,
    F: Fn(&str) -> Option<&'a str>,
{
    let Some(raw) = lookup(key) else {
        return current;
    };
    match T::parse_option(raw) {
        Some(value) => {
            info!(option = key, %value, "applied option");
            value
        }
        None => {
            warn!(option = key, value = raw, default = %current, "invalid option value, keeping default");
            current
        }
    }
}

impl DeviceSettings {
    /// Parse settings from a TOML document
    ///
    /// Missing tables and keys take their defaults, and the result is
    /// sanitized.
    ///
    /// # Example
    /// ```
    /// use pointer_fusion::{AngleSource, DeviceSettings, Mode};
    ///
    /// let settings = DeviceSettings::from_toml_str(r#"
    ///     mode = "game"
    ///
    ///     [angle_source]
    ///     kind = "blend"
    ///     gyro_weight = 0.75
    ///
    ///     [ir]
    ///     avg_radius = 12
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.mode, Mode::Game);
    /// assert_eq!(settings.angle_source, AngleSource::Blend { gyro_weight: 0.75 });
    /// assert_eq!(settings.ir.avg_radius, 12);
    /// assert_eq!(settings.ir.avg_max_samples, 8);
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let settings: DeviceSettings = toml::from_str(document)?;
        Ok(settings.sanitized())
    }

    /// Render the settings as a TOML document
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Overlay host driver options onto these settings
    ///
    /// Every key is `prefix` followed by the option name, e.g.
    /// `"IRAvgRadius"` or `"NunchukIRAvgRadius"`. Absent keys keep the
    /// current value; unparsable values keep it too and log a warning. The
    /// result is sanitized, so `IRAvgMinSamples` above `IRAvgMaxSamples`
    /// is clamped rather than rejected.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    /// use pointer_fusion::{DeviceSettings, Mode};
    ///
    /// let options = HashMap::from([
    ///     ("IRAvgRadius", "15"),
    ///     ("IRAvgWeight", "lots"),
    ///     ("Mode", "game"),
    /// ]);
    /// let settings = DeviceSettings::default()
    ///     .with_options("", |key| options.get(key).copied());
    ///
    /// assert_eq!(settings.ir.avg_radius, 15);
    /// assert_eq!(settings.ir.avg_weight, 3);
    /// assert_eq!(settings.mode, Mode::Game);
    /// ```
    pub fn with_options<'a, F>(mut self, prefix: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let key = |name: &str| format!("{prefix}{name}");

        self.mode = read_option(&lookup, &key("Mode"), self.mode);
        self.motion_source = read_option(&lookup, &key("MotionSource"), self.motion_source);

        let ir = &mut self.ir;
        ir.avg_radius = read_option(&lookup, &key("IRAvgRadius"), ir.avg_radius);
        ir.avg_max_samples = read_option(&lookup, &key("IRAvgMaxSamples"), ir.avg_max_samples);
        ir.avg_min_samples = read_option(&lookup, &key("IRAvgMinSamples"), ir.avg_min_samples);
        ir.avg_weight = read_option(&lookup, &key("IRAvgWeight"), ir.avg_weight);
        ir.keymap_expiry_secs = read_option(&lookup, &key("IRKeymapExpirySecs"), ir.keymap_expiry_secs);
        ir.remove_rotation = read_option(&lookup, &key("RemoveRotation"), ir.remove_rotation);

        let scroll = &mut self.scroll;
        scroll.border_x = read_option(&lookup, &key("IRContinuousScrollBorderX"), scroll.border_x);
        scroll.border_y = read_option(&lookup, &key("IRContinuousScrollBorderY"), scroll.border_y);
        scroll.max_speed_x = read_option(&lookup, &key("IRContinuousScrollMaxX"), scroll.max_speed_x);
        scroll.max_speed_y = read_option(&lookup, &key("IRContinuousScrollMaxY"), scroll.max_speed_y);
        scroll.screen_ratio = read_option(&lookup, &key("IRScreenRatio"), scroll.screen_ratio);

        let angle = &mut self.angle;
        angle.angle_deadzone = read_option(&lookup, &key("AccelAngleDeadzone"), angle.angle_deadzone);
        angle.max_angle_delta = read_option(&lookup, &key("AccelMaxAngleDelta"), angle.max_angle_delta);
        angle.max_deadzone_angle_delta = read_option(
            &lookup,
            &key("AccelMaxDeadzoneAngleDelta"),
            angle.max_deadzone_angle_delta,
        );

        let gyro = &mut self.gyro;
        gyro.scale = read_option(&lookup, &key("MotionPlusScale"), gyro.scale);
        gyro.expiry_secs = read_option(&lookup, &key("MotionPlusExpirySecs"), gyro.expiry_secs);

        self.angle_source = self.read_angle_source(&lookup, &key("AngleSource"), &key("AngleSourceGyroWeight"));

        self.sanitized()
    }

    fn read_angle_source<'a, F>(&self, lookup: &F, source_key: &str, weight_key: &str) -> AngleSource
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let current_weight = match self.angle_source {
            AngleSource::Blend { gyro_weight } => gyro_weight,
            _ => 0.5,
        };
        let gyro_weight = read_option(lookup, weight_key, current_weight);

        let Some(raw) = lookup(source_key) else {
            return match self.angle_source {
                AngleSource::Blend { .. } => AngleSource::Blend { gyro_weight },
                other => other,
            };
        };
        let source = match raw.trim().to_ascii_lowercase().as_str() {
            "accelerometer" => AngleSource::Accelerometer,
            "motionplus" => AngleSource::MotionPlus,
            "blend" => AngleSource::Blend { gyro_weight },
            _ => {
                warn!(option = source_key, value = raw, "invalid angle source, keeping default");
                return self.angle_source;
            }
        };
        info!(option = source_key, value = raw, "applied option");
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(prefix: &str, pairs: &[(&'static str, &'static str)]) -> DeviceSettings {
        let options: HashMap<&str, &str> = pairs.iter().copied().collect();
        DeviceSettings::default().with_options(prefix, |key| options.get(key).copied())
    }

    #[test]
    fn test_empty_document_is_default() {
        let settings = DeviceSettings::from_toml_str("").unwrap();
        assert_eq!(settings, DeviceSettings::default());
    }

    #[test]
    fn test_malformed_document_is_error() {
        let result = DeviceSettings::from_toml_str("mode = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_document_values_are_clamped() {
        let settings = DeviceSettings::from_toml_str(
            "[ir]\navg_max_samples = 5\navg_min_samples = 50\n[scroll]\nborder_x = 0\n",
        )
        .unwrap();
        assert_eq!(settings.ir.avg_min_samples, 5);
        assert_eq!(settings.scroll.border_x, 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = DeviceSettings {
            mode: Mode::Game,
            angle_source: AngleSource::Blend { gyro_weight: 0.25 },
            ..Default::default()
        };
        let document = settings.to_toml_string().unwrap();
        assert_eq!(DeviceSettings::from_toml_str(&document).unwrap(), settings);
    }

    #[test]
    fn test_prefixed_options() {
        let settings = settings_from(
            "Nunchuk",
            &[
                ("NunchukIRAvgMaxSamples", "16"),
                ("NunchukIRAvgMinSamples", "6"),
                ("NunchukIRKeymapExpirySecs", "3"),
                ("NunchukRemoveRotation", "off"),
                ("IRAvgRadius", "99"),
            ],
        );
        assert_eq!(settings.ir.avg_max_samples, 16);
        assert_eq!(settings.ir.avg_min_samples, 6);
        assert_eq!(settings.ir.keymap_expiry_secs, 3);
        assert!(!settings.ir.remove_rotation);
        assert_eq!(settings.ir.avg_radius, 10);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let settings = settings_from(
            "",
            &[
                ("IRAvgRadius", "ten"),
                ("RemoveRotation", "maybe"),
                ("AccelAngleDeadzone", ""),
                ("Mode", "joystick"),
            ],
        );
        assert_eq!(settings, DeviceSettings::default());
    }

    #[test]
    fn test_non_finite_options_fall_back() {
        let settings = settings_from(
            "",
            &[
                ("MotionPlusScale", "NaN"),
                ("MotionPlusExpirySecs", "inf"),
                ("AccelMaxAngleDelta", "-infinity"),
                ("AngleSource", "blend"),
                ("AngleSourceGyroWeight", "nan"),
            ],
        );
        assert_eq!(settings.gyro, DeviceSettings::default().gyro);
        assert_eq!(settings.angle, DeviceSettings::default().angle);
        assert_eq!(settings.angle_source, AngleSource::Blend { gyro_weight: 0.5 });
    }

    #[test]
    fn test_non_finite_document_values_fall_back() {
        let settings = DeviceSettings::from_toml_str("[gyro]\nscale = nan\n[angle]\nangle_deadzone = inf\n").unwrap();
        assert_eq!(settings.gyro.scale, 0.05);
        assert_eq!(settings.angle.angle_deadzone, 10.0);
    }

    #[test]
    fn test_out_of_range_options_clamped() {
        let settings = settings_from("", &[("IRAvgMaxSamples", "0"), ("IRAvgMinSamples", "4")]);
        assert_eq!(settings.ir.avg_max_samples, 1);
        assert_eq!(settings.ir.avg_min_samples, 1);
    }

    #[test]
    fn test_scroll_and_angle_options() {
        let settings = settings_from(
            "",
            &[
                ("IRContinuousScrollBorderX", "120"),
                ("IRContinuousScrollMaxY", "25"),
                ("AccelAngleDeadzone", "4.5"),
                ("AccelMaxAngleDelta", "0.5"),
                ("MotionPlusScale", "0.1"),
            ],
        );
        assert_eq!(settings.scroll.border_x, 120);
        assert_eq!(settings.scroll.max_speed_y, 25);
        assert_eq!(settings.angle.angle_deadzone, 4.5);
        assert_eq!(settings.angle.max_angle_delta, 0.5);
        assert_eq!(settings.gyro.scale, 0.1);
    }

    #[test]
    fn test_motion_source_option() {
        let settings = settings_from("", &[("MotionSource", "None")]);
        assert_eq!(settings.motion_source, MotionSource::None);

        let settings = settings_from("", &[("MotionSource", "motionplus")]);
        assert_eq!(settings.motion_source, MotionSource::MotionPlus);

        let settings = settings_from("", &[("MotionSource", "joystick")]);
        assert_eq!(settings.motion_source, MotionSource::Ir);

        let settings = DeviceSettings::from_toml_str("motion_source = \"accelerometer\"").unwrap();
        assert_eq!(settings.motion_source, MotionSource::Accelerometer);
    }

    #[test]
    fn test_angle_source_options() {
        let settings = settings_from("", &[("AngleSource", "MotionPlus")]);
        assert_eq!(settings.angle_source, AngleSource::MotionPlus);

        let settings = settings_from("", &[("AngleSource", "blend"), ("AngleSourceGyroWeight", "0.9")]);
        assert_eq!(settings.angle_source, AngleSource::Blend { gyro_weight: 0.9 });

        let settings = settings_from("", &[("AngleSource", "compass")]);
        assert_eq!(settings.angle_source, AngleSource::Accelerometer);
    }
}
