//! Self-state monitor configuration
//!
//! The TOML-facing [`SelfStateConfig`] keeps durations as strings; it is
//! validated once at startup into the immutable [`SelfStateSettings`].

use crate::domain::{parse_positive_duration, Contact};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[selfstate]` table as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfStateConfig {
    /// If true, the self-state monitor is enabled
    pub enabled: bool,
    /// If true, the remote checker is watched as well
    pub remote_triggers_enabled: bool,
    /// Max store disconnect delay before alerting
    #[serde(alias = "redis_disconect_delay")]
    pub redis_disconnect_delay: String,
    /// Max delay without received metrics before alerting
    pub last_metric_received_delay: String,
    /// Max delay without local trigger checks before alerting
    pub last_check_delay: String,
    /// Max delay without remote trigger checks before alerting
    pub last_remote_check_delay: Option<String>,
    /// Minimum spacing between repeated notices
    pub notice_interval: String,
    /// Monitor evaluation cadence
    pub check_interval: String,
    /// Send an all-clear notice when the pipeline recovers
    pub recovery_notice: bool,
    /// Contacts notified about self-state changes
    pub contacts: Vec<Contact>,
}

impl Default for SelfStateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remote_triggers_enabled: false,
            redis_disconnect_delay: "30s".to_string(),
            last_metric_received_delay: "60s".to_string(),
            last_check_delay: "60s".to_string(),
            last_remote_check_delay: None,
            notice_interval: "300s".to_string(),
            check_interval: "10s".to_string(),
            recovery_notice: false,
            contacts: Vec::new(),
        }
    }
}

impl SelfStateConfig {
    /// Validate into typed settings
    ///
    /// # Errors
    /// Fails on unparseable or zero durations, thresholds that are not whole
    /// seconds, a missing remote delay when
    /// remote triggers are enabled, or an empty/invalid contact list when
    /// the monitor is enabled.
    pub fn to_settings(&self) -> Result<SelfStateSettings, ConfigError> {
        let remote = (&self.last_remote_check_delay, self.remote_triggers_enabled);
        let last_remote_check_delay = match remote {
            (Some(raw), _) => Some(parse_threshold("selfstate.last_remote_check_delay", raw)?),
            (None, true) => {
                return Err(ConfigError::MissingField(
                    "selfstate.last_remote_check_delay".to_string(),
                ))
            }
            (None, false) => None,
        };

        if self.enabled && self.contacts.is_empty() {
            return Err(ConfigError::MissingField("selfstate.contacts".to_string()));
        }
        for contact in &self.contacts {
            contact.validate()?;
        }

        Ok(SelfStateSettings {
            enabled: self.enabled,
            remote_triggers_enabled: self.remote_triggers_enabled,
            redis_disconnect_delay: parse_threshold(
                "selfstate.redis_disconnect_delay",
                &self.redis_disconnect_delay,
            )?,
            last_metric_received_delay: parse_threshold(
                "selfstate.last_metric_received_delay",
                &self.last_metric_received_delay,
            )?,
            last_check_delay: parse_threshold(
                "selfstate.last_check_delay",
                &self.last_check_delay,
            )?,
            last_remote_check_delay,
            notice_interval: parse_threshold(
                "selfstate.notice_interval",
                &self.notice_interval,
            )?,
            check_interval: parse_positive_duration(
                "selfstate.check_interval",
                &self.check_interval,
            )?,
            recovery_notice: self.recovery_notice,
            contacts: self.contacts.clone(),
        })
    }
}

/// Thresholds are compared in whole unix seconds
fn parse_threshold(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let duration = parse_positive_duration(key, raw)?;
    if duration.subsec_nanos() != 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{} is not a whole number of seconds", raw),
        });
    }
    Ok(duration)
}

/// Validated, immutable monitor settings
#[derive(Debug, Clone, PartialEq)]
pub struct SelfStateSettings {
    pub enabled: bool,
    pub remote_triggers_enabled: bool,
    pub redis_disconnect_delay: Duration,
    pub last_metric_received_delay: Duration,
    pub last_check_delay: Duration,
    /// Present whenever `remote_triggers_enabled` is true
    pub last_remote_check_delay: Option<Duration>,
    pub notice_interval: Duration,
    pub check_interval: Duration,
    pub recovery_notice: bool,
    pub contacts: Vec<Contact>,
}

impl SelfStateSettings {
    /// Remote-check threshold, if the remote dimension is watched
    pub fn remote_check_delay(&self) -> Option<Duration> {
        if self.remote_triggers_enabled {
            self.last_remote_check_delay
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> SelfStateConfig {
        SelfStateConfig {
            enabled: true,
            contacts: vec![Contact::new("stderr", "ops").unwrap()],
            ..SelfStateConfig::default()
        }
    }

    #[test]
    fn test_defaults_validate_when_disabled() {
        let settings = SelfStateConfig::default().to_settings().unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.redis_disconnect_delay, Duration::from_secs(30));
        assert_eq!(settings.last_metric_received_delay, Duration::from_secs(60));
        assert_eq!(settings.notice_interval, Duration::from_secs(300));
        assert_eq!(settings.remote_check_delay(), None);
    }

    #[test]
    fn test_enabled_requires_contacts() {
        let config = SelfStateConfig {
            enabled: true,
            ..SelfStateConfig::default()
        };
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::MissingField(f)) if f == "selfstate.contacts"
        ));
        assert!(enabled_config().to_settings().is_ok());
    }

    #[test]
    fn test_remote_enabled_requires_delay() {
        let mut config = enabled_config();
        config.remote_triggers_enabled = true;
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::MissingField(_))
        ));

        config.last_remote_check_delay = Some("5m".to_string());
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.remote_check_delay(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_bad_duration_fails() {
        let mut config = enabled_config();
        config.notice_interval = "soon".to_string();
        let err = config.to_settings().unwrap_err();
        assert!(err.to_string().contains("selfstate.notice_interval"));
    }

    #[test]
    fn test_sub_second_threshold_rejected() {
        let mut config = enabled_config();
        config.notice_interval = "500ms".to_string();
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "selfstate.notice_interval"
        ));

        let mut config = enabled_config();
        config.last_check_delay = "1500ms".to_string();
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "selfstate.last_check_delay"
        ));

        let mut config = enabled_config();
        config.check_interval = "500ms".to_string();
        config.redis_disconnect_delay = "1s".to_string();
        assert!(config.to_settings().is_ok());
    }

    #[test]
    fn test_parse_from_toml() {
        let config: SelfStateConfig = toml::from_str(
            r#"
            enabled = true
            redis_disconect_delay = "45s"
            notice_interval = "10m"

            [[contacts]]
            type = "file"
            value = "/var/log/selfwatch.jsonl"
            "#,
        )
        .unwrap();

        let settings = config.to_settings().unwrap();
        assert_eq!(settings.redis_disconnect_delay, Duration::from_secs(45));
        assert_eq!(settings.notice_interval, Duration::from_secs(600));
        assert_eq!(settings.contacts[0].contact_type, "file");
        assert_eq!(settings.last_check_delay, Duration::from_secs(60));
    }
}
