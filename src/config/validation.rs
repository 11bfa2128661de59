//! Configuration validation.
//!
//! Catches mistakes at startup that would otherwise surface as odd runtime
//! behaviour.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.name must not contain spaces: '{0}'")]
    InvalidServerName(String),
    #[error("channels.default_modes may only use +, - and imnpst, got '{0}'")]
    InvalidDefaultModes(String),
    #[error("oper '{name}' has an invalid host pattern '{host}'")]
    InvalidOperHost { name: String, host: String },
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = &config.server.name;
    if name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    } else if name.contains(' ') {
        errors.push(ValidationError::InvalidServerName(name.clone()));
    }

    let modes = &config.channels.default_modes;
    if !modes.chars().all(|c| "+-imnpst".contains(c)) {
        errors.push(ValidationError::InvalidDefaultModes(modes.clone()));
    }

    for oper in &config.oper {
        if let Some(host) = oper.host.as_deref().filter(|h| !h.is_empty())
            && !tinyircd_proto::validate_mask(host)
        {
            errors.push(ValidationError::InvalidOperHost {
                name: oper.name.clone(),
                host: host.to_string(),
            });
        }
    }

    let limits = &config.limits;
    for (field, value) in [
        ("max_nick_length", limits.max_nick_length),
        ("max_channel_name", limits.max_channel_name),
        ("max_channels", limits.max_channels),
        ("max_users_per_channel", limits.max_users_per_channel),
        ("max_line_length", limits.max_line_length),
        ("sendq", limits.sendq),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn collects_every_error() {
        let config = parse(
            r#"
[server]
name = ""
network = "n"

[limits]
sendq = 0

[[oper]]
name = "x"
password = "y"
host = "**"
"#,
        );
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn accepts_sane_config() {
        let config = parse("[server]\nname = \"irc.test\"\nnetwork = \"n\"\n");
        assert!(validate(&config).is_ok());
    }
}
