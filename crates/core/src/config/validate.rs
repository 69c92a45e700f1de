use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Polling budget has at least one attempt
/// - Lock-in amount is positive
/// - Mailbox has at least one domain and usable code and link patterns
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.acquisition.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "acquisition.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.acquisition.lock_in_litres == 0 {
        return Err(ConfigError::ValidationError(
            "acquisition.lock_in_litres must be at least 1".to_string(),
        ));
    }

    if config.mailbox.domains.is_empty() {
        return Err(ConfigError::ValidationError(
            "mailbox.domains cannot be empty".to_string(),
        ));
    }

    let pattern = regex_lite::Regex::new(&config.mailbox.code_pattern).map_err(|e| {
        ConfigError::ValidationError(format!("mailbox.code_pattern is invalid: {}", e))
    })?;
    if pattern.captures_len() < 2 {
        return Err(ConfigError::ValidationError(
            "mailbox.code_pattern must contain a capture group for the code".to_string(),
        ));
    }

    regex_lite::Regex::new(&config.mailbox.link_pattern).map_err(|e| {
        ConfigError::ValidationError(format!("mailbox.link_pattern is invalid: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_attempts_fails() {
        let mut config = Config::default();
        config.acquisition.max_attempts = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_zero_litres_fails() {
        let mut config = Config::default();
        config.acquisition.lock_in_litres = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_domains_fails() {
        let mut config = Config::default();
        config.mailbox.domains.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_pattern_without_group_fails() {
        let mut config = Config::default();
        config.mailbox.code_pattern = r"[0-9]{6}".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("capture group"));
    }

    #[test]
    fn test_validate_broken_pattern_fails() {
        let mut config = Config::default();
        config.mailbox.code_pattern = r"([0-9]".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_link_pattern_fails() {
        let mut config = Config::default();
        config.mailbox.link_pattern = "https://[".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("link_pattern"));
    }
}
