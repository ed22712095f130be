//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_connection(config, &mut result);
        Self::validate_client(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_connection(config: &Config, result: &mut ValidationResult) {
        let endpoint = &config.connection.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "connection.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if let Some(ref url) = config.connection.ws_url {
            if !url.starts_with("ws://") && !url.starts_with("wss://") {
                result.add_error(ValidationError::new(
                    "connection.ws_url",
                    "ws_url must start with ws:// or wss://",
                ));
            }
        }
    }

    fn validate_client(config: &Config, result: &mut ValidationResult) {
        match config.client.command_timeout_secs {
            0 => result.add_warning(ValidationWarning::new(
                "client.command_timeout_secs",
                "no command timeout, commands wait until the peer replies or disconnects",
            )),
            secs if secs > 600 => result.add_warning(ValidationWarning::new(
                "client.command_timeout_secs",
                format!("command timeout of {}s is very long", secs),
            )),
            _ => {}
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
