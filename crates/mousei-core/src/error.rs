//! Error types for Mousei

use thiserror::Error;

/// The main error type for Mousei operations
///
/// Everything except snapshot I/O is a configuration problem detected before
/// the first frame runs.
#[derive(Debug, Error)]
pub enum MouseiError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid range for {field}: min {min} is greater than max {max}")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl MouseiError {
    /// Shorthand for a field that must be strictly positive
    pub fn not_positive(field: &str, value: f64) -> Self {
        MouseiError::ValueOutOfRange {
            field: field.to_string(),
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
            value,
        }
    }
}

/// Result type alias for Mousei operations
pub type Result<T> = std::result::Result<T, MouseiError>;

impl From<toml::de::Error> for MouseiError {
    fn from(err: toml::de::Error) -> Self {
        MouseiError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_error_message_names_field() {
        let err = MouseiError::InvalidRange {
            field: "size".into(),
            min: 30.0,
            max: 10.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("size"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn toml_error_converts() {
        let parsed: std::result::Result<toml::value::Table, _> = toml::from_str("max_particles = ");
        let err: MouseiError = parsed.unwrap_err().into();
        assert!(matches!(err, MouseiError::TomlParseError(_)));
    }
}
