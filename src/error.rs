use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartStopError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl StartStopError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StartStopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_error_message() {
        let err = StartStopError::component("worker", "socket refused");
        assert_eq!(err.to_string(), "Component error in worker: socket refused");
    }

    #[test]
    fn test_toml_error_conversion() {
        let err: StartStopError = toml::to_string(&Some(1u8)).unwrap_err().into();
        assert!(matches!(err, StartStopError::Serialization(_)));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: StartStopError = config::ConfigError::Message("bad".to_string()).into();
        assert!(matches!(err, StartStopError::Config(_)));
    }
}
