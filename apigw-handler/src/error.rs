use thiserror::Error;

/// Store error codes that mean "try again later" rather than "this will never work".
const THROTTLING_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
];

#[derive(Debug, Error)]
pub enum MalformedInput {
    #[error("request body is not UTF-8 text: {0}")]
    NotText(#[from] std::str::Utf8Error),
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("request body is missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{code}: {message}")]
    Throttled { code: String, message: String },
    #[error("{code}: {message}")]
    Other { code: String, message: String },
}

impl StoreError {
    pub fn from_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        if THROTTLING_CODES.contains(&code.as_str()) {
            StoreError::Throttled { code, message }
        } else {
            StoreError::Other { code, message }
        }
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, StoreError::Throttled { .. })
    }

    pub fn code(&self) -> &str {
        match self {
            StoreError::Throttled { code, .. } | StoreError::Other { code, .. } => code,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything that can fail an invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInput),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HandlerError {
    /// Category name logged as `error_type`.
    pub fn category(&self) -> &'static str {
        match self {
            HandlerError::MalformedInput(_) => "MalformedInputError",
            HandlerError::Store(err) if err.is_throttled() => "TransientCapacityError",
            HandlerError::Store(_) => "OtherStoreError",
            HandlerError::Config(_) => "ConfigError",
        }
    }
}
