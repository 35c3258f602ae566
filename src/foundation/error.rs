/// Convenience result type used across the crate.
pub type CollageResult<T> = Result<T, CollageError>;

/// Top-level error taxonomy used by every pipeline stage.
#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    /// Malformed geometry or configuration text.
    #[error("parse error: {0}")]
    Parse(String),

    /// A requested strategy variant is not in the registry.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A component failed to declare its custom parameters.
    #[error("registration error: {0}")]
    Registration(String),

    /// A selected component rejected its custom parameter values.
    #[error("parameter error: {0}")]
    ParameterParse(String),

    /// Filesystem or stream failure in a collaborator.
    #[error("io error: {0}")]
    Io(String),

    /// An input image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The output artifact could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// A sizing or positioning strategy failed.
    #[error("layout error: {0}")]
    Layout(String),

    /// Canvas constraints cannot be honored simultaneously.
    #[error("unsatisfiable constraints: {0}")]
    UnsatisfiableConstraints(String),

    /// The progress monitor failed.
    #[error("monitor error: {0}")]
    Monitor(String),

    /// Invalid pipeline state or user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollageError {
    /// Build a [`CollageError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`CollageError::UnknownComponent`] value.
    pub fn unknown_component(msg: impl Into<String>) -> Self {
        Self::UnknownComponent(msg.into())
    }

    /// Build a [`CollageError::Registration`] value.
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }

    /// Build a [`CollageError::ParameterParse`] value.
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::ParameterParse(msg.into())
    }

    /// Build a [`CollageError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`CollageError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CollageError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CollageError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`CollageError::UnsatisfiableConstraints`] value.
    pub fn unsatisfiable(msg: impl Into<String>) -> Self {
        Self::UnsatisfiableConstraints(msg.into())
    }

    /// Build a [`CollageError::Monitor`] value.
    pub fn monitor(msg: impl Into<String>) -> Self {
        Self::Monitor(msg.into())
    }

    /// Build a [`CollageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
