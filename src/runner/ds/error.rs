use thiserror::Error;

/// Every failure the runtime can surface to a host.
///
/// Resolution misses are not errors: they surface as `nil`. Only explicit
/// `error`/`assert` calls, compile problems and caller bugs end up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorType {
    /// The chunk failed to compile, or an uncompiled chunk was executed.
    #[error("compile error in chunk '{chunk}': {message}")]
    CompileError { chunk: String, message: String },

    /// Raised by `error` and `assert`; `level` is the requested frame count.
    #[error("{message}")]
    RuntimeFailure { message: String, level: i64 },

    /// Invalid arguments to a registration or compile entry point.
    #[error("invalid argument '{argument}': {message}")]
    ArgumentError { argument: String, message: String },

    #[error("type error: {0}")]
    TypeError(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl ErrorType {
    pub fn compile(chunk: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorType::CompileError {
            chunk: chunk.into(),
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>, level: i64) -> Self {
        ErrorType::RuntimeFailure {
            message: message.into(),
            level,
        }
    }

    pub fn argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorType::ArgumentError {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        ErrorType::TypeError(message.into())
    }

    /// Is this a script-raised failure (as opposed to a host-side problem)?
    pub fn is_runtime_failure(&self) -> bool {
        matches!(self, ErrorType::RuntimeFailure { .. })
    }
}

impl From<std::io::Error> for ErrorType {
    fn from(e: std::io::Error) -> Self {
        ErrorType::Io(e.to_string())
    }
}
