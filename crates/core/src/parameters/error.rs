//! Parameter error types

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// Name longer than `PARAM_NAME_LEN`
    InvalidName,
    /// No parameter registered under that name
    UnknownParameter,
    /// New value has a different type than the registered one
    TypeMismatch,
    /// Store is full
    StoreFull,
    /// Read-only parameter cannot be modified
    ReadOnly,
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterError::InvalidName => write!(f, "invalid parameter name"),
            ParameterError::UnknownParameter => write!(f, "unknown parameter"),
            ParameterError::TypeMismatch => write!(f, "parameter type mismatch"),
            ParameterError::StoreFull => write!(f, "parameter store full"),
            ParameterError::ReadOnly => write!(f, "parameter is read-only"),
        }
    }
}
