pub type TaucResult<T> = Result<T, TaucError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaucErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl TaucErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Failure of a single transform or estimate call.
///
/// Every variant is terminal for the call that raised it and carries enough
/// context (indices, required sizes, offending values) for the caller to report
/// which file or region is unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaucError {
    #[error("{quantity} at index {index} is outside its physical domain (got {value}): {reason}")]
    Domain {
        quantity: &'static str,
        index: usize,
        value: f64,
        reason: &'static str,
    },
    #[error("{stage} requires at least {required} points, got {actual}")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        actual: usize,
    },
    #[error(
        "window around index {index} needs {before} points before and {after} after, but data has {len} points"
    )]
    WindowOutOfBounds {
        index: usize,
        before: usize,
        after: usize,
        len: usize,
    },
    #[error("regression slope {slope:e} is degenerate; band gap is undefined")]
    DegenerateFit { slope: f64 },
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("{message}")]
    Input {
        placeholder: &'static str,
        message: String,
    },
    #[error("{message}")]
    Io {
        placeholder: &'static str,
        message: String,
    },
}

impl TaucError {
    pub fn domain(
        quantity: &'static str,
        index: usize,
        value: f64,
        reason: &'static str,
    ) -> Self {
        Self::Domain {
            quantity,
            index,
            value,
            reason,
        }
    }

    pub fn insufficient_data(stage: &'static str, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            stage,
            required,
            actual,
        }
    }

    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::Input {
            placeholder,
            message: message.into(),
        }
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::Io {
            placeholder,
            message: message.into(),
        }
    }

    pub const fn category(&self) -> TaucErrorCategory {
        match self {
            Self::Domain { .. }
            | Self::InsufficientData { .. }
            | Self::InvalidParameter { .. }
            | Self::Input { .. } => TaucErrorCategory::InputValidationError,
            Self::WindowOutOfBounds { .. } | Self::DegenerateFit { .. } => {
                TaucErrorCategory::ComputationError
            }
            Self::Io { .. } => TaucErrorCategory::IoSystemError,
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Domain { .. } => "INPUT.DOMAIN",
            Self::InsufficientData { .. } => "INPUT.INSUFFICIENT_DATA",
            Self::WindowOutOfBounds { .. } => "RUN.WINDOW_OUT_OF_BOUNDS",
            Self::DegenerateFit { .. } => "RUN.DEGENERATE_FIT",
            Self::InvalidParameter { .. } => "INPUT.PARAMETER",
            Self::Input { placeholder, .. } | Self::Io { placeholder, .. } => *placeholder,
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::{TaucError, TaucErrorCategory};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (
                TaucErrorCategory::InputValidationError,
                2,
                "InputValidationError",
            ),
            (TaucErrorCategory::IoSystemError, 3, "IoSystemError"),
            (TaucErrorCategory::ComputationError, 4, "ComputationError"),
            (TaucErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn pipeline_failures_are_computation_errors() {
        let window = TaucError::WindowOutOfBounds {
            index: 5,
            before: 10,
            after: 10,
            len: 300,
        };
        assert_eq!(window.category(), TaucErrorCategory::ComputationError);
        assert_eq!(window.exit_code(), 4);
        assert_eq!(window.placeholder(), "RUN.WINDOW_OUT_OF_BOUNDS");

        let degenerate = TaucError::DegenerateFit { slope: 0.0 };
        assert_eq!(degenerate.placeholder(), "RUN.DEGENERATE_FIT");
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = TaucError::insufficient_data("smoothing", 51, 50);

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.INSUFFICIENT_DATA] smoothing requires at least 51 points, got 50"
        );
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 2");
    }

    #[test]
    fn io_errors_keep_their_placeholder() {
        let error = TaucError::io_system("IO.SPECTRUM_READ", "failed to read 'a.txt'");
        assert_eq!(error.category(), TaucErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.SPECTRUM_READ");
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [IO.SPECTRUM_READ] failed to read 'a.txt'"
        );
    }
}
