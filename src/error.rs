#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure kinds raised by the rating engine itself.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// No matches, no active teams, or a 0×0 system.
    InsufficientData,
    /// Gaussian elimination met a pivot below epsilon.
    SingularSystem { column: usize, pivot: f64 },
    DimensionMismatch { expected: usize, actual: usize },
    /// Ridge strength must be finite and non-negative.
    InvalidLambda { lambda: f64 },
    /// A team is listed on both alliances of the same match.
    InconsistentMatch { index: usize, team: u32 },
    /// A match carries a NaN/Inf score or penalty.
    NonFiniteInput { index: usize },
    NonFiniteSolution,
}

impl CalcError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CalcError::InsufficientData => 3,
            CalcError::InconsistentMatch { .. }
            | CalcError::NonFiniteInput { .. }
            | CalcError::InvalidLambda { .. } => 2,
            CalcError::SingularSystem { .. }
            | CalcError::DimensionMismatch { .. }
            | CalcError::NonFiniteSolution => 4,
        }
    }
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcError::InsufficientData => write!(f, "Insufficient data: no matches or no active teams."),
            CalcError::SingularSystem { column, pivot } => write!(
                f,
                "Singular system: pivot {pivot:e} in column {column} is below tolerance (try a ridge lambda > 0)."
            ),
            CalcError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}.")
            }
            CalcError::InvalidLambda { lambda } => {
                write!(f, "Invalid lambda {lambda}: must be finite and >= 0.")
            }
            CalcError::InconsistentMatch { index, team } => write!(
                f,
                "Match #{index} lists team {team} on both alliances."
            ),
            CalcError::NonFiniteInput { index } => {
                write!(f, "Match #{index} has a non-finite score or penalty.")
            }
            CalcError::NonFiniteSolution => write!(f, "Solver produced a non-finite rating."),
        }
    }
}

impl std::error::Error for CalcError {}

impl From<CalcError> for AppError {
    fn from(err: CalcError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
