use serde::{Deserialize, Serialize};

use crate::Position;

/// Result of validating generation parameters
pub type ParamsResult<T> = Result<T, ParamsError>;

/// Invalid generator input
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsError {
    /// Size is zero or negative
    NonPositiveSize(f64),
    /// Size is NaN or infinite
    NonFiniteSize,
    /// Iteration count below zero (only reachable from signed inputs)
    NegativeIterations(i64),
    /// Iteration count does not fit the generator's counter
    TooManyIterations(i64),
    /// A position component is NaN or infinite
    NonFinitePosition(Position),
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::NonPositiveSize(size) => {
                write!(f, "Size must be positive, got {}", size)
            }
            ParamsError::NonFiniteSize => write!(f, "Size must be a finite number"),
            ParamsError::NegativeIterations(n) => {
                write!(f, "Iterations must be non-negative, got {}", n)
            }
            ParamsError::TooManyIterations(n) => {
                write!(f, "Iterations out of range, got {}", n)
            }
            ParamsError::NonFinitePosition(p) => {
                write!(f, "Position must be finite, got [{}, {}, {}]", p[0], p[1], p[2])
            }
        }
    }
}

impl std::error::Error for ParamsError {}

/// Parameters of one generator run, as supplied by the hosting component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub size: f64,
    pub iterations: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub wireframe: bool,
}

impl GenerationParams {
    pub fn new(size: f64, iterations: u32) -> Self {
        Self {
            size,
            iterations,
            position: [0.0, 0.0, 0.0],
            wireframe: false,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Build from a signed iteration count (JS numbers, CLI input).
    pub fn from_signed(size: f64, iterations: i64, position: Position) -> ParamsResult<Self> {
        if iterations < 0 {
            return Err(ParamsError::NegativeIterations(iterations));
        }
        let iterations =
            u32::try_from(iterations).map_err(|_| ParamsError::TooManyIterations(iterations))?;
        let params = Self::new(size, iterations).at(position);
        params.validate()?;
        Ok(params)
    }

    /// Reject sizes and positions the recursion would silently swallow.
    pub fn validate(&self) -> ParamsResult<()> {
        if !self.size.is_finite() {
            return Err(ParamsError::NonFiniteSize);
        }
        if self.size <= 0.0 {
            return Err(ParamsError::NonPositiveSize(self.size));
        }
        if self.position.iter().any(|c| !c.is_finite()) {
            return Err(ParamsError::NonFinitePosition(self.position));
        }
        Ok(())
    }
}
