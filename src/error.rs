//! Error module for the Rusty PopCode library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum PopCodeError {
    /// Error for invalid parameters, e.g., an even number of neurons or a non-positive spread.
    InvalidParameter(String),
    /// Error for out of bounds access, e.g., neuron not found.
    OutOfBounds(String),
    /// Error for incompatible spike trains, e.g., different number of neurons or time steps.
    IncompatibleSpikeTrains(String),
    /// Error for statistics computed on too few samples.
    InsufficientData(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for PopCodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PopCodeError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            PopCodeError::OutOfBounds(e) => write!(f, "Index out of bounds: {}", e),
            PopCodeError::IncompatibleSpikeTrains(e) => write!(f, "Incompatible spike trains: {}", e),
            PopCodeError::InsufficientData(e) => write!(f, "Insufficient data: {}", e),
            PopCodeError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for PopCodeError {}

impl From<std::io::Error> for PopCodeError {
    fn from(e: std::io::Error) -> Self {
        PopCodeError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for PopCodeError {
    fn from(e: serde_json::Error) -> Self {
        PopCodeError::IOError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            PopCodeError::InvalidParameter("the number of neurons must be odd".to_string())
                .to_string(),
            "Invalid parameters: the number of neurons must be odd"
        );
        assert_eq!(
            PopCodeError::OutOfBounds("neuron 51".to_string()).to_string(),
            "Index out of bounds: neuron 51"
        );
    }
}
