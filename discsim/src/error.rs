//! Error type shared by the simulation core, the scenario loader and the frame sinks.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Two state arrays disagree in length (positions/velocities/masses/radii or an output buffer)
    #[error("shape mismatch: {what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Non-positive mass/dt/softening, negative radius, degenerate box, ...
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Non-finite values appeared in the state; the run is aborted
    #[error("numeric overflow: non-finite {what} at step {step}")]
    NumericOverflow { step: usize, what: &'static str },

    /// A frame sink rejected or dropped a frame (never fatal to a run)
    #[error("frame sink: {0}")]
    Sink(String),

    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Fails with [`Error::ShapeMismatch`] unless `found == expected`
pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if found != expected {
        return Err(Error::ShapeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_names_the_array() {
        let err = check_len("masses", 3, 2).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("masses"));
        assert!(msg.contains("expected 3"));
    }

    #[test]
    fn equal_lengths_pass() -> Result<()> {
        check_len("radii", 4, 4)
    }
}
