//! The review orchestration engine.
//!
//! A review resolves build properties once, asks which units (and optionally
//! which checks) to review, then for every selected unit builds one
//! invocation per check, runs them in order into a shared buffer and renders
//! the captured output as a report section. A fixed post-check runs last.
//!
//! | Module       | Responsibility                                      |
//! |--------------|-----------------------------------------------------|
//! | `builder`    | shared parameter set and per-check filtering        |
//! | `executor`   | sequential batch execution, failure reduction       |
//! | `report`     | output capture and section rendering                |
//! | `controller` | starter kit check, selection, unit loop, post-check |

pub mod builder;
pub mod controller;
pub mod executor;
pub mod report;

pub use builder::CommandLineBuilder;
pub use controller::{ReviewController, ReviewOptions};
pub use executor::execute;
pub use report::{ReportBuffer, ReportRenderer};

/// Outcome of a whole review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Passed,
    Failed,
}

impl BuildResult {
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            BuildResult::Failed
        } else {
            BuildResult::Passed
        }
    }

    /// Process exit code: 0 when every check passed, 1 otherwise.
    pub fn exit_code(self) -> u8 {
        match self {
            BuildResult::Passed => 0,
            BuildResult::Failed => 1,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_result_exit_codes() {
        assert_eq!(BuildResult::from_failed(false).exit_code(), 0);
        assert_eq!(BuildResult::from_failed(true).exit_code(), 1);
    }
}
