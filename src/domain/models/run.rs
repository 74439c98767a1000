//! Output of one external test-runner invocation.

use serde::{Deserialize, Serialize};

/// Combined output and exit status of a test-runner call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Stdout followed by stderr.
    pub output: String,
    /// Process exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl RunOutput {
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }

    pub fn passed(output: impl Into<String>) -> Self {
        Self::new(output, 0)
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self::new(output, 1)
    }

    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Append another run's output; the combined status keeps the last failure.
    pub fn absorb(&mut self, other: Self) {
        self.output.push_str(&other.output);
        if other.exit_code != 0 {
            self.exit_code = other.exit_code;
        }
    }
}
