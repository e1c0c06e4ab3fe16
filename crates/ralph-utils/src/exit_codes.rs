//! Exit code constants for the ralph driver loop.
//!
//! | Code | Constant | Meaning |
//! |------|----------|---------|
//! | 0 | `SUCCESS` | every spec reached `done_count >= 3` |
//! | 1 | `NO_SPECS` | no specs discovered, or bad invocation |
//! | 2 | `STUCK` | an agent signalled STUCK; user intervention needed |
//! | 3 | `ITERATION_CEILING` | hit `max_iterations` without completion |
//! | 4 | `POOL_EXHAUSTED` | every agent in the pool was removed as exhausted |

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const NO_SPECS: ExitCode = ExitCode(1);
    pub const STUCK: ExitCode = ExitCode(2);
    pub const ITERATION_CEILING: ExitCode = ExitCode(3);
    pub const POOL_EXHAUSTED: ExitCode = ExitCode(4);

    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.0 as u8)
    }
}
