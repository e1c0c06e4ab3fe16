pub mod crash;
pub mod exhaustion;
pub mod process;

pub use crash::{detect_crash, CrashInfo};
pub use exhaustion::{claude_exhaustion, codex_exhaustion, ExhaustionInfo};
pub use process::{invoke, ProcessOutput};
