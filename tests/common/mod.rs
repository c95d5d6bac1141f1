#![allow(dead_code)]

pub use fanexec_test_utils::builders;
pub use fanexec_test_utils::{init_tracing, rendered, texts_for, with_timeout};

use fanexec::exec::SystemShell;

/// Shell used by process tests.
pub fn sh() -> SystemShell {
    SystemShell::with_program("sh")
}
