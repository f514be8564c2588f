//! Guarded invocation of suite code.

use std::panic::{self, AssertUnwindSafe};

use crate::{
    context::TestContext,
    error::StepError,
    panic::{Unwound, classify},
    runner::Status,
};

/// Why guarded code did not complete.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Failed(String),
    Skipped(String),
}

impl Interrupt {
    pub(crate) fn status(&self) -> Status {
        match self {
            Self::Failed(_) => Status::Failed,
            Self::Skipped(_) => Status::Skipped,
        }
    }

    pub(crate) fn message(&self) -> &str {
        match self {
            Self::Failed(message) | Self::Skipped(message) => message,
        }
    }

    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Failed(message) | Self::Skipped(message) => message,
        }
    }
}

/// Run `f`, turning errors, recorded failures and unwinds into an
/// [`Interrupt`].
///
/// Failures recorded through `test` while `f` ran take precedence over a
/// skip, so a step that reports an error and then skips still fails.
pub(crate) fn guarded<T>(
    test: &TestContext,
    f: impl FnOnce() -> Result<T, StepError>,
) -> Result<T, Interrupt> {
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    let mut errors = test.take_errors();
    let interrupt = match result {
        Ok(Ok(value)) if errors.is_empty() => return Ok(value),
        Ok(Ok(_)) => None,
        Ok(Err(error)) => {
            errors.push(error.to_string());
            None
        }
        Err(payload) => match classify(payload) {
            Unwound::Failed => None,
            Unwound::Skipped(message) if errors.is_empty() => Some(Interrupt::Skipped(message)),
            Unwound::Skipped(_) => None,
            Unwound::Panicked(message) => {
                errors.push(message);
                None
            }
        },
    };
    Err(interrupt.unwrap_or_else(|| {
        if errors.is_empty() {
            Interrupt::Failed("step failed".to_owned())
        } else {
            Interrupt::Failed(errors.join("\n"))
        }
    }))
}
