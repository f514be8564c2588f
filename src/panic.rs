//! Utilities for working with panic payloads.
//!
//! Step code stops early by unwinding: [`TestContext::fail_now`] and
//! [`TestContext::skip`] unwind with a private [`Halt`] payload, while
//! ordinary `panic!`s and failed assertions carry a message. The runner
//! catches both and uses [`classify`] to tell them apart.
//!
//! [`TestContext::fail_now`]: crate::context::TestContext::fail_now
//! [`TestContext::skip`]: crate::context::TestContext::skip

use std::{any::Any, fmt, panic};

/// Wrapper that formats a panic payload when logged or displayed.
///
/// The payload is downcast to `String` or `&'static str` if possible and falls
/// back to `Debug` formatting otherwise.
///
/// ```
/// use stepwire::panic::format_panic;
/// assert_eq!(format_panic(Box::new("boom")).to_string(), "boom");
/// assert_eq!(
///     format_panic(Box::new(String::from("boom"))).to_string(),
///     "boom"
/// );
/// assert!(format_panic(Box::new(5_u32)).to_string().contains("Any"));
/// ```
#[derive(Debug)]
#[must_use]
pub struct PanicMessage(Box<dyn Any + Send>);

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<&'static str>() {
            f.write_str(s)
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

/// Create a [`PanicMessage`] for the given payload.
pub fn format_panic(panic: Box<dyn Any + Send>) -> PanicMessage { PanicMessage(panic) }

/// Payload used to stop a step without a panic message.
#[derive(Debug)]
pub(crate) enum Halt {
    Failed,
    Skipped(String),
}

impl Halt {
    /// Unwind with this payload without invoking the panic hook.
    pub(crate) fn raise(self) -> ! { panic::resume_unwind(Box::new(self)) }
}

/// What a caught unwind meant.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Unwound {
    /// `fail_now` was called; the message is already recorded.
    Failed,
    /// `skip` was called.
    Skipped(String),
    /// A foreign panic, e.g. a failed assertion.
    Panicked(String),
}

pub(crate) fn classify(payload: Box<dyn Any + Send>) -> Unwound {
    match payload.downcast::<Halt>() {
        Ok(halt) => match *halt {
            Halt::Failed => Unwound::Failed,
            Halt::Skipped(message) => Unwound::Skipped(message),
        },
        Err(other) => Unwound::Panicked(format_panic(other).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::panic::catch_unwind;

    use super::*;

    #[test]
    fn halts_are_recognised() {
        let payload = catch_unwind(|| Halt::Skipped("later".to_owned()).raise())
            .expect_err("halt unwinds");
        assert_eq!(classify(payload), Unwound::Skipped("later".to_owned()));
    }

    #[test]
    fn foreign_panics_keep_their_message() {
        let payload = catch_unwind(|| panic!("boom {}", 1)).expect_err("panic unwinds");
        assert_eq!(classify(payload), Unwound::Panicked("boom 1".to_owned()));
    }
}
