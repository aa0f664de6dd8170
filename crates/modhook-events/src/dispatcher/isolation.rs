//! Failure isolation for handler and init entry invocations

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Why an isolated invocation did not complete
#[derive(Debug)]
pub enum Failure {
    /// The callable returned an error
    Error(anyhow::Error),
    /// The callable panicked
    Panic(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Error(e) => write!(f, "{:#}", e),
            Failure::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// Run `f`, turning both `Err` and a panic into a [`Failure`].
///
/// Registry state is never touched while `f` runs, so unwinding out of it
/// cannot leave the bus half-updated.
pub fn run_isolated<F>(f: F) -> Result<(), Failure>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Failure::Error(e)),
        Err(payload) => Err(Failure::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
