use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::error::{EvalError, EvalResult};

/// Cooperative abort flag shared between an evaluation and its caller.
///
/// Clones share the same flag, so a clone can be handed to another thread
/// (a signal handler, a UI thread, a timeout) while the original is passed to
/// [`Engine::evaluate`](crate::interpreter::evaluator::core::Engine::evaluate).
/// The engine checks the flag before every recursive step and every executed
/// instruction.
///
/// # Example
/// ```
/// use quanta::interpreter::evaluator::cancel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let remote = token.clone();
/// std::thread::spawn(move || remote.cancel()).join().unwrap();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Irreversible.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fails with [`EvalError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> EvalResult<()> {
        if self.is_cancelled() {
            Err(EvalError::Cancelled)
        } else {
            Ok(())
        }
    }
}
