//! Launch-time authentication gate.
//!
//! # Responsibility
//! - Hold the locked/unlocked state guarding the task UI.
//! - Run exactly one platform verification per explicit trigger.
//!
//! # Invariants
//! - The gate starts locked.
//! - A failed or unavailable verification never unlocks.
//! - No backoff and no lockout counting between attempts.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a verification attempt did not unlock the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The device cannot perform biometric verification.
    Unavailable(String),
    /// Verification ran and was rejected or cancelled.
    Denied(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "authentication unavailable: {reason}"),
            Self::Denied(reason) => write!(f, "authentication denied: {reason}"),
        }
    }
}

impl Error for AuthError {}

/// Platform verification capability (biometric prompt).
pub trait Authenticator {
    fn attempt_unlock(&mut self) -> Result<(), AuthError>;
}

/// Read-only view of the gate consumed by the rest of the app.
pub trait UnlockState {
    fn is_unlocked(&self) -> bool;
}

/// Authenticator whose outcome was already produced by the host, e.g. a
/// platform prompt resolved on the UI side and reported over FFI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedOutcome(pub Result<(), AuthError>);

impl Authenticator for ReportedOutcome {
    fn attempt_unlock(&mut self) -> Result<(), AuthError> {
        self.0.clone()
    }
}

/// Locked/unlocked gate around an [`Authenticator`].
#[derive(Debug)]
pub struct AuthGate<A> {
    authenticator: A,
    unlocked: bool,
}

impl<A: Authenticator> AuthGate<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            unlocked: false,
        }
    }

    /// Runs one verification attempt. Used at launch and by the manual
    /// retry action.
    ///
    /// Already-unlocked gates return `Ok(())` without prompting again.
    pub fn try_unlock(&mut self) -> Result<(), AuthError> {
        if self.unlocked {
            return Ok(());
        }

        match self.authenticator.attempt_unlock() {
            Ok(()) => {
                self.unlocked = true;
                info!("event=auth_unlock module=auth status=ok");
                Ok(())
            }
            Err(err) => {
                let error_code = match err {
                    AuthError::Unavailable(_) => "auth_unavailable",
                    AuthError::Denied(_) => "auth_denied",
                };
                warn!("event=auth_unlock module=auth status=error error_code={error_code}");
                Err(err)
            }
        }
    }

    /// Locks the gate again (logout).
    pub fn lock(&mut self) {
        if self.unlocked {
            info!("event=auth_lock module=auth status=ok");
        }
        self.unlocked = false;
    }

    pub fn authenticator_mut(&mut self) -> &mut A {
        &mut self.authenticator
    }
}

impl<A> UnlockState for AuthGate<A> {
    fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}
