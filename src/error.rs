use thiserror::Error;

use crate::metadata::{signature::TargetOperation, token::Token};

macro_rules! rewrite_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Rewrite {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Rewrite {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two tiers that are handled very differently:
///
/// ## Setup-time errors
/// - [`Error::TargetNotFound`] - An expected host operation could not be resolved
/// - [`Error::HookInstall`] - The host refused to install a hook
/// - [`Error::HookRemove`] - The host refused to remove a hook
/// - [`Error::InvalidConfig`] - The patch configuration is unusable
///
/// These are returned from [`crate::patch::PatchController::apply_all`] and friends and
/// should be reported by the caller as an initialization failure.
///
/// ## Runtime errors
/// - [`Error::OperandUnresolved`] - An instruction operand could not be resolved
/// - [`Error::Rewrite`] - The peephole rewriter hit an inconsistent instruction stream
/// - [`Error::CallbackPanicked`] - Custom interception logic panicked
///
/// These never reach the host. [`crate::patch::FaultGuard`] records them once per callback
/// and falls back to the original host behavior.
///
/// # Examples
///
/// ```rust,no_run
/// use cilpatch::Error;
///
/// fn report(err: &Error) {
///     match err {
///         Error::TargetNotFound(target) => eprintln!("incompatible host, missing {target}"),
///         Error::Rewrite { message, file, line } => eprintln!("{message} ({file}:{line})"),
///         other => eprintln!("{other}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A declared target operation does not exist in the host.
    ///
    /// The host's operations are treated as a version contract, so a missing target means
    /// the host version is incompatible with this patch set.
    #[error("Target operation not found in host - {0}")]
    TargetNotFound(TargetOperation),

    /// The host failed to install a hook on a resolved target.
    #[error("Failed to install hook on {target}: {reason}")]
    HookInstall {
        /// The operation the hook was meant for
        target: TargetOperation,
        /// Host-provided failure description
        reason: String,
    },

    /// The host failed to remove a previously installed hook.
    #[error("Failed to remove hook from {target}: {reason}")]
    HookRemove {
        /// The operation the hook was installed on
        target: TargetOperation,
        /// Host-provided failure description
        reason: String,
    },

    /// An instruction operand token could not be resolved to a host operation.
    #[error("Could not resolve operand - {0}")]
    OperandUnresolved(Token),

    /// The rewriter encountered an instruction stream it could not process.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what went wrong
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Rewrite - {file}:{line}: {message}")]
    Rewrite {
        /// The message to be printed for the Rewrite error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A patch callback panicked. Carries the panic payload when it was a string.
    #[error("Patch callback panicked: {0}")]
    CallbackPanicked(String),

    /// The supplied configuration cannot produce a valid patch set.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for miscellaneous failures reported by host adapters.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns `true` for errors that are fatal to patch activation.
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Error::TargetNotFound(_)
                | Error::HookInstall { .. }
                | Error::HookRemove { .. }
                | Error::InvalidConfig(_)
        )
    }
}
