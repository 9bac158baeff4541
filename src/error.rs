use thiserror::Error;

use crate::metadata::tables::TableIndex;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure conditions of the metadata model and the re-order engine.
/// Each variant provides specific context about the failure mode so callers can distinguish
/// malformed caller-supplied data from internal invariant breaches.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Structurally invalid metadata or textual input
/// - [`Error::Empty`] - Empty input where content was required
///
/// ## Reference Errors
/// - [`Error::IndexOutOfRange`] - A [`TableIndex`] points past the end of its table
/// - [`Error::ReferenceCycle`] - A self-referential chain that the format forbids
///
/// # Examples
///
/// ```rust
/// use cilcanon::{Error, metadata::identity::AssemblyIdentity};
///
/// match AssemblyIdentity::parse("") {
///     Ok(identity) => println!("parsed {}", identity.name),
///     Err(Error::Malformed { message, .. }) => println!("bad display name: {}", message),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied metadata or textual input is structurally invalid.
    ///
    /// The error includes the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// A [`TableIndex`] refers to a row past the end of its table.
    ///
    /// This is a precondition violation: the caller handed the engine or a
    /// query a reference into a table that does not contain that many rows.
    #[error("Table index out of range - {0}")]
    IndexOutOfRange(TableIndex),

    /// A reference chain loops back onto itself.
    ///
    /// Raised when a type is transitively nested under itself, when a TypeRef
    /// resolution-scope chain loops, or when TypeSpec signatures reference each
    /// other cyclically. The index identifies a row participating in the cycle.
    #[error("Reference cycle detected at {0}")]
    ReferenceCycle(TableIndex),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
