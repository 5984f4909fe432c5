use thiserror::Error;

use crate::api::GroupKind;
use crate::constant::*;

/// A mistake in the declarations themselves (as opposed to the user's input).
///
/// Raised while building declarations/commands, before any parsing takes place.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    /// The declaration string is malformed (ex: `-ab` as a short option).
    #[error("{0}")]
    InvalidDeclaration(String),

    /// The destination is not an identifier.
    #[error("'{0}' is not a valid identifier.")]
    InvalidDestination(String),

    /// The destination is a reserved word.
    #[error("'{0}' is a reserved word.")]
    ReservedDestination(String),

    /// The same option key is declared more than once in one command.
    #[error("Option '{0}' conflicts.")]
    DuplicateOption(String),

    /// The same destination is declared more than once in one command.
    #[error("Destination '{0}' conflicts.")]
    DuplicateDestination(String),

    /// An arity outside of `1` (one) and `-1` (variadic).
    #[error("Require nargs == 1 or nargs == -1, got {0}.")]
    InvalidNargs(i64),

    /// A type with an invalid configuration (ex: an empty choice set).
    #[error("{0}")]
    InvalidType(String),

    /// A default/constant which does not survive conversion through the declared type.
    #[error("Invalid {what} value for {name}. {source}")]
    InvalidValue {
        /// Either `default` or `constant`.
        what: &'static str,
        /// The rendered declaration.
        name: String,
        /// The underlying conversion failure.
        source: ConversionError,
    },
}

impl DefinitionError {
    /// The process exit code for definition errors.
    pub fn exit_code(&self) -> i32 {
        DEFINITION_EXIT_CODE
    }
}

/// A failure to convert a value through a [`Type`](crate::Type).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// A non-string value of the wrong kind was given to [`Type::convert`](crate::Type::convert).
    #[error("{0}")]
    InvalidType(String),

    /// The value could not be converted (ex: `zz` as a base 16 integer).
    #[error("{0}")]
    Conversion(String),
}

impl ConversionError {
    pub(crate) fn invalid_type(message: impl Into<String>) -> Self {
        ConversionError::InvalidType(message.into())
    }

    pub(crate) fn conversion(message: impl Into<String>) -> Self {
        ConversionError::Conversion(message.into())
    }

    /// Re-classify as a [`ConversionError::Conversion`], keeping the message.
    pub(crate) fn into_conversion(self) -> Self {
        match self {
            ConversionError::InvalidType(message) => ConversionError::Conversion(message),
            conversion => conversion,
        }
    }
}

/// A mistake in the end-user's input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UsageError {
    /// A token shaped like an option does not resolve to any declared key.
    #[error("Unknown option '{0}'.")]
    UnknownOption(String),

    /// A required argument received no value.
    #[error("Got too few arguments.")]
    TooFewArguments,

    /// More positional values than there are arguments to receive them.
    #[error("Got too many arguments.")]
    TooManyArguments,

    /// A required option did not occur.
    #[error("Missing option {0}.")]
    MissingOption(String),

    /// A value-taking option occurred at the very end of the input.
    #[error("Option '{0}' requires a value.")]
    TooFewOptionValues(String),

    /// A value was attached (`--key=value`) to an option which takes none.
    #[error("Option '{0}' does not take a value.")]
    TooManyOptionValues(String),

    /// An argument value failed its type conversion.
    #[error("Invalid value for argument {name}. {source}")]
    InvalidArgumentValue {
        /// The rendered argument declaration.
        name: String,
        /// The underlying conversion failure.
        source: ConversionError,
    },

    /// An option value failed its type conversion.
    #[error("Invalid value for option {name}. {source}")]
    InvalidOptionValue {
        /// The option key (or rendered declarations).
        name: String,
        /// The underlying conversion failure.
        source: ConversionError,
    },

    /// A group's occurrence constraint was violated.
    #[error("Group '{title}' requires {expected}, got {actual}.", expected = kind.expectation(*size))]
    Group {
        /// The group title.
        title: String,
        /// The violated constraint.
        kind: GroupKind,
        /// The number of members in the group.
        size: usize,
        /// The number of distinct members which occurred.
        actual: usize,
    },

    /// The sub-command name was missing or unknown.
    #[error("{0}")]
    Subcommand(String),
}

impl UsageError {
    /// The process exit code for this usage error.
    pub fn exit_code(&self) -> i32 {
        match self {
            UsageError::Group { .. } => GROUP_USAGE_EXIT_CODE,
            _ => USAGE_EXIT_CODE,
        }
    }
}

/// A control-flow short-circuit triggered by a signal option.
///
/// Signals are not failures: the caller is expected to print and terminate.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Show help information.
    #[error("help requested")]
    Help,
    /// Show version information.
    #[error("version requested")]
    Version,
}

impl Signal {
    /// The process exit code for signals.
    pub fn exit_code(&self) -> i32 {
        SIGNAL_EXIT_CODE
    }
}

/// Anything that aborts a parse before it completes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Interrupt {
    /// A signal option occurred.
    #[error(transparent)]
    Signal(#[from] Signal),
    /// The input was invalid.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Interrupt {
    /// The process exit code for this interruption.
    pub fn exit_code(&self) -> i32 {
        match self {
            Interrupt::Signal(signal) => signal.exit_code(),
            Interrupt::Usage(error) => error.exit_code(),
        }
    }
}

/// The three possible outcomes of a parse.
///
/// Partial results are never exposed: on a signal or error the values are discarded.
#[must_use]
#[derive(Debug, PartialEq)]
pub enum ParseOutcome<T> {
    /// Parsing completed.
    Complete(T),
    /// A signal option occurred; parsing stopped at that token.
    Signal(Signal),
    /// The input was invalid.
    Error(UsageError),
}

impl<T> ParseOutcome<T> {
    /// Map the completed value, leaving signals and errors untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            ParseOutcome::Complete(value) => ParseOutcome::Complete(f(value)),
            ParseOutcome::Signal(signal) => ParseOutcome::Signal(signal),
            ParseOutcome::Error(error) => ParseOutcome::Error(error),
        }
    }

    /// Convert into a `Result`, so that `?` may be used.
    pub fn into_result(self) -> Result<T, Interrupt> {
        match self {
            ParseOutcome::Complete(value) => Ok(value),
            ParseOutcome::Signal(signal) => Err(Interrupt::Signal(signal)),
            ParseOutcome::Error(error) => Err(Interrupt::Usage(error)),
        }
    }

    /// The completed value, if any.
    pub fn complete(self) -> Option<T> {
        match self {
            ParseOutcome::Complete(value) => Some(value),
            _ => None,
        }
    }

    /// The exit code a program should terminate with, or `None` when parsing completed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ParseOutcome::Complete(_) => None,
            ParseOutcome::Signal(signal) => Some(signal.exit_code()),
            ParseOutcome::Error(error) => Some(error.exit_code()),
        }
    }
}

impl<T> From<Result<T, Interrupt>> for ParseOutcome<T> {
    fn from(result: Result<T, Interrupt>) -> Self {
        match result {
            Ok(value) => ParseOutcome::Complete(value),
            Err(Interrupt::Signal(signal)) => ParseOutcome::Signal(signal),
            Err(Interrupt::Usage(error)) => ParseOutcome::Error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(
            DefinitionError::InvalidNargs(2).exit_code(),
            DEFINITION_EXIT_CODE
        );
        assert_eq!(UsageError::TooManyArguments.exit_code(), USAGE_EXIT_CODE);
        assert_eq!(
            UsageError::Group {
                title: "g".to_string(),
                kind: GroupKind::ExactlyOne,
                size: 2,
                actual: 0,
            }
            .exit_code(),
            GROUP_USAGE_EXIT_CODE
        );
        assert_eq!(Signal::Help.exit_code(), 0);
        assert_eq!(Signal::Version.exit_code(), 0);
        assert_ne!(DEFINITION_EXIT_CODE, USAGE_EXIT_CODE);
    }

    #[test]
    fn group_message() {
        let error = UsageError::Group {
            title: "Style".to_string(),
            kind: GroupKind::ExactlyOne,
            size: 2,
            actual: 0,
        };
        assert_eq!(
            error.to_string(),
            "Group 'Style' requires exactly 1 member, got 0."
        );
    }

    #[test]
    fn invalid_value_message() {
        let error = UsageError::InvalidOptionValue {
            name: "'--count'".to_string(),
            source: ConversionError::conversion("'x' is not a valid int."),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for option '--count'. 'x' is not a valid int."
        );
    }

    #[test]
    fn outcome_round_trip() {
        let outcome: ParseOutcome<u32> = Err(Interrupt::from(Signal::Version)).into();
        assert_eq!(outcome.exit_code(), Some(0));
        assert_matches!(outcome.into_result(), Err(Interrupt::Signal(Signal::Version)));

        let outcome: ParseOutcome<u32> = Ok(3).into();
        assert_eq!(outcome.exit_code(), None);
        assert_eq!(outcome.map(|v| v + 1).complete(), Some(4));
    }
}
