use thiserror::Error;

/// Broad classification of a [`CliError`], used by handlers that want to react to the
/// category of failure rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An argv token did not match the command tree.
    Structural,
    /// A type-name expression was malformed.
    Grammar,
    /// Argument text could not be turned into a typed value.
    Coercion,
    /// A flag or value fell outside a recognised vocabulary.
    Configuration,
    /// The invoked command itself failed.
    Callable,
    /// Binding, I/O, metadata decoding or rendering failures.
    Internal,
}

/// Failure reported by a user-supplied command.
///
/// Carries an optional exit code so a command can decide how the process terminates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CommandFailure {
    pub message: String,
    pub exit_code: Option<i32>,
}

impl CommandFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("No such command or group '{token}' in '{}'", .path.join(" "))]
    NoSuchCommand { token: String, path: Vec<String> },

    #[error("Missing command after '{}'", .path.join(" "))]
    MissingCommand { path: Vec<String> },

    #[error("Unexpected character '{found}' at position {position} in type '{input}'")]
    UnexpectedChar {
        input: String,
        position: usize,
        found: char,
    },

    #[error("Unexpected end of type '{input}' at position {position}")]
    UnexpectedEnd { input: String, position: usize },

    #[error("Type '{name}' takes {expected} type parameter(s), found {found}")]
    GenericArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("No coercer for type '{type_name}'")]
    NoCoercer { type_name: String },

    #[error("Invalid {type_name} value: '{text}'")]
    InvalidValue { type_name: String, text: String },

    #[error("Malformed record entry '{entry}': expected key=value")]
    MalformedEntry { entry: String },

    #[error("Invalid boolean value '{value}' (expected yes/no, on/off, true/false, 1/0)")]
    InvalidBoolean { value: String },

    #[error(transparent)]
    Command(#[from] CommandFailure),

    #[error("A command tree is already bound")]
    AlreadyBound,

    #[error("No command tree has been bound")]
    NotBound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(#[from] minijinja::Error),
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::NoSuchCommand { .. } | CliError::MissingCommand { .. } => {
                ErrorKind::Structural
            }
            CliError::UnexpectedChar { .. }
            | CliError::UnexpectedEnd { .. }
            | CliError::GenericArity { .. } => ErrorKind::Grammar,
            CliError::NoCoercer { .. }
            | CliError::InvalidValue { .. }
            | CliError::MalformedEntry { .. } => ErrorKind::Coercion,
            CliError::InvalidBoolean { .. } => ErrorKind::Configuration,
            CliError::Command(_) => ErrorKind::Callable,
            CliError::AlreadyBound
            | CliError::NotBound
            | CliError::Io(_)
            | CliError::Metadata(_)
            | CliError::Render(_) => ErrorKind::Internal,
        }
    }

    /// Process exit status for this error: the command's own code when it carries one, else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Command(failure) => failure.exit_code.unwrap_or(1),
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
