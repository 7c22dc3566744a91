use std::fmt;

/// Fatal conditions a well-formed program can still trigger. `InternalInvariant`
/// violations do not appear here: they go through [`vbc_error_macros::internal_error!`]
/// instead, since they indicate a bug upstream of this crate's contract rather
/// than something a user's source can cause.
#[derive(Debug)]
pub enum CodegenError {
    /// Direct-slot count (plus the shared array and dim-counter slots, if
    /// allocated) exceeded the map-location cap.
    TooManyVariables { limit: u32, library_name: String },
    /// A compact-format library would need more function slots than the
    /// single-byte call-instruction operand can address.
    TooManyFunctions { limit: u32, library_name: String },
    /// The object file could not be created or written.
    IoFailure(std::io::Error),
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::TooManyVariables { limit, library_name } => {
                write!(f, "library '{library_name}' uses over maximum {limit} variables")
            }
            CodegenError::TooManyFunctions { limit, library_name } => write!(
                f,
                "library '{library_name}' uses over maximum {limit} functions; \
                 to use more functions, compile in non-compact mode"
            ),
            CodegenError::IoFailure(err) => write!(f, "failed to write object file: {err}"),
        }
    }
}

impl std::error::Error for CodegenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodegenError::IoFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodegenError {
    fn from(err: std::io::Error) -> Self {
        CodegenError::IoFailure(err)
    }
}
