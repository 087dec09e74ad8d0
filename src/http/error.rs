use thiserror::Error;

/// Errors produced while parsing or manipulating an HTTP header.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The buffer does not yet contain a complete header (`\r\n\r\n` not found).
    #[error("buffer does not contain a complete HTTP header")]
    NotHttp,

    /// The header was complete but the start line did not match the expected grammar.
    #[error("HTTP start line did not match")]
    NoMatch,

    /// A field map mutation could not be performed because capacity could not be reserved.
    #[error("allocation failure")]
    AllocFailure,

    /// A static regular expression failed to compile. Effectively unreachable
    /// at runtime, but pattern compilation is modeled as a fallible step.
    #[error("regex failed to compile: {0}")]
    RegexCompile(#[from] regex::Error),
}
