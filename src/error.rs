//! Crate-wide error taxonomy (spec §7). Each subsystem owns its own enum;
//! [`PipelineError`] is the one surfaced at the document-pipeline boundary,
//! wrapping the others with `#[source]` chaining.

use crate::hocon::{ConfigResolverError, HoconError};
use crate::source::Position;
use thiserror::Error;

/// A combinator failure, recoverable within a containing alternative
/// (spec §7: `ParserFailure`).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message} at {position}\n{line_content}")]
pub struct ParserFailure {
    pub message: String,
    pub position: Position,
    pub line_content: String,
}

/// A top-level document parser was expected to always succeed but did not
/// — implies a library bug, since unrecognized markup should fall back to
/// literal text (spec §7: `MarkupParserException`).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("markup parser failed to produce a root element: {0}")]
pub struct MarkupParserException(pub String);

/// One or more HOCON syntax errors, each with position and excerpt
/// (spec §7: `ConfigParserErrors`).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{} configuration syntax error(s)", .0.len())]
pub struct ConfigParserErrors(pub Vec<ParserFailure>);

/// Path-tagged structural HOCON errors collected before resolution
/// (spec §7: `InvalidFields`).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{} invalid field(s)", .0.len())]
pub struct InvalidFields(pub Vec<String>);

/// Lazy evaluation of a `FieldRef` failed (spec §7: `ResolverFailed`).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("deferred resolution failed: {0}")]
pub struct ResolverFailed(pub String);

/// Directive parsing/validation failures (spec §4.4, §7).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("missing required part '{0}'")]
    MissingRequiredPart(String),

    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),

    #[error("converter for '{part}' failed: {message}")]
    ConverterFailed { part: String, message: String },

    #[error("unknown directive '{0}'")]
    UnknownDirective(String),
}

/// Rewrite-engine failures (spec §4.4, §7).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RewriteError {
    #[error("rewrite rule failed: {0}")]
    RuleFailed(String),

    #[error(transparent)]
    Directive(#[from] DirectiveError),
}

/// The error surfaced at the document-pipeline boundary (spec §7:
/// "a `ConfigError` is surfaced to the pipeline caller").
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Parser(#[from] ParserFailure),

    #[error(transparent)]
    MarkupParser(#[from] MarkupParserException),

    #[error(transparent)]
    ConfigSyntax(#[from] ConfigParserErrors),

    #[error(transparent)]
    Config(#[from] HoconError),

    #[error(transparent)]
    ConfigResolver(#[from] ConfigResolverError),

    #[error(transparent)]
    InvalidFields(#[from] InvalidFields),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Resolver(#[from] ResolverFailed),
}
