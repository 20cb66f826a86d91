//! A parser combinator library, a HOCON configuration resolver, and a
//! directive/rewrite-rule engine for lightweight markup toolchains.
//!
//! Concrete markup grammars, renderers (HTML/XHTML/PDF), file I/O, theme
//! assembly, and the plugin/CLI glue that turns this into an end-user
//! document toolchain are external collaborators — this crate specifies
//! only the interfaces it consumes from and exposes to them.
//!
//! # Layout
//!
//! - [`source`] / [`parser`] — the combinator core: [`source::SourceCursor`]
//!   and [`parser::Parser`]/[`parser::Parsed`], with character-class,
//!   delimited-text and prefix-dispatch primitives under [`parser::text`]
//!   and [`parser::prefix`].
//! - [`hocon`] — the two-stage configuration resolver: an unresolved
//!   [`hocon::builder::BuilderValue`] tree, [`hocon::resolver::resolve`],
//!   the [`hocon::Config`] façade, and the deferred [`hocon::field_ref`]
//!   tree for re-homeable fragments.
//! - [`directive`] — the typed directive DSL ([`directive::parts`]) and its
//!   wire syntax ([`directive::syntax`]).
//! - [`document`] — the arena-owned document tree ([`document::tree`]), its
//!   traversal cursor ([`document::cursor`]), and the parse/resolve/rewrite
//!   pipeline glue.
//! - [`rewrite`] — the phased, bottom-up rewrite engine.
//! - [`bundle`] — extension bundle merge ordering.
//! - [`message`] — severity levels and render/fail filters shared across
//!   decode diagnostics and rewrite messages.
//! - [`error`] — the crate-wide error taxonomy.
//! - [`tree_print`] — an AST/`ConfigValue` pretty-printer for debugging and
//!   the "AST dump" render target.

pub mod bundle;
pub mod directive;
pub mod document;
pub mod error;
pub mod hocon;
pub mod message;
pub mod parser;
pub mod rewrite;
pub mod source;
pub mod tree_print;

pub use error::PipelineError;
pub use hocon::{Config, ConfigValue, Key};
pub use message::{Message, MessageFilters, MessageLevel};
pub use parser::{Parsed, Parser};
pub use source::SourceCursor;
