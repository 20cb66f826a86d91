//! HOCON configuration: a builder tree produced by syntax parsing, resolved
//! through a five-stage pipeline into a typed [`config::Config`] façade
//! (spec §3, §4.2, §6).

pub mod builder;
pub mod config;
pub mod error;
pub mod field_ref;
pub mod key;
pub mod origin;
pub mod resolver;
pub mod value;

pub use config::{Config, Decoder};
pub use error::{ConfigResolverError, HoconError};
pub use key::Key;
pub use origin::Origin;
pub use value::ConfigValue;
