//! Provenance, shared by resolved config fields and extension bundles
//! (spec §3, §4.5; GLOSSARY "Origin").

use std::fmt::{Display, Formatter};

/// The source of a bundle contribution or a resolved field.
///
/// Ordering matters: spec §4.5 sorts bundles `Library, Parser, Theme,
/// Mixed, User` (stable within each origin by insertion order), which is
/// exactly the declaration order below — `derive(Ord)` on a fieldless enum
/// orders variants by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    /// A value the resolver produced itself (e.g. a synthesized array
    /// index), not traceable to user or library input.
    Synthetic,
    Library,
    Parser,
    Theme,
    Mixed,
    User,
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Origin::Synthetic => "synthetic",
            Origin::Library => "library",
            Origin::Parser => "parser",
            Origin::Theme => "theme",
            Origin::Mixed => "mixed",
            Origin::User => "user",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_merge_order_is_ascending() {
        let mut origins = vec![Origin::User, Origin::Library, Origin::Theme, Origin::Parser, Origin::Mixed];
        origins.sort();
        assert_eq!(
            origins,
            vec![Origin::Library, Origin::Parser, Origin::Theme, Origin::Mixed, Origin::User]
        );
    }
}
