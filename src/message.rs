//! Severity levels shared by decode diagnostics and document rewrite
//! messages (spec §4.6, §4.8 — `MessageFilters`, `MessageLevel`).

use std::fmt::{Display, Formatter};

/// How severe a runtime message is. Declaration order is severity order,
/// so `derive(Ord)` gives `Debug < Info < Warning < Error < Fatal` for
/// free, matching spec's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Display for MessageLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MessageLevel::Debug => "debug",
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
            MessageLevel::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// A single diagnostic produced while decoding config or rewriting a
/// document, carrying enough context to render inline at its source
/// location.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, text)
    }
}

/// Decides which messages fail the build and which are rendered inline
/// (spec §6, "`MessageFilters{fail_on, render}`"). Both bounds are
/// inclusive-lower and optional: `None` means "never".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFilters {
    fail_on: Option<MessageLevel>,
    render: Option<MessageLevel>,
}

impl MessageFilters {
    /// Fail the build on errors and above; render nothing inline.
    pub fn defaults() -> Self {
        Self { fail_on: Some(MessageLevel::Error), render: None }
    }

    /// Never fail the build; render info-and-above inline — used when
    /// inspecting why a rewrite phase produced what it did.
    pub fn for_visual_debugging() -> Self {
        Self { fail_on: None, render: Some(MessageLevel::Info) }
    }

    pub fn custom(fail_on: Option<MessageLevel>, render: Option<MessageLevel>) -> Self {
        Self { fail_on, render }
    }

    pub fn should_render(&self, message: &Message) -> bool {
        self.render.is_some_and(|min| message.level >= min)
    }

    pub fn should_fail(&self, message: &Message) -> bool {
        self.fail_on.is_some_and(|min| message.level >= min)
    }
}

impl Default for MessageFilters {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_matches_severity() {
        assert!(MessageLevel::Debug < MessageLevel::Info);
        assert!(MessageLevel::Info < MessageLevel::Warning);
        assert!(MessageLevel::Warning < MessageLevel::Error);
        assert!(MessageLevel::Error < MessageLevel::Fatal);
    }

    #[test]
    fn defaults_fail_on_errors_but_render_nothing_inline() {
        let filters = MessageFilters::defaults();
        assert!(!filters.should_render(&Message::warning("careful")));
        assert!(!filters.should_render(&Message::error("bad")));
        assert!(filters.should_fail(&Message::error("bad")));
        assert!(!filters.should_fail(&Message::warning("meh")));
    }

    #[test]
    fn for_visual_debugging_renders_info_and_above_but_never_fails() {
        let filters = MessageFilters::for_visual_debugging();
        assert!(filters.should_render(&Message::info("fyi")));
        assert!(!filters.should_fail(&Message::error("bad")));
    }

    #[test]
    fn custom_filter_can_promote_errors_to_failing() {
        let filters = MessageFilters::custom(Some(MessageLevel::Error), Some(MessageLevel::Info));
        assert!(filters.should_fail(&Message::error("bad")));
        assert!(!filters.should_fail(&Message::warning("meh")));
    }
}
