//! Pattern-driven rendering of per-line prefixes
//!
//! A [`PrefixFormatter`] compiles a pattern string into segments once, then
//! renders a prefix per log call. Formatters are held through a
//! [`SharedFormatter`] handle; whether two loggers share one formatter (a
//! pattern change affects both) or each owns an independent copy is decided
//! at logger construction time.

use chrono::Local;
use parking_lot::RwLock;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::core::log_level::Level;

/// Shared, mutable handle to a [`PrefixFormatter`].
///
/// Cloning the handle shares the formatter; use [`PrefixFormatter::duplicate`]
/// for an independent copy.
pub type SharedFormatter = Arc<RwLock<PrefixFormatter>>;

// Thread label cache: resolving the current thread's name allocates, and the
// label is rendered on every `%t` token, so compute it once per thread.
thread_local! {
    static THREAD_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn thread_label() -> String {
    THREAD_LABEL.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            let current = std::thread::current();
            *cache = Some(match current.name() {
                Some(name) => name.to_string(),
                None => format!("{:?}", current.id()),
            });
        }
        cache.as_ref().expect("thread label cached above").clone()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    LevelName,
    ThreadName,
    /// `%d{...}` timestamp with a strftime subpattern; `%d` alone renders empty.
    Date(Option<String>),
    PrefixString,
}

/// Renders the per-line prefix from a pattern.
///
/// Pattern tokens: `%l` level name, `%t` producer thread name, `%d` or
/// `%d{strftime}` timestamp (empty without a subpattern), `%p` the logger's
/// instance prefix string (empty if unset), `%%` a literal percent.
/// Unrecognized text passes through literally.
#[derive(Debug, Clone)]
pub struct PrefixFormatter {
    pattern: Option<String>,
    segments: Vec<Segment>,
}

impl PrefixFormatter {
    /// Pattern used by [`PrefixFormatter::default`].
    pub const DEFAULT_PATTERN: &'static str = "[%l] [%t] [%d] %p";

    /// Create a formatter from a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        let mut formatter = Self {
            pattern: None,
            segments: Vec::new(),
        };
        formatter.set_pattern(pattern);
        formatter
    }

    /// The no-op formatter: always renders the empty string.
    pub fn null() -> Self {
        Self {
            pattern: None,
            segments: Vec::new(),
        }
    }

    /// True for formatters without a pattern, i.e. [`PrefixFormatter::null`].
    pub fn is_null(&self) -> bool {
        self.pattern.is_none()
    }

    /// Replace the pattern. Takes effect on subsequent `format` calls; when
    /// this formatter is shared, every holder sees the new pattern.
    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        self.segments = compile(&pattern);
        self.pattern = Some(pattern);
    }

    /// The current pattern, `None` for the null formatter.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Render the prefix for one log line.
    ///
    /// Pure except for the `%d` token, which reads the wall clock at call
    /// time, and `%t`, which names the calling thread.
    pub fn format(&self, level: Level, prefix: Option<&str>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::LevelName => out.push_str(level.to_str()),
                Segment::ThreadName => out.push_str(&thread_label()),
                Segment::Date(None) => {}
                Segment::Date(Some(subpattern)) => {
                    // best-effort: an invalid strftime subpattern renders as
                    // much as chrono could format, never a panic
                    let _ = write!(out, "{}", Local::now().format(subpattern));
                }
                Segment::PrefixString => out.push_str(prefix.unwrap_or("")),
            }
        }
        out
    }

    /// An independent copy with the same pattern. Unlike cloning a
    /// [`SharedFormatter`] handle, later pattern changes do not propagate.
    pub fn duplicate(&self) -> PrefixFormatter {
        self.clone()
    }

    /// Wrap this formatter into a [`SharedFormatter`] handle.
    pub fn shared(self) -> SharedFormatter {
        Arc::new(RwLock::new(self))
    }
}

impl Default for PrefixFormatter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN)
    }
}

fn compile(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    let flush = |literal: &mut String, segments: &mut Vec<Segment>| {
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(literal)));
        }
    };

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.peek() {
            Some('l') => {
                chars.next();
                flush(&mut literal, &mut segments);
                segments.push(Segment::LevelName);
            }
            Some('t') => {
                chars.next();
                flush(&mut literal, &mut segments);
                segments.push(Segment::ThreadName);
            }
            Some('p') => {
                chars.next();
                flush(&mut literal, &mut segments);
                segments.push(Segment::PrefixString);
            }
            Some('%') => {
                chars.next();
                literal.push('%');
            }
            Some('d') => {
                chars.next();
                flush(&mut literal, &mut segments);
                // an unterminated brace still yields its content as the subpattern
                let subpattern = if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut sub = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        sub.push(c);
                    }
                    if sub.trim().is_empty() {
                        None
                    } else {
                        Some(sub)
                    }
                } else {
                    None
                };
                segments.push(Segment::Date(subpattern));
            }
            // unrecognized token or trailing percent: pass through literally
            _ => literal.push('%'),
        }
    }
    flush(&mut literal, &mut segments);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_level_and_prefix_tokens() {
        let formatter = PrefixFormatter::new("[%l] %p| ");
        assert_eq!(
            formatter.format(Level::Warning, Some("worker")),
            "[WARNING] worker| "
        );
        assert_eq!(formatter.format(Level::Warning, None), "[WARNING] | ");
    }

    #[test]
    fn test_thread_token_uses_thread_name() {
        let handle = thread::Builder::new()
            .name("T1".to_string())
            .spawn(|| PrefixFormatter::new("[%l] [%t] [%p] ").format(Level::Info, Some("X")))
            .unwrap();
        assert_eq!(handle.join().unwrap(), "[INFO] [T1] [X] ");
    }

    #[test]
    fn test_percent_escape() {
        let formatter = PrefixFormatter::new("100%% %l");
        assert_eq!(formatter.format(Level::Info, None), "100% INFO");
    }

    #[test]
    fn test_unrecognized_token_passes_through() {
        let formatter = PrefixFormatter::new("%x %l %");
        assert_eq!(formatter.format(Level::Debug, None), "%x DEBUG %");
    }

    #[test]
    fn test_date_without_subpattern_is_empty() {
        let formatter = PrefixFormatter::new("[%d]");
        assert_eq!(formatter.format(Level::Info, None), "[]");
    }

    #[test]
    fn test_date_with_subpattern() {
        let formatter = PrefixFormatter::new("%d{%Y}");
        let year = formatter.format(Level::Info, None);
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_null_formatter_renders_empty() {
        let formatter = PrefixFormatter::null();
        assert!(formatter.is_null());
        for level in Level::ALL {
            assert_eq!(formatter.format(level, Some("ignored")), "");
        }
    }

    #[test]
    fn test_set_pattern_recompiles() {
        let mut formatter = PrefixFormatter::new("%l ");
        assert_eq!(formatter.format(Level::Info, None), "INFO ");
        formatter.set_pattern("<%l> ");
        assert_eq!(formatter.pattern(), Some("<%l> "));
        assert_eq!(formatter.format(Level::Info, None), "<INFO> ");
    }

    #[test]
    fn test_duplicate_is_independent() {
        let original = PrefixFormatter::new("%l");
        let mut copy = original.duplicate();
        copy.set_pattern("copy %l");
        assert_eq!(original.format(Level::Info, None), "INFO");
        assert_eq!(copy.format(Level::Info, None), "copy INFO");
    }

    #[test]
    fn test_shared_handle_aliases() {
        let shared = PrefixFormatter::new("%l").shared();
        let alias = Arc::clone(&shared);
        alias.write().set_pattern("** %l");
        assert_eq!(shared.read().format(Level::Info, None), "** INFO");
    }
}
