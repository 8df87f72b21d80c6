//! Property-based tests for task_logger_system using proptest

use proptest::prelude::*;
use task_logger_system::prelude::*;

fn any_level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Trace),
        Just(Level::Debug),
        Just(Level::Info),
        Just(Level::Warning),
        Just(Level::Error),
        Just(Level::Fatal),
    ]
}

// ============================================================================
// Level Tests
// ============================================================================

proptest! {
    /// Level string conversions roundtrip correctly
    #[test]
    fn test_level_str_roundtrip(level in any_level()) {
        let as_str = level.to_str();
        let parsed: Level = as_str.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Level ordering is consistent with the discriminant
    #[test]
    fn test_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }

    /// The enabled predicate agrees with the level order
    #[test]
    fn test_enabled_predicate(threshold in any_level(), requested in any_level()) {
        let writer = LoggerThread::new();
        let logger = writer.logger_builder().level(threshold).build();
        prop_assert_eq!(logger.is_enabled(requested), requested >= threshold);
    }
}

// ============================================================================
// PrefixFormatter Tests
// ============================================================================

proptest! {
    /// Compiling and rendering an arbitrary pattern never panics
    #[test]
    fn test_format_never_panics(pattern in ".*", prefix in ".*", level in any_level()) {
        let formatter = PrefixFormatter::new(pattern);
        let _ = formatter.format(level, Some(&prefix));
        let _ = formatter.format(level, None);
    }

    /// Token-free patterns render as themselves regardless of level or prefix
    #[test]
    fn test_literal_pattern_passthrough(
        pattern in "[a-zA-Z0-9 \\[\\]:._-]*",
        prefix in ".*",
        level in any_level(),
    ) {
        let formatter = PrefixFormatter::new(pattern.clone());
        prop_assert_eq!(formatter.format(level, Some(&prefix)), pattern);
    }

    /// `%p` renders the instance prefix string verbatim
    #[test]
    fn test_prefix_string_verbatim(prefix in ".*", level in any_level()) {
        let formatter = PrefixFormatter::new("%p");
        prop_assert_eq!(formatter.format(level, Some(&prefix)), prefix);
        prop_assert_eq!(formatter.format(level, None), "");
    }

    /// `%l` renders exactly the level name
    #[test]
    fn test_level_token(level in any_level()) {
        let formatter = PrefixFormatter::new("%l");
        prop_assert_eq!(formatter.format(level, None), level.to_str());
    }

    /// The null formatter renders empty output for any input
    #[test]
    fn test_null_formatter_always_empty(prefix in ".*", level in any_level()) {
        let formatter = PrefixFormatter::null();
        prop_assert_eq!(formatter.format(level, Some(&prefix)), "");
    }

    /// The pattern survives a set/get roundtrip
    #[test]
    fn test_pattern_roundtrip(pattern in ".*") {
        let mut formatter = PrefixFormatter::null();
        formatter.set_pattern(pattern.clone());
        prop_assert_eq!(formatter.pattern(), Some(pattern.as_str()));
    }

    /// Duplicates render identically until one of them is repatterned
    #[test]
    fn test_duplicate_renders_identically(
        pattern in "[a-zA-Z0-9 %lpt\\[\\]]*",
        prefix in ".*",
        level in any_level(),
    ) {
        let original = PrefixFormatter::new(pattern);
        let copy = original.duplicate();
        prop_assert_eq!(
            original.format(level, Some(&prefix)),
            copy.format(level, Some(&prefix))
        );
    }
}
