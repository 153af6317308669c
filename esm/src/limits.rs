//! Configurable limits for bounded reading.

/// Reader limits.
///
/// Declared sizes are checked against these limits before any buffer is
/// allocated, so a corrupt size field cannot trigger a huge allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderLimits {
    /// Maximum size of a top-level record body in bytes.
    pub max_record_bytes: usize,

    /// Maximum size of a single sub-record payload in bytes.
    pub max_sub_record_bytes: usize,

    /// Maximum length of a length-prefixed string or reference id.
    pub max_string_bytes: usize,

    /// Maximum number of master files listed in a header.
    pub max_masters: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            // Land and script records stay well below this
            max_record_bytes: 64 * 1024 * 1024,
            max_sub_record_bytes: 16 * 1024 * 1024,
            max_string_bytes: 1024 * 1024,
            max_masters: 255,
        }
    }
}

impl ReaderLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_record_bytes: 256 * 1024,
            max_sub_record_bytes: 64 * 1024,
            max_string_bytes: 4096,
            max_masters: 16,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_record_bytes: usize::MAX,
            max_sub_record_bytes: usize::MAX,
            max_string_bytes: usize::MAX,
            max_masters: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_fit_land_records() {
        let limits = ReaderLimits::default();
        // A land record with every data block is under 64 KB
        assert!(limits.max_record_bytes >= 64 * 1024);
        assert!(limits.max_sub_record_bytes >= 16 * 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = ReaderLimits::for_testing();
        let default_limits = ReaderLimits::default();

        assert!(test_limits.max_record_bytes < default_limits.max_record_bytes);
        assert!(test_limits.max_sub_record_bytes < default_limits.max_sub_record_bytes);
        assert!(test_limits.max_string_bytes < default_limits.max_string_bytes);
        assert!(test_limits.max_masters < default_limits.max_masters);
    }

    #[test]
    fn unlimited_limits() {
        let limits = ReaderLimits::unlimited();
        assert_eq!(limits.max_record_bytes, usize::MAX);
        assert_eq!(limits.max_sub_record_bytes, usize::MAX);
        assert_eq!(limits.max_string_bytes, usize::MAX);
        assert_eq!(limits.max_masters, usize::MAX);
    }

    #[test]
    fn limits_equality() {
        assert_eq!(ReaderLimits::default(), ReaderLimits::default());
        assert_ne!(ReaderLimits::default(), ReaderLimits::for_testing());
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: ReaderLimits = ReaderLimits::for_testing();
        assert_eq!(LIMITS.max_string_bytes, 4096);
    }
}
