//! Error types for the skillcast-calendar crate.

/// Error type for all fallible operations in the skillcast-calendar crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u8,
    },

    /// Returned when a `YYYYMM` tag cannot be parsed.
    #[error("invalid year-month tag: '{tag}' (expected YYYYMM)")]
    InvalidTag {
        /// The tag that failed to parse.
        tag: String,
    },
}
