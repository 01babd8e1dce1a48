//! Domain cache key type shared by route cache adapters.
//!
//! Route keys are the lowercase hex SHA-256 digest of the canonical JSON array
//! `[origin, destination, departure_hour]`. Origin and destination are
//! lowercased and trimmed; the departure time is truncated to the wall-clock
//! hour in its own offset so requests within the same hour share an entry.
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

const HOUR_BUCKET_FORMAT: &str = "%Y-%m-%dT%H";

/// Cache key used to store and retrieve route responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteCacheKey(String);

impl RouteCacheKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, RouteCacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(RouteCacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(RouteCacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Derive the key for a route query.
    ///
    /// # Examples
    /// ```
    /// use chrono::DateTime;
    /// use route_weather::domain::ports::RouteCacheKey;
    ///
    /// let at = DateTime::parse_from_rfc3339("2026-02-16T10:42:00+01:00").expect("valid time");
    /// let a = RouteCacheKey::for_route(" Vancouver ", "WHISTLER", Some(&at));
    /// let b = RouteCacheKey::for_route("vancouver", "whistler", Some(&at));
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    pub fn for_route(
        origin: &str,
        destination: &str,
        departure: Option<&DateTime<FixedOffset>>,
    ) -> Self {
        let hour_bucket = departure
            .map(|at| at.format(HOUR_BUCKET_FORMAT).to_string())
            .unwrap_or_default();
        let canonical = Value::from(vec![
            origin.trim().to_lowercase(),
            destination.trim().to_lowercase(),
            hour_bucket,
        ])
        .to_string();
        Self(hex::encode(Sha256::digest(canonical.as_bytes())))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RouteCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for RouteCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`RouteCacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteCacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("route cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("route cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

#[cfg(test)]
mod tests {
    //! Validates key parsing, normalisation, and hour bucketing.
    use super::{RouteCacheKey, RouteCacheKeyValidationError};
    use chrono::{DateTime, FixedOffset};
    use rstest::rstest;

    fn at(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).expect("valid RFC 3339 timestamp")
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn cache_key_rejects_blank(#[case] value: &str) {
        let err = RouteCacheKey::new(value).expect_err("blank keys rejected");
        assert_eq!(err, RouteCacheKeyValidationError::Empty);
    }

    #[rstest]
    #[case(" leading")]
    #[case("trailing ")]
    fn cache_key_rejects_whitespace_padding(#[case] value: &str) {
        let err = RouteCacheKey::new(value).expect_err("padded key rejected");
        assert_eq!(err, RouteCacheKeyValidationError::ContainsWhitespace);
    }

    #[rstest]
    fn cache_key_accepts_clean_input() {
        let key = RouteCacheKey::new("route:user:1").expect("valid key");
        assert_eq!(key.as_str(), "route:user:1");
        assert_eq!(key.to_string(), "route:user:1");
    }

    #[rstest]
    #[case("Seattle, WA", "Portland, OR")]
    #[case("  seattle, wa", "PORTLAND, OR  ")]
    #[case("SEATTLE, WA\t", "\nportland, or")]
    fn derived_key_ignores_case_and_padding(#[case] origin: &str, #[case] destination: &str) {
        let expected = RouteCacheKey::for_route("seattle, wa", "portland, or", None);
        assert_eq!(RouteCacheKey::for_route(origin, destination, None), expected);
    }

    #[rstest]
    #[case("2026-02-16T10:00:00-08:00")]
    #[case("2026-02-16T10:05:30-08:00")]
    #[case("2026-02-16T10:59:59.999-08:00")]
    fn derived_key_buckets_departure_by_hour(#[case] departure: &str) {
        let reference = RouteCacheKey::for_route(
            "seattle",
            "portland",
            Some(&at("2026-02-16T10:30:00-08:00")),
        );
        let key = RouteCacheKey::for_route("seattle", "portland", Some(&at(departure)));
        assert_eq!(key, reference);
    }

    #[rstest]
    fn departure_one_hour_later_changes_key() {
        let first = RouteCacheKey::for_route(
            "seattle",
            "portland",
            Some(&at("2026-02-16T10:15:00-08:00")),
        );
        let later = RouteCacheKey::for_route(
            "seattle",
            "portland",
            Some(&at("2026-02-16T11:15:00-08:00")),
        );
        assert_ne!(first, later);
    }

    #[rstest]
    fn absent_departure_differs_from_any_hour() {
        let without = RouteCacheKey::for_route("a", "b", None);
        let with = RouteCacheKey::for_route("a", "b", Some(&at("2026-02-16T00:00:00Z")));
        assert_ne!(without, with);
    }

    #[rstest]
    fn derived_key_is_lowercase_sha256_hex() {
        let key = RouteCacheKey::for_route("a", "b", None);
        // sha256 of the compact JSON document ["a","b",""]
        assert_eq!(key.as_str().len(), 64);
        assert!(
            key.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
        assert_eq!(key, RouteCacheKey::for_route("a", "b", None));
    }

    #[rstest]
    fn origin_and_destination_are_not_interchangeable() {
        assert_ne!(
            RouteCacheKey::for_route("a", "b", None),
            RouteCacheKey::for_route("b", "a", None)
        );
    }

    #[rstest]
    fn derived_key_is_a_valid_raw_key() {
        let key = RouteCacheKey::for_route("a", "b", None);
        let reparsed = RouteCacheKey::new(key.as_str()).expect("derived keys are valid");
        assert_eq!(reparsed, key);
    }
}
