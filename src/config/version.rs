//! Shopify Admin API version.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A Shopify Admin API version segment, as it appears in `/admin/api/{version}`.
///
/// Shopify releases versions quarterly and names them `YYYY-MM`. The special
/// `unstable` version is accepted as well.
///
/// # Example
///
/// ```rust
/// use httpshopify::ApiVersion;
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version.to_string(), "2024-10");
/// assert_eq!(ApiVersion::default().to_string(), "2021-04");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiVersion(String);

impl ApiVersion {
    const DEFAULT: &'static str = "2021-04";

    /// Creates a validated API version.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiVersion`] unless the value is `unstable`
    /// or a `YYYY-MM` string with a release month (01, 04, 07, 10).
    pub fn new(version: impl Into<String>) -> Result<Self, ConfigError> {
        let version = version.into();
        let trimmed = version.trim();

        if trimmed == "unstable" || Self::is_release(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ConfigError::InvalidApiVersion { version })
        }
    }

    /// Returns the unstable API version.
    #[must_use]
    pub fn unstable() -> Self {
        Self("unstable".to_string())
    }

    /// Returns `true` for the `unstable` version.
    #[must_use]
    pub fn is_unstable(&self) -> bool {
        self.0 == "unstable"
    }

    fn is_release(value: &str) -> bool {
        let Some((year, month)) = value.split_once('-') else {
            return false;
        };
        year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && matches!(month, "01" | "04" | "07" | "10")
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ApiVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
