//! Response status classification.
//!
//! A status is either a success, a transient failure worth retrying (429 and
//! every 5xx), or a terminal failure (every other 4xx). The retry loop and
//! [`HttpError::is_retryable`] both derive from [`StatusClass::of`], so they
//! can never disagree.

use crate::clients::errors::{HttpError, HttpResponseError};

/// The outcome category of an HTTP status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// Below 400.
    Success,
    /// 429 Too Many Requests or any 5xx.
    Retryable,
    /// Any other status of 400 or above.
    Fatal,
}

impl StatusClass {
    /// Statuses at or above this value are errors.
    pub const CLIENT_ERROR_THRESHOLD: u16 = 400;

    /// Classifies a status code.
    ///
    /// ```rust
    /// use httpshopify::StatusClass;
    ///
    /// assert_eq!(StatusClass::of(201), StatusClass::Success);
    /// assert_eq!(StatusClass::of(429), StatusClass::Retryable);
    /// assert_eq!(StatusClass::of(503), StatusClass::Retryable);
    /// assert_eq!(StatusClass::of(422), StatusClass::Fatal);
    /// ```
    #[must_use]
    pub const fn of(code: u16) -> Self {
        if code < Self::CLIENT_ERROR_THRESHOLD {
            Self::Success
        } else if code == 429 || code >= 500 {
            Self::Retryable
        } else {
            Self::Fatal
        }
    }
}

/// Maps a status code and raw body to success or a typed error.
///
/// # Errors
///
/// Returns the [`HttpError`] matching `code` when it is 400 or above.
///
/// ```rust
/// use httpshopify::{classify, HttpError};
///
/// assert!(classify(200, b"{}").is_ok());
/// assert!(matches!(classify(401, b""), Err(HttpError::Unauthorized(_))));
/// ```
pub fn classify(code: u16, body: &[u8]) -> Result<(), HttpError> {
    match StatusClass::of(code) {
        StatusClass::Success => Ok(()),
        StatusClass::Retryable | StatusClass::Fatal => Err(HttpError::from_response(
            HttpResponseError::new(code, String::from_utf8_lossy(body).into_owned()),
        )),
    }
}
