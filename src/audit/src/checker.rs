//! The existence check boundary.

/// The existence of a media package could not be determined.
///
/// Carries a human readable cause only, the classifier treats every failure
/// the same way regardless of where it came from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct CheckFailed {
    /// Why the check could not be completed
    pub cause: String,
}

impl CheckFailed {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Answers whether a media package still exists for a tenant.
///
/// - `Ok(true)`: the media package exists
/// - `Ok(false)`: the media package is confirmed absent
/// - `Err(_)`: unknown, the check could not be completed
#[cfg_attr(test, mockall::automock)]
pub trait ExistenceChecker {
    fn exists(&self, tenant: &str, media_package: &str) -> Result<bool, CheckFailed>;
}

impl<F> ExistenceChecker for F
where
    F: Fn(&str, &str) -> Result<bool, CheckFailed>,
{
    fn exists(&self, tenant: &str, media_package: &str) -> Result<bool, CheckFailed> {
        self(tenant, media_package)
    }
}
