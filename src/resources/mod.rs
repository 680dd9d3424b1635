//! Filesystem resources that know their desired state.
//!
//! Every destination entry a command produces (mirrored files, directories
//! and links, downloaded archives, generated scripts) is a [`Resource`]:
//! tasks read its [`ResourceState`] first and only call
//! [`Applicable::apply`] when something is missing or stale.
pub mod artifact;
pub mod directory;
pub mod file;
pub mod generated;
pub mod helpers;
pub mod script;
pub mod symlink;

use anyhow::Result;

/// Something that can be written to disk.
pub trait Applicable {
    /// Destination shown in log lines, usually its path.
    fn description(&self) -> String;

    /// Bring the destination to its desired state, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the source, downloading, or writing the
    /// destination fails.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a destination entry compared to what it should be.
///
/// # Examples
///
/// ```
/// use buildaux::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "older than source".into() };
/// assert_ne!(stale, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the destination.
    Missing,
    /// Up to date.
    Correct,
    /// Exists but is stale.
    Incorrect {
        /// What is there now.
        current: String,
    },
    /// The destination has the wrong kind (a directory where a file belongs)
    /// and is never replaced.
    Invalid {
        /// Why the entry cannot be written.
        reason: String,
    },
}

/// Outcome of [`Applicable::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The destination was written.
    Applied,
    /// Nothing needed writing.
    AlreadyCorrect,
}

/// An [`Applicable`] that can inspect its destination first.
pub trait Resource: Applicable {
    /// Inspect the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination exists but cannot be read.
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether [`apply`](Applicable::apply) would change anything.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Fixed(ResourceState);

    impl Applicable for Fixed {
        fn description(&self) -> String {
            "service/main.js".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            Ok(ResourceChange::Applied)
        }
    }

    impl Resource for Fixed {
        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn needs_change_only_for_missing_or_stale() {
        let cases = [
            (ResourceState::Missing, true),
            (
                ResourceState::Incorrect {
                    current: "older than source".to_string(),
                },
                true,
            ),
            (ResourceState::Correct, false),
            (
                ResourceState::Invalid {
                    reason: "is a directory".to_string(),
                },
                false,
            ),
        ];
        for (state, expected) in cases {
            assert_eq!(Fixed(state.clone()).needs_change().unwrap(), expected, "{state:?}");
        }
    }
}
