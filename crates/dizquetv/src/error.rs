//! Library error types.

use thiserror::Error;

/// Errors produced by the dizqueTV entity layer.
///
/// Transport and decode failures are not wrapped here; they propagate
/// unchanged as [`anyhow::Error`] from the session collaborator.
#[derive(Debug, Error)]
pub enum DizqueTvError {
    /// A session-backed operation was invoked on an entity that was not
    /// built from a live dizqueTV session.
    #[error("{object_type} is not linked to a remote dizqueTV instance")]
    NotRemoteObject {
        /// Concrete entity type name, for diagnostics.
        object_type: &'static str,
    },
}

/// Guard used by every session-backed operation: yields the handle when
/// present, fails with [`DizqueTvError::NotRemoteObject`] otherwise.
pub(crate) fn require_linked<'a, T>(
    handle: Option<&'a T>,
    object_type: &'static str,
) -> Result<&'a T, DizqueTvError> {
    handle.ok_or(DizqueTvError::NotRemoteObject { object_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_remote_object_names_the_entity_type() {
        // Arrange
        let handle: Option<&u32> = None;

        // Act
        let err = require_linked(handle, "Program").unwrap_err();

        // Assert
        assert_eq!(
            err.to_string(),
            "Program is not linked to a remote dizqueTV instance"
        );
    }

    #[test]
    fn test_require_linked_passes_through_present_handles() {
        // Arrange
        let value = 7_u32;

        // Act
        let result = require_linked(Some(&value), "Program");

        // Assert
        assert_eq!(result.copied().ok(), Some(7));
    }
}
