//! Error mapping for the SQLite backend.

use storefront_core::storage::RepositoryError;

/// Wraps a rusqlite error for use inside `tokio_rusqlite` closures.
pub(super) fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Maps a connection-call error to a repository error, turning UNIQUE
/// violations into `AlreadyExists` for the given entity/id.
pub(super) fn map_call_error(
    e: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: String,
) -> RepositoryError {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _)) = &e {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return RepositoryError::AlreadyExists { entity_type, id };
        }
    }
    RepositoryError::QueryFailed(e.to_string())
}

/// Maps a connection-call error where no constraint can fire.
pub(super) fn map_query_error(e: tokio_rusqlite::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_maps_to_already_exists() {
        let failure = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            Some("UNIQUE constraint failed: users.email".to_string()),
        );

        let mapped = map_call_error(
            tokio_rusqlite::Error::Rusqlite(failure),
            "User",
            "john@example.com".to_string(),
        );

        assert!(matches!(mapped, RepositoryError::AlreadyExists { .. }));
    }

    #[test]
    fn test_other_errors_map_to_query_failed() {
        let mapped = map_call_error(
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::InvalidQuery),
            "User",
            "1".to_string(),
        );

        assert!(matches!(mapped, RepositoryError::QueryFailed(_)));
    }
}
