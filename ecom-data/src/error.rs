use std::error::Error;
use std::fmt;

use crate::query::QueryError;

/// Failure of a repository operation.
///
/// Absence is not an error for lookups: `find_by_id` returns `Ok(None)`.
/// `NotFound` is reserved for callers that ask for a row to exist
/// (`Repository::get_by_id`).
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    /// The datastore was unreachable or rejected the operation.
    Database(Box<dyn Error + Send + Sync>),
    /// SQL could not be generated (bad identifier, unknown sort column).
    Query(QueryError),
    Other(String),
}

impl DataError {
    /// Wrap a driver error; backends call this for anything they cannot map.
    pub fn database<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        DataError::Database(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::NotFound(what) => write!(f, "{what} not found"),
            DataError::Database(cause) => write!(f, "database operation failed: {cause}"),
            DataError::Query(cause) => write!(f, "cannot build query: {cause}"),
            DataError::Other(reason) => f.write_str(reason),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataError::Database(cause) => Some(&**cause),
            DataError::Query(cause) => Some(cause),
            DataError::NotFound(_) | DataError::Other(_) => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::Query(err)
    }
}
