use ecom_data::DataError;

/// `sqlx::Error` -> [`DataError`].
///
/// Both types are foreign to this crate, so a `From` impl is not allowed
/// here; call sites use `.map_err(SqlxErrorExt::into_data_error)`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        if let sqlx::Error::RowNotFound = self {
            return DataError::NotFound("row".to_owned());
        }
        DataError::database(self)
    }
}

pub type SqlxResult<T> = Result<T, DataError>;
