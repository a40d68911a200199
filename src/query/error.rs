use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Cannot filter on field `{0}`")]
    UnknownFilterField(String),

    #[error("Cannot sort on field `{0}`")]
    UnknownSortField(String),

    #[error("Cannot select field `{0}`")]
    UnknownSelectField(String),

    #[error("Unsupported filter operator `{0}`")]
    UnsupportedOperator(String),

    #[error("Invalid filter key `{0}`")]
    MalformedKey(String),

    #[error("Invalid value `{value}` for field `{field}`")]
    InvalidValue { field: String, value: String },
}
