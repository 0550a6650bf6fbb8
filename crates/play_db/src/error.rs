//! Error types for the item repository and its collection backings

use mongodb::bson;
use thiserror::Error;

/// Errors that can occur when working with item repositories
#[derive(Debug, Error)]
pub enum DbError {
    /// An argument was rejected before the store was contacted
    #[error("Invalid argument: `{0}` must not be empty")]
    InvalidArgument(&'static str),

    /// Error from the MongoDB driver, propagated unchanged
    #[error("Database error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    /// An entity or value could not be converted to BSON
    #[error("Serialization error: {0}")]
    SerializationError(#[from] bson::ser::Error),

    /// A stored document could not be decoded
    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] bson::de::Error),

    /// Error raised by a collection backing other than MongoDB
    #[error("Collection error: {0}")]
    CollectionError(String),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database connection
    #[error("Database connection error: {0}")]
    ConnectionError(String),
}
