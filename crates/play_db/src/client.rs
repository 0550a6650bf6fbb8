//! Database client for the Play catalog
//!
//! Wraps a [`mongodb::Client`] bound to one database and hands out typed
//! item contexts. Pooling, timeouts and reconnects are handled by the
//! driver; this client only translates configuration into driver options.

use crate::context::MongoItemContext;
use crate::entity::Entity;
use crate::error::DbError;
use crate::mongo::MongoCollection;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use play_config::{AppConfig, DatabaseConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Database client for the Play catalog
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The driver client, shared by every clone
    client: Client,
    /// The configured database
    database: Database,
}

impl DbClient {
    /// Create a new database client from the application configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The application configuration with a `database` section
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database configuration is missing
    /// * The database URL or name is empty or invalid
    pub async fn new(config: &Arc<AppConfig>) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    /// Create a new database client from a database configuration
    ///
    /// The driver connects lazily, so this succeeds without a reachable
    /// server; use [`DbClient::is_healthy`] to check the connection.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL or name is empty
    /// * The URL cannot be parsed
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }
        if db_config.database.is_empty() {
            return Err(DbError::ConfigError("Database name is empty".to_string()));
        }

        let options = Self::client_options(db_config).await?;
        Self::from_options(options, &db_config.database)
    }

    /// Create a new database client from a connection URL and database name
    ///
    /// # Arguments
    ///
    /// * `db_url` - A `mongodb://` or `mongodb+srv://` connection string
    /// * `database` - The database the client is bound to
    ///
    /// # Errors
    ///
    /// This function will return an error if the URL is empty or invalid.
    pub async fn from_url(db_url: &str, database: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }

        let options = ClientOptions::parse(db_url).await.map_err(|e| {
            error!("Failed to parse database URL: {}", e);
            DbError::UrlError(e.to_string())
        })?;
        Self::from_options(options, database)
    }

    async fn client_options(db_config: &DatabaseConfig) -> Result<ClientOptions, DbError> {
        debug!("Parsing database URL for database '{}'", db_config.database);

        let mut options = ClientOptions::parse(&db_config.url).await.map_err(|e| {
            error!("Failed to parse database URL: {}", e);
            DbError::UrlError(e.to_string())
        })?;

        if let Some(app_name) = &db_config.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(max_pool_size) = db_config.max_pool_size {
            options.max_pool_size = Some(max_pool_size);
        }
        if let Some(secs) = db_config.connect_timeout_secs {
            options.connect_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = db_config.server_selection_timeout_secs {
            options.server_selection_timeout = Some(Duration::from_secs(secs));
        }

        Ok(options)
    }

    fn from_options(options: ClientOptions, database: &str) -> Result<Self, DbError> {
        let client = Client::with_options(options).map_err(|e| {
            error!("Failed to create database client: {}", e);
            DbError::ConnectionError(e.to_string())
        })?;
        let database = client.database(database);

        info!("Database client created for database '{}'", database.name());
        Ok(Self { client, database })
    }

    /// The driver client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The configured database
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// A typed handle to the named collection
    ///
    /// # Arguments
    ///
    /// * `name` - The collection name within the configured database
    pub fn collection<T: Entity>(&self, name: &str) -> MongoCollection<T> {
        MongoCollection::new(self.database.collection::<T>(name))
    }

    /// An item context over the named collection
    pub fn item_context<T: Entity>(&self, collection: &str) -> MongoItemContext<T> {
        MongoItemContext::new(self.collection(collection))
    }

    /// Check if the database is reachable by sending a `ping`
    ///
    /// # Returns
    ///
    /// `true` if the server answered, `false` on any error
    pub async fn is_healthy(&self) -> bool {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Database ping failed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient({})", self.database.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_config(url: &str, database: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            database: database.to_string(),
            app_name: Some("play-db-tests".to_string()),
            max_pool_size: Some(2),
            connect_timeout_secs: Some(1),
            server_selection_timeout_secs: Some(1),
        }
    }

    #[tokio::test]
    async fn test_missing_database_section_is_a_config_error() {
        let config = Arc::new(AppConfig::default());
        let result = DbClient::new(&config).await;
        assert!(matches!(result, Err(DbError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_empty_url_and_name_are_rejected() {
        let result = DbClient::from_config(&db_config("", "catalog")).await;
        assert!(matches!(result, Err(DbError::ConfigError(_))));

        let result = DbClient::from_config(&db_config("mongodb://localhost:27017", "")).await;
        assert!(matches!(result, Err(DbError::ConfigError(_))));

        let result = DbClient::from_url("", "catalog").await;
        assert!(matches!(result, Err(DbError::UrlError(_))));
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_url_error() {
        let result = DbClient::from_config(&db_config("postgres://localhost", "catalog")).await;
        assert!(matches!(result, Err(DbError::UrlError(_))));
    }

    #[tokio::test]
    async fn test_client_is_created_lazily() {
        let client = DbClient::from_config(&db_config("mongodb://localhost:27017", "catalog"))
            .await
            .expect("client options are valid");

        assert_eq!(client.database().name(), "catalog");
        assert_eq!(client.to_string(), "DbClient(catalog)");
    }
}
