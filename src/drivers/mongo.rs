//! MongoDB driver implementation

use std::sync::Mutex;
use std::time::Duration;

use mongodb::{options::ClientOptions, Client};

use crate::builder::ConnectionSpec;
use crate::error::BackendError;

/// Holds the live client once a connect succeeds, so a later query
/// console can reuse it.
pub struct MongoDriver {
    client: Mutex<Option<Client>>,
    db_name: Mutex<Option<String>>,
}

impl MongoDriver {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
            db_name: Mutex::new(None),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.lock().unwrap().is_some()
    }

    pub fn active_database(&self) -> Option<String> {
        self.db_name.lock().unwrap().clone()
    }

    fn uri<'a>(spec: &'a ConnectionSpec) -> Result<&'a str, BackendError> {
        let ConnectionSpec::Uri { uri, .. } = spec else {
            return Err(BackendError::InvalidConnectionString(
                "expected a mongodb:// URI".into(),
            ));
        };
        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err(BackendError::InvalidConnectionString(
                "MongoDB connection string must start with mongodb:// or mongodb+srv://".into(),
            ));
        }
        Ok(uri)
    }

    /// Parse the URI, open a client and ping the server
    async fn open_client(uri: &str, timeout: Duration) -> Result<Client, BackendError> {
        let mut client_options = tokio::time::timeout(timeout, ClientOptions::parse(uri))
            .await
            .map_err(|_| BackendError::Timeout(timeout))?
            .map_err(|e| BackendError::InvalidConnectionString(e.to_string()))?;

        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(client_options)
            .map_err(|e| BackendError::Failed(e.to_string()))?;

        // Ping the server to verify the connection
        tokio::time::timeout(
            timeout,
            client
                .database("admin")
                .run_command(mongodb::bson::doc! { "ping": 1 }),
        )
        .await
        .map_err(|_| BackendError::Timeout(timeout))?
        .map_err(|e| BackendError::Failed(e.to_string()))?;

        Ok(client)
    }

    pub async fn test(
        &self,
        spec: &ConnectionSpec,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let uri = Self::uri(spec)?;
        Self::open_client(uri, timeout).await?;
        Ok("Connected successfully to MongoDB!".to_string())
    }

    pub async fn connect(
        &self,
        spec: &ConnectionSpec,
        db_name: &str,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let uri = Self::uri(spec)?;
        let client = Self::open_client(uri, timeout).await?;

        *self.client.lock().unwrap() = Some(client);
        *self.db_name.lock().unwrap() = Some(db_name.to_string());
        tracing::info!(database = %db_name, "mongodb connection established");

        Ok("Connected and state updated".to_string())
    }
}
