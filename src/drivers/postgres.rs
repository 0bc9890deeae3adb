//! PostgreSQL driver implementation

use std::sync::Mutex;
use std::time::Duration;

use tokio_postgres::{Config, NoTls};

use crate::builder::ConnectionSpec;
use crate::error::BackendError;

pub struct PostgresDriver {
    client: Mutex<Option<tokio_postgres::Client>>,
}

impl PostgresDriver {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.lock().unwrap().is_some()
    }

    /// Canonical assembly happens here, driver-side: a URI spec is
    /// parsed by the driver itself, a field spec is mapped onto its
    /// config builder.
    fn config(spec: &ConnectionSpec, timeout: Duration) -> Result<Config, BackendError> {
        let mut config = match spec {
            ConnectionSpec::Uri { uri, .. } => {
                if !uri.starts_with("postgres://") && !uri.starts_with("postgresql://") {
                    return Err(BackendError::InvalidConnectionString(
                        "PostgreSQL connection string must start with postgres:// or postgresql://"
                            .into(),
                    ));
                }
                uri.parse::<Config>()
                    .map_err(|e| BackendError::InvalidConnectionString(e.to_string()))?
            }
            ConnectionSpec::Fields { fields, .. } => {
                let port: u16 = fields.port.parse().map_err(|_| {
                    BackendError::InvalidConnectionString(format!(
                        "invalid port: {}",
                        fields.port
                    ))
                })?;
                let mut config = Config::new();
                config
                    .host(&fields.host)
                    .port(port)
                    .dbname(&fields.database)
                    .user(&fields.username)
                    .password(&fields.password);
                config
            }
        };
        config.connect_timeout(timeout);
        Ok(config)
    }

    async fn open_client(
        spec: &ConnectionSpec,
        timeout: Duration,
    ) -> Result<tokio_postgres::Client, BackendError> {
        let config = Self::config(spec, timeout)?;

        let (client, connection) = tokio::time::timeout(timeout, config.connect(NoTls))
            .await
            .map_err(|_| BackendError::Timeout(timeout))?
            .map_err(|e| BackendError::Failed(e.to_string()))?;

        // Connection handler task required by tokio-postgres
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgresql connection error");
            }
        });

        Ok(client)
    }

    pub async fn test(
        &self,
        spec: &ConnectionSpec,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let client = Self::open_client(spec, timeout).await?;

        let row = client
            .query_one("SELECT version()", &[])
            .await
            .map_err(|e| BackendError::Failed(e.to_string()))?;
        let version: String = row.get(0);

        Ok(format!("Connected successfully: {version}"))
    }

    pub async fn connect(
        &self,
        spec: &ConnectionSpec,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let client = Self::open_client(spec, timeout).await?;

        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| BackendError::Failed(e.to_string()))?;

        *self.client.lock().unwrap() = Some(client);
        tracing::info!("postgresql connection established");

        Ok("Connected and state updated".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::DatabaseFamily;
    use crate::profile::ConnectionFields;

    fn fields() -> ConnectionFields {
        ConnectionFields {
            host: "localhost".to_string(),
            port: "5432".to_string(),
            database: "orders".to_string(),
            username: "svc".to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn assembles_config_from_fields() {
        let spec = ConnectionSpec::Fields {
            family: DatabaseFamily::Postgres,
            fields: fields(),
        };
        let config = PostgresDriver::config(&spec, Duration::from_secs(1)).unwrap();
        assert_eq!(config.get_dbname(), Some("orders"));
        assert_eq!(config.get_user(), Some("svc"));
        assert_eq!(config.get_ports(), &[5432]);
    }

    #[test]
    fn opaque_port_fails_at_the_driver_not_before() {
        let mut bad = fields();
        bad.port = "fivethousand".to_string();
        let spec = ConnectionSpec::Fields {
            family: DatabaseFamily::Postgres,
            fields: bad,
        };
        assert!(matches!(
            PostgresDriver::config(&spec, Duration::from_secs(1)),
            Err(BackendError::InvalidConnectionString(_))
        ));
    }

    #[test]
    fn rejects_foreign_schemes() {
        let spec = ConnectionSpec::Uri {
            family: DatabaseFamily::Postgres,
            uri: "mysql://localhost:3306/db".to_string(),
        };
        assert!(matches!(
            PostgresDriver::config(&spec, Duration::from_secs(1)),
            Err(BackendError::InvalidConnectionString(_))
        ));
    }
}
