//! The backend command surface the lifecycle controller drives

use std::time::Duration;

use async_trait::async_trait;

use crate::builder::ConnectionSpec;
use crate::error::BackendError;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Commands executed against a live database server.
///
/// Success values are human-readable status strings, surfaced to the
/// user as-is.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Probe the server without retaining the connection
    async fn test_connection(&self, spec: &ConnectionSpec) -> Result<String, BackendError>;

    /// Establish the working connection and select `db_name`
    async fn connect(&self, spec: &ConnectionSpec, db_name: &str) -> Result<String, BackendError>;
}

/// Dispatches backend commands to the driver compiled in for the
/// family. A family without a driver resolves to an explicit
/// unsupported-operation error, never silence.
pub struct DriverBackend {
    timeout: Duration,
    #[cfg(feature = "mongodb")]
    mongo: crate::drivers::mongo::MongoDriver,
    #[cfg(feature = "postgres")]
    postgres: crate::drivers::postgres::PostgresDriver,
}

impl DriverBackend {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            #[cfg(feature = "mongodb")]
            mongo: crate::drivers::mongo::MongoDriver::new(),
            #[cfg(feature = "postgres")]
            postgres: crate::drivers::postgres::PostgresDriver::new(),
        }
    }

    /// Whether any driver currently holds a live connection
    pub fn is_connected(&self) -> bool {
        #[cfg(feature = "mongodb")]
        if self.mongo.is_connected() {
            return true;
        }
        #[cfg(feature = "postgres")]
        if self.postgres.is_connected() {
            return true;
        }
        false
    }

    /// Database selected by the most recent MongoDB connect, if any.
    /// This is what a query console would operate on.
    #[cfg(feature = "mongodb")]
    pub fn active_database(&self) -> Option<String> {
        self.mongo.active_database()
    }
}

impl Default for DriverBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseBackend for DriverBackend {
    async fn test_connection(&self, spec: &ConnectionSpec) -> Result<String, BackendError> {
        match spec.family() {
            #[cfg(feature = "mongodb")]
            crate::family::DatabaseFamily::MongoDb => self.mongo.test(spec, self.timeout).await,
            #[cfg(feature = "postgres")]
            crate::family::DatabaseFamily::Postgres => {
                self.postgres.test(spec, self.timeout).await
            }
            family => Err(BackendError::Unsupported(family)),
        }
    }

    async fn connect(&self, spec: &ConnectionSpec, db_name: &str) -> Result<String, BackendError> {
        match spec.family() {
            #[cfg(feature = "mongodb")]
            crate::family::DatabaseFamily::MongoDb => {
                self.mongo.connect(spec, db_name, self.timeout).await
            }
            #[cfg(feature = "postgres")]
            crate::family::DatabaseFamily::Postgres => {
                self.postgres.connect(spec, self.timeout).await
            }
            family => Err(BackendError::Unsupported(family)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::DatabaseFamily;
    use crate::profile::ConnectionFields;

    #[tokio::test]
    async fn families_without_drivers_report_unsupported() {
        let backend = DriverBackend::new();
        let spec = ConnectionSpec::Fields {
            family: DatabaseFamily::Oracle,
            fields: ConnectionFields::default(),
        };
        let err = backend.test_connection(&spec).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Unsupported(DatabaseFamily::Oracle)
        ));
        let err = backend.connect(&spec, "admin").await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Unsupported(DatabaseFamily::Oracle)
        ));
    }

    #[test]
    fn starts_disconnected() {
        assert!(!DriverBackend::new().is_connected());
    }
}
