use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported database families
///
/// Serialized as the lowercase token stored in the `db_type` column, so
/// the variants round-trip against records written by older builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFamily {
    Postgres,
    MySql,
    MongoDb,
    Oracle,
    MariaDb,
    ScyllaDb,
}

/// A single form field the registry can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Host,
    Port,
    Database,
    Username,
    Password,
    ConnectionString,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Host => "host",
            FieldName::Port => "port",
            FieldName::Database => "database",
            FieldName::Username => "username",
            FieldName::Password => "password",
            FieldName::ConnectionString => "connection_string",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DatabaseFamily {
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseFamily::Postgres => "PostgreSQL",
            DatabaseFamily::MySql => "MySQL",
            DatabaseFamily::MongoDb => "MongoDB",
            DatabaseFamily::Oracle => "Oracle",
            DatabaseFamily::MariaDb => "MariaDB",
            DatabaseFamily::ScyllaDb => "ScyllaDB",
        }
    }

    /// Token used in persisted records and over the backend surface
    pub fn id(&self) -> &'static str {
        match self {
            DatabaseFamily::Postgres => "postgres",
            DatabaseFamily::MySql => "mysql",
            DatabaseFamily::MongoDb => "mongodb",
            DatabaseFamily::Oracle => "oracle",
            DatabaseFamily::MariaDb => "mariadb",
            DatabaseFamily::ScyllaDb => "scylladb",
        }
    }

    /// Default port, kept as a string like the rest of the port field
    pub fn default_port(&self) -> Option<&'static str> {
        match self {
            DatabaseFamily::Postgres => Some("5432"),
            DatabaseFamily::MySql => Some("3306"),
            DatabaseFamily::MongoDb => Some("27017"),
            DatabaseFamily::Oracle => Some("1521"),
            DatabaseFamily::MariaDb => Some("3306"),
            DatabaseFamily::ScyllaDb => Some("9042"),
        }
    }

    pub fn uri_scheme(&self) -> &'static str {
        match self {
            DatabaseFamily::Postgres => "postgres://",
            DatabaseFamily::MySql => "mysql://",
            DatabaseFamily::MongoDb => "mongodb://",
            DatabaseFamily::Oracle => "oracle://",
            DatabaseFamily::MariaDb => "mariadb://",
            DatabaseFamily::ScyllaDb => "scylladb://",
        }
    }

    /// Fields that must be non-empty when the profile is entered in
    /// fields mode. MongoDB accepts unauthenticated servers, so its
    /// credentials stay optional.
    pub fn required_fields(&self) -> &'static [FieldName] {
        match self {
            DatabaseFamily::MongoDb => &[FieldName::Host, FieldName::Port, FieldName::Database],
            _ => &[
                FieldName::Host,
                FieldName::Port,
                FieldName::Database,
                FieldName::Username,
                FieldName::Password,
            ],
        }
    }

    /// Whether a driver for this family is compiled in
    pub fn driver_available(&self) -> bool {
        match self {
            DatabaseFamily::MongoDb => cfg!(feature = "mongodb"),
            DatabaseFamily::Postgres => cfg!(feature = "postgres"),
            _ => false,
        }
    }

    pub fn all() -> &'static [DatabaseFamily] {
        &[
            DatabaseFamily::Postgres,
            DatabaseFamily::MySql,
            DatabaseFamily::MongoDb,
            DatabaseFamily::Oracle,
            DatabaseFamily::MariaDb,
            DatabaseFamily::ScyllaDb,
        ]
    }

    /// Look up a family by its persisted token
    pub fn parse(token: &str) -> Option<DatabaseFamily> {
        DatabaseFamily::all()
            .iter()
            .copied()
            .find(|family| family.id() == token)
    }
}

impl fmt::Display for DatabaseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for family in DatabaseFamily::all() {
            assert_eq!(DatabaseFamily::parse(family.id()), Some(*family));
        }
        assert_eq!(DatabaseFamily::parse("cockroach"), None);
    }

    #[test]
    fn serde_token_matches_id() {
        for family in DatabaseFamily::all() {
            let json = serde_json::to_string(family).unwrap();
            assert_eq!(json, format!("\"{}\"", family.id()));
        }
    }

    #[test]
    fn mongo_credentials_are_optional() {
        let required = DatabaseFamily::MongoDb.required_fields();
        assert!(!required.contains(&FieldName::Username));
        assert!(!required.contains(&FieldName::Password));
        assert!(required.contains(&FieldName::Database));
    }

    #[test]
    fn relational_families_require_credentials() {
        for family in [
            DatabaseFamily::Postgres,
            DatabaseFamily::MySql,
            DatabaseFamily::Oracle,
            DatabaseFamily::MariaDb,
            DatabaseFamily::ScyllaDb,
        ] {
            assert_eq!(family.required_fields().len(), 5, "{family}");
        }
    }

    #[test]
    fn uri_schemes_match_tokens() {
        for family in DatabaseFamily::all() {
            assert!(family.uri_scheme().starts_with(family.id()), "{family}");
            assert!(family.uri_scheme().ends_with("://"), "{family}");
        }
    }

    #[test]
    fn default_ports() {
        assert_eq!(DatabaseFamily::Postgres.default_port(), Some("5432"));
        assert_eq!(DatabaseFamily::MariaDb.default_port(), Some("3306"));
        assert_eq!(DatabaseFamily::ScyllaDb.default_port(), Some("9042"));
    }
}
