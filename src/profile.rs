use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::family::{DatabaseFamily, FieldName};

/// Whether connection details are entered as discrete fields or as one
/// URI string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Fields,
    Uri,
}

/// Discrete connection fields. Port stays a string: the default-port
/// table is string-valued and numeric parsing belongs to the drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFields {
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Mode-exclusive connection data. Exactly one variant is ever
/// populated, so stale fields cannot leak into a URI profile or the
/// other way around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ConnectionDetails {
    Fields(ConnectionFields),
    Uri {
        connection_string: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database_override: Option<String>,
    },
}

impl ConnectionDetails {
    pub fn mode(&self) -> InputMode {
        match self {
            ConnectionDetails::Fields(_) => InputMode::Fields,
            ConnectionDetails::Uri { .. } => InputMode::Uri,
        }
    }

    /// Database to select at connect time. URI profiles prefer the
    /// explicit override, then the path segment of the URI, then the
    /// server default.
    pub fn database_name(&self) -> String {
        match self {
            ConnectionDetails::Fields(fields) if !fields.database.is_empty() => {
                fields.database.clone()
            }
            ConnectionDetails::Uri {
                connection_string,
                database_override,
            } => database_override
                .clone()
                .filter(|db| !db.is_empty())
                .or_else(|| uri_database(connection_string))
                .unwrap_or_else(|| "admin".to_string()),
            _ => "admin".to_string(),
        }
    }
}

/// Extract the database name embedded in a connection URI, if any
fn uri_database(uri: &str) -> Option<String> {
    url::Url::parse(uri).ok().and_then(|u| {
        let path = u.path();
        if path.len() > 1 {
            Some(path[1..].to_string())
        } else {
            None
        }
    })
}

/// A saved, named connection configuration for one family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: String,
    pub name: String,
    #[serde(rename = "db_type")]
    pub family: DatabaseFamily,
    pub details: ConnectionDetails,
}

impl ConnectionProfile {
    /// Create a profile from a submitted form. The id is assigned here
    /// and never changes; saving the same id again is a wholesale
    /// replace, not a partial update.
    pub fn from_form(form: &FormSubmission) -> Result<Self, ValidationError> {
        if form.name.trim().is_empty() {
            return Err(ValidationError::required(FieldName::Name));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: form.name.clone(),
            family: form.family,
            details: form.details(),
        })
    }
}

/// One submission of the connection form, before any validation.
/// Carries every field the form can show; `details` snapshots only the
/// ones belonging to the active mode.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub name: String,
    pub family: DatabaseFamily,
    pub mode: InputMode,
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub connection_string: String,
}

impl FormSubmission {
    pub fn new(family: DatabaseFamily) -> Self {
        Self {
            name: String::new(),
            family,
            mode: InputMode::Fields,
            host: "localhost".to_string(),
            port: family.default_port().unwrap_or_default().to_string(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            connection_string: String::new(),
        }
    }

    /// Snapshot only the active mode's data. Partial input left behind
    /// after a mode toggle is discarded here, before it can reach a
    /// saved profile.
    pub fn details(&self) -> ConnectionDetails {
        match self.mode {
            InputMode::Fields => ConnectionDetails::Fields(ConnectionFields {
                host: self.host.clone(),
                port: self.port.clone(),
                database: self.database.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
            }),
            // In URI mode the database input doubles as an optional
            // override of whatever the URI embeds.
            InputMode::Uri => ConnectionDetails::Uri {
                connection_string: self.connection_string.clone(),
                database_override: if self.database.is_empty() {
                    None
                } else {
                    Some(self.database.clone())
                },
            },
        }
    }
}
