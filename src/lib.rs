//! Connection profile management for heterogeneous databases.
//!
//! A headless core for a database management surface: saved connection
//! profiles, per-family connection string rules, and the lifecycle
//! state machine behind testing, connecting to, saving and deleting
//! connections. Rendering, routing and query execution live elsewhere.

pub mod backend;
pub mod builder;
mod drivers;
pub mod error;
pub mod family;
pub mod lifecycle;
pub mod profile;
pub mod store;

pub use backend::{DatabaseBackend, DriverBackend};
pub use builder::{build, ConnectionSpec};
pub use error::{BackendError, StoreError, ValidationError, ValidationReason};
pub use family::{DatabaseFamily, FieldName};
pub use lifecycle::{ActionFailure, ActionState, Confirmation, LifecycleController};
pub use profile::{
    ConnectionDetails, ConnectionFields, ConnectionProfile, FormSubmission, InputMode,
};
pub use store::{ProfileStore, SqliteProfileStore};
