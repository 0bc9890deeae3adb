//! Orchestrates user actions against a profile, sequencing backend
//! calls and mapping their outcomes to surface-visible states.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backend::DatabaseBackend;
use crate::builder;
use crate::error::{BackendError, StoreError, ValidationError};
use crate::family::DatabaseFamily;
use crate::profile::{ConnectionProfile, FormSubmission};
use crate::store::ProfileStore;

/// How long a transient success banner stays up before clearing
const SUCCESS_BANNER: Duration = Duration::from_secs(3);
/// Delay between a successful save-and-connect and closing the form
const CLOSE_DELAY: Duration = Duration::from_secs(1);

/// Where a failure came from
#[derive(Debug, Clone, PartialEq)]
pub enum ActionFailure {
    /// Field-scoped input errors. The backend was never called.
    Invalid(Vec<ValidationError>),
    /// The backend's error text, verbatim
    Backend(String),
    /// No driver path exists for this family
    Unsupported(DatabaseFamily),
}

impl ActionFailure {
    /// Banner text for the surface
    pub fn message(&self) -> String {
        match self {
            ActionFailure::Invalid(errors) => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            ActionFailure::Backend(message) => message.clone(),
            ActionFailure::Unsupported(family) => {
                format!("{family} connections are not implemented yet")
            }
        }
    }
}

/// Visible state of the profile currently being worked on
#[derive(Debug, Clone, PartialEq)]
pub enum ActionState {
    Editing,
    Validating,
    TestPending,
    ConnectPending,
    Succeeded { message: String },
    Failed { failure: ActionFailure },
    Closed,
}

/// Explicit yes/no gate in front of destructive actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// Drives the test / connect / save / delete actions for one
/// profile-in-progress.
///
/// Backend calls suspend only the action that issued them. Nothing is
/// cancelled: a superseding action may race an in-flight one, and the
/// last response to arrive wins the visible state.
pub struct LifecycleController {
    store: Arc<dyn ProfileStore>,
    backend: Arc<dyn DatabaseBackend>,
    state: Arc<Mutex<ActionState>>,
    /// Cached copy of the store's listing, always replaced wholesale
    profiles: Arc<Mutex<Vec<ConnectionProfile>>>,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn ProfileStore>, backend: Arc<dyn DatabaseBackend>) -> Self {
        Self {
            store,
            backend,
            state: Arc::new(Mutex::new(ActionState::Editing)),
            profiles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn state(&self) -> ActionState {
        self.state.lock().unwrap().clone()
    }

    /// The cached profile listing, as of the last refresh
    pub fn profiles(&self) -> Vec<ConnectionProfile> {
        self.profiles.lock().unwrap().clone()
    }

    /// Dismiss whatever banner is showing and return to editing
    pub fn dismiss(&self) {
        self.set_state(ActionState::Editing);
    }

    /// Re-fetch the profile list in full, replacing the cache
    pub async fn refresh(&self) -> Result<Vec<ConnectionProfile>, StoreError> {
        let profiles = self.store.list().await?;
        *self.profiles.lock().unwrap() = profiles.clone();
        Ok(profiles)
    }

    /// Validate the form and probe the server without saving anything
    pub async fn test(&self, form: &FormSubmission) -> ActionState {
        self.set_state(ActionState::Validating);
        let spec = match builder::build(form.family, &form.details()) {
            Ok(spec) => spec,
            Err(errors) => return self.fail(ActionFailure::Invalid(errors)),
        };

        self.set_state(ActionState::TestPending);
        match self.backend.test_connection(&spec).await {
            Ok(message) => self.succeed(message, SUCCESS_BANNER, ActionState::Editing),
            Err(err) => self.fail(backend_failure(err)),
        }
    }

    /// Persist the profile, then connect with it. The save always
    /// happens first: a connection is never opened for a profile the
    /// store does not hold.
    pub async fn save_and_connect(&self, form: &FormSubmission) -> ActionState {
        self.set_state(ActionState::Validating);
        let details = form.details();
        match (
            ConnectionProfile::from_form(form),
            builder::build(form.family, &details),
        ) {
            (Ok(profile), Ok(spec)) => {
                if let Err(err) = self.store.save(&profile).await {
                    return self.fail(ActionFailure::Backend(err.to_string()));
                }
                self.refresh_silently().await;

                self.set_state(ActionState::ConnectPending);
                match self.backend.connect(&spec, &details.database_name()).await {
                    Ok(_) => self.succeed(
                        "Connection saved and connected successfully!".to_string(),
                        CLOSE_DELAY,
                        ActionState::Closed,
                    ),
                    // The just-saved profile stays put; re-editing
                    // starts from saved state.
                    Err(err) => self.fail(backend_failure(err)),
                }
            }
            (name_check, build_check) => {
                let mut errors = Vec::new();
                if let Err(err) = name_check {
                    errors.push(err);
                }
                if let Err(mut field_errors) = build_check {
                    errors.append(&mut field_errors);
                }
                self.fail(ActionFailure::Invalid(errors))
            }
        }
    }

    /// Delete a saved profile, gated on explicit confirmation. The
    /// listing is reconciled against the store rather than edited
    /// locally.
    pub async fn delete(&self, id: &str, confirmation: Confirmation) -> ActionState {
        if confirmation == Confirmation::Cancelled {
            return self.state();
        }
        if let Err(err) = self.store.delete(id).await {
            return self.fail(ActionFailure::Backend(err.to_string()));
        }
        self.refresh_silently().await;
        self.state()
    }

    /// Connect using a profile from the saved list
    pub async fn connect_saved(&self, profile: &ConnectionProfile) -> ActionState {
        let spec = match builder::build(profile.family, &profile.details) {
            Ok(spec) => spec,
            Err(errors) => return self.fail(ActionFailure::Invalid(errors)),
        };

        self.set_state(ActionState::ConnectPending);
        match self
            .backend
            .connect(&spec, &profile.details.database_name())
            .await
        {
            Ok(message) => self.succeed(message, SUCCESS_BANNER, ActionState::Editing),
            Err(err) => self.fail(backend_failure(err)),
        }
    }

    /// Test a profile from the saved list without connecting
    pub async fn test_saved(&self, profile: &ConnectionProfile) -> ActionState {
        let spec = match builder::build(profile.family, &profile.details) {
            Ok(spec) => spec,
            Err(errors) => return self.fail(ActionFailure::Invalid(errors)),
        };

        self.set_state(ActionState::TestPending);
        match self.backend.test_connection(&spec).await {
            Ok(message) => self.succeed(message, SUCCESS_BANNER, ActionState::Editing),
            Err(err) => self.fail(backend_failure(err)),
        }
    }

    fn set_state(&self, state: ActionState) {
        tracing::debug!(?state, "lifecycle transition");
        *self.state.lock().unwrap() = state;
    }

    fn fail(&self, failure: ActionFailure) -> ActionState {
        let state = ActionState::Failed { failure };
        self.set_state(state.clone());
        state
    }

    /// Show a success banner, then move on to `then` once it has been
    /// up for `after`. The timer is not cancelled by further user
    /// action; it simply no-ops if a later state superseded this one,
    /// so a failure that landed in the meantime stays visible.
    fn succeed(&self, message: String, after: Duration, then: ActionState) -> ActionState {
        let state = ActionState::Succeeded { message };
        self.set_state(state.clone());

        let shared = Arc::clone(&self.state);
        let expected = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let mut current = shared.lock().unwrap();
            if *current == expected {
                tracing::debug!(?then, "lifecycle transition");
                *current = then;
            }
        });

        state
    }

    async fn refresh_silently(&self) {
        match self.store.list().await {
            Ok(profiles) => *self.profiles.lock().unwrap() = profiles,
            Err(err) => tracing::warn!(error = %err, "failed to refresh profile list"),
        }
    }
}

fn backend_failure(err: BackendError) -> ActionFailure {
    match err {
        BackendError::Unsupported(family) => ActionFailure::Unsupported(family),
        other => ActionFailure::Backend(other.to_string()),
    }
}
