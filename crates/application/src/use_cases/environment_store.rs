//! Environment Store
//!
//! Owns the list of environments and the current-environment pointer.
//! Every mutation updates memory first and is then written through to the
//! key-value store under two fixed keys. There is no locking: concurrent
//! writers race on a last-write-wins basis.

use rand::Rng;
use relay_domain::{Environment, EnvironmentPatch, VariableMap};

use crate::error::EnvironmentStoreResult;
use crate::ports::KeyValueStore;
use crate::variable_resolver::VariableResolver;

/// Key holding the JSON array of environments.
pub const ENVIRONMENTS_KEY: &str = "app.environments.v1";

/// Key holding the current environment id as a JSON string.
pub const CURRENT_ENVIRONMENT_KEY: &str = "app.currentEnvId.v1";

const ID_SUFFIX_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The set of named environments plus the current selection.
#[derive(Debug)]
pub struct EnvironmentStore<S> {
    storage: S,
    environments: Vec<Environment>,
    current_id: Option<String>,
}

impl<S: KeyValueStore> EnvironmentStore<S> {
    /// Loads the store from persistence.
    ///
    /// A missing, empty or malformed environment list is replaced by the
    /// three default environments (not written until the first mutation).
    /// The current id is the persisted one, or the first environment's.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-value store cannot be read.
    pub async fn load(storage: S) -> EnvironmentStoreResult<Self> {
        let environments = match read_environments(&storage).await? {
            Some(list) if !list.is_empty() => list,
            _ => {
                tracing::debug!("no persisted environments, seeding defaults");
                Environment::defaults()
            }
        };

        let current_id = match storage.get(CURRENT_ENVIRONMENT_KEY).await? {
            Some(raw) => parse_current_id(&raw),
            None => None,
        }
        .or_else(|| environments.first().map(|e| e.id.clone()));

        Ok(Self {
            storage,
            environments,
            current_id,
        })
    }

    /// Returns the environments in order (newest created first).
    #[must_use]
    pub fn list(&self) -> &[Environment] {
        &self.environments
    }

    /// Returns the environment with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.id == id)
    }

    /// Returns the current environment, `None` if unset or dangling.
    #[must_use]
    pub fn current(&self) -> Option<&Environment> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    /// Returns the current-id pointer, which may not match any environment.
    #[must_use]
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Takes a resolver over a copy of the current environment's variables.
    ///
    /// With no current environment every placeholder resolves to "".
    #[must_use]
    pub fn snapshot(&self) -> VariableResolver {
        VariableResolver::from_environment(self.current())
    }

    /// Returns the underlying key-value store.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Creates an environment, puts it first in the list and makes it
    /// current. Returns the new id (`<slug>-<6 base-36 chars>`).
    ///
    /// An empty name yields the stem `env` and the name `New Environment`.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    pub async fn create(&mut self, name: &str, variables: VariableMap) -> EnvironmentStoreResult<String> {
        let name = name.trim();
        let id = generate_environment_id(if name.is_empty() { "env" } else { name });
        let name = if name.is_empty() { "New Environment" } else { name };

        self.environments
            .insert(0, Environment::new(id.clone(), name, variables));
        self.persist_environments().await?;

        self.current_id = Some(id.clone());
        self.persist_current().await?;

        tracing::info!(%id, "created environment");
        Ok(id)
    }

    /// Merges `patch` into the environment with the given id.
    ///
    /// Returns `false` (and writes nothing) if no such environment exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    pub async fn update(&mut self, id: &str, patch: EnvironmentPatch) -> EnvironmentStoreResult<bool> {
        let Some(environment) = self.environments.iter_mut().find(|e| e.id == id) else {
            tracing::debug!(%id, "update ignored, environment not found");
            return Ok(false);
        };

        environment.apply(patch);
        self.persist_environments().await?;
        Ok(true)
    }

    /// Removes the environment with the given id.
    ///
    /// If it was current, the first remaining environment becomes current,
    /// or none when the list is now empty. Returns `false` if no such
    /// environment exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    pub async fn delete(&mut self, id: &str) -> EnvironmentStoreResult<bool> {
        let before = self.environments.len();
        self.environments.retain(|e| e.id != id);
        if self.environments.len() == before {
            tracing::debug!(%id, "delete ignored, environment not found");
            return Ok(false);
        }
        self.persist_environments().await?;

        if self.current_id.as_deref() == Some(id) {
            self.current_id = self.environments.first().map(|e| e.id.clone());
            self.persist_current().await?;
        }

        tracing::info!(%id, "deleted environment");
        Ok(true)
    }

    /// Points the current selection at `id`. The id is not validated; a
    /// dangling id makes [`Self::current`] return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    pub async fn set_current(&mut self, id: &str) -> EnvironmentStoreResult<()> {
        self.current_id = Some(id.to_string());
        self.persist_current().await
    }

    /// Re-reads the environment list from persistence.
    ///
    /// The in-memory list is replaced only when a well-formed list is
    /// persisted; the current-id pointer is left as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-value store cannot be read.
    pub async fn refresh(&mut self) -> EnvironmentStoreResult<()> {
        if let Some(list) = read_environments(&self.storage).await? {
            self.environments = list;
        }
        Ok(())
    }

    async fn persist_environments(&self) -> EnvironmentStoreResult<()> {
        let json = serde_json::to_string(&self.environments)?;
        self.storage.set(ENVIRONMENTS_KEY, &json).await?;
        Ok(())
    }

    async fn persist_current(&self) -> EnvironmentStoreResult<()> {
        match &self.current_id {
            Some(id) => {
                let json = serde_json::to_string(id)?;
                self.storage.set(CURRENT_ENVIRONMENT_KEY, &json).await?;
            }
            None => self.storage.remove(CURRENT_ENVIRONMENT_KEY).await?,
        }
        Ok(())
    }
}

/// Reads the persisted list; `None` when absent or malformed.
async fn read_environments<S: KeyValueStore>(
    storage: &S,
) -> EnvironmentStoreResult<Option<Vec<Environment>>> {
    let Some(raw) = storage.get(ENVIRONMENTS_KEY).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<Vec<Environment>>(&raw) {
        Ok(list) => Ok(Some(list)),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed persisted environments");
            Ok(None)
        }
    }
}

/// Accepts a JSON string or, for hand-edited stores, the bare id.
fn parse_current_id(raw: &str) -> Option<String> {
    let id = serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim().to_string());
    if id.is_empty() { None } else { Some(id) }
}

/// Lower-cases `name`, turns each whitespace run into `-` and appends a
/// random base-36 suffix.
fn generate_environment_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len() + ID_SUFFIX_LEN + 1);
    let mut in_whitespace = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                id.push('-');
            }
            in_whitespace = true;
        } else {
            id.push(c);
            in_whitespace = false;
        }
    }

    id.push('-');
    let mut rng = rand::rng();
    for _ in 0..ID_SUFFIX_LEN {
        id.push(char::from(BASE36[rng.random_range(0..BASE36.len())]));
    }
    id
}
