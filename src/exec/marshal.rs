// src/exec/marshal.rs

//! Invocable tasks: the host's registry of named callables and the
//! marshaller that turns an [`Invocable`] into a command-line token.
//!
//! A callable never runs inside the scheduler process. The runner spawns
//! `<host-binary> invoke <token>` instead, and the host binary decodes the
//! token and looks the callable up in its own [`CallableRegistry`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::errors::{CadenceError, Result};
use crate::task::Invocable;

type CallableFn = Arc<dyn Fn(&[String]) -> anyhow::Result<i32> + Send + Sync>;

/// Named in-process functions a host exposes to `invoke`.
///
/// Each callable receives the invocable's arguments and returns the exit
/// code the `invoke` subprocess should terminate with.
#[derive(Clone, Default)]
pub struct CallableRegistry {
    callables: BTreeMap<String, CallableFn>,
}

impl CallableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[String]) -> anyhow::Result<i32> + Send + Sync + 'static,
    ) -> &mut Self {
        self.callables.insert(name.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.callables.keys().map(String::as_str)
    }

    /// Run the callable named by `invocable` in the current process.
    pub fn invoke(&self, invocable: &Invocable) -> Result<i32> {
        let f = self.callables.get(&invocable.name).ok_or_else(|| CadenceError::Marshal {
            name: invocable.name.clone(),
            reason: "no callable registered under this name".to_string(),
        })?;
        Ok(f(&invocable.args)?)
    }
}

impl fmt::Debug for CallableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableRegistry")
            .field("callables", &self.callables.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Encodes invocables into a single shell-safe token and back.
pub trait InvocableMarshaller: Send + Sync + fmt::Debug {
    fn marshal(&self, invocable: &Invocable) -> Result<String>;

    fn unmarshal(&self, token: &str) -> Result<Invocable>;
}

/// JSON payload, base64url-encoded (no padding), so the token needs no
/// quoting on any shell.
///
/// When built with a registry, marshalling rejects names the host never
/// registered; the failure is reported against the task before anything is
/// spawned.
#[derive(Debug, Clone, Default)]
pub struct JsonMarshaller {
    registry: Option<Arc<CallableRegistry>>,
}

impl JsonMarshaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Arc<CallableRegistry>) -> Self {
        Self {
            registry: Some(registry),
        }
    }
}

impl InvocableMarshaller for JsonMarshaller {
    fn marshal(&self, invocable: &Invocable) -> Result<String> {
        if invocable.name.trim().is_empty() {
            return Err(CadenceError::Marshal {
                name: invocable.name.clone(),
                reason: "callable name is empty".to_string(),
            });
        }
        let unknown = self
            .registry
            .as_ref()
            .is_some_and(|registry| !registry.contains(&invocable.name));
        if unknown {
            return Err(CadenceError::Marshal {
                name: invocable.name.clone(),
                reason: "no callable registered under this name".to_string(),
            });
        }

        let json = serde_json::to_vec(invocable).map_err(|e| CadenceError::Marshal {
            name: invocable.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn unmarshal(&self, token: &str) -> Result<Invocable> {
        let bad_token = |reason: String| CadenceError::Marshal {
            name: token.to_string(),
            reason,
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| bad_token(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| bad_token(e.to_string()))
    }
}
