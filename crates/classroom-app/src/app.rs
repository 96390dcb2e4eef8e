//! JavaScript facade over the session directory.
//!
//! Every async operation returns a `Promise`. Values cross the boundary as
//! JSON-shaped objects; failures reject with an `Error` whose `name` is the
//! failure kind (`NetworkError`, `NotFoundError`, ...).

use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use classroom_core::event_bus::EventBus;
use classroom_core::ports::{Clock, LinkOpener};
use classroom_core::SessionDirectory;
use classroom_platform::clock::SystemClock;
use classroom_platform::opener::BrowserLinkOpener;
use classroom_platform::remote::open_remote;
use classroom_platform::storage::{auto_detect_storage, open_storage};
use classroom_types::config::DirectoryConfig;
use classroom_types::validation::SessionDraft;
use classroom_types::DirectoryError;

use crate::config_store::{load_config, save_config};

struct AppInner {
    directory: SessionDirectory,
    opener: Box<dyn LinkOpener>,
    config: DirectoryConfig,
}

#[wasm_bindgen]
pub struct ClassroomApp {
    inner: Rc<AppInner>,
}

#[wasm_bindgen]
impl ClassroomApp {
    /// Resolve config (stored document overlaid with `overrides`), then open
    /// the adapters and the cache mirror.
    pub async fn boot(overrides: JsValue) -> Result<ClassroomApp, JsValue> {
        Self::assemble(overrides).await.map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = scheduleSession)]
    pub fn schedule_session(&self, draft: JsValue) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let draft: SessionDraft = from_js(&draft)?;
            let record = inner
                .directory
                .schedule_session(&draft)
                .await
                .map_err(to_js_error)?;
            to_js(&record)
        })
    }

    #[wasm_bindgen(js_name = listUpcoming)]
    pub fn list_upcoming(&self) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move { to_js(&inner.directory.list_upcoming().await) })
    }

    #[wasm_bindgen(js_name = listLive)]
    pub fn list_live(&self) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move { to_js(&inner.directory.list_live().await) })
    }

    #[wasm_bindgen(js_name = deleteSession)]
    pub fn delete_session(&self, id: String) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            inner
                .directory
                .delete_session(&id)
                .await
                .map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Open the meeting, then record the join. A blocked popup rejects
    /// without recording anything.
    #[wasm_bindgen(js_name = joinSession)]
    pub fn join_session(&self, id: String) -> Promise {
        // window.open must run in the same turn as the user's click
        let opened = self
            .inner
            .directory
            .open_session(&id, self.inner.opener.as_ref());

        let inner = self.inner.clone();
        future_to_promise(async move {
            let joined = opened.map_err(to_js_error)?;
            inner.directory.record_join(&joined.session_id).await;
            to_js(&joined)
        })
    }

    /// Resolves to `true` when both scopes came from the remote store.
    pub fn refresh(&self) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move { Ok(JsValue::from_bool(inner.directory.refresh().await)) })
    }

    /// Resolves to the number of deletes still unconfirmed.
    #[wasm_bindgen(js_name = retryPendingDeletes)]
    pub fn retry_pending_deletes(&self) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let remaining = inner.directory.retry_pending_deletes().await;
            Ok(JsValue::from_f64(remaining as f64))
        })
    }

    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.directory.event_bus().drain())
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.config)
    }
}

impl ClassroomApp {
    async fn assemble(overrides: JsValue) -> classroom_types::Result<Self> {
        let overrides: Value = if overrides.is_undefined() || overrides.is_null() {
            Value::Object(Default::default())
        } else {
            overrides
                .into_serde()
                .map_err(|e| DirectoryError::Config(e.to_string()))?
        };

        let bootstrap = auto_detect_storage();
        let config = load_config(bootstrap.as_ref(), &overrides).await?;
        if overrides.as_object().is_some_and(|o| !o.is_empty()) {
            save_config(bootstrap.as_ref(), &config).await;
        }

        let storage = open_storage(&config.storage)?;
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let remote = open_remote(&config, clock.clone());
        let directory =
            SessionDirectory::open(&config, remote, storage, clock, EventBus::new()).await;

        log::info!(
            "Classroom app ready (remote: {}, storage: {:?})",
            config.remote.label(),
            config.storage.backend
        );

        Ok(Self {
            inner: Rc::new(AppInner {
                directory,
                opener: Box::new(BrowserLinkOpener::new()),
                config,
            }),
        })
    }
}

// ─── Boundary conversions ────────────────────────────────────

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Err(to_js_error(DirectoryError::JsInterop(
            "expected an object".to_string(),
        )));
    }
    value
        .into_serde()
        .map_err(|e| to_js_error(DirectoryError::Serialization(e.to_string())))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value)
        .map_err(|e| to_js_error(DirectoryError::Serialization(e.to_string())))
}

fn to_js_error(e: DirectoryError) -> JsValue {
    let error = js_sys::Error::new(&e.to_string());
    error.set_name(error_name(&e));
    error.into()
}

/// `Error.name` reported to JavaScript for each failure kind.
pub(crate) fn error_name(e: &DirectoryError) -> &'static str {
    match e {
        DirectoryError::Validation(_) => "ValidationError",
        DirectoryError::Network(_) => "NetworkError",
        DirectoryError::Timeout(_) => "TimeoutError",
        DirectoryError::RemoteRejected(_) => "RemoteRejectedError",
        DirectoryError::NotFound(_) => "NotFoundError",
        DirectoryError::MissingLink(_) => "MissingLinkError",
        DirectoryError::Storage(_) => "StorageError",
        DirectoryError::Serialization(_) => "SerializationError",
        DirectoryError::Config(_) => "ConfigError",
        DirectoryError::JsInterop(_) => "JsInteropError",
    }
}
