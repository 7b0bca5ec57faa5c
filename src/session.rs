//! Request lifecycle for the icon form.
//!
//! An [`IconSession`] owns the form state and runs at most one generation at a
//! time. The lock guarding the state is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::{
    error::{IconError, GENERIC_FAILURE_MESSAGE},
    gemini::IconGenerator,
    models::{download_filename, Style},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum GenerationStatus {
    Idle,
    InFlight,
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct UiState {
    pub nickname: String,
    pub selected_style: &'static Style,
    pub status: GenerationStatus,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            selected_style: Style::default_style(),
            status: GenerationStatus::Idle,
        }
    }
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        self.status == GenerationStatus::InFlight
    }

    pub fn generated_image(&self) -> Option<&str> {
        match &self.status {
            GenerationStatus::Succeeded(uri) => Some(uri.as_str()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            GenerationStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn download_filename(&self) -> String {
        download_filename(&self.nickname)
    }
}

/// What a call to [`IconSession::generate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank nickname or a generation already in flight; nothing changed.
    Ignored,
    Completed,
}

/// Holds a session in `InFlight` and always moves it out on drop: to the
/// recorded outcome, or to a generic failure if the attempt was abandoned
/// (future dropped or generator panicked).
struct InFlightGuard<'a> {
    state: &'a Mutex<UiState>,
    outcome: Option<GenerationStatus>,
}

impl InFlightGuard<'_> {
    fn finish(mut self, status: GenerationStatus) {
        self.outcome = Some(status);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let status = self.outcome.take().unwrap_or_else(|| {
            log::warn!("Generation abandoned before it settled");
            GenerationStatus::Failed(GENERIC_FAILURE_MESSAGE.to_string())
        });
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.status = status;
    }
}

pub struct IconSession {
    generator: Arc<dyn IconGenerator>,
    state: Mutex<UiState>,
}

impl IconSession {
    pub fn new(generator: Arc<dyn IconGenerator>) -> Self {
        Self {
            generator,
            state: Mutex::new(UiState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, UiState> {
        // Poisoning is ignored: the state is plain data.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> UiState {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn download_filename(&self) -> String {
        self.lock().download_filename()
    }

    /// Input is frozen while a request is in flight.
    pub fn set_nickname(&self, nickname: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.is_loading() {
            return false;
        }
        state.nickname = nickname.into();
        true
    }

    pub fn select_style(&self, name: &str) -> bool {
        let mut state = self.lock();
        if state.is_loading() {
            return false;
        }
        match Style::find(name) {
            Some(style) => {
                state.selected_style = style;
                true
            }
            None => false,
        }
    }

    /// Runs one generation attempt for the given inputs.
    ///
    /// Ignored when the nickname is blank or another attempt is in flight.
    /// Otherwise the status moves to `InFlight` and, once the generator
    /// settles, to `Succeeded` or `Failed`. Dropping the future mid-flight
    /// leaves the session `Failed`, never stuck in `InFlight`.
    pub async fn generate(&self, nickname: &str, style_name: &str) -> Dispatch {
        if nickname.trim().is_empty() {
            return Dispatch::Ignored;
        }

        let guard = {
            let mut state = self.lock();
            if state.is_loading() {
                log::debug!("Generation already in flight, ignoring trigger");
                return Dispatch::Ignored;
            }
            state.nickname = nickname.to_string();
            state.status = GenerationStatus::InFlight;
            InFlightGuard {
                state: &self.state,
                outcome: None,
            }
        };

        let outcome = match Style::find(style_name) {
            Some(style) => {
                self.lock().selected_style = style;
                self.generator
                    .generate_icon(nickname, style.description)
                    .await
            }
            None => {
                log::warn!("Invalid style selected: {}", style_name);
                Err(IconError::ValidationError(
                    "Invalid style selected.".to_string(),
                ))
            }
        };

        let status = match outcome {
            Ok(uri) => GenerationStatus::Succeeded(uri),
            Err(e) => GenerationStatus::Failed(e.user_message()),
        };
        guard.finish(status);

        Dispatch::Completed
    }

    /// Generates with whatever nickname and style the form currently holds.
    pub async fn submit(&self) -> Dispatch {
        let (nickname, style_name) = {
            let state = self.lock();
            (state.nickname.clone(), state.selected_style.name)
        };
        self.generate(&nickname, style_name).await
    }
}
