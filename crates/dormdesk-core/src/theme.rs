// ── Theme preference ──
//
// Tri-state preference persisted under the `theme` storage key. The
// effective dark/light state is pushed to a `ThemeSink` (whatever applies
// the dark class in the front-end) and published on a `watch` channel.
// While mounted, a `System` preference follows the OS appearance source.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use dormdesk_api::{Storage, THEME_KEY};

use crate::error::CoreError;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    /// Read the stored preference; anything missing or unrecognized is `System`.
    pub fn load(storage: &dyn Storage) -> Self {
        storage
            .get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_dark(self, system_dark: bool) -> bool {
        match self {
            Self::Dark => true,
            Self::Light => false,
            Self::System => system_dark,
        }
    }
}

/// Receives the effective theme every time it is recomputed.
pub trait ThemeSink: Send + Sync {
    fn apply(&self, dark: bool);
}

impl<F: Fn(bool) + Send + Sync> ThemeSink for F {
    fn apply(&self, dark: bool) {
        self(dark);
    }
}

/// OS color-scheme preference, as a `watch` source.
#[derive(Debug)]
pub struct Appearance {
    tx: watch::Sender<bool>,
}

impl Appearance {
    pub fn new(prefers_dark: bool) -> Self {
        let (tx, _) = watch::channel(prefers_dark);
        Self { tx }
    }

    pub fn prefers_dark(&self) -> bool {
        *self.tx.borrow()
    }

    /// Report an OS-level change.
    pub fn set_prefers_dark(&self, dark: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != dark;
            *current = dark;
            changed
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

// ── ThemeController ──────────────────────────────────────────────

/// Owns the theme preference. Cheaply cloneable.
#[derive(Clone)]
pub struct ThemeController {
    inner: Arc<ThemeInner>,
}

struct ThemeInner {
    storage: Arc<dyn Storage>,
    sink: Arc<dyn ThemeSink>,
    system: watch::Receiver<bool>,
    preference: watch::Sender<ThemePreference>,
    is_dark: watch::Sender<bool>,
}

impl ThemeController {
    /// Load the stored preference and apply it immediately.
    pub fn new(
        storage: Arc<dyn Storage>,
        appearance: &Appearance,
        sink: Arc<dyn ThemeSink>,
    ) -> Self {
        let preference = ThemePreference::load(storage.as_ref());
        let (preference, _) = watch::channel(preference);
        let (is_dark, _) = watch::channel(false);

        let controller = Self {
            inner: Arc::new(ThemeInner {
                storage,
                sink,
                system: appearance.subscribe(),
                preference,
                is_dark,
            }),
        };
        controller.update_applied();
        controller
    }

    pub fn theme(&self) -> ThemePreference {
        *self.inner.preference.borrow()
    }

    pub fn is_dark(&self) -> bool {
        *self.inner.is_dark.borrow()
    }

    pub fn watch_is_dark(&self) -> watch::Receiver<bool> {
        self.inner.is_dark.subscribe()
    }

    pub fn watch_theme(&self) -> watch::Receiver<ThemePreference> {
        self.inner.preference.subscribe()
    }

    /// Switch preference, apply it, and persist it. The new theme is in
    /// effect even if persisting fails.
    pub fn set_theme(&self, preference: ThemePreference) -> Result<(), CoreError> {
        self.inner.preference.send_replace(preference);
        self.update_applied();
        self.inner.storage.set(THEME_KEY, preference.as_ref())?;
        debug!(%preference, "theme preference saved");
        Ok(())
    }

    /// Flip between explicit dark and light based on what is shown now.
    pub fn toggle_theme(&self) -> Result<ThemePreference, CoreError> {
        let next = if self.is_dark() {
            ThemePreference::Light
        } else {
            ThemePreference::Dark
        };
        self.set_theme(next)?;
        Ok(next)
    }

    /// Recompute the effective theme and push it to the sink.
    pub fn update_applied(&self) {
        let dark = self.theme().is_dark(*self.inner.system.borrow());
        self.inner.is_dark.send_replace(dark);
        self.inner.sink.apply(dark);
    }

    /// Start following OS appearance changes while the preference is
    /// `System`. Must be called within a tokio runtime. Dropping the
    /// returned subscription stops the listener.
    pub fn mount(&self) -> ThemeSubscription {
        self.update_applied();

        let controller = self.clone();
        let mut system = self.inner.system.clone();
        let task = tokio::spawn(async move {
            while system.changed().await.is_ok() {
                if controller.theme() == ThemePreference::System {
                    controller.update_applied();
                }
            }
            warn!("appearance source closed, theme listener stopping");
        });

        ThemeSubscription { task }
    }
}

impl std::fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeController")
            .field("theme", &self.theme())
            .field("is_dark", &self.is_dark())
            .finish_non_exhaustive()
    }
}

/// Live OS-appearance listener; unsubscribes on drop.
#[derive(Debug)]
pub struct ThemeSubscription {
    task: JoinHandle<()>,
}

impl Drop for ThemeSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
