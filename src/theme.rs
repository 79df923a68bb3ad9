//! Theme resolution — a stored tri-state preference derived into a concrete
//! light/dark theme.
//!
//! The preference {light, dark, system} is persisted; the effective theme
//! {light, dark} is derived and never persisted. While the preference is
//! `system`, the resolver tracks the OS color-scheme signal; while it is
//! `light` or `dark`, OS flips cause no recomputation.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::debug;

use crate::storage::{SettingsStore, keys};

/// Stored theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl std::str::FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("Unknown theme preference: {other}")),
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        };
        write!(f, "{s}")
    }
}

/// The OS-level color-scheme signal ("prefers dark" or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

/// The concrete theme actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveTheme {
    Light,
    Dark,
}

/// Derive the effective theme from a preference and the current OS signal.
pub fn derive(preference: ThemePreference, os: ColorScheme) -> EffectiveTheme {
    match preference {
        ThemePreference::Light => EffectiveTheme::Light,
        ThemePreference::Dark => EffectiveTheme::Dark,
        ThemePreference::System => match os {
            ColorScheme::Light => EffectiveTheme::Light,
            ColorScheme::Dark => EffectiveTheme::Dark,
        },
    }
}

/// Resolves the persisted preference plus the OS signal into an effective
/// theme, published on a watch channel. Lives for the process lifetime.
pub struct ThemeResolver {
    storage: Arc<SettingsStore>,
    preference: RwLock<ThemePreference>,
    os_signal: watch::Receiver<ColorScheme>,
    effective: watch::Sender<EffectiveTheme>,
}

impl ThemeResolver {
    /// Load the persisted preference (absent or unparseable values default to
    /// `system`) and compute the initial effective theme.
    pub async fn load(
        storage: Arc<SettingsStore>,
        os_signal: watch::Receiver<ColorScheme>,
    ) -> Arc<Self> {
        let preference = storage
            .get(keys::THEME)
            .await
            .and_then(|raw| raw.parse::<ThemePreference>().ok())
            .unwrap_or_default();
        let initial = derive(preference, *os_signal.borrow());
        let (effective, _) = watch::channel(initial);
        Arc::new(Self {
            storage,
            preference: RwLock::new(preference),
            os_signal,
            effective,
        })
    }

    /// Current preference.
    pub async fn preference(&self) -> ThemePreference {
        *self.preference.read().await
    }

    /// Current effective theme.
    pub fn effective(&self) -> EffectiveTheme {
        *self.effective.borrow()
    }

    /// Subscribe to effective-theme changes.
    pub fn subscribe(&self) -> watch::Receiver<EffectiveTheme> {
        self.effective.subscribe()
    }

    /// Persist a new preference and recompute the effective theme.
    pub async fn set_preference(&self, preference: ThemePreference) {
        if let Err(e) = self.storage.set(keys::THEME, preference.to_string()).await {
            tracing::warn!(error = %e, "Failed to persist theme preference");
        }
        *self.preference.write().await = preference;
        self.recompute().await;
    }

    /// Recompute from the current preference and OS signal, publishing only
    /// on an actual change.
    async fn recompute(&self) {
        let preference = *self.preference.read().await;
        let next = derive(preference, *self.os_signal.borrow());
        self.effective.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                debug!(theme = ?next, "Effective theme changed");
                *current = next;
                true
            }
        });
    }
}

/// Spawn a follower task that tracks OS color-scheme flips for the lifetime
/// of the process. Flips only matter while the preference is `system`.
pub fn spawn_os_signal_task(resolver: Arc<ThemeResolver>) -> tokio::task::JoinHandle<()> {
    let mut signal = resolver.os_signal.clone();
    tokio::spawn(async move {
        while signal.changed().await.is_ok() {
            if *resolver.preference.read().await == ThemePreference::System {
                resolver.recompute().await;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn fresh_resolver(
        initial_os: ColorScheme,
    ) -> (
        tempfile::TempDir,
        Arc<SettingsStore>,
        watch::Sender<ColorScheme>,
        Arc<ThemeResolver>,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SettingsStore::open(dir.path()).await.unwrap());
        let (os_tx, os_rx) = watch::channel(initial_os);
        let resolver = ThemeResolver::load(Arc::clone(&storage), os_rx).await;
        (dir, storage, os_tx, resolver)
    }

    #[test]
    fn derivation_table() {
        use ColorScheme as Os;
        use EffectiveTheme as Eff;
        use ThemePreference as Pref;

        assert_eq!(derive(Pref::Light, Os::Dark), Eff::Light);
        assert_eq!(derive(Pref::Light, Os::Light), Eff::Light);
        assert_eq!(derive(Pref::Dark, Os::Light), Eff::Dark);
        assert_eq!(derive(Pref::Dark, Os::Dark), Eff::Dark);
        assert_eq!(derive(Pref::System, Os::Light), Eff::Light);
        assert_eq!(derive(Pref::System, Os::Dark), Eff::Dark);
    }

    #[tokio::test]
    async fn defaults_to_system_when_unset() {
        let (_dir, _storage, _os_tx, resolver) = fresh_resolver(ColorScheme::Dark).await;
        assert_eq!(resolver.preference().await, ThemePreference::System);
        assert_eq!(resolver.effective(), EffectiveTheme::Dark);
    }

    #[tokio::test]
    async fn garbage_persisted_value_defaults_to_system() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SettingsStore::open(dir.path()).await.unwrap());
        storage.set(keys::THEME, "neon").await.unwrap();

        let (_os_tx, os_rx) = watch::channel(ColorScheme::Light);
        let resolver = ThemeResolver::load(storage, os_rx).await;
        assert_eq!(resolver.preference().await, ThemePreference::System);
    }

    #[tokio::test]
    async fn explicit_preference_ignores_os_signal() {
        let (_dir, _storage, os_tx, resolver) = fresh_resolver(ColorScheme::Light).await;
        let _follower = spawn_os_signal_task(Arc::clone(&resolver));

        resolver.set_preference(ThemePreference::Dark).await;
        assert_eq!(resolver.effective(), EffectiveTheme::Dark);

        // OS flip while preference is explicit changes nothing.
        resolver.set_preference(ThemePreference::Light).await;
        os_tx.send(ColorScheme::Dark).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(resolver.effective(), EffectiveTheme::Light);
    }

    #[tokio::test]
    async fn system_preference_tracks_os_signal() {
        let (_dir, _storage, os_tx, resolver) = fresh_resolver(ColorScheme::Light).await;
        let _follower = spawn_os_signal_task(Arc::clone(&resolver));

        resolver.set_preference(ThemePreference::System).await;
        assert_eq!(resolver.effective(), EffectiveTheme::Light);

        let mut effective = resolver.subscribe();
        os_tx.send(ColorScheme::Dark).unwrap();
        tokio::time::timeout(Duration::from_secs(1), effective.changed())
            .await
            .expect("effective theme should follow the OS signal")
            .unwrap();
        assert_eq!(resolver.effective(), EffectiveTheme::Dark);
    }

    #[tokio::test]
    async fn preference_is_persisted() {
        let (_dir, storage, _os_tx, resolver) = fresh_resolver(ColorScheme::Light).await;
        resolver.set_preference(ThemePreference::Dark).await;
        assert_eq!(storage.get(keys::THEME).await.as_deref(), Some("dark"));

        // A fresh resolver picks the persisted preference back up.
        let (_os_tx2, os_rx2) = watch::channel(ColorScheme::Light);
        let reloaded = ThemeResolver::load(storage, os_rx2).await;
        assert_eq!(reloaded.preference().await, ThemePreference::Dark);
        assert_eq!(reloaded.effective(), EffectiveTheme::Dark);
    }

    #[test]
    fn display_and_parse_roundtrip() {
        for pref in [
            ThemePreference::Light,
            ThemePreference::Dark,
            ThemePreference::System,
        ] {
            let parsed: ThemePreference = pref.to_string().parse().unwrap();
            assert_eq!(parsed, pref);
        }
        assert!("blue".parse::<ThemePreference>().is_err());
    }
}
