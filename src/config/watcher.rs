//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file, since editors and
//! deploy tools often replace the file by rename. Events for other files in
//! the directory are ignored, as are reloads that produce an identical config.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Watches one config file and sends every changed, valid config.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Updates stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let gate = ReloadGate::new(load_config(&path).ok(), update_tx);
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !touches_file(&event, &watched) {
                    return;
                }

                match load_config(&watched) {
                    Ok(config) => {
                        gate.offer(config);
                    }
                    Err(e) => {
                        tracing::error!(path = ?watched, error = %e, "Rejected config change, keeping current configuration");
                    }
                }
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Forwards configs that differ from the last one sent.
struct ReloadGate {
    last_sent: Mutex<Option<GatewayConfig>>,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ReloadGate {
    fn new(current: Option<GatewayConfig>, update_tx: mpsc::UnboundedSender<GatewayConfig>) -> Self {
        Self {
            last_sent: Mutex::new(current),
            update_tx,
        }
    }

    /// Send `config` unless it matches the last one. Returns whether it was sent.
    fn offer(&self, config: GatewayConfig) -> bool {
        let mut last = self.last_sent.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Config reload state was poisoned, recovering");
            poisoned.into_inner()
        });

        if last.as_ref() == Some(&config) {
            tracing::debug!("Config file touched without changes");
            return false;
        }

        tracing::info!(upstream = %config.upstream.base_url, "Config change detected");
        if self.update_tx.send(config.clone()).is_err() {
            tracing::warn!("Config update receiver dropped, change not applied");
            return false;
        }
        *last = Some(config);
        true
    }
}

/// Whether `event` writes or replaces the file at `path`.
fn touches_file(event: &Event, path: &Path) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    relevant && event.paths.iter().any(|p| p.file_name() == path.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_file() {
        let path = Path::new("/etc/gateway/gateway.toml");

        assert!(touches_file(&event(EventKind::Modify(ModifyKind::Any), "/etc/gateway/gateway.toml"), path));
        assert!(touches_file(&event(EventKind::Create(CreateKind::File), "/etc/gateway/gateway.toml"), path));
        assert!(touches_file(
            &event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), "/etc/gateway/gateway.toml"),
            path
        ));

        assert!(!touches_file(&event(EventKind::Modify(ModifyKind::Any), "/etc/gateway/other.toml"), path));
        assert!(!touches_file(&event(EventKind::Remove(RemoveKind::File), "/etc/gateway/gateway.toml"), path));
    }

    #[tokio::test]
    async fn test_run_on_existing_file() {
        let dir = std::env::temp_dir().join(format!("gateway-watch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gateway.toml");
        std::fs::write(&path, "[upstream]\nbase_url = \"http://127.0.0.1:9000\"\n").unwrap();

        let (watcher, _rx) = ConfigWatcher::new(&path);
        let handle = watcher.run();
        assert!(handle.is_ok());

        drop(handle);
        let _ = std::fs::remove_dir_all(&dir);
    }

    fn config_with_upstream(base_url: &str) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = base_url.to_string();
        config
    }

    #[test]
    fn test_gate_skips_unchanged_config() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = ReloadGate::new(Some(config_with_upstream("http://a")), tx);

        assert!(!gate.offer(config_with_upstream("http://a")));
        assert!(gate.offer(config_with_upstream("http://b")));
        assert!(!gate.offer(config_with_upstream("http://b")));

        assert_eq!(rx.try_recv().unwrap().upstream.base_url, "http://b");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_gate_recovers_from_poisoned_state() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = ReloadGate::new(None, tx);

        std::thread::scope(|scope| {
            let poisoner = scope.spawn(|| {
                let _guard = gate.last_sent.lock().unwrap();
                panic!("poison the reload state");
            });
            assert!(poisoner.join().is_err());
        });
        assert!(gate.last_sent.is_poisoned());

        assert!(gate.offer(config_with_upstream("http://c")));
        assert_eq!(rx.try_recv().unwrap().upstream.base_url, "http://c");
        assert!(!gate.offer(config_with_upstream("http://c")));
    }
}
