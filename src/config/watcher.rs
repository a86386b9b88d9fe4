//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_config;
use crate::config::schema::{GuardConfig, PropagationMode};
use crate::routing::RouteTable;

/// Result of handling one file-system notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Event kind does not touch file contents.
    Ignored,
    /// A validated config was handed to the reloader.
    Sent,
    /// The file no longer loads or validates; the current routes stay.
    Rejected,
    /// Nobody is listening for updates anymore.
    Closed,
}

/// Watches the config file and forwards every valid revision of it.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<GuardConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GuardConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            updates,
        };
        (watcher, rx)
    }

    /// Reload the file in response to one notification.
    pub fn handle(&self, event: notify::Result<Event>) -> ReloadOutcome {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Config watch error");
                return ReloadOutcome::Ignored;
            }
        };
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return ReloadOutcome::Ignored;
        }

        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Config reload rejected; keeping current route table");
                return ReloadOutcome::Rejected;
            }
        };

        tracing::info!(path = ?self.path, routes = config.routes.len(), "Config file changed");
        match self.updates.send(config) {
            Ok(()) => ReloadOutcome::Sent,
            Err(_) => {
                tracing::debug!(path = ?self.path, "Route reloader is gone; dropping config update");
                ReloadOutcome::Closed
            }
        }
    }

    /// Start watching on notify's background thread.
    ///
    /// Updates stop as soon as the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| {
                self.handle(event);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Watching config for route changes");
        Ok(watcher)
    }
}

/// Republish routes from every config received on `updates`.
///
/// The propagation mode is fixed at startup; a reloaded config that asks for
/// a different mode only has its routes applied.
pub fn spawn_route_reloader(
    table: Arc<RouteTable>,
    mode: PropagationMode,
    mut updates: mpsc::UnboundedReceiver<GuardConfig>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(config) = updates.recv().await {
            if config.propagation.mode != mode {
                tracing::warn!(
                    active = %mode,
                    requested = %config.propagation.mode,
                    "Propagation mode cannot change at runtime; applying routes only"
                );
            }
            match table.publish_config(&config.routes) {
                Ok(count) => tracing::info!(routes = count, "Routes reloaded"),
                Err(e) => tracing::error!(error = %e, "Rejected route reload; keeping current route table"),
            }
        }
        tracing::debug!("Route reloader stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::routing::RouteSource;

    fn config_with(routes: &[(&str, &str, bool)]) -> GuardConfig {
        let mut config = GuardConfig::default();
        for (name, pattern, public) in routes {
            config.routes.push(RouteConfig {
                name: name.to_string(),
                pattern: pattern.to_string(),
                order: 0,
                public: *public,
            });
        }
        config
    }

    fn modify_event() -> notify::Result<Event> {
        Ok(Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any)))
    }

    #[test]
    fn test_watcher_handles_events() {
        let path = std::env::temp_dir().join("propagation_guard_watcher_test.toml");
        std::fs::write(&path, "[[routes]]\nname = \"health\"\npattern = \"/health\"\npublic = true\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let access = Event::new(notify::EventKind::Access(notify::event::AccessKind::Any));
        assert_eq!(watcher.handle(Ok(access)), ReloadOutcome::Ignored);

        assert_eq!(watcher.handle(modify_event()), ReloadOutcome::Sent);
        assert_eq!(rx.try_recv().unwrap().routes.len(), 1);

        std::fs::write(&path, "[[routes]]\nname = \"bad\"\npattern = \"/{oops\"\n").unwrap();
        assert_eq!(watcher.handle(modify_event()), ReloadOutcome::Rejected);
        assert!(rx.try_recv().is_err());

        std::fs::write(&path, "").unwrap();
        drop(rx);
        assert_eq!(watcher.handle(modify_event()), ReloadOutcome::Closed);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_reloader_publishes_routes() {
        let table = Arc::new(RouteTable::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_route_reloader(table.clone(), PropagationMode::PublicEndpoints, rx);

        tx.send(config_with(&[("health", "/health", true)])).unwrap();
        tx.send(config_with(&[("health", "/health", true), ("api", "/api", false)]))
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        let routes = table.snapshot().unwrap();
        assert_eq!(routes.len(), 2);
        assert!(routes[0].is_public());
    }

    #[tokio::test]
    async fn test_reloader_keeps_table_on_bad_routes() {
        let table = Arc::new(RouteTable::new());
        table
            .publish_config(&config_with(&[("health", "/health", true)]).routes)
            .unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_route_reloader(table.clone(), PropagationMode::PublicEndpoints, rx);
        tx.send(config_with(&[("bad", "/{oops", false)])).unwrap();
        drop(tx);
        handle.await.unwrap();

        let routes = table.snapshot().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].name(), "health");
    }
}
