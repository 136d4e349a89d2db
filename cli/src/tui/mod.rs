//! Interactive TUI mode.
//!
//! One task owns the [`App`] and the terminal. It waits on key events, the
//! refresh ticker and an inbox of completion messages; every effect the app
//! returns runs as a detached task that answers through the inbox.

mod app;
mod input;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use portview_core::{
    check_health, open_in_browser, Config, ConfigStore, PortScanner, ProcessKiller, Scanner,
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use app::{App, Effect, Message};

const INBOX_CAPACITY: usize = 64;

/// A scan that runs longer than this many refresh intervals is abandoned.
const SCAN_DEADLINE_INTERVALS: u32 = 3;
const MIN_SCAN_DEADLINE: Duration = Duration::from_secs(10);

/// How long quitting waits for queued config saves.
const FLUSH_DEADLINE: Duration = Duration::from_secs(5);

/// Run the TUI until the user quits.
pub async fn run(config: Config, store: ConfigStore) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let scanner = Arc::new(PortScanner::new(config.port_range));
    let result = run_app(&mut terminal, config, store, scanner).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend, S: Scanner + 'static>(
    terminal: &mut Terminal<B>,
    config: Config,
    store: ConfigStore,
    scanner: Arc<S>,
) -> Result<()> {
    let (inbox_tx, mut inbox) = mpsc::channel(INBOX_CAPACITY);
    let scan_deadline =
        (config.refresh_interval * SCAN_DEADLINE_INTERVALS).max(MIN_SCAN_DEADLINE);
    let executor = Executor::new(scanner, store, &config, scan_deadline, inbox_tx);

    let refresh = config.refresh_interval.max(Duration::from_millis(100));
    let mut ticker = interval_at(Instant::now() + refresh, refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut events = EventStream::new();

    let mut app = App::new(config);
    let mut effects = app.init();
    info!(interval = ?refresh, "TUI started");

    let result = loop {
        if effects.contains(&Effect::Quit) {
            break Ok(());
        }
        for effect in effects.drain(..) {
            executor.execute(effect);
        }

        if let Err(e) = terminal.draw(|f| ui::draw(f, &app)) {
            break Err(e.into());
        }

        effects = tokio::select! {
            _ = ticker.tick() => app.handle_message(Message::Tick),
            Some(message) = inbox.recv() => app.handle_message(message),
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                // Resizes and releases only need a redraw
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => break Err(e.into()),
                None => break Ok(()),
            },
        };
    };

    info!("TUI exiting");
    // Nobody reads completions any more; queued saves still run
    drop(inbox);
    executor.shutdown().await;
    result
}

/// Runs effects as detached tasks that report back through the inbox.
struct Executor<S> {
    scanner: Arc<S>,
    killer: ProcessKiller,
    probe_timeout: Duration,
    scan_deadline: Duration,
    persist: mpsc::UnboundedSender<Config>,
    persister: JoinHandle<()>,
    inbox: mpsc::Sender<Message>,
}

impl<S: Scanner + 'static> Executor<S> {
    fn new(
        scanner: Arc<S>,
        store: ConfigStore,
        config: &Config,
        scan_deadline: Duration,
        inbox: mpsc::Sender<Message>,
    ) -> Self {
        let (persist, persister) = spawn_persister(store, inbox.clone());
        Self {
            scanner,
            killer: ProcessKiller::new(),
            probe_timeout: config.probe_timeout,
            scan_deadline,
            persist,
            persister,
            inbox,
        }
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::Scan => {
                let scanner = Arc::clone(&self.scanner);
                let inbox = self.inbox.clone();
                let limit = self.probe_timeout;
                let deadline = self.scan_deadline;
                tokio::spawn(async move {
                    let scan = async {
                        let servers = scanner.scan().await.map_err(|e| e.to_string())?;
                        Ok::<_, String>(check_health(&servers, limit).await)
                    };
                    let result = match timeout(deadline, scan).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(deadline = ?deadline, "Scan timed out");
                            Err(format!(
                                "scan timed out after {}",
                                humantime::format_duration(deadline)
                            ))
                        }
                    };
                    let _ = inbox.send(Message::Scanned(result)).await;
                });
            }
            Effect::Kill(pid) => {
                let killer = self.killer;
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let result = killer.terminate(pid).map_err(|e| e.to_string());
                    if result.is_ok() {
                        info!(pid = pid, "Sent SIGTERM");
                    }
                    let _ = inbox.send(Message::Killed { pid, result }).await;
                });
            }
            Effect::Open(port) => {
                tokio::spawn(open_in_browser(port));
            }
            Effect::Persist(config) => {
                if self.persist.send(config).is_err() {
                    warn!("Config persister stopped, change not saved");
                }
            }
            Effect::Quit => {}
        }
    }

    /// Close the persist queue and wait for the saves already in it.
    async fn shutdown(self) {
        let Self { persist, persister, .. } = self;
        drop(persist);
        match timeout(FLUSH_DEADLINE, persister).await {
            Ok(Ok(())) => debug!("Config persister drained"),
            Ok(Err(e)) => warn!(error = %e, "Config persister failed"),
            Err(_) => warn!("Gave up waiting for pending config saves"),
        }
    }
}

/// Save config snapshots one at a time, in the order they were sent.
///
/// The task ends once every sender is dropped and the queue is empty.
fn spawn_persister(
    store: ConfigStore,
    inbox: mpsc::Sender<Message>,
) -> (mpsc::UnboundedSender<Config>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Config>();
    let handle = tokio::spawn(async move {
        while let Some(config) = rx.recv().await {
            let result = store.save(&config).await.map_err(|e| e.to_string());
            match &result {
                Ok(()) => debug!(path = %store.path().display(), "Config saved"),
                Err(e) => warn!(error = %e, "Failed to save config"),
            }
            // A closed inbox means the UI is gone; keep saving anyway
            let _ = inbox.send(Message::Saved(result)).await;
        }
    });
    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portview_core::{MockScanner, Server};
    use tempfile::TempDir;

    /// Never finishes a scan.
    struct StalledScanner;

    impl Scanner for StalledScanner {
        async fn scan(&self) -> portview_core::Result<Vec<Server>> {
            std::future::pending().await
        }
    }

    fn executor<S: Scanner + 'static>(
        scanner: S,
        store: ConfigStore,
    ) -> (Executor<S>, mpsc::Receiver<Message>) {
        let (inbox_tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        let config = Config {
            probe_timeout: Duration::from_millis(100),
            ..Config::default()
        };
        let executor = Executor::new(
            Arc::new(scanner),
            store,
            &config,
            Duration::from_secs(5),
            inbox_tx,
        );
        (executor, inbox)
    }

    fn temp_store(dir: &TempDir) -> ConfigStore {
        ConfigStore::with_path(dir.path().join("portview").join("config.yaml"))
    }

    #[tokio::test]
    async fn test_scan_effect_reports_probed_servers() {
        let dir = TempDir::new().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let scanner = MockScanner::new(vec![Server::with_owner(port, 42, "test")]);
        let (executor, mut inbox) = executor(scanner, temp_store(&dir));

        executor.execute(Effect::Scan);

        match inbox.recv().await {
            Some(Message::Scanned(Ok(servers))) => {
                assert_eq!(servers.len(), 1);
                assert!(servers[0].healthy);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scan_effect_reports_error() {
        let dir = TempDir::new().unwrap();
        let (executor, mut inbox) = executor(MockScanner::failing("boom"), temp_store(&dir));

        executor.execute(Effect::Scan);

        match inbox.recv().await {
            Some(Message::Scanned(Err(e))) => assert!(e.contains("boom")),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stalled_scan_times_out() {
        let dir = TempDir::new().unwrap();
        let (mut executor, mut inbox) = executor(StalledScanner, temp_store(&dir));
        executor.scan_deadline = Duration::from_millis(50);

        let mut app = App::new(Config::default());
        for effect in app.init() {
            executor.execute(effect);
        }
        assert!(app.is_scanning());

        let message = timeout(Duration::from_secs(5), inbox.recv())
            .await
            .expect("scan result delivered")
            .unwrap();
        match &message {
            Message::Scanned(Err(e)) => assert!(e.contains("timed out"), "{e}"),
            other => panic!("unexpected message: {other:?}"),
        }

        app.handle_message(message);
        assert!(!app.is_scanning());
        assert!(app.last_error.as_deref().unwrap_or_default().contains("timed out"));

        // The next tick is free to scan again
        assert_eq!(app.handle_message(Message::Tick), vec![Effect::Scan]);
    }

    #[tokio::test]
    async fn test_kill_effect_reports_failure() {
        let dir = TempDir::new().unwrap();
        let (executor, mut inbox) = executor(MockScanner::default(), temp_store(&dir));

        executor.execute(Effect::Kill(0));

        match inbox.recv().await {
            Some(Message::Killed { pid: 0, result: Err(_) }) => {}
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_persist_saves_in_order() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let (executor, mut inbox) = executor(MockScanner::default(), store.clone());

        let mut config = Config::default();
        config.set_label(3000, "first");
        executor.execute(Effect::Persist(config.clone()));
        config.set_label(3000, "second");
        executor.execute(Effect::Persist(config.clone()));

        for _ in 0..2 {
            assert!(matches!(inbox.recv().await, Some(Message::Saved(Ok(())))));
        }

        let saved = store.load().await.unwrap();
        assert_eq!(saved.label_for(3000), Some("second"));
    }

    #[tokio::test]
    async fn test_shutdown_flushes_queued_saves() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let (executor, inbox) = executor(MockScanner::default(), store.clone());

        let mut config = Config::default();
        config.set_label(3000, "kept");
        executor.execute(Effect::Persist(config));

        // Quitting drops the inbox before anything reads the save result
        drop(inbox);
        executor.shutdown().await;

        assert!(store.path().exists());
        let saved = store.load().await.unwrap();
        assert_eq!(saved.label_for(3000), Some("kept"));
    }

    #[tokio::test]
    async fn test_app_scan_round_trip() {
        let dir = TempDir::new().unwrap();
        let scanner = MockScanner::new(vec![Server::listening(8080), Server::listening(22)]);
        let (executor, mut inbox) = executor(scanner, temp_store(&dir));

        let mut config = Config::default();
        config.hide(22);
        let mut app = App::new(config);

        for effect in app.init() {
            executor.execute(effect);
        }
        let message = inbox.recv().await.unwrap();
        assert!(app.handle_message(message).is_empty());

        let ports: Vec<u16> = app.visible.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![8080]);
        assert_eq!(executor.scanner.scan_count(), 1);
    }
}
