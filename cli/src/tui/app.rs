//! TUI application state.
//!
//! `App` is a pure state machine: key events and completion messages go in,
//! [`Effect`]s come out for the event loop to execute. Nothing here touches
//! the terminal, the network or the disk.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portview_core::{apply_filter, clamp_cursor, reconcile, Config, Server};

use super::input::{TextInput, LABEL_CHAR_LIMIT};

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Filter,
    Label,
    ConfirmKill,
    Help,
}

/// A side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Scan and probe, answered by [`Message::Scanned`].
    Scan,
    /// SIGTERM the PID, answered by [`Message::Killed`].
    Kill(u32),
    /// Open the port in a browser. Never answered.
    Open(u16),
    /// Save this config snapshot, answered by [`Message::Saved`].
    Persist(Config),
    Quit,
}

/// Events that do not come from the keyboard.
#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    Scanned(Result<Vec<Server>, String>),
    Killed { pid: u32, result: Result<(), String> },
    Saved(Result<(), String>),
}

pub struct App {
    pub mode: Mode,
    pub config: Config,
    /// Scan result after label merge and hidden filter.
    pub servers: Vec<Server>,
    /// `servers` after the text filter, in display order.
    pub visible: Vec<Server>,
    pub cursor: usize,
    pub filter: String,
    pub label_input: TextInput,
    pub last_error: Option<String>,
    pub last_refresh: Option<DateTime<Local>>,
    scan_in_flight: bool,
    rescan_pending: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            mode: Mode::Normal,
            config,
            servers: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            filter: String::new(),
            label_input: TextInput::new(LABEL_CHAR_LIMIT, "label"),
            last_error: None,
            last_refresh: None,
            scan_in_flight: false,
            rescan_pending: false,
        }
    }

    /// Effects to run at startup.
    pub fn init(&mut self) -> Vec<Effect> {
        self.request_scan()
    }

    pub fn selected(&self) -> Option<&Server> {
        self.visible.get(self.cursor)
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_in_flight
    }

    /// Start a scan, or queue one behind the scan already running.
    fn request_scan(&mut self) -> Vec<Effect> {
        if self.scan_in_flight {
            self.rescan_pending = true;
            return Vec::new();
        }
        self.scan_in_flight = true;
        vec![Effect::Scan]
    }

    fn refilter(&mut self) {
        self.visible = apply_filter(&self.servers, &self.filter);
        self.cursor = clamp_cursor(self.cursor, self.visible.len());
    }

    pub fn handle_message(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::Tick => self.request_scan(),
            Message::Scanned(result) => {
                self.scan_in_flight = false;
                match result {
                    Ok(servers) => {
                        self.last_error = None;
                        self.servers = reconcile(servers, &self.config);
                        self.last_refresh = Some(Local::now());
                        self.refilter();
                    }
                    Err(e) => self.last_error = Some(e),
                }
                if std::mem::take(&mut self.rescan_pending) {
                    return self.request_scan();
                }
                Vec::new()
            }
            Message::Killed { pid, result } => {
                if let Err(e) = result {
                    self.last_error = Some(format!("kill {pid}: {e}"));
                }
                self.request_scan()
            }
            Message::Saved(result) => {
                if let Err(e) = result {
                    self.last_error = Some(e);
                }
                Vec::new()
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Filter => {
                self.handle_filter_key(key);
                Vec::new()
            }
            Mode::Label => self.handle_label_key(key),
            Mode::ConfirmKill => self.handle_confirm_kill_key(key),
            Mode::Help => {
                self.mode = Mode::Normal;
                Vec::new()
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => vec![Effect::Quit],
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Char('q') => return vec![Effect::Quit],
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.visible.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Char('x') => {
                if !self.visible.is_empty() {
                    self.mode = Mode::ConfirmKill;
                }
            }
            KeyCode::Char('l') => {
                if let Some(server) = self.selected() {
                    let existing = self.config.label_for(server.port).unwrap_or("").to_string();
                    self.label_input.set_value(&existing);
                    self.mode = Mode::Label;
                }
            }
            KeyCode::Char('h') => return self.hide_selected(),
            KeyCode::Char('?') => self.mode = Mode::Help,
            KeyCode::Char('o') | KeyCode::Enter => {
                if let Some(server) = self.selected() {
                    return vec![Effect::Open(server.port)];
                }
            }
            KeyCode::Char('r') => return self.request_scan(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                if self.filter.pop().is_some() {
                    self.refilter();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    fn handle_confirm_kill_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('y') => {
                self.mode = Mode::Normal;
                match self.selected() {
                    Some(server) => vec![Effect::Kill(server.pid)],
                    None => Vec::new(),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_label_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.label_input.clear();
                Vec::new()
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let Some(port) = self.selected().map(|s| s.port) else {
                    self.label_input.clear();
                    return Vec::new();
                };

                let label = self.label_input.value().to_string();
                self.label_input.clear();
                if label.is_empty() {
                    self.config.remove_label(port);
                } else {
                    self.config.set_label(port, label.clone());
                }

                for server in self.servers.iter_mut().chain(self.visible.iter_mut()) {
                    if server.port == port {
                        server.label = label.clone();
                    }
                }
                vec![Effect::Persist(self.config.clone())]
            }
            _ => {
                self.label_input.handle_key(key);
                Vec::new()
            }
        }
    }

    /// Hide the selected port and persist the hidden set.
    fn hide_selected(&mut self) -> Vec<Effect> {
        let Some(port) = self.selected().map(|s| s.port) else {
            return Vec::new();
        };

        self.config.hide(port);
        self.servers.retain(|s| s.port != port);
        self.refilter();
        vec![Effect::Persist(self.config.clone())]
    }
}
