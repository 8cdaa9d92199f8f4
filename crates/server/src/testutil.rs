//! Fakes standing in for the store and the host's display surfaces.

use std::{cell::RefCell, sync::Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record};
use toplist_core::{
    error::{TopListError, TopListResult},
    leaderboard::{Leaderboard, ScoreRecord},
    types::Recipient,
};

use crate::{
    present::{ChatPrinter, MenuItem, MenuOptions, MenuPresenter, SelectCallback},
    store::ScoreStore,
};

pub struct MemoryStore {
    records: Vec<ScoreRecord>,
}

impl MemoryStore {
    pub fn new(rows: &[(&str, i64)]) -> Self {
        Self {
            records: rows
                .iter()
                .map(|(name, score)| ScoreRecord::new(*name, *score))
                .collect(),
        }
    }
}

impl ScoreStore for MemoryStore {
    fn top_scores(&self, limit: usize) -> TopListResult<Vec<ScoreRecord>> {
        let board = Leaderboard::ranked(self.records.clone(), limit);
        Ok(board.into_iter().map(|e| e.record.clone()).collect())
    }
}

pub struct FailingStore;

impl ScoreStore for FailingStore {
    fn top_scores(&self, _limit: usize) -> TopListResult<Vec<ScoreRecord>> {
        Err(TopListError::StoreUnavailable("connection refused".into()))
    }
}

#[derive(Default)]
pub struct RecordingChat {
    lines: Mutex<Vec<(Recipient, String)>>,
}

impl RecordingChat {
    pub fn lines(&self) -> Vec<(Recipient, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, text)| text).collect()
    }
}

impl ChatPrinter for RecordingChat {
    fn print_line(&self, recipient: &Recipient, text: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((recipient.clone(), text.to_string()));
    }
}

#[derive(Debug, Clone)]
pub struct MenuCall {
    pub recipient: Recipient,
    pub title: String,
    pub items: Vec<MenuItem>,
    pub options: MenuOptions,
}

#[derive(Default)]
pub struct RecordingMenu {
    calls: Mutex<Vec<MenuCall>>,
    callbacks: Mutex<Vec<SelectCallback>>,
}

impl RecordingMenu {
    pub fn calls(&self) -> Vec<MenuCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Simulates `recipient` picking `item` in the `call`-th menu shown.
    pub fn select(&self, call: usize, recipient: &Recipient, item: usize) {
        let callbacks = self.callbacks.lock().unwrap();
        callbacks[call](recipient, item);
    }
}

impl MenuPresenter for RecordingMenu {
    fn show_list(
        &self,
        recipient: &Recipient,
        title: &str,
        items: Vec<MenuItem>,
        on_select: SelectCallback,
        options: MenuOptions,
    ) {
        self.calls.lock().unwrap().push(MenuCall {
            recipient: recipient.clone(),
            title: title.to_string(),
            items,
            options,
        });
        self.callbacks.lock().unwrap().push(on_select);
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Keeps log records per thread so tests running in parallel don't see each other's lines.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|r| {
            r.borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

pub struct LogCapture;

impl LogCapture {
    pub fn at(&self, level: Level) -> Vec<String> {
        RECORDS.with(|r| {
            r.borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, msg)| msg.clone())
                .collect()
        })
    }
}

/// Starts recording log lines emitted on the current thread.
pub fn capture_logs() -> LogCapture {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
    RECORDS.with(|r| r.borrow_mut().clear());
    LogCapture
}
