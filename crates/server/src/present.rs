//! Turns a ranked leaderboard into chat lines or a menu.

use std::sync::Arc;

use toplist_core::{
    config::{DisplayConfig, DisplayMode},
    leaderboard::{Leaderboard, RankedEntry},
    types::Recipient,
};

use crate::i18n::{self, Localizer};

pub trait ChatPrinter: Send + Sync {
    fn print_line(&self, recipient: &Recipient, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuOptions {
    /// Recipient can't move while the menu is open
    pub freeze_recipient: bool,
    /// Hide the menu widget's own branding
    pub suppress_attribution: bool,
}

/// Called with the index of the selected item.
pub type SelectCallback = Box<dyn Fn(&Recipient, usize) + Send + Sync>;

pub trait MenuPresenter: Send + Sync {
    fn show_list(
        &self,
        recipient: &Recipient,
        title: &str,
        items: Vec<MenuItem>,
        on_select: SelectCallback,
        options: MenuOptions,
    );
}

pub struct Presenter {
    chat: Arc<dyn ChatPrinter>,
    menu: Arc<dyn MenuPresenter>,
    localizer: Arc<dyn Localizer>,
}

impl Presenter {
    pub fn new(
        chat: Arc<dyn ChatPrinter>,
        menu: Arc<dyn MenuPresenter>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            chat,
            menu,
            localizer,
        }
    }

    /// Shows `board` to `recipient` in the configured mode. Entries are shown as given.
    pub fn present(&self, board: &Leaderboard, config: &DisplayConfig, recipient: &Recipient) {
        if board.is_empty() {
            self.no_data(recipient);
            return;
        }

        match config.mode {
            DisplayMode::ChatTranscript => self.chat_transcript(board, config, recipient),
            DisplayMode::InteractiveList => self.interactive_list(board, config, recipient),
        }
    }

    fn no_data(&self, recipient: &Recipient) {
        let text = format!(
            "{}{}",
            self.localizer.lookup(i18n::PREFIX, &[]),
            self.localizer.lookup(i18n::NO_DATA, &[])
        );
        self.chat.print_line(recipient, &text);
    }

    fn chat_transcript(&self, board: &Leaderboard, config: &DisplayConfig, recipient: &Recipient) {
        self.chat.print_line(recipient, &self.title(config));
        for entry in board {
            self.chat.print_line(recipient, &self.entry_line(entry));
        }
    }

    fn interactive_list(&self, board: &Leaderboard, config: &DisplayConfig, recipient: &Recipient) {
        let items = board
            .into_iter()
            .map(|entry| MenuItem {
                text: self.entry_line(entry),
            })
            .collect();

        let options = MenuOptions {
            freeze_recipient: true,
            suppress_attribution: !config.menu_attribution,
        };

        // Display only, selecting an entry does nothing
        let on_select: SelectCallback = Box::new(|_, _| {});

        self.menu
            .show_list(recipient, &self.title(config), items, on_select, options);
    }

    fn title(&self, config: &DisplayConfig) -> String {
        self.localizer.lookup(i18n::TITLE, &[&config.limit])
    }

    fn entry_line(&self, entry: &RankedEntry) -> String {
        self.localizer.lookup(
            i18n::PLAYER_LINE,
            &[&entry.rank, &entry.record.name, &entry.record.score],
        )
    }
}
