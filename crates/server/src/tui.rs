//! Terminal menu: draws the list with ratatui and prints the rows.

use std::{io::Write, sync::Mutex};

use log::{debug, warn};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, List, ListItem, Widget},
};
use toplist_core::types::Recipient;

use crate::present::{MenuItem, MenuOptions, MenuPresenter, SelectCallback};

pub const DEFAULT_WIDTH: u16 = 48;
const ATTRIBUTION: &str = " store-toplist ";

pub struct TermMenu<W> {
    out: Mutex<W>,
    width: u16,
}

impl<W: Write + Send> TermMenu<W> {
    pub fn new(out: W, width: u16) -> Self {
        Self {
            out: Mutex::new(out),
            width,
        }
    }
}

impl<W: Write + Send> MenuPresenter for TermMenu<W> {
    fn show_list(
        &self,
        recipient: &Recipient,
        title: &str,
        items: Vec<MenuItem>,
        _on_select: SelectCallback,
        options: MenuOptions,
    ) {
        if options.freeze_recipient {
            debug!("{recipient} is frozen while the menu is open");
        }

        let rows = render_menu(title, &items, options, self.width);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        for row in rows {
            if let Err(e) = writeln!(out, "[{}] {row}", recipient.name) {
                warn!("Could not show menu to {recipient}: {e}");
                return;
            }
        }
    }
}

/// Renders a bordered list into rows of text, one per terminal line.
pub fn render_menu(
    title: &str,
    items: &[MenuItem],
    options: MenuOptions,
    width: u16,
) -> Vec<String> {
    let height = items.len().min(usize::from(u16::MAX) - 2) as u16 + 2;
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);

    let mut block = Block::bordered().title(Line::from(title));
    if !options.suppress_attribution {
        block = block.title_bottom(Line::from(ATTRIBUTION).right_aligned());
    }

    let list = List::new(items.iter().map(|item| ListItem::new(item.text.as_str())))
        .block(block);
    list.render(area, &mut buf);

    (area.top()..area.bottom())
        .map(|y| row_text(&buf, area, y))
        .collect()
}

/// Text of row `y`, skipping the filler cells that follow wide characters.
fn row_text(buf: &Buffer, area: Rect, y: u16) -> String {
    let mut row = String::new();
    let mut x = area.left();
    while x < area.right() {
        let symbol = buf[(x, y)].symbol();
        row.push_str(symbol);
        let width = Span::raw(symbol).width().max(1);
        x = x.saturating_add(u16::try_from(width).unwrap_or(1));
    }
    row.trim_end().to_string()
}
