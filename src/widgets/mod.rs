pub mod chrome;
pub mod detail_viewer;
pub mod form;
pub mod header;
pub mod horizontal_menu;
pub mod listing;
pub mod options_bar;
pub mod search;
pub mod status_bar;

use crate::app::Effect;
use crossterm::event::KeyCode;
use ratatui::prelude::*;

/// A focusable pane that owns its scroll or cursor state.
pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64);
    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
}
