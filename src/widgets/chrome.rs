use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders};

use crate::theme::Theme;

/// Bordered pane; the title takes the focus colour when the pane has focus.
pub fn panel(title: &str, focused: bool, theme: &Theme) -> Block<'static> {
    let title_style = if focused {
        theme.editing()
    } else {
        Style::default().fg(theme.text)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border(focused))
        .title(Line::styled(format!(" {title} "), title_style))
}
