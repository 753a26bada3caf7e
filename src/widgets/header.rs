use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::AppState;

pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let title = state.config.header.as_deref().unwrap_or("CSLE Console");
    let server = state
        .client
        .as_ref()
        .map(|c| c.base_url().to_string())
        .unwrap_or_else(|| state.config.server.clone());
    let user = match state.session.data() {
        Some(d) if d.admin => Span::styled(
            format!("{} (admin)", d.username),
            Style::default().fg(theme.ok),
        ),
        Some(d) => Span::styled(d.username.clone(), Style::default().fg(theme.ok)),
        None => Span::styled("not logged in", theme.muted()),
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.brand)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(theme.frame)),
        Span::styled(server, Style::default().fg(theme.link)),
        Span::styled(" │ ", Style::default().fg(theme.frame)),
        user,
    ]);
    f.render_widget(Paragraph::new(line), area);
}
