use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, PendingConfirm, ToastLevel};

fn toast_spans(state: &AppState) -> Vec<Span<'static>> {
    let Some(t) = &state.toast else {
        return Vec::new();
    };
    let color = state.theme.level(t.level);
    let tag = match t.level {
        ToastLevel::Success => "[OK]",
        ToastLevel::Error => "[ERROR]",
        ToastLevel::Info => "[INFO]",
    };
    vec![
        Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{}  |  ", t.text), Style::default().fg(color)),
    ]
}

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let mut spans: Vec<Span> = Vec::new();
    if !state.loading.is_empty() {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][state.tick as usize % 6];
        spans.push(Span::raw(format!(" {spinner} {} pending", state.loading.len())));
        spans.push(Span::raw("  |  "));
    }
    if let Some(confirm) = &state.confirm {
        let what = match confirm {
            PendingConfirm::Remove { id, .. } => format!("remove {id}"),
            PendingConfirm::RemoveAll { tab } => format!(
                "remove all {}",
                state
                    .browsers
                    .get(*tab)
                    .map(|b| b.spec().title.as_str())
                    .unwrap_or("entries")
            ),
        };
        spans.push(Span::styled(
            format!("Confirm {what}? [y/n]"),
            state.theme.editing(),
        ));
        let p = Paragraph::new(Line::from(spans));
        f.render_widget(p, area);
        return;
    }
    spans.extend(toast_spans(state));
    spans.push(Span::styled(
        help_text.to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}
