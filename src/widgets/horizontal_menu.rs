use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Tabs};

use crate::browser::RemoteCollectionBrowser;
use crate::theme::Theme;
use crate::ui::AppState;

fn tab_title(index: usize, browser: &RemoteCollectionBrowser, active: bool, theme: &Theme) -> Line<'static> {
    let (key, name) = if active {
        (theme.label(), theme.editing())
    } else {
        (theme.muted(), theme.muted())
    };
    let mut spans = vec![
        Span::styled(format!("F{}", index + 1), key),
        Span::raw(" "),
        Span::styled(browser.spec().title.clone(), name),
    ];
    if browser.is_loading() {
        spans.push(Span::styled(" …", Style::default().fg(theme.link)));
    }
    Line::from(spans)
}

/// One tab per collection, labelled with the function key that opens it.
pub fn draw_collection_tabs(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let titles: Vec<Line> = state
        .browsers
        .iter()
        .enumerate()
        .map(|(i, b)| tab_title(i, b, i == state.tab, theme))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.tab)
        .style(Style::default().fg(theme.text))
        .divider(Span::styled("│", Style::default().fg(theme.frame)))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border(false)),
        );
    f.render_widget(tabs, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConsoleConfig;
    use ratatui::backend::TestBackend;

    #[test]
    fn tabs_list_collections_with_function_keys() {
        let st = AppState::with_config(ConsoleConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 2)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_collection_tabs(f, area, &st)
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let row: String = (0..buf.area.width).map(|x| buf[(x, 0)].symbol()).collect();
        assert!(row.contains("F1 Statistics"));
        assert!(row.contains("F2 Experiments"));
    }
}
