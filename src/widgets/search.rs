use crate::theme::Theme;
use crate::widgets::chrome::panel;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::crossterm::event as rt_event;
use ratatui::prelude::*;
use tui_textarea::{CursorMove, TextArea};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Text changed; the caller schedules a debounced filter.
    Edited(String),
    /// Enter: filter immediately.
    Submit(String),
    /// Esc: leave the search box, keeping the text.
    Close,
    Ignored,
}

/// Search box pre-filled with `text`, cursor at the end.
pub fn search_box(text: &str) -> TextArea<'static> {
    let mut ta = TextArea::new(vec![text.to_string()]);
    ta.move_cursor(CursorMove::End);
    ta
}

pub fn search_text(ta: &TextArea<'_>) -> String {
    ta.lines().first().cloned().unwrap_or_default()
}

// The terminal loop runs on crossterm 0.27 while tui-textarea follows the
// crossterm re-exported by ratatui, so keys are rebuilt here.
fn to_textarea_key(code: KeyCode, mods: KeyModifiers) -> Option<rt_event::KeyEvent> {
    let code = match code {
        KeyCode::Char(c) => rt_event::KeyCode::Char(c),
        KeyCode::Backspace => rt_event::KeyCode::Backspace,
        KeyCode::Delete => rt_event::KeyCode::Delete,
        KeyCode::Left => rt_event::KeyCode::Left,
        KeyCode::Right => rt_event::KeyCode::Right,
        KeyCode::Home => rt_event::KeyCode::Home,
        KeyCode::End => rt_event::KeyCode::End,
        _ => return None,
    };
    let mut m = rt_event::KeyModifiers::NONE;
    if mods.contains(KeyModifiers::CONTROL) {
        m |= rt_event::KeyModifiers::CONTROL;
    }
    if mods.contains(KeyModifiers::ALT) {
        m |= rt_event::KeyModifiers::ALT;
    }
    Some(rt_event::KeyEvent::new(code, m))
}

/// Feed a key to the single-line search box.
pub fn handle_search_key(ta: &mut TextArea<'_>, code: KeyCode, mods: KeyModifiers) -> SearchOutcome {
    match code {
        KeyCode::Enter => SearchOutcome::Submit(search_text(ta)),
        KeyCode::Esc | KeyCode::Tab => SearchOutcome::Close,
        _ => {
            let Some(ev) = to_textarea_key(code, mods) else {
                return SearchOutcome::Ignored;
            };
            if ta.input(ev) {
                SearchOutcome::Edited(search_text(ta))
            } else {
                SearchOutcome::Ignored
            }
        }
    }
}

pub fn draw_search(f: &mut Frame, area: Rect, ta: &mut TextArea<'static>, focused: bool, theme: &Theme) {
    let title = if focused { "Search (Enter apply, Esc close)" } else { "Search [/]" };
    ta.set_block(panel(title, focused, theme));
    ta.set_cursor_line_style(Style::default());
    if focused {
        ta.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
    } else {
        ta.set_cursor_style(Style::default());
    }
    ta.set_placeholder_text("filter labels");
    ta.set_placeholder_style(theme.muted());
    f.render_widget(&*ta, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(ta: &mut TextArea<'_>, s: &str) -> SearchOutcome {
        let mut last = SearchOutcome::Ignored;
        for c in s.chars() {
            last = handle_search_key(ta, KeyCode::Char(c), KeyModifiers::NONE);
        }
        last
    }

    #[test]
    fn typing_reports_full_text() {
        let mut ta = TextArea::default();
        assert_eq!(type_str(&mut ta, "lev"), SearchOutcome::Edited("lev".into()));
        assert_eq!(
            handle_search_key(&mut ta, KeyCode::Backspace, KeyModifiers::NONE),
            SearchOutcome::Edited("le".into())
        );
        assert_eq!(
            handle_search_key(&mut ta, KeyCode::Enter, KeyModifiers::NONE),
            SearchOutcome::Submit("le".into())
        );
    }

    #[test]
    fn prefilled_box_appends_at_the_end() {
        let mut ta = search_box("level");
        assert_eq!(search_text(&ta), "level");
        assert_eq!(type_str(&mut ta, "4"), SearchOutcome::Edited("level4".into()));
    }

    #[test]
    fn enter_never_inserts_a_newline() {
        let mut ta = TextArea::default();
        type_str(&mut ta, "a");
        handle_search_key(&mut ta, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(ta.lines().len(), 1);
        assert_eq!(
            handle_search_key(&mut ta, KeyCode::Esc, KeyModifiers::NONE),
            SearchOutcome::Close
        );
        assert_eq!(search_text(&ta), "a");
    }
}
