use crate::browser::RemoteCollectionBrowser;
use crate::theme::Theme;
use crate::widgets::chrome::panel;
use ratatui::prelude::*;
use ratatui::widgets::*;

const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

/// Window `[start, end)` of rows to show so that `selected` stays visible.
pub(crate) fn compute_scroll_window(total: usize, selected: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let sel = selected.min(total.saturating_sub(1));
    let ih = inner_h as usize;
    let start = sel.saturating_sub(ih - 1);
    let end = (start + ih).min(total);
    (start, end)
}

pub fn draw_listing(
    f: &mut Frame,
    area: Rect,
    browser: &RemoteCollectionBrowser,
    focused: bool,
    theme: &Theme,
    tick: u64,
) {
    let visible = browser.visible_entries();
    let title = if browser.loading_listing {
        format!("{} {}", browser.spec().title, SPINNER[tick as usize % 6])
    } else if browser.debouncer.pending().is_some() {
        format!("{} (filtering...)", browser.spec().title)
    } else if browser.search_text().is_empty() {
        format!("{} ({})", browser.spec().title, browser.entries().len())
    } else {
        format!(
            "{} ({}/{})",
            browser.spec().title,
            visible.len(),
            browser.entries().len()
        )
    };
    let block = panel(&title, focused, theme);

    if browser.is_empty() {
        let msg = if browser.loading_listing {
            "Fetching...".to_string()
        } else if browser.entries().is_empty() {
            "No entries".to_string()
        } else {
            format!("No entries match '{}'", browser.search_text())
        };
        let p = Paragraph::new(msg).style(theme.muted()).block(block);
        f.render_widget(p, area);
        return;
    }

    let selected = browser.selected_visible_index();
    let inner_h = area.height.saturating_sub(2);
    let (start, end) = compute_scroll_window(visible.len(), selected.unwrap_or(0), inner_h);
    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(i, e)| {
            let is_sel = Some(i) == selected;
            let marker = if is_sel { "> " } else { "  " };
            let mut item = ListItem::new(format!("{marker}{}", e.label));
            if is_sel {
                item = item.style(if focused {
                    theme.cursor()
                } else {
                    theme.label()
                });
            }
            item
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}
