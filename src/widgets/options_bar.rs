use crate::browser::RemoteCollectionBrowser;
use crate::theme::Theme;
use crate::widgets::chrome::panel;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Lines describing the derived options of the current detail.
///
/// `cursor` is the focused option row and `key_cursor` the focused key inside
/// a multi-select row; both are only highlighted while `focused`.
pub fn option_lines(
    browser: &RemoteCollectionBrowser,
    cursor: usize,
    key_cursor: usize,
    focused: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let derivation = browser.derivation();
    let mut lines: Vec<Line> = Vec::new();
    for (row, opt) in derivation.options.iter().enumerate() {
        let row_focused = focused && row == cursor;
        let marker = if row_focused { "› " } else { "  " };
        let mut spans = vec![Span::styled(
            format!("{marker}{}: ", opt.name),
            if row_focused {
                theme.editing()
            } else {
                theme.label()
            },
        )];
        if opt.options.is_empty() {
            spans.push(Span::styled("(none)", theme.muted()));
        }
        for (i, key) in opt.options.iter().enumerate() {
            let sel = opt.is_selected(key);
            let text = if opt.multi {
                format!("[{}] {key}", if sel { 'x' } else { ' ' })
            } else if sel {
                format!("<{key}>")
            } else {
                key.clone()
            };
            let style = if row_focused && opt.multi && i == key_cursor {
                theme.cursor()
            } else if sel {
                Style::default().fg(theme.link)
            } else {
                theme.muted()
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    if let Some(n) = browser.num_samples() {
        lines.push(Line::from(vec![
            Span::styled("  samples: ", theme.label()),
            Span::raw(crate::stats::format_count(n)),
        ]));
    }

    if let Some(cond) = derivation.options.iter().find(|o| o.multi) {
        let pair = crate::stats::first_two_conditionals(&cond.selected);
        if pair.len() == 2 {
            lines.push(Line::from(vec![
                Span::styled("  compare: ", theme.label()),
                Span::raw(format!("{} vs {}", pair[0], pair[1])),
            ]));
            let pairs = crate::stats::conditional_pairs(&cond.selected);
            if pairs.len() > 1 {
                lines.push(Line::from(Span::styled(
                    format!("  {} pairs selected", pairs.len()),
                    theme.muted(),
                )));
            }
        }
    }

    for w in &derivation.warnings {
        lines.push(Line::from(Span::styled(format!("  ! {w}"), theme.failure())));
    }
    lines
}

pub fn draw_options_bar(
    f: &mut Frame,
    area: Rect,
    browser: &RemoteCollectionBrowser,
    cursor: usize,
    key_cursor: usize,
    focused: bool,
    theme: &Theme,
) {
    let block = panel("Options", focused, theme);
    let lines = if browser.detail().is_none() {
        vec![Line::from(Span::styled(
            if browser.loading_detail { "Fetching detail..." } else { "No detail selected" },
            theme.muted(),
        ))]
    } else {
        option_lines(browser, cursor, key_cursor, focused, theme)
    };
    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

/// Rows needed to show the option bar for `browser`, borders included.
pub fn options_height(browser: &RemoteCollectionBrowser) -> u16 {
    let d = browser.derivation();
    let mut rows = d.options.len().max(1) + d.warnings.len();
    if browser.num_samples().is_some() {
        rows += 1;
    }
    if d
        .options
        .iter()
        .find(|o| o.multi)
        .is_some_and(|o| o.selected.len() >= 2)
    {
        rows += 2;
    }
    (rows as u16).saturating_add(2).min(12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::Request;
    use crate::model::{default_collections, DetailObject};
    use serde_json::json;
    use std::time::Duration;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn shows_selection_samples_and_comparison() {
        let mut b = RemoteCollectionBrowser::new(
            default_collections()[0].clone(),
            Duration::from_millis(1),
        );
        let Request::Listing { generation } = b.load_listing() else {
            panic!("expected listing request");
        };
        let reqs = b.apply_listing(generation, &json!([{"id": 1}])).unwrap();
        let Some(Request::Detail { generation, .. }) = reqs.into_iter().next() else {
            panic!("expected detail request");
        };
        let detail = DetailObject::from_value(
            "1",
            json!({
                "conditionals_counts": {
                    "A": {"alerts": {"0": 1500, "1": 200}},
                    "B": {"alerts": {"0": 10}}
                }
            }),
        );
        assert!(b.apply_detail(generation, detail));
        b.toggle_option_key("conditional", "B").unwrap();

        let theme = Theme::default();
        let out = text(&option_lines(&b, 0, 0, true, &theme));
        assert!(out.contains("[x] A"));
        assert!(out.contains("[x] B"));
        assert!(out.contains("<alerts>"));
        assert!(out.contains("compare: A vs B"));
        assert!(out.contains("samples: "));
    }
}
