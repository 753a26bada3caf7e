use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

use crate::app::Effect;
use crate::model::DetailObject;
use crate::theme::Theme;
use crate::widgets::chrome::panel;

/// Scrollable, pretty-printed view of the selected detail object.
///
/// Schema warnings from option derivation are pinned above the document so a
/// misconfigured path is visible next to the data it failed to match.
pub struct DetailViewer {
    title: String,
    warnings: Vec<String>,
    body: Vec<String>,
    scroll_y: u16,
    wrap: bool,
    viewport_h: u16,
    theme: Theme,
}

impl DetailViewer {
    pub fn empty(theme: &Theme) -> Self {
        Self {
            title: "Detail".to_string(),
            warnings: Vec::new(),
            body: vec!["No entry selected".to_string()],
            scroll_y: 0,
            wrap: false,
            viewport_h: 0,
            theme: theme.clone(),
        }
    }

    pub fn for_detail(detail: &DetailObject, warnings: &[String], theme: &Theme) -> Self {
        let pretty =
            serde_json::to_string_pretty(&detail.value).unwrap_or_else(|_| detail.raw.clone());
        Self {
            title: format!("Detail: {}", detail.id),
            warnings: warnings.to_vec(),
            body: pretty.lines().map(str::to_string).collect(),
            ..Self::empty(theme)
        }
    }

    fn total_lines(&self) -> u16 {
        let pinned = if self.warnings.is_empty() {
            0
        } else {
            self.warnings.len() + 1
        };
        (pinned + self.body.len()).min(u16::MAX as usize) as u16
    }

    fn max_scroll(&self) -> u16 {
        self.total_lines().saturating_sub(self.viewport_h)
    }

    fn scroll_to(&mut self, y: u16) {
        self.scroll_y = y.min(self.max_scroll());
    }
}

impl Default for DetailViewer {
    fn default() -> Self {
        Self::empty(&Theme::default())
    }
}

impl super::Widget for DetailViewer {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        self.viewport_h = area.height.saturating_sub(2);
        self.scroll_to(self.scroll_y);

        let mut lines: Vec<Line> = self
            .warnings
            .iter()
            .map(|w| Line::styled(format!("! {w}"), self.theme.failure()))
            .collect();
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.extend(self.body.iter().map(|l| Line::raw(l.as_str())));

        let title = if self.wrap {
            format!("{} [wrap]", self.title)
        } else {
            self.title.clone()
        };
        let mut p = Paragraph::new(lines)
            .block(panel(&title, focused, &self.theme))
            .scroll((self.scroll_y, 0));
        if self.wrap {
            p = p.wrap(Wrap { trim: false });
        }
        f.render_widget(p, area);
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let page = self.viewport_h.max(1);
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_to(self.scroll_y.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_to(self.scroll_y.saturating_add(1)),
            KeyCode::PageUp => self.scroll_to(self.scroll_y.saturating_sub(page)),
            KeyCode::PageDown => self.scroll_to(self.scroll_y.saturating_add(page)),
            KeyCode::Home => self.scroll_y = 0,
            KeyCode::End => self.scroll_to(u16::MAX),
            KeyCode::Char('w') => self.wrap = !self.wrap,
            _ => {}
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Widget;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(v: &mut DetailViewer, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                v.render(f, area, true, 0);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn pretty_prints_detail_under_pinned_warnings() {
        let d = DetailObject::from_raw("1", r#"{"a":{"b":1}}"#).unwrap();
        let mut v =
            DetailViewer::for_detail(&d, &["metric: not an object".into()], &Theme::default());
        assert_eq!(v.body.len(), 5);
        let out = draw(&mut v, 40, 12);
        assert!(out.contains("Detail: 1"));
        assert!(out.contains("! metric: not an object"));
        assert!(out.contains("\"b\": 1"));
    }

    #[test]
    fn end_scrolls_to_last_line_of_long_detail() {
        let counts: serde_json::Map<String, serde_json::Value> =
            (0..30).map(|i| (format!("k{i}"), serde_json::json!(i))).collect();
        let d = DetailObject::from_value("9", serde_json::Value::Object(counts));
        let mut v = DetailViewer::for_detail(&d, &[], &Theme::default());
        let total = v.body.len() as u16;
        draw(&mut v, 40, 12);
        assert_eq!(v.viewport_h, 10);
        v.on_key(KeyCode::End);
        assert_eq!(v.scroll_y, total - 10);
        v.on_key(KeyCode::Down);
        assert_eq!(v.scroll_y, total - 10);
        v.on_key(KeyCode::PageUp);
        assert_eq!(v.scroll_y, total - 20);
        v.on_key(KeyCode::Home);
        assert_eq!(v.scroll_y, 0);
    }
}
