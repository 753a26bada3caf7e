use ratatui::style::{Color, Modifier, Style};

use crate::ui::ToastLevel;

/// Colour roles of the console. One instance lives on `AppState`; widgets that
/// render without the state use `Theme::default()`.
#[derive(Clone, Debug)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub brand: Color,
    pub link: Color,
    pub hint: Color,
    pub frame: Color,
    pub focus: Color,
    pub ok: Color,
    pub fail: Color,
    pub dim: Color,
}

impl Theme {
    pub fn console() -> Self {
        Self {
            background: Color::Rgb(18, 22, 30),
            text: Color::Rgb(220, 224, 232),
            brand: Color::Rgb(97, 175, 239),
            link: Color::Rgb(86, 182, 194),
            hint: Color::Rgb(229, 192, 123),
            frame: Color::Rgb(76, 86, 106),
            focus: Color::Rgb(198, 120, 221),
            ok: Color::Rgb(152, 195, 121),
            fail: Color::Rgb(224, 108, 117),
            dim: Color::DarkGray,
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.focus } else { self.frame })
    }

    /// Field labels, key hints and the current option keys.
    pub fn label(&self) -> Style {
        Style::default().fg(self.hint).add_modifier(Modifier::BOLD)
    }

    pub fn editing(&self) -> Style {
        Style::default().fg(self.focus).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn failure(&self) -> Style {
        Style::default().fg(self.fail)
    }

    /// Highlighted row under the cursor of a focused list.
    pub fn cursor(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.focus)
            .add_modifier(Modifier::BOLD)
    }

    pub fn level(&self, level: ToastLevel) -> Color {
        match level {
            ToastLevel::Success => self.ok,
            ToastLevel::Error => self.fail,
            ToastLevel::Info => self.link,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::console()
    }
}
