use crate::session::{AccountFields, SessionData};
use crate::theme::Theme;
use crate::widgets::chrome::panel;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Password,
}

#[derive(Clone, Debug)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
    pub value: String,
    pub error: Option<String>,
}

impl FormField {
    fn text(name: &str, label: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: false,
            kind: FieldKind::Text,
            value: value.to_string(),
            error: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn password(mut self) -> Self {
        self.kind = FieldKind::Password;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub title: String,
    pub submit_label: String,
    pub fields: Vec<FormField>,
    pub selected: usize,
    pub editing: bool,
    pub message: Option<String>,
    pub disabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}

pub fn login_form() -> FormState {
    FormState {
        title: "Login".into(),
        submit_label: "Login".into(),
        fields: vec![
            FormField::text("username", "Username", "").required(),
            FormField::text("password", "Password", "").required().password(),
        ],
        ..Default::default()
    }
}

/// Account form seeded from the session; the password must be entered again.
pub fn account_form(data: &SessionData) -> FormState {
    let current = AccountFields::from_session(data);
    FormState {
        title: format!("Account: {}", current.username),
        submit_label: "Save".into(),
        fields: vec![
            FormField::text("username", "Username", &current.username).required(),
            FormField::text("password", "Password", &current.password)
                .required()
                .password(),
            FormField::text("email", "Email", &current.email),
            FormField::text("first_name", "First name", &current.first_name),
            FormField::text("last_name", "Last name", &current.last_name),
            FormField::text("organization", "Organization", &current.organization),
        ],
        ..Default::default()
    }
}

pub fn value<'a>(form: &'a FormState, name: &str) -> &'a str {
    form.fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.value.as_str())
        .unwrap_or("")
}

pub fn account_fields(form: &FormState) -> AccountFields {
    AccountFields {
        username: value(form, "username").trim().to_string(),
        password: value(form, "password").to_string(),
        email: value(form, "email").trim().to_string(),
        first_name: value(form, "first_name").trim().to_string(),
        last_name: value(form, "last_name").trim().to_string(),
        organization: value(form, "organization").trim().to_string(),
    }
}

pub fn validate_form(form: &mut FormState) -> bool {
    let mut ok = true;
    for fld in &mut form.fields {
        fld.error = None;
        if fld.required && fld.value.trim().is_empty() {
            fld.error = Some("This field is required".into());
            ok = false;
        }
    }
    ok
}

/// Apply a key to the form. Field rows come first, then Submit and Cancel.
pub fn handle_form_key(form: &mut FormState, key: KeyCode) -> FormAction {
    if form.disabled {
        return FormAction::None;
    }
    let submit_idx = form.fields.len();
    let cancel_idx = submit_idx + 1;
    if form.editing {
        let Some(fld) = form.fields.get_mut(form.selected) else {
            form.editing = false;
            return FormAction::None;
        };
        match key {
            KeyCode::Char(c) => fld.value.push(c),
            KeyCode::Backspace => {
                fld.value.pop();
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
                form.editing = false;
                form.selected = (form.selected + 1).min(cancel_idx);
            }
            KeyCode::Esc => form.editing = false,
            _ => {}
        }
        return FormAction::None;
    }
    match key {
        KeyCode::Up | KeyCode::BackTab => {
            form.selected = form.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Tab => {
            form.selected = (form.selected + 1).min(cancel_idx);
        }
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter if form.selected == submit_idx => {
            if validate_form(form) {
                return FormAction::Submit;
            }
            form.message = Some("Please fix the highlighted fields".into());
        }
        KeyCode::Enter if form.selected == cancel_idx => return FormAction::Cancel,
        KeyCode::Enter | KeyCode::Char('e') => {
            form.editing = true;
            form.message = None;
        }
        _ => {}
    }
    FormAction::None
}

pub fn draw_form(f: &mut Frame, area: Rect, form: &FormState, cursor_on: bool, theme: &Theme) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, fld) in form.fields.iter().enumerate() {
        let sel = if i == form.selected { '›' } else { ' ' };
        let req = if fld.required { " *" } else { "" };
        let mut val = match fld.kind {
            FieldKind::Text => fld.value.clone(),
            FieldKind::Password => "•".repeat(fld.value.chars().count()),
        };
        if form.editing && i == form.selected && cursor_on {
            val.push('▏');
        }
        let value_style = if i == form.selected {
            if form.editing {
                theme.editing()
            } else {
                theme.label()
            }
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{sel} {}{req}: ", fld.label)),
            Span::styled(val, value_style),
        ]));
        if let Some(err) = &fld.error {
            lines.push(Line::from(Span::styled(
                format!("  ! {err}"),
                theme.failure(),
            )));
        }
    }
    lines.push(Line::from(""));
    let submit_idx = form.fields.len();
    let mut submit_style = if form.disabled {
        theme.muted()
    } else {
        theme.label()
    };
    let mut cancel_style = theme.muted();
    if form.selected == submit_idx {
        submit_style = theme.cursor();
    }
    if form.selected == submit_idx + 1 {
        cancel_style = theme.cursor();
    }
    lines.push(Line::from(vec![
        Span::styled(format!("  [ {} ]  ", form.submit_label), submit_style),
        Span::styled("Cancel", cancel_style),
    ]));
    if let Some(msg) = &form.message {
        lines.push(Line::from(Span::styled(
            msg.clone(),
            theme.muted(),
        )));
    }
    let title = if form.editing {
        format!("{} (editing)", form.title)
    } else {
        form.title.clone()
    };
    let block = panel(&title, true, theme);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
