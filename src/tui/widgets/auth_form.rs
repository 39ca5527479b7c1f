//! Sign-in and sign-up forms.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::detail_common::{fixed_rect, key_hints, render_popup_block};
use crate::auth::{AuthForm, AuthMode};
use crate::tui::style::Theme;

/// Masks secret input unless the form shows passwords.
fn display_value(form: &AuthForm, value: &str, secret: bool) -> String {
    if secret && !form.show_password {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}

fn build_lines(form: &AuthForm, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let subtitle = match form.mode {
        AuthMode::SignIn => "Enter your e-mail and password.",
        AuthMode::SignUp => "Create an account to follow your tickets.",
    };
    lines.push(Line::from(Span::styled(subtitle, theme.dim())));
    lines.push(Line::from(""));

    for field in form.fields() {
        let focused = *field == form.focused();
        let marker = if focused { "› " } else { "  " };
        let label_style = if focused { theme.accent() } else { theme.dim() };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", field.label()),
            label_style,
        )));

        let mut value = display_value(form, form.value(*field), field.is_secret());
        if focused {
            value.push('█');
        }
        lines.push(Line::from(Span::styled(format!("  {value}"), theme.input())));

        match form.errors.get(*field) {
            Some(msg) => lines.push(Line::from(Span::styled(format!("  {msg}"), theme.error()))),
            None => lines.push(Line::from("")),
        }
    }

    if let Some(err) = &form.form_error {
        lines.push(Line::from(Span::styled(err.clone(), theme.error())));
    }
    if form.submitting {
        lines.push(Line::from(Span::styled("Submitting…", theme.dim())));
    }
    lines.push(Line::from(""));
    let visibility = if form.show_password {
        "hide passwords"
    } else {
        "show passwords"
    };
    lines.push(key_hints(
        &[
            ("Tab", "next"),
            ("Enter", "submit"),
            ("F2", visibility),
            ("Esc", "back"),
        ],
        theme,
    ));
    lines
}

pub fn render_auth_form(frame: &mut Frame, area: Rect, form: &AuthForm, theme: &Theme) {
    let height = form.fields().len() as u16 * 3 + 9;
    let popup_area = fixed_rect(64, height, area);
    let inner = render_popup_block(frame, popup_area, form.mode.title(), theme);
    frame.render_widget(
        Paragraph::new(build_lines(form, theme))
            .style(theme.popup())
            .wrap(Wrap { trim: false }),
        inner,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Field;

    #[test]
    fn passwords_are_masked_until_revealed() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        form.set_value(Field::Password, "hunter2hunter2");
        assert_eq!(display_value(&form, "hunter2", true), "•••••••");
        assert_eq!(display_value(&form, "jane@x.io", false), "jane@x.io");
        form.show_password = true;
        assert_eq!(display_value(&form, "hunter2", true), "hunter2");
    }
}
