//! Sign-in and sign-up forms: field state, validation and submit payloads.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::api::{ApiError, AuthResponse, Credentials, Registration};

pub const MIN_PASSWORD_LEN: usize = 10;
pub const MIN_USERNAME_LEN: usize = 6;

pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 10 characters.";
pub const MSG_USERNAME_TOO_SHORT: &str = "Username must be at least 6 characters.";
pub const MSG_INVALID_EMAIL: &str = "Invalid email";
pub const MSG_CONFIRMATION_MISMATCH: &str = "Fields must match with password.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Form fields, in on-screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
    PasswordConfirmation,
}

impl Field {
    /// Wire name, also used as the key of server-side validation errors.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::PasswordConfirmation => "password_confirmation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Username => "User name",
            Field::Email => "E-mail",
            Field::Password => "Password",
            Field::PasswordConfirmation => "Password confirmation",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::PasswordConfirmation)
    }

    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "username" => Some(Field::Username),
            "email" => Some(Field::Email),
            "password" => Some(Field::Password),
            "password_confirmation" => Some(Field::PasswordConfirmation),
            _ => None,
        }
    }
}

/// One message per field; the first failing rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(Field, String)>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.errors.push((field, message.into()));
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.iter().map(|(f, _)| *f)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        errors.insert(Field::Email, MSG_INVALID_EMAIL);
    }
}

fn check_min(errors: &mut FieldErrors, field: Field, value: &str, min: usize, message: &str) {
    if value.chars().count() < min {
        errors.insert(field, message);
    }
}

/// Validates the sign-in form.
pub fn validate_sign_in(email: &str, password: &str) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, email);
    check_min(&mut errors, Field::Password, password, MIN_PASSWORD_LEN, MSG_PASSWORD_TOO_SHORT);

    if errors.is_empty() {
        Ok(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })
    } else {
        Err(errors)
    }
}

/// Validates the sign-up form. A confirmation mismatch is reported on the
/// confirmation field only.
pub fn validate_sign_up(
    username: &str,
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> Result<Registration, FieldErrors> {
    let mut errors = FieldErrors::default();
    check_min(&mut errors, Field::Username, username, MIN_USERNAME_LEN, MSG_USERNAME_TOO_SHORT);
    check_email(&mut errors, email);
    check_min(&mut errors, Field::Password, password, MIN_PASSWORD_LEN, MSG_PASSWORD_TOO_SHORT);
    check_min(
        &mut errors,
        Field::PasswordConfirmation,
        password_confirmation,
        MIN_PASSWORD_LEN,
        MSG_PASSWORD_TOO_SHORT,
    );
    if password_confirmation != password {
        errors.insert(Field::PasswordConfirmation, MSG_CONFIRMATION_MISMATCH);
    }

    if errors.is_empty() {
        Ok(Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: password_confirmation.to_string(),
        })
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn fields(&self) -> &'static [Field] {
        match self {
            AuthMode::SignIn => &[Field::Email, Field::Password],
            AuthMode::SignUp => &[
                Field::Username,
                Field::Email,
                Field::Password,
                Field::PasswordConfirmation,
            ],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign in",
            AuthMode::SignUp => "Sign up",
        }
    }
}

/// Validated body ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPayload {
    Login(Credentials),
    Register(Registration),
}

/// Editable state of one auth screen.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    username: String,
    email: String,
    password: String,
    password_confirmation: String,
    focus: usize,
    pub show_password: bool,
    pub errors: FieldErrors,
    /// Error not tied to a field (network failure, unknown server field).
    pub form_error: Option<String>,
    pub submitting: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            password_confirmation: String::new(),
            focus: 0,
            show_password: false,
            errors: FieldErrors::default(),
            form_error: None,
            submitting: false,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.mode.fields()
    }

    pub fn focused(&self) -> Field {
        self.fields()[self.focus.min(self.fields().len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let n = self.fields().len();
        self.focus = (self.focus + n - 1) % n;
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::PasswordConfirmation => &self.password_confirmation,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::PasswordConfirmation => &mut self.password_confirmation,
        }
    }

    pub fn set_value(&mut self, field: Field, value: &str) {
        *self.value_mut(field) = value.to_string();
    }

    pub fn push_char(&mut self, c: char) {
        let field = self.focused();
        self.value_mut(field).push(c);
    }

    pub fn pop_char(&mut self) {
        let field = self.focused();
        self.value_mut(field).pop();
    }

    pub fn validate(&self) -> Result<AuthPayload, FieldErrors> {
        match self.mode {
            AuthMode::SignIn => validate_sign_in(&self.email, &self.password).map(AuthPayload::Login),
            AuthMode::SignUp => validate_sign_up(
                &self.username,
                &self.email,
                &self.password,
                &self.password_confirmation,
            )
            .map(AuthPayload::Register),
        }
    }

    /// Validates and, when valid, marks the form as submitting.
    /// Returns `None` (and records the errors) when validation fails or a
    /// submit is already running.
    pub fn begin_submit(&mut self) -> Option<AuthPayload> {
        if self.submitting {
            return None;
        }
        self.form_error = None;
        match self.validate() {
            Ok(payload) => {
                self.errors = FieldErrors::default();
                self.submitting = true;
                Some(payload)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Applies the server answer. Returns a status message on success.
    pub fn finish(&mut self, result: Result<AuthResponse, ApiError>) -> Option<String> {
        self.submitting = false;
        match result {
            Ok(resp) => {
                info!(mode = ?self.mode, "auth request accepted");
                let default = match self.mode {
                    AuthMode::SignIn => "Signed in.",
                    AuthMode::SignUp => "Account created.",
                };
                self.password.clear();
                self.password_confirmation.clear();
                Some(resp.message.unwrap_or_else(|| default.to_string()))
            }
            Err(ApiError::Validation { message, errors }) => {
                warn!(mode = ?self.mode, %message, "auth request rejected");
                let mut mapped = FieldErrors::default();
                let mut unknown = Vec::new();
                for (name, messages) in &errors {
                    let Some(first) = messages.first() else { continue };
                    match Field::from_name(name).filter(|f| self.fields().contains(f)) {
                        Some(field) => mapped.insert(field, first.clone()),
                        None => unknown.push(first.clone()),
                    }
                }
                if mapped.is_empty() && unknown.is_empty() {
                    unknown.push(message);
                }
                self.errors = mapped;
                self.form_error = (!unknown.is_empty()).then(|| unknown.join(" "));
                None
            }
            Err(err) => {
                warn!(mode = ?self.mode, error = %err, "auth request failed");
                self.form_error = Some(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn short_password_fails_with_message() {
        let errors = validate_sign_up("janedoe", "jane@example.com", "short", "short").unwrap_err();
        assert_eq!(errors.get(Field::Password), Some(MSG_PASSWORD_TOO_SHORT));
        assert_eq!(errors.get(Field::Password), Some("Password must be at least 10 characters."));
    }

    #[test]
    fn short_password_sends_nothing() {
        let mut form = AuthForm::new(AuthMode::SignUp);
        form.set_value(Field::Username, "janedoe");
        form.set_value(Field::Email, "jane@example.com");
        form.set_value(Field::Password, "short");
        form.set_value(Field::PasswordConfirmation, "short");
        assert_eq!(form.begin_submit(), None);
        assert!(!form.submitting);
        assert_eq!(form.errors.get(Field::Password), Some(MSG_PASSWORD_TOO_SHORT));
    }

    #[test]
    fn mismatch_is_attached_to_confirmation_only() {
        let errors = validate_sign_up(
            "janedoe",
            "jane@example.com",
            "correct horse battery",
            "correct horse staple",
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::PasswordConfirmation), Some(MSG_CONFIRMATION_MISMATCH));
        assert_eq!(errors.get(Field::Password), None);
    }

    #[test]
    fn valid_sign_up_produces_registration() {
        let reg = validate_sign_up(
            "janedoe",
            "jane@example.com",
            "correct horse",
            "correct horse",
        )
        .unwrap();
        assert_eq!(reg.username, "janedoe");
        assert_eq!(reg.password_confirmation, "correct horse");
    }

    #[test]
    fn username_minimum_length() {
        let errors = validate_sign_up("jane", "jane@example.com", "correct horse", "correct horse")
            .unwrap_err();
        assert_eq!(errors.get(Field::Username), Some(MSG_USERNAME_TOO_SHORT));
    }

    #[test]
    fn sign_in_checks_email_shape() {
        for bad in ["", "jane", "jane@", "@example.com", "jane@example", ".jane@example.com", "ja..ne@example.com"] {
            let errors = validate_sign_in(bad, "correct horse").unwrap_err();
            assert_eq!(errors.get(Field::Email), Some(MSG_INVALID_EMAIL), "{bad}");
        }
        for good in ["jane@example.com", "jane.doe+it@mail.example.org", "j_d@ex-ample.io"] {
            assert!(validate_sign_in(good, "correct horse").is_ok(), "{good}");
        }
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(validate_sign_in("jane@example.com", "ééééééééé").is_err());
        assert!(validate_sign_in("jane@example.com", "éééééééééé").is_ok());
    }

    #[test]
    fn focus_cycles_over_mode_fields() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        assert_eq!(form.focused(), Field::Email);
        form.focus_next();
        assert_eq!(form.focused(), Field::Password);
        form.focus_next();
        assert_eq!(form.focused(), Field::Email);
        form.focus_prev();
        assert_eq!(form.focused(), Field::Password);

        form.push_char('a');
        form.push_char('b');
        form.pop_char();
        assert_eq!(form.value(Field::Password), "a");
    }

    #[test]
    fn valid_sign_in_begins_submit_once() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        form.set_value(Field::Email, "jane@example.com");
        form.set_value(Field::Password, "correct horse");
        let payload = form.begin_submit().unwrap();
        assert_eq!(
            payload,
            AuthPayload::Login(Credentials {
                email: "jane@example.com".into(),
                password: "correct horse".into()
            })
        );
        assert!(form.submitting);
        assert_eq!(form.begin_submit(), None);
    }

    #[test]
    fn server_validation_errors_map_to_fields() {
        let mut form = AuthForm::new(AuthMode::SignUp);
        form.submitting = true;
        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), vec!["The email has already been taken.".to_string()]);
        errors.insert("captcha".to_string(), vec!["Captcha required.".to_string()]);

        let msg = form.finish(Err(ApiError::Validation {
            message: "The given data was invalid.".into(),
            errors,
        }));
        assert_eq!(msg, None);
        assert!(!form.submitting);
        assert_eq!(form.errors.get(Field::Email), Some("The email has already been taken."));
        assert_eq!(form.form_error.as_deref(), Some("Captcha required."));
    }

    #[test]
    fn transport_error_is_form_level() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        form.finish(Err(ApiError::Transport("connection refused".into())));
        assert!(form.errors.is_empty());
        assert_eq!(form.form_error.as_deref(), Some("request failed: connection refused"));
    }

    #[test]
    fn success_clears_secrets_and_reports() {
        let mut form = AuthForm::new(AuthMode::SignIn);
        form.set_value(Field::Password, "correct horse");
        let msg = form.finish(Ok(AuthResponse::default()));
        assert_eq!(msg.as_deref(), Some("Signed in."));
        assert_eq!(form.value(Field::Password), "");
    }
}
