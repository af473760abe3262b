// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const REQUIRED_MESSAGE: &str = "Email and password are required.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const UNVERIFIED_TOKEN_MESSAGE: &str = "Session token could not be verified.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    pub const fn next(self) -> Self {
        match self {
            Self::Email => Self::Password,
            Self::Password => Self::Email,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// Keep the password out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// `expires_in` is the server's token lifetime in seconds.
    Success {
        token: String,
        expires_in: Option<u64>,
    },
    /// `message` is the server's, when it sent one.
    Rejected { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn field_mut(&mut self, field: LoginField) -> &mut String {
        match field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, ch: char) {
        self.field_mut(self.focus).push(ch);
    }

    pub fn pop_char(&mut self) {
        self.field_mut(self.focus).pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Validates the form. Empty fields never produce credentials.
    pub fn submit(&mut self) -> Option<Credentials> {
        if self.submitting {
            return None;
        }
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            self.error = Some(REQUIRED_MESSAGE.to_owned());
            return None;
        }
        self.error = None;
        self.submitting = true;
        Some(Credentials {
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }

    /// Returns the token and its lifetime on success. The password is
    /// cleared either way.
    pub fn finish(&mut self, outcome: LoginOutcome) -> Option<(String, Option<u64>)> {
        self.submitting = false;
        self.password.clear();
        match outcome {
            LoginOutcome::Success { token, expires_in } if !token.trim().is_empty() => {
                self.error = None;
                Some((token, expires_in))
            }
            LoginOutcome::Success { .. } => {
                self.error = Some(LOGIN_FAILED_MESSAGE.to_owned());
                None
            }
            LoginOutcome::Rejected { message } => {
                self.error = Some(
                    message
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_owned()),
                );
                None
            }
        }
    }

    pub fn masked_password(&self) -> String {
        "•".repeat(self.password.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::{LOGIN_FAILED_MESSAGE, LoginField, LoginForm, LoginOutcome, REQUIRED_MESSAGE};

    fn filled(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_owned(),
            password: password.to_owned(),
            ..LoginForm::default()
        }
    }

    #[test]
    fn empty_fields_are_rejected_locally() {
        for (email, password) in [("", "pw"), ("  ", "pw"), ("a@b.c", ""), ("", "")] {
            let mut form = filled(email, password);
            assert!(form.submit().is_none());
            assert_eq!(form.error.as_deref(), Some(REQUIRED_MESSAGE));
            assert!(!form.submitting);
        }
    }

    #[test]
    fn submit_trims_email_and_blocks_double_submit() {
        let mut form = filled(" a@b.c ", "pw");
        let credentials = form.submit().expect("credentials");
        assert_eq!(credentials.email, "a@b.c");
        assert!(form.submit().is_none());
        assert!(!format!("{credentials:?}").contains("pw\""));
    }

    #[test]
    fn rejection_surfaces_server_message_or_default() {
        let mut form = filled("a@b.c", "pw");
        form.submit();
        let token = form.finish(LoginOutcome::Rejected {
            message: Some("Invalid credentials".to_owned()),
        });
        assert!(token.is_none());
        assert_eq!(form.error.as_deref(), Some("Invalid credentials"));
        assert!(form.password.is_empty());

        form.password = "pw".to_owned();
        form.submit();
        form.finish(LoginOutcome::Rejected { message: None });
        assert_eq!(form.error.as_deref(), Some(LOGIN_FAILED_MESSAGE));
    }

    #[test]
    fn success_returns_token() {
        let mut form = filled("a@b.c", "pw");
        form.submit();
        let issued = form.finish(LoginOutcome::Success {
            token: "t0k".to_owned(),
            expires_in: Some(60),
        });
        assert_eq!(issued, Some(("t0k".to_owned(), Some(60))));
        assert_eq!(form.error, None);

        form.submit();
        let blank = form.finish(LoginOutcome::Success {
            token: " ".to_owned(),
            expires_in: None,
        });
        assert_eq!(blank, None);
        assert_eq!(form.error.as_deref(), Some(LOGIN_FAILED_MESSAGE));
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = LoginForm::default();
        form.push_char('a');
        form.focus_next();
        assert_eq!(form.focus, LoginField::Password);
        form.push_char('x');
        form.push_char('y');
        form.pop_char();
        assert_eq!(form.email, "a");
        assert_eq!(form.password, "x");
        assert_eq!(form.masked_password(), "•");
    }
}
