//! Login and signup forms
//!
//! Both forms are validated locally; nothing is sent while a field is
//! rejected.

use crate::api::{ApiResult, AuthApi};
use crate::auth::AuthSession;
use crate::models::{SignupRequest, User};
use crate::validation::{is_valid_email, is_valid_username, require, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "username", &self.username);
        require(&mut errors, "password", &self.password);
        errors.into_result(())
    }

    pub async fn submit<A: AuthApi>(&self, session: &AuthSession<A>) -> ApiResult<User> {
        self.validate()?;
        session.login(self.username.trim(), &self.password).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub surname: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if require(&mut errors, "username", &self.username)
            && !is_valid_username(self.username.trim())
        {
            errors.add(
                "username",
                "Use 3-30 letters, digits, dots or underscores.",
            );
        }
        if require(&mut errors, "email", &self.email) && !is_valid_email(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }
        if require(&mut errors, "password", &self.password)
            && self.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.add(
                "password",
                format!(
                    "Password must be at least {} characters.",
                    MIN_PASSWORD_LEN
                ),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", PASSWORD_MISMATCH);
        }
        require(&mut errors, "name", &self.name);
        require(&mut errors, "surname", &self.surname);

        errors.into_result(SignupRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
        })
    }

    /// Validate, then create the account
    pub async fn submit<A: AuthApi + ?Sized>(&self, api: &A) -> ApiResult<User> {
        let request = self.validate()?;
        let user = api.signup(&request).await?;
        tracing::info!(username = %user.username, "Account created");
        Ok(user)
    }
}
