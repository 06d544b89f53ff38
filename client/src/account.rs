//! Login, signup, logout and profile editing on top of the session store.

use crate::{
    detail::HOME_PATH,
    error::ClientError,
    http::{ApiClient, LOGIN_PATH},
};
use blog_models::{NewUser, User};
use chrono::Utc;
use std::borrow::Cow;
use tracing::info;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct SignupForm {
    #[validate(length(min = 3, message = "Username too short"))]
    pub username: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileForm {
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3-20 characters"),
        custom(function = "username_chars")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email format"), custom(function = "lowercase"))]
    pub email: String,
    /// `None` keeps the current password.
    #[validate(
        length(min = 6, max = 50, message = "Password must be 6-50 characters"),
        custom(function = "password_strength")
    )]
    pub password: Option<String>,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn username_chars(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(invalid(
            "username_chars",
            "Username can only contain letters, numbers, underscores",
        ))
    }
}

fn lowercase(email: &str) -> Result<(), ValidationError> {
    if email.chars().any(char::is_uppercase) {
        Err(invalid("lowercase", "Email must be lowercase"))
    } else {
        Ok(())
    }
}

fn password_strength(password: &str) -> Result<(), ValidationError> {
    let rules: [(fn(&char) -> bool, &'static str); 4] = [
        (char::is_ascii_uppercase, "Password must contain at least one uppercase letter"),
        (char::is_ascii_lowercase, "Password must contain at least one lowercase letter"),
        (char::is_ascii_digit, "Password must contain at least one number"),
        (
            |c: &char| !c.is_ascii_alphanumeric(),
            "Password must contain at least one special character",
        ),
    ];

    for (rule, message) in rules {
        if !password.chars().any(|c| rule(&c)) {
            return Err(invalid("password_strength", message));
        }
    }
    Ok(())
}

/// Account screens' behaviour, bound to one API client and its session.
#[derive(Clone)]
pub struct Accounts {
    api: ApiClient,
}

impl Accounts {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn fail<T>(&self, err: ClientError) -> Result<T, ClientError> {
        self.api.notifier().surface(&err);
        Err(err)
    }

    /// Log in and navigate to `return_to` (the location a guard redirected
    /// from) or home.
    pub async fn login(
        &self,
        form: &LoginForm,
        return_to: Option<&str>,
    ) -> Result<User, ClientError> {
        if let Err(e) = form.validate() {
            return self.fail(e.into());
        }

        let auth = match self.api.login(form.email.trim(), &form.password).await {
            Ok(auth) => auth,
            Err(e) => return self.fail(e),
        };
        self.api.session().login(auth.user.clone(), &auth.token)?;

        info!("logged in as {}", auth.user.email);
        self.api.notifier().success("Logged in successfully!");
        self.api.notifier().navigate(return_to.unwrap_or(HOME_PATH));
        Ok(auth.user)
    }

    /// Register a new account, then log it in.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, ClientError> {
        if let Err(e) = form.validate() {
            return self.fail(e.into());
        }

        let email = form.email.trim().to_lowercase();
        match self.api.users_by_email(&email).await {
            Ok(existing) if !existing.is_empty() => {
                return self.fail(ClientError::Validation("Email is already registered".into()));
            }
            Ok(_) => {}
            Err(e) => return self.fail(e),
        }

        let new_user = NewUser {
            username: form.username.trim().to_string(),
            email: email.clone(),
            password: form.password.clone(),
            role: None,
            created_at: None,
        };
        if let Err(e) = self.api.create_user(&new_user).await {
            return self.fail(e);
        }

        let auth = match self.api.login(&email, &form.password).await {
            Ok(auth) => auth,
            Err(e) => return self.fail(e),
        };
        self.api.session().login(auth.user.clone(), &auth.token)?;

        info!("signed up {}", auth.user.email);
        self.api.notifier().success("Signed up successfully!");
        self.api.notifier().navigate(HOME_PATH);
        Ok(auth.user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.api.session().logout()?;
        self.api.notifier().success("Logged out");
        self.api.notifier().navigate(LOGIN_PATH);
        Ok(())
    }

    /// Save profile edits for the current user and refresh the session copy.
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<User, ClientError> {
        let Some(current) = self.api.session().current_user() else {
            return self.fail(ClientError::Unauthenticated);
        };
        if let Err(e) = form.validate() {
            return self.fail(e.into());
        }

        let updated = User {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form
                .password
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| current.password.clone()),
            updated_at: Some(Utc::now()),
            ..current
        };

        let saved = match self.api.replace_user(&updated).await {
            Ok(saved) => saved,
            Err(e) => return self.fail(e),
        };
        self.api.session().update_user(saved.clone())?;

        self.api.notifier().success("Profile updated successfully!");
        Ok(saved)
    }
}
