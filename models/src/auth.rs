use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::ValidationError;
use crate::user::UserResponse;

/// Column width of `name` and `email` in storage.
pub const MAX_FIELD_LENGTH: usize = 255;

/// Body of `auth.register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check field shapes.
    ///
    /// # Errors
    /// * `ValidationError` - naming the first offending field
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Registration form with password confirmation, as filled in by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Validate the form and drop the confirmation field.
    ///
    /// # Errors
    /// * `ValidationError` on `confirmPassword` when the passwords differ,
    ///   otherwise whatever `RegisterRequest::validate` reports
    pub fn into_request(self) -> Result<RegisterRequest, ValidationError> {
        let request = RegisterRequest {
            name: self.name,
            email: self.email,
            password: self.password,
        };
        request.validate()?;

        if request.password != self.confirm_password {
            return Err(ValidationError::new(
                "confirmPassword",
                "Passwords do not match",
            ));
        }

        Ok(request)
    }
}

/// Body of `auth.login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Body of `auth.refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl RefreshRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_token("refreshToken", &self.refresh_token)
    }
}

/// Body of `auth.logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

impl LogoutRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_token("refreshToken", &self.refresh_token)
    }
}

/// Result of `auth.refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of `auth.register` and `auth.login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "Name is required"));
    }
    if name.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::new(
            "name",
            format!("Name must be at most {} characters", MAX_FIELD_LENGTH),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_FIELD_LENGTH {
        return Err(ValidationError::new(
            "email",
            format!("Email must be at most {} characters", MAX_FIELD_LENGTH),
        ));
    }
    email_address::EmailAddress::from_str(email)
        .map(|_| ())
        .map_err(|e| ValidationError::new("email", format!("Invalid email: {}", e)))
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "Password is required"));
    }
    Ok(())
}

fn validate_token(field: &str, token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::new(field, "Token is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_valid() {
        let request = RegisterRequest::new("Alice", "alice@x.com", "Secret123!");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_blank_name() {
        let request = RegisterRequest::new("   ", "alice@x.com", "Secret123!");
        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let request = RegisterRequest::new("Alice", "not-an-email", "Secret123!");
        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "email");
    }

    #[test]
    fn test_register_request_rejects_long_name() {
        let request = RegisterRequest::new("a".repeat(256), "alice@x.com", "Secret123!");
        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_login_request_rejects_empty_password() {
        let request = LoginRequest::new("alice@x.com", "");
        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn test_register_form_password_mismatch() {
        let form = RegisterForm {
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "Secret123!".to_string(),
            confirm_password: "Secret124!".to_string(),
        };

        let err = form.into_request().unwrap_err();
        assert_eq!(err.field, "confirmPassword");
        assert_eq!(err.message, "Passwords do not match");
    }

    #[test]
    fn test_register_form_into_request() {
        let form = RegisterForm {
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "Secret123!".to_string(),
            confirm_password: "Secret123!".to_string(),
        };

        let request = form.into_request().unwrap();
        assert_eq!(request, RegisterRequest::new("Alice", "alice@x.com", "Secret123!"));
    }

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let request: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(request.refresh_token, "abc");
        assert!(request.validate().is_ok());

        let blank = RefreshRequest {
            refresh_token: " ".to_string(),
        };
        assert_eq!(blank.validate().unwrap_err().field, "refreshToken");
    }
}
