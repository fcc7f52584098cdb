use serde::Deserialize;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name and email are required")]
    MissingField,
}

/// Body of `POST /api/users` as received. Both fields are optional here so
/// that absence is reported through `ValidationError` rather than serde.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A create request that passed presence checks.
#[derive(Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Presence-only check: both fields set and non-empty. Email syntax is left
/// to the client.
pub fn validate_new_user(req: CreateUserRequest) -> Result<NewUser, ValidationError> {
    match (req.name, req.email) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
            Ok(NewUser { name, email })
        }
        _ => Err(ValidationError::MissingField),
    }
}
