use crate::server::response::ApiError;

const MAX_NAME_LEN: usize = 64;
const MAX_TITLE_LEN: usize = 100;
const MAX_PASSWORD_LEN: usize = 128;

fn validate_text(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(format!("{field} cannot exceed {max_len} characters"));
    }
    if value.chars().any(char::is_control) {
        return Err(format!("{field} cannot contain control characters"));
    }
    Ok(())
}

pub fn validate_user_name(name: &str) -> Result<(), ApiError> {
    validate_text(name, "User name", MAX_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    validate_text(title, "Title", MAX_TITLE_LEN).map_err(ApiError::bad_request)
}

/// Card passwords are optional, but a configured one must be usable.
pub fn validate_card_password(password: Option<&str>, field: &str) -> Result<(), ApiError> {
    match password {
        None => Ok(()),
        Some(p) if p.is_empty() => Err(ApiError::bad_request(format!(
            "{field} cannot be empty; omit it to leave the gate open"
        ))),
        Some(p) if p.chars().count() > MAX_PASSWORD_LEN => Err(ApiError::bad_request(format!(
            "{field} cannot exceed {MAX_PASSWORD_LEN} characters"
        ))),
        Some(_) => Ok(()),
    }
}
