use crate::error::AppError;

const MAX_ID_LEN: usize = 255;

/// Checks a remote object id before it is placed in a request path.
///
/// Ids issued by the platform are ASCII alphanumerics joined by `_`
/// (`tmr_...`, `pi_...`); anything else is rejected locally.
pub fn require_id(name: &str, value: Option<&str>) -> Result<String, AppError> {
    let id = value.map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(AppError::bad_request(format!("Missing required param: {name}.")));
    }
    let well_formed = id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !well_formed {
        return Err(AppError::bad_request(format!("Invalid {name}: {id}")));
    }
    Ok(id.to_string())
}
