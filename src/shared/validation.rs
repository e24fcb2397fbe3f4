//! Validation Utilities

use validator::ValidationErrors;

use super::error::AppError;

/// Convert validation errors to AppError
///
/// The message names the first failing field in alphabetical order so that
/// the same bad request always produces the same response.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                (
                    field.to_string(),
                    e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                )
            })
        })
        .collect();
    field_errors.sort();

    let message = field_errors
        .first()
        .map(|(field, message)| {
            if message.is_empty() {
                format!("{} is invalid", field)
            } else {
                message.clone()
            }
        })
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}
