use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::{ErrorKind, N8nError};

/// Decodes a success response body.
///
/// An empty body is read as JSON `null` instead of being parsed; a non-empty
/// body that is not valid JSON for `T` is an `ApiError`.
pub(crate) fn decode_success<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, N8nError> {
    if body.trim().is_empty() {
        return serde_json::from_value(JsonValue::Null).map_err(|err| {
            N8nError::new(
                ErrorKind::ApiError,
                format!("expected a response body but the server returned none: {err}"),
            )
            .with_status(status)
        });
    }

    serde_json::from_str(body).map_err(|err| {
        N8nError::new(
            ErrorKind::ApiError,
            format!("invalid response JSON: {err}; body: {}", truncate(body, 512)),
        )
        .with_status(status)
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
