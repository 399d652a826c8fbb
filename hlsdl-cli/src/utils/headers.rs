use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::error::AppError;

/// Parse a header string in format "Name: Value"
pub fn parse_header(header_str: &str) -> Result<(HeaderName, HeaderValue), AppError> {
    // The first colon separates name and value
    let Some((name, value)) = header_str.split_once(':') else {
        return Err(AppError::InvalidInput(format!(
            "invalid header '{header_str}', expected 'Name: Value'"
        )));
    };
    let (name, value) = (name.trim(), value.trim());

    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| AppError::InvalidInput(format!("invalid header name '{name}'")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| AppError::InvalidInput(format!("invalid value for header '{name}'")))?;

    Ok((header_name, header_value))
}

/// Parse a collection of header strings; later entries replace earlier ones.
pub fn parse_headers(header_strings: &[String]) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for header_str in header_strings {
        let (name, value) = parse_header(header_str)?;
        debug!("Adding header: {}", name);
        headers.insert(name, value);
    }
    Ok(headers)
}
