// Validation utilities for request fields

/// Trim an optional field; blank becomes `None`
pub fn trim_optional_field(field: Option<&str>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Like `trim_optional_field` but keeps inner formatting; only checks for blankness.
/// Email bodies rely on their leading/trailing newlines.
pub fn non_blank_field(field: Option<&str>) -> Option<String> {
    field
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
