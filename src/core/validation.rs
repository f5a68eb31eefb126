//! Validation for caller-supplied identifiers
//!
//! Identifiers name logical channels and become path components of
//! storage keys, so anything that could escape the identifier's own
//! namespace is rejected up front.

/// Validate a message identifier
///
/// Identifiers must be non-empty and must not contain path separators or
/// NUL bytes, since they are embedded in storage keys of the form
/// `identifier/0000000001`.
pub fn validate_identifier(identifier: &str) -> Result<(), String> {
    if identifier.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if identifier.contains('/') || identifier.contains('\\') {
        return Err(format!(
            "Identifier '{}' cannot contain path separators",
            identifier
        ));
    }

    if identifier.contains('\0') {
        return Err("Identifier cannot contain NUL bytes".to_string());
    }

    Ok(())
}
