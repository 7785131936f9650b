//! Procedure path convention: `${prefix}[/kebab-scope]/kebab-name`

use heck::ToKebabCase;

/// Normalize a route prefix to `""` or `/segment[/segment..]`
pub fn normalize_prefix(prefix: &str) -> Result<String, String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.split('/').any(|segment| segment.is_empty()) {
        return Err("empty path segment".to_string());
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
        return Err("must not contain whitespace, '?' or '#'".to_string());
    }
    Ok(format!("/{trimmed}"))
}

/// Path of the procedure `name` (dot-separated segments) under `prefix`
pub fn procedure_path(prefix: &str, name: &str) -> Result<String, String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    let mut path = prefix.to_string();
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err("empty segment".to_string());
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!(
                "segment '{segment}' may only contain ASCII letters, digits, '_' and '-'"
            ));
        }
        path.push('/');
        path.push_str(&segment.to_kebab_case());
    }
    Ok(path)
}

/// Where the `AppDefinition` document is served
pub fn definition_path(prefix: &str) -> String {
    format!("{prefix}/__definition")
}
