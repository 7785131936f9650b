mod introspect_tests;

/// Whitespace-insensitive containment check on generated code
pub fn contains_pattern(code: &str, pattern: &str) -> bool {
    let normalize = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    normalize(code).contains(&normalize(pattern))
}
