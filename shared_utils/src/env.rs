/// Reads an environment variable that may legitimately be absent.
///
/// Returns `None` when unset, not valid unicode, or blank after trimming.
pub fn optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
