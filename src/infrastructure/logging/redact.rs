//! Keeps credentials out of log lines.

const REDACTED: &str = "[REDACTED]";

/// Placeholder for a secret value: shows whether it is set, never its content.
pub fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        REDACTED
    }
}

/// Replace every occurrence of each non-empty secret in `message`.
pub fn scrub(message: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(message.to_string(), |acc, secret| {
            acc.replace(secret, REDACTED)
        })
}
