//! POSIX shell quoting

/// Wrap a string in single quotes so a POSIX shell reads it as one literal word.
///
/// Embedded single quotes are closed, emitted inside double quotes and reopened,
/// so `p'q` becomes `'p'"'"'q'`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}
