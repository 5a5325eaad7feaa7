//! POSIX shell quoting.
//!
//! Every value interpolated into a command sent to a target goes through
//! [`quote`], including the staging directory and the inlined script body
//! of a remote file write.

/// Single-quote `value` for a POSIX shell.
///
/// The result is one shell word that expands to exactly `value`. Embedded
/// single quotes become `'\''`.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}
