//! Reversible joining of key vectors.
//!
//! Keys are vectors of strings (`vec!["job", "abc123", "status"]`).
//! Implementations are free to choose the wire separator, but joining
//! must be reversible: a component containing the separator must not be
//! confusable with a key boundary. We use the ASCII unit separator
//! (0x1F), which never appears in ids/names produced by this workspace,
//! and escape it anyway so arbitrary caller-supplied components stay
//! reversible.

const SEP: char = '\u{1f}';
const ESC: char = '\\';

fn escape_component(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if c == ESC || c == SEP {
            out.push(ESC);
        }
        out.push(c);
    }
    out
}

/// Join key components into a single reversible string.
pub fn join_key(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| escape_component(p))
        .collect::<Vec<_>>()
        .join(&SEP.to_string())
}

/// Split a joined key back into its components.
///
/// Inverse of [`join_key`]. Malformed input (a dangling escape) is
/// treated permissively: the trailing escape character is dropped.
pub fn split_key(joined: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = joined.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC {
            if let Some(&next) = chars.peek() {
                current.push(next);
                chars.next();
            }
        } else if c == SEP {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// True if `key` begins with every component of `prefix`, in order.
pub fn has_prefix(key: &[String], prefix: &[String]) -> bool {
    key.len() >= prefix.len() && key.iter().zip(prefix.iter()).all(|(a, b)| a == b)
}
