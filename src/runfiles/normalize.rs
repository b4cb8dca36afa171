//! Lexical join + normalization for runfile paths.
//!
//! Runfile keys always use `/`, so normalization works on strings rather than
//! on platform `Path` components.

/// Join path segments and collapse `.`, `name/..`, and repeated separators.
///
/// A segment starting with `/` discards everything joined before it. Leading
/// `..` components of a relative path are kept. An empty result becomes `.`.
/// Returns `None` when no segments were given.
pub(crate) fn normalize_join<I, S>(segments: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut absolute = false;
    let mut parts: Vec<String> = Vec::new();
    let mut seen_any = false;

    for segment in segments {
        seen_any = true;
        let segment = segment.as_ref();
        if segment.starts_with('/') {
            absolute = true;
            parts.clear();
        }
        for piece in segment.split('/') {
            match piece {
                "" | "." => {}
                ".." => {
                    if parts.last().is_some_and(|last| last != "..") {
                        parts.pop();
                    } else if !absolute {
                        parts.push("..".to_string());
                    }
                }
                name => parts.push(name.to_string()),
            }
        }
    }

    if !seen_any {
        return None;
    }

    let joined = parts.join("/");
    Some(match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    })
}
