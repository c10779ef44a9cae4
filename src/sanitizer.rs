/// Placeholder used whenever a name has nothing usable left in it.
pub const UNKNOWN_NAME: &str = "unknown";

/// Characters that may not appear in a file or folder name on any platform we write to.
const INVALID_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

// Strict table: used for folder and file names
pub fn sanitize_filename(name: &str) -> String {
    if name.trim().is_empty() {
        return UNKNOWN_NAME.to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if INVALID_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    sanitized.trim().to_string()
}

// Cosmetic table: used for the human-facing display name
pub fn sanitize_display_name(name: &str) -> String {
    let sanitized = map_display_chars(name);
    if sanitized.trim().is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        sanitized
    }
}

/// Cosmetic table without the `"unknown"` fallback, for callers with their own fallback chain.
pub(crate) fn map_display_chars(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ':' => sanitized.push_str(" -"),
            '"' => sanitized.push('\''),
            '|' | '/' | '\\' => sanitized.push('-'),
            '<' | '>' | '?' | '*' => {}
            c if c.is_control() => {}
            c => sanitized.push(c),
        }
    }
    sanitized
}

pub fn contains_invalid_chars(name: &str) -> bool {
    name.chars().any(|c| INVALID_NAME_CHARS.contains(&c))
}
