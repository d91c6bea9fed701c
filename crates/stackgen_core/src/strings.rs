//! Define shared identifier helpers (policy + pure helpers).
//!
//! Generated programs name locals, lambda parameters and properties after source-level identifiers. These helpers
//! map arbitrary source names onto identifiers every C-family target accepts.
//!
//! ## Notes
//! - **Legal identifier**: starts with a letter or `_`, continues with letters, digits or `_` (Unicode letters
//!   included).
//! - Keyword escaping is target-specific and lives with the backend; see [`crate::lang::csharp_keywords`].

/// Upper-case the first character of `s`, leaving the rest untouched.
///
/// ## Examples
/// ```rust
/// use stackgen_core::strings::title;
///
/// assert_eq!(title("websiteUrl"), "WebsiteUrl");
/// assert_eq!(title(""), "");
/// ```
pub fn title(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Check whether `name` is a legal identifier (ignoring keywords).
pub fn is_legal_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => chars.all(is_identifier_char),
        _ => false,
    }
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Map an arbitrary source name onto a legal identifier.
///
/// Illegal characters become `_`; a name starting with a digit gets a leading `_`; the empty name becomes `_`.
///
/// ## Examples
/// ```rust
/// use stackgen_core::strings::clean_name;
///
/// assert_eq!(clean_name("site-bucket"), "site_bucket");
/// assert_eq!(clean_name("2fa"), "_2fa");
/// assert_eq!(clean_name("ok"), "ok");
/// ```
pub fn clean_name(name: &str) -> String {
    if is_legal_identifier(name) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 1);
    if name.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        out.push('_');
    }
    out.extend(name.chars().map(|c| if is_identifier_char(c) { c } else { '_' }));
    out
}

/// Produce a name based on `base` that `taken` rejects, by appending the smallest numeric suffix starting at 2.
///
/// ## Examples
/// ```rust
/// use stackgen_core::strings::unique_name;
///
/// let taken = ["id", "id2"];
/// assert_eq!(unique_name("id", |n| taken.contains(&n)), "id3");
/// assert_eq!(unique_name("arn", |n| taken.contains(&n)), "arn");
/// ```
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_multibyte() {
        assert_eq!(title("éclair"), "Éclair");
    }

    #[test]
    fn test_title_already_upper() {
        assert_eq!(title("Id"), "Id");
    }

    #[test]
    fn test_clean_name_keeps_underscores() {
        assert_eq!(clean_name("_private"), "_private");
    }

    #[test]
    fn test_clean_name_empty() {
        assert_eq!(clean_name(""), "_");
    }

    #[test]
    fn test_clean_name_dots_and_spaces() {
        assert_eq!(clean_name("a.b c"), "a_b_c");
    }

    #[test]
    fn test_is_legal_identifier() {
        assert!(is_legal_identifier("siteBucket"));
        assert!(is_legal_identifier("_x1"));
        assert!(!is_legal_identifier("1x"));
        assert!(!is_legal_identifier("a-b"));
        assert!(!is_legal_identifier(""));
    }

    #[test]
    fn test_unique_name_first_free() {
        assert_eq!(unique_name("v", |_| false), "v");
    }
}
