/// Longest slug produced by [`slugify`]
pub const MAX_SLUG_LEN: usize = 60;

/// Turn a community name into a URL slug.
///
/// Lowercases, drops everything outside `[a-z0-9_-]` and whitespace, turns
/// each run of whitespace and dashes into a single `-`, and caps the result
/// at [`MAX_SLUG_LEN`] characters.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for ch in lowered.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(ch);
        }
    }
    if pending_dash {
        slug.push('-');
    }

    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// Community names are letters, digits, dashes and underscores only
pub fn is_valid_community_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
