/// Lowercase ASCII slug: alphanumeric runs joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '\'' || c == '\u{2019}' {
            // "Don't" -> "dont"
            continue;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  AI & NLP in 2024 "), "ai-nlp-in-2024");
        assert_eq!(slugify("Don't Panic"), "dont-panic");
        assert_eq!(slugify("Café culture"), "caf-culture");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn validates_slugs() {
        assert!(is_valid("ai-nlp-2024"));
        assert!(!is_valid("AI"));
        assert!(!is_valid("-lead"));
        assert!(!is_valid("double--hyphen"));
        assert!(!is_valid(""));
    }
}
