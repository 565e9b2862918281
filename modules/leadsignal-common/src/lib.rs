pub mod canonical_key;
pub mod config;
pub mod error;

pub use canonical_key::{CanonicalKey, CanonicalKeyKind};
pub use config::Config;
pub use error::CommonError;

/// Normalize a name into a URL-safe slug: lowercase, strip non-alphanumeric
/// (keeping spaces), collapse whitespace, replace spaces with hyphens.
///
/// ```
/// assert_eq!(leadsignal_common::slugify("Acme Robotics, Inc."), "acme-robotics-inc");
/// assert_eq!(leadsignal_common::slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == ' ' { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<&str>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(slugify("Acme, Inc."), "acme-inc");
        assert_eq!(slugify("Lake   St."), "lake-st");
    }

    #[test]
    fn slugify_empty_input_is_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }
}
