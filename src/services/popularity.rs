//! Author popularity classification

/// An author is popular when the name starts with `j` or `J`.
///
/// Only those two characters count; no case folding of other letters.
pub fn is_popular(author_name: &str) -> bool {
    matches!(author_name.chars().next(), Some('j' | 'J'))
}
