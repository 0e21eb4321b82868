use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEPARATOR: Regex = Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex");
    static ref WILDCARD_SEPARATOR: Regex = Regex::new(r"[^a-zA-Z0-9*?]+").expect("valid regex");
}

/// Split text on runs of non-alphanumeric characters and lowercase each piece.
/// Order and duplicates are preserved; empty pieces are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    split_lower(&SEPARATOR, text)
}

/// Same as [`tokenize`] but keeps `*` and `?` inside tokens so wildcard
/// patterns survive intact.
pub fn tokenize_wildcard(text: &str) -> Vec<String> {
    split_lower(&WILDCARD_SEPARATOR, text)
}

fn split_lower(re: &Regex, text: &str) -> Vec<String> {
    re.split(text)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Number of whitespace-separated words. This is the length used for
/// document length normalization, not the token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation() {
        assert_eq!(tokenize("Test string."), vec!["test", "string"]);
        assert_eq!(tokenize("I'm 23 years old."), vec!["i", "m", "23", "years", "old"]);
        assert_eq!(tokenize("3d!e-fg."), vec!["3d", "e", "fg"]);
    }

    #[test]
    fn empty_and_separator_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" ,.;- ").is_empty());
    }

    #[test]
    fn keeps_wildcards() {
        assert_eq!(tokenize_wildcard("Test string."), vec!["test", "string"]);
        assert_eq!(tokenize_wildcard("W?ld*rd."), vec!["w?ld*rd"]);
        assert_eq!(tokenize_wildcard("*me ?? *."), vec!["*me", "??", "*"]);
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count("My name is John."), 4);
        assert_eq!(word_count("  to be  or not    to be"), 6);
        assert_eq!(word_count("Document A: This is a hat. This is a cat."), 10);
        assert_eq!(word_count(""), 0);
    }
}
