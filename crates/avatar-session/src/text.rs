//! Reply canonicalization.

/// Normalize a reply by splitting it into sentences on terminal
/// punctuation and capitalizing each sentence.
///
/// This is cosmetic — completion backends occasionally return lowercase
/// sentence starts, especially for short replies. Punctuation is kept
/// with its sentence and fragments without terminal punctuation survive
/// as-is.
#[must_use]
pub fn normalize_reply(text: &str) -> String {
    let mut sentences: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | '…') {
            flush_sentence(&mut sentences, &mut current);
        }
    }
    flush_sentence(&mut sentences, &mut current);

    sentences.join(" ")
}

fn flush_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(capitalize(trimmed));
    }
    current.clear();
}

/// Uppercase the first character.
fn capitalize(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_sentence() {
        assert_eq!(
            normalize_reply("hello there. nice to meet you! how are you?"),
            "Hello there. Nice to meet you! How are you?"
        );
    }

    #[test]
    fn keeps_fragment_without_terminal_punctuation() {
        assert_eq!(normalize_reply("sure, why not"), "Sure, why not");
    }

    #[test]
    fn collapses_inter_sentence_whitespace() {
        assert_eq!(normalize_reply("one.   two.\n three."), "One. Two. Three.");
    }

    #[test]
    fn already_normalized_text_is_unchanged() {
        assert_eq!(normalize_reply("Hello there."), "Hello there.");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_reply(""), "");
        assert_eq!(normalize_reply("   "), "");
    }

    #[test]
    fn non_ascii_first_letter_is_uppercased() {
        assert_eq!(normalize_reply("évidemment."), "Évidemment.");
    }
}
