//! String sanitation for log writes.

/// Collapse tabs, line breaks, and repeated spaces into single spaces and
/// trim the ends.
///
/// Applied to every string before it is written to a CSV log, and useful
/// for prompt fragments assembled from multi-line literals.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = true; // leading whitespace is dropped
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_tabs_newlines_and_runs_of_spaces() {
        assert_eq!(sanitize("a\tb\n\nc   d"), "a b c d");
    }

    #[test]
    fn trims_both_ends() {
        assert_eq!(sanitize("  hello world \n"), "hello world");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(sanitize("My name is Alex."), "My name is Alex.");
    }
}
