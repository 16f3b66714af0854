//! Small display helpers.

/// One-line preview of `text`.
///
/// Takes the first line. A line longer than `limit` bytes is rebuilt from
/// whole words up to twice that length and gets a `...` suffix; if not a
/// single word fits it is cut at `limit`. A short line loses one trailing
/// punctuation character.
pub fn short_text(text: &str, limit: usize) -> String {
    let line = text.split('\n').next().unwrap_or_default();

    if line.len() > limit {
        let mut kept: Vec<&str> = Vec::new();
        let mut kept_len = 0;
        for word in line.split(' ') {
            let joined_len = kept_len + kept.len().saturating_sub(1);
            if joined_len + word.len() <= limit * 2 {
                kept_len += word.len();
                kept.push(word);
            }
        }

        if kept.is_empty() {
            return format!("{}...", truncate_at_boundary(line, limit));
        }
        return format!("{}...", kept.join(" "));
    }

    match line.chars().last() {
        Some(last) if last.is_ascii_punctuation() => line[..line.len() - 1].to_string(),
        _ => line.to_string(),
    }
}

fn truncate_at_boundary(text: &str, limit: usize) -> &str {
    let mut end = limit.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
