//! Character-level helpers shared by the lexers.

/// Whether the char at `index` is escaped by an odd run of backslashes
/// immediately before it.
pub fn is_escaped(text: &[char], index: usize) -> bool {
    let backslashes = text[..index.min(text.len())]
        .iter()
        .rev()
        .take_while(|&&c| c == '\\')
        .count();
    backslashes % 2 == 1
}

/// Length of the run of `ch` starting at `index`.
pub fn char_run(text: &[char], index: usize, ch: char) -> usize {
    text.get(index..)
        .map(|rest| rest.iter().take_while(|&&c| c == ch).count())
        .unwrap_or(0)
}

/// Whether `token` occurs at `index`.
pub fn starts_with_at(text: &[char], index: usize, token: &[char]) -> bool {
    text.get(index..index + token.len())
        .is_some_and(|window| window == token)
}

/// Chars that end a line, matching the buffer's line model (ropey with
/// unicode line breaks).
pub fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Length of the line break starting at `index`; `\r\n` counts as one break.
pub fn line_break_len(text: &[char], index: usize) -> Option<usize> {
    match text.get(index)? {
        '\r' if text.get(index + 1) == Some(&'\n') => Some(2),
        &c if is_line_break(c) => Some(1),
        _ => None,
    }
}
