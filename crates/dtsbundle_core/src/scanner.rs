//! Lexical classification of byte offsets in declaration source text.
//!
//! Declaration files are never parsed. Import sentences are found with a
//! pattern match, and every match is checked here first so that specifiers
//! quoted in strings or shown as examples in doc comments are left alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    /// Holds the opening quote byte: `'`, `"` or `` ` ``
    String(u8),
    LineComment,
    BlockComment,
}

/// Returns true when `offset` falls inside a string literal or a comment.
///
/// Scans every byte before `offset` left to right. Nothing inside an active
/// string or comment can open another one. Quote characters preceded by a
/// backslash do not close a string.
pub fn is_in_string_or_comment(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    let end = offset.min(bytes.len());
    let mut state = LexState::Code;
    let mut i = 0;

    while i < end {
        let c = bytes[i];
        match state {
            LexState::String(quote) => {
                if c == b'\\' {
                    i += 2;
                    continue;
                }
                if c == quote {
                    state = LexState::Code;
                }
            }
            LexState::LineComment => {
                if c == b'\n' {
                    state = LexState::Code;
                }
            }
            LexState::BlockComment => {
                if c == b'*' && i + 1 < end && bytes[i + 1] == b'/' {
                    state = LexState::Code;
                    i += 2;
                    continue;
                }
            }
            LexState::Code => match c {
                b'"' | b'\'' | b'`' => state = LexState::String(c),
                b'/' if i + 1 < end => match bytes[i + 1] {
                    b'/' => {
                        state = LexState::LineComment;
                        i += 2;
                        continue;
                    }
                    b'*' => {
                        state = LexState::BlockComment;
                        i += 2;
                        continue;
                    }
                    _ => {}
                },
                _ => {}
            },
        }
        i += 1;
    }

    state != LexState::Code
}
