#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx) {
        Some(b'#') => true,
        // `--` only opens a comment when followed by whitespace or end of input.
        Some(b'-') => {
            bytes.get(idx + 1) == Some(&b'-')
                && bytes.get(idx + 2).is_none_or(u8::is_ascii_whitespace)
        }
        _ => false,
    }
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Count `?` parameter markers outside literals, quoted identifiers and comments.
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    let mut state = State::Normal;
    let mut count = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'?' => count += 1,
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if matches!(state, State::SingleQuoted) {
                    b'\''
                } else {
                    b'"'
                };
                if b == b'\\' {
                    idx += 1; // skip escaped character
                } else if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        idx += 1; // skip doubled quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_plain_markers() {
        assert_eq!(count_placeholders("insert into t values (?, ?, ?)"), 3);
        assert_eq!(count_placeholders("select 1"), 0);
    }

    #[test]
    fn skips_literals_and_identifiers() {
        let sql = r#"select '?', "?", `a?b` from t where a = ? and b = 'it''s ?' and c = 'x\'?'"#;
        assert_eq!(count_placeholders(sql), 1);
    }

    #[test]
    fn skips_comments() {
        let sql = "select ? # ?\n, ? -- ?\n, /* ? */ ? from t";
        assert_eq!(count_placeholders(sql), 3);
    }

    #[test]
    fn double_dash_without_space_is_not_a_comment() {
        assert_eq!(count_placeholders("select 1--?"), 1);
    }
}
