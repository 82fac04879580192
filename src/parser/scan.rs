//! Depth-aware scanning over raw statement text.
//!
//! Quoted text (either quote style) is skipped entirely, so delimiters and
//! keywords inside string literals are never seen.

use super::statement::SetOperator;

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters outside quoted literals, with their byte offsets
fn unquoted(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut quote: Option<char> = None;
    text.char_indices().filter(move |&(_, c)| match quote {
        Some(q) => {
            if c == q {
                quote = None;
            }
            false
        }
        None if c == '\'' || c == '"' => {
            quote = Some(c);
            false
        }
        None => true,
    })
}

/// Unquoted characters at parenthesis depth 0 (parentheses themselves excluded)
fn top_level(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut depth = 0usize;
    unquoted(text).filter(move |&(_, c)| match c {
        '(' => {
            depth += 1;
            false
        }
        ')' => {
            depth = depth.saturating_sub(1);
            false
        }
        _ => depth == 0,
    })
}

/// Offset of the `)` closing a parenthesis opened just before `text`.
pub fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in unquoted(text) {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in top_level(text) {
        if c == separator {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Splits a script into statements on top-level `;`, dropping empty pieces.
#[must_use]
pub fn split_statements(script: &str) -> Vec<String> {
    split_top_level(script, ';')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the keyword `word` starts at byte `i` as a whole word
fn word_at(text: &str, i: usize, word: &str) -> bool {
    let Some(candidate) = text.get(i..i + word.len()) else {
        return false;
    };
    candidate.eq_ignore_ascii_case(word)
        && text[..i].chars().next_back().is_none_or(|c| !is_ident_char(c))
        && text[i + word.len()..].chars().next().is_none_or(|c| !is_ident_char(c))
}

/// Splits a statement at depth-0 `UNION` / `UNION ALL` keywords.
///
/// Every part after the first carries the operator that preceded it.
#[must_use]
pub fn split_union(text: &str) -> Vec<(Option<SetOperator>, &str)> {
    let mut parts = Vec::new();
    let mut pending = None;
    let mut start = 0;
    for (i, _) in top_level(text) {
        if i < start || !word_at(text, i, "UNION") {
            continue;
        }
        parts.push((pending, &text[start..i]));

        let mut end = i + "UNION".len();
        let after = &text[end..];
        let gap = after.len() - after.trim_start().len();
        if gap > 0 && word_at(text, end + gap, "ALL") {
            end += gap + "ALL".len();
            pending = Some(SetOperator::UnionAll);
        } else {
            pending = Some(SetOperator::Union);
        }
        start = end;
    }
    parts.push((pending, &text[start..]));
    parts
}
