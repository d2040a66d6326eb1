//! Plain-text helpers shared by the navigation core: case-insensitive
//! matching, width fitting, and word wrapping.
//!
//! Widths are counted in `char`s. Matching compares characters one by one
//! through their lowercase forms, so byte offsets returned here always land on
//! `char` boundaries of the original (un-lowered) string.

use std::ops::Range;

/// Ellipsis appended when text is cut to fit.
pub const ELLIPSIS: char = '…';

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// If `haystack` starts with `needle` (ignoring case), return the byte length
/// of the matched prefix.
fn prefix_len_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    for n in needle.chars() {
        let (_, h) = hay.next()?;
        if !chars_eq_ignore_case(h, n) {
            return None;
        }
    }
    Some(hay.next().map_or(haystack.len(), |(i, _)| i))
}

/// Byte range of the first case-insensitive occurrence of `needle`.
///
/// An empty needle never matches.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    haystack.char_indices().find_map(|(start, _)| {
        prefix_len_ignore_case(&haystack[start..], needle).map(|len| start..start + len)
    })
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

/// All non-overlapping case-insensitive occurrences of `needle`, left to right.
pub fn match_ranges(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    while offset < haystack.len() {
        match find_ignore_case(&haystack[offset..], needle) {
            Some(found) => {
                ranges.push(offset + found.start..offset + found.end);
                offset += found.end.max(found.start + 1);
            }
            None => break,
        }
    }
    ranges
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` to at most `max` chars, replacing the last kept char with an
/// ellipsis when anything was removed.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Byte offset of the `n`th char (or the string length when shorter).
fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

/// Word-wrap `text` at `width` columns.
///
/// Every input line produces at least one output line, so blank lines in the
/// input survive as empty strings. Leading indentation of a line is kept on
/// its first wrapped row; words longer than the width are hard-broken.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        wrap_line(line, width, &mut out);
    }
    out
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let body = line.trim_start();
    if body.trim_end().is_empty() {
        out.push(String::new());
        return;
    }

    let indent = &line[..line.len() - body.len()];
    let mut current = String::new();
    let mut current_len = 0;
    if char_len(indent) < width {
        current.push_str(indent);
        current_len = char_len(indent);
    }
    let mut has_word = false;

    for word in body.split_whitespace() {
        let mut word = word;
        let mut word_len = char_len(word);

        while word_len > width {
            if has_word {
                out.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current_len = 0;
            has_word = false;
            let split = byte_offset_of_char(word, width);
            out.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }
        if word_len == 0 {
            continue;
        }

        if !has_word {
            if current_len + word_len > width {
                current.clear();
                current_len = 0;
            }
            current.push_str(word);
            current_len += word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
        has_word = true;
    }

    if has_word {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ignore_case_basic() {
        assert_eq!(find_ignore_case("Banana", "an"), Some(1..3));
        assert_eq!(find_ignore_case("Banana", "AN"), Some(1..3));
        assert_eq!(find_ignore_case("apple", "an"), None);
        assert_eq!(find_ignore_case("apple", ""), None);
    }

    #[test]
    fn test_find_ignore_case_non_ascii_offsets() {
        let hay = "über Straße";
        let range = find_ignore_case(hay, "STRAßE").expect("match");
        assert_eq!(&hay[range], "Straße");
        assert_eq!(find_ignore_case("ÜBER", "über"), Some(0.."ÜBER".len()));
    }

    #[test]
    fn test_match_ranges_non_overlapping() {
        assert_eq!(match_ranges("aaaa", "aa"), vec![0..2, 2..4]);
        assert_eq!(match_ranges("Foo foo FOO", "foo"), vec![0..3, 4..7, 8..11]);
        assert!(match_ranges("abc", "").is_empty());
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hell…");
        assert_eq!(truncate_with_ellipsis("hello", 1), "…");
        assert_eq!(truncate_with_ellipsis("hello", 0), "");
    }

    #[test]
    fn test_wrap_lines_words() {
        assert_eq!(wrap_lines("world wide web", 5), vec!["world", "wide", "web"]);
        assert_eq!(wrap_lines("hello", 5), vec!["hello"]);
        assert_eq!(wrap_lines("a b c d", 3), vec!["a b", "c d"]);
    }

    #[test]
    fn test_wrap_lines_preserves_blank_lines() {
        assert_eq!(
            wrap_lines("first\n\nsecond\r\n", 20),
            vec!["first", "", "second", ""]
        );
        assert_eq!(wrap_lines("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_lines_hard_breaks_long_words() {
        assert_eq!(wrap_lines("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_lines("x abcdefgh y", 4), vec!["x", "abcd", "efgh", "y"]);
    }

    #[test]
    fn test_wrap_lines_keeps_indent() {
        assert_eq!(wrap_lines("    let x = 1;", 40), vec!["    let x = 1;"]);
    }

    #[test]
    fn test_wrap_lines_zero_width_is_treated_as_one() {
        assert_eq!(wrap_lines("ab", 0), vec!["a", "b"]);
    }
}
