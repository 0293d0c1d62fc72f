//! Markdown-style emphasis toggling on a textarea selection.
//!
//! Selection offsets are UTF-16 code units (what `selectionStart/End`
//! report), so everything converts through UTF-16 before slicing.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Marker {
    Bold,
    Italic,
}

impl Marker {
    pub(crate) fn token(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
        }
    }

    fn width_utf16(self) -> u32 {
        self.token().len() as u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FormatEdit {
    pub text: String,
    pub sel_start: u32,
    pub sel_end: u32,
}

pub(crate) fn utf16_to_byte_idx(s: &str, pos_utf16: u32) -> usize {
    if pos_utf16 == 0 {
        return 0;
    }
    let mut acc: u32 = 0;
    for (i, ch) in s.char_indices() {
        let w = ch.len_utf16() as u32;
        if acc + w > pos_utf16 {
            return i;
        }
        acc += w;
        if acc == pos_utf16 {
            return i + ch.len_utf8();
        }
    }
    s.len()
}

pub(crate) fn byte_idx_to_utf16(s: &str, byte_idx: usize) -> u32 {
    s[..byte_idx.min(s.len())].encode_utf16().count() as u32
}

/// Wrap or unwrap the selection with the marker pair, toggling on whether the
/// selection already carries it, and shift both selection bounds by the
/// marker width so the caret lands where the user expects.
///
/// A selection shorter than two marker widths cannot carry a full pair and is
/// always wrapped.
pub(crate) fn toggle_marker(text: &str, start_utf16: u32, end_utf16: u32, marker: Marker) -> FormatEdit {
    let (start_utf16, end_utf16) = if start_utf16 <= end_utf16 {
        (start_utf16, end_utf16)
    } else {
        (end_utf16, start_utf16)
    };

    let start = utf16_to_byte_idx(text, start_utf16);
    let end = utf16_to_byte_idx(text, end_utf16);
    let selected = &text[start..end];

    let tok = marker.token();
    let carries_pair =
        selected.len() >= 2 * tok.len() && selected.starts_with(tok) && selected.ends_with(tok);

    let (formatted, shift) = if carries_pair {
        (
            selected[tok.len()..selected.len() - tok.len()].to_string(),
            -(marker.width_utf16() as i64),
        )
    } else {
        (format!("{tok}{selected}{tok}"), marker.width_utf16() as i64)
    };

    let new_text = format!("{}{}{}", &text[..start], formatted, &text[end..]);

    FormatEdit {
        text: new_text,
        sel_start: (start_utf16 as i64 + shift).max(0) as u32,
        sel_end: (end_utf16 as i64 + shift).max(0) as u32,
    }
}

/// Whitespace-separated word count, empty pieces excluded.
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Character count in UTF-16 code units, matching what the textarea reports.
pub(crate) fn char_count(text: &str) -> usize {
    text.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection() {
        let e = toggle_marker("hello world", 0, 5, Marker::Bold);
        assert_eq!(e.text, "**hello** world");
        assert_eq!((e.sel_start, e.sel_end), (2, 7));
    }

    #[test]
    fn test_bold_unwraps_wrapped_selection() {
        // Re-selecting the wrapped substring (markers included) toggles it off.
        let e = toggle_marker("**hello** world", 0, 9, Marker::Bold);
        assert_eq!(e.text, "hello world");
        assert_eq!((e.sel_start, e.sel_end), (0, 7));
    }

    #[test]
    fn test_bold_roundtrip() {
        let e1 = toggle_marker("abc def", 4, 7, Marker::Bold);
        assert_eq!(e1.text, "abc **def**");
        let e2 = toggle_marker(&e1.text, 4, 11, Marker::Bold);
        assert_eq!(e2.text, "abc def");
    }

    #[test]
    fn test_italic_wrap_and_unwrap() {
        let e = toggle_marker("note", 0, 4, Marker::Italic);
        assert_eq!(e.text, "*note*");
        assert_eq!((e.sel_start, e.sel_end), (1, 5));

        let e2 = toggle_marker(&e.text, 0, 6, Marker::Italic);
        assert_eq!(e2.text, "note");
    }

    #[test]
    fn test_empty_selection_inserts_pair_around_caret() {
        let e = toggle_marker("ab", 1, 1, Marker::Bold);
        assert_eq!(e.text, "a**b");
        assert_eq!((e.sel_start, e.sel_end), (3, 3));
    }

    #[test]
    fn test_short_selection_is_wrapped_not_stripped() {
        // "**" alone cannot carry a bold pair; it gets wrapped.
        let e = toggle_marker("**", 0, 2, Marker::Bold);
        assert_eq!(e.text, "****");

        let e = toggle_marker("*", 0, 1, Marker::Italic);
        assert_eq!(e.text, "***");
    }

    #[test]
    fn test_reversed_selection_bounds() {
        let e = toggle_marker("hello", 5, 0, Marker::Bold);
        assert_eq!(e.text, "**hello**");
    }

    #[test]
    fn test_selection_offsets_are_utf16() {
        // "日本" is 2 UTF-16 units but 6 UTF-8 bytes; "🦀" is 2 UTF-16 units.
        let e = toggle_marker("日本 text", 0, 2, Marker::Bold);
        assert_eq!(e.text, "**日本** text");

        let e = toggle_marker("🦀ab", 2, 4, Marker::Italic);
        assert_eq!(e.text, "🦀*ab*");
        assert_eq!((e.sel_start, e.sel_end), (3, 5));
    }

    #[test]
    fn test_utf16_byte_roundtrip() {
        let s = "a🦀b日";
        for (i, _) in s.char_indices() {
            assert_eq!(utf16_to_byte_idx(s, byte_idx_to_utf16(s, i)), i);
        }
        assert_eq!(utf16_to_byte_idx(s, byte_idx_to_utf16(s, s.len())), s.len());
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("  two   words \n"), 2);
    }

    #[test]
    fn test_char_count_utf16() {
        assert_eq!(char_count(""), 0);
        assert_eq!(char_count("abc"), 3);
        // Astral-plane chars count as two, like textarea.value.length.
        assert_eq!(char_count("🦀"), 2);
    }
}
