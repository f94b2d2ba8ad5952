use std::borrow::Cow;

/// Returns true for characters that may not appear in an XML 1.0 document.
///
/// Covers C0 controls other than tab, LF and CR, DEL, and the noncharacters
/// U+FFFE and U+FFFF.
fn is_invalid_xml_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}' | '\u{fffe}' | '\u{ffff}')
}

/// Strips characters that would make a serialized feed ill-formed.
///
/// Returns `Cow::Borrowed` when nothing needs stripping.
///
/// # Examples
///
/// ```
/// use pagefeed::util::strip_invalid_xml_chars;
///
/// assert_eq!(strip_invalid_xml_chars("tab\tand\nnewline"), "tab\tand\nnewline");
/// assert_eq!(strip_invalid_xml_chars("form\x0cfeed"), "formfeed");
/// ```
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_invalid_xml_char) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_invalid_xml_char(c)).collect())
}
