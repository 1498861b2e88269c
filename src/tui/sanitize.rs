//! Markup sanitization for untrusted message bodies.
//!
//! Message bodies come from other users via the backend and are rendered as
//! markdown. Before parsing, the raw source is scrubbed so that hostile
//! content can neither smuggle markup through to the terminal nor inject
//! control sequences into it:
//!
//! - `<script>` and `<style>` elements are removed *with their content*
//!   (an unterminated one swallows the rest of the input)
//! - any other thing shaped like an HTML tag is stripped, keeping its inner
//!   text (`<b>hi</b>` → `hi`)
//! - ASCII control characters other than `\n` and `\t` are dropped, so a
//!   body can't carry raw terminal escape sequences
//!
//! A bare `<` that isn't opening a tag (`a < b`) passes through untouched.
//! The markdown renderer additionally refuses to emit any HTML event, so
//! this is scrubbing plus a second fence, not a single point of failure.

/// Elements whose content is dangerous, not just their tags.
const DROP_WITH_CONTENT: [&str; 2] = ["script", "style"];

/// Scrub a raw markdown body. The result is still markdown — emphasis,
/// code fences and the rest survive — but tag-shaped markup is gone.
pub fn sanitize_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < input.len() {
        let rest = &input[i..];
        if bytes[i] == b'<' {
            if let Some(element) = dangerous_element_at(rest) {
                // Skip to just past the matching close tag, or eat the rest.
                match find_close_tag(rest, element) {
                    Some(end) => {
                        i += end;
                        continue;
                    }
                    None => break,
                }
            }
            if let Some(len) = tag_len(rest) {
                i += len;
                continue;
            }
        }
        let ch = rest.chars().next().unwrap_or('\0');
        if !ch.is_control() || ch == '\n' || ch == '\t' {
            out.push(ch);
        }
        i += ch.len_utf8();
    }
    out
}

/// If `rest` starts with an opening tag of a drop-with-content element,
/// return the element name. Byte-wise comparison: the prefix length may not
/// fall on a char boundary of `rest`.
fn dangerous_element_at(rest: &str) -> Option<&'static str> {
    let bytes = rest.as_bytes();
    DROP_WITH_CONTENT.into_iter().find(|name| {
        let open = format!("<{name}");
        if bytes.len() < open.len() || !bytes[..open.len()].eq_ignore_ascii_case(open.as_bytes()) {
            return false;
        }
        // "<scripted>" is not a <script> tag
        matches!(
            bytes.get(open.len()),
            Some(b'>' | b' ' | b'\t' | b'\n' | b'/') | None
        )
    })
}

/// Byte offset just past `</name>` in `rest`, case-insensitive.
fn find_close_tag(rest: &str, name: &str) -> Option<usize> {
    let close = format!("</{name}");
    let lower = rest.to_ascii_lowercase();
    let start = lower.find(&close)?;
    let after = start + close.len();
    let gt = lower[after..].find('>')?;
    Some(after + gt + 1)
}

/// If `rest` starts with something tag-shaped (`<b>`, `</em>`, `<img ...>`,
/// `<!-- -->`), return its byte length. A lone `<` returns None.
fn tag_len(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices().skip(1);
    let (_, first) = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '/' || first == '!') {
        return None;
    }
    for (idx, ch) in chars {
        if ch == '>' {
            return Some(idx + 1);
        }
        if ch == '<' {
            // Never a tag; don't swallow the next real one
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_markup("hello **world**"), "hello **world**");
    }

    #[test]
    fn script_is_removed_with_content() {
        assert_eq!(
            sanitize_markup("<script>alert(1)</script>**bold**"),
            "**bold**"
        );
    }

    #[test]
    fn script_case_and_attributes_do_not_matter() {
        assert_eq!(
            sanitize_markup("a <SCRIPT type=\"text/js\">x</ScRiPt> b"),
            "a  b"
        );
    }

    #[test]
    fn unterminated_script_swallows_the_rest() {
        assert_eq!(sanitize_markup("before<script>alert(1)"), "before");
    }

    #[test]
    fn style_is_removed_with_content() {
        assert_eq!(sanitize_markup("<style>*{display:none}</style>ok"), "ok");
    }

    #[test]
    fn other_tags_are_stripped_keeping_text() {
        assert_eq!(sanitize_markup("<b>hi</b> <img src=x>"), "hi ");
    }

    #[test]
    fn scripted_element_is_just_a_tag() {
        // Only the tag is dropped; "<scripted>" is not a script element
        assert_eq!(sanitize_markup("<scripted>text</scripted>"), "text");
    }

    #[test]
    fn bare_less_than_survives() {
        assert_eq!(sanitize_markup("a < b and 1 <2"), "a < b and 1 <2");
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(sanitize_markup("red\x1b[31malert\x07"), "red[31malert");
        assert_eq!(sanitize_markup("line\nnext\ttab"), "line\nnext\ttab");
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(sanitize_markup("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn multibyte_text_near_tags_is_safe() {
        // Non-ASCII after '<' is not a tag name; the text passes through
        assert_eq!(sanitize_markup("café <b>naïve</b> <날개>"), "café naïve <날개>");
        assert_eq!(sanitize_markup("<séance>x</séance>"), "x");
    }
}
