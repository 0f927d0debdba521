//! HTML entity encoding and decoding
//!
//! Only the five markup-significant characters are encoded. Decoding
//! understands numeric references and the full HTML named reference set
//! that html5ever's tokenizer uses.

use html5ever::data::NAMED_ENTITIES;

/// Longest reference body we bother to look at
/// (`CounterClockwiseContourIntegral` is 31).
const MAX_REFERENCE_LEN: usize = 32;

/// Resolve a named reference (without `&` and `;`)
fn named(name: &str) -> Option<String> {
    let key = format!("{name};");
    let &(first, second) = NAMED_ENTITIES.get(key.as_str())?;
    // Prefixes of longer names are stored with a zero code point.
    if first == 0 {
        return None;
    }
    let mut out = String::new();
    out.push(char::from_u32(first)?);
    if second != 0 {
        out.push(char::from_u32(second)?);
    }
    Some(out)
}

/// Resolve a reference body such as `amp`, `#38` or `#x26`
fn resolve(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code)
            .filter(|c| *c != '\0')
            .map(String::from);
    }
    named(body)
}

/// If `s` starts with a complete, known entity reference, return the
/// decoded text and the byte length of the reference.
fn reference_at(s: &str) -> Option<(String, usize)> {
    let rest = s.strip_prefix('&')?;
    let end = rest
        .char_indices()
        .take(MAX_REFERENCE_LEN + 1)
        .find(|(_, c)| *c == ';')
        .map(|(i, _)| i)?;
    let body = &rest[..end];
    if body.is_empty() {
        return None;
    }
    resolve(body).map(|c| (c, end + 2))
}

/// Encode text for a markup context.
///
/// Encodes `&`, `<`, `>`, `"` and `'`. An `&` that already begins a known
/// entity reference is kept as is, so encoding never doubles an entity.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' if reference_at(&text[i..]).is_some() => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode a decoded text node for serialization.
///
/// Every `&` is encoded here: tree text holds literal characters.
pub fn escape_node_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Encode a decoded attribute value for a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Decode entity references to literal characters.
///
/// Unknown or unterminated references are left untouched.
pub fn decode(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match reference_at(rest) {
            Some((decoded, len)) => {
                out.push_str(&decoded);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
