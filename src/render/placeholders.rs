//! WordprocessingML cleanup so placeholders survive as template syntax
//!
//! Word freely splits text across runs, so `{{ folio }}` typed in the editor
//! may be stored as `{{</w:t></w:r><w:r><w:t> folio }}`. Before templating,
//! markup inside `{{ }}`, `{% %}` and `{# #}` is removed and the text joined.
//! Block tags written as `{%p ... %}`, `{%tr ... %}`, `{%tc ... %}` or
//! `{%r ... %}` then replace their whole paragraph, table row, table cell or
//! run, which lets a loop repeat rows without leaving empty paragraphs.

/// Marker prefix and the element it consumes, innermost first
const BLOCK_TAGS: [(&str, &str); 4] = [("{%r ", "w:r"), ("{%tc ", "w:tc"), ("{%tr ", "w:tr"), ("{%p ", "w:p")];

/// Rejoin split placeholders and expand block tags
pub fn prepare(xml: &str) -> String {
    let mut prepared = rejoin_split_tags(xml);
    for (marker, element) in BLOCK_TAGS {
        prepared = expand_block_tags(&prepared, marker, element);
    }
    prepared
}

/// Strip markup out of template tags, leaving their text contiguous
pub fn rejoin_split_tags(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let opener = skip_markup(after);

        let close = match opener.chars().next() {
            Some('{') => Some(('{', '}')),
            Some('%') => Some(('%', '%')),
            Some('#') => Some(('#', '#')),
            _ => None,
        };

        if let Some((open, close)) = close {
            if let Some((body, consumed)) = collect_tag_body(&opener[1..], close) {
                out.push('{');
                out.push(open);
                out.push_str(&body);
                out.push(close);
                out.push('}');

                let skipped = after.len() - opener.len();
                rest = &rest[pos + 1 + skipped + 1 + consumed..];
                continue;
            }
        }

        out.push('{');
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Skip any number of leading `<...>` elements
fn skip_markup(s: &str) -> &str {
    let mut rest = s;
    while rest.starts_with('<') {
        match rest.find('>') {
            Some(end) => rest = &rest[end + 1..],
            None => break,
        }
    }
    rest
}

/// Collect tag text up to the closing `<close>}` pair
///
/// Returns the unescaped body and the number of bytes consumed, including the
/// final `}`. Gives up on a new tag opener or the end of input.
fn collect_tag_body(s: &str, close: char) -> Option<(String, usize)> {
    let mut body = String::new();
    let mut i = 0;

    while i < s.len() {
        let c = s[i..].chars().next()?;
        match c {
            '<' => {
                let end = s[i..].find('>')?;
                i += end + 1;
            }
            '{' => {
                if matches!(skip_markup(&s[i + 1..]).chars().next(), Some('{' | '%' | '#')) {
                    return None;
                }
                body.push(c);
                i += 1;
            }
            c if c == close => {
                let after = &s[i + 1..];
                let next = skip_markup(after);
                if next.starts_with('}') {
                    let consumed = i + 1 + (after.len() - next.len()) + 1;
                    return Some((unescape_xml(&body), consumed));
                }
                body.push(c);
                i += 1;
            }
            _ => {
                body.push(c);
                i += c.len_utf8();
            }
        }
    }

    None
}

/// Undo XML escaping and typographic quotes inside tag expressions
fn unescape_xml(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Replace each element holding `marker` with a plain `{% ... %}` tag
fn expand_block_tags(xml: &str, marker: &str, element: &str) -> String {
    let open_bare = format!("<{}>", element);
    let open_attrs = format!("<{} ", element);
    let close_tag = format!("</{}>", element);

    let mut out = xml.to_string();
    let mut search_from = 0;

    while let Some(rel) = out[search_from..].find(marker) {
        let tag_start = search_from + rel;
        let Some(tag_len) = out[tag_start..].find("%}") else {
            break;
        };
        let tag_end = tag_start + tag_len + 2;
        let statement = out[tag_start + marker.len()..tag_end - 2].trim().to_string();
        let replacement = format!("{{% {} %}}", statement);

        let before = &out[..tag_start];
        let element_start = match (before.rfind(&open_bare), before.rfind(&open_attrs)) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let element_end = out[tag_end..]
            .find(&close_tag)
            .map(|rel| tag_end + rel + close_tag.len());

        let (start, end) = match (element_start, element_end) {
            (Some(start), Some(end)) => (start, end),
            _ => (tag_start, tag_end),
        };

        out.replace_range(start..end, &replacement);
        search_from = start + replacement.len();
    }

    out
}
