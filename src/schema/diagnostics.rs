//! Source locations and hints for JSON payload diagnostics

use miette::SourceSpan;

/// Convert a 1-based line/column pair to a byte offset
pub fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;

    if line > 1 {
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                current_line += 1;
                if current_line == line {
                    line_start = i + 1;
                    break;
                }
            }
        }
        if current_line < line {
            return source.len();
        }
    }

    let rest = &source[line_start..];
    let offset = rest
        .char_indices()
        .take_while(|(_, c)| *c != '\n')
        .nth(column.saturating_sub(1))
        .map(|(j, _)| line_start + j)
        .unwrap_or(line_start + rest.find('\n').unwrap_or(rest.len()));

    offset.min(source.len())
}

/// Suggest a fix for a `serde_json` syntax error message
pub fn parse_error_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("trailing comma") {
        return Some("Remove the comma after the last item of the object or array".to_string());
    }

    if msg.contains("eof while parsing") {
        return Some("The document ends early - check for a missing '}' or ']'".to_string());
    }

    if msg.contains("key must be a string") {
        return Some("Object keys must be double-quoted: {\"folio\": 7}".to_string());
    }

    if msg.contains("expected `,` or `}`") || msg.contains("expected `,` or `]`") {
        return Some("Separate fields and items with commas".to_string());
    }

    if msg.contains("expected value") {
        return Some("Strings need double quotes; numbers must not be quoted".to_string());
    }

    None
}

/// Find the span of a dotted path (`predio.0.folio`) in JSON source
///
/// Walks the path one segment at a time: object keys by searching for the
/// quoted key, array indices by counting top-level elements. Stops at the
/// deepest segment it can find, so a missing field highlights its parent.
pub fn find_path_span(content: &str, path: &str) -> SourceSpan {
    let segments: Vec<&str> = path
        .split('.')
        .filter(|s| !s.is_empty() && *s != "$")
        .collect();

    let mut cursor = 0;
    let mut span: Option<(usize, usize)> = None;

    for segment in segments {
        let found = match segment.parse::<usize>() {
            Ok(index) => find_array_element(content, cursor, index).map(|start| (start, 1)),
            Err(_) => find_key(content, cursor, segment).map(|start| (start, segment.len() + 2)),
        };

        match found {
            Some((start, len)) => {
                // An element is its own object; a key is followed by its value.
                cursor = if segment.parse::<usize>().is_ok() { start } else { start + len };
                span = Some((start, len));
            }
            None => break,
        }
    }

    match span {
        Some(span) => span.into(),
        None => first_line_span(content),
    }
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len.min(content.len().max(1))).into()
}

/// Offset of `"key"` among the direct members of the object value at `from`
///
/// `from` may sit before a `:` separator; anything other than an object
/// value there means the key cannot be found.
fn find_key(content: &str, from: usize, key: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let rest = content.get(from..)?;
    let open = from + rest.find(|c: char| !(c.is_ascii_whitespace() || c == ':'))?;
    if bytes[open] != b'{' {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let end = string_end(bytes, i)?;
                if depth == 0 && &content[i + 1..end] == key {
                    let after = &content[end + 1..];
                    if after.trim_start().starts_with(':') {
                        return Some(i);
                    }
                }
                i = end;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Offset of the closing quote of the string opening at `start`
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start + 1) {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == b'"' {
            return Some(i);
        }
    }
    None
}

/// Offset of element `index` of the first array opening at or after `from`
fn find_array_element(content: &str, from: usize, index: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let open = from + content.get(from..)?.find('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut current = 0usize;
    let mut element_start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => {
                if depth == 0 && element_start.is_none() {
                    element_start = Some(i);
                }
                in_string = true;
            }
            b'{' | b'[' => {
                if depth == 0 && element_start.is_none() {
                    element_start = Some(i);
                }
                depth += 1;
            }
            b'}' | b']' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            b',' if depth == 0 => {
                current += 1;
                element_start = None;
            }
            b if b.is_ascii_whitespace() => {}
            _ => {
                if depth == 0 && element_start.is_none() {
                    element_start = Some(i);
                }
            }
        }

        if current == index {
            if let Some(start) = element_start {
                return Some(start);
            }
        }
    }

    None
}
