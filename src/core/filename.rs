//! Output file naming for generated documents

pub const DOCX_EXTENSION: &str = ".docx";

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Used when the requested name has nothing usable left after cleanup
const FALLBACK_NAME: &str = "documento";

/// Normalize a requested output name into a safe `.docx` file name
///
/// Directory components, quotes and control characters are dropped, and the
/// `.docx` extension is appended unless already present (any case).
pub fn normalize_output_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();

    let stem = if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(DOCX_EXTENSION) {
        FALLBACK_NAME
    } else {
        cleaned
    };

    if stem.to_lowercase().ends_with(DOCX_EXTENSION) {
        stem.to_string()
    } else {
        format!("{}{}", stem, DOCX_EXTENSION)
    }
}

/// `Content-Disposition` value for a download named `file_name`
///
/// Carries an ASCII `filename` for old clients and an RFC 5987 `filename*`
/// with the exact UTF-8 name.
pub fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}
