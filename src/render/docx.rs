//! `.docx` rendering: Tera over the WordprocessingML parts of a template

use serde_json::Value as JsonValue;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tera::Tera;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::render::{filters, placeholders, DocumentRenderer, RenderError};

/// Main document part; a template without it is not a Word document
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Renders Word templates in memory
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocumentRenderer for DocxRenderer {
    fn render(&self, template: &Path, data: &JsonValue) -> Result<Vec<u8>, RenderError> {
        let bytes = std::fs::read(template).map_err(|source| RenderError::Io {
            path: template.to_path_buf(),
            source,
        })?;

        render_docx(&bytes, data)
    }
}

/// Parts that may carry placeholders
pub fn is_templated_part(name: &str) -> bool {
    if name == DOCUMENT_PART || name == "word/footnotes.xml" || name == "word/endnotes.xml" {
        return true;
    }

    name.strip_prefix("word/")
        .map(|rest| {
            !rest.contains('/')
                && rest.ends_with(".xml")
                && (rest.starts_with("header") || rest.starts_with("footer"))
        })
        .unwrap_or(false)
}

struct Entry {
    name: String,
    compression: CompressionMethod,
    is_dir: bool,
    data: Vec<u8>,
}

/// Render template bytes with `data` as the Tera context
pub fn render_docx(template: &[u8], data: &JsonValue) -> Result<Vec<u8>, RenderError> {
    let mut archive =
        ZipArchive::new(Cursor::new(template)).map_err(|e| RenderError::Archive(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| RenderError::Archive(e.to_string()))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| RenderError::Archive(format!("{}: {}", file.name(), e)))?;

        entries.push(Entry {
            name: file.name().to_string(),
            compression: file.compression(),
            is_dir: file.is_dir(),
            data: contents,
        });
    }

    if !entries.iter().any(|e| e.name == DOCUMENT_PART) {
        return Err(RenderError::MissingDocumentPart);
    }

    let mut tera = Tera::default();
    filters::register(&mut tera);

    let mut sources = Vec::new();
    for entry in entries.iter().filter(|e| is_templated_part(&e.name)) {
        let xml = std::str::from_utf8(&entry.data).map_err(|e| RenderError::Template {
            part: entry.name.clone(),
            message: format!("not UTF-8: {}", e),
        })?;
        sources.push((entry.name.clone(), placeholders::prepare(xml)));
    }
    // Names end in ".xml", so Tera escapes substituted values as markup.
    tera.add_raw_templates(sources)
        .map_err(|e| RenderError::Template {
            part: "template".to_string(),
            message: describe_tera_error(&e),
        })?;

    let context = tera::Context::from_value(data.clone()).map_err(|e| RenderError::Template {
        part: "context".to_string(),
        message: describe_tera_error(&e),
    })?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &entries {
        let method = match entry.compression {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default().compression_method(method);

        if entry.is_dir {
            writer
                .add_directory(entry.name.as_str(), options)
                .map_err(|e| RenderError::Archive(e.to_string()))?;
            continue;
        }

        writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| RenderError::Archive(e.to_string()))?;

        if is_templated_part(&entry.name) {
            let rendered = tera
                .render(&entry.name, &context)
                .map_err(|e| RenderError::Template {
                    part: entry.name.clone(),
                    message: describe_tera_error(&e),
                })?;
            writer
                .write_all(rendered.as_bytes())
                .map_err(|e| RenderError::Archive(e.to_string()))?;
        } else {
            writer
                .write_all(&entry.data)
                .map_err(|e| RenderError::Archive(e.to_string()))?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| RenderError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Tera nests the useful detail in the error's source chain
fn describe_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = std::error::Error::source(inner);
    }
    message
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    /// Build a minimal `.docx` whose body paragraphs hold `paragraphs`
    pub(crate) fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
            .collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        );
        docx_with_parts(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            (DOCUMENT_PART, &document),
        ])
    }

    pub(crate) fn docx_with_parts(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, contents) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn read_part(docx: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        contents
    }

    fn context() -> JsonValue {
        json!({
            "archivo": "recibo.docx",
            "predio": [
                {"folio": 7, "contribuyente": "Juan Pérez & Hijos", "impuesto": {"suma": 1830.25, "recargo": null}},
                {"folio": 8, "contribuyente": "Ana <López>", "impuesto": {"suma": 10, "recargo": 2}}
            ]
        })
    }

    #[test]
    fn test_templated_parts() {
        assert!(is_templated_part("word/document.xml"));
        assert!(is_templated_part("word/header1.xml"));
        assert!(is_templated_part("word/footer2.xml"));
        assert!(is_templated_part("word/footnotes.xml"));
        assert!(!is_templated_part("word/styles.xml"));
        assert!(!is_templated_part("word/_rels/header1.xml.rels"));
        assert!(!is_templated_part("word/media/header.xml"));
        assert!(!is_templated_part("[Content_Types].xml"));
    }

    #[test]
    fn test_renders_placeholders() {
        let template = docx_with_paragraphs(&[
            "Folio: {{ predio.0.folio }}",
            "Contribuyente: {{ predio.0.contribuyente }}",
            "Total: {{ predio.0.impuesto.suma | moneda }}",
        ]);

        let output = render_docx(&template, &context()).unwrap();
        let xml = read_part(&output, DOCUMENT_PART);

        assert!(xml.contains("Folio: 7"));
        assert!(xml.contains("Contribuyente: Juan Pérez &amp; Hijos"));
        assert!(xml.contains("Total: $1,830.25"));
        assert!(!xml.contains("{{"));
    }

    #[test]
    fn test_null_renders_blank() {
        let template = docx_with_paragraphs(&["Recargo:[{{ predio.0.impuesto.recargo }}]"]);

        let output = render_docx(&template, &context()).unwrap();
        let xml = read_part(&output, DOCUMENT_PART);

        assert!(xml.contains("Recargo:[]"), "{}", xml);
    }

    #[test]
    fn test_values_are_xml_escaped() {
        let template = docx_with_paragraphs(&["{{ predio.1.contribuyente }}"]);

        let output = render_docx(&template, &context()).unwrap();
        let xml = read_part(&output, DOCUMENT_PART);

        assert!(xml.contains("Ana &lt;López&gt;"));
    }

    #[test]
    fn test_paragraph_loop() {
        let template = docx_with_paragraphs(&[
            "{%p for p in predio %}",
            "Folio {{ p.folio }}",
            "{%p endfor %}",
        ]);

        let output = render_docx(&template, &context()).unwrap();
        let xml = read_part(&output, DOCUMENT_PART);

        assert!(xml.contains("Folio 7"));
        assert!(xml.contains("Folio 8"));
        assert_eq!(xml.matches("<w:p>").count(), 2);
    }

    #[test]
    fn test_other_parts_copied() {
        let template = docx_with_parts(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            (DOCUMENT_PART, "<w:document><w:body>{{ archivo }}</w:body></w:document>"),
            ("word/header1.xml", "<w:hdr>Folio {{ predio.0.folio }}</w:hdr>"),
            ("word/styles.xml", "<w:styles>{{ untouched }}</w:styles>"),
        ]);

        let output = render_docx(&template, &context()).unwrap();

        assert_eq!(
            read_part(&output, DOCUMENT_PART),
            "<w:document><w:body>recibo.docx</w:body></w:document>"
        );
        assert_eq!(read_part(&output, "word/header1.xml"), "<w:hdr>Folio 7</w:hdr>");
        assert_eq!(
            read_part(&output, "word/styles.xml"),
            "<w:styles>{{ untouched }}</w:styles>"
        );
        assert_eq!(read_part(&output, "[Content_Types].xml"), CONTENT_TYPES);
    }

    #[test]
    fn test_undefined_variable_fails() {
        let template = docx_with_paragraphs(&["{{ predio.0.no_such_field }}"]);
        let err = render_docx(&template, &context()).unwrap_err();
        match err {
            RenderError::Template { part, .. } => assert_eq!(part, DOCUMENT_PART),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_not_a_zip() {
        let err = render_docx(b"plain text", &context()).unwrap_err();
        assert!(matches!(err, RenderError::Archive(_)));
    }

    #[test]
    fn test_missing_document_part() {
        let template = docx_with_parts(&[("[Content_Types].xml", CONTENT_TYPES)]);
        let err = render_docx(&template, &context()).unwrap_err();
        assert!(matches!(err, RenderError::MissingDocumentPart));
    }

    #[test]
    fn test_renderer_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("t.docx");
        std::fs::write(&path, docx_with_paragraphs(&["{{ archivo }}"])).unwrap();

        let output = DocxRenderer.render(&path, &context()).unwrap();
        assert!(read_part(&output, DOCUMENT_PART).contains("recibo.docx"));

        let err = DocxRenderer
            .render(&tmp.path().join("missing.docx"), &context())
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
