//! Shared fixtures for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A request that passes validation
pub fn valid_request() -> Value {
    json!({
        "archivo": "recibo",
        "predio": [{
            "clave_catastral": "123-45-678-90-12-AB1",
            "folio": 7,
            "direccion": "Av. Juárez 100, Centro",
            "contribuyente": "Juan Pérez",
            "terreno": {
                "valor_terreno_propio": 150000,
                "metros_terreno_propio": 120.5,
                "valor_terreno_comun": 0,
                "metros_terreno_comun": 0
            },
            "construccion": {
                "valor_construccion_propia": 320000,
                "metros_construccion_propia": 95,
                "valor_construccion_comun": 0,
                "metros_construccion_comun": 0
            },
            "impuesto": {
                "suma": 1830.25,
                "ultimo_periodo_pagado": "2023-6"
            }
        }]
    })
}

/// Minimal `.docx` whose body holds one paragraph per entry
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
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

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer
        .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// The template used by most tests
pub fn receipt_template() -> Vec<u8> {
    docx_with_paragraphs(&[
        "Archivo: {{ archivo }}",
        "{%p for p in predio %}",
        "Folio {{ p.folio }}: {{ p.contribuyente }}",
        "Clave {{ p.clave_catastral }}",
        "Suma {{ p.impuesto.suma | moneda }}",
        "Recargo [{{ p.impuesto.recargo | moneda }}]",
        "{%p endfor %}",
    ])
}

pub fn write_template(dir: &Path, name: &str, contents: &[u8]) {
    std::fs::write(dir.join(name), contents).unwrap();
}

pub fn document_xml(docx: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}
