//! Minimal WordprocessingML (.docx) writer

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::document::{Block, ReportDocument};
use crate::errors::ExportError;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial" w:eastAsia="Arial"/><w:sz w:val="22"/><w:lang w:val="uk-UA"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:jc w:val="center"/><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="360" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:style>
</w:styles>"#;

const SECTION: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

/// Render the report as a .docx package
pub fn render(document: &ReportDocument) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let body = document_xml(document);
    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
        ("word/document.xml", &body),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn document_xml(document: &ReportDocument) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    for block in &document.blocks {
        match block {
            Block::Title(text) => styled_paragraph(&mut xml, "Title", text),
            Block::Heading(text) => styled_paragraph(&mut xml, "Heading1", text),
            Block::Subheading(text) => styled_paragraph(&mut xml, "Heading2", text),
            Block::Paragraph(text) => styled_paragraph(&mut xml, "Normal", text),
            Block::Bullet(text) => styled_paragraph(&mut xml, "ListBullet", &format!("•\t{text}")),
            Block::Field { label, value } => {
                xml.push_str("<w:p>");
                push_run(&mut xml, &format!("{label}: "), true);
                push_run(&mut xml, value, false);
                xml.push_str("</w:p>");
            }
        }
    }

    xml.push_str(SECTION);
    xml.push_str("</w:body></w:document>");
    xml
}

fn styled_paragraph(xml: &mut String, style: &str, text: &str) {
    xml.push_str(&format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>"#));
    push_run(xml, text, false);
    xml.push_str("</w:p>");
}

/// One run; line breaks become `<w:br/>` and tabs `<w:tab/>`
fn push_run(xml: &mut String, text: &str, bold: bool) {
    xml.push_str("<w:r>");
    if bold {
        xml.push_str("<w:rPr><w:b/></w:rPr>");
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            if !segment.is_empty() {
                xml.push_str(r#"<w:t xml:space="preserve">"#);
                xml.push_str(&escape(&xml_safe(segment)));
                xml.push_str("</w:t>");
            }
        }
    }
    xml.push_str("</w:r>");
}

/// Drop characters XML 1.0 cannot carry at all
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            (c == '\t' || c == '\n' || c == '\r' || !c.is_control())
                && !matches!(c, '\u{fffe}' | '\u{ffff}')
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn doc(blocks: Vec<Block>) -> ReportDocument {
        ReportDocument {
            analysis_id: "01TEST".into(),
            blocks,
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = render(&doc(vec![Block::Title("Звіт".into())])).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for required in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
        ] {
            assert!(names.contains(&required), "missing {required}");
        }
    }

    #[test]
    fn test_text_is_escaped_and_kept() {
        let bytes = render(&doc(vec![
            Block::Field {
                label: "Власник".into(),
                value: "ТОВ \"Мрія\" & <Ко>".into(),
            },
            Block::Paragraph("рядок 1\nрядок 2".into()),
        ]))
        .unwrap();

        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("ТОВ &quot;Мрія&quot; &amp; &lt;Ко&gt;"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("рядок 1</w:t><w:br/>"));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        assert_eq!(xml_safe("a\u{1}b\tc"), "ab\tc");
    }

    #[test]
    fn test_noncharacters_are_dropped() {
        assert_eq!(xml_safe("a\u{fffe}b\u{ffff}c"), "abc");

        let bytes = render(&doc(vec![Block::Paragraph("Ризик\u{ffff} високий".into())])).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("Ризик високий"));
        assert!(!xml.contains('\u{ffff}'));
    }
}
