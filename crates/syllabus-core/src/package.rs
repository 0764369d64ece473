//! DOCX container I/O
//!
//! A `.docx` file is a zip archive. Only the main document part is parsed;
//! every other entry is carried through byte-for-byte in its original order.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::Document;
use crate::error::DocxError;

/// Zip path of the main document part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// MIME type of a WordprocessingML document
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// An opened `.docx` package
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<Entry>,
    document: Document,
}

impl DocxPackage {
    /// Read a package from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocxError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        let mut document = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            if name == DOCUMENT_PART {
                let xml = String::from_utf8(data.clone())
                    .map_err(|_| DocxError::Encoding(DOCUMENT_PART.to_string()))?;
                document = Some(Document::parse(&xml)?);
            }

            entries.push(Entry { name, data, is_dir });
        }

        let document = document.ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.into()))?;
        debug!("Loaded package with {} entries", entries.len());

        Ok(Self { entries, document })
    }

    /// Build a package around a `w:body` fragment
    ///
    /// Produces the three parts Word needs to open the file: content types,
    /// the package relationship, and the main document.
    pub fn from_body_xml(body: &str) -> Result<Self, DocxError> {
        let document_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
            body
        );

        let entries = vec![
            Entry {
                name: "[Content_Types].xml".into(),
                data: CONTENT_TYPES.as_bytes().to_vec(),
                is_dir: false,
            },
            Entry {
                name: "_rels/.rels".into(),
                data: PACKAGE_RELS.as_bytes().to_vec(),
                is_dir: false,
            },
            Entry {
                name: DOCUMENT_PART.into(),
                data: document_xml.as_bytes().to_vec(),
                is_dir: false,
            },
        ];

        Ok(Self {
            document: Document::parse(&document_xml)?,
            entries,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Raw bytes of a part as it was loaded
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data.as_slice())
    }

    /// Serialize the package, writing the current state of the document part
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let document_xml = self.document.to_xml()?;
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            zip.start_file(entry.name.as_str(), options)?;
            if entry.name == DOCUMENT_PART {
                zip.write_all(&document_xml)?;
            } else {
                zip.write_all(&entry.data)?;
            }
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
