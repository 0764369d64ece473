//! Syllabus template filling
//!
//! Loads a `.docx` template, substitutes `{Name}` placeholders from a
//! [`FieldMap`], and serializes the result.
//!
//! ```rust,ignore
//! use syllabus_core::{fill_document, DocxPackage, FormSubmission};
//!
//! let mut package = DocxPackage::open("template.docx")?;
//! let fields = FormSubmission::from_pairs(form_pairs).into_field_map();
//! fill_document(package.document_mut(), &fields);
//! let bytes = package.to_bytes()?;
//! ```

pub mod document;
pub mod error;
pub mod fields;
pub mod package;
pub mod substitute;
pub mod xml;

pub use document::{Block, Cell, Document, Paragraph, Row, Run, Table};
pub use error::DocxError;
pub use fields::{
    normalize_value, objectives_text, FieldMap, FormSubmission, NO_OBJECTIVES, OBJECTIVES_KEY,
    OBJECTIVE_FORM_KEY,
};
pub use package::{DocxPackage, DOCUMENT_PART, DOCX_MIME_TYPE};
pub use substitute::{fill_document, placeholder, SubstitutionReport};

/// Load a template, fill it, and return the generated document bytes
pub fn render_template(template: &[u8], fields: &FieldMap) -> Result<Vec<u8>, DocxError> {
    let mut package = DocxPackage::from_bytes(template)?;
    let report = fill_document(package.document_mut(), fields);
    tracing::debug!(
        runs = report.runs_rewritten,
        paragraphs = report.paragraphs_rewritten,
        "Substitution complete"
    );
    package.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_end_to_end() {
        let template = DocxPackage::from_body_xml(concat!(
            "<w:p><w:r><w:t>{CourseTitle}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>{Objectives}</w:t></w:r></w:p>",
        ))
        .unwrap()
        .to_bytes()
        .unwrap();

        let fields = FormSubmission::from_pairs([("CourseTitle", "Intro to Systems")])
            .into_field_map();
        let output = render_template(&template, &fields).unwrap();

        let text = DocxPackage::from_bytes(&output).unwrap().document().text();
        assert!(text.contains("Intro to Systems"));
        assert!(text.contains("No objectives provided"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_render_template_rejects_control_characters() {
        let template =
            DocxPackage::from_body_xml("<w:p><w:r><w:t>{CourseTitle}</w:t></w:r></w:p>")
                .unwrap()
                .to_bytes()
                .unwrap();

        let fields = FormSubmission::from_pairs([("CourseTitle", "A\u{1}B")]).into_field_map();
        assert!(matches!(
            render_template(&template, &fields),
            Err(DocxError::Xml(_))
        ));
    }

    #[test]
    fn test_render_template_rejects_garbage() {
        assert!(matches!(
            render_template(b"not a docx", &FieldMap::new()),
            Err(DocxError::Zip(_))
        ));
    }
}
