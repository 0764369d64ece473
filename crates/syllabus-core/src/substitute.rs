//! Placeholder substitution
//!
//! Two strategies:
//!
//! - **Run-local** (`{Objectives}` only): the token is replaced inside the
//!   single run that contains it, so that run's formatting is untouched. A
//!   token split across runs is not seen by this pass.
//! - **Paragraph-level** (every field): the token is searched in the
//!   paragraph's concatenated run text, and on a hit the whole paragraph is
//!   rewritten as one run. Split tokens are found, but the paragraph's mixed
//!   formatting collapses to that of its first run.
//!
//! The run-local pass goes first. Because the field map also carries
//! `Objectives`, a split `{Objectives}` token is still caught by the
//! paragraph-level pass.

use tracing::debug;

use crate::document::Document;
use crate::fields::{FieldMap, OBJECTIVES_KEY};

/// Counts of replacements made by [`fill_document`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Runs rewritten by the run-local pass
    pub runs_rewritten: usize,
    /// Paragraphs rewritten by the paragraph-level pass
    pub paragraphs_rewritten: usize,
}

/// `{name}`
pub fn placeholder(name: &str) -> String {
    format!("{{{}}}", name)
}

/// Replace `token` inside every run that wholly contains it
pub fn replace_in_runs(document: &mut Document, token: &str, value: &str) -> usize {
    let mut rewritten = 0;
    for mut paragraph in document.all_paragraphs_mut() {
        for mut run in paragraph.runs_mut() {
            let text = run.text();
            if text.contains(token) {
                run.set_text(&text.replace(token, value));
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Replace `token` in every paragraph whose combined text contains it
pub fn replace_in_paragraphs(document: &mut Document, token: &str, value: &str) -> usize {
    let mut rewritten = 0;
    for mut paragraph in document.all_paragraphs_mut() {
        let text = paragraph.text();
        if text.contains(token) {
            paragraph.set_text(&text.replace(token, value));
            rewritten += 1;
        }
    }
    rewritten
}

/// Fill every known placeholder in `document` from `fields`.
///
/// Placeholders without a matching field are left as they are.
pub fn fill_document(document: &mut Document, fields: &FieldMap) -> SubstitutionReport {
    let mut report = SubstitutionReport::default();

    if let Some(objectives) = fields.get(OBJECTIVES_KEY) {
        report.runs_rewritten =
            replace_in_runs(document, &placeholder(OBJECTIVES_KEY), objectives);
    }

    for (key, value) in fields.iter() {
        let rewritten = replace_in_paragraphs(document, &placeholder(key), value);
        if rewritten > 0 {
            debug!(field = key, paragraphs = rewritten, "Filled placeholder");
        }
        report.paragraphs_rewritten += rewritten;
    }

    report
}
