//! WordprocessingML body model
//!
//! Views over the `word/document.xml` tree. A [`Document`] is a sequence of
//! [`Block`]s; tables nest rows, cells, and further blocks. [`Paragraph`] and
//! [`Run`] expose text the way Word renders it and can rewrite it in place.

use crate::error::DocxError;
use crate::xml::{Element, XmlTree};

const BODY: &str = "w:body";
const PARAGRAPH: &str = "w:p";
const PARAGRAPH_PROPS: &str = "w:pPr";
const HYPERLINK: &str = "w:hyperlink";
const RUN: &str = "w:r";
const RUN_PROPS: &str = "w:rPr";
const TEXT: &str = "w:t";
const TAB: &str = "w:tab";
const POSITIONAL_TAB: &str = "w:ptab";
const NO_BREAK_HYPHEN: &str = "w:noBreakHyphen";
const BREAK: &str = "w:br";
const CARRIAGE_RETURN: &str = "w:cr";
const TABLE: &str = "w:tbl";
const ROW: &str = "w:tr";
const CELL: &str = "w:tc";

/// The main document part
#[derive(Debug, Clone)]
pub struct Document {
    tree: XmlTree,
}

/// A block-level item of a body or table cell
pub enum Block<'a> {
    Paragraph(Paragraph<'a>),
    Table(Table<'a>),
}

pub struct Paragraph<'a> {
    el: &'a mut Element,
}

pub struct Run<'a> {
    el: &'a mut Element,
}

pub struct Table<'a> {
    el: &'a mut Element,
}

pub struct Row<'a> {
    el: &'a mut Element,
}

pub struct Cell<'a> {
    el: &'a mut Element,
}

impl Document {
    pub fn parse(xml: &str) -> Result<Self, DocxError> {
        let tree = XmlTree::parse(xml.trim_start_matches('\u{feff}'))?;
        let has_body = tree
            .root()
            .is_some_and(|root| root.find_child(BODY).is_some());
        if !has_body {
            return Err(DocxError::Xml("document part has no w:body".into()));
        }
        Ok(Self { tree })
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, DocxError> {
        self.tree.to_bytes()
    }

    /// Top-level blocks in body order
    pub fn blocks_mut(&mut self) -> Vec<Block<'_>> {
        match self.tree.root_mut().and_then(|root| root.find_child_mut(BODY)) {
            Some(body) => blocks_of(body),
            None => Vec::new(),
        }
    }

    /// Top-level paragraphs only
    pub fn paragraphs_mut(&mut self) -> Vec<Paragraph<'_>> {
        self.blocks_mut()
            .into_iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p),
                Block::Table(_) => None,
            })
            .collect()
    }

    /// Top-level tables only
    pub fn tables_mut(&mut self) -> Vec<Table<'_>> {
        self.blocks_mut()
            .into_iter()
            .filter_map(|block| match block {
                Block::Table(t) => Some(t),
                Block::Paragraph(_) => None,
            })
            .collect()
    }

    /// Every paragraph in document order, descending into table cells at any
    /// depth.
    pub fn all_paragraphs_mut(&mut self) -> Vec<Paragraph<'_>> {
        let mut out = Vec::new();
        flatten(self.blocks_mut(), &mut out);
        out
    }

    /// Plain text of every paragraph (tables included), one per line
    pub fn text(&self) -> String {
        let mut paragraphs = Vec::new();
        if let Some(body) = self.tree.root().and_then(|root| root.find_child(BODY)) {
            collect_paragraphs(body, &mut paragraphs);
        }
        paragraphs
            .into_iter()
            .map(paragraph_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Paragraph<'_> {
    pub fn text(&self) -> String {
        paragraph_text(self.el)
    }

    /// Replace the paragraph's content with a single run holding `text`.
    ///
    /// Paragraph properties survive; the new run takes the first original
    /// run's properties, so any other run formatting is lost.
    pub fn set_text(&mut self, text: &str) {
        let run_props = runs_of(self.el)
            .first()
            .and_then(|run| run.find_child(RUN_PROPS))
            .cloned();

        self.el.retain_elements(&[PARAGRAPH_PROPS]);

        let mut run = Element::new(RUN);
        if let Some(props) = run_props {
            run.push_element(props);
        }
        append_run_content(&mut run, text);
        self.el.push_element(run);
    }

    pub fn runs_mut(&mut self) -> Vec<Run<'_>> {
        let mut runs = Vec::new();
        for child in self.el.child_elements_mut() {
            if child.is(RUN) {
                runs.push(Run { el: child });
            } else if child.is(HYPERLINK) {
                runs.extend(
                    child
                        .child_elements_mut()
                        .filter(|el| el.is(RUN))
                        .map(|el| Run { el }),
                );
            }
        }
        runs
    }
}

impl Run<'_> {
    pub fn text(&self) -> String {
        run_text(self.el)
    }

    /// Rewrite the run's content, keeping its `w:rPr` untouched
    pub fn set_text(&mut self, text: &str) {
        self.el.retain_elements(&[RUN_PROPS]);
        append_run_content(self.el, text);
    }

    /// The run's formatting element, if it has one
    pub fn properties(&self) -> Option<&Element> {
        self.el.find_child(RUN_PROPS)
    }
}

impl<'a> Table<'a> {
    pub fn into_rows(self) -> Vec<Row<'a>> {
        self.el
            .child_elements_mut()
            .filter(|el| el.is(ROW))
            .map(|el| Row { el })
            .collect()
    }
}

impl<'a> Row<'a> {
    pub fn into_cells(self) -> Vec<Cell<'a>> {
        self.el
            .child_elements_mut()
            .filter(|el| el.is(CELL))
            .map(|el| Cell { el })
            .collect()
    }
}

impl<'a> Cell<'a> {
    pub fn into_blocks(self) -> Vec<Block<'a>> {
        blocks_of(self.el)
    }

    pub fn text(&self) -> String {
        let mut paragraphs = Vec::new();
        collect_paragraphs(self.el, &mut paragraphs);
        paragraphs
            .into_iter()
            .map(paragraph_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn blocks_of(container: &mut Element) -> Vec<Block<'_>> {
    container
        .child_elements_mut()
        .filter_map(|el| {
            if el.is(PARAGRAPH) {
                Some(Block::Paragraph(Paragraph { el }))
            } else if el.is(TABLE) {
                Some(Block::Table(Table { el }))
            } else {
                None
            }
        })
        .collect()
}

fn flatten<'a>(blocks: Vec<Block<'a>>, out: &mut Vec<Paragraph<'a>>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => out.push(p),
            Block::Table(table) => {
                for row in table.into_rows() {
                    for cell in row.into_cells() {
                        flatten(cell.into_blocks(), out);
                    }
                }
            }
        }
    }
}

fn collect_paragraphs<'a>(container: &'a Element, out: &mut Vec<&'a Element>) {
    for el in container.child_elements() {
        if el.is(PARAGRAPH) {
            out.push(el);
        } else if el.is(TABLE) {
            for cell in el
                .child_elements()
                .filter(|row| row.is(ROW))
                .flat_map(|row| row.child_elements().filter(|cell| cell.is(CELL)))
            {
                collect_paragraphs(cell, out);
            }
        }
    }
}

fn runs_of(paragraph: &Element) -> Vec<&Element> {
    let mut runs = Vec::new();
    for child in paragraph.child_elements() {
        if child.is(RUN) {
            runs.push(child);
        } else if child.is(HYPERLINK) {
            runs.extend(child.child_elements().filter(|el| el.is(RUN)));
        }
    }
    runs
}

fn paragraph_text(paragraph: &Element) -> String {
    runs_of(paragraph).into_iter().map(run_text).collect()
}

fn run_text(run: &Element) -> String {
    let mut text = String::new();
    for child in run.child_elements() {
        if child.is(TEXT) {
            text.push_str(&child.text_content());
        } else if child.is(TAB) || child.is(POSITIONAL_TAB) {
            text.push('\t');
        } else if child.is(NO_BREAK_HYPHEN) {
            text.push('-');
        } else if child.is(CARRIAGE_RETURN) {
            text.push('\n');
        } else if child.is(BREAK) {
            // page and column breaks carry no text
            let kind = child.attribute("w:type");
            if matches!(kind.as_deref(), None | Some("textWrapping")) {
                text.push('\n');
            }
        }
    }
    text
}

/// Emit `text` as run content: `w:t` segments, `w:tab` for tabs, `w:br` for
/// line breaks.
fn append_run_content(run: &mut Element, text: &str) {
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | '\r' => {
                flush_segment(run, &mut segment);
                let name = if ch == '\t' { TAB } else { BREAK };
                run.push_element(Element::new(name));
            }
            _ => segment.push(ch),
        }
    }
    flush_segment(run, &mut segment);
}

fn flush_segment(run: &mut Element, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    let mut t = Element::new(TEXT).with_attribute("xml:space", "preserve");
    t.push_text(segment);
    run.push_element(t);
    segment.clear();
}
