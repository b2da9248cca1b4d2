use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use lopdf::Document as PdfDocument;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use tempfile::NamedTempFile;
use zip::ZipArchive;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Document, DocumentKind},
};

static SLIDE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("SLIDE_ENTRY is a valid regex pattern")
});

static DOCX_HEADER_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^word/header(\d*)\.xml$").expect("DOCX_HEADER_ENTRY is a valid regex pattern")
});

static DOCX_FOOTER_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^word/footer(\d*)\.xml$").expect("DOCX_FOOTER_ENTRY is a valid regex pattern")
});

const DOCX_BODY: &str = "word/document.xml";
const PPTX_PRESENTATION: &str = "ppt/presentation.xml";
const PPTX_PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Turns an uploaded document into plain text.
///
/// The upload is spilled to a named temporary file for the duration of the
/// call; the file is removed when the handle drops, on success and failure alike.
/// Unsupported extensions and zero-byte uploads yield empty text.
#[derive(Clone, Debug, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, document: &Document) -> AppResult<String> {
        let Some(kind) = document.kind() else {
            log::debug!("Unsupported extension '{}', no text extracted", document.extension);
            return Ok(String::new());
        };

        if document.bytes.is_empty() {
            return Ok(String::new());
        }

        let spill = spill_to_temp(document, kind)?;
        let text = match kind {
            DocumentKind::Pdf => extract_pdf(spill.path()),
            DocumentKind::Docx => extract_docx(spill.path()),
            DocumentKind::Pptx => extract_pptx(spill.path()),
        }?;

        log::debug!("Extracted {} characters from {} upload", text.len(), kind);
        Ok(text.trim().to_string())
    }
}

fn spill_to_temp(document: &Document, kind: DocumentKind) -> AppResult<NamedTempFile> {
    let mut spill = tempfile::Builder::new()
        .prefix("docquiz-")
        .suffix(&format!(".{}", kind))
        .tempfile()
        .map_err(|e| AppError::InternalError(format!("Failed to create temp file: {}", e)))?;

    spill
        .write_all(&document.bytes)
        .and_then(|_| spill.flush())
        .map_err(|e| AppError::InternalError(format!("Failed to write temp file: {}", e)))?;

    Ok(spill)
}

fn unreadable(kind: DocumentKind, err: impl std::fmt::Display) -> AppError {
    AppError::UnreadableDocument(format!("could not read {} document: {}", kind, err))
}

fn extract_pdf(path: &Path) -> AppResult<String> {
    let doc = PdfDocument::load(path).map_err(|e| unreadable(DocumentKind::Pdf, e))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                pages.push(page_text.trim().to_string())
            }
            Ok(_) => {}
            Err(e) => log::warn!("Skipping PDF page {}: {}", page_number, e),
        }
    }

    Ok(pages.join("\n"))
}

fn open_archive(path: &Path, kind: DocumentKind) -> AppResult<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| unreadable(kind, e))?;
    ZipArchive::new(file).map_err(|e| unreadable(kind, e))
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    kind: DocumentKind,
) -> AppResult<String> {
    let mut entry = archive.by_name(name).map_err(|e| unreadable(kind, e))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| unreadable(kind, e))?;
    Ok(xml)
}

fn has_entry<R: Read + Seek>(archive: &ZipArchive<R>, name: &str) -> bool {
    archive.file_names().any(|entry| entry == name)
}

/// Entries matching `pattern`, ordered by the number its first group captures.
/// A missing number (`header.xml`) sorts first.
fn numbered_entries<R: Read + Seek>(archive: &ZipArchive<R>, pattern: &Regex) -> Vec<String> {
    let mut entries: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = pattern.captures(name)?.get(1)?.as_str().parse().unwrap_or(0);
            Some((number, name.to_string()))
        })
        .collect();
    entries.sort_by_key(|(number, _)| *number);
    entries.into_iter().map(|(_, name)| name).collect()
}

/// Headers, then the body, then footers; each part's paragraphs on their own
/// lines.
fn extract_docx(path: &Path) -> AppResult<String> {
    let mut archive = open_archive(path, DocumentKind::Docx)?;

    let mut parts = numbered_entries(&archive, &DOCX_HEADER_ENTRY);
    parts.push(DOCX_BODY.to_string());
    parts.extend(numbered_entries(&archive, &DOCX_FOOTER_ENTRY));

    let mut sections = Vec::new();
    for part in parts {
        let xml = read_entry(&mut archive, &part, DocumentKind::Docx)?;
        let text = docx_body_text(&xml).map_err(|e| unreadable(DocumentKind::Docx, e))?;
        if !text.trim().is_empty() {
            sections.push(text.trim().to_string());
        }
    }

    Ok(sections.join("\n"))
}

/// Slide part names in presentation order. The order comes from the
/// presentation's slide id list; decks without `presentation.xml` fall back
/// to the slide file numbers.
fn slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> AppResult<Vec<String>> {
    if !has_entry(archive, PPTX_PRESENTATION) || !has_entry(archive, PPTX_PRESENTATION_RELS) {
        return Ok(numbered_entries(archive, &SLIDE_ENTRY));
    }

    let presentation = read_entry(archive, PPTX_PRESENTATION, DocumentKind::Pptx)?;
    let rels = read_entry(archive, PPTX_PRESENTATION_RELS, DocumentKind::Pptx)?;

    let slide_ids =
        presentation_slide_ids(&presentation).map_err(|e| unreadable(DocumentKind::Pptx, e))?;
    let targets = relationship_targets(&rels).map_err(|e| unreadable(DocumentKind::Pptx, e))?;

    let mut slides = Vec::with_capacity(slide_ids.len());
    for id in slide_ids {
        match targets.get(&id) {
            Some(target) => slides.push(resolve_part("ppt", target)),
            None => log::warn!("Slide relationship '{}' has no target", id),
        }
    }
    Ok(slides)
}

fn extract_pptx(path: &Path) -> AppResult<String> {
    let mut archive = open_archive(path, DocumentKind::Pptx)?;
    let slides = slide_order(&mut archive)?;

    if slides.is_empty() {
        log::warn!("No slide entries found in PPTX archive");
    }

    let mut text = String::new();
    for name in slides {
        if !has_entry(&archive, &name) {
            log::warn!("Skipping missing slide part '{}'", name);
            continue;
        }
        let xml = read_entry(&mut archive, &name, DocumentKind::Pptx)?;
        for shape_text in slide_shape_texts(&xml).map_err(|e| unreadable(DocumentKind::Pptx, e))? {
            text.push_str(&shape_text);
            text.push('\n');
        }
    }

    Ok(text)
}

/// Resolves a relationship target against the directory of its source part.
fn resolve_part(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn attribute_value(
    element: &quick_xml::events::BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, quick_xml::Error> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Relationship ids of `p:sldId` entries, in the order the deck shows them.
pub(crate) fn presentation_slide_ids(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"p:sldId" => {
                if let Some(id) = attribute_value(&e, b"r:id")? {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// `Id` to `Target` for every relationship in a `.rels` part.
pub(crate) fn relationship_targets(
    xml: &str,
) -> Result<HashMap<String, String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attribute_value(&e, b"Id")?, attribute_value(&e, b"Target")?)
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// Visible text of a WordprocessingML body: runs joined per paragraph,
/// paragraphs separated by newlines.
pub(crate) fn docx_body_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Text of every shape on a slide that carries a text body, in document
/// order. Paragraphs inside one shape are joined with newlines.
pub(crate) fn slide_shape_texts(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut has_text_body = false;
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => {
                    paragraphs.clear();
                    has_text_body = false;
                }
                b"p:txBody" => has_text_body = true,
                b"a:p" => current.clear(),
                b"a:t" => in_text_run = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text_run = false,
                b"a:p" => paragraphs.push(std::mem::take(&mut current)),
                b"p:sp" => {
                    if has_text_body {
                        shapes.push(paragraphs.join("\n"));
                    }
                    paragraphs.clear();
                    has_text_body = false;
                }
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"a:br" => current.push('\n'),
            Event::Text(t) if in_text_run => current.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
