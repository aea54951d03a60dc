//! DOCX package parsing.
//!
//! Manual ZIP + streaming XML parsing: the package is a ZIP archive
//! whose `word/document.xml` part carries the body, `word/styles.xml`
//! the style definitions, and `word/_rels/document.xml.rels` the
//! relationships for embedded media.

use super::options::{ErrorMode, ParseOptions};
use super::styles::{self, StyleMap};
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, BreakKind, Document, Drawing, Extent, FieldCharKind, LineNumbering,
    LineNumberRestart, Metadata, MediaPart, PageNumbering, Paragraph, Relationship, Run,
    RunContent, Section, SectionStart, Table, TableCell, TableRow,
};
use chrono::DateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Extract an attribute value by key from an element.
#[inline]
pub(crate) fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract an attribute value by key and parse as i64.
#[inline]
fn get_attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

/// Check if the w:val attribute is explicitly "0" or "false".
#[inline]
fn val_is_off(e: &BytesStart) -> bool {
    matches!(
        get_attr(e, b"w:val").as_deref(),
        Some("0") | Some("false") | Some("none")
    )
}

/// DOCX parser over an in-memory package.
pub struct DocxParser {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    options: ParseOptions,
}

impl DocxParser {
    /// Open a DOCX file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse a DOCX from bytes with default options.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a DOCX from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let archive =
            ZipArchive::new(Cursor::new(data.to_vec())).map_err(|_| Error::UnknownFormat)?;
        let parser = Self { archive, options };
        if !parser.has_part("word/document.xml") {
            return Err(Error::MissingPart("word/document.xml".into()));
        }
        Ok(parser)
    }

    fn has_part(&self, name: &str) -> bool {
        self.archive.file_names().any(|n| n == name)
    }

    fn read_part(&mut self, name: &str) -> Result<String> {
        let mut entry = self.archive.by_name(name)?;
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        Ok(content)
    }

    fn read_part_optional(&mut self, name: &str) -> Result<Option<String>> {
        if !self.has_part(name) {
            return Ok(None);
        }
        match self.read_part(name) {
            Ok(content) => Ok(Some(content)),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("skipping unreadable part {}: {}", name, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Parse the package into a document tree.
    pub fn parse(mut self) -> Result<Document> {
        let styles_xml = self.read_part_optional("word/styles.xml")?;
        let style_map = match &styles_xml {
            Some(xml) => styles::parse_style_names(xml)?,
            None => StyleMap::new(),
        };
        let numbering_xml = self.read_part_optional("word/numbering.xml")?;

        let relationships = match self.read_part_optional("word/_rels/document.xml.rels")? {
            Some(xml) => parse_relationships(&xml)?,
            None => Vec::new(),
        };

        let metadata = if self.options.read_metadata {
            match self.read_part_optional("docProps/core.xml")? {
                Some(xml) => parse_core_metadata(&xml)?,
                None => Metadata::default(),
            }
        } else {
            Metadata::default()
        };

        let media = if self.options.keep_media {
            self.read_media_parts()?
        } else {
            Vec::new()
        };

        let document_xml = self.read_part("word/document.xml")?;
        let (body, sections) = parse_body(&document_xml, &style_map)?;

        Ok(Document {
            metadata,
            body,
            sections,
            styles_xml,
            numbering_xml,
            relationships,
            media,
        })
    }

    fn read_media_parts(&mut self) -> Result<Vec<MediaPart>> {
        let names: Vec<String> = self
            .archive
            .file_names()
            .filter(|n| n.starts_with("word/media/"))
            .map(str::to_string)
            .collect();

        let mut media = Vec::with_capacity(names.len());
        for name in names {
            let mut entry = self.archive.by_name(&name)?;
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            media.push(MediaPart { name, data });
        }
        Ok(media)
    }
}

/// State for the body walk: open containers are kept on stacks so
/// tables nest naturally.
#[derive(Default)]
struct BodyState {
    blocks: Vec<Block>,
    sections: Vec<Section>,
    table_stack: Vec<Table>,
    row_stack: Vec<TableRow>,
    cell_stack: Vec<TableCell>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    in_instr: bool,
}

impl BodyState {
    fn push_block(&mut self, block: Block) {
        if let Some(cell) = self.cell_stack.last_mut() {
            cell.blocks.push(block);
        } else {
            self.blocks.push(block);
        }
    }

    fn end_paragraph(&mut self) {
        if let Some(paragraph) = self.paragraph.take() {
            self.push_block(Block::Paragraph(paragraph));
        }
    }

    fn end_run(&mut self) {
        if let Some(run) = self.run.take() {
            if let Some(paragraph) = self.paragraph.as_mut() {
                paragraph.runs.push(run);
            }
        }
    }
}

/// Parse `word/document.xml` into body blocks and sections.
fn parse_body(xml: &str, style_map: &StyleMap) -> Result<(Vec<Block>, Vec<Section>)> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(false);

    let mut state = BodyState::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => state.paragraph = Some(Paragraph::new()),
                b"w:pPr" => state.in_ppr = true,
                b"w:rPr" => state.in_rpr = true,
                b"w:r" => state.run = Some(Run::default()),
                b"w:t" => state.in_text = true,
                b"w:instrText" => state.in_instr = true,
                b"w:drawing" => {
                    let drawing = capture_drawing(&mut reader, &e)?;
                    if let Some(run) = state.run.as_mut() {
                        run.content.push(RunContent::Drawing(drawing));
                    }
                }
                b"w:sectPr" => {
                    let section = parse_section_properties(&mut reader)?;
                    state.sections.push(section);
                    let index = state.sections.len() - 1;
                    if let Some(paragraph) = state.paragraph.as_mut() {
                        paragraph.section_break = Some(index);
                    }
                }
                b"w:tbl" => state.table_stack.push(Table::new()),
                b"w:tr" => state.row_stack.push(TableRow::default()),
                b"w:tc" => state.cell_stack.push(TableCell {
                    width_twips: None,
                    blocks: Vec::new(),
                }),
                _ => handle_leaf(&mut state, &e, style_map),
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => {
                    state.paragraph = Some(Paragraph::new());
                    state.end_paragraph();
                }
                _ => handle_leaf(&mut state, &e, style_map),
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(run) = state.run.as_mut() {
                    if state.in_text {
                        run.content.push(RunContent::Text(text));
                    } else if state.in_instr {
                        run.content.push(RunContent::InstrText(text));
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => state.end_paragraph(),
                b"w:r" => state.end_run(),
                b"w:pPr" => state.in_ppr = false,
                b"w:rPr" => state.in_rpr = false,
                b"w:t" => state.in_text = false,
                b"w:instrText" => state.in_instr = false,
                b"w:tc" => {
                    if let Some(cell) = state.cell_stack.pop() {
                        if let Some(row) = state.row_stack.last_mut() {
                            row.cells.push(cell);
                        }
                    }
                }
                b"w:tr" => {
                    if let Some(row) = state.row_stack.pop() {
                        if let Some(table) = state.table_stack.last_mut() {
                            table.rows.push(row);
                        }
                    }
                }
                b"w:tbl" => {
                    if let Some(table) = state.table_stack.pop() {
                        state.push_block(Block::Table(table));
                    }
                }
                b"w:body" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if state.sections.is_empty() {
        state.sections.push(Section::new());
    }

    Ok((state.blocks, state.sections))
}

/// Handle property leaf elements (usually self-closing).
fn handle_leaf(state: &mut BodyState, e: &BytesStart, style_map: &StyleMap) {
    match e.name().as_ref() {
        b"w:pStyle" => {
            if state.in_ppr {
                if let (Some(paragraph), Some(id)) =
                    (state.paragraph.as_mut(), get_attr(e, b"w:val"))
                {
                    let name = style_map.get(&id).cloned().unwrap_or_else(|| id.clone());
                    paragraph.style_id = Some(id);
                    paragraph.style_name = Some(name);
                }
            }
        }
        b"w:jc" => {
            if let Some(val) = get_attr(e, b"w:val") {
                if state.in_ppr {
                    if let Some(paragraph) = state.paragraph.as_mut() {
                        paragraph.props.alignment = Some(Alignment::from_wml(&val));
                    }
                } else if state.paragraph.is_none() {
                    if let Some(table) = state.table_stack.last_mut() {
                        table.alignment = Alignment::from_wml(&val);
                    }
                }
            }
        }
        b"w:ind" => {
            if state.in_ppr {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.props.left_indent_twips = get_attr_i64(e, b"w:left");
                    paragraph.props.right_indent_twips = get_attr_i64(e, b"w:right");
                    paragraph.props.first_line_indent_twips = get_attr_i64(e, b"w:firstLine");
                }
            }
        }
        b"w:spacing" => {
            if state.in_ppr && !state.in_rpr {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.props.space_before_pts =
                        get_attr_i64(e, b"w:before").map(|v| v as f32 / 20.0);
                    paragraph.props.space_after_pts =
                        get_attr_i64(e, b"w:after").map(|v| v as f32 / 20.0);
                    paragraph.props.line_spacing =
                        get_attr_i64(e, b"w:line").map(|v| v as f32 / 240.0);
                }
            }
        }
        b"w:widowControl" => {
            if state.in_ppr {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.props.widow_control = Some(!val_is_off(e));
                }
            }
        }
        b"w:keepLines" => {
            if state.in_ppr {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.props.keep_together = Some(!val_is_off(e));
                }
            }
        }
        b"w:keepNext" => {
            if state.in_ppr {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.props.keep_with_next = Some(!val_is_off(e));
                }
            }
        }
        b"w:rFonts" => {
            if state.in_rpr {
                if let Some(run) = state.run.as_mut() {
                    run.props.font = get_attr(e, b"w:ascii");
                }
            }
        }
        b"w:sz" => {
            if state.in_rpr {
                if let Some(run) = state.run.as_mut() {
                    run.props.size_pts = get_attr_i64(e, b"w:val").map(|half| half as f32 / 2.0);
                }
            }
        }
        b"w:b" => {
            if state.in_rpr {
                if let Some(run) = state.run.as_mut() {
                    run.props.bold = Some(!val_is_off(e));
                }
            }
        }
        b"w:i" => {
            if state.in_rpr {
                if let Some(run) = state.run.as_mut() {
                    run.props.italic = Some(!val_is_off(e));
                }
            }
        }
        b"w:u" => {
            if state.in_rpr {
                if let Some(run) = state.run.as_mut() {
                    run.props.underline = Some(!val_is_off(e));
                }
            }
        }
        b"w:color" => {
            if state.in_rpr {
                if let Some(run) = state.run.as_mut() {
                    run.props.color = get_attr(e, b"w:val").filter(|v| v != "auto");
                }
            }
        }
        b"w:br" => {
            if let Some(run) = state.run.as_mut() {
                let kind = match get_attr(e, b"w:type").as_deref() {
                    Some("page") => BreakKind::Page,
                    _ => BreakKind::Line,
                };
                run.content.push(RunContent::Break(kind));
            }
        }
        b"w:fldChar" => {
            if let Some(run) = state.run.as_mut() {
                let kind = match get_attr(e, b"w:fldCharType").as_deref() {
                    Some("begin") => FieldCharKind::Begin,
                    Some("separate") => FieldCharKind::Separate,
                    _ => FieldCharKind::End,
                };
                run.content.push(RunContent::FieldChar(kind));
            }
        }
        b"w:tblW" => {
            if state.cell_stack.is_empty() {
                if let Some(table) = state.table_stack.last_mut() {
                    table.width_twips = get_attr_i64(e, b"w:w");
                }
            }
        }
        b"w:tblLayout" => {
            if let Some(table) = state.table_stack.last_mut() {
                if get_attr(e, b"w:type").as_deref() == Some("fixed") {
                    table.autofit = false;
                }
            }
        }
        b"w:gridCol" => {
            if let Some(table) = state.table_stack.last_mut() {
                if let Some(width) = get_attr_i64(e, b"w:w") {
                    table.grid.push(width);
                }
            }
        }
        b"w:tcW" => {
            if let Some(cell) = state.cell_stack.last_mut() {
                cell.width_twips = get_attr_i64(e, b"w:w");
            }
        }
        _ => {}
    }
}

/// Capture a `w:drawing` subtree verbatim, extracting the declared
/// extent on the way through.
fn capture_drawing(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Drawing> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Start(start.to_owned()))?;

    let mut extent: Option<Extent> = None;
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"wp:extent" && extent.is_none() {
                    extent = read_extent(&e);
                }
                depth += 1;
                writer.write_event(Event::Start(e.to_owned()))?;
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"wp:extent" && extent.is_none() {
                    extent = read_extent(&e);
                }
                writer.write_event(Event::Empty(e.to_owned()))?;
            }
            Ok(Event::End(e)) => {
                depth -= 1;
                writer.write_event(Event::End(e.to_owned()))?;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Text(e)) => {
                writer.write_event(Event::Text(e.to_owned()))?;
            }
            Ok(Event::Eof) => {
                return Err(Error::Xml("unterminated w:drawing element".into()));
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    let xml = String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned();
    Ok(Drawing::new(xml, extent))
}

fn read_extent(e: &BytesStart) -> Option<Extent> {
    let cx = get_attr_i64(e, b"cx")?;
    let cy = get_attr_i64(e, b"cy")?;
    Some(Extent { cx, cy })
}

/// Parse a `w:sectPr` subtree into a section.
///
/// Header and footer references are not resolved: the layout mutator
/// rebuilds every slot from scratch, so inherited content is left as
/// linked.
fn parse_section_properties(reader: &mut Reader<&[u8]>) -> Result<Section> {
    let mut section = Section::new();
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                read_section_leaf(&mut section, &e);
            }
            Ok(Event::Empty(e)) => read_section_leaf(&mut section, &e),
            Ok(Event::End(e)) => {
                depth -= 1;
                if depth == 0 || e.name().as_ref() == b"w:sectPr" {
                    break;
                }
            }
            Ok(Event::Eof) => {
                return Err(Error::Xml("unterminated w:sectPr element".into()));
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(section)
}

fn read_section_leaf(section: &mut Section, e: &BytesStart) {
    match e.name().as_ref() {
        b"w:pgSz" => {
            if let Some(width) = get_attr_i64(e, b"w:w") {
                section.page.width_twips = width;
            }
            if let Some(height) = get_attr_i64(e, b"w:h") {
                section.page.height_twips = height;
            }
        }
        b"w:pgMar" => {
            if let Some(v) = get_attr_i64(e, b"w:top") {
                section.page.margin_top_twips = v;
            }
            if let Some(v) = get_attr_i64(e, b"w:bottom") {
                section.page.margin_bottom_twips = v;
            }
            if let Some(v) = get_attr_i64(e, b"w:left") {
                section.page.margin_left_twips = v;
            }
            if let Some(v) = get_attr_i64(e, b"w:right") {
                section.page.margin_right_twips = v;
            }
        }
        b"w:cols" => {
            if let Some(num) = get_attr_i64(e, b"w:num") {
                section.columns.count = num.max(1) as u16;
            }
            if let Some(space) = get_attr_i64(e, b"w:space") {
                section.columns.space_twips = space;
            }
        }
        b"w:type" => {
            if let Some(val) = get_attr(e, b"w:val") {
                section.start = SectionStart::from_wml(&val);
            }
        }
        b"w:titlePg" => section.title_page = true,
        b"w:evenAndOddHeaders" => section.even_odd_headers = true,
        b"w:lnNumType" => {
            let mut numbering = LineNumbering::continuous(360);
            if let Some(v) = get_attr_i64(e, b"w:countBy") {
                numbering.count_by = v.max(1) as u32;
            }
            if let Some(v) = get_attr_i64(e, b"w:distance") {
                numbering.distance_twips = v;
            }
            if let Some(v) = get_attr_i64(e, b"w:numStart") {
                numbering.start = v.max(1) as u32;
            }
            numbering.restart = match get_attr(e, b"w:restart").as_deref() {
                Some("newPage") => LineNumberRestart::NewPage,
                Some("newSection") => LineNumberRestart::NewSection,
                _ => LineNumberRestart::Continuous,
            };
            section.line_numbering = Some(numbering);
        }
        b"w:pgNumType" => {
            section.page_numbering = Some(PageNumbering {
                start: get_attr_i64(e, b"w:start").map(|v| v.max(0) as u32),
            });
        }
        _ => {}
    }
}

/// Parse a relationships part.
fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut relationships = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"Relationship" {
                    let id = get_attr(&e, b"Id").unwrap_or_default();
                    let rel_type = get_attr(&e, b"Type").unwrap_or_default();
                    let target = get_attr(&e, b"Target").unwrap_or_default();
                    let external =
                        get_attr(&e, b"TargetMode").as_deref() == Some("External");
                    relationships.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Parse docProps/core.xml metadata.
fn parse_core_metadata(xml: &str) -> Result<Metadata> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut metadata = Metadata::default();
    let mut current: Option<&'static str> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current = match e.name().as_ref() {
                    b"dc:title" => Some("title"),
                    b"dc:creator" => Some("creator"),
                    b"dcterms:created" => Some("created"),
                    b"dcterms:modified" => Some("modified"),
                    _ => None,
                };
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current {
                    Some("title") => metadata.title = Some(text),
                    Some("creator") => metadata.creator = Some(text),
                    Some("created") => {
                        metadata.created = DateTime::parse_from_rfc3339(&text)
                            .ok()
                            .map(|dt| dt.to_utc());
                    }
                    Some("modified") => {
                        metadata.modified = DateTime::parse_from_rfc3339(&text)
                            .ok()
                            .map(|dt| dt.to_utc());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(metadata)
}
