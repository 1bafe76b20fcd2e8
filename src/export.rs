use anyhow::Context;
use quick_xml::escape::escape;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const WORKBOOK_FILE_NAME: &str = "school_insights.xlsx";
const MAX_SHEET_NAME_CHARS: usize = 31;
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// One named collection of record-like JSON objects.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub records: Vec<serde_json::Value>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, records: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub sheets: Vec<String>,
    pub rows_exported: usize,
}

pub fn write_workbook(out_path: &Path, sheets: &[Sheet]) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }

    let names = sheet_names(sheets);
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut put = |entry: &str, body: String| -> anyhow::Result<()> {
        zip.start_file(entry, opts)
            .with_context(|| format!("failed to start {entry}"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("failed to write {entry}"))
    };

    put("[Content_Types].xml", content_types_xml(names.len()))?;
    put("_rels/.rels", package_rels_xml())?;
    put("docProps/core.xml", core_props_xml())?;
    put("xl/workbook.xml", workbook_xml(&names))?;
    put("xl/_rels/workbook.xml.rels", workbook_rels_xml(names.len()))?;

    let mut rows_exported = 0usize;
    if sheets.is_empty() {
        put("xl/worksheets/sheet1.xml", worksheet_xml(&[]))?;
    }
    for (i, sheet) in sheets.iter().enumerate() {
        rows_exported += sheet.records.len();
        put(
            &format!("xl/worksheets/sheet{}.xml", i + 1),
            worksheet_xml(&sheet.records),
        )?;
    }

    zip.finish().context("failed to finalize workbook")?;

    Ok(ExportSummary {
        sheets: names,
        rows_exported,
    })
}

/// Final sheet names: Excel-safe and unique ignoring case. A workbook with
/// no collections still gets one empty sheet.
pub fn sheet_names(sheets: &[Sheet]) -> Vec<String> {
    if sheets.is_empty() {
        return vec!["Sheet1".to_string()];
    }
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(sheets.len());
    for (i, sheet) in sheets.iter().enumerate() {
        let base = sanitize_sheet_name(&sheet.name, i + 1);
        let mut name = base.clone();
        let mut n = 2;
        while !taken.insert(name.to_lowercase()) {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
            name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        out.push(name);
    }
    out
}

pub fn sanitize_sheet_name(raw: &str, position: usize) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    if trimmed.is_empty() {
        return format!("Sheet{position}");
    }
    trimmed.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

/// Union of object keys across records, first-seen order.
pub fn columns(records: &[serde_json::Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for r in records {
        match r.as_object() {
            Some(obj) => {
                for k in obj.keys() {
                    if seen.insert(k.clone()) {
                        out.push(k.clone());
                    }
                }
            }
            None => {
                if seen.insert("value".to_string()) {
                    out.push("value".to_string());
                }
            }
        }
    }
    out
}

pub fn cell_text(v: &serde_json::Value) -> String {
    use serde_json::Value;
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| format!("{}: {}", k, cell_text(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Spreadsheet column letters for a zero-based index: 0 -> A, 26 -> AA.
pub fn column_letters(mut idx: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    out.iter().rev().collect()
}

fn xml_text(s: &str) -> String {
    let valid: String = s
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(valid.as_str()).into_owned()
}

fn inline_cell(col: usize, row: usize, text: &str) -> String {
    format!(
        r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        column_letters(col),
        row,
        xml_text(text)
    )
}

fn worksheet_xml(records: &[serde_json::Value]) -> String {
    let cols = columns(records);
    let mut xml = format!(r#"{XML_HEADER}<worksheet xmlns="{NS_MAIN}"><sheetData>"#);

    if !cols.is_empty() {
        xml.push_str(r#"<row r="1">"#);
        for (c, name) in cols.iter().enumerate() {
            xml.push_str(&inline_cell(c, 1, name));
        }
        xml.push_str("</row>");
    }

    for (i, record) in records.iter().enumerate() {
        let row = i + 2;
        xml.push_str(&format!(r#"<row r="{row}">"#));
        for (c, name) in cols.iter().enumerate() {
            let value = match record.as_object() {
                Some(obj) => obj.get(name).map(cell_text).unwrap_or_default(),
                None if name == "value" => cell_text(record),
                None => String::new(),
            };
            if !value.is_empty() {
                xml.push_str(&inline_cell(c, row, &value));
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn workbook_xml(names: &[String]) -> String {
    let mut xml = format!(
        r#"{XML_HEADER}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#
    );
    for (i, name) in names.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            xml_text(name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = format!(r#"{XML_HEADER}<Relationships xmlns="{NS_PKG_REL}">"#);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="{NS_REL}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn package_rels_xml() -> String {
    format!(
        concat!(
            r#"{header}<Relationships xmlns="{pkg}">"#,
            r#"<Relationship Id="rId1" Type="{rel}/officeDocument" Target="xl/workbook.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            "</Relationships>"
        ),
        header = XML_HEADER,
        pkg = NS_PKG_REL,
        rel = NS_REL
    )
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = format!(
        concat!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#
        ),
        XML_HEADER
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn core_props_xml() -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:creator>{}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            "</cp:coreProperties>"
        ),
        XML_HEADER,
        env!("CARGO_PKG_NAME"),
        created
    )
}
