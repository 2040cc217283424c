use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::load_error;
use crate::error::Result;

const DOCUMENT_PART: &str = "word/document.xml";

// Text runs, paragraph ends, tabs and breaks in WordprocessingML.
static WORD_XML_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab\s*/>|<w:(?:br|cr)\b[^>]*/>")
        .expect("valid regex")
});

/// Extract plain text from a `.docx` file, one line per paragraph.
pub fn extract_docx_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| load_error(path, e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| load_error(path, e))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| load_error(path, e))?;

    Ok(word_xml_to_text(&xml))
}

pub(crate) fn word_xml_to_text(xml: &str) -> String {
    let mut text = String::with_capacity(xml.len() / 4);

    for caps in WORD_XML_TOKEN.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            text.push_str(&unescape_xml(run.as_str()));
            continue;
        }
        let token = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        if token.starts_with("<w:tab") {
            text.push('\t');
        } else {
            text.push('\n');
        }
    }

    text.trim_end().to_string()
}

fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
