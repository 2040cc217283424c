use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::load_error;
use crate::error::Result;

/// Extract the text of each page of a PDF, in page order.
///
/// `pdf_extract` panics on some malformed files instead of returning an
/// error; those panics are turned into a load error for this file.
pub fn extract_pdf_pages(path: &Path) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(load_error(path, e)),
        Err(panic_info) => {
            let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                format!("PDF extractor panicked: {}", s)
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                format!("PDF extractor panicked: {}", s)
            } else {
                "PDF extractor panicked".to_string()
            };
            Err(load_error(path, msg))
        }
    }
}
