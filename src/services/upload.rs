//! Multi-file upload handler
//!
//! Files are handled one after another; a failure is rendered inline for
//! that file and the remaining files are still processed.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Html,
};
use html_escape::encode_text;
use tracing::{info, warn};

use crate::classifier::ClassificationResult;
use crate::pdf::pdf_to_text;
use crate::server::{render_page, AppState, ServerError};
use crate::utils::{preview, truncate_text};

const PREVIEW_CHARS: usize = 200;
const UPLOAD_FIELD: &str = "files";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
    Unsupported,
}

impl DocumentKind {
    pub fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()) {
            Some(ext) if ext == "pdf" => DocumentKind::Pdf,
            Some(ext) if ext == "txt" => DocumentKind::Text,
            _ => DocumentKind::Unsupported,
        }
    }
}

pub struct Upload {
    pub name: String,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub enum Outcome {
    Classified(ClassificationResult),
    Failed(String),
}

#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    /// Extracted text; `None` when extraction itself failed
    pub text: Option<String>,
    pub outcome: Outcome,
}

pub async fn classify_uploads(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, ServerError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(ServerError::bad_request)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await.map_err(ServerError::bad_request)?;
        uploads.push(Upload { name, bytes });
    }

    if uploads.is_empty() {
        return Ok(render_page(
            r#"<div class="info">👆 Please upload at least one .txt or .pdf file to analyze.</div>"#,
        ));
    }

    info!(files = uploads.len(), "Processing uploads");
    let mut body = String::new();
    for upload in uploads {
        let report = process_upload(&state, upload).await;
        body.push_str(&render_report(&report));
    }
    Ok(render_page(&body))
}

/// Extract, classify and report on a single uploaded file.
pub async fn process_upload(state: &AppState, upload: Upload) -> FileReport {
    let Upload { name, bytes } = upload;

    let text = match DocumentKind::from_file_name(&name) {
        DocumentKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
        DocumentKind::Pdf => {
            let pages = state.pdf_pages;
            let extracted = tokio::task::spawn_blocking(move || pdf_to_text(&bytes, pages))
                .await
                .map_err(|e| e.to_string())
                .and_then(|r| r.map_err(|e| e.to_string()));
            match extracted {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %name, error = %e, "PDF conversion failed");
                    return FileReport {
                        name,
                        text: None,
                        outcome: Outcome::Failed(format!("Error converting PDF: {}", e)),
                    };
                }
            }
        }
        DocumentKind::Unsupported => {
            return FileReport {
                outcome: Outcome::Failed(format!(
                    "Unsupported file type for {}: only .txt and .pdf are accepted",
                    name
                )),
                name,
                text: None,
            };
        }
    };

    let bounded = truncate_text(&text, state.input_policy);
    let outcome = match state.classifier.classify(&bounded).await {
        Ok(result) => Outcome::Classified(result),
        Err(e) => {
            warn!(file = %name, error = %e, "Classification failed");
            Outcome::Failed(format!("Error analyzing {}: {}", name, e))
        }
    };

    FileReport {
        name,
        text: Some(text),
        outcome,
    }
}

pub fn render_report(report: &FileReport) -> String {
    let mut html = format!(
        "<section class=\"file\">\n<h2>📄 {}</h2>\n",
        encode_text(&report.name)
    );

    if let Some(text) = &report.text {
        html.push_str(&format!(
            "<label>Preview</label>\n<textarea readonly rows=\"4\">{}</textarea>\n",
            encode_text(preview(text, PREVIEW_CHARS))
        ));
    }

    match &report.outcome {
        Outcome::Classified(result) => {
            html.push_str(&format!(
                "<div class=\"metrics\">\n\
                 <div class=\"metric\"><span class=\"label\">Category</span><span class=\"value\">{}</span></div>\n\
                 <div class=\"metric\"><span class=\"label\">Subcategory</span><span class=\"value\">{}</span></div>\n\
                 </div>\n",
                encode_text(result.category.as_str()),
                encode_text(&result.subcategory)
            ));
            if let Some(text) = &report.text {
                html.push_str(&format!(
                    "<details>\n<summary>View Full Document</summary>\n<textarea readonly rows=\"15\">{}</textarea>\n</details>\n",
                    encode_text(text)
                ));
            }
        }
        Outcome::Failed(message) => {
            html.push_str(&format!("<div class=\"error\">{}</div>\n", encode_text(message)));
        }
    }

    html.push_str("</section>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(DocumentKind::from_file_name("brief.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("notes.v2.txt"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_file_name("scan.docx"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_file_name("README"), DocumentKind::Unsupported);
    }

    #[test]
    fn test_render_classified_report_escapes_content() {
        let report = FileReport {
            name: "<b>deal</b>.txt".into(),
            text: Some("Agreement & <script>alert(1)</script>".into()),
            outcome: Outcome::Classified(ClassificationResult {
                category: Category::Contract,
                subcategory: "NDA".into(),
            }),
        };
        let html = render_report(&report);
        assert!(html.contains("📄 &lt;b&gt;deal&lt;/b&gt;.txt"));
        assert!(html.contains("Agreement &amp; &lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"<span class="value">Contract</span>"#));
        assert!(html.contains(r#"<span class="value">NDA</span>"#));
        assert!(html.contains("View Full Document"));
    }

    #[test]
    fn test_render_failed_report() {
        let report = FileReport {
            name: "broken.pdf".into(),
            text: None,
            outcome: Outcome::Failed("Error converting PDF: bad xref".into()),
        };
        let html = render_report(&report);
        assert!(html.contains(r#"<div class="error">Error converting PDF: bad xref</div>"#));
        assert!(!html.contains("Preview"));
        assert!(!html.contains("View Full Document"));
    }

    #[test]
    fn test_preview_is_limited() {
        let report = FileReport {
            name: "long.txt".into(),
            text: Some("x".repeat(500)),
            outcome: Outcome::Failed("Error analyzing long.txt: boom".into()),
        };
        let html = render_report(&report);
        assert!(html.contains(&format!(">{}</textarea>", "x".repeat(200))));
        assert!(!html.contains(&"x".repeat(201)));
    }
}
