//! PDF generation from analysis markdown.
//!
//! Uses genpdf to render the classified blocks with the same structure as
//! the terminal view: headers, sub-headers, bullets, numbered items and
//! inline bold.

use std::path::Path;

use anyhow::{Context, Result};
use genpdf::elements::{Break, Paragraph};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, Margins, SimplePageDecorator};
use tracing::info;

use crate::config::ExportConfig;
use crate::markdown::{parse_markdown, Block, Inline};

/// Font sizes for PDF output (in points).
const NORMAL_SIZE: u8 = 11;
const SUB_HEADER_SIZE: u8 = 12;
const H1_SIZE: u8 = 18;
const H2_SIZE: u8 = 14;
const H3_SIZE: u8 = 13;

/// Page margins in mm.
const MARGIN_MM: f64 = 20.0;

/// Write analysis markdown to a PDF file.
///
/// # Errors
///
/// Returns an error if:
/// - The configured font family cannot be loaded
/// - The PDF file cannot be written to the specified path
pub(crate) fn write_pdf(
    path: &Path,
    title: &str,
    content: &str,
    fonts: &ExportConfig,
) -> Result<()> {
    info!(
        path = %path.display(),
        content_length = content.len(),
        "Generating PDF analysis"
    );

    let font_family = genpdf::fonts::from_files(&fonts.font_dir, &fonts.font_family, None)
        .with_context(|| {
            format!(
                "Failed to load font family {} from {}",
                fonts.font_family,
                fonts.font_dir.display()
            )
        })?;

    let mut doc = Document::new(font_family);
    doc.set_title(title);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Margins::trbl(MARGIN_MM, MARGIN_MM, MARGIN_MM, MARGIN_MM));
    doc.set_page_decorator(decorator);

    let title_style = Style::new().bold().with_font_size(H1_SIZE);
    doc.push(Paragraph::new(StyledString::new(title.to_string(), title_style)));
    doc.push(Break::new(1.0));

    for block in parse_markdown(content) {
        match block {
            Block::Spacer => doc.push(Break::new(0.5)),
            Block::Header { level, text } => {
                let size = match level {
                    1 => H1_SIZE,
                    2 => H2_SIZE,
                    _ => H3_SIZE,
                };
                doc.push(Break::new(0.5));
                doc.push(Paragraph::new(StyledString::new(
                    text,
                    Style::new().bold().with_font_size(size),
                )));
            }
            Block::SubHeader(text) => {
                doc.push(Paragraph::new(StyledString::new(
                    text,
                    Style::new().bold().with_font_size(SUB_HEADER_SIZE),
                )));
            }
            Block::Bullet(spans) => {
                doc.push(inline_paragraph("  \u{2022}  ", &spans));
            }
            Block::Numbered { number, content } => {
                doc.push(inline_paragraph(&format!("  {}  ", number), &content));
            }
            Block::Paragraph(spans) => doc.push(inline_paragraph("", &spans)),
        }
    }

    doc.render_to_file(path)
        .with_context(|| format!("Failed to render PDF to {}", path.display()))?;

    info!(path = %path.display(), "PDF analysis saved successfully");
    Ok(())
}

/// A paragraph with a plain prefix followed by inline spans.
fn inline_paragraph(prefix: &str, spans: &[Inline]) -> Paragraph {
    let normal = Style::new().with_font_size(NORMAL_SIZE);
    let bold = Style::new().bold().with_font_size(NORMAL_SIZE);

    let mut paragraph = Paragraph::default();
    if !prefix.is_empty() {
        paragraph.push_styled(prefix.to_string(), normal);
    }
    for span in spans {
        match span {
            Inline::Text(s) => paragraph.push_styled(s.clone(), normal),
            Inline::Bold(s) => paragraph.push_styled(s.clone(), bold),
        }
    }
    paragraph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fonts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = ExportConfig {
            font_dir: dir.path().join("no-fonts"),
            font_family: "Missing".to_string(),
        };
        let out = dir.path().join("analysis.pdf");

        let err = write_pdf(&out, "Coach's Analysis", "### Key Lesson", &fonts).unwrap_err();
        assert!(err.to_string().contains("Failed to load font family Missing"));
        assert!(!out.exists());
    }
}
