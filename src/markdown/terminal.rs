//! Terminal rendering of classified blocks.

use super::{parse_markdown, Block, Inline};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const NORMAL_INTENSITY: &str = "\x1b[22m";
const HEADER: &str = "\x1b[1;32m";
const SUB_HEADER: &str = "\x1b[1;36m";
const DIM: &str = "\x1b[2m";

/// Output styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    /// ANSI colours and bold
    Ansi,
    /// Text only, markers removed
    Plain,
}

/// Render markdown text for the terminal.
pub(crate) fn render_markdown(text: &str, style: Style) -> String {
    render(&parse_markdown(text), style)
}

/// Render blocks for the terminal, one output line per block.
pub(crate) fn render(blocks: &[Block], style: Style) -> String {
    let mut out = String::new();
    for block in blocks {
        render_block(&mut out, block, style);
        out.push('\n');
    }
    out
}

fn render_block(out: &mut String, block: &Block, style: Style) {
    match block {
        Block::Spacer => {}
        Block::Header { text, .. } => {
            let rule = "─".repeat(text.chars().count().max(3));
            match style {
                Style::Ansi => {
                    out.push_str(&format!("{HEADER}{text}{RESET}\n{DIM}{rule}{RESET}"));
                }
                Style::Plain => out.push_str(&format!("{text}\n{rule}")),
            }
        }
        Block::SubHeader(text) => match style {
            Style::Ansi => out.push_str(&format!("{SUB_HEADER}{text}{RESET}")),
            Style::Plain => out.push_str(text),
        },
        Block::Bullet(spans) => {
            out.push_str("  • ");
            push_inline(out, spans, style);
        }
        Block::Numbered { number, content } => {
            out.push_str("  ");
            match style {
                Style::Ansi => out.push_str(&format!("{BOLD}{number}{NORMAL_INTENSITY} ")),
                Style::Plain => out.push_str(&format!("{number} ")),
            }
            push_inline(out, content, style);
        }
        Block::Paragraph(spans) => push_inline(out, spans, style),
    }
}

fn push_inline(out: &mut String, spans: &[Inline], style: Style) {
    for span in spans {
        match (span, style) {
            (Inline::Text(s), _) | (Inline::Bold(s), Style::Plain) => out.push_str(s),
            (Inline::Bold(s), Style::Ansi) => {
                out.push_str(BOLD);
                out.push_str(s);
                out.push_str(NORMAL_INTENSITY);
            }
        }
    }
}
