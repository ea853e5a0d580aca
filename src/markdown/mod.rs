//! Line-based markdown subset for model responses
//!
//! Each line is classified on its own, with no lookahead, into one
//! [`Block`]. Classification walks [`RULES`] in order and the first rule
//! whose predicate matches builds the block. Inline `**bold**` spans are
//! recognised in bullets, numbered items and paragraphs; headers and
//! sub-headers strip the markers instead.
//!
//! Anything else (nested emphasis, links, code spans, multi-line
//! constructs) passes through as literal text.

pub(crate) mod terminal;

use tracing::trace;

/// Bold marker used both for inline spans and short sub-header lines.
const BOLD_MARKER: &str = "**";

/// Sub-header lines must be shorter than this many characters.
const SUB_HEADER_MAX_CHARS: usize = 60;

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inline {
    Text(String),
    Bold(String),
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block {
    /// Blank line
    Spacer,
    /// `#`, `##` or `###` header
    Header { level: u8, text: String },
    /// Short line wrapped in `**`
    SubHeader(String),
    /// `- item` or `* item`
    Bullet(Vec<Inline>),
    /// `1. item`; `number` keeps the period, e.g. "1."
    Numbered { number: String, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
}

/// Block kinds in classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Spacer,
    Header,
    SubHeader,
    Bullet,
    Numbered,
    Paragraph,
}

/// A predicate/handler pair. Handlers are only called on lines their
/// predicate accepted.
pub(crate) struct Rule {
    pub(crate) kind: BlockKind,
    matches: fn(&str) -> bool,
    build: fn(&str) -> Block,
}

/// Classification precedence, first match wins.
pub(crate) static RULES: [Rule; 6] = [
    Rule {
        kind: BlockKind::Spacer,
        matches: str::is_empty,
        build: |_| Block::Spacer,
    },
    Rule {
        kind: BlockKind::Header,
        matches: |line| split_header(line).is_some(),
        build: build_header,
    },
    Rule {
        kind: BlockKind::SubHeader,
        matches: is_sub_header,
        build: |line| Block::SubHeader(line.replace(BOLD_MARKER, "")),
    },
    Rule {
        kind: BlockKind::Bullet,
        matches: |line| strip_bullet(line).is_some(),
        build: build_bullet,
    },
    Rule {
        kind: BlockKind::Numbered,
        matches: |line| split_numbered(line).is_some(),
        build: build_numbered,
    },
    Rule {
        kind: BlockKind::Paragraph,
        matches: |_| true,
        build: |line| Block::Paragraph(parse_inline(line)),
    },
];

/// Classify every line of `text`, in order, one block per line.
pub(crate) fn parse_markdown(text: &str) -> Vec<Block> {
    text.split('\n').map(classify_line).collect()
}

/// Classify a single (untrimmed) line.
pub(crate) fn classify_line(line: &str) -> Block {
    let trimmed = line.trim();
    let rule = matching_rule(trimmed);
    trace!(kind = ?rule.kind, "Classified line");
    (rule.build)(trimmed)
}

fn matching_rule(trimmed: &str) -> &'static Rule {
    // The paragraph rule accepts everything, so the fallback is never reached
    RULES
        .iter()
        .find(|rule| (rule.matches)(trimmed))
        .unwrap_or(&RULES[RULES.len() - 1])
}

fn split_header(line: &str) -> Option<(u8, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=3).contains(&level) {
        return None;
    }
    let rest = line[level..].strip_prefix(' ')?;
    Some((level as u8, rest.trim_start()))
}

fn build_header(line: &str) -> Block {
    match split_header(line) {
        Some((level, text)) => Block::Header {
            level,
            text: text.to_string(),
        },
        None => Block::Paragraph(parse_inline(line)),
    }
}

fn is_sub_header(line: &str) -> bool {
    line.len() > 2 * BOLD_MARKER.len()
        && line.starts_with(BOLD_MARKER)
        && line.ends_with(BOLD_MARKER)
        && line.chars().count() < SUB_HEADER_MAX_CHARS
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn build_bullet(line: &str) -> Block {
    Block::Bullet(parse_inline(strip_bullet(line).unwrap_or(line)))
}

/// Split "12. rest" into ("12.", "rest"); requires digits, a period and one
/// whitespace character.
fn split_numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after_period = line[digits..].strip_prefix('.')?;
    let separator = after_period.chars().next().filter(|c| c.is_whitespace())?;
    Some((
        &line[..=digits],
        &after_period[separator.len_utf8()..],
    ))
}

fn build_numbered(line: &str) -> Block {
    match split_numbered(line) {
        Some((number, rest)) => Block::Numbered {
            number: number.to_string(),
            content: parse_inline(rest),
        },
        None => Block::Paragraph(parse_inline(line)),
    }
}

/// Parse inline bold formatting within a line.
///
/// Pairs are matched left to right, non-greedy. An unmatched opening marker
/// and the rest of the line stay literal. Empty pairs produce nothing.
pub(crate) fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some(start) = remaining.find(BOLD_MARKER) else {
            spans.push(Inline::Text(remaining.to_string()));
            break;
        };

        let after_start = &remaining[start + BOLD_MARKER.len()..];
        let Some(end) = after_start.find(BOLD_MARKER) else {
            spans.push(Inline::Text(remaining.to_string()));
            break;
        };

        if start > 0 {
            spans.push(Inline::Text(remaining[..start].to_string()));
        }
        if end > 0 {
            spans.push(Inline::Bold(after_start[..end].to_string()));
        }
        remaining = &after_start[end + BOLD_MARKER.len()..];
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn bold(s: &str) -> Inline {
        Inline::Bold(s.to_string())
    }

    fn classify_kind(line: &str) -> BlockKind {
        matching_rule(line.trim()).kind
    }

    #[test]
    fn test_reference_scenario() {
        let blocks = parse_markdown("### Phase of Play\n- Good pressing\n**Note**\nPlain text");
        assert_eq!(
            blocks,
            vec![
                Block::Header {
                    level: 3,
                    text: "Phase of Play".to_string()
                },
                Block::Bullet(vec![text("Good pressing")]),
                Block::SubHeader("Note".to_string()),
                Block::Paragraph(vec![text("Plain text")]),
            ]
        );
    }

    #[test]
    fn test_rule_order_is_explicit() {
        let kinds: Vec<BlockKind> = RULES.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Spacer,
                BlockKind::Header,
                BlockKind::SubHeader,
                BlockKind::Bullet,
                BlockKind::Numbered,
                BlockKind::Paragraph,
            ]
        );
    }

    #[test]
    fn test_precedence_between_overlapping_rules() {
        // Header wins over a bold-wrapped line
        assert_eq!(classify_kind("### **Bold header**"), BlockKind::Header);
        // Short bold line wins over bullet-like content
        assert_eq!(classify_kind("**- not a bullet**"), BlockKind::SubHeader);
        // A long bold line falls through to paragraph
        let long = format!("**{}**", "x".repeat(60));
        assert_eq!(classify_kind(&long), BlockKind::Paragraph);
        // Bullet wins over numbered content
        assert_eq!(classify_kind("- 1. item"), BlockKind::Bullet);
        assert_eq!(classify_kind("   "), BlockKind::Spacer);
    }

    #[test]
    fn test_blank_lines_become_spacers() {
        let blocks = parse_markdown("a\n\n  \nb");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], Block::Spacer);
        assert_eq!(blocks[2], Block::Spacer);
    }

    #[test]
    fn test_header_levels_and_markers() {
        assert_eq!(
            classify_line("# Title"),
            Block::Header {
                level: 1,
                text: "Title".to_string()
            }
        );
        assert_eq!(
            classify_line("  ## Section  "),
            Block::Header {
                level: 2,
                text: "Section".to_string()
            }
        );
        // No space after the marker, or too many hashes: paragraph
        assert_eq!(classify_kind("###Title"), BlockKind::Paragraph);
        assert_eq!(classify_kind("#### Deep"), BlockKind::Paragraph);
    }

    #[test]
    fn test_header_keeps_markers_out() {
        assert_eq!(
            classify_line("**Key Lesson:**"),
            Block::SubHeader("Key Lesson:".to_string())
        );
        assert_eq!(
            classify_line("**Coaching** point **one**"),
            Block::SubHeader("Coaching point one".to_string())
        );
    }

    #[test]
    fn test_lone_marker_is_not_sub_header() {
        assert_eq!(classify_line("**"), Block::Paragraph(vec![text("**")]));
    }

    #[test]
    fn test_empty_bold_line_is_not_sub_header() {
        assert_eq!(classify_line("****"), Block::Paragraph(Vec::new()));
        assert_eq!(classify_line("**a**"), Block::SubHeader("a".to_string()));
    }

    #[test]
    fn test_bullets_with_inline_bold() {
        assert_eq!(
            classify_line("* Keep a **open body shape** when receiving"),
            Block::Bullet(vec![
                text("Keep a "),
                bold("open body shape"),
                text(" when receiving"),
            ])
        );
    }

    #[test]
    fn test_numbered_items() {
        assert_eq!(
            classify_line("12. **Scan** before receiving"),
            Block::Numbered {
                number: "12.".to_string(),
                content: vec![bold("Scan"), text(" before receiving")],
            }
        );
        assert_eq!(classify_kind("1.5 goals"), BlockKind::Paragraph);
        assert_eq!(classify_kind("3.no space"), BlockKind::Paragraph);
    }

    #[test]
    fn test_inline_bold_edge_cases() {
        assert_eq!(parse_inline(""), Vec::<Inline>::new());
        assert_eq!(parse_inline("no markers"), vec![text("no markers")]);
        assert_eq!(
            parse_inline("a **b** c **d"),
            vec![text("a "), bold("b"), text(" c **d")]
        );
        assert_eq!(parse_inline("****"), Vec::<Inline>::new());
        assert_eq!(
            parse_inline("**one****two**"),
            vec![bold("one"), bold("two")]
        );
    }

    #[test]
    fn test_unsupported_syntax_is_literal() {
        assert_eq!(
            classify_line("See [docs](http://x) and `code` and *em*"),
            Block::Paragraph(vec![text("See [docs](http://x) and `code` and *em*")])
        );
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let blocks = parse_markdown("### Analysis\r\n- Point\r\n");
        assert_eq!(
            blocks[0],
            Block::Header {
                level: 3,
                text: "Analysis".to_string()
            }
        );
        assert_eq!(blocks[1], Block::Bullet(vec![text("Point")]));
        assert_eq!(blocks[2], Block::Spacer);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let input = "### Analysis\n1. **First**\n\nText with **bold**";
        assert_eq!(parse_markdown(input), parse_markdown(input));
    }
}
