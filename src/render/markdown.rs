use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RE_NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").unwrap());
static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap());
static RE_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*?)\*").unwrap());
static RE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());

/// One block of the narrative, inline markers already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkdownBlock {
    Heading { level: u8, text: String },
    Bullet { text: String },
    Numbered { number: u32, text: String },
    Paragraph { text: String },
}

impl MarkdownBlock {
    /// Plain-text line for clipboard output.
    pub fn to_plain(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::Paragraph { text } => text.clone(),
            Self::Bullet { text } => format!("• {text}"),
            Self::Numbered { number, text } => format!("{number}. {text}"),
        }
    }
}

/// Remove `**bold**`, `__bold__`, `*italic*` and `` `code` `` markers.
pub fn strip_inline(text: &str) -> String {
    let text = RE_CODE.replace_all(text, "$1");
    let text = RE_BOLD.replace_all(&text, "$1$2");
    let text = RE_ITALIC.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Split markdown-like text into blocks. Consecutive plain lines form one
/// paragraph; blank lines end it.
pub fn parse_markdown(text: &str) -> Vec<MarkdownBlock> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();

    let flush = |paragraph: &mut Vec<String>, blocks: &mut Vec<MarkdownBlock>| {
        if !paragraph.is_empty() {
            blocks.push(MarkdownBlock::Paragraph {
                text: paragraph.join(" "),
            });
            paragraph.clear();
        }
    };

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some(block) = structural_block(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(block);
        } else {
            let stripped = strip_inline(line);
            if !stripped.is_empty() {
                paragraph.push(stripped);
            }
        }
    }
    flush(&mut paragraph, &mut blocks);
    blocks
}

/// Heading, bullet or numbered item, `None` for a paragraph line.
fn structural_block(line: &str) -> Option<MarkdownBlock> {
    if line.starts_with('#') {
        let level = line.chars().take_while(|c| *c == '#').count();
        let rest = &line[level..];
        if level <= 6 && (rest.is_empty() || rest.starts_with(' ')) {
            return Some(MarkdownBlock::Heading {
                level: level as u8,
                text: strip_inline(rest),
            });
        }
    }

    for marker in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(MarkdownBlock::Bullet {
                text: strip_inline(rest),
            });
        }
    }

    if let Some(caps) = RE_NUMBERED.captures(line) {
        let number = caps[1].parse().unwrap_or(0);
        return Some(MarkdownBlock::Numbered {
            number,
            text: strip_inline(&caps[2]),
        });
    }
    None
}

/// Whole narrative as plain text, one block per line.
pub fn markdown_to_plain(text: &str) -> String {
    parse_markdown(text)
        .iter()
        .map(MarkdownBlock::to_plain)
        .collect::<Vec<_>>()
        .join("\n")
}
