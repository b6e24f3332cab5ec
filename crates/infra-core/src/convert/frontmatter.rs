//! Frontmatter splitting and the line scanner that pulls tool lists out of it.

const MARKER: &str = "---";

/// A document split at its `---` frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split<'a> {
    /// Frontmatter text between the markers, trimmed.
    pub frontmatter: &'a str,
    /// Everything after the closing marker, untouched.
    pub body: &'a str,
}

/// Split `content` into frontmatter and body. `None` when the document does
/// not open with `---` or the block is never closed.
pub fn split(content: &str) -> Option<Split<'_>> {
    if !content.starts_with(MARKER) {
        return None;
    }
    let end = MARKER.len() + content[MARKER.len()..].find(MARKER)?;
    Some(Split {
        frontmatter: content[MARKER.len()..end].trim(),
        body: &content[end + MARKER.len()..],
    })
}

pub fn join(frontmatter: &str, body: &str) -> String {
    format!("{MARKER}\n{}\n{MARKER}{body}", frontmatter.trim())
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRule {
    /// Named colors become `color: "#RRGGBB"`; valid hex values pass; the rest is dropped.
    ToHex,
    Drop,
}

#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub drop_name: bool,
    pub color: ColorRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InToolList,
}

/// Frontmatter lines that survive the scan, plus the tool names it collected
/// in source order, not yet mapped.
#[derive(Debug, Default, PartialEq)]
pub struct Scanned {
    pub lines: Vec<String>,
    pub tools: Vec<String>,
}

fn inline_tools(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Walk the frontmatter line by line.
///
/// `allowed-tools:` and an empty `tools:` open a list whose `- name` items are
/// collected. Blank lines and other dash lines inside a list are dropped; any
/// other line closes the list and is then handled as a normal line.
pub fn scan(frontmatter: &str, rules: Rules) -> Scanned {
    let mut out = Scanned::default();
    let mut state = State::Outside;

    for line in frontmatter.lines() {
        let trimmed = line.trim();

        if state == State::InToolList {
            if let Some(item) = trimmed.strip_prefix("- ") {
                out.tools.push(item.trim().to_string());
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('-') {
                continue;
            }
            state = State::Outside;
        }

        if trimmed.starts_with("allowed-tools:") {
            state = State::InToolList;
        } else if let Some(value) = trimmed.strip_prefix("tools:") {
            let value = value.trim();
            if value.is_empty() {
                state = State::InToolList;
            } else {
                out.tools.extend(inline_tools(value));
            }
        } else if rules.drop_name && trimmed.starts_with("name:") {
            // dropped
        } else if let Some(value) = trimmed.strip_prefix("color:") {
            if rules.color == ColorRule::ToHex {
                let value = value.trim().to_lowercase();
                if let Some(hex) = super::tools::color_hex(&value) {
                    out.lines.push(format!("color: \"{hex}\""));
                } else if super::tools::is_hex_color(&value) {
                    out.lines.push(line.to_string());
                }
            }
        } else {
            out.lines.push(line.to_string());
        }
    }

    out
}
