//! Rewrites Claude-format prompt templates for the other assistant runtimes.
//!
//! Source templates are markdown with an optional `---` frontmatter block that
//! names tools, a color and the command name. Each target [`Dialect`] has its
//! own layout and frontmatter syntax:
//!
//! | Dialect       | Commands                       | Frontmatter                           |
//! |---------------|--------------------------------|---------------------------------------|
//! | `FlatToolMap` | `command/infra-<name>.md`      | `tools:` map of `name: true`, hex color |
//! | `Nested`      | `commands/infra/<name>.md`     | unchanged                             |
//! | `TomlPrompt`  | `commands/infra/<name>.toml`   | `description` + `prompt` strings      |
//!
//! A document whose frontmatter is never closed is returned unchanged.

pub mod frontmatter;
pub mod tools;

use frontmatter::{ColorRule, Rules};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Dialect
// ---------------------------------------------------------------------------

/// What a template is used for; conversion differs per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Command,
    Agent,
    /// Workflows, templates and references bundled next to the commands.
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    FlatToolMap,
    Nested,
    TomlPrompt,
}

impl Dialect {
    /// File extension a converted command is written with.
    pub fn command_extension(self) -> &'static str {
        match self {
            Dialect::TomlPrompt => "toml",
            Dialect::FlatToolMap | Dialect::Nested => "md",
        }
    }

    pub fn convert(self, kind: DocKind, content: &str) -> String {
        match (self, kind) {
            (Dialect::Nested, _) => content.to_string(),
            (Dialect::FlatToolMap, _) => to_flat_tool_map(content),
            (Dialect::TomlPrompt, DocKind::Command) => to_toml_prompt(&strip_sub_tags(content)),
            (Dialect::TomlPrompt, DocKind::Agent) => to_gemini_agent(content),
            (Dialect::TomlPrompt, DocKind::Support) => content.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path placeholders
// ---------------------------------------------------------------------------

/// Target-specific replacements for the `~/.claude/` and `./.claude/`
/// references templates are written with.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRewrite {
    /// Replaces `~/.claude/`; always ends with `/`.
    pub prefix: String,
    /// Runtime config dir name such as `.opencode`, replacing `.claude` in `./.claude/`.
    pub local_dir: String,
}

impl PathRewrite {
    pub fn apply(&self, content: &str) -> String {
        content
            .replace("~/.claude/", &self.prefix)
            .replace("./.claude/", &format!("./{}/", self.local_dir))
    }

    /// Same as [`apply`](Self::apply) and also rewrites `~/.opencode/`, used for
    /// flattened commands.
    pub fn apply_flat(&self, content: &str) -> String {
        self.apply(content).replace("~/.opencode/", &self.prefix)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static SUB_RE: OnceLock<Regex> = OnceLock::new();
static BRACED_VAR_RE: OnceLock<Regex> = OnceLock::new();
static BODY_RENAMES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn sub_re() -> &'static Regex {
    SUB_RE.get_or_init(|| Regex::new(r"<sub>(.*?)</sub>").unwrap())
}

fn braced_var_re() -> &'static Regex {
    BRACED_VAR_RE.get_or_init(|| Regex::new(r"\$\{(\w+)\}").unwrap())
}

fn body_renames() -> &'static [(Regex, &'static str)] {
    BODY_RENAMES.get_or_init(|| {
        [
            (r"\bAskUserQuestion\b", "question"),
            (r"\bSlashCommand\b", "skill"),
            (r"\bTodoWrite\b", "todowrite"),
            (r"/infra:", "/infra-"),
            (r"~/\.claude\b", "~/.config/opencode"),
            (
                r#"subagent_type="general-purpose""#,
                r#"subagent_type="general""#,
            ),
        ]
        .into_iter()
        .map(|(pat, rep)| (Regex::new(pat).unwrap(), rep))
        .collect()
    })
}

/// `<sub>text</sub>` becomes `*(text)*`; terminals without HTML show it as italics.
pub fn strip_sub_tags(content: &str) -> String {
    sub_re().replace_all(content, "*(${1})*").into_owned()
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// OpenCode form: tool names and command separators renamed across the whole
/// document, then the frontmatter tools rewritten as a `name: true` map.
pub fn to_flat_tool_map(content: &str) -> String {
    let mut converted = content.to_string();
    for (re, rep) in body_renames() {
        converted = re.replace_all(&converted, regex::NoExpand(*rep)).into_owned();
    }

    let Some(split) = frontmatter::split(&converted) else {
        return converted;
    };
    let scanned = frontmatter::scan(
        split.frontmatter,
        Rules {
            drop_name: true,
            color: ColorRule::ToHex,
        },
    );
    let mut lines = scanned.lines;
    if !scanned.tools.is_empty() {
        lines.push("tools:".to_string());
        lines.extend(
            scanned
                .tools
                .iter()
                .map(|t| format!("  {}: true", tools::opencode_tool(t))),
        );
    }
    frontmatter::join(&lines.join("\n"), split.body)
}

/// Gemini agent form: tools as a YAML list of Gemini names, no color, and
/// `${VAR}` written as `$VAR` since Gemini templates reserve the braces.
pub fn to_gemini_agent(content: &str) -> String {
    let Some(split) = frontmatter::split(content) else {
        return content.to_string();
    };
    let scanned = frontmatter::scan(
        split.frontmatter,
        Rules {
            drop_name: false,
            color: ColorRule::Drop,
        },
    );
    let mut lines = scanned.lines;
    let mapped: Vec<String> = scanned
        .tools
        .iter()
        .filter_map(|t| tools::gemini_tool(t))
        .collect();
    if !mapped.is_empty() {
        lines.push("tools:".to_string());
        lines.extend(mapped.iter().map(|t| format!("  - {t}")));
    }
    let body = braced_var_re().replace_all(split.body, "$$${1}");
    frontmatter::join(&lines.join("\n"), &strip_sub_tags(&body))
}

/// Gemini command form: a TOML document with an optional `description` taken
/// from the frontmatter and the trimmed body as `prompt`.
pub fn to_toml_prompt(content: &str) -> String {
    let Some(split) = frontmatter::split(content) else {
        return format!("prompt = {}\n", toml_string(content));
    };
    let description = split
        .frontmatter
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("description:"))
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let mut out = String::new();
    if let Some(d) = description {
        out.push_str(&format!("description = {}\n", toml_string(d)));
    }
    out.push_str(&format!("prompt = {}\n", toml_string(split.body.trim())));
    out
}

/// Quote `s` as a TOML basic string.
fn toml_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
