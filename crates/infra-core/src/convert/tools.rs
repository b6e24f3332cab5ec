//! Fixed lookup tables for tool and color names.

const OPENCODE_TOOLS: &[(&str, &str)] = &[
    ("AskUserQuestion", "question"),
    ("SlashCommand", "skill"),
    ("TodoWrite", "todowrite"),
    ("WebFetch", "webfetch"),
    ("WebSearch", "websearch"),
];

const GEMINI_TOOLS: &[(&str, &str)] = &[
    ("Read", "read_file"),
    ("Write", "write_file"),
    ("Edit", "replace"),
    ("Bash", "run_shell_command"),
    ("Glob", "glob"),
    ("Grep", "search_file_content"),
    ("WebSearch", "google_web_search"),
    ("WebFetch", "web_fetch"),
    ("TodoWrite", "write_todos"),
    ("AskUserQuestion", "ask_user"),
];

/// Tools Gemini has no equivalent for.
const GEMINI_EXCLUDED: &[&str] = &["Task"];

const MCP_PREFIX: &str = "mcp__";

const COLOR_HEX: &[(&str, &str)] = &[
    ("cyan", "#00FFFF"),
    ("red", "#FF0000"),
    ("green", "#00FF00"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("magenta", "#FF00FF"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
    ("pink", "#FFC0CB"),
    ("white", "#FFFFFF"),
    ("black", "#000000"),
    ("gray", "#808080"),
    ("grey", "#808080"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// OpenCode tool name. MCP tools keep their name, everything else unmapped is lowercased.
pub fn opencode_tool(name: &str) -> String {
    if let Some(mapped) = lookup(OPENCODE_TOOLS, name) {
        return mapped.to_string();
    }
    if name.starts_with(MCP_PREFIX) {
        return name.to_string();
    }
    name.to_lowercase()
}

/// Gemini tool name, or `None` for tools Gemini cannot express.
pub fn gemini_tool(name: &str) -> Option<String> {
    if name.starts_with(MCP_PREFIX) || GEMINI_EXCLUDED.contains(&name) {
        return None;
    }
    Some(
        lookup(GEMINI_TOOLS, name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_lowercase()),
    )
}

/// Hex code for a lowercase color name.
pub fn color_hex(name: &str) -> Option<&'static str> {
    lookup(COLOR_HEX, name)
}

/// `#rgb` or `#rrggbb`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
