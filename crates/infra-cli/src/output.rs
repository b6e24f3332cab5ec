use serde::Serialize;
use std::io::Write;

/// JSON larger than this goes to a temp file and stdout carries `@file:<path>`.
const SPILL_THRESHOLD: usize = 50_000;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if json.len() > SPILL_THRESHOLD {
        let path = spill(&json)?;
        println!("@file:{path}");
    } else {
        println!("{json}");
    }
    Ok(())
}

/// Print `raw_value` as-is when `--raw` was given, otherwise `value` as JSON.
pub fn emit<T: Serialize>(value: &T, raw: bool, raw_value: impl Into<String>) -> anyhow::Result<()> {
    if raw {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(raw_value.into().as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }
    print_json(value)
}

fn spill(json: &str) -> anyhow::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("infra-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(json.as_bytes())?;
    let (_, path) = file.keep()?;
    tracing::debug!("output spilled to {}", path.display());
    Ok(path.display().to_string())
}
