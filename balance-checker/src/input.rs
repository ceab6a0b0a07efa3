use std::path::Path;

/// Addresses one per line, trimmed, blank lines skipped.
pub async fn read_addresses(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;

    Ok(parse_addresses(&content))
}

fn parse_addresses(content: &str) -> Vec<String> {
    content.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
