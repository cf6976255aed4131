use std::path::Path;

use crate::error::{Error, Result};

/// Load a ticker universe file: one ticker per line, no header
///
/// Order is preserved; blank lines are skipped. A missing or unreadable
/// file is fatal to the run.
pub fn load_universe(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("Failed to read universe {}: {}", path.display(), e)))?;

    Ok(content
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Append an exchange suffix to every entry and rewrite the file in place
///
/// Entries already carrying the suffix are left untouched, so the step is
/// safe to repeat.
pub fn append_suffix(path: &Path, suffix: &str) -> Result<usize> {
    let tickers = load_universe(path)?;

    let suffixed: Vec<String> = tickers
        .into_iter()
        .map(|ticker| {
            if ticker.ends_with(suffix) {
                ticker
            } else {
                format!("{}{}", ticker, suffix)
            }
        })
        .collect();

    let mut content = suffixed.join("\n");
    content.push('\n');
    std::fs::write(path, content)
        .map_err(|e| Error::Io(format!("Failed to rewrite {}: {}", path.display(), e)))?;

    Ok(suffixed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_universe_preserves_order_and_skips_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("norwegian_tickers.csv");
        std::fs::write(&path, "EQNR\nDNB\n\nTEL\n").unwrap();

        let tickers = load_universe(&path).unwrap();
        assert_eq!(tickers, vec!["EQNR", "DNB", "TEL"]);
    }

    #[test]
    fn test_load_universe_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(load_universe(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn test_append_suffix_rewrites_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("norwegian_tickers.csv");
        std::fs::write(&path, "EQNR\nDNB\n").unwrap();

        let count = append_suffix(&path, ".OL").unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "EQNR.OL\nDNB.OL\n"
        );
    }

    #[test]
    fn test_append_suffix_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swedish_tickers.csv");
        std::fs::write(&path, "VOLV-B.ST\nERIC-B\n").unwrap();

        append_suffix(&path, ".ST").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "VOLV-B.ST\nERIC-B.ST\n"
        );
    }
}
