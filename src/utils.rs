use std::fs;
use std::path::Path;

/// Create an OSC8 file:// hyperlink for terminal output
pub fn osc8_file_link(path: &Path, text: &str) -> String {
    let abs_path = fs::canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string());
    format!("\x1b]8;;file://{}\x1b\\{}\x1b]8;;\x1b\\", abs_path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc8_file_link_missing_path() {
        let link = osc8_file_link(Path::new("/no/such/report.xlsx"), "report");
        assert_eq!(
            link,
            "\x1b]8;;file:///no/such/report.xlsx\x1b\\report\x1b]8;;\x1b\\"
        );
    }
}
