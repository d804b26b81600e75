use std::path::{Path, PathBuf};

use super::targets::Element;

/// Images the intro expects the host to serve, as absolute web paths.
pub fn required_assets() -> Vec<&'static str> {
    Element::ALL.iter().filter_map(|e| e.asset_path()).collect()
}

/// Required images missing under `public_root` (the directory the web paths
/// are served from).
pub fn missing_assets(public_root: &Path) -> Vec<PathBuf> {
    required_assets()
        .into_iter()
        .map(|web| public_root.join(web.trim_start_matches('/')))
        .filter(|path| !path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_bull_and_full_logo() {
        assert_eq!(required_assets(), vec!["/karion-bull.png", "/karion-full-logo.png"]);
    }

    #[test]
    fn reports_only_absent_files() {
        let dir = TempDir::new().unwrap();
        assert_eq!(missing_assets(dir.path()).len(), 2);

        std::fs::write(dir.path().join("karion-bull.png"), b"png").unwrap();
        assert_eq!(missing_assets(dir.path()), vec![dir.path().join("karion-full-logo.png")]);

        std::fs::write(dir.path().join("karion-full-logo.png"), b"png").unwrap();
        assert!(missing_assets(dir.path()).is_empty());
    }
}
