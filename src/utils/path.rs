//! Path utilities: expand ~.

use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde("/tmp/x.pdf"), PathBuf::from("/tmp/x.pdf"));
        assert_eq!(expand_tilde("rel/x.pdf"), PathBuf::from("rel/x.pdf"));
        assert!(!expand_tilde("rel/x.pdf").is_absolute());
    }

    #[test]
    fn tilde_resolves_under_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/docs"), home.join("docs"));
        }
    }
}
