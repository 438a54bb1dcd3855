use std::{
    env,
    path::{Path, PathBuf},
};

pub const CONFIG_FILE: &str = ".actions-tree.toml";

/// Load config file content from CWD first, then home directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    let candidates = [Some(PathBuf::from(CONFIG_FILE)), home_config_path()];
    load_first(candidates.iter().flatten())
}

/// Content of the first readable file among `candidates`
fn load_first<'a>(candidates: impl IntoIterator<Item = &'a PathBuf>) -> Option<String> {
    candidates.into_iter().find_map(|path| read(path))
}

fn read(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    log::debug!("Loaded config from {}", path.display());
    Some(content)
}

/// ~/.actions-tree.toml, if HOME is set
fn home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_readable_candidate_wins() {
        let dir = env::temp_dir().join(format!("actions-tree-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let local = dir.join("local.toml");
        let home = dir.join("home.toml");
        std::fs::write(&home, "numbered_top_level = true").unwrap();

        let candidates = vec![local.clone(), home.clone()];
        assert_eq!(
            load_first(&candidates),
            Some("numbered_top_level = true".to_string())
        );

        std::fs::write(&local, "escape_action = \"Quit\"").unwrap();
        assert_eq!(
            load_first(&candidates),
            Some("escape_action = \"Quit\"".to_string())
        );
    }

    #[test]
    fn test_nothing_found() {
        let candidates = vec![PathBuf::from("/nonexistent/.actions-tree.toml")];
        assert_eq!(load_first(&candidates), None);
    }
}
