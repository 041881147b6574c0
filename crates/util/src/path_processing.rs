use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` to the user's home directory.
///
/// Accepts `~`, `~/rest` and the Windows-style `~\rest`. Paths without a
/// leading tilde, and bare `~` when no home directory can be determined, pass
/// through unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();

    let rest = match trimmed {
        "~" => Some(""),
        _ => trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")),
    };

    match (rest, home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_without_a_tilde_pass_through() {
        assert_eq!(expand_tilde("/etc/govctl/console.json"), PathBuf::from("/etc/govctl/console.json"));
        assert_eq!(expand_tilde("relative/console.json"), PathBuf::from("relative/console.json"));
    }

    #[test]
    fn leading_tilde_expands_to_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/govctl/console.json"), home.join("govctl/console.json"));
        }
    }
}
