use std::sync::LazyLock;

use regex::Regex;

use super::lookup::GameVersionLookup;

static NON_WORD_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));
static TRAILING_PRERELEASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.-][a-zA-Z][A-Za-z0-9_]+$").expect("valid regex"));
static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[0-9]+[^0-9])?([0-9]+)$").expect("valid regex"));

/// Bring a game version into the platform's naming scheme.
///
/// Known versions come back under their canonical name, with `-Snapshot`
/// appended for snapshots. Unknown ones fall back to [`unify_game_version_syntax`].
pub async fn unify_game_version(lookup: &dyn GameVersionLookup, game_version: &str) -> String {
    let game_version = game_version.trim();
    match lookup.find_version_by_name(game_version).await {
        Some(version) if version.is_snapshot => format!("{}-Snapshot", version.name),
        Some(version) => version.name,
        None => unify_game_version_syntax(game_version),
    }
}

/// `1.20.1-rc1` → `1.20.1-Snapshot`, `1_19_4` → `1.19.4`.
pub fn unify_game_version_syntax(game_version: &str) -> String {
    let dotted = NON_WORD_RUNS.replace_all(game_version.trim(), ".");
    TRAILING_PRERELEASE
        .replace(&dotted, "-Snapshot")
        .into_owned()
}

/// `17` → `Java 17`. Only the trailing digit run is kept, so `17.0.2`
/// becomes `Java 2`.
pub fn unify_java(java: &str) -> String {
    let java = java.trim();
    match TRAILING_DIGITS.captures(java).and_then(|c| c.get(1)) {
        Some(digits) => format!("Java {}", digits.as_str()),
        None => java.to_string(),
    }
}

pub fn unify_loader(loader: &str) -> String {
    loader.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::lookup::StaticVersionLookup;

    #[test]
    fn java_keeps_only_the_trailing_digit_run() {
        assert_eq!(unify_java("Java 17"), "Java 17");
        assert_eq!(unify_java("17"), "Java 17");
        assert_eq!(unify_java(" 21 "), "Java 21");
        assert_eq!(unify_java("17.0.2"), "Java 2");
        assert_eq!(unify_java("java-8"), "Java 8");
        assert_eq!(unify_java("١٧"), "١٧");
        assert_eq!(unify_java("latest"), "latest");
    }

    #[test]
    fn syntactic_game_version_cleanup() {
        assert_eq!(unify_game_version_syntax("1.20.1-rc1"), "1.20.1-Snapshot");
        assert_eq!(unify_game_version_syntax("1.20-pre2"), "1.20-Snapshot");
        assert_eq!(unify_game_version_syntax("1_19_4"), "1.19.4");
        assert_eq!(unify_game_version_syntax("1.20.1"), "1.20.1");
        assert_eq!(unify_game_version_syntax("1.20.x"), "1.20.x");
    }

    #[test]
    fn loader_names_fold_case() {
        assert_eq!(unify_loader(" Fabric "), "fabric");
        assert_eq!(unify_loader("NeoForge"), "neoforge");
    }

    #[tokio::test]
    async fn lookup_wins_over_syntax() {
        let lookup = StaticVersionLookup::new()
            .with_version("23w45a", true)
            .with_version("1.20.2", false);

        assert_eq!(unify_game_version(&lookup, "23w45a").await, "23w45a-Snapshot");
        assert_eq!(unify_game_version(&lookup, " 1.20.2 ").await, "1.20.2");
        assert_eq!(unify_game_version(&lookup, "1.20.1-rc1").await, "1.20.1-Snapshot");
    }
}
