//! Team name to URL slug conversion.

use std::sync::OnceLock;

use regex_lite::Regex;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new("[^a-z0-9]+").expect("slug separator pattern is valid"))
}

/// Return the slug for a team name.
///
/// Lowercases the name, replaces every run of characters outside `[a-z0-9]`
/// with `-` and trims dashes from both ends. GitHub additionally
/// transliterates accented characters (`ä` to `a`); this does not.
pub fn slug(name: &str) -> String {
    let lower = name.to_lowercase();
    separator()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Ops"), "ops");
        assert_eq!(slug("Release Managers"), "release-managers");
        assert_eq!(slug("  CI / CD  "), "ci-cd");
        assert_eq!(slug("sig-k8s_v2"), "sig-k8s-v2");
        assert_eq!(slug("--team--"), "team");
        assert_eq!(slug("Bäcker"), "b-cker");
    }
}
