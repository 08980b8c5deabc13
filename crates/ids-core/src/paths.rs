use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const IDS_DIR: &str = ".ids";
pub const CONFIG_FILE: &str = ".ids/config.yaml";
pub const REGISTRY_FILE: &str = ".ids/registry.yaml";
pub const JUSTIFICATIONS_FILE: &str = ".ids/create-justifications.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn registry_path(root: &Path) -> PathBuf {
    root.join(REGISTRY_FILE)
}

pub fn justifications_path(root: &Path) -> PathBuf {
    root.join(JUSTIFICATIONS_FILE)
}

// ---------------------------------------------------------------------------
// Proposed entity ids
// ---------------------------------------------------------------------------

static NON_SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn non_slug_re() -> &'static Regex {
    NON_SLUG_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Derive the id a newly created artifact is expected to register under:
/// lowercase, hyphen-separated, at most 64 characters.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = non_slug_re().replace_all(&lower, "-");
    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > 64 {
        slug.truncate(64);
        slug = slug.trim_end_matches('-').to_string();
    }
    slug
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            registry_path(root),
            PathBuf::from("/tmp/proj/.ids/registry.yaml")
        );
        assert_eq!(
            justifications_path(root),
            PathBuf::from("/tmp/proj/.ids/create-justifications.yaml")
        );
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/.ids/config.yaml"));
    }

    #[test]
    fn slugify_intents() {
        assert_eq!(slugify("Deploy Kubernetes cluster"), "deploy-kubernetes-cluster");
        assert_eq!(slugify("  template: rendering/engine!  "), "template-rendering-engine");
        assert_eq!(slugify("???"), "");
        let long = "word ".repeat(30);
        let slug = slugify(&long);
        assert!(slug.len() <= 64);
        assert!(!slug.ends_with('-'));
    }
}
