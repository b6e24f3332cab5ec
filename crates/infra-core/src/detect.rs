use std::path::Path;
use walkdir::WalkDir;

/// Marker files per language, checked in order.
const LANGUAGE_MARKERS: &[(&str, &[&str])] = &[
    ("javascript", &["package.json"]),
    ("typescript", &["tsconfig.json"]),
    (
        "python",
        &["requirements.txt", "pyproject.toml", "setup.py", "Pipfile"],
    ),
    ("go", &["go.mod"]),
    ("rust", &["Cargo.toml"]),
    ("java", &["pom.xml", "build.gradle"]),
    ("ruby", &["Gemfile"]),
];

const CSPROJ_MAX_DEPTH: usize = 3;

pub fn has_dockerfile(root: &Path) -> bool {
    ["Dockerfile", "dockerfile"]
        .iter()
        .any(|f| root.join(f).exists())
}

pub fn has_docker_compose(root: &Path) -> bool {
    [
        "docker-compose.yml",
        "docker-compose.yaml",
        "compose.yml",
        "compose.yaml",
    ]
    .iter()
    .any(|f| root.join(f).exists())
}

/// Languages present in the project, deduplicated, in detection order.
pub fn languages(root: &Path) -> Vec<&'static str> {
    let mut found: Vec<&'static str> = LANGUAGE_MARKERS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| root.join(m).exists()))
        .map(|(lang, _)| *lang)
        .collect();
    if has_csproj(root) {
        found.push("csharp");
    }
    found
}

fn has_csproj(root: &Path) -> bool {
    WalkDir::new(root)
        .max_depth(CSPROJ_MAX_DEPTH)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| {
            e.file_type().is_file()
                && e.path().extension().is_some_and(|ext| ext == "csproj")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn detects_in_order_without_duplicates() {
        let dir = TempDir::new().unwrap();
        for f in ["requirements.txt", "pyproject.toml", "package.json", "go.mod"] {
            std::fs::write(dir.path().join(f), "").unwrap();
        }
        assert_eq!(languages(dir.path()), vec!["javascript", "python", "go"]);
    }

    #[test]
    fn finds_nested_csproj_within_depth() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/Api");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Api.csproj"), "<Project/>").unwrap();
        assert_eq!(languages(dir.path()), vec!["csharp"]);
    }

    #[test]
    fn ignores_csproj_too_deep() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c/d");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Deep.csproj"), "").unwrap();
        assert!(languages(dir.path()).is_empty());
    }

    #[test]
    fn docker_markers() {
        let dir = TempDir::new().unwrap();
        assert!(!has_dockerfile(dir.path()));
        assert!(!has_docker_compose(dir.path()));
        std::fs::write(dir.path().join("Dockerfile"), "FROM scratch").unwrap();
        std::fs::write(dir.path().join("compose.yaml"), "services: {}").unwrap();
        assert!(has_dockerfile(dir.path()));
        assert!(has_docker_compose(dir.path()));
    }
}
