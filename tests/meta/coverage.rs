//! Checks that `tests/unit` mirrors the layout of `src`

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    fn relative_files(root: &Path) -> BTreeSet<String> {
        let mut files = BTreeSet::new();
        if root.exists() {
            collect(root, root, &mut files).unwrap_or_else(|error| {
                panic!("failed to read {}: {error}", root.display());
            });
        }
        files
    }

    fn collect(root: &Path, dir: &Path, files: &mut BTreeSet<String>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                collect(root, &path, files)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                if let Ok(relative) = path.strip_prefix(root) {
                    files.insert(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        Ok(())
    }

    // Entry points and module files carry no logic of their own
    fn needs_counterpart(path: &str) -> bool {
        path != "main.rs" && path != "lib.rs" && !path.ends_with("mod.rs")
    }

    #[test]
    fn test_all_src_files_have_unit_tests() {
        let tests = relative_files(Path::new("tests/unit"));
        let missing: Vec<String> = relative_files(Path::new("src"))
            .into_iter()
            .filter(|path| needs_counterpart(path) && !tests.contains(path))
            .map(|path| format!("  - src/{path} -> tests/unit/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "The following src files are missing unit test counterparts:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let sources = relative_files(Path::new("src"));
        let orphaned: Vec<String> = relative_files(Path::new("tests/unit"))
            .into_iter()
            .filter(|path| needs_counterpart(path) && !sources.contains(path))
            .map(|path| format!("  - tests/unit/{path}"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "The following unit test files have no corresponding src files:\n{}",
            orphaned.join("\n")
        );
    }
}
