use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = if path.is_file() {
                FileType::File
            } else if path.is_dir() {
                FileType::Directory
            } else {
                FileType::Symlink
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).context(format!("Failed to write file {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::create_dir_all(base.join("modules/custom/foo")).unwrap();
        fs::File::create(base.join("pantheon.yml"))
            .unwrap()
            .write_all(b"api_version: 1\n")
            .unwrap();
        fs::File::create(base.join("modules/custom/foo/foo.info.yml"))
            .unwrap()
            .write_all(b"name: Foo\ntype: module\n")
            .unwrap();

        dir
    }

    #[test]
    fn test_exists() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.exists(temp.path()));
        assert!(fs.exists(&temp.path().join("pantheon.yml")));
        assert!(!fs.exists(&temp.path().join("nonexistent")));
    }

    #[test]
    fn test_is_dir_and_is_file() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.is_dir(&temp.path().join("modules/custom")));
        assert!(!fs.is_dir(&temp.path().join("pantheon.yml")));
        assert!(fs.is_file(&temp.path().join("pantheon.yml")));
        assert!(!fs.is_file(temp.path()));
    }

    #[test]
    fn test_read_to_string() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let content = fs.read_to_string(&temp.path().join("pantheon.yml")).unwrap();
        assert_eq!(content, "api_version: 1\n");
    }

    #[test]
    fn test_read_dir_is_sorted() {
        let temp = create_test_dir();
        fs::create_dir(temp.path().join("core")).unwrap();
        let fs = RealFileSystem::new();

        let entries = fs.read_dir(temp.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert_eq!(names, vec!["core", "modules", "pantheon.yml"]);
        assert!(entries[0].is_dir());
        assert!(entries[2].is_file());
    }

    #[test]
    fn test_write_and_create_dir_all() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let dir = temp.path().join("web/modules/custom");
        fs.create_dir_all(&dir).unwrap();
        assert!(fs.is_dir(&dir));

        let file = temp.path().join("composer.json");
        fs.write_string(&file, "{}\n").unwrap();
        assert_eq!(fs.read_to_string(&file).unwrap(), "{}\n");
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let err = fs
            .read_to_string(&temp.path().join("missing.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
