use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system. Entries live in an ordered map so directory
/// listings and snapshots come out in a stable order.
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(BTreeMap::new()),
            root,
        };
        let root = fs.root.clone();
        fs.add_dir(root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
    }

    /// Removes a file or a directory with everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if !files.contains_key(&path) {
            bail!("Path not found: {:?}", path);
        }
        files.retain(|p, _| !p.starts_with(&path));
        Ok(())
    }

    /// Moves a file or a directory tree to a new location, creating missing
    /// parents of the destination.
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
        let from = self.normalize_path(from.as_ref());
        let to = self.normalize_path(to.as_ref());
        let mut files = self.files.write().unwrap();

        if !files.contains_key(&from) {
            bail!("Path not found: {:?}", from);
        }

        let moved: Vec<(PathBuf, MockEntry)> = files
            .iter()
            .filter(|(p, _)| p.starts_with(&from))
            .map(|(p, e)| (p.clone(), e.clone()))
            .collect();
        files.retain(|p, _| !p.starts_with(&from));

        if let Some(parent) = to.parent() {
            Self::ensure_parents(&mut files, parent);
        }
        for (path, entry) in moved {
            let suffix = path.strip_prefix(&from).unwrap_or(Path::new(""));
            let target = if suffix.as_os_str().is_empty() {
                to.clone()
            } else {
                to.join(suffix)
            };
            files.insert(target, entry);
        }
        Ok(())
    }

    /// Returns every file below `base` keyed by its path relative to `base`.
    pub fn snapshot(&self, base: impl AsRef<Path>) -> BTreeMap<PathBuf, String> {
        let base = self.normalize_path(base.as_ref());
        self.files
            .read()
            .unwrap()
            .iter()
            .filter(|(p, e)| e.file_type == FileType::File && p.starts_with(&base))
            .filter_map(|(p, e)| {
                let rel = p.strip_prefix(&base).ok()?.to_path_buf();
                Some((rel, e.content.clone().unwrap_or_default()))
            })
            .collect()
    }

    /// Replaces everything below `base` with the given relative file set.
    pub fn restore(&self, base: impl AsRef<Path>, files: &BTreeMap<PathBuf, String>) {
        let base = self.normalize_path(base.as_ref());
        {
            let mut entries = self.files.write().unwrap();
            entries.retain(|p, _| !p.starts_with(&base) || p == &base);
        }
        self.add_dir(&base);
        for (rel, content) in files {
            self.add_file(base.join(rel), content);
        }
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();

        match files.get(&path) {
            Some(entry) if entry.file_type == FileType::Directory => {}
            Some(_) => bail!("Not a directory: {:?}", path),
            None => bail!("Directory not found: {:?}", path),
        }

        let entries = files
            .iter()
            .filter(|(file_path, _)| file_path.parent() == Some(path.as_path()))
            .map(|(file_path, entry)| DirEntry {
                path: file_path.clone(),
                name: file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string(),
                file_type: entry.file_type,
            })
            .collect();

        Ok(entries)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        let parent_is_dir = path
            .parent()
            .and_then(|p| files.get(p))
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false);
        if !parent_is_dir {
            bail!("Parent directory does not exist: {:?}", path);
        }
        if matches!(files.get(&path), Some(e) if e.file_type == FileType::Directory) {
            bail!("Is a directory: {:?}", path);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(contents.to_string()),
                file_type: FileType::File,
            },
        );
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        if matches!(files.get(&path), Some(e) if e.file_type == FileType::File) {
            bail!("File exists: {:?}", path);
        }
        Self::ensure_parents(&mut files, &path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("modules/custom/foo/foo.info.yml", "name: Foo");

        assert!(fs.is_dir(Path::new("modules/custom/foo")));
        assert!(fs.is_file(Path::new("/mock/modules/custom/foo/foo.info.yml")));
        assert_eq!(
            fs.read_to_string(Path::new("modules/custom/foo/foo.info.yml"))
                .unwrap(),
            "name: Foo"
        );
    }

    #[test]
    fn test_read_dir_lists_direct_children_sorted() {
        let fs = MockFileSystem::new();
        fs.add_file("modules/contrib/views/views.info.yml", "");
        fs.add_file("modules/contrib/admin_toolbar/admin_toolbar.info.yml", "");
        fs.add_file("modules/README.txt", "");

        let names: Vec<String> = fs
            .read_dir(Path::new("modules/contrib"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["admin_toolbar", "views"]);

        let top = fs.read_dir(Path::new("modules")).unwrap();
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_read_dir_missing() {
        let fs = MockFileSystem::new();
        assert!(fs.read_dir(Path::new("nope")).is_err());
    }

    #[test]
    fn test_write_requires_parent() {
        let fs = MockFileSystem::new();
        assert!(fs.write_string(Path::new("a/b.txt"), "x").is_err());

        fs.create_dir_all(Path::new("a")).unwrap();
        fs.write_string(Path::new("a/b.txt"), "x").unwrap();
        assert_eq!(fs.read_to_string(Path::new("a/b.txt")).unwrap(), "x");
    }

    #[test]
    fn test_rename_moves_tree() {
        let fs = MockFileSystem::new();
        fs.add_file("sites/default/config/system.site.yml", "name: x");
        fs.add_file("sites/default/config/.htaccess", "deny");

        fs.rename("sites/default/config", "config").unwrap();

        assert!(!fs.exists(Path::new("sites/default/config")));
        assert!(fs.is_file(Path::new("config/system.site.yml")));
        assert!(fs.is_file(Path::new("config/.htaccess")));
    }

    #[test]
    fn test_remove_and_snapshot() {
        let fs = MockFileSystem::new();
        fs.add_file("site/a.txt", "a");
        fs.add_file("site/dir/b.txt", "b");

        fs.remove("site/dir").unwrap();
        let snapshot = fs.snapshot("site");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(Path::new("a.txt")).map(String::as_str), Some("a"));
        assert!(fs.remove("site/dir").is_err());
    }

    #[test]
    fn test_restore_replaces_tree() {
        let fs = MockFileSystem::new();
        fs.add_file("site/old.txt", "old");

        let mut files = BTreeMap::new();
        files.insert(PathBuf::from("web/index.php"), "<?php".to_string());
        fs.restore("site", &files);

        assert!(!fs.exists(Path::new("site/old.txt")));
        assert!(fs.is_file(Path::new("site/web/index.php")));
    }
}
