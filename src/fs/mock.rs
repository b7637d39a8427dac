use super::{FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system. Paths listed through `deny_removal` fail to
/// remove, which lets tests exercise removal error handling.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    undeletable: RwLock<HashSet<PathBuf>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            undeletable: RwLock::new(HashSet::new()),
            root,
        }
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

    pub fn deny_removal(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.undeletable.write().unwrap().insert(path);
    }

    /// Content of a file, if present
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.normalize_path(path.as_ref());
        self.files
            .read()
            .unwrap()
            .get(&path)
            .and_then(|e| e.content.clone())
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
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

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        if self.is_dir(path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.is_file(path) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        self.add_dir(path);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        if self.undeletable.read().unwrap().contains(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        let mut files = self.files.write().unwrap();
        if files.remove(&path).is_none() {
            return Err(anyhow!("Path not found: {:?}", path));
        }
        files.retain(|p, _| !p.starts_with(&path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("hello/requirements.txt", "requests");

        assert!(fs.exists(Path::new("/mock/hello/requirements.txt")));
        assert!(fs.is_file(Path::new("/mock/hello/requirements.txt")));
        assert!(fs.is_dir(Path::new("/mock/hello")));
    }

    #[test]
    fn test_read_to_string() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "hello world");

        let content = fs.read_to_string(Path::new("/mock/test.txt")).unwrap();
        assert_eq!(content, "hello world");
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let fs = MockFileSystem::new();
        fs.write_atomic(Path::new("hello/wrap.py"), "one").unwrap();
        fs.write_atomic(Path::new("hello/wrap.py"), "two").unwrap();

        assert_eq!(fs.contents("hello/wrap.py").as_deref(), Some("two"));
    }

    #[test]
    fn test_remove_tree() {
        let fs = MockFileSystem::new();
        fs.add_file("hello/lib/six.py", "");
        fs.add_file("hello/wrap.py", "");

        fs.remove(Path::new("hello/lib")).unwrap();

        assert!(!fs.exists(Path::new("hello/lib")));
        assert!(!fs.exists(Path::new("hello/lib/six.py")));
        assert!(fs.exists(Path::new("hello/wrap.py")));
    }

    #[test]
    fn test_remove_missing_fails() {
        let fs = MockFileSystem::new();
        assert!(fs.remove(Path::new("nothing")).is_err());
    }

    #[test]
    fn test_deny_removal() {
        let fs = MockFileSystem::new();
        fs.add_file("locked.txt", "");
        fs.deny_removal("locked.txt");

        assert!(fs.remove(Path::new("locked.txt")).is_err());
        assert!(fs.exists(Path::new("locked.txt")));
    }

    #[test]
    fn test_with_root() {
        let fs = MockFileSystem::with_root(PathBuf::from("/service"));
        fs.add_file("hello/handler.py", "def handler(e, c): pass");

        assert!(fs.exists(Path::new("/service/hello/handler.py")));
        assert_eq!(fs.root(), Path::new("/service"));
    }
}
