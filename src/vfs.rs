use std::collections::HashMap;

use crate::sysinfo::SimTime;

pub const HOME_PATH: &str = "/home/user";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Clone, Debug)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub modified: SimTime,
    pub permissions: String,
}

impl DirEntry {
    pub fn dir(name: &str, at: SimTime) -> Self {
        DirEntry {
            name: name.into(),
            kind: EntryKind::Directory,
            size: None,
            modified: at,
            permissions: "drwxr-xr-x".into(),
        }
    }

    pub fn file(name: &str, size: u64, at: SimTime) -> Self {
        DirEntry {
            name: name.into(),
            kind: EntryKind::File,
            size: Some(size),
            modified: at,
            permissions: "-rw-r--r--".into(),
        }
    }

    pub fn executable(name: &str, size: u64, at: SimTime) -> Self {
        DirEntry {
            permissions: "-rwxr-xr-x".into(),
            ..DirEntry::file(name, size, at)
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VfsError {
    #[error("No such file or directory")]
    NotFound,
    #[error("File exists")]
    Exists,
    #[error("Is a directory")]
    IsDirectory,
}

/// In-memory virtual filesystem: a map from absolute directory path to its
/// ordered listing. Directory-kind entries are backed by their own key in
/// the map; file entries are not.
pub struct Vfs {
    listings: HashMap<String, Vec<DirEntry>>,
}

impl Vfs {
    /// Builds the fixed sample tree every session starts from.
    pub fn seeded(at: SimTime) -> Self {
        let mut listings = HashMap::new();

        listings.insert(
            HOME_PATH.to_string(),
            vec![
                DirEntry::dir("Documents", at),
                DirEntry::dir("Desktop", at),
                DirEntry::dir("Downloads", at),
                DirEntry::file("README.txt", 1024, at),
                DirEntry::executable("script.sh", 512, at),
            ],
        );
        listings.insert(
            "/home/user/Documents".to_string(),
            vec![
                DirEntry::file("project.txt", 2048, at),
                DirEntry::file("notes.md", 1536, at),
            ],
        );
        listings.insert("/home/user/Desktop".to_string(), Vec::new());
        listings.insert(
            "/home/user/Downloads".to_string(),
            vec![DirEntry::file("installer.zip", 10240, at)],
        );
        listings.insert("/home".to_string(), vec![DirEntry::dir("user", at)]);
        listings.insert(
            "/".to_string(),
            vec![
                DirEntry::dir("home", at),
                DirEntry::dir("usr", at),
                DirEntry::dir("etc", at),
                DirEntry::dir("var", at),
            ],
        );
        listings.insert("/usr".to_string(), Vec::new());
        listings.insert("/etc".to_string(), Vec::new());
        listings.insert("/var".to_string(), Vec::new());

        Vfs { listings }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.listings.contains_key(path)
    }

    pub fn list(&self, path: &str) -> Option<&[DirEntry]> {
        self.listings.get(path).map(|entries| entries.as_slice())
    }

    pub fn entry(&self, parent: &str, name: &str) -> Option<&DirEntry> {
        self.listings.get(parent)?.iter().find(|e| e.name == name)
    }

    /// Child path under `parent`, normalized so the root does not produce
    /// a doubled slash.
    pub fn join(parent: &str, name: &str) -> String {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }

    /// Resolves `target` against `current`: absolute paths pass through,
    /// `..` pops one segment, `.` stays, anything else is appended with
    /// duplicate slashes collapsed.
    pub fn resolve(current: &str, target: &str) -> String {
        if target.starts_with('/') {
            return target.to_string();
        }
        if target == ".." {
            let mut parts: Vec<&str> = current.split('/').filter(|p| !p.is_empty()).collect();
            parts.pop();
            return if parts.is_empty() {
                "/".to_string()
            } else {
                format!("/{}", parts.join("/"))
            };
        }
        if target == "." {
            return current.to_string();
        }
        let mut combined = format!("{}/{}", current, target);
        while combined.contains("//") {
            combined = combined.replace("//", "/");
        }
        combined
    }

    pub fn mkdir(&mut self, parent: &str, name: &str, at: SimTime) -> Result<(), VfsError> {
        let child = Self::join(parent, name);
        let listing = self.listings.get_mut(parent).ok_or(VfsError::NotFound)?;
        if listing.iter().any(|e| e.name == name) {
            return Err(VfsError::Exists);
        }
        listing.push(DirEntry::dir(name, at));
        self.listings.insert(child, Vec::new());
        Ok(())
    }

    pub fn remove(&mut self, parent: &str, name: &str, recursive: bool) -> Result<(), VfsError> {
        let listing = self.listings.get_mut(parent).ok_or(VfsError::NotFound)?;
        let idx = listing
            .iter()
            .position(|e| e.name == name)
            .ok_or(VfsError::NotFound)?;
        let is_dir = listing[idx].is_dir();
        if is_dir && !recursive {
            return Err(VfsError::IsDirectory);
        }
        listing.remove(idx);
        if is_dir {
            // Shallow delete: only the immediate key is dropped. Deeper
            // listings stay behind as unreachable orphans until the same
            // path is created again.
            self.listings.remove(&Self::join(parent, name));
        }
        Ok(())
    }

    /// Creates a zero-size file, or refreshes the timestamp of an
    /// existing entry.
    pub fn touch(&mut self, parent: &str, name: &str, at: SimTime) -> Result<(), VfsError> {
        let listing = self.listings.get_mut(parent).ok_or(VfsError::NotFound)?;
        match listing.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.modified = at,
            None => listing.push(DirEntry::file(name, 0, at)),
        }
        Ok(())
    }
}

/// Human-scaled size: divide by 1024 while a larger unit remains, one
/// decimal place, trailing `.0` dropped.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}{}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1}{}", rounded, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> SimTime {
        crate::sysinfo::SimClock::new().now()
    }

    fn names(vfs: &Vfs, path: &str) -> Vec<String> {
        vfs.list(path)
            .unwrap()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn test_seed_order_at_home() {
        let vfs = Vfs::seeded(now());
        assert_eq!(
            names(&vfs, HOME_PATH),
            vec!["Documents", "Desktop", "Downloads", "README.txt", "script.sh"]
        );
    }

    #[test]
    fn test_seed_directories_are_backed_by_keys() {
        let vfs = Vfs::seeded(now());
        for path in ["/", "/home", "/usr", "/etc", "/var", "/home/user/Desktop"] {
            assert!(vfs.contains(path), "missing listing for {}", path);
        }
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Vfs::resolve("/home/user", "/etc"), "/etc");
        assert_eq!(Vfs::resolve("/home/user/Documents", ".."), "/home/user");
        assert_eq!(Vfs::resolve("/home", ".."), "/");
        assert_eq!(Vfs::resolve("/home/user", "."), "/home/user");
        assert_eq!(Vfs::resolve("/home/user", "Documents"), "/home/user/Documents");
        assert_eq!(Vfs::resolve("/", "home"), "/home");
    }

    #[test]
    fn test_join_at_root() {
        assert_eq!(Vfs::join("/", "etc"), "/etc");
        assert_eq!(Vfs::join("/home/user", "projects"), "/home/user/projects");
    }

    #[test]
    fn test_mkdir_creates_entry_and_listing() {
        let mut vfs = Vfs::seeded(now());
        vfs.mkdir(HOME_PATH, "projects", now()).unwrap();
        assert!(names(&vfs, HOME_PATH).contains(&"projects".to_string()));
        assert!(vfs.contains("/home/user/projects"));
        assert_eq!(vfs.list("/home/user/projects").unwrap().len(), 0);
    }

    #[test]
    fn test_mkdir_duplicate_fails() {
        let mut vfs = Vfs::seeded(now());
        assert_eq!(
            vfs.mkdir(HOME_PATH, "Documents", now()),
            Err(VfsError::Exists)
        );
    }

    #[test]
    fn test_remove_file() {
        let mut vfs = Vfs::seeded(now());
        vfs.remove(HOME_PATH, "README.txt", false).unwrap();
        assert!(!names(&vfs, HOME_PATH).contains(&"README.txt".to_string()));
    }

    #[test]
    fn test_remove_directory_requires_recursive() {
        let mut vfs = Vfs::seeded(now());
        assert_eq!(
            vfs.remove(HOME_PATH, "Documents", false),
            Err(VfsError::IsDirectory)
        );
        vfs.remove(HOME_PATH, "Documents", true).unwrap();
        assert!(!vfs.contains("/home/user/Documents"));
    }

    #[test]
    fn test_remove_missing_fails() {
        let mut vfs = Vfs::seeded(now());
        assert_eq!(
            vfs.remove(HOME_PATH, "nosuchfile", false),
            Err(VfsError::NotFound)
        );
    }

    #[test]
    fn rm_dir_leaves_orphaned_grandchild() {
        let mut vfs = Vfs::seeded(now());
        vfs.mkdir(HOME_PATH, "a", now()).unwrap();
        vfs.mkdir("/home/user/a", "b", now()).unwrap();

        vfs.remove(HOME_PATH, "a", true).unwrap();
        assert!(!vfs.contains("/home/user/a"));
        // The grandchild listing survives as an orphan...
        assert!(vfs.contains("/home/user/a/b"));

        // ...and becomes reachable again once the path is recreated.
        vfs.mkdir(HOME_PATH, "a", now()).unwrap();
        assert!(vfs.contains("/home/user/a/b"));
    }

    #[test]
    fn test_touch_creates_then_refreshes() {
        let mut vfs = Vfs::seeded(now());
        let t0 = SimTime::from_secs(1000);
        let t1 = SimTime::from_secs(2000);

        vfs.touch(HOME_PATH, "new.txt", t0).unwrap();
        let count = |vfs: &Vfs| {
            vfs.list(HOME_PATH)
                .unwrap()
                .iter()
                .filter(|e| e.name == "new.txt")
                .count()
        };
        assert_eq!(count(&vfs), 1);
        assert_eq!(vfs.entry(HOME_PATH, "new.txt").unwrap().size, Some(0));

        vfs.touch(HOME_PATH, "new.txt", t1).unwrap();
        assert_eq!(count(&vfs), 1);
        assert_eq!(vfs.entry(HOME_PATH, "new.txt").unwrap().modified, t1);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(1024), "1K");
        assert_eq!(format_size(1536), "1.5K");
        assert_eq!(format_size(10240), "10K");
        assert_eq!(format_size(16384 * 1024 * 1024), "16G");
        assert_eq!(format_size(7000 * 1024 * 1024), "6.8G");
    }
}
