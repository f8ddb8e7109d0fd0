use crate::model::ScannedItem;
use jwalk::WalkDir;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Byte size of a file or directory subtree.
///
/// Missing paths are 0. Symbolic links count their own length and are never
/// followed, so cyclic links cannot loop. Entries that cannot be read are
/// skipped and the rest of the tree is still counted.
pub fn directory_size(path: &Path) -> u64 {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return 0;
    };
    if !metadata.is_dir() {
        return metadata.len();
    }

    // Serial walk per item; callers already parallelise across items.
    WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::Serial)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.metadata().ok())
        .filter(|m| m.is_file() || m.file_type().is_symlink())
        .map(|m| m.len())
        .sum()
}

pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

/// Non-hidden immediate children of `dir`, sorted by name.
///
/// A missing directory has no children. Any other listing failure is
/// returned to the caller.
pub fn list_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut children: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| !is_hidden(p))
        .collect();
    children.sort();
    Ok(children)
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Sizes every non-hidden child of `target_path` and returns the total and
/// the items, largest first.
pub fn scan_path(target_path: &Path) -> io::Result<(u64, Vec<ScannedItem>)> {
    let entries = list_children(target_path)?;

    let mut items: Vec<ScannedItem> = entries
        .par_iter()
        .map(|path| ScannedItem::new(display_name(path), path.clone(), directory_size(path)))
        .collect();

    let total_size: u64 = items.iter().map(|i| i.size).sum();
    sort_by_size(&mut items);
    Ok((total_size, items))
}

/// Largest first. Stable, so equal sizes keep their name order.
pub fn sort_by_size(items: &mut [ScannedItem]) {
    items.sort_by(|a, b| b.size.cmp(&a.size));
}


#[cfg(test)]
mod tests {
    use super::test_support::write_file;
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn directory_size_missing_path_is_zero() {
        let path = PathBuf::from("/path/to/non/existent/directory/xcsweep_test_random_12345");
        assert_eq!(directory_size(&path), 0);
    }

    #[test]
    fn directory_size_of_single_file() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("a.bin");
        write_file(&file, 321)?;
        assert_eq!(directory_size(&file), 321);
        Ok(())
    }

    #[test]
    fn directory_size_sums_nested_files() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("top.bin"), 100)?;
        write_file(&root.join("a/b/c/deep.bin"), 200)?;
        write_file(&root.join("a/.hidden/inner.bin"), 300)?;
        write_file(&root.join("x/y.bin"), 400)?;

        assert_eq!(directory_size(root), 1000);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn directory_size_does_not_follow_cyclic_links() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("data/file.bin"), 50)?;
        std::os::unix::fs::symlink(root, root.join("data/loop"))?;

        let link_len = fs::symlink_metadata(root.join("data/loop"))?.len();
        assert_eq!(directory_size(root), 50 + link_len);
        Ok(())
    }

    #[test]
    fn scan_path_structure() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        write_file(&root.join("FolderA/file1.txt"), 100)?;
        write_file(&root.join("FolderB/file2.txt"), 200)?;
        write_file(&root.join(".DS_Store"), 999)?;

        let (total_size, items) = scan_path(root)?;

        assert_eq!(total_size, 300);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "FolderB");
        assert_eq!(items[1].name, "FolderA");
        Ok(())
    }

    #[test]
    fn scan_path_empty_dir() -> Result<()> {
        let dir = tempdir()?;
        let (total_size, items) = scan_path(dir.path())?;
        assert_eq!(total_size, 0);
        assert!(items.is_empty());
        Ok(())
    }

    #[test]
    fn scan_non_existent_path() -> Result<()> {
        let path = PathBuf::from("/path/to/non/existent/directory/xcsweep_test_random_12345");
        let (total_size, items) = scan_path(&path)?;
        assert_eq!(total_size, 0);
        assert!(items.is_empty());
        Ok(())
    }

    #[test]
    fn scan_path_ties_are_stable() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        for name in ["c", "a", "b"] {
            write_file(&root.join(name).join("f"), 10)?;
        }
        write_file(&root.join("big/f"), 20)?;

        let names = |items: &[ScannedItem]| {
            items.iter().map(|i| i.name.clone()).collect::<Vec<_>>()
        };
        let (_, first) = scan_path(root)?;
        let (_, second) = scan_path(root)?;

        assert_eq!(names(&first), vec!["big", "a", "b", "c"]);
        assert_eq!(names(&first), names(&second));
        Ok(())
    }
}
