use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// A catalog entry. Identity is the path; the timestamp only orders entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub modified: SystemTime,
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List every image under `root`, oldest first.
///
/// Entries with equal timestamps keep the order `read_dir` produced them in.
/// A missing or unreadable root gives an empty catalog.
pub fn scan_catalog(root: &Path) -> Vec<ImageRef> {
    let start_time = Instant::now();
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

    let mut catalog = Vec::new();
    scan_dir(&root, &mut catalog);
    catalog.sort_by_key(|r| r.modified);

    log::trace!(
        "Scanned {} in {:.3}s ({} images)",
        root.display(),
        start_time.elapsed().as_secs_f64(),
        catalog.len()
    );
    catalog
}

fn scan_dir(dir: &Path, dest: &mut Vec<ImageRef>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Cannot read {}: {}", dir.display(), e);
            return;
        }
    };

    let mut subdirs = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let Ok(ft) = entry.file_type() else { continue };
        let p = entry.path();

        // Linked directories are not followed, linked files are listed.
        if ft.is_dir() {
            subdirs.push(p);
            continue;
        }
        if !is_image_file(&p) {
            continue;
        }
        let Ok(meta) = fs::metadata(&p) else { continue };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        dest.push(ImageRef { path: p, modified });
    }

    for sub in subdirs {
        scan_dir(&sub, dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, secs: u64) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_image_file(Path::new("/a/b.PNG")));
        assert!(is_image_file(Path::new("c.JpEg")));
        assert!(is_image_file(Path::new("d.gif")));
        assert!(!is_image_file(Path::new("e.webp")));
        assert!(!is_image_file(Path::new("png")));
        assert!(!is_image_file(Path::new("notes.txt")));
    }

    #[test]
    fn recurses_and_orders_by_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deeper").join("still");
        fs::create_dir_all(&nested).unwrap();

        touch(&dir.path().join("newest.jpg"), 300);
        touch(&nested.join("oldest.PNG"), 100);
        touch(&dir.path().join("deeper").join("middle.bmp"), 200);
        touch(&dir.path().join("ignored.txt"), 50);

        let names: Vec<_> = scan_catalog(dir.path())
            .into_iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["oldest.PNG", "middle.bmp", "newest.jpg"]);
    }

    #[test]
    fn equal_timestamps_keep_enumeration_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x.png", "y.png", "z.png", "w.png"] {
            touch(&dir.path().join(name), 500);
        }
        touch(&dir.path().join("early.png"), 100);

        let listed: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n != "early.png")
            .collect();
        let mut expected = vec!["early.png".to_string()];
        expected.extend(listed);

        let names: Vec<_> = scan_catalog(dir.path())
            .into_iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn paths_are_absolute() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.png"), 1);
        let catalog = scan_catalog(dir.path());
        assert_eq!(catalog.len(), 1);
        assert!(catalog[0].path.is_absolute());
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_catalog(&dir.path().join("gone")).is_empty());
    }
}
