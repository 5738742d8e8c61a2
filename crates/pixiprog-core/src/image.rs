//! Configuration image selection and loading
//!
//! The board ships with a primary bitstream and a cycle of demo bitstreams.
//! Which file to load depends on which demo (if any) is currently active in
//! the FPGA, reported by the demo status register. The selection policy is a
//! plain ordered table lookup so it can be tested without any filesystem:
//! the existence check is injected by the caller.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default location of the primary configuration image
pub const DEFAULT_IMAGE: &str = "/home/pixi-200/pixi.bin";

/// Default demo image locations, in demo-sequence order
pub const DEFAULT_DEMO_IMAGES: [&str; 6] = [
    "/home/pixi-200/pixi_demo_001.bin",
    "/home/pixi-200/pixi_demo_002.bin",
    "/home/pixi-200/pixi_demo_003.bin",
    "/home/pixi-200/pixi_demo_004.bin",
    "/home/pixi-200/pixi_demo_005.bin",
    "/home/pixi-200/pixi_demo_006.bin",
];

/// Ordered table of candidate configuration images
///
/// Selection precedence, given the demo status value `s` last read from the
/// device:
///
/// 1. the demo image in slot `s`, if that file exists (demo `s` was active,
///    so its successor build is staged in that slot);
/// 2. the primary image, if it exists;
/// 3. the first demo image, if it exists (wraps the demo cycle around when
///    no primary image is installed);
/// 4. otherwise no candidate.
#[derive(Debug, Clone)]
pub struct ImageTable {
    primary: PathBuf,
    demos: Vec<PathBuf>,
}

impl ImageTable {
    /// Build a table from an explicit primary path and demo slots
    pub fn new(primary: impl Into<PathBuf>, demos: Vec<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            demos,
        }
    }

    /// The standard PiXi-200 install locations
    pub fn pixi_defaults() -> Self {
        Self::new(
            DEFAULT_IMAGE,
            DEFAULT_DEMO_IMAGES.iter().map(PathBuf::from).collect(),
        )
    }

    /// A table holding a single operator-supplied file and no demo slots
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Vec::new())
    }

    /// Select the image to load for the given demo status value.
    ///
    /// `exists` is the file-existence predicate; production callers pass
    /// `Path::exists`, tests pass a closure over a fixed set.
    pub fn select<F>(&self, status: u16, exists: F) -> Option<&Path>
    where
        F: Fn(&Path) -> bool,
    {
        if let Some(demo) = self.demos.get(usize::from(status)) {
            if exists(demo) {
                return Some(demo);
            }
        }
        if exists(&self.primary) {
            return Some(&self.primary);
        }
        self.demos
            .first()
            .map(PathBuf::as_path)
            .filter(|&first| exists(first))
    }
}

/// Read a configuration image fully into memory.
///
/// The whole file is held in one buffer for the duration of the transfer;
/// allocation failure is reported distinctly rather than aborting, and a
/// read that comes up short of the reported file size is fatal.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ConfigurationNotFound
        } else {
            Error::Io(e)
        }
    })?;

    let expected = file.metadata()?.len();
    log::debug!("configuration image {}: {} bytes", path.display(), expected);

    let mut image = Vec::new();
    image
        .try_reserve_exact(expected as usize)
        .map_err(|_| Error::Allocation)?;

    let got = file.read_to_end(&mut image)? as u64;
    if got < expected {
        return Err(Error::ShortRead { expected, got });
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ImageTable {
        ImageTable::new(
            "/cfg/main.bin",
            vec![
                PathBuf::from("/cfg/demo1.bin"),
                PathBuf::from("/cfg/demo2.bin"),
                PathBuf::from("/cfg/demo3.bin"),
            ],
        )
    }

    fn exists_in<'a>(present: &'a [&'a str]) -> impl Fn(&Path) -> bool + 'a {
        move |p| present.contains(&p.to_str().unwrap())
    }

    #[test]
    fn status_slot_wins_over_primary() {
        let t = table();
        let sel = t.select(1, exists_in(&["/cfg/main.bin", "/cfg/demo2.bin"]));
        assert_eq!(sel.unwrap(), Path::new("/cfg/demo2.bin"));
    }

    #[test]
    fn primary_when_status_slot_missing() {
        let t = table();
        let sel = t.select(1, exists_in(&["/cfg/main.bin", "/cfg/demo1.bin"]));
        assert_eq!(sel.unwrap(), Path::new("/cfg/main.bin"));
    }

    #[test]
    fn demo_cycle_wraps_to_first_slot() {
        let t = table();
        let sel = t.select(2, exists_in(&["/cfg/demo1.bin"]));
        assert_eq!(sel.unwrap(), Path::new("/cfg/demo1.bin"));
    }

    #[test]
    fn status_beyond_table_falls_through() {
        let t = table();
        let sel = t.select(9, exists_in(&["/cfg/main.bin"]));
        assert_eq!(sel.unwrap(), Path::new("/cfg/main.bin"));
    }

    #[test]
    fn nothing_present_selects_nothing() {
        let t = table();
        assert!(t.select(0, exists_in(&[])).is_none());
    }

    #[test]
    fn single_table_ignores_status() {
        let t = ImageTable::single("/tmp/override.bin");
        let sel = t.select(3, exists_in(&["/tmp/override.bin"]));
        assert_eq!(sel.unwrap(), Path::new("/tmp/override.bin"));
        assert!(t.select(3, exists_in(&[])).is_none());
    }

    #[test]
    fn read_image_missing_file() {
        let err = read_image(Path::new("/nonexistent/pixi.bin")).unwrap_err();
        assert!(matches!(err, Error::ConfigurationNotFound));
    }
}
