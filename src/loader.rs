use image::{DynamicImage, GenericImageView};
use image::imageops::FilterType;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::LoadError;
use crate::files::{scan_catalog, ImageRef};

// ---------------------------------------------------------------------------
// Decoded image data, already scaled for the surface
// ---------------------------------------------------------------------------

pub struct DecodedImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn mem_size(&self) -> u64 {
        self.rgba_bytes.len() as u64
    }

    /// RGBA of the pixel at (x, y). Callers keep coordinates in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba_bytes[i],
            self.rgba_bytes[i + 1],
            self.rgba_bytes[i + 2],
            self.rgba_bytes[i + 3],
        ]
    }

    #[cfg(test)]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            rgba_bytes: rgba.repeat((width * height) as usize),
            width,
            height,
        }
    }
}

/// Decode `path`, correct its EXIF orientation and scale it to fit
/// `max_w` x `max_h` keeping the aspect ratio.
pub fn decode_scaled(path: &Path, max_w: u32, max_h: u32) -> Result<DecodedImage, LoadError> {
    let start_time = Instant::now();
    let img = image::open(path).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let img = apply_orientation(img, read_orientation(path).unwrap_or(1));

    let scaled = img.resize(max_w.max(1), max_h.max(1), FilterType::Triangle);
    let rgba = scaled.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    log::debug!(
        "Decoded {} ({}x{} -> {}x{}) in {:.0}ms",
        path.display(),
        img.width(),
        img.height(),
        width,
        height,
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(DecodedImage {
        rgba_bytes: rgba.into_raw(),
        width,
        height,
    })
}

fn read_orientation(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// ---------------------------------------------------------------------------
// Where playback gets its images from
// ---------------------------------------------------------------------------

pub trait ImageSource {
    /// Current catalog, oldest first.
    fn scan(&self) -> Vec<ImageRef>;

    /// Load one image scaled to fit the given surface size.
    fn load(&self, path: &Path, max_w: u32, max_h: u32) -> Result<DecodedImage, LoadError>;
}

/// Images from a directory tree on disk.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for DiskSource {
    fn scan(&self) -> Vec<ImageRef> {
        scan_catalog(&self.root)
    }

    fn load(&self, path: &Path, max_w: u32, max_h: u32) -> Result<DecodedImage, LoadError> {
        decode_scaled(path, max_w, max_h)
    }
}
