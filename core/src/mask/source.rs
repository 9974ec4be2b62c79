use crate::error::{Result, SegError};
use crate::types::SegmentClass;
use ndarray::Array3;
use ndarray_npy::read_npy;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Provider of per-class mask volumes
///
/// Implementations return `(slices, rows, columns)` u8 volumes aligned with
/// the reference series, or `None` when they hold no mask for a class.
pub trait VolumeSource {
    /// Loads the mask of one class
    fn load(&self, class: SegmentClass) -> Result<Option<Array3<u8>>>;

    /// Short description used in log and error messages
    fn describe(&self) -> String;
}

impl VolumeSource for BTreeMap<SegmentClass, Array3<u8>> {
    fn load(&self, class: SegmentClass) -> Result<Option<Array3<u8>>> {
        Ok(self.get(&class).cloned())
    }

    fn describe(&self) -> String {
        "in-memory volumes".to_string()
    }
}

/// Directory of `<class>_binary.npy` mask files
///
/// Volumes may be stored as `uint8` or `bool` NumPy arrays in C order.
#[derive(Debug, Clone)]
pub struct NpyDirectory {
    dir: PathBuf,
}

impl NpyDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the mask file for a class
    pub fn path_for(&self, class: SegmentClass) -> PathBuf {
        self.dir.join(format!("{}_binary.npy", class.tag()))
    }

    fn read(path: &Path, class: SegmentClass) -> Result<Array3<u8>> {
        match read_npy::<_, Array3<u8>>(path) {
            Ok(volume) => Ok(volume),
            Err(u8_err) => read_npy::<_, Array3<bool>>(path)
                .map(|volume| volume.mapv(u8::from))
                .map_err(|_| SegError::MaskRead {
                    class,
                    message: format!("{}: {}", path.display(), u8_err),
                }),
        }
    }
}

impl VolumeSource for NpyDirectory {
    fn load(&self, class: SegmentClass) -> Result<Option<Array3<u8>>> {
        let path = self.path_for(class);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read(&path, class).map(Some)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::write_npy;
    use tempfile::TempDir;

    #[test]
    fn test_npy_directory_reads_u8_and_bool() {
        let temp_dir = TempDir::new().unwrap();
        let source = NpyDirectory::new(temp_dir.path());

        let mut wg = Array3::<u8>::zeros((3, 2, 2));
        wg[(1, 0, 1)] = 1;
        write_npy(source.path_for(SegmentClass::Wg), &wg).unwrap();

        let mut tz = Array3::<bool>::from_elem((3, 2, 2), false);
        tz[(2, 1, 1)] = true;
        write_npy(source.path_for(SegmentClass::Tz), &tz).unwrap();

        assert_eq!(source.load(SegmentClass::Wg).unwrap(), Some(wg));
        assert_eq!(source.load(SegmentClass::Pz).unwrap(), None);

        let tz_loaded = source.load(SegmentClass::Tz).unwrap().unwrap();
        assert_eq!(tz_loaded[(2, 1, 1)], 1);
        assert_eq!(tz_loaded.iter().map(|&v| v as u32).sum::<u32>(), 1);
    }

    #[test]
    fn test_npy_directory_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let source = NpyDirectory::new(temp_dir.path());
        std::fs::write(source.path_for(SegmentClass::Pz), b"not an npy file").unwrap();

        let err = source.load(SegmentClass::Pz).unwrap_err();
        assert!(matches!(err, SegError::MaskRead { class: SegmentClass::Pz, .. }));
    }

    #[test]
    fn test_path_for() {
        let source = NpyDirectory::new("/data/case1");
        assert_eq!(
            source.path_for(SegmentClass::Pz),
            PathBuf::from("/data/case1/pz_binary.npy")
        );
    }
}
