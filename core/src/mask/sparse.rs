use crate::types::SegmentClass;
use log::debug;
use ndarray::{Array3, Axis};

/// Frames of one segment, ready for metadata assembly and pixel packing
///
/// `frames[i]` is the 2-D mask of reference slice `slice_indices[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSegment {
    pub class: SegmentClass,

    /// Segment number inside the object being built
    pub label: u16,

    /// (frames, rows, columns)
    pub frames: Array3<bool>,

    /// Reference slice index of each frame, ascending
    pub slice_indices: Vec<usize>,
}

impl EncodedSegment {
    /// Keeps every slice of the volume, empty ones included
    pub fn full(class: SegmentClass, label: u16, volume: Array3<bool>) -> Self {
        let slice_indices = (0..volume.len_of(Axis(0))).collect();
        Self {
            class,
            label,
            frames: volume,
            slice_indices,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.slice_indices.len()
    }

    /// In-plane frame size (rows, columns)
    pub fn frame_shape(&self) -> (usize, usize) {
        let (_, rows, columns) = self.frames.dim();
        (rows, columns)
    }
}

/// Drops slices without a set voxel
pub struct SparseFrameReducer;

impl SparseFrameReducer {
    /// Indices of the slices holding at least one set voxel
    pub fn nonzero_slices(volume: &Array3<bool>) -> Vec<usize> {
        volume
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, slice)| slice.iter().any(|&v| v))
            .map(|(index, _)| index)
            .collect()
    }

    /// Keeps only the nonzero slices of a resolved volume
    ///
    /// A volume left empty by overlap resolution yields a segment with no
    /// frames; the segment itself stays in the object.
    pub fn reduce(class: SegmentClass, label: u16, volume: &Array3<bool>) -> EncodedSegment {
        let slice_indices = Self::nonzero_slices(volume);
        let frames = volume.select(Axis(0), &slice_indices);

        debug!(
            "{}: kept {} of {} slices",
            class,
            slice_indices.len(),
            volume.len_of(Axis(0))
        );

        EncodedSegment {
            class,
            label,
            frames,
            slice_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_keeps_nonzero_slices() {
        let mut volume = Array3::from_elem((10, 4, 4), false);
        volume[(2, 1, 1)] = true;
        volume[(7, 0, 3)] = true;

        let segment = SparseFrameReducer::reduce(SegmentClass::Wg, 1, &volume);

        assert_eq!(segment.slice_indices, vec![2, 7]);
        assert_eq!(segment.frames.dim(), (2, 4, 4));
        assert!(segment.frames[(0, 1, 1)]);
        assert!(segment.frames[(1, 0, 3)]);
        assert_eq!(segment.frame_count(), 2);
    }

    #[test]
    fn test_reduce_empty_volume_has_no_frames() {
        let volume = Array3::from_elem((10, 4, 4), false);

        let segment = SparseFrameReducer::reduce(SegmentClass::Wg, 1, &volume);

        assert!(segment.slice_indices.is_empty());
        assert_eq!(segment.frames.dim(), (0, 4, 4));
        assert_eq!(segment.frame_shape(), (4, 4));
    }

    #[test]
    fn test_full_keeps_every_slice() {
        let volume = Array3::from_elem((6, 3, 2), false);

        let segment = EncodedSegment::full(SegmentClass::Tz, 1, volume);

        assert_eq!(segment.slice_indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(segment.frame_count(), 6);
        assert_eq!(segment.frame_shape(), (3, 2));
    }
}
