//! Pixel packing
//!
//! Binary segmentations store one bit per pixel. Frames are concatenated in
//! segment order, flattened row-major, and packed eight pixels per byte with
//! the first pixel in the least significant bit.

use crate::mask::EncodedSegment;
use ndarray::Array3;

/// Bit-packed frames of a segmentation object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPixels {
    /// Packed bits, `ceil(frames * rows * columns / 8)` bytes
    pub bytes: Vec<u8>,
    pub frames: usize,
    pub rows: usize,
    pub columns: usize,
}

impl PackedPixels {
    /// NumberOfFrames as written to the dataset (IS value)
    pub fn number_of_frames(&self) -> String {
        self.frames.to_string()
    }

    pub fn total_bits(&self) -> usize {
        self.frames * self.rows * self.columns
    }

    /// Unpacks the bits into a (frames, rows, columns) volume
    pub fn unpack(&self) -> Array3<bool> {
        unpack_bits(&self.bytes, self.frames, self.rows, self.columns)
    }
}

/// Packs the frames of every segment, in the order given
///
/// `rows` and `columns` are passed explicitly so that objects whose segments
/// contribute no frame still report their frame size.
pub fn pack_segments(segments: &[EncodedSegment], rows: usize, columns: usize) -> PackedPixels {
    let frames: usize = segments.iter().map(EncodedSegment::frame_count).sum();
    let bits = segments.iter().flat_map(|segment| segment.frames.iter().copied());

    PackedPixels {
        bytes: pack_bits(bits),
        frames,
        rows,
        columns,
    }
}

/// Packs booleans LSB-first, zero-padding the final byte
pub fn pack_bits(bits: impl IntoIterator<Item = bool>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut current = 0u8;
    let mut filled = 0u8;

    for bit in bits {
        if bit {
            current |= 1 << filled;
        }
        filled += 1;
        if filled == 8 {
            bytes.push(current);
            current = 0;
            filled = 0;
        }
    }

    if filled > 0 {
        bytes.push(current);
    }
    bytes
}

/// Inverse of [`pack_bits`] for a known frame geometry
///
/// Missing trailing bytes read as unset pixels.
pub fn unpack_bits(bytes: &[u8], frames: usize, rows: usize, columns: usize) -> Array3<bool> {
    Array3::from_shape_fn((frames, rows, columns), |(f, r, c)| {
        let bit = (f * rows + r) * columns + c;
        bytes
            .get(bit / 8)
            .is_some_and(|byte| byte & (1 << (bit % 8)) != 0)
    })
}
