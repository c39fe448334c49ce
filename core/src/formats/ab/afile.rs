use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use derive_more::Constructor;
use ndarray::Array3;
use tracing::instrument;

use super::err::Error;

/// Records are padded to a multiple of 4096 32-bit words, a convention of
/// the model's output routine.
pub const RECORD_ALIGN: usize = 4096;

const BYTES_PER_ELEM: usize = std::mem::size_of::<f32>();

/// Layout of a `.a` file: one fixed-size record per timestep, row-major
/// `(j, i)` big-endian f32 elements inside each record, zero padding after
/// the last real element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct RecordLayout {
    pub i_len: usize,
    pub j_len: usize,
}

impl RecordLayout {
    pub fn record_elements(&self) -> usize {
        round_up(self.i_len * self.j_len, RECORD_ALIGN)
    }

    pub fn record_bytes(&self) -> u64 {
        (self.record_elements() * BYTES_PER_ELEM) as u64
    }

    /// Byte offset of element `(t, j, i)` in the `.a` file.
    pub fn byte_offset(&self, t: usize, j: usize, i: usize) -> u64 {
        t as u64 * self.record_bytes() + ((j * self.i_len + i) * BYTES_PER_ELEM) as u64
    }
}

pub fn round_up(num: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return num;
    }
    let remainder = num % multiple;
    if remainder == 0 {
        num
    } else {
        num + multiple - remainder
    }
}

/// Rejects any request where `start[k] + count[k]` exceeds the extent.
/// Requests are never clamped or wrapped.
pub fn check_region(extent: [usize; 3], start: [usize; 3], count: [usize; 3]) -> Result<(), Error> {
    for axis in 0..3 {
        if start[axis] + count[axis] > extent[axis] {
            return Err(Error::OutOfRange {
                axis,
                start: start[axis],
                count: count[axis],
                extent: extent[axis],
            });
        }
    }
    Ok(())
}

/// Reads the requested `(time, j, i)` region, decoding big-endian floats to
/// native order row by row.
///
/// Every call seeks fresh; nothing is cached between calls. The byte swap is
/// a pure bit-pattern reversal, so NaN and Inf encodings pass through
/// unchanged. An I/O failure aborts this read only and leaves the reader
/// usable for further calls.
#[instrument(skip(rdr))]
pub fn read_region<R: Read + Seek>(
    rdr: &mut R,
    layout: RecordLayout,
    extent: [usize; 3],
    start: [usize; 3],
    count: [usize; 3],
) -> Result<Array3<f32>, Error> {
    check_region(extent, start, count)?;

    let mut data = Vec::with_capacity(count[0] * count[1] * count[2]);
    let mut row = vec![0.0f32; count[2]];

    for t in 0..count[0] {
        for j in 0..count[1] {
            let offset = layout.byte_offset(start[0] + t, start[1] + j, start[2]);
            rdr.seek(SeekFrom::Start(offset))?;
            rdr.read_f32_into::<BigEndian>(&mut row)?;
            data.extend_from_slice(&row);
        }
    }

    Ok(Array3::from_shape_vec(
        (count[0], count[1], count[2]),
        data,
    )?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use byteorder::WriteBytesExt;

    use super::*;

    #[test]
    fn round_up_to_alignment() {
        assert_eq!(round_up(9, 4096), 4096);
        assert_eq!(round_up(4096, 4096), 4096);
        assert_eq!(round_up(4097, 4096), 8192);
        assert_eq!(round_up(7, 0), 7);
    }

    #[test]
    fn padded_record_offsets() {
        // 3x3 grid: 9 real elements, still a full 4096-element record.
        let layout = RecordLayout::new(3, 3);
        assert_eq!(layout.record_elements(), 4096);
        assert_eq!(layout.byte_offset(0, 0, 0), 0);
        assert_eq!(layout.byte_offset(0, 1, 2), 5 * 4);
        assert_eq!(layout.byte_offset(1, 0, 0), 4096 * 4);
    }

    fn encode_records(layout: RecordLayout, records: &[&[f32]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for record in records {
            assert_eq!(record.len(), layout.i_len * layout.j_len);
            for &v in *record {
                bytes.write_f32::<BigEndian>(v).unwrap();
            }
            for _ in record.len()..layout.record_elements() {
                bytes.write_f32::<BigEndian>(0.0).unwrap();
            }
        }
        bytes
    }

    #[test]
    fn decodes_big_endian() {
        let layout = RecordLayout::new(1, 1);
        let mut rdr = Cursor::new(vec![0x3F, 0x80, 0x00, 0x00]);
        let arr = read_region(&mut rdr, layout, [1, 1, 1], [0, 0, 0], [1, 1, 1]).unwrap();
        assert_eq!(arr[[0, 0, 0]], 1.0);
    }

    #[test]
    fn nan_bit_patterns_pass_through() {
        let layout = RecordLayout::new(1, 1);
        let mut rdr = Cursor::new(vec![0x7F, 0xC0, 0x12, 0x34]);
        let arr = read_region(&mut rdr, layout, [1, 1, 1], [0, 0, 0], [1, 1, 1]).unwrap();
        assert_eq!(arr[[0, 0, 0]].to_bits(), 0x7FC0_1234);
    }

    #[test]
    fn reads_across_record_padding() {
        let layout = RecordLayout::new(2, 2);
        let bytes = encode_records(
            layout,
            &[&[0.0, 1.0, 2.0, 3.0], &[10.0, 11.0, 12.0, 13.0]],
        );
        let mut rdr = Cursor::new(bytes);

        let arr = read_region(&mut rdr, layout, [2, 2, 2], [0, 0, 0], [2, 2, 2]).unwrap();
        assert_eq!(arr[[0, 1, 0]], 2.0);
        // Second timestep starts one padded record in, not 4 elements in.
        assert_eq!(arr[[1, 0, 0]], 10.0);
        assert_eq!(arr[[1, 1, 1]], 13.0);
    }

    #[test]
    fn sub_region_rows() {
        let layout = RecordLayout::new(3, 2);
        let bytes = encode_records(layout, &[&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]]);
        let mut rdr = Cursor::new(bytes);

        let arr = read_region(&mut rdr, layout, [1, 2, 3], [0, 1, 1], [1, 1, 2]).unwrap();
        assert_eq!(arr.shape(), [1, 1, 2]);
        assert_eq!(arr[[0, 0, 0]], 4.0);
        assert_eq!(arr[[0, 0, 1]], 5.0);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let layout = RecordLayout::new(3, 2);
        let mut rdr = Cursor::new(Vec::new());
        let err =
            read_region(&mut rdr, layout, [1, 2, 3], [0, 1, 0], [1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { axis: 1, .. }));
    }

    #[test]
    fn short_read_is_an_io_error() {
        let layout = RecordLayout::new(2, 2);
        // Two elements only; the record claims four plus padding.
        let mut rdr = Cursor::new(vec![0u8; 8]);
        let err = read_region(&mut rdr, layout, [1, 2, 2], [0, 0, 0], [1, 2, 2]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn empty_count_reads_nothing() {
        let layout = RecordLayout::new(3, 2);
        let mut rdr = Cursor::new(Vec::new());
        let arr = read_region(&mut rdr, layout, [1, 2, 3], [0, 0, 0], [0, 0, 0]).unwrap();
        assert_eq!(arr.len(), 0);
    }
}
