//! Reader for the paired `.b` (text metadata) / `.a` (big-endian binary)
//! archive format written by HYCOM-style ocean model forcing output.

pub mod afile;
pub mod bfile;
pub mod dict;
mod err;


pub use err::Error;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use derive_more::Constructor;
use ndarray::Array3;
use num_traits::{Bounded, NumCast};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::common::convert::{convert_f32s, Converted};
use crate::common::series::Series;

use afile::RecordLayout;
use bfile::BMeta;

/// Name of the time dimension and coordinate variable.
pub const TIME_NAME: &str = "day";
pub const SPAN_NAME: &str = "span";
pub const MIN_NAME: &str = "min";
pub const MAX_NAME: &str = "max";
pub const J_NAME: &str = "j";
pub const I_NAME: &str = "i";

pub const CONVENTIONS_NAME: &str = "Conventions";
pub const CF_VERSION: &str = "CF-1.0";

pub const LONG_NAME: &str = "long_name";
pub const STANDARD_NAME: &str = "standard_name";
pub const UNITS_NAME: &str = "units";

/// Longest attribute or variable name the embedding data model accepts.
pub const MAX_NAME_LEN: usize = 256;

/// Marks cells that were never written: 2^100 as an f32. AB files are always
/// fully populated, so this never actually appears in read data.
pub const FILL_VALUE: f32 = f32::from_bits(0x7180_0000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Constructor)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttrValue {
    Text(String),
    Floats(Series),
}

#[derive(Debug, Clone, PartialEq, Serialize, Constructor)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    /// Indexes into [`Descriptor::dimensions`].
    pub dims: Vec<usize>,
    pub fill_value: Option<f32>,
    pub attributes: Vec<Attribute>,
}

impl Variable {
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

/// Normalized description of one open AB dataset: three dimensions
/// `(day, j, i)`, the global attributes, the synthetic time coordinate and
/// the single data variable. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    pub dimensions: Vec<Dimension>,
    pub attributes: Vec<Attribute>,
    pub coordinate: Variable,
    pub data: Variable,
}

impl Descriptor {
    /// Pure transformation of parsed `.b` metadata; no I/O. The only failure
    /// is the name-length limit mirrored from the embedding data model.
    pub fn build(meta: BMeta) -> Result<Self, Error> {
        let BMeta {
            header_lines,
            var_name,
            time_len,
            i_len,
            j_len,
            time,
            span,
            min,
            max,
        } = meta;

        check_name(&var_name)?;

        // One attribute per retained header line, named by position.
        let mut attributes: Vec<Attribute> = header_lines
            .into_iter()
            .enumerate()
            .map(|(a, line)| Attribute::new(format!("att_{a}"), AttrValue::Text(line)))
            .collect();
        attributes.push(Attribute::new(
            CONVENTIONS_NAME.to_string(),
            AttrValue::Text(CF_VERSION.to_string()),
        ));

        let dimensions = vec![
            Dimension::new(TIME_NAME.to_string(), time_len),
            Dimension::new(J_NAME.to_string(), j_len),
            Dimension::new(I_NAME.to_string(), i_len),
        ];

        // The time axis has no on-disk backing; its values live only in the
        // data variable's `day` attribute, so coordinate reads never touch
        // the `.a` file.
        let coordinate = Variable {
            name: TIME_NAME.to_string(),
            dims: vec![0],
            fill_value: None,
            attributes: Vec::new(),
        };

        let mut var_atts = vec![
            Attribute::new(TIME_NAME.to_string(), AttrValue::Floats(time)),
            Attribute::new(SPAN_NAME.to_string(), AttrValue::Floats(span)),
            Attribute::new(MIN_NAME.to_string(), AttrValue::Floats(min)),
            Attribute::new(MAX_NAME.to_string(), AttrValue::Floats(max)),
        ];
        if let Some(atts) = dict::find(&var_name) {
            var_atts.push(Attribute::new(
                LONG_NAME.to_string(),
                AttrValue::Text(atts.long_name.to_string()),
            ));
            var_atts.push(Attribute::new(
                STANDARD_NAME.to_string(),
                AttrValue::Text(atts.standard_name.to_string()),
            ));
            var_atts.push(Attribute::new(
                UNITS_NAME.to_string(),
                AttrValue::Text(atts.units.to_string()),
            ));
        }

        let data = Variable {
            name: var_name,
            dims: vec![0, 1, 2],
            fill_value: Some(FILL_VALUE),
            attributes: var_atts,
        };

        Ok(Self {
            dimensions,
            attributes,
            coordinate,
            data,
        })
    }

    /// Dimension lengths in `(time, j, i)` order.
    pub fn extent(&self) -> [usize; 3] {
        [
            self.dimensions[0].len,
            self.dimensions[1].len,
            self.dimensions[2].len,
        ]
    }

    pub fn layout(&self) -> RecordLayout {
        RecordLayout::new(self.dimensions[2].len, self.dimensions[1].len)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// The time axis values, denormalized into the data variable's
    /// attributes.
    pub fn time_series(&self) -> &Series {
        match self.data.attribute(TIME_NAME) {
            Some(AttrValue::Floats(series)) => series,
            _ => unreachable!("descriptor always carries the time attribute"),
        }
    }
}

fn check_name(name: &str) -> Result<(), Error> {
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

/// An open AB dataset: the immutable descriptor plus both file streams,
/// which are held for the dataset's whole lifetime and released together.
///
/// Not internally synchronized; open one dataset per thread or serialize
/// access externally.
#[derive(Debug)]
pub struct Dataset {
    descriptor: Descriptor,
    a_file: File,
    b_file: File,
}

impl Dataset {
    /// The single user-defined format code this reader answers for.
    pub const FORMAT_CODE: &'static str = "hycom-ab";

    /// The format is read-only; there is no write path.
    pub const fn read_only() -> bool {
        true
    }

    /// Opens the dataset named by its `.b` path; the matching `.a` file is
    /// expected next to it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_with_mode(path, OpenMode::Read)
    }

    pub fn open_with_mode(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self, Error> {
        Self::open_inner(path.as_ref(), mode)
    }

    /// Opening is all-or-nothing: every failure before the end drops any
    /// partially built state along with whichever stream already opened.
    #[instrument(name = "ab_open")]
    fn open_inner(path: &Path, mode: OpenMode) -> Result<Self, Error> {
        if mode == OpenMode::Write {
            return Err(Error::ReadOnly);
        }
        if path.extension().map_or(true, |ext| ext != "b") {
            return Err(Error::BadExtension {
                path: path.display().to_string(),
            });
        }
        let a_path = path.with_extension("a");

        let a_file = File::open(&a_path)?;
        let mut b_file = File::open(path)?;

        let mut text = String::new();
        b_file.read_to_string(&mut text)?;

        let meta = BMeta::parse(&text)?;
        let descriptor = Descriptor::build(meta)?;
        debug!(variable = %descriptor.data.name, extent = ?descriptor.extent(), "opened AB dataset");

        Ok(Self {
            descriptor,
            a_file,
            b_file,
        })
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Reads a hyper-rectangular region of the named variable, flattened in
    /// `(time, j, i)` row-major order. The coordinate variable is served
    /// from memory (axis 0 of the request only); the data variable reads
    /// from the `.a` file.
    pub fn read_region(
        &mut self,
        variable: &str,
        start: [usize; 3],
        count: [usize; 3],
    ) -> Result<Vec<f32>, Error> {
        if variable == self.descriptor.coordinate.name {
            self.read_coordinate(start[0], count[0])
        } else if variable == self.descriptor.data.name {
            Ok(self.read_data(start, count)?.into_raw_vec())
        } else {
            Err(Error::UnknownVariable(variable.to_string()))
        }
    }

    /// Region read of the data variable, shaped `(time, j, i)`.
    ///
    /// A failed read reports its error and leaves the dataset usable for
    /// further calls.
    pub fn read_data(
        &mut self,
        start: [usize; 3],
        count: [usize; 3],
    ) -> Result<Array3<f32>, Error> {
        afile::read_region(
            &mut self.a_file,
            self.descriptor.layout(),
            self.descriptor.extent(),
            start,
            count,
        )
    }

    /// Serves the synthetic time axis straight from the in-memory series.
    pub fn read_coordinate(&self, start: usize, count: usize) -> Result<Vec<f32>, Error> {
        let time = self.descriptor.time_series();
        if start + count > time.len() {
            return Err(Error::OutOfRange {
                axis: 0,
                start,
                count,
                extent: time.len(),
            });
        }
        Ok(time.slice(start, count).to_vec())
    }

    /// Coordinate read with numeric conversion. Overflowing values saturate
    /// and are flagged on [`Converted::range_error`]; output is always
    /// produced.
    pub fn read_coordinate_as<T: NumCast + Bounded>(
        &self,
        start: usize,
        count: usize,
    ) -> Result<Converted<T>, Error> {
        let time = self.descriptor.time_series();
        if start + count > time.len() {
            return Err(Error::OutOfRange {
                axis: 0,
                start,
                count,
                extent: time.len(),
            });
        }
        Ok(convert_f32s(time.slice(start, count).iter().copied()))
    }

    /// Releases both streams together. Dropping the dataset is equivalent.
    pub fn close(self) {
        drop(self.a_file);
        drop(self.b_file);
    }
}
