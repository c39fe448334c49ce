use tracing::{debug, instrument};
use winnow::{
    bytes::{take_till0, take_till1},
    Parser,
};

use crate::common::series::Series;
use crate::formats::util::{f32, non_ws, usize, InputLocator};
use crate::ws_separated;

use super::err::Error;

/// Literal prefix of the dimension-declaration line. Everything before it is
/// free-text header, everything after it is one data line per timestep.
pub const DIM_PREFIX: &str = "i/jdm =";

/// Header lines retained as attributes; the rest are parsed and dropped.
pub const MAX_HEADER_LINES: usize = 10;

/// Longest line the format writer emits.
pub const MAX_LINE_LEN: usize = 80;

/// Everything recovered from a `.b` metadata file.
///
/// The four series are positionally aligned by timestep index and each hold
/// exactly `time_len` values.
#[derive(Debug)]
pub struct BMeta {
    pub header_lines: Vec<String>,
    pub var_name: String,
    pub time_len: usize,
    pub i_len: usize,
    pub j_len: usize,
    pub time: Series,
    pub span: Series,
    pub min: Series,
    pub max: Series,
}

impl BMeta {
    /// Parses the buffered text of a `.b` file.
    ///
    /// The C reader makes two passes over the stream, re-seeking to the first
    /// data line; these files are small, so a single forward pass over the
    /// collected data-line slices does the same job without a rewindable
    /// stream.
    #[instrument(skip(input))]
    pub fn parse(input: &str) -> Result<Self, Error> {
        let locator = InputLocator::new(input);

        let mut header_lines = Vec::new();
        let mut extents = None;
        let mut data_lines = Vec::new();

        for line in input.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if line.len() > MAX_LINE_LEN {
                return Err(Error::LineTooLong {
                    span: locator.span_from_substr(line),
                    max: MAX_LINE_LEN,
                });
            }

            if extents.is_some() {
                data_lines.push(line);
            } else if line.starts_with(DIM_PREFIX) {
                extents = Some(dim_extents(&locator, line)?);
            } else if header_lines.len() < MAX_HEADER_LINES {
                header_lines.push(trimmed.to_string());
            }
            // Header lines past capacity are read and silently dropped.
        }

        let (i_len, j_len) = extents.ok_or(Error::MissingDimLine)?;

        // The last data line is a trailer, not a timestep. A file holding
        // nothing but a trailer has no usable timesteps.
        let time_len = data_lines.len().saturating_sub(1);
        if time_len == 0 {
            return Err(Error::NoTimesteps);
        }

        let mut var_name: Option<String> = None;
        let mut time = Vec::with_capacity(time_len);
        let mut span = Vec::with_capacity(time_len);
        let mut min = Vec::with_capacity(time_len);
        let mut max = Vec::with_capacity(time_len);

        for line in &data_lines[..time_len] {
            let (name, t, sp, lo, hi) = data_line(&locator, line)?;
            // The variable is named by the first data line only.
            var_name.get_or_insert_with(|| name.to_string());
            time.push(t);
            span.push(sp);
            min.push(lo);
            max.push(hi);
        }
        let var_name = var_name.ok_or(Error::NoTimesteps)?;

        debug!(
            ?var_name,
            time_len,
            i_len,
            j_len,
            num_header_atts = header_lines.len(),
            "parsed .b metadata"
        );

        Ok(Self {
            header_lines,
            var_name,
            time_len,
            i_len,
            j_len,
            time: Series::from_vec(time),
            span: Series::from_vec(span),
            min: Series::from_vec(min),
            max: Series::from_vec(max),
        })
    }

    /// Like [`BMeta::parse`], but attaches the source text so span labels
    /// render in the report.
    pub fn parse_report(input: &str) -> Result<Self, miette::Report> {
        Self::parse(input).map_err(|e| miette::Report::new(e).with_source_code(input.to_string()))
    }
}

/// The i- and j-extents are the 3rd and 4th whitespace-delimited tokens of
/// the dimension line, i.e. the two integers after the `i/jdm =` prefix.
fn dim_extents(locator: &InputLocator, line: &str) -> Result<(usize, usize), Error> {
    let rest = &line[DIM_PREFIX.len()..];
    ws_separated!(usize, usize)
        .parse_next(rest)
        .map(|(_, extents)| extents)
        .map_err(|_| Error::Syntax {
            span: locator.span_from_substr(line),
        })
}

/// One data line: a `name:` token, two filler tokens, then the time, span,
/// min and max values at token positions 3 through 6. Trailing tokens are
/// ignored.
fn data_line<'a>(
    locator: &InputLocator,
    line: &'a str,
) -> Result<(&'a str, f32, f32, f32, f32), Error> {
    // The name is the first token up to (excluding) the colon; anything
    // glued onto the token after the colon is discarded.
    let name = (take_till1(": \r\n\t"), ":", take_till0(" \r\n\t"))
        .map(|(name, _, _): (&str, &str, &str)| name);

    ws_separated!(name, non_ws, non_ws, f32, f32, f32, f32)
        .parse_next(line)
        .map(|(_, (name, _, _, t, sp, lo, hi))| (name, t, sp, lo, hi))
        .map_err(|_| Error::Syntax {
            span: locator.span_from_substr(line),
        })
}
