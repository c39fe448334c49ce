use std::ops::Index;

use ndarray::{s, Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// An immutable 1-D array of `f32` values.
///
/// The AB reader uses these for the per-timestep summary arrays (`day`,
/// `span`, `min`, `max`) parsed out of the `.b` file. Ownership transfers
/// into the dataset descriptor once and the data never mutates afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    data: Array1<f32>,
}

impl Series {
    pub fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    pub fn from_vec(data: Vec<f32>) -> Self {
        Self::new(Array1::from_vec(data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayView1<f32> {
        self.data.view()
    }

    /// A view of `count` elements starting at `start`.
    ///
    /// Panics if the range is out of bounds; callers validate against the
    /// time extent first.
    pub fn slice(&self, start: usize, count: usize) -> ArrayView1<f32> {
        self.data.slice(s![start..start + count])
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }
}

impl Index<usize> for Series {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_a_window() {
        let series = Series::from_vec(vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 4);
        assert_eq!(series.slice(1, 2).to_vec(), [1.0, 2.0]);
        assert_eq!(series[3], 3.0);
    }
}
