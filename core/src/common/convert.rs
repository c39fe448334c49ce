use num_traits::{Bounded, NumCast};

/// Result of a numeric conversion that may have clipped values.
///
/// Following the netCDF convention, conversion never aborts: every source
/// value produces an output value, and overflows are reported through
/// `range_error` on the side. Unrepresentable values saturate at the bounds
/// of the target type.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    pub values: Vec<T>,
    pub range_error: bool,
}

pub fn convert_f32s<T: NumCast + Bounded>(src: impl Iterator<Item = f32>) -> Converted<T> {
    let mut range_error = false;
    let values = src
        .map(|x| match num_traits::cast(x) {
            Some(v) => v,
            None => {
                range_error = true;
                if x.is_sign_negative() {
                    T::min_value()
                } else {
                    T::max_value()
                }
            }
        })
        .collect();
    Converted {
        values,
        range_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_values_pass_through() {
        let out = convert_f32s::<i32>([0.0, 1.0, -3.0].into_iter());
        assert_eq!(out.values, [0, 1, -3]);
        assert!(!out.range_error);
    }

    #[test]
    fn widening_to_f64_never_flags() {
        let out = convert_f32s::<f64>([1.5, f32::MAX].into_iter());
        assert_eq!(out.values[0], 1.5);
        assert!(!out.range_error);
    }

    #[test]
    fn overflow_saturates_and_flags() {
        let out = convert_f32s::<i16>([70000.0, -70000.0, 12.0].into_iter());
        assert_eq!(out.values, [i16::MAX, i16::MIN, 12]);
        assert!(out.range_error);
    }
}
