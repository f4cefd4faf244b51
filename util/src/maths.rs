//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Map a value from one range into another, holding the output at the edge of
/// the target range when the value lies outside the source range.
///
/// `source_range.0` must be less than `source_range.1`. The target range may
/// be descending, in which case the output falls as the value grows.
pub fn lin_interp<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    if value <= source_range.0 {
        target_range.0
    }
    else if value >= source_range.1 {
        target_range.1
    }
    else {
        lin_map(source_range, target_range, value)
    }
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: PartialOrd + Copy
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}
