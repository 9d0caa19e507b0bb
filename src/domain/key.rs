//! Key types with a total order.

use std::cmp::Ordering;
use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

/// `f64` ordered by [`f64::total_cmp`], so NaN and signed zeros have a fixed place.
///
/// Plain floats are only partially ordered and cannot be tree keys.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(pub f64);

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl FromStr for FloatKey {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for FloatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_ordered() {
        let nan = FloatKey(f64::NAN);
        assert_eq!(nan, nan);
        assert!(FloatKey(1.0) < nan);
    }

    #[test]
    fn test_parse_and_display() {
        let key: FloatKey = "3.1415".parse().unwrap();
        assert_eq!(key, FloatKey(3.1415));
        assert_eq!(key.to_string(), "3.1415");
        assert!("pi".parse::<FloatKey>().is_err());
    }
}
