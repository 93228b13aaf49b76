use std::fmt::{self, Debug, Display};
use std::ops::{Add, Sub};

/// A value that may be missing.
///
/// Transforms mark positions without enough history as `NA::NA`. Missing is an
/// ordinary output state, distinct from failure, and arithmetic on it yields
/// `NA::NA` again instead of a silently imputed number.
#[derive(Clone, Copy)]
pub enum NA<T> {
    /// A present value
    Value(T),
    /// A missing value
    NA,
}

impl<T> NA<T> {
    pub fn is_na(&self) -> bool {
        matches!(self, NA::NA)
    }

    pub fn map<U, F>(&self, f: F) -> NA<U>
    where
        F: FnOnce(&T) -> U,
    {
        match self {
            NA::Value(v) => NA::Value(f(v)),
            NA::NA => NA::NA,
        }
    }
}

impl<T: Copy> NA<T> {
    /// Copy the value out as an `Option`
    pub fn get(&self) -> Option<T> {
        match self {
            NA::Value(v) => Some(*v),
            NA::NA => None,
        }
    }
}

impl NA<f64> {
    /// Compare against `expected` within `tolerance`; two missing values compare equal.
    pub fn approx_eq(&self, expected: &NA<f64>, tolerance: f64) -> bool {
        match (self, expected) {
            (NA::Value(a), NA::Value(b)) => (a - b).abs() <= tolerance,
            (NA::NA, NA::NA) => true,
            _ => false,
        }
    }
}

impl<T> From<T> for NA<T> {
    fn from(value: T) -> Self {
        NA::Value(value)
    }
}

impl<T> From<Option<T>> for NA<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => NA::Value(v),
            None => NA::NA,
        }
    }
}

impl<T: Debug> Debug for NA<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NA::Value(v) => write!(f, "{:?}", v),
            NA::NA => write!(f, "NA"),
        }
    }
}

impl<T: Display> Display for NA<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NA::Value(v) => write!(f, "{}", v),
            NA::NA => write!(f, "NA"),
        }
    }
}

impl<T: PartialEq> PartialEq for NA<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NA::Value(a), NA::Value(b)) => a == b,
            (NA::NA, NA::NA) => true,
            _ => false,
        }
    }
}

impl<T: Add<Output = T>> Add for NA<T> {
    type Output = NA<T>;

    fn add(self, other: Self) -> Self::Output {
        match (self, other) {
            (NA::Value(a), NA::Value(b)) => NA::Value(a + b),
            _ => NA::NA,
        }
    }
}

impl<T: Sub<Output = T>> Sub for NA<T> {
    type Output = NA<T>;

    fn sub(self, other: Self) -> Self::Output {
        match (self, other) {
            (NA::Value(a), NA::Value(b)) => NA::Value(a - b),
            _ => NA::NA,
        }
    }
}
