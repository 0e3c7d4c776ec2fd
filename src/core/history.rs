//! Append-only reading history.
//!
//! A sensor keeps every value it has ingested, in arrival order, in a
//! [`ReadingHistory`]. The history computes averages and can discard its
//! single lowest value, which temperature sensors use as an outlier filter.

use std::fmt;
use std::ops::Add;

/// A numeric measurement type that can live in a [`ReadingHistory`].
///
/// Implemented for `f32` (temperature) and `i32` (pressure).
pub trait Reading: Copy + PartialOrd + fmt::Debug + fmt::Display {
    /// Accumulator used while summing, wide enough not to overflow.
    type Sum: Copy + Add<Output = Self::Sum>;

    /// The zero value, also the average of an empty history.
    const ZERO: Self;

    /// The zero accumulator.
    const SUM_ZERO: Self::Sum;

    /// Convert a reading into the accumulator type.
    fn widen(self) -> Self::Sum;

    /// Divide a sum by a non-zero count using this type's division.
    fn mean(sum: Self::Sum, count: usize) -> Self;

    /// Parse text the way C's `atof`/`atoi` do: skip leading whitespace,
    /// take the longest numeric prefix, and fall back to zero.
    ///
    /// Only decimal notation is read. Unlike `atof`, `inf`, `nan` and hex
    /// floats such as `0x10` are not recognised: the first two give zero and
    /// hex gives its leading `0`.
    fn parse_lenient(raw: &str) -> Self;

    /// Parse text that must be a number in its entirety (surrounding
    /// whitespace allowed).
    fn parse_strict(raw: &str) -> Option<Self>;
}

impl Reading for f32 {
    type Sum = f32;

    const ZERO: Self = 0.0;
    const SUM_ZERO: Self::Sum = 0.0;

    fn widen(self) -> f32 {
        self
    }

    fn mean(sum: f32, count: usize) -> f32 {
        sum / count as f32
    }

    fn parse_lenient(raw: &str) -> f32 {
        float_prefix(skip_leading_whitespace(raw))
            .parse()
            .unwrap_or(0.0)
    }

    fn parse_strict(raw: &str) -> Option<f32> {
        raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())
    }
}

impl Reading for i32 {
    type Sum = i64;

    const ZERO: Self = 0;
    const SUM_ZERO: Self::Sum = 0;

    fn widen(self) -> i64 {
        i64::from(self)
    }

    // Integer division truncates toward zero.
    fn mean(sum: i64, count: usize) -> i32 {
        (sum / count as i64) as i32
    }

    fn parse_lenient(raw: &str) -> i32 {
        let value = leading_integer(skip_leading_whitespace(raw));
        value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    fn parse_strict(raw: &str) -> Option<i32> {
        raw.trim().parse().ok()
    }
}

fn skip_leading_whitespace(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

/// Longest prefix of `s` that reads as a decimal float, or `""`.
fn float_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digit_count = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digit_count += frac_end - (end + 1);
        end = frac_end;
    }

    if digit_count == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Value of the leading signed integer in `s`, saturating, or 0.
fn leading_integer(s: &str) -> i64 {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Ordered, append-only sequence of readings of one type.
///
/// Insertion order is arrival order and duplicates are kept. No upper bound
/// is enforced here.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingHistory<T: Reading> {
    readings: Vec<T>,
}

impl<T: Reading> ReadingHistory<T> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            readings: Vec::new(),
        }
    }

    /// Append a reading at the end.
    pub fn append(&mut self, value: T) {
        self.readings.push(value);
    }

    /// Check if the history has no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of stored readings.
    pub fn count(&self) -> usize {
        self.readings.len()
    }

    /// Average of all readings, or zero when empty.
    ///
    /// Callers that need to tell "no data" apart from an average of zero
    /// must check [`is_empty`](Self::is_empty) first.
    pub fn average(&self) -> T {
        if self.readings.is_empty() {
            return T::ZERO;
        }
        let sum = self
            .readings
            .iter()
            .fold(T::SUM_ZERO, |acc, &value| acc + value.widen());
        T::mean(sum, self.readings.len())
    }

    /// Remove one occurrence of the lowest reading and return it.
    ///
    /// On ties the earliest reading goes. Histories with fewer than two
    /// readings are left alone and `None` is returned.
    pub fn drop_lowest(&mut self) -> Option<T> {
        if self.readings.len() < 2 {
            return None;
        }

        let mut lowest = 0;
        for (index, value) in self.readings.iter().enumerate().skip(1) {
            if *value < self.readings[lowest] {
                lowest = index;
            }
        }

        Some(self.readings.remove(lowest))
    }

    /// Readings in insertion order.
    pub fn values(&self) -> &[T] {
        &self.readings
    }

    /// Iterate over readings in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.readings.iter()
    }
}

impl<T: Reading> Default for ReadingHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reading> FromIterator<T> for ReadingHistory<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}

impl<'a, T: Reading> IntoIterator for &'a ReadingHistory<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tracks_appends() {
        let mut history = ReadingHistory::<i32>::new();
        assert!(history.is_empty());
        assert_eq!(history.count(), 0);

        for (n, value) in [4, 4, -2, 9].into_iter().enumerate() {
            history.append(value);
            assert_eq!(history.count(), n + 1);
            assert!(!history.is_empty());
        }
        assert_eq!(history.values(), &[4, 4, -2, 9]);
    }

    #[test]
    fn test_integer_average() {
        let history: ReadingHistory<i32> = [10, 20, 30].into_iter().collect();
        assert_eq!(history.average(), 20);
    }

    #[test]
    fn test_integer_average_truncates() {
        let history: ReadingHistory<i32> = [1, 2].into_iter().collect();
        assert_eq!(history.average(), 1);

        let history: ReadingHistory<i32> = [-1, -2].into_iter().collect();
        assert_eq!(history.average(), -1);
    }

    #[test]
    fn test_integer_average_does_not_overflow() {
        let history: ReadingHistory<i32> = [i32::MAX, i32::MAX].into_iter().collect();
        assert_eq!(history.average(), i32::MAX);
    }

    #[test]
    fn test_empty_average_is_zero() {
        assert_eq!(ReadingHistory::<i32>::new().average(), 0);
        assert_eq!(ReadingHistory::<f32>::new().average(), 0.0);
    }

    #[test]
    fn test_float_average() {
        let history: ReadingHistory<f32> = [20.0, 30.0].into_iter().collect();
        assert!((history.average() - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_drop_lowest_removes_first_minimum() {
        let mut history: ReadingHistory<i32> = [5, 3, 3, 8].into_iter().collect();
        assert_eq!(history.drop_lowest(), Some(3));
        assert_eq!(history.values(), &[5, 3, 8]);
    }

    #[test]
    fn test_drop_lowest_at_head() {
        let mut history: ReadingHistory<f32> = [1.5, 2.5, 1.5].into_iter().collect();
        assert_eq!(history.drop_lowest(), Some(1.5));
        assert_eq!(history.values(), &[2.5, 1.5]);
    }

    #[test]
    fn test_drop_lowest_noop_on_short_history() {
        let mut empty = ReadingHistory::<i32>::new();
        assert_eq!(empty.drop_lowest(), None);
        assert!(empty.is_empty());

        let mut single: ReadingHistory<i32> = [7].into_iter().collect();
        assert_eq!(single.drop_lowest(), None);
        assert_eq!(single.values(), &[7]);
    }

    #[test]
    fn test_lenient_float_parsing() {
        assert_eq!(f32::parse_lenient("25.6"), 25.6);
        assert_eq!(f32::parse_lenient("  -3.5C"), -3.5);
        assert_eq!(f32::parse_lenient("1e2x"), 100.0);
        assert_eq!(f32::parse_lenient("7e"), 7.0);
        assert_eq!(f32::parse_lenient(".5"), 0.5);
        assert_eq!(f32::parse_lenient("abc"), 0.0);
        assert_eq!(f32::parse_lenient(""), 0.0);
        assert_eq!(f32::parse_lenient("-"), 0.0);
    }

    #[test]
    fn test_lenient_float_ignores_special_forms() {
        assert_eq!(f32::parse_lenient("inf"), 0.0);
        assert_eq!(f32::parse_lenient("-infinity"), 0.0);
        assert_eq!(f32::parse_lenient("nan"), 0.0);
        assert_eq!(f32::parse_lenient("0x10"), 0.0);
        assert_eq!(f32::parse_lenient("1e3x"), 1000.0);
    }

    #[test]
    fn test_lenient_integer_parsing() {
        assert_eq!(i32::parse_lenient("1013"), 1013);
        assert_eq!(i32::parse_lenient(" +42hPa"), 42);
        assert_eq!(i32::parse_lenient("-17.9"), -17);
        assert_eq!(i32::parse_lenient("hPa"), 0);
        assert_eq!(i32::parse_lenient(""), 0);
        assert_eq!(i32::parse_lenient("99999999999999999999"), i32::MAX);
    }

    #[test]
    fn test_strict_parsing() {
        assert_eq!(f32::parse_strict(" 25.6 "), Some(25.6));
        assert_eq!(f32::parse_strict("25.6C"), None);
        assert_eq!(f32::parse_strict("NaN"), None);
        assert_eq!(i32::parse_strict("1013"), Some(1013));
        assert_eq!(i32::parse_strict("10.5"), None);
        assert_eq!(i32::parse_strict(""), None);
    }
}
