//!  Generic hamming function
//!

/// The distance corresponding to binary embedding : fraction of coordinates that differ.
/// For ±1 vectors of dimension d it is (d - <v1,v2>) / 2d.
pub fn hamming_distance<T: Eq>(v1: &[T], v2: &[T]) -> f64 {
    assert_eq!(v1.len(), v2.len());
    if v1.is_empty() {
        return 0.;
    }
    let nb_diff = v1
        .iter()
        .zip(v2.iter())
        .fold(0usize, |acc, v| if v.0 != v.1 { acc + 1 } else { acc });
    (nb_diff as f64) / (v1.len() as f64)
} // end of hamming_distance

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_hamming_binary() {
        let v1: Vec<i8> = vec![1, -1, 1, 1, -1];
        let v2: Vec<i8> = vec![1, 1, 1, -1, -1];
        assert!((hamming_distance(&v1, &v2) - 0.4).abs() < 1.0E-12);
        assert_eq!(hamming_distance(&v1, &v1), 0.);
        // matches the inner product formula
        let dot: i32 = v1.iter().zip(v2.iter()).map(|(a, b)| (*a as i32) * (*b as i32)).sum();
        let d = v1.len() as f64;
        assert!((hamming_distance(&v1, &v2) - (d - dot as f64) / (2. * d)).abs() < 1.0E-12);
    }
} // end of mod tests
