// Math utilities and helper functions

/// Mutable references to two distinct elements of a slice
///
/// Panics if `i == j` or either index is out of bounds.
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Combine two material coefficients into one for a contact pair
pub fn mix_coefficients(a: f32, b: f32) -> f32 {
    a * b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_mut_ordering() {
        let mut values = [1, 2, 3, 4];
        let (a, b) = pair_mut(&mut values, 3, 1);
        assert_eq!((*a, *b), (4, 2));
        *a = 40;
        *b = 20;
        assert_eq!(values, [1, 20, 3, 40]);
    }

    #[test]
    #[should_panic]
    fn test_pair_mut_same_index() {
        let mut values = [1, 2];
        let _ = pair_mut(&mut values, 1, 1);
    }

    #[test]
    fn test_mix_coefficients() {
        assert_eq!(mix_coefficients(0.9, 1.0), 0.9);
        assert_eq!(mix_coefficients(0.5, 0.0), 0.0);
    }
}
