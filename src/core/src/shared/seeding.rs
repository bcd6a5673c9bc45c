/// Standard knockout slot order for a bracket of `size` positions (a power of two).
/// Seeds are 1-based: for 8 slots the order is 1, 8, 4, 5, 2, 7, 3, 6 so that the
/// two best seeds can only meet in the final.
pub fn bracket_order(size: usize) -> Vec<usize> {
    if size == 0 {
        return Vec::new();
    }

    let mut order = vec![1];
    while order.len() < size {
        let mirror = order.len() * 2 + 1;
        order = order.iter().flat_map(|&seed| [seed, mirror - seed]).collect();
    }

    order
}

/// Largest power of two strictly below `n` (1 when `n <= 2`).
pub fn previous_power_of_two(n: usize) -> usize {
    if n <= 2 {
        return 1;
    }

    let next = n.next_power_of_two();
    if next == n { n / 2 } else { next / 2 }
}
