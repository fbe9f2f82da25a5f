// Wrap-aware arithmetic on a ring of `n` positions (0..n).
//
// Angles of the display live on a ring that is not a power of two, so integer
// wrapping cannot be used. All helpers expect inputs already inside 0..n.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// `(value + 1) mod n`
#[inline(always)]
pub const fn circular_inc(value: u16, n: u16) -> u16 {
    if value + 1 >= n {
        0
    } else {
        value + 1
    }
}

/// `(value - 1) mod n`
#[inline(always)]
pub const fn circular_dec(value: u16, n: u16) -> u16 {
    if value == 0 {
        n - 1
    } else {
        value - 1
    }
}

/// Forward distance from `from` to `to`: how many increments take `from` to `to`.
#[inline(always)]
pub const fn circular_distance(from: u16, to: u16, n: u16) -> u16 {
    if from <= to {
        to - from
    } else {
        n - from + to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: u16 = 49421;

    #[test]
    fn inc_and_dec_wrap() {
        assert_eq!(circular_inc(N - 1, N), 0);
        assert_eq!(circular_inc(5, N), 6);
        assert_eq!(circular_dec(0, N), N - 1);
        assert_eq!(circular_dec(6, N), 5);
    }

    #[test]
    fn distance_is_forward() {
        assert_eq!(circular_distance(10, 10, N), 0);
        assert_eq!(circular_distance(10, 15, N), 5);
        assert_eq!(circular_distance(15, 10, N), N - 5);
    }
}
