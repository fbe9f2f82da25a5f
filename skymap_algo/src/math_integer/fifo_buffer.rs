// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Fixed-size ring that overwrites its oldest entry once full.
pub struct BufferFIFO<T, const N: usize> {
    buffer: [T; N],

    /// Slot written next (the oldest entry once the ring is full)
    idx: usize,
    /// Number of valid entries (saturates at N)
    len: usize,
}

impl<T, const N: usize> BufferFIFO<T, N>
where
    T: Default + Copy,
{
    pub fn new() -> Self {
        Self {
            buffer: [T::default(); N],
            idx: 0,
            len: 0,
        }
    }

    /// Stores `value`, dropping the oldest entry if the ring is full.
    pub fn write(&mut self, value: T) {
        self.buffer[self.idx] = value;
        self.idx = (self.idx + 1) % N;
        self.len = (self.len + 1).min(N);
    }

    /// Entry written `age` writes ago (0 is the latest).
    pub fn get(&self, age: usize) -> Option<T> {
        if age >= self.len {
            return None;
        }
        Some(self.buffer[(self.idx + N - 1 - age) % N])
    }
}

impl<T, const N: usize> Default for BufferFIFO<T, N>
where
    T: Default + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_oldest() {
        let mut fifo: BufferFIFO<u16, 3> = BufferFIFO::new();
        assert_eq!(fifo.get(0), None);
        for v in 1..=5 {
            fifo.write(v);
        }
        assert_eq!(fifo.get(0), Some(5));
        assert_eq!(fifo.get(2), Some(3));
        assert_eq!(fifo.get(1), Some(4));
        assert_eq!(fifo.get(3), None);
    }
}
