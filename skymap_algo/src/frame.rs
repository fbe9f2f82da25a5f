// Implements the DCF77 frame decoder: BCD fields, parity checks, frame
// validation and conversion of a frame into minutes since the epoch.

// Key Features:
// - Frame: the 59 bits of one minute packed into a u64 (bit n = second n).
// - Validation of the start-of-minute, start-of-time and time-zone markers and
//   of the three even-parity groups.
// - Conversion to minutes since 2000-01-01 00:00 CET, summer time folded back.
// - Encoding of a civil time into a valid frame (used to simulate a transmitter).

// Detailed Operation:
// BCD fields are summed with the weight sequence 1, 2, 4, 8, 10, 20, 40, 80.
// Parity groups are XOR-folded, a valid group has an even number of set bits
// including its parity bit. Day counting ignores the century leap exception,
// which is irrelevant for years 2000..2099.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Number of data bits broadcast per minute.
pub const FRAME_BITS: usize = 59;

const FRAME_MASK: u64 = (1 << FRAME_BITS) - 1;

/// Weights of consecutive bits in a two-digit BCD field.
const BCD_WEIGHTS: [u8; 8] = [1, 2, 4, 8, 10, 20, 40, 80];

// Bit positions of the DCF77 layout
const START_OF_MINUTE: usize = 0;
const CEST: usize = 17;
const CET: usize = 18;
const START_OF_TIME: usize = 20;
const MINUTE: (usize, usize) = (21, 7);
const MINUTE_PARITY: usize = 28;
const HOUR: (usize, usize) = (29, 6);
const HOUR_PARITY: usize = 35;
const DAY: (usize, usize) = (36, 6);
const WEEKDAY: (usize, usize) = (42, 3);
const MONTH: (usize, usize) = (45, 5);
const YEAR: (usize, usize) = (50, 8);
const DATE_PARITY: usize = 58;

/// Reasons a received frame is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Bit 0 is set
    StartOfMinute,
    /// Bit 20 is clear
    StartOfTime,
    /// CEST and CET bits are equal
    TimeZone,
    /// Bits 21..=28 have odd parity
    MinuteParity,
    /// Bits 29..=35 have odd parity
    HourParity,
    /// Bits 36..=58 have odd parity
    DateParity,
}

/// Civil time carried by a frame, years counted from 2000.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    /// 1 = Monday .. 7 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    /// CEST in effect (hour is one ahead of CET)
    pub summer_time: bool,
}

/// One minute of time-signal bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame(u64);

impl Frame {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Builds a frame from raw bits, bit n of `bits` being second n.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & FRAME_MASK)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn bit(&self, index: usize) -> bool {
        index < FRAME_BITS && (self.0 >> index) & 1 != 0
    }

    /// Writes one bit; indices past the frame are ignored.
    #[inline(always)]
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= FRAME_BITS {
            return;
        }
        if value {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    /// Sums the BCD weights of the set bits in `start..start + count`.
    /// `count` is at most 8, larger values are clamped.
    pub fn decode_bcd(&self, start: usize, count: usize) -> u8 {
        BCD_WEIGHTS
            .iter()
            .take(count)
            .enumerate()
            .filter(|&(i, _)| self.bit(start + i))
            .fold(0, |val, (_, &w)| val + w)
    }

    /// Writes `value` (0..=99) as BCD into `start..start + count`.
    /// Digits that do not fit into `count` bits are dropped.
    pub fn set_bcd(&mut self, start: usize, count: usize, value: u8) {
        let mut ones = value % 10;
        let mut tens = value / 10 % 10;
        for i in 0..count.min(BCD_WEIGHTS.len()) {
            let bit = if i < 4 {
                let b = ones & 1;
                ones >>= 1;
                b
            } else {
                let b = tens & 1;
                tens >>= 1;
                b
            };
            self.set(start + i, bit != 0);
        }
    }

    /// XOR of `count` bits from `start`: false for an even number of set bits.
    pub fn parity(&self, start: usize, count: usize) -> bool {
        let end = (start + count).min(FRAME_BITS);
        if start >= end {
            return false;
        }
        let mask = ((1u64 << (end - start)) - 1) << start;
        (self.0 & mask).count_ones() & 1 != 0
    }

    /// Checks markers and parity groups.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.bit(START_OF_MINUTE) {
            return Err(FrameError::StartOfMinute);
        }
        if !self.bit(START_OF_TIME) {
            return Err(FrameError::StartOfTime);
        }
        if self.bit(CEST) == self.bit(CET) {
            return Err(FrameError::TimeZone);
        }
        if self.parity(MINUTE.0, MINUTE.1 + 1) {
            return Err(FrameError::MinuteParity);
        }
        if self.parity(HOUR.0, HOUR.1 + 1) {
            return Err(FrameError::HourParity);
        }
        if self.parity(DAY.0, DATE_PARITY + 1 - DAY.0) {
            return Err(FrameError::DateParity);
        }
        Ok(())
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Minutes since 2000-01-01 00:00 CET. Only meaningful for a validated frame.
    pub fn minutes(&self) -> u32 {
        let years = self.decode_bcd(YEAR.0, YEAR.1) as u32;

        // Days in previous years, plus one for every leap year among them
        let mut days = years * 365 + (years + 3) / 4;
        let month = self.decode_bcd(MONTH.0, MONTH.1);
        for m in 1..month {
            days += month_length(m, years as u8) as u32;
        }
        // Day of month starts at 1
        days = (days + self.decode_bcd(DAY.0, DAY.1) as u32).saturating_sub(1);

        // Summer time is one hour ahead of the CET based epoch
        let hours = (days * 24 + self.decode_bcd(HOUR.0, HOUR.1) as u32)
            .saturating_sub(self.bit(CEST) as u32);

        hours * 60 + self.decode_bcd(MINUTE.0, MINUTE.1) as u32
    }

    /// Decodes the civil fields without any plausibility check.
    pub fn time(&self) -> FrameTime {
        FrameTime {
            year: self.decode_bcd(YEAR.0, YEAR.1),
            month: self.decode_bcd(MONTH.0, MONTH.1),
            day: self.decode_bcd(DAY.0, DAY.1),
            weekday: self.decode_bcd(WEEKDAY.0, WEEKDAY.1),
            hour: self.decode_bcd(HOUR.0, HOUR.1),
            minute: self.decode_bcd(MINUTE.0, MINUTE.1),
            summer_time: self.bit(CEST),
        }
    }

    /// Builds the frame a transmitter would send for `time`, with valid markers
    /// and even parity in every group.
    pub fn encode(time: &FrameTime) -> Frame {
        let mut frame = Frame::new();
        frame.set(START_OF_TIME, true);
        frame.set(CEST, time.summer_time);
        frame.set(CET, !time.summer_time);

        frame.set_bcd(MINUTE.0, MINUTE.1, time.minute);
        frame.set(MINUTE_PARITY, frame.parity(MINUTE.0, MINUTE.1));

        frame.set_bcd(HOUR.0, HOUR.1, time.hour);
        frame.set(HOUR_PARITY, frame.parity(HOUR.0, HOUR.1));

        frame.set_bcd(DAY.0, DAY.1, time.day);
        frame.set_bcd(WEEKDAY.0, WEEKDAY.1, time.weekday);
        frame.set_bcd(MONTH.0, MONTH.1, time.month);
        frame.set_bcd(YEAR.0, YEAR.1, time.year);
        frame.set(DATE_PARITY, frame.parity(DAY.0, DATE_PARITY - DAY.0));

        frame
    }
}

/// Days in `month` (1 = January) of year `2000 + years`.
pub const fn month_length(month: u8, years: u8) -> u8 {
    if month == 2 {
        28 + (years % 4 == 0) as u8
    } else {
        // 31-day months are odd up to July and even from August
        let m = if month >= 8 { month - 1 } else { month };
        30 + (m & 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// xorshift32, enough to scatter bits for parity checks
    fn next_random(state: &mut u32) -> u32 {
        let mut x = *state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        *state = x;
        x
    }

    fn summer_noon() -> FrameTime {
        FrameTime {
            year: 18,
            month: 6,
            day: 15,
            weekday: 5,
            hour: 12,
            minute: 34,
            summer_time: true,
        }
    }

    #[test]
    fn bcd_round_trip() {
        for value in 0..=99u8 {
            let mut frame = Frame::new();
            frame.set_bcd(10, 8, value);
            assert_eq!(frame.decode_bcd(10, 8), value);
        }
    }

    #[test]
    fn bcd_respects_field_width() {
        let mut frame = Frame::new();
        frame.set_bcd(MONTH.0, MONTH.1, 12);
        assert_eq!(frame.decode_bcd(MONTH.0, MONTH.1), 12);
        assert_eq!(frame.decode_bcd(MONTH.0, 4), 2);
    }

    #[test]
    fn parity_matches_popcount() {
        let mut seed = 0x1234_5678;
        for &count in &[7usize, 8, 23] {
            for _ in 0..500 {
                let raw = (next_random(&mut seed) as u64) << 32 | next_random(&mut seed) as u64;
                let frame = Frame::from_bits(raw);
                let start = 36 - count / 2;
                let ones = (start..start + count).filter(|&i| frame.bit(i)).count();
                assert_eq!(frame.parity(start, count), ones % 2 == 1);
            }
        }
    }

    #[test]
    fn month_lengths() {
        let lengths: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (i, &len) in lengths.iter().enumerate() {
            assert_eq!(month_length(i as u8 + 1, 1), len);
        }
        assert_eq!(month_length(2, 0), 29);
        assert_eq!(month_length(2, 24), 29);
        assert_eq!(month_length(2, 23), 28);
    }

    #[test]
    fn encoded_frame_is_valid() {
        let frame = Frame::encode(&summer_noon());
        assert_eq!(frame.validate(), Ok(()));
        assert_eq!(frame.time(), summer_noon());
    }

    #[test]
    fn rejects_start_of_minute_regardless_of_content() {
        let mut seed = 0xdead_beef;
        for _ in 0..200 {
            let raw = (next_random(&mut seed) as u64) << 32 | next_random(&mut seed) as u64;
            let frame = Frame::from_bits(raw | 1);
            assert_eq!(frame.validate(), Err(FrameError::StartOfMinute));
        }
    }

    #[test]
    fn rejects_equal_time_zone_bits() {
        let mut frame = Frame::encode(&summer_noon());
        frame.set(CET, true);
        assert_eq!(frame.validate(), Err(FrameError::TimeZone));
        frame.set(CET, false);
        frame.set(CEST, false);
        assert_eq!(frame.validate(), Err(FrameError::TimeZone));
    }

    #[test]
    fn rejects_each_parity_group() {
        let good = Frame::encode(&summer_noon());

        let mut frame = good;
        frame.set(MINUTE_PARITY, !good.bit(MINUTE_PARITY));
        assert_eq!(frame.validate(), Err(FrameError::MinuteParity));

        let mut frame = good;
        frame.set(HOUR.0, !good.bit(HOUR.0));
        assert_eq!(frame.validate(), Err(FrameError::HourParity));

        let mut frame = good;
        frame.set(YEAR.0 + 2, !good.bit(YEAR.0 + 2));
        assert_eq!(frame.validate(), Err(FrameError::DateParity));

        let mut frame = good;
        frame.set(START_OF_TIME, false);
        assert_eq!(frame.validate(), Err(FrameError::StartOfTime));
    }

    #[test]
    fn epoch_is_minute_zero() {
        let frame = Frame::encode(&FrameTime {
            year: 0,
            month: 1,
            day: 1,
            weekday: 6,
            hour: 0,
            minute: 0,
            summer_time: false,
        });
        assert!(frame.is_valid());
        assert_eq!(frame.minutes(), 0);
    }

    #[test]
    fn summer_time_is_folded_to_cet() {
        // 2018-06-15 12:34 CEST = 11:34 CET, 6740 days after the epoch
        let frame = Frame::encode(&summer_noon());
        assert_eq!(frame.minutes(), (6740 * 24 + 11) * 60 + 34);
    }
}
