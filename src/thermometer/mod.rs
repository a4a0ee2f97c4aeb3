//! Temperature sensor interface
//!
//! The on-chip sensor is sampled four times per reading. The four raw 12-bit samples are averaged
//! with round-half-up, then converted with the datasheet's linear equation. Everything is done in
//! 32-bit unsigned integer arithmetic and truncates toward zero.

pub mod sequencer;

use static_assertions::const_assert;

/// Number of conversions one trigger of the sample sequencer produces.
pub const SEQUENCE_DEPTH: usize = 4;

/// Largest value the 12-bit converter can produce.
pub const MAX_RAW: u32 = 4095;

/// One sequencer run worth of raw conversions.
pub type RawSamples = [u32; SEQUENCE_DEPTH];

const ROUNDING: u32 = SEQUENCE_DEPTH as u32 / 2;

// Datasheet equation, in tenths of a degree
const OFFSET: u32 = 1475;
const SLOPE: u32 = 2475;
const FULL_SCALE: u32 = 4096;

// The sum of a full sequence and the scaled average must both fit in 32 bits.
const_assert!(MAX_RAW as u64 * SEQUENCE_DEPTH as u64 + ROUNDING as u64 <= u32::MAX as u64);
const_assert!(SLOPE as u64 * MAX_RAW as u64 <= u32::MAX as u64);

/// Averages a sequence with round-half-up: `(s0 + s1 + s2 + s3 + 2) / 4`.
pub fn average(samples: &RawSamples) -> u32 {
    let sum = samples
        .iter()
        .fold(ROUNDING, |acc, sample| acc.wrapping_add(*sample));
    sum / SEQUENCE_DEPTH as u32
}

/// Converts an averaged raw value to whole degrees Celsius: `(1475 - 2475 * avg / 4096) / 10`.
///
/// Readings colder than 0 °C have no unsigned representation. For those the subtraction wraps
/// exactly like 32-bit hardware arithmetic does; see [`is_wrapped`].
pub fn celsius(average: u32) -> u32 {
    let scaled = SLOPE.wrapping_mul(average) / FULL_SCALE;
    OFFSET.wrapping_sub(scaled) / 10
}

/// Converts whole degrees Celsius to whole degrees Fahrenheit: `c * 9 / 5 + 32`.
///
/// The multiplication has to happen before the division.
pub fn fahrenheit(celsius: u32) -> u32 {
    celsius.wrapping_mul(9) / 5 + 32
}

/// Returns true if `average` is past the sensor's zero point and [`celsius`] wrapped.
pub fn is_wrapped(average: u32) -> bool {
    SLOPE.wrapping_mul(average) / FULL_SCALE > OFFSET
}

/// Result of converting one sequence of raw samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub average: u32,
    pub celsius: u32,
    pub fahrenheit: u32,
}

impl Reading {
    pub fn from_samples(samples: &RawSamples) -> Self {
        let average = average(samples);
        let celsius = celsius(average);

        Self {
            average,
            celsius,
            fahrenheit: fahrenheit(celsius),
        }
    }

    #[inline]
    pub fn is_wrapped(&self) -> bool {
        is_wrapped(self.average)
    }
}

pub trait Thermometer {
    type Error;

    /// Take a fresh reading. Never returns a cached value.
    fn read(&mut self) -> Result<Reading, Self::Error>;
}

/// Fake thermometer for testing
#[cfg(any(test, feature = "fake"))]
pub mod fake {
    use core::convert::Infallible;

    use crate::{
        error::Error,
        thermometer::{RawSamples, Reading, Thermometer},
    };

    /// A fake thermometer that converts the same raw samples on every read
    pub struct FakeThermometer {
        samples: RawSamples,
        reads: u32,
    }

    impl FakeThermometer {
        pub fn new(samples: RawSamples) -> Self {
            Self { samples, reads: 0 }
        }

        /// Get a mutable reference to the raw samples
        pub fn samples_mut(&mut self) -> &mut RawSamples {
            &mut self.samples
        }

        /// Number of readings taken so far
        pub fn reads(&self) -> u32 {
            self.reads
        }
    }

    impl Thermometer for FakeThermometer {
        type Error = Error<Infallible>;

        fn read(&mut self) -> Result<Reading, Self::Error> {
            self.reads += 1;
            Ok(Reading::from_samples(&self.samples))
        }
    }
}
