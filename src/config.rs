//! Compile-time settings for the sampling loop.

use fugit::{HertzU32, MicrosDurationU32};

/// How the console is read once per loop iteration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    /// Wait until a byte arrives. Sampling pauses while the console is idle.
    Blocking,
    /// Take a byte only if one is pending, otherwise carry on with no input.
    Polling,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// System clock the PLL is configured for
    pub sysclk: HertzU32,
    /// Console baud rate
    pub baud_rate: u32,
    /// Sample-rate divisor. Each iteration ends with a busy-wait of `3 / rate_divisor` seconds.
    pub rate_divisor: u32,
    /// Console read behaviour
    pub input: InputMode,
    /// Maximum number of completion-flag polls per sample, or `None` to wait forever
    pub ready_timeout: Option<u32>,
}

impl Config {
    pub const DEFAULT: Self = Self {
        sysclk: HertzU32::MHz(20),
        baud_rate: 9600,
        rate_divisor: 6,
        input: InputMode::Blocking,
        ready_timeout: None,
    };

    pub const fn with_rate_divisor(self, rate_divisor: u32) -> Self {
        Self {
            rate_divisor,
            ..self
        }
    }

    pub const fn with_input(self, input: InputMode) -> Self {
        Self { input, ..self }
    }

    pub const fn with_ready_timeout(self, polls: u32) -> Self {
        Self {
            ready_timeout: Some(polls),
            ..self
        }
    }

    /// Wall-clock length of the delay at the end of every iteration.
    ///
    /// The delay spins `3 * sysclk / rate_divisor` cycles, which is independent of the clock rate.
    pub const fn loop_period(&self) -> MicrosDurationU32 {
        let divisor = if self.rate_divisor == 0 {
            1
        } else {
            self.rate_divisor
        };
        MicrosDurationU32::from_ticks(3_000_000 / divisor)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
