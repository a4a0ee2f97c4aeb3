//! Sampling loop

use core::convert::Infallible;

use embedded_hal::{blocking::delay::DelayUs, serial::Read};

use crate::{
    config::Config,
    error::{Error, Result},
    led::{LedDriver, Leds},
    terminal::{Action, Terminal},
    thermometer::Thermometer,
};

pub struct Monitor<T, D, S> {
    thermometer: T,
    leds: Leds<D>,
    terminal: Terminal<S>,
    config: Config,
}

impl<T, D, S> Monitor<T, D, S>
where
    T: Thermometer<Error = Error<Infallible>>,
    D: LedDriver,
    S: Read<u8> + core::fmt::Write,
{
    pub fn new(thermometer: T, leds: Leds<D>, terminal: Terminal<S>, config: Config) -> Self {
        Self {
            thermometer,
            leds,
            terminal,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn thermometer(&self) -> &T {
        &self.thermometer
    }

    pub fn leds(&self) -> &Leds<D> {
        &self.leds
    }

    pub fn terminal(&self) -> &Terminal<S> {
        &self.terminal
    }
    pub fn terminal_mut(&mut self) -> &mut Terminal<S> {
        &mut self.terminal
    }

    /// Sample, convert, then handle one byte of console input.
    #[cfg_attr(feature = "sizing", inline(never))]
    pub fn run_once(&mut self) -> Result<Action, D::Error> {
        let reading = self.thermometer.read().map_err(widen)?;

        debug!(
            "Temperature: {=u32} C, {=u32} F (raw {=u32})",
            reading.celsius,
            reading.fahrenheit,
            reading.average
        );

        self.terminal.handle(&reading, &mut self.leds)
    }

    /// Run forever, waiting [`Config::loop_period`] between iterations.
    ///
    /// A failed iteration is logged and the loop carries on.
    pub fn run(&mut self, delay: &mut impl DelayUs<u32>) -> ! {
        let period = self.config.loop_period().to_micros();
        info!("Sampling every {=u32} us", period);

        loop {
            match self.run_once() {
                Ok(action) => trace!("Action: {}", action),
                Err(e) => {
                    error!("Error: {}", e.as_str());
                }
            }

            delay.delay_us(period);
        }
    }
}

/// Sampling errors carry no pin error, lift them into the monitor's error type
fn widen<E>(e: Error<Infallible>) -> Error<E> {
    match e {
        Error::Pin(never) => match never {},
        Error::Console => Error::Console,
        Error::SampleTimeout => Error::SampleTimeout,
    }
}
