//! On-board RGB LED driver.
//!
//! The three LEDs sit on Port F: PF1 is red, PF2 is blue and PF3 is green. At most one of them is
//! lit by the console commands.

use embedded_hal::digital::v2::{OutputPin, StatefulOutputPin};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    Red,
    Blue,
    Green,
}

impl Led {
    pub const ALL: [Led; 3] = [Led::Red, Led::Blue, Led::Green];

    /// Port F pin number the LED is wired to
    pub const fn pin(self) -> u8 {
        match self {
            Led::Red => 1,
            Led::Blue => 2,
            Led::Green => 3,
        }
    }

    /// Bit of the Port F data register that drives the LED
    pub const fn mask(self) -> u8 {
        1 << self.pin()
    }
}

/// Last state written to each LED
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedState {
    pub red: bool,
    pub blue: bool,
    pub green: bool,
}

impl LedState {
    pub const OFF: Self = Self {
        red: false,
        blue: false,
        green: false,
    };

    pub const fn get(&self, led: Led) -> bool {
        match led {
            Led::Red => self.red,
            Led::Blue => self.blue,
            Led::Green => self.green,
        }
    }

    pub fn set(&mut self, led: Led, on: bool) {
        match led {
            Led::Red => self.red = on,
            Led::Blue => self.blue = on,
            Led::Green => self.green = on,
        }
    }

    /// Number of LEDs currently on
    pub fn lit(&self) -> usize {
        Led::ALL.iter().filter(|led| self.get(**led)).count()
    }
}

/// Access to the three LED pins.
pub trait LedDriver {
    type Error;

    /// Read the current output level of the LED's pin back from the hardware
    fn is_on(&self, led: Led) -> Result<bool, Self::Error>;

    /// Drive the LED's pin
    fn set(&mut self, led: Led, on: bool) -> Result<(), Self::Error>;
}

/// LEDs on GPIO pins.
pub struct PortLeds<R, B, G> {
    red: R,
    blue: B,
    green: G,
}

impl<R, B, G, E> PortLeds<R, B, G>
where
    R: StatefulOutputPin<Error = E>,
    B: StatefulOutputPin<Error = E>,
    G: StatefulOutputPin<Error = E>,
{
    pub fn new(red: R, blue: B, green: G) -> Self {
        Self { red, blue, green }
    }

    pub fn free(self) -> (R, B, G) {
        (self.red, self.blue, self.green)
    }
}

fn write_pin<P: OutputPin>(pin: &mut P, on: bool) -> Result<(), P::Error> {
    if on {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<R, B, G, E> LedDriver for PortLeds<R, B, G>
where
    R: StatefulOutputPin<Error = E>,
    B: StatefulOutputPin<Error = E>,
    G: StatefulOutputPin<Error = E>,
{
    type Error = E;

    fn is_on(&self, led: Led) -> Result<bool, Self::Error> {
        match led {
            Led::Red => self.red.is_set_high(),
            Led::Blue => self.blue.is_set_high(),
            Led::Green => self.green.is_set_high(),
        }
    }

    fn set(&mut self, led: Led, on: bool) -> Result<(), Self::Error> {
        match led {
            Led::Red => write_pin(&mut self.red, on),
            Led::Blue => write_pin(&mut self.blue, on),
            Led::Green => write_pin(&mut self.green, on),
        }
    }
}

/// A simulated Port F data register. Bits outside the LED mask are preserved.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SimulatedPort {
    data: u8,
}

impl SimulatedPort {
    pub const fn new(data: u8) -> Self {
        Self { data }
    }

    /// Raw data register value
    pub const fn data(&self) -> u8 {
        self.data
    }
}

impl LedDriver for SimulatedPort {
    type Error = core::convert::Infallible;

    fn is_on(&self, led: Led) -> Result<bool, Self::Error> {
        Ok(self.data & led.mask() != 0)
    }

    fn set(&mut self, led: Led, on: bool) -> Result<(), Self::Error> {
        if on {
            self.data |= led.mask();
        } else {
            self.data &= !led.mask();
        }
        Ok(())
    }
}

/// The LED driver together with an in-memory copy of what was last written to it.
pub struct Leds<D> {
    driver: D,
    state: LedState,
}

impl<D: LedDriver> Leds<D> {
    /// Takes the driver and records the levels its pins currently have.
    pub fn new(driver: D) -> Result<Self, D::Error> {
        let mut state = LedState::OFF;
        for led in Led::ALL {
            state.set(led, driver.is_on(led)?);
        }

        Ok(Self { driver, state })
    }

    pub fn state(&self) -> LedState {
        self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn free(self) -> D {
        self.driver
    }

    pub fn set(&mut self, led: Led, on: bool) -> Result<(), D::Error> {
        self.driver.set(led, on)?;
        self.state.set(led, on);
        Ok(())
    }

    /// Flip `led` from whatever level its pin reads back and switch the other two off.
    ///
    /// Returns the new level of `led`.
    pub fn toggle_exclusive(&mut self, led: Led) -> Result<bool, D::Error> {
        let on = !self.driver.is_on(led)?;

        for other in Led::ALL {
            if other == led {
                self.set(other, on)?;
            } else {
                self.set(other, false)?;
            }
        }

        Ok(on)
    }
}
