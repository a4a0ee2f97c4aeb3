//! Serial console: startup banner and the single-key command handler.
//!
//! Commands (case-insensitive, one byte each):
//! - `c` - Print the temperature in Celsius
//! - `f` - Print the temperature in Fahrenheit
//! - `r` - Toggle the red LED, switch the others off
//! - `g` - Toggle the green LED, switch the others off
//! - `b` - Toggle the blue LED, switch the others off
//!
//! Any other byte is ignored.

use core::fmt::{self, Write};

use embedded_hal::serial::Read;
use num_traits::AsPrimitive;

use crate::{
    config::InputMode,
    error::{Error, Result},
    led::{Led, LedDriver, Leds},
    thermometer::Reading,
};

pub const BANNER: [&str; 3] = [
    "EE505 Lab 3: Introduction to C Programming and UART\n",
    "*****************************************************\n",
    "Analog Input: Internal Temperature Sensor\n",
];
pub const READY_STR: &str = "Initialization Complete...\n";

/// Minimum width of the printed temperature value, padded with spaces on the left
const TEMP_WIDTH: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Celsius,
    Fahrenheit,
}

impl Unit {
    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
        }
    }

    pub const fn select(self, reading: &Reading) -> u32 {
        match self {
            Unit::Celsius => reading.celsius,
            Unit::Fahrenheit => reading.fahrenheit,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Print(Unit),
    Toggle(Led),
}

impl Command {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'C' | b'c' => Some(Command::Print(Unit::Celsius)),
            b'F' | b'f' => Some(Command::Print(Unit::Fahrenheit)),
            b'R' | b'r' => Some(Command::Toggle(Led::Red)),
            b'G' | b'g' => Some(Command::Toggle(Led::Green)),
            b'B' | b'b' => Some(Command::Toggle(Led::Blue)),
            _ => None,
        }
    }
}

/// What the handler did with the byte it consumed
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// No byte was available (polling mode) or the line reported an error
    NoInput,
    /// The byte is not a command
    Ignored(u8),
    Printed { unit: Unit, value: u32 },
    Toggled { led: Led, on: bool },
}

pub struct Terminal<S> {
    serial: S,
    input: InputMode,
}

impl<S> Terminal<S>
where
    S: Read<u8> + Write,
{
    pub const fn new(serial: S, input: InputMode) -> Self {
        Self { serial, input }
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn free(self) -> S {
        self.serial
    }

    pub fn print_banner(&mut self) -> fmt::Result {
        for line in BANNER {
            self.serial.write_str(line)?;
        }
        Ok(())
    }

    pub fn print_ready(&mut self) -> fmt::Result {
        self.serial.write_str(READY_STR)
    }

    /// Print `Temperature = %3d*C` (or `*F`) followed by a newline
    pub fn print_temperature(&mut self, unit: Unit, value: u32) -> fmt::Result {
        let tx = &mut self.serial;
        tx.write_str("Temperature = ")?;
        print_uint(tx, value, TEMP_WIDTH)?;
        tx.write_str("*")?;
        tx.write_str(unit.symbol())?;
        tx.write_str("\n")
    }

    /// Consume one byte of input and act on it.
    ///
    /// Printing touches no LED, toggling prints nothing, anything else does neither.
    #[cfg_attr(feature = "sizing", inline(never))]
    pub fn handle<D: LedDriver>(
        &mut self,
        reading: &Reading,
        leds: &mut Leds<D>,
    ) -> Result<Action, D::Error> {
        let Some(b) = self.read_byte() else {
            return Ok(Action::NoInput);
        };

        let Some(command) = Command::from_byte(b) else {
            trace!("Ignoring byte {=u8:#x}", b);
            return Ok(Action::Ignored(b));
        };
        trace!("Command: {}", command);

        match command {
            Command::Print(unit) => {
                let value = unit.select(reading);
                self.print_temperature(unit, value)
                    .map_err(|_| Error::Console)?;
                Ok(Action::Printed { unit, value })
            }
            Command::Toggle(led) => {
                let on = leds.toggle_exclusive(led)?;
                debug!("{} LED {=bool}", led, on);
                Ok(Action::Toggled { led, on })
            }
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        loop {
            match self.serial.read() {
                Ok(b) => return Some(b),
                Err(nb::Error::WouldBlock) => match self.input {
                    InputMode::Blocking => continue,
                    InputMode::Polling => return None,
                },
                // The TM4C UART never reports line errors here, it hands back the byte as received
                Err(nb::Error::Other(_)) => {
                    warn!("Serial read error, input dropped");
                    return None;
                }
            }
        }
    }
}

/// Print `num` in decimal, right-aligned to at least `width` characters
fn print_uint<W: Write>(tx: &mut W, mut num: u32, width: usize) -> fmt::Result {
    const BUF_SIZE: usize = 10;

    let mut buf = [b' '; BUF_SIZE];
    let mut idx = 0;

    loop {
        let digit: u8 = (num % 10).as_();
        num /= 10;

        buf[BUF_SIZE - idx - 1] = b'0' + digit;
        idx += 1;

        if num == 0 {
            break;
        }
    }

    let start = BUF_SIZE - idx.max(width.min(BUF_SIZE));
    // SAFETY: buf only holds ASCII digits and spaces
    tx.write_str(unsafe { core::str::from_utf8_unchecked(&buf[start..]) })
}

/// Fake serial port for testing
#[cfg(any(test, feature = "fake"))]
pub mod fake {
    use core::fmt;

    use heapless::{Deque, String};

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum FakeSerialError {
        /// A queued line error such as framing or overrun
        Line,
        /// Nothing left to read. Returned instead of blocking so tests cannot hang.
        Exhausted,
    }

    /// Serial port that reads from a queue and records everything written.
    #[derive(Default)]
    pub struct FakeSerial {
        rx: Deque<Option<u8>, 32>,
        tx: String<512>,
        idle_reads: u32,
        fail_writes: bool,
    }

    impl FakeSerial {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue input bytes
        pub fn feed(&mut self, bytes: &[u8]) {
            for b in bytes {
                if self.rx.push_back(Some(*b)).is_err() {
                    panic!("FakeSerial input full");
                }
            }
        }

        /// Queue a line error
        pub fn feed_error(&mut self) {
            if self.rx.push_back(None).is_err() {
                panic!("FakeSerial input full");
            }
        }

        /// Report `WouldBlock` this many times before the next byte
        pub fn set_idle_reads(&mut self, reads: u32) {
            self.idle_reads = reads;
        }

        pub fn set_fail_writes(&mut self, fail: bool) {
            self.fail_writes = fail;
        }

        pub fn pending(&self) -> usize {
            self.rx.len()
        }

        pub fn output(&self) -> &str {
            self.tx.as_str()
        }

        pub fn clear_output(&mut self) {
            self.tx.clear();
        }
    }

    impl embedded_hal::serial::Read<u8> for FakeSerial {
        type Error = FakeSerialError;

        fn read(&mut self) -> nb::Result<u8, Self::Error> {
            if self.idle_reads > 0 {
                self.idle_reads -= 1;
                return Err(nb::Error::WouldBlock);
            }

            match self.rx.pop_front() {
                Some(Some(b)) => Ok(b),
                Some(None) => Err(nb::Error::Other(FakeSerialError::Line)),
                None => Err(nb::Error::Other(FakeSerialError::Exhausted)),
            }
        }
    }

    impl fmt::Write for FakeSerial {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.fail_writes {
                return Err(fmt::Error);
            }
            self.tx.push_str(s).map_err(|()| fmt::Error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fake::FakeSerial, *};
    use crate::led::{LedState, SimulatedPort};

    const READING: Reading = Reading {
        average: 1500,
        celsius: 56,
        fahrenheit: 132,
    };

    fn setup(input: &[u8]) -> (Terminal<FakeSerial>, Leds<SimulatedPort>) {
        let mut serial = FakeSerial::new();
        serial.feed(input);
        let terminal = Terminal::new(serial, InputMode::Blocking);
        let leds = Leds::new(SimulatedPort::default()).unwrap();
        (terminal, leds)
    }

    #[test]
    fn parses_every_command_in_both_cases() {
        for (upper, command) in [
            (b'C', Command::Print(Unit::Celsius)),
            (b'F', Command::Print(Unit::Fahrenheit)),
            (b'R', Command::Toggle(Led::Red)),
            (b'G', Command::Toggle(Led::Green)),
            (b'B', Command::Toggle(Led::Blue)),
        ] {
            assert_eq!(Command::from_byte(upper), Some(command));
            assert_eq!(Command::from_byte(upper.to_ascii_lowercase()), Some(command));
        }
    }

    #[test]
    fn rejects_everything_else() {
        let commands = b"CcFfRrGgBb";
        for b in 0..=u8::MAX {
            if !commands.contains(&b) {
                assert_eq!(Command::from_byte(b), None, "{b:#x}");
            }
        }
    }

    #[test]
    fn prints_celsius() {
        let (mut terminal, mut leds) = setup(b"c");
        let action = terminal.handle(&READING, &mut leds).unwrap();

        assert_eq!(
            action,
            Action::Printed {
                unit: Unit::Celsius,
                value: 56
            }
        );
        assert_eq!(terminal.serial().output(), "Temperature =  56*C\n");
        assert_eq!(leds.driver().data(), 0);
    }

    #[test]
    fn prints_fahrenheit() {
        let (mut terminal, mut leds) = setup(b"F");
        terminal.handle(&READING, &mut leds).unwrap();

        assert_eq!(terminal.serial().output(), "Temperature = 132*F\n");
        assert_eq!(leds.driver().data(), 0);
    }

    #[test]
    fn printing_leaves_lit_led_alone() {
        let (mut terminal, mut leds) = setup(b"rcf");
        terminal.handle(&READING, &mut leds).unwrap();
        let before = leds.driver().data();

        terminal.handle(&READING, &mut leds).unwrap();
        terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(leds.driver().data(), before);
        assert!(leds.state().red);
    }

    #[test]
    fn toggle_red_twice() {
        let (mut terminal, mut leds) = setup(b"rR");

        let action = terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(
            action,
            Action::Toggled {
                led: Led::Red,
                on: true
            }
        );
        assert_eq!(leds.driver().data(), 0b0000_0010);

        terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(leds.driver().data(), 0);
        assert_eq!(terminal.serial().output(), "");
    }

    #[test]
    fn green_toggles_pf3_and_clears_pf1_pf2() {
        let mut serial = FakeSerial::new();
        serial.feed(b"g");
        let mut terminal = Terminal::new(serial, InputMode::Blocking);
        let mut leds = Leds::new(SimulatedPort::new(0b0000_0110)).unwrap();

        terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(leds.driver().data(), 0b0000_1000);
    }

    #[test]
    fn blue_toggles_pf2_and_clears_pf1_pf3() {
        let mut serial = FakeSerial::new();
        serial.feed(b"b");
        let mut terminal = Terminal::new(serial, InputMode::Blocking);
        let mut leds = Leds::new(SimulatedPort::new(0b0000_1010)).unwrap();

        terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(leds.driver().data(), 0b0000_0100);
        assert_eq!(
            leds.state(),
            LedState {
                red: false,
                blue: true,
                green: false,
            }
        );
    }

    #[test]
    fn unknown_byte_is_a_no_op() {
        let (mut terminal, mut leds) = setup(b"rx");
        terminal.handle(&READING, &mut leds).unwrap();
        let before = leds.driver().data();

        let action = terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(action, Action::Ignored(b'x'));
        assert_eq!(leds.driver().data(), before);
        assert_eq!(terminal.serial().output(), "");
    }

    #[test]
    fn consumes_exactly_one_byte() {
        let (mut terminal, mut leds) = setup(b"cf");
        terminal.handle(&READING, &mut leds).unwrap();
        assert_eq!(terminal.serial().pending(), 1);
    }

    #[test]
    fn blocking_waits_for_a_byte() {
        let (mut terminal, mut leds) = setup(b"c");
        terminal.serial_mut().set_idle_reads(5);

        let action = terminal.handle(&READING, &mut leds).unwrap();
        assert!(matches!(action, Action::Printed { .. }));
    }

    #[test]
    fn polling_returns_without_input() {
        let mut serial = FakeSerial::new();
        serial.feed(b"c");
        serial.set_idle_reads(1);
        let mut terminal = Terminal::new(serial, InputMode::Polling);
        let mut leds = Leds::new(SimulatedPort::default()).unwrap();

        assert_eq!(
            terminal.handle(&READING, &mut leds).unwrap(),
            Action::NoInput
        );
        assert!(matches!(
            terminal.handle(&READING, &mut leds).unwrap(),
            Action::Printed { .. }
        ));
    }

    #[test]
    fn line_error_counts_as_no_input() {
        let mut serial = FakeSerial::new();
        serial.feed_error();
        let mut terminal = Terminal::new(serial, InputMode::Blocking);
        let mut leds = Leds::new(SimulatedPort::default()).unwrap();

        assert_eq!(
            terminal.handle(&READING, &mut leds).unwrap(),
            Action::NoInput
        );
    }

    #[test]
    fn write_failure_is_reported() {
        let (mut terminal, mut leds) = setup(b"c");
        terminal.serial_mut().set_fail_writes(true);

        assert_eq!(terminal.handle(&READING, &mut leds), Err(Error::Console));
    }

    #[test]
    fn banner_text() {
        let mut terminal = Terminal::new(FakeSerial::new(), InputMode::Blocking);
        terminal.print_banner().unwrap();
        terminal.print_ready().unwrap();

        assert_eq!(
            terminal.serial().output(),
            "EE505 Lab 3: Introduction to C Programming and UART\n\
             *****************************************************\n\
             Analog Input: Internal Temperature Sensor\n\
             Initialization Complete...\n"
        );

        let serial = terminal.free();
        assert_eq!(serial.output().lines().count(), 4);
    }

    #[test]
    fn pads_to_three_columns() {
        let mut terminal = Terminal::new(FakeSerial::new(), InputMode::Blocking);
        for value in [0, 7, 42, 100, 1234, u32::MAX] {
            terminal.print_temperature(Unit::Celsius, value).unwrap();
        }

        assert_eq!(
            terminal.serial().output(),
            "Temperature =   0*C\n\
             Temperature =   7*C\n\
             Temperature =  42*C\n\
             Temperature = 100*C\n\
             Temperature = 1234*C\n\
             Temperature = 4294967295*C\n"
        );
    }
}
