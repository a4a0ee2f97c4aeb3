pub type Result<T, E> = core::result::Result<T, Error<E>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// An LED pin could not be read back or written
    Pin(E),

    /// Writing to the serial console failed
    Console,

    /// The ADC sequencer did not raise its completion flag within the configured number of polls
    SampleTimeout,
}

impl<E> Error<E> {
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::Pin(_) => "Pin error",
            Error::Console => "Console write failed",
            Error::SampleTimeout => "Sample timeout",
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}
