//! Thermometer backed by an ADC sample sequencer.

use core::convert::Infallible;

use crate::{
    error::Error,
    thermometer::{RawSamples, Reading, Thermometer},
};

/// A hardware sample sequencer programmed with [`SEQUENCE_DEPTH`](super::SEQUENCE_DEPTH) steps, the
/// last of which raises the completion flag.
pub trait Sequencer {
    /// Start one run of the sequence
    fn trigger(&mut self);

    /// Returns true once the last step has completed
    fn is_complete(&self) -> bool;

    /// Clear the completion flag
    fn clear_complete(&mut self);

    /// Read the conversions out of the FIFO into `buf`
    fn read_fifo(&mut self, buf: &mut RawSamples);
}

pub struct SequencerThermometer<S> {
    sequencer: S,
    timeout: Option<u32>,
}

impl<S: Sequencer> SequencerThermometer<S> {
    /// Creates a thermometer that waits forever for the sequencer to complete.
    pub const fn new(sequencer: S) -> Self {
        Self {
            sequencer,
            timeout: None,
        }
    }

    /// Give up after `polls` reads of the completion flag. `None` waits forever.
    pub fn set_timeout(&mut self, polls: Option<u32>) {
        self.timeout = polls;
    }

    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    pub fn sequencer(&self) -> &S {
        &self.sequencer
    }
    pub fn sequencer_mut(&mut self) -> &mut S {
        &mut self.sequencer
    }

    /// Run the sequence once and return the raw conversions
    pub fn sample(&mut self) -> Result<RawSamples, Error<Infallible>> {
        self.sequencer.trigger();
        self.wait_complete()?;
        self.sequencer.clear_complete();

        let mut buf = RawSamples::default();
        self.sequencer.read_fifo(&mut buf);
        trace!("raw samples: {=[?]}", &buf[..]);

        Ok(buf)
    }

    fn wait_complete(&mut self) -> Result<(), Error<Infallible>> {
        let Some(mut remaining) = self.timeout else {
            while !self.sequencer.is_complete() {}
            return Ok(());
        };

        while !self.sequencer.is_complete() {
            if remaining == 0 {
                return Err(Error::SampleTimeout);
            }
            remaining -= 1;
        }

        Ok(())
    }
}

impl<S: Sequencer> Thermometer for SequencerThermometer<S> {
    type Error = Error<Infallible>;

    fn read(&mut self) -> Result<Reading, Self::Error> {
        let samples = self.sample()?;
        let reading = Reading::from_samples(&samples);

        if reading.is_wrapped() {
            warn!(
                "average {=u32} is below the sensor's 0 C point, reading wrapped",
                reading.average
            );
        }

        Ok(reading)
    }
}

/// Fake sequencer for testing
#[cfg(any(test, feature = "fake"))]
pub mod fake {
    use heapless::Deque;

    use super::Sequencer;
    use crate::thermometer::RawSamples;

    /// Replays queued sample sets. Each run completes after `busy_polls` status checks.
    pub struct FakeSequencer {
        runs: Deque<RawSamples, 8>,
        last: RawSamples,
        busy_polls: u32,
        stuck: bool,

        polls_left: core::cell::Cell<u32>,
        pending: bool,
        complete: core::cell::Cell<bool>,

        pub triggers: u32,
        pub clears: u32,
        pub status_reads: core::cell::Cell<u32>,
    }

    impl FakeSequencer {
        pub fn new(samples: RawSamples) -> Self {
            Self {
                runs: Deque::new(),
                last: samples,
                busy_polls: 0,
                stuck: false,
                polls_left: core::cell::Cell::new(0),
                pending: false,
                complete: core::cell::Cell::new(false),
                triggers: 0,
                clears: 0,
                status_reads: core::cell::Cell::new(0),
            }
        }

        /// Queue samples for a future run. Once the queue drains the last samples repeat.
        pub fn push(&mut self, samples: RawSamples) {
            if self.runs.push_back(samples).is_err() {
                panic!("FakeSequencer queue full");
            }
        }

        /// Number of status checks that report busy before a run completes
        pub fn set_busy_polls(&mut self, polls: u32) {
            self.busy_polls = polls;
        }

        /// Never complete a run, like a sequencer that lost its clock
        pub fn set_stuck(&mut self, stuck: bool) {
            self.stuck = stuck;
        }
    }

    impl Sequencer for FakeSequencer {
        fn trigger(&mut self) {
            self.triggers += 1;
            self.pending = true;
            self.polls_left.set(self.busy_polls);
            if let Some(samples) = self.runs.pop_front() {
                self.last = samples;
            }
        }

        fn is_complete(&self) -> bool {
            self.status_reads.set(self.status_reads.get() + 1);

            if !self.pending || self.stuck {
                return self.complete.get();
            }

            match self.polls_left.get() {
                0 => self.complete.set(true),
                n => self.polls_left.set(n - 1),
            }
            self.complete.get()
        }

        fn clear_complete(&mut self) {
            self.clears += 1;
            self.pending = false;
            self.complete.set(false);
        }

        fn read_fifo(&mut self, buf: &mut RawSamples) {
            *buf = self.last;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fake::FakeSequencer, *};

    #[test]
    fn sample_runs_full_cycle() {
        let mut seq = FakeSequencer::new([1500; 4]);
        seq.set_busy_polls(3);
        let mut therm = SequencerThermometer::new(seq);

        let reading = therm.read().unwrap();
        assert_eq!(reading.celsius, 56);
        assert_eq!(reading.fahrenheit, 132);

        let seq = therm.sequencer();
        assert_eq!(seq.triggers, 1);
        assert_eq!(seq.clears, 1);
        // three busy reports, then complete
        assert_eq!(seq.status_reads.get(), 4);
    }

    #[test]
    fn every_read_triggers_a_new_run() {
        let mut seq = FakeSequencer::new([1500; 4]);
        seq.push([1500; 4]);
        seq.push([0; 4]);
        let mut therm = SequencerThermometer::new(seq);

        assert_eq!(therm.read().unwrap().celsius, 56);
        assert_eq!(therm.read().unwrap().celsius, 147);
        // queue drained, last samples repeat
        assert_eq!(therm.read().unwrap().celsius, 147);
        assert_eq!(therm.sequencer().triggers, 3);
        assert_eq!(therm.sequencer().clears, 3);
    }

    #[test]
    fn bounded_wait_times_out() {
        let mut seq = FakeSequencer::new([1500; 4]);
        seq.set_stuck(true);
        let mut therm = SequencerThermometer::new(seq);
        assert_eq!(therm.timeout(), None);
        therm.set_timeout(Some(10));
        assert_eq!(therm.timeout(), Some(10));

        assert_eq!(therm.read(), Err(Error::SampleTimeout));
        let seq = therm.sequencer();
        assert_eq!(seq.triggers, 1);
        // flag is never cleared when the run did not finish
        assert_eq!(seq.clears, 0);
        assert_eq!(seq.status_reads.get(), 11);
    }

    #[test]
    fn bounded_wait_succeeds_within_budget() {
        let mut seq = FakeSequencer::new([1500; 4]);
        seq.set_busy_polls(10);
        let mut therm = SequencerThermometer::new(seq);
        therm.set_timeout(Some(10));

        assert!(therm.read().is_ok());
        assert_eq!(therm.sequencer().status_reads.get(), 11);
    }

    #[test]
    fn recovers_after_timeout() {
        let mut seq = FakeSequencer::new([1500; 4]);
        seq.set_stuck(true);
        let mut therm = SequencerThermometer::new(seq);
        therm.set_timeout(Some(2));
        assert!(therm.read().is_err());

        therm.sequencer_mut().set_stuck(false);
        assert_eq!(therm.read().unwrap().celsius, 56);
    }
}
