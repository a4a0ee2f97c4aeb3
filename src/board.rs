//! ADC0 sample sequencer 1, programmed to sample the on-chip temperature sensor.

use launchpad_thermo::thermometer::{sequencer::Sequencer, RawSamples};
use tm4c123x::ADC0;
use tm4c123x_hal::sysctl::{self, Domain, PowerControl, PowerState, RunMode};

pub struct Adc0Sequencer {
    adc: ADC0,
}

impl Adc0Sequencer {
    /// Power up ADC0 and program sequencer 1.
    ///
    /// All four steps sample the temperature sensor. The sequence is started by the processor, and
    /// the last step ends it and raises the completion flag.
    pub fn new(adc: ADC0, pc: &PowerControl) -> Self {
        sysctl::control_power(pc, Domain::Adc0, RunMode::Run, PowerState::On);
        sysctl::reset(pc, Domain::Adc0);

        // Sequencer has to be disabled while it is being programmed
        adc.actss.modify(|_, w| w.asen1().clear_bit());
        adc.emux.modify(|_, w| w.em1().processor());
        adc.ssmux1.reset();
        adc.ssctl1.write(|w| {
            w.ts0()
                .set_bit()
                .ts1()
                .set_bit()
                .ts2()
                .set_bit()
                .ts3()
                .set_bit()
                .ie3()
                .set_bit()
                .end3()
                .set_bit()
        });
        adc.actss.modify(|_, w| w.asen1().set_bit());

        // Drop any flag left over from before the reset
        adc.isc.write(|w| w.in1().set_bit());

        Self { adc }
    }
}

impl Sequencer for Adc0Sequencer {
    fn trigger(&mut self) {
        self.adc.pssi.write(|w| w.ss1().set_bit());
    }

    fn is_complete(&self) -> bool {
        // Raw status: the interrupt itself is never unmasked
        self.adc.ris.read().inr1().bit_is_set()
    }

    fn clear_complete(&mut self) {
        self.adc.isc.write(|w| w.in1().set_bit());
    }

    fn read_fifo(&mut self, buf: &mut RawSamples) {
        for sample in buf.iter_mut() {
            if self.adc.ssfstat1.read().empty().bit_is_set() {
                break;
            }
            *sample = u32::from(self.adc.ssfifo1.read().data().bits());
        }
    }
}
