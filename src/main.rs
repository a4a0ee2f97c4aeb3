#![no_std]
#![no_main]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::wildcard_imports)]

mod board;

use defmt_rtt as _;
use launchpad_thermo::config::Config;
use panic_probe as _;

/// Loop settings. `rate_divisor` sets how long each iteration waits before sampling again.
const CONFIG: Config = Config::DEFAULT;

#[rtic::app(device = tm4c123x)]
mod app {
    use defmt::{panic, *};
    use launchpad_thermo::{
        control::Monitor,
        led::{Leds, PortLeds},
        terminal::Terminal,
        thermometer::sequencer::SequencerThermometer,
    };
    use tm4c123x::UART0;
    use tm4c123x_hal::{
        delay::Delay,
        gpio::{
            gpioa::{PA0, PA1},
            gpiof::{PF1, PF2, PF3},
            AlternateFunction, Output, PushPull, AF1,
        },
        prelude::*,
        serial::{NewlineMode, Serial},
        sysctl::{CrystalFrequency, Oscillator, PllOutputFrequency, SystemClock},
    };

    use crate::{board::Adc0Sequencer, CONFIG};

    type Console = Serial<
        UART0,
        PA1<AlternateFunction<AF1, PushPull>>,
        PA0<AlternateFunction<AF1, PushPull>>,
        (),
        (),
    >;
    type LedPins = PortLeds<PF1<Output<PushPull>>, PF2<Output<PushPull>>, PF3<Output<PushPull>>>;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        monitor: Monitor<SequencerThermometer<Adc0Sequencer>, LedPins, Console>,
        delay: Delay,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        // Set system clock to 20 MHz from the PLL
        let mut sc = cx.device.SYSCTL.constrain();
        sc.clock_setup.oscillator = Oscillator::Main(
            CrystalFrequency::_16mhz,
            SystemClock::UsePll(PllOutputFrequency::_20mhz),
        );
        let clocks = sc.clock_setup.freeze();

        trace!("sysclk: {}", clocks.sysclk.0);
        if clocks.sysclk.0 != CONFIG.sysclk.to_Hz() {
            warn!(
                "sysclk is {=u32} Hz, expected {=u32} Hz",
                clocks.sysclk.0,
                CONFIG.sysclk.to_Hz()
            );
        }

        // Setup UART0 console on PA0/PA1
        let mut porta = cx.device.GPIO_PORTA.split(&sc.power_control);
        let usart = Serial::uart0(
            cx.device.UART0,
            porta.pa1.into_af_push_pull::<AF1>(&mut porta.control),
            porta.pa0.into_af_push_pull::<AF1>(&mut porta.control),
            (),
            (),
            CONFIG.baud_rate.bps(),
            NewlineMode::SwapLFtoCRLF,
            &clocks,
            &sc.power_control,
        );
        let mut terminal = Terminal::new(usart, CONFIG.input);

        // Setup RGB LED outputs on PF1-PF3
        let portf = cx.device.GPIO_PORTF.split(&sc.power_control);
        let Ok(leds) = Leds::new(PortLeds::new(
            portf.pf1.into_push_pull_output(),
            portf.pf2.into_push_pull_output(),
            portf.pf3.into_push_pull_output(),
        )) else {
            panic!("Failed to read back LED pins");
        };

        if terminal.print_banner().is_err() {
            panic!("Failed to write to UART");
        }

        // Setup ADC0 sequencer 1 on the temperature sensor
        let mut thermometer =
            SequencerThermometer::new(Adc0Sequencer::new(cx.device.ADC0, &sc.power_control));
        thermometer.set_timeout(CONFIG.ready_timeout);

        if terminal.print_ready().is_err() {
            panic!("Failed to write to UART");
        }
        info!("Initialization complete: {}", CONFIG);

        let delay = Delay::new(cx.core.SYST, &clocks);
        let monitor = Monitor::new(thermometer, leds, terminal, CONFIG);

        (Shared {}, Local { monitor, delay })
    }

    #[idle(local = [monitor, delay])]
    fn idle(cx: idle::Context) -> ! {
        cx.local.monitor.run(cx.local.delay)
    }
}
