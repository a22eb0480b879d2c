#![no_main]
#![no_std]

use cortex_m_rt::entry;
use panic_halt as _;

use oro_link as oro;
use oro::hal;
use oro::led::{self, DebugLed, Pattern};
use oro::pac;
use hal::prelude::*;


// - entry-point --------------------------------------------------------------

#[entry]
fn main() -> ! {
    // - board setup ----------------------------------------------------------

    let board = oro::board::Board::take().unwrap();

    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = pac::Peripherals::take().unwrap();

    let clocks = board.freeze_clocks(dp.RCC.constrain());

    let pins = board.split_gpios(
        dp.GPIOB.split(),
        dp.GPIOC.split(),
        dp.GPIOD.split(),
        dp.GPIOE.split(),
    );

    let mut debug_led = DebugLed::new(pins.dbg_led.into_push_pull_output());
    let mut delay = cp.SYST.delay(&clocks);

    // - main loop ------------------------------------------------------------

    loop {
        led::blink(&mut debug_led, &mut delay, Pattern::HEARTBEAT);
    }
}
