#![no_std]

use panic_probe as _;         // panic handler
use defmt_rtt as _;           // global logger
use oro_link as oro;           // bsp

use oro::board::{Board, BoardSupervisor};
use oro::hal::prelude::*;
use oro::hal::rcc::Clocks;
use oro::pac;
use oro::Config;


// - panic handler ------------------------------------------------------------

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}


// - board initialization -----------------------------------------------------

pub struct Bench {
    pub clocks: Clocks,
    pub supervisor: BoardSupervisor,
}

/// Brings the board up as far as a supervisor that has not run yet.
pub fn init(config: Config) -> Bench {
    defmt::debug!("initializing board");

    let board = defmt::unwrap!(Board::take());
    let cp = defmt::unwrap!(cortex_m::Peripherals::take());
    let dp = defmt::unwrap!(pac::Peripherals::take());

    let clocks = board.freeze_clocks(dp.RCC.constrain());
    let pins = board.split_gpios(
        dp.GPIOB.split(),
        dp.GPIOC.split(),
        dp.GPIOD.split(),
        dp.GPIOE.split(),
    );

    let supervisor = match board.supervisor(pins, dp.SYSCFG, dp.EXTI, dp.TIM2, cp.SYST, &clocks, config) {
        Ok(supervisor) => supervisor,
        Err(_) => defmt::panic!("board signal table rejected"),
    };

    Bench { clocks, supervisor }
}
