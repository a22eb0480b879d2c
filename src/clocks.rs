use crate::hal;
use hal::prelude::*;
use hal::rcc;


// - constants ----------------------------------------------------------------

// 26 MHz crystal on X1
const HSE_MHZ: u32 = 26;
const SYSCLK_MHZ: u32 = 168;


// - configure ----------------------------------------------------------------

/// Configures system clocks:
///
///   HSE crystal
///   168 MHz system clock
///   48 MHz PLL48CLK for the RNG
///
/// Usage:
///
/// ```ignore
/// let dp = pac::Peripherals::take().unwrap();
/// let clocks = configure(dp.RCC.constrain());
/// ```
pub fn configure(rcc: rcc::Rcc) -> rcc::Clocks {
    rcc.cfgr
       .use_hse(HSE_MHZ.MHz())
       .sysclk(SYSCLK_MHZ.MHz())  // system clock @ 168 MHz
       .require_pll48clk()
       .freeze()
}
