//! Oro Link board wiring.
//!
//! Must match the CubeMX pin configuration of the board. A trailing `_` on a
//! net name in the schematic marks an active-low line.

use crate::signal::{ActiveLevel, ExtiIrq, Port, Role, SignalDescriptor};


// - signal names -------------------------------------------------------------

pub const ETH2_RST: &str = "ETH2_RST";
pub const PSU_OK: &str = "PSU_OK";
pub const PSU_ON: &str = "PSU_ON";
pub const ETH1_RST: &str = "ETH1_RST";
pub const ETH1_INT: &str = "ETH1_INT";
pub const DBG_LED: &str = "DBG_LED";
pub const SYS_POWER: &str = "SYS_POWER";
pub const SYS_RESET: &str = "SYS_RESET";
pub const OLED_DC: &str = "OLED_DC";
pub const OLED_RST: &str = "OLED_RST";
pub const ETH2_INT: &str = "ETH2_INT";


// - wiring table -------------------------------------------------------------

pub const SIGNALS: [SignalDescriptor; 11] = [
    SignalDescriptor::output(ETH2_RST, Port::C, 13, ActiveLevel::Low, Role::Reset),
    SignalDescriptor::input(PSU_OK, Port::C, 1, ActiveLevel::High, Role::PowerGood),
    SignalDescriptor::output(PSU_ON, Port::C, 2, ActiveLevel::High, Role::PowerEnable),
    SignalDescriptor::output(ETH1_RST, Port::B, 0, ActiveLevel::Low, Role::Reset),
    SignalDescriptor::input(ETH1_INT, Port::B, 1, ActiveLevel::Low, Role::Interrupt)
        .with_interrupt(ExtiIrq::Exti1),
    SignalDescriptor::output(DBG_LED, Port::E, 12, ActiveLevel::High, Role::Indicator),
    SignalDescriptor::output(SYS_POWER, Port::D, 8, ActiveLevel::High, Role::General),
    SignalDescriptor::output(SYS_RESET, Port::D, 9, ActiveLevel::High, Role::General),
    SignalDescriptor::output(OLED_DC, Port::C, 11, ActiveLevel::High, Role::General),
    SignalDescriptor::output(OLED_RST, Port::D, 0, ActiveLevel::Low, Role::Reset),
    SignalDescriptor::input(ETH2_INT, Port::B, 9, ActiveLevel::Low, Role::Interrupt)
        .with_interrupt(ExtiIrq::Exti9_5),
];


// - hal pin types ------------------------------------------------------------

#[cfg(feature = "board")]
pub use self::hal_pins::*;

#[cfg(feature = "board")]
mod hal_pins {
    use stm32f4xx_hal as hal;
    use hal::gpio::{gpiob, gpioc, gpiod, gpioe};

    pub type Eth2Rst = gpioc::PC13;
    pub type PsuOk = gpioc::PC1;
    pub type PsuOn = gpioc::PC2;
    pub type Eth1Rst = gpiob::PB0;
    pub type Eth1Int = gpiob::PB1;
    pub type DbgLed = gpioe::PE12;
    pub type SysPower = gpiod::PD8;
    pub type SysReset = gpiod::PD9;
    pub type OledDc = gpioc::PC11;
    pub type OledRst = gpiod::PD0;
    pub type Eth2Int = gpiob::PB9;

    /// Board signal pins in their reset state.
    pub struct Pins {
        pub eth2_rst: Eth2Rst,
        pub psu_ok: PsuOk,
        pub psu_on: PsuOn,
        pub eth1_rst: Eth1Rst,
        pub eth1_int: Eth1Int,
        pub dbg_led: DbgLed,
        pub sys_power: SysPower,
        pub sys_reset: SysReset,
        pub oled_dc: OledDc,
        pub oled_rst: OledRst,
        pub eth2_int: Eth2Int,
    }

    impl Pins {
        pub fn new(
            gpiob: gpiob::Parts,
            gpioc: gpioc::Parts,
            gpiod: gpiod::Parts,
            gpioe: gpioe::Parts,
        ) -> Self {
            Self {
                eth2_rst: gpioc.pc13,
                psu_ok: gpioc.pc1,
                psu_on: gpioc.pc2,
                eth1_rst: gpiob.pb0,
                eth1_int: gpiob.pb1,
                dbg_led: gpioe.pe12,
                sys_power: gpiod.pd8,
                sys_reset: gpiod.pd9,
                oled_dc: gpioc.pc11,
                oled_rst: gpiod.pd0,
                eth2_int: gpiob.pb9,
            }
        }
    }
}
