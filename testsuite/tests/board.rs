#![no_std]
#![no_main]

use testsuite as _;           // memory layout + panic handler + global logger
use oro_link as oro;          // bsp


// - shared state -------------------------------------------------------------

struct State {
    bench: testsuite::Bench,
}

impl State {
    fn init() -> State {
        // PSU_OK is expected to follow PSU_ON on the bench
        let config = oro::Config::DEFAULT.with_power_retries(1);
        State {
            bench: testsuite::init(config),
        }
    }
}


// - tests --------------------------------------------------------------------

#[defmt_test::tests]
mod tests {
    use defmt::{assert, assert_eq};

    use super::oro::{pins, SignalBus, SupervisorState};

    #[init]
    fn init() -> super::State {
        super::State::init()
    }

    #[test]
    fn assert_board_clocks(state: &mut super::State) {
        let clocks = state.bench.clocks;

        assert_eq!(clocks.sysclk().raw(), 168_000_000, "SYSCLK");
        assert_eq!(clocks.hclk().raw(),   168_000_000, "AHB");
        assert_eq!(defmt::unwrap!(clocks.pll48clk()).raw(), 48_000_000, "PLL48CLK");
        assert!(clocks.is_pll48clk_valid());
    }

    #[test]
    fn assert_uninitialized(state: &mut super::State) {
        assert!(state.bench.supervisor.state() == SupervisorState::Uninitialized);
    }

    #[test]
    fn assert_bring_up(state: &mut super::State) {
        let supervisor = &mut state.bench.supervisor;
        let ready = defmt::unwrap!(supervisor.initialize().ok());

        assert!(supervisor.state() == SupervisorState::Ready);
        assert_eq!(ready.armed(), 2);
        assert!(supervisor.check_power().is_ok());
    }

    #[test]
    fn assert_interrupt_lines_routed() {
        let syscfg = unsafe { &*super::oro::pac::SYSCFG::ptr() };
        let exti = unsafe { &*super::oro::pac::EXTI::ptr() };

        // ETH1_INT on PB1, ETH2_INT on PB9; port B is code 1
        assert_eq!((syscfg.exticr1.read().bits() >> 4) & 0xf, 1, "EXTI1 port");
        assert_eq!((syscfg.exticr3.read().bits() >> 4) & 0xf, 1, "EXTI9 port");

        let lines = (1 << 1) | (1 << 9);
        assert_eq!(exti.imr.read().bits() & lines, lines, "unmasked");
        // active low, falling edge only
        assert_eq!(exti.ftsr.read().bits() & lines, lines, "falling");
        assert_eq!(exti.rtsr.read().bits() & lines, 0, "rising");
    }

    #[test]
    fn assert_resets_released(state: &mut super::State) {
        let supervisor = &mut state.bench.supervisor;
        let registry = supervisor.registry();
        let eth1_rst = defmt::unwrap!(registry.resolve(pins::ETH1_RST).ok());
        let eth1_rst = *eth1_rst;

        let asserted = defmt::unwrap!(supervisor.bus_mut().is_asserted(&eth1_rst).ok());
        assert!(!asserted);
    }
}
