//! Board bring-up.
//!
//! Signals are driven in three phases:
//!
//!   1. power   - enable rails, wait for every power-good input
//!   2. reset   - pulse each device reset for at least `reset_hold`
//!   3. interrupt - wait for interrupt inputs to idle, then arm them
//!
//! Interrupt lines are armed only after every reset has been released so
//! that reset transitions cannot raise spurious edges.

use core::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::timer::CountDown;
use embedded_timeout_macros::{block_timeout, TimeoutError};
use log::{debug, error, info, warn};

use crate::bus::SignalBus;
use crate::config::millis;
use crate::error::{Error, FaultReason, Phase, Result};
use crate::fault::Halt;
use crate::signal::Role;
use crate::state::SupervisorState;
use crate::supervisor::{drive, hardware_fault, Ready, Supervisor};

type PhaseResult<T> = core::result::Result<T, FaultReason>;


// - initialize ---------------------------------------------------------------

impl<B, T, D, H> Supervisor<B, T, D, H>
where
    B: SignalBus,
    T: CountDown<Time = Duration>,
    D: DelayMs<u32>,
    H: Halt,
{
    /// Brings every registered signal to its operating state.
    ///
    /// Only valid from `Uninitialized`. On failure the fault is latched
    /// (state `Faulted`, safe outputs driven) and its reason returned; the
    /// caller is expected to pass it on to
    /// [`enter_fault_state`](Supervisor::enter_fault_state).
    pub fn initialize(&mut self) -> Result<Ready> {
        self.state.transition(SupervisorState::Initializing)?;
        info!("initializing board signals...");

        match self.bring_up() {
            Ok(ready) => {
                self.state.transition(SupervisorState::Ready)?;
                info!("... READY ({} resets released, {} interrupts armed)",
                      ready.released, ready.armed);
                Ok(ready)
            }
            Err(reason) => {
                error!("bring-up failed: {}", reason);
                self.record_fault(reason);
                Err(Error::Fault(reason))
            }
        }
    }

    fn bring_up(&mut self) -> PhaseResult<Ready> {
        self.drive_defaults()?;
        debug!("... outputs at defaults");

        self.power_up()?;
        info!("... power INIT");

        let released = self.release_resets()?;
        info!("... reset INIT");

        let armed = self.arm_interrupts()?;
        info!("... interrupt INIT");

        Ok(Ready { released, armed })
    }

    /// Rails off, devices held in reset, indicator dark.
    fn drive_defaults(&mut self) -> PhaseResult<()> {
        for signal in self.registry.iter().filter(|s| s.is_output()) {
            drive(&mut self.bus, signal, signal.role == Role::Reset)?;
        }
        Ok(())
    }


    // - phase 1: power -------------------------------------------------------

    fn power_up(&mut self) -> PhaseResult<()> {
        let attempts = u16::from(self.config.power_retries) + 1;

        for attempt in 1..=attempts {
            if attempt > 1 {
                warn!("power good timed out, retrying ({}/{})", attempt, attempts);
                self.drive_role(Role::PowerEnable, false)?;
                self.delay.delay_ms(millis(self.config.power_off_time));
            }

            self.drive_role(Role::PowerEnable, true)?;
            if self.wait_for(Role::PowerGood, true, self.config.power_good_timeout)? {
                return Ok(());
            }
        }

        Err(FaultReason::Timeout(Phase::Power))
    }


    // - phase 2: reset -------------------------------------------------------

    fn release_resets(&mut self) -> PhaseResult<u8> {
        let hold = millis(self.config.reset_hold);
        let mut released = 0;

        for signal in self.registry.with_role(Role::Reset) {
            drive(&mut self.bus, signal, true)?;
            self.delay.delay_ms(hold);
            drive(&mut self.bus, signal, false)?;
            debug!("... {} released", signal.name);
            released += 1;
        }

        if released > 0 {
            self.delay.delay_ms(millis(self.config.reset_settle));
        }

        Ok(released)
    }


    // - phase 3: interrupt ---------------------------------------------------

    fn arm_interrupts(&mut self) -> PhaseResult<u8> {
        if !self.wait_for(Role::Interrupt, false, self.config.interrupt_idle_timeout)? {
            return Err(FaultReason::Timeout(Phase::Interrupt));
        }

        let mut armed = 0;
        for signal in self.registry.with_role(Role::Interrupt) {
            if let Some(irq) = signal.interrupt {
                self.bus.arm(signal, irq).map_err(|e| hardware_fault(signal, e))?;
                debug!("... {} armed on {:?}", signal.name, irq);
                armed += 1;
            }
        }

        Ok(armed)
    }


    // - helpers --------------------------------------------------------------

    fn drive_role(&mut self, role: Role, asserted: bool) -> PhaseResult<()> {
        for signal in self.registry.with_role(role) {
            drive(&mut self.bus, signal, asserted)?;
        }
        Ok(())
    }

    /// Waits until every signal with `role` reads `asserted`. Returns
    /// `false` when `timeout` expires first.
    fn wait_for(&mut self, role: Role, asserted: bool, timeout: Duration) -> PhaseResult<bool> {
        if self.registry.with_role(role).next().is_none() {
            return Ok(true);
        }

        debug!("waiting up to {:?} for {:?} lines", timeout, role);

        let registry = &self.registry;
        let bus = &mut self.bus;
        let timer = &mut self.timer;
        timer.start(timeout);

        let result: core::result::Result<(), TimeoutError<FaultReason>> = block_timeout!(
            &mut *timer,
            {
                let mut settled = Ok(true);
                for signal in registry.with_role(role) {
                    match bus.is_asserted(signal) {
                        Ok(level) if level == asserted => {}
                        Ok(_) => {
                            settled = Ok(false);
                            break;
                        }
                        Err(e) => {
                            settled = Err(hardware_fault(signal, e));
                            break;
                        }
                    }
                }
                match settled {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(nb::Error::WouldBlock),
                    Err(reason) => Err(nb::Error::Other(reason)),
                }
            }
        );

        match result {
            Ok(()) => Ok(true),
            Err(TimeoutError::Timeout) => Ok(false),
            Err(TimeoutError::Other(reason)) => Err(reason),
        }
    }
}


// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pins;
    use crate::registry::PinRegistry;
    use crate::signal::{ActiveLevel, ExtiIrq, Level, Port, SignalDescriptor};
    use crate::testing::{Delay, Event, MockBus, PanicHalt, Timer};

    type Mock = Supervisor<MockBus, Timer, Delay, PanicHalt>;

    fn supervisor(registry: PinRegistry, bus: MockBus, config: Config) -> Mock {
        Supervisor::new(registry, config, bus, Timer::expiring_after(8), Delay::default(), PanicHalt)
    }

    fn board(bus: impl FnOnce(MockBus) -> MockBus) -> Mock {
        let registry = PinRegistry::board().unwrap();
        let bus = bus(MockBus::new(&registry));
        supervisor(registry, bus, Config::DEFAULT)
    }

    #[test]
    fn all_phases_succeed() {
        let mut supervisor = board(|bus| bus.link(pins::PSU_ON, pins::PSU_OK));

        let ready = supervisor.initialize().unwrap();

        assert_eq!(supervisor.state(), SupervisorState::Ready);
        assert_eq!(supervisor.fault(), None);
        assert_eq!(ready.released(), 3);
        assert_eq!(ready.armed(), 2);

        let bus = supervisor.bus();
        assert!(bus.asserted(pins::PSU_ON));
        for reset in [pins::ETH1_RST, pins::ETH2_RST, pins::OLED_RST].iter() {
            assert!(!bus.asserted(reset), "{} still in reset", reset);
        }
        assert_eq!(bus.armed, [pins::ETH1_INT, pins::ETH2_INT]);
        assert!(!bus.asserted(pins::DBG_LED));
        assert!(!bus.asserted(pins::SYS_POWER));
    }

    #[test]
    fn phases_run_in_order() {
        let mut supervisor = board(|bus| bus.link(pins::PSU_ON, pins::PSU_OK));
        supervisor.initialize().unwrap();
        let bus = supervisor.bus();

        let power = bus.position(Event::Write(pins::PSU_ON, Level::High)).unwrap();
        let first_release = bus.position(Event::Write(pins::ETH2_RST, Level::High)).unwrap();
        let last_release = bus.position(Event::Write(pins::OLED_RST, Level::High)).unwrap();
        let first_arm = bus.position(Event::Arm(pins::ETH1_INT, ExtiIrq::Exti1)).unwrap();

        assert!(power < first_release);
        assert!(last_release < first_arm);
    }

    #[test]
    fn resets_are_held_before_release() {
        let mut supervisor = board(|bus| bus.link(pins::PSU_ON, pins::PSU_OK));
        supervisor.initialize().unwrap();

        // asserted at defaults, asserted again for the pulse, then released
        assert_eq!(supervisor.bus().writes(pins::ETH1_RST), [Level::Low, Level::Low, Level::High]);
        // three 10ms holds then one settle
        assert_eq!(supervisor.delay.calls, [10, 10, 10, 50]);
    }

    #[test]
    fn power_good_may_lag() {
        let mut supervisor = board(|bus| bus.assert_after_reads(pins::PSU_OK, 3));
        supervisor.initialize().unwrap();
        assert_eq!(supervisor.state(), SupervisorState::Ready);
        assert_eq!(supervisor.timer.starts[0], Config::DEFAULT.power_good_timeout);
    }

    #[test]
    fn power_good_timeout_faults_without_arming() {
        let table = [
            SignalDescriptor::output("PSU_ON", Port::D, 2, ActiveLevel::High, Role::PowerEnable),
            SignalDescriptor::input("PSU_OK", Port::C, 1, ActiveLevel::High, Role::PowerGood),
            SignalDescriptor::input("ETH1_INT", Port::B, 1, ActiveLevel::Low, Role::Interrupt)
                .with_interrupt(ExtiIrq::Exti1),
        ];
        let registry = PinRegistry::new(&table).unwrap();
        let bus = MockBus::new(&registry);
        let mut supervisor = supervisor(registry, bus, Config::DEFAULT);

        assert_eq!(
            supervisor.initialize(),
            Err(Error::Fault(FaultReason::Timeout(Phase::Power)))
        );
        assert_eq!(supervisor.state(), SupervisorState::Faulted);
        assert_eq!(supervisor.fault(), Some(FaultReason::Timeout(Phase::Power)));
        assert_eq!(supervisor.bus().level("PSU_ON"), Level::Low);
        assert!(supervisor.bus().armed.is_empty());
        assert!(supervisor.bus().events.iter().all(|e| !matches!(e, Event::Arm(..))));
        assert_eq!(FaultReason::Timeout(Phase::Power).to_string(), "timed out in power phase");
    }

    #[test]
    fn power_retries_are_bounded() {
        let registry = PinRegistry::board().unwrap();
        let bus = MockBus::new(&registry);
        let mut supervisor = supervisor(registry, bus, Config::DEFAULT.with_power_retries(2));

        assert!(supervisor.initialize().is_err());
        assert_eq!(supervisor.timer.starts.len(), 3);
        // on, off, on, off, on for the attempts, then off in the fault state
        let psu_on = supervisor.bus().writes(pins::PSU_ON);
        assert_eq!(&psu_on[1..], [Level::High, Level::Low, Level::High, Level::Low, Level::High, Level::Low]);
        assert_eq!(supervisor.delay.calls, [100, 100]);
    }

    #[test]
    fn retry_recovers_late_rail() {
        let registry = PinRegistry::board().unwrap();
        // the timer allows 8 polls per attempt
        let bus = MockBus::new(&registry).assert_after_reads(pins::PSU_OK, 12);
        let mut supervisor = supervisor(registry, bus, Config::DEFAULT.with_power_retries(1));

        supervisor.initialize().unwrap();
        assert_eq!(supervisor.timer.starts.len(), 3); // two power attempts, one idle wait
    }

    #[test]
    fn busy_interrupt_line_times_out() {
        let mut supervisor = board(|bus| bus.link(pins::PSU_ON, pins::PSU_OK));
        supervisor.bus.set_asserted(pins::ETH2_INT, true);

        assert_eq!(
            supervisor.initialize(),
            Err(Error::Fault(FaultReason::Timeout(Phase::Interrupt)))
        );
        assert_eq!(supervisor.state(), SupervisorState::Faulted);
        assert!(supervisor.bus().armed.is_empty());
        assert!(!supervisor.bus().asserted(pins::PSU_ON));
    }

    #[test]
    fn bus_error_is_a_hardware_fault() {
        let mut supervisor = board(|bus| bus.link(pins::PSU_ON, pins::PSU_OK).break_signal(pins::OLED_RST));

        assert_eq!(
            supervisor.initialize(),
            Err(Error::Fault(FaultReason::HardwareFault(pins::OLED_RST)))
        );
        assert_eq!(supervisor.state(), SupervisorState::Faulted);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut supervisor = board(|bus| bus.link(pins::PSU_ON, pins::PSU_OK));
        supervisor.initialize().unwrap();
        let events = supervisor.bus().events.len();

        assert_eq!(supervisor.initialize(), Err(Error::InvalidState(SupervisorState::Ready)));
        assert_eq!(supervisor.state(), SupervisorState::Ready);
        assert_eq!(supervisor.bus().events.len(), events);
    }

    #[test]
    fn initialize_while_initializing_is_rejected() {
        let mut supervisor = board(|bus| bus);
        supervisor.state = SupervisorState::Initializing;
        assert_eq!(supervisor.initialize(), Err(Error::InvalidState(SupervisorState::Initializing)));
        assert!(supervisor.bus().events.is_empty());
    }

    #[test]
    fn initialize_after_fault_is_rejected() {
        let mut supervisor = board(|bus| bus);
        assert!(supervisor.initialize().is_err());
        assert_eq!(supervisor.initialize(), Err(Error::InvalidState(SupervisorState::Faulted)));
    }

    #[test]
    fn board_without_power_good_skips_wait() {
        let table = [
            SignalDescriptor::output("RST", Port::A, 3, ActiveLevel::Low, Role::Reset),
        ];
        let registry = PinRegistry::new(&table).unwrap();
        let bus = MockBus::new(&registry);
        let mut supervisor = supervisor(registry, bus, Config::DEFAULT);

        let ready = supervisor.initialize().unwrap();
        assert_eq!((ready.released(), ready.armed()), (1, 0));
        assert!(supervisor.timer.starts.is_empty());
    }
}
