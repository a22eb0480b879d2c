//! The stm32f4xx-hal counters implement the CountDown trait with fugit
//! durations. The supervisor's bounded waits are expressed as
//! `core::time::Duration`, this adapter bridges the two.
//!
//! Resolution is one millisecond. The 16 bit timers cap a single wait at
//! 65.5s, use TIM2 or TIM5 for longer ones. A period the counter refuses
//! reads as already expired.


/// Maps a counter poll onto the supervisor's view of a wait. A counter that
/// never started, or that reports an error, reads as expired so that every
/// wait stays bounded.
#[cfg_attr(not(feature = "board"), allow(dead_code))]
pub(crate) fn poll<E, F>(started: bool, wait: F) -> nb::Result<(), void::Void>
where
    F: FnOnce() -> nb::Result<(), E>,
{
    if !started {
        return Ok(());
    }

    match wait() {
        Ok(()) => Ok(()),
        Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
        Err(nb::Error::Other(_)) => Ok(()),
    }
}


// - CountDownTimer -----------------------------------------------------------

#[cfg(feature = "board")]
pub use self::hal_timer::CountDownTimer;

#[cfg(feature = "board")]
mod hal_timer {
    use stm32f4xx_hal as hal;
    use hal::pac::{TIM2, TIM3, TIM4, TIM5};
    use hal::prelude::*;
    use hal::timer::CounterMs;

    use crate::config::millis;

    pub struct CountDownTimer<TIMX> {
        counter: CounterMs<TIMX>,
        started: bool,
    }

    impl<TIMX> CountDownTimer<TIMX> {
        pub fn new(counter: CounterMs<TIMX>) -> Self {
            Self {
                counter,
                started: false,
            }
        }

        pub fn free(self) -> CounterMs<TIMX> {
            self.counter
        }
    }

    macro_rules! impl_countdown {
        ($($TIMX:ident,)+) => {
            $(
                impl embedded_hal::timer::CountDown for CountDownTimer<$TIMX> {
                    type Time = core::time::Duration;

                    fn start<T>(&mut self, timeout: T)
                    where
                        T: Into<core::time::Duration>,
                    {
                        // a zero period never fires
                        let ms = millis(timeout.into()).max(1);
                        self.started = match self.counter.start(ms.millis()) {
                            Ok(()) => true,
                            Err(e) => {
                                log::error!("{}: start({}ms) failed: {:?}", stringify!($TIMX), ms, e);
                                false
                            }
                        };
                    }

                    fn wait(&mut self) -> nb::Result<(), void::Void> {
                        let counter = &mut self.counter;
                        super::poll(self.started, || counter.wait())
                    }
                }
            )+
        }
    }

    impl_countdown! {
        // 32 bit
        TIM2,
        TIM5,

        // 16 bit
        TIM3,
        TIM4,
    }
}


// - tests --------------------------------------------------------------------
