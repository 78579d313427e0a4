//! [`ProbePort`] adapters for board code.
//!
//! The fastest capture reads a whole GPIO input register in one access, with
//! the probed lines wired contiguously. [`UpperByte`] covers banks wired to
//! pins 8–15. [`ProbePins`] builds the byte from individual
//! [`embedded_hal::digital::InputPin`]s for boards where the lines are not
//! contiguous; it costs one pin read per line.

use crate::control::ProbePort;

/// Reads lines 0–7 from the high byte of a 16-bit input register.
pub struct UpperByte<F>(pub F);

impl<F: FnMut() -> u16> ProbePort for UpperByte<F> {
    #[inline]
    fn read_lines(&mut self) -> u8 {
        ((self.0)() >> 8) as u8
    }
}

#[cfg(feature = "hal")]
pub use self::hal::ProbePins;

#[cfg(feature = "hal")]
mod hal {
    use embedded_hal::digital::InputPin;

    use crate::control::ProbePort;

    /// Up to eight input pins sampled as one byte, pin *i* in bit *i*.
    ///
    /// Unused high bits read as zero. A pin whose read fails reads as low.
    pub struct ProbePins<P, const W: usize = 8> {
        pins: [P; W],
    }

    impl<P: InputPin, const W: usize> ProbePins<P, W> {
        /// # Panics
        ///
        /// Panics if more than eight pins are given.
        pub fn new(pins: [P; W]) -> Self {
            assert!(W <= 8, "a probe port carries at most 8 lines");
            ProbePins { pins }
        }

        /// Give the pins back to the board code.
        pub fn release(self) -> [P; W] {
            self.pins
        }
    }

    impl<P: InputPin, const W: usize> ProbePort for ProbePins<P, W> {
        fn read_lines(&mut self) -> u8 {
            let mut lines = 0u8;
            for (i, pin) in self.pins.iter_mut().enumerate() {
                if pin.is_high().unwrap_or(false) {
                    lines |= 1 << i;
                }
            }
            lines
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use embedded_hal::digital::{self, ErrorType};

        #[derive(Debug)]
        struct MockError;

        impl digital::Error for MockError {
            fn kind(&self) -> digital::ErrorKind {
                digital::ErrorKind::Other
            }
        }

        /// Mock pin with a fixed level, or a failing read.
        enum MockPin {
            Level(bool),
            Broken,
        }

        impl ErrorType for MockPin {
            type Error = MockError;
        }

        impl InputPin for MockPin {
            fn is_high(&mut self) -> Result<bool, MockError> {
                match self {
                    MockPin::Level(level) => Ok(*level),
                    MockPin::Broken => Err(MockError),
                }
            }

            fn is_low(&mut self) -> Result<bool, MockError> {
                self.is_high().map(|high| !high)
            }
        }

        use MockPin::{Broken, Level};

        #[test]
        fn eight_pins_form_one_byte() {
            let mut port = ProbePins::new([
                Level(true),
                Level(false),
                Level(true),
                Level(false),
                Level(false),
                Level(false),
                Level(false),
                Level(true),
            ]);
            assert_eq!(port.read_lines(), 0b1000_0101);
        }

        #[test]
        fn fewer_pins_leave_high_bits_clear() {
            let mut port = ProbePins::new([Level(true), Level(true), Level(true)]);
            assert_eq!(port.read_lines(), 0b0000_0111);
        }

        #[test]
        fn failed_read_is_low() {
            let mut port = ProbePins::new([Level(true), Broken, Level(true)]);
            assert_eq!(port.read_lines(), 0b101);
        }

        #[test]
        fn release_returns_pins() {
            let port = ProbePins::new([Level(true), Broken]);
            let pins = port.release();
            assert!(matches!(pins[1], Broken));
        }
    }
}
