//! Buffering between the sampling interrupt and the main loop.
//!
//! [`SampleQueue`] is the only state shared across the two contexts. The
//! interrupt enqueues encoded bytes; the main loop dequeues them for
//! compression and transmission. Saturation never blocks the producer: the
//! byte is dropped and a sticky overflow flag is raised for the main loop to
//! report.

mod ring;

pub use ring::SampleQueue;
