//! Mathematical primitives for the SCPN PIC core.

pub mod fft;
pub mod form_factor;
