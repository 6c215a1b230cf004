//! VocoderGal CLI library.
//!
//! Command implementations and WAV I/O for the `vocodergal` binary.

pub mod commands;
pub mod wav;
