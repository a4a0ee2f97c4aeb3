//! Internal temperature monitor for the Tiva C TM4C123 LaunchPad.
//!
//! Every loop iteration samples the on-chip temperature sensor through an ADC sample sequencer,
//! converts the reading to Celsius and Fahrenheit, and reads one byte from the serial console to
//! either print a unit or toggle one of the three on-board LEDs.
//!
//! Everything here is written against `embedded-hal` traits and the [`Sequencer`] and
//! [`LedDriver`] traits, so it runs unchanged against the fakes on a host.
//!
//! [`Sequencer`]: thermometer::sequencer::Sequencer
//! [`LedDriver`]: led::LedDriver

#![cfg_attr(not(test), no_std)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod control;
pub mod error;
pub mod led;
pub mod terminal;
pub mod thermometer;
