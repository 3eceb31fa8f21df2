//! TX configuration and compile-time defaults
//!
//! All the values the tool starts with are centralized here: RF settings
//! applied at boot, the test payload and the sizes of the console buffers.

use core::fmt::{self, Write};

use crate::radio::IrqSet;

/// Default RF channel (Hz)
pub const DEFAULT_FREQ_HZ: u32 = 901_000_000;
/// Default output power (dBm)
pub const DEFAULT_POWER_DBM: i8 = 14;
/// Default LoRa bandwidth
pub const DEFAULT_BW: Bandwidth = Bandwidth::Bw125;
/// Default spreading factor
pub const DEFAULT_SF: SpreadingFactor = SpreadingFactor::Sf7;
/// Default coding rate
pub const DEFAULT_CR: CodingRate = CodingRate::Cr4_5;
/// Preamble length in symbols
pub const PREAMBLE_LEN: u16 = 8;

/// Payload sent on every transmission
pub const TX_PAYLOAD: &[u8] = b"TESTMSG";
/// TX timeout handed to the radio: 0 disables it
pub const TX_TIMEOUT: u32 = 0;

/// Interrupts routed to the IRQ line
pub const IRQ_MASK: IrqSet = IrqSet::TX_DONE
    .union(IrqSet::RX_DONE)
    .union(IrqSet::TIMEOUT)
    .union(IrqSet::HEADER_ERROR)
    .union(IrqSet::CRC_ERROR)
    .union(IrqSet::LEN_ERROR);

/// Maximum number of console commands
pub const MAX_BINDINGS: usize = 16;
/// Maximum number of tokens after the command name
pub const MAX_ARGS: usize = 8;
/// Console line capacity (bytes)
pub const LINE_SIZE: usize = 64;
/// Console output produced by a single loop iteration (bytes)
pub const CONSOLE_OUT_SIZE: usize = 1024;
/// Console prompt
pub const PROMPT: &str = "> ";

/// LoRa bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    Bw7,
    Bw10,
    Bw15,
    Bw20,
    Bw31,
    Bw41,
    Bw62,
    Bw125,
    Bw250,
    Bw500,
}

impl Bandwidth {
    /// Bandwidth in Hz, as reported on the console
    pub const fn hz(&self) -> u32 {
        match self {
            Bandwidth::Bw7   =>   7_000,
            Bandwidth::Bw10  =>  10_000,
            Bandwidth::Bw15  =>  15_000,
            Bandwidth::Bw20  =>  20_000,
            Bandwidth::Bw31  =>  31_000,
            Bandwidth::Bw41  =>  41_000,
            Bandwidth::Bw62  =>  62_000,
            Bandwidth::Bw125 => 125_000,
            Bandwidth::Bw250 => 250_000,
            Bandwidth::Bw500 => 500_000,
        }
    }
}

/// LoRa spreading factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpreadingFactor {
    Sf5 = 5,
    Sf6 = 6,
    Sf7 = 7,
    Sf8 = 8,
    Sf9 = 9,
    Sf10 = 10,
    Sf11 = 11,
    Sf12 = 12,
}

/// LoRa coding rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodingRate {
    Cr4_5 = 1,
    Cr4_6 = 2,
    Cr4_7 = 3,
    Cr4_8 = 4,
}

impl CodingRate {
    /// Denominator of the 4/x ratio
    pub const fn denominator(&self) -> u8 {
        4 + *self as u8
    }
}

/// Last configuration successfully applied to the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxConfig {
    pub freq_hz: u32,
    pub bw: Bandwidth,
    pub power_dbm: i8,
    pub sf: SpreadingFactor,
    pub cr: CodingRate,
}

impl TxConfig {
    pub const fn new() -> Self {
        Self {
            freq_hz: DEFAULT_FREQ_HZ,
            bw: DEFAULT_BW,
            power_dbm: DEFAULT_POWER_DBM,
            sf: DEFAULT_SF,
            cr: DEFAULT_CR,
        }
    }

    /// Print the configuration block on the console
    pub fn print(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "Current TX config\r")?;
        writeln!(out, "    Frequency: {} Hz\r", self.freq_hz)?;
        writeln!(out, "    Bandwidth: {} Hz\r", self.bw.hz())?;
        writeln!(out, "        Power: {} dBm\r", self.power_dbm)?;
        writeln!(out, "           SF: {}\r", self.sf as u8)?;
        writeln!(out, "       Coding: 4/{}\r", self.cr.denominator())
    }
}

impl Default for TxConfig {
    fn default() -> Self {
        Self::new()
    }
}
