//! TX test tool: command handlers and event loop
//!
//! [`TxTool`] owns everything the tool mutates (radio, configuration, TX
//! session, command registry, line editor). The application calls
//! [`TxTool::tick`] forever: each iteration first services the radio
//! interrupts then consumes the console bytes received since the previous one.

use core::fmt::Write;

use heapless::String;

use crate::cli::{CliError, CommandBinding, CommandKind, Registry, RegistryError};
use crate::config::{TxConfig, IRQ_MASK, LINE_SIZE, PROMPT};
use crate::line::{LineEditor, LineEvent};
use crate::radio::{IrqSet, Radio};
use crate::tx::TxSession;

/// Commands available at startup, in listing order
pub const DEFAULT_BINDINGS: [CommandBinding; 4] = [
    CommandBinding {
        name: "set_tx_freq",
        help: "Set Transmit Frequency in Hz",
        usage: "set_tx_freq requires 1 argument (frequency in Hz)",
        requires_args: true,
        kind: CommandKind::SetTxFreq,
    },
    CommandBinding {
        name: "tx",
        help: "Start/Stop transmit",
        usage: "tx takes no argument",
        requires_args: false,
        kind: CommandKind::Tx,
    },
    CommandBinding {
        name: "reset",
        help: "Reset radio",
        usage: "reset takes no argument",
        requires_args: false,
        kind: CommandKind::Reset,
    },
    CommandBinding {
        name: "help",
        help: "List commands or show one",
        usage: "help takes at most 1 argument (command name)",
        requires_args: false,
        kind: CommandKind::Help,
    },
];

pub struct TxTool<R: Radio> {
    radio: R,
    config: TxConfig,
    session: TxSession,
    registry: Registry,
    line: LineEditor,
}

impl<R: Radio> TxTool<R> {

    /// Create the tool with the default configuration and commands.
    /// The radio is expected to be already configured with `TxConfig::default()`.
    pub fn new(radio: R) -> Result<Self, RegistryError> {
        Self::with_config(radio, TxConfig::default())
    }

    pub fn with_config(radio: R, config: TxConfig) -> Result<Self, RegistryError> {
        let mut registry = Registry::new();
        for binding in DEFAULT_BINDINGS {
            registry.register(binding)?;
        }
        Ok(Self {
            radio,
            config,
            session: TxSession::new(),
            registry,
            line: LineEditor::new(),
        })
    }

    pub fn config(&self) -> &TxConfig {
        &self.config
    }

    pub fn session(&self) -> &TxSession {
        &self.session
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Startup screen: clear terminal, versions, configuration and first prompt
    pub fn print_banner(&self, out: &mut dyn Write, fw_version: (u8, u8)) {
        let _ = write!(out, "\x1b[2J\x1b[H");
        let _ = writeln!(out, "===== LR2021 TX Test Tool =====\r");
        let _ = writeln!(out, "Tool version: {}\r", env!("CARGO_PKG_VERSION"));
        let _ = writeln!(out, "LR2021 firmware: {:02x}.{:02x}\r", fw_version.0, fw_version.1);
        let _ = self.config.print(out);
        let _ = writeln!(out, "Ready!\r");
        self.print_prompt(out);
    }

    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "{PROMPT}");
    }

    /// One event loop iteration: interrupts first, then console input.
    /// Never waits on the radio or on the console.
    pub async fn tick<I>(&mut self, input: I, out: &mut dyn Write)
        where I: IntoIterator<Item = u8>
    {
        self.service_interrupts(out).await;
        for byte in input {
            self.process_byte(byte, out).await;
        }
    }

    /// Poll the radio and handle a transmission completion
    pub async fn service_interrupts(&mut self, out: &mut dyn Write) {
        let irqs = self.radio.poll_and_clear_interrupts(IRQ_MASK).await;
        if irqs.is_empty() {
            return;
        }
        if irqs.tx_done() {
            self.session.on_tx_done(&mut self.radio, out).await;
        }
        let others = IrqSet::from_bits(irqs.bits() & !IrqSet::TX_DONE.bits());
        if !others.is_empty() {
            debug!("Ignored IRQs {:08x}", others.bits());
        }
    }

    /// Feed one console byte to the line editor, executing the line when complete
    pub async fn process_byte(&mut self, byte: u8, out: &mut dyn Write) {
        match self.line.feed(byte, out) {
            LineEvent::Pending => {}
            LineEvent::Cancelled => self.print_prompt(out),
            LineEvent::Complete => {
                let mut line: String<LINE_SIZE> = String::new();
                // Content never exceeds the line capacity
                let _ = line.push_str(self.line.as_str());
                self.line.clear();
                self.execute(&line, out).await;
                self.print_prompt(out);
            }
        }
    }

    /// Parse and run a full command line
    pub async fn execute(&mut self, line: &str, out: &mut dyn Write) {
        let invocation = match self.registry.dispatch(line) {
            Ok(Some(invocation)) => invocation,
            Ok(None) => return,
            Err(e) => {
                let _ = writeln!(out, "{e}\r");
                return;
            }
        };
        debug!("Command {}", invocation.kind());
        match invocation.kind() {
            CommandKind::SetTxFreq => {
                let usage = invocation.binding.usage;
                let freq_hz = invocation.single_arg()
                    .and_then(|arg| arg.parse::<u32>().map_err(|_| CliError::InvalidArgument { usage }));
                match freq_hz {
                    Ok(freq_hz) => set_tx_freq(&mut self.radio, &mut self.config, freq_hz, out).await,
                    Err(e) => { let _ = writeln!(out, "{e}\r"); }
                }
            }
            CommandKind::Tx => self.session.toggle(&mut self.radio, out).await,
            CommandKind::Reset => reset(&mut self.radio, &self.session, out).await,
            CommandKind::Help => print_help(&self.registry, invocation.arg(0), out),
        }
    }
}

/// Apply a new frequency, the stored configuration is only updated on success
async fn set_tx_freq<R: Radio>(radio: &mut R, config: &mut TxConfig, freq_hz: u32, out: &mut dyn Write) {
    match radio.apply_frequency(freq_hz).await {
        Ok(()) => {
            info!("TX frequency set to {} Hz", freq_hz);
            config.freq_hz = freq_hz;
            let _ = config.print(out);
        }
        Err(e) => {
            error!("Set RF {}: {}", freq_hz, e);
            let _ = writeln!(out, "Failed to set TX frequency!\r");
        }
    }
}

/// Hardware reset, independent from the TX session
async fn reset<R: Radio>(radio: &mut R, session: &TxSession, out: &mut dyn Write) {
    if session.is_transmitting() {
        warn!("Reset requested while transmitting ({} packets sent)", session.message_count());
    }
    let _ = writeln!(out, "Resetting LR2021...\r");
    radio.reset_device().await;
    let _ = writeln!(out, "Done!\r");
}

fn print_help(registry: &Registry, name: Option<&str>, out: &mut dyn Write) {
    match name {
        None => {
            for binding in registry.iter() {
                let _ = writeln!(out, " * {}\r", binding.name);
                let _ = writeln!(out, "\t{}\r", binding.help);
            }
        }
        Some(name) => match registry.get(name) {
            Some(binding) => {
                let _ = writeln!(out, " * {}\r", binding.name);
                let _ = writeln!(out, "\t{}\r", binding.help);
                let _ = writeln!(out, "\t{}\r", binding.usage);
            }
            None => { let _ = writeln!(out, "{}\r", CliError::UnknownCommand); }
        },
    }
}
