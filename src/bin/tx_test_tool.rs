#![no_std]
#![no_main]

//! # LR2021 TX test tool
//!
//! Serial console (USART2 on the Nucleo virtual COM port, 115200 bauds) to
//! configure the LoRa transmitter and start/stop a continuous transmission
//! of a fixed test payload:
//!  - `set_tx_freq <Hz>` to change the RF channel
//!  - `tx` to start or stop the transmission
//!  - `reset` to reset the radio
//!  - `help [command]` to list the commands
//!
//! The red led is on while a packet is on air.

use defmt::*;
use {defmt_rtt as _, panic_probe as _};

use embassy_executor::Spawner;
use embassy_futures::yield_now;
use heapless::String;

use lr2021_tx_tool::{
    board::{console_rx, BoardNucleoL476Rg, Lr2021Radio, CONSOLE_RX},
    config::{TxConfig, CONSOLE_OUT_SIZE},
    tool::TxTool,
};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting tx_test_tool");

    let board = BoardNucleoL476Rg::init(&spawner).await;
    let (mut uart_tx, uart_rx) = board.uart.split();
    spawner.spawn(console_rx(uart_rx, &CONSOLE_RX)).unwrap();

    let config = TxConfig::default();
    let mut radio = Lr2021Radio::new(board.lr2021, board.irq);
    radio.configure(&config).await.expect("Configuring radio");

    let mut tool = TxTool::with_config(radio, config).expect("Registering commands");

    // Console output of one iteration, flushed before the next one
    let mut out: String<CONSOLE_OUT_SIZE> = String::new();
    tool.print_banner(&mut out, board.fw_version);
    info!("Ready");

    loop {
        let input = core::iter::from_fn(|| CONSOLE_RX.try_receive().ok());
        tool.tick(input, &mut out).await;
        if !out.is_empty() {
            uart_tx.write(out.as_bytes()).await.ok();
            out.clear();
        }
        yield_now().await;
    }
}
