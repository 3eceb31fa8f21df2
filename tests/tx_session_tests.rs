//! TX state machine tests

mod common;

use common::{Call, MockRadio};
use embassy_futures::block_on;
use lr2021_tx_tool::tx::{TxError, TxSession, TxState};

fn arm_calls() -> Vec<Call> {
    vec![Call::WriteTxBuffer(b"TESTMSG".to_vec()), Call::PreTransmit, Call::StartTransmit(0)]
}

#[test]
fn test_start_arms_radio() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    assert_eq!(session.state(), TxState::Idle);

    assert_eq!(block_on(session.start(&mut radio)), Ok(()));
    assert_eq!(session.state(), TxState::Transmitting);
    assert_eq!(session.message_count(), 0);
    assert_eq!(radio.calls, arm_calls());
}

#[test]
fn test_buffer_write_failure_stays_idle() {
    let mut radio = MockRadio { fail_write: true, ..MockRadio::new() };
    let mut session = TxSession::new();

    assert_eq!(block_on(session.start(&mut radio)), Err(TxError::BufferWrite));
    assert_eq!(session.state(), TxState::Idle);
    assert_eq!(radio.started(), 0);
    assert_eq!(TxError::BufferWrite.to_string(), "Failed to write TX packet to buffer");
}

#[test]
fn test_failed_restart_keeps_pending_count() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    let mut out = String::new();

    // Two packets sent, stop requested while the third one is on air
    block_on(session.toggle(&mut radio, &mut out));
    block_on(session.on_tx_done(&mut radio, &mut out));
    block_on(session.on_tx_done(&mut radio, &mut out));
    block_on(session.toggle(&mut radio, &mut out));
    assert_eq!(session.message_count(), 2);

    radio.fail_start = true;
    out.clear();
    block_on(session.toggle(&mut radio, &mut out));
    assert!(out.contains("Failed to start TX"));
    assert_eq!(session.state(), TxState::Idle);
    assert_eq!(session.message_count(), 2);

    out.clear();
    block_on(session.on_tx_done(&mut radio, &mut out));
    assert_eq!(out, "Sent 3 TX packets\r\n");
    assert_eq!(session.message_count(), 0);
}

#[test]
fn test_start_failure_on_fresh_session() {
    let mut radio = MockRadio { fail_start: true, ..MockRadio::new() };
    let mut session = TxSession::new();

    assert_eq!(block_on(session.start(&mut radio)), Err(TxError::StartTx));
    assert_eq!(session.state(), TxState::Idle);
    assert_eq!(session.message_count(), 0);
}

#[test]
fn test_tx_done_rearms_while_transmitting() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    let mut out = String::new();

    block_on(session.start(&mut radio)).unwrap();
    radio.calls.clear();
    block_on(session.on_tx_done(&mut radio, &mut out));

    let mut expected = vec![Call::PostTransmit];
    expected.extend(arm_calls());
    assert_eq!(radio.calls, expected);
    assert_eq!(session.message_count(), 1);
    assert!(session.is_transmitting());
    assert!(out.is_empty());
}

#[test]
fn test_tx_done_after_stop_reports_total() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    let mut out = String::new();

    block_on(session.start(&mut radio)).unwrap();
    block_on(session.on_tx_done(&mut radio, &mut out));
    session.stop(&mut out);
    assert_eq!(out, "Stopping TX\r\n");
    out.clear();

    radio.calls.clear();
    block_on(session.on_tx_done(&mut radio, &mut out));
    assert_eq!(out, "Sent 2 TX packets\r\n");
    assert_eq!(radio.calls, [Call::PostTransmit]);
    assert_eq!(session.message_count(), 0);
    assert_eq!(session.state(), TxState::Idle);
}

#[test]
fn test_rearm_failure_stops_session() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    let mut out = String::new();

    block_on(session.start(&mut radio)).unwrap();
    radio.fail_start = true;
    block_on(session.on_tx_done(&mut radio, &mut out));

    assert_eq!(session.state(), TxState::Idle);
    assert_eq!(session.message_count(), 0);
    assert!(out.contains("Failed to start TX"));
}

#[test]
fn test_rearm_buffer_failure_stops_session() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    let mut out = String::new();

    block_on(session.start(&mut radio)).unwrap();
    block_on(session.on_tx_done(&mut radio, &mut out));
    radio.fail_write = true;
    radio.calls.clear();
    block_on(session.on_tx_done(&mut radio, &mut out));

    assert_eq!(session.state(), TxState::Idle);
    assert_eq!(session.message_count(), 0);
    assert!(out.contains("Failed to write TX packet to buffer"));
    assert_eq!(radio.started(), 0);
}

#[test]
fn test_toggle_starts_then_stops() {
    let mut radio = MockRadio::new();
    let mut session = TxSession::new();
    let mut out = String::new();

    block_on(session.toggle(&mut radio, &mut out));
    assert!(session.is_transmitting());
    assert_eq!(out, "Starting TX\r\n");

    out.clear();
    block_on(session.toggle(&mut radio, &mut out));
    assert!(!session.is_transmitting());
    assert_eq!(out, "Stopping TX\r\n");
    assert_eq!(radio.started(), 1);
}
