//! Command registry and dispatch tests

use lr2021_tx_tool::cli::{CliError, CommandBinding, CommandKind, Registry, RegistryError};
use lr2021_tx_tool::config::MAX_BINDINGS;
use lr2021_tx_tool::tool::DEFAULT_BINDINGS;

const NAMES: [&str; 17] = [
    "c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8",
    "c9", "c10", "c11", "c12", "c13", "c14", "c15", "c16",
];

fn binding(name: &'static str, requires_args: bool) -> CommandBinding {
    CommandBinding {
        name,
        help: "test command",
        usage: "usage text",
        requires_args,
        kind: CommandKind::Tx,
    }
}

fn default_registry() -> Registry {
    let mut registry = Registry::new();
    for b in DEFAULT_BINDINGS {
        registry.register(b).unwrap();
    }
    registry
}

#[test]
fn test_register_and_lookup() {
    let registry = default_registry();
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.get("tx").map(|b| b.kind), Some(CommandKind::Tx));
    assert_eq!(registry.get("set_tx_freq").map(|b| b.requires_args), Some(true));
    assert!(registry.get("TX").is_none());
}

#[test]
fn test_register_duplicate_rejected() {
    let mut registry = default_registry();
    let result = registry.register(binding("tx", false));
    assert_eq!(result, Err(RegistryError::Duplicate("tx")));
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_register_beyond_capacity() {
    let mut registry = Registry::new();
    for &name in &NAMES[..MAX_BINDINGS] {
        registry.register(binding(name, false)).unwrap();
    }
    assert_eq!(registry.register(binding(NAMES[MAX_BINDINGS], false)), Err(RegistryError::Full));
    assert_eq!(registry.len(), MAX_BINDINGS);
}

#[test]
fn test_iteration_follows_registration_order() {
    let registry = default_registry();
    let names: Vec<&str> = registry.iter().map(|b| b.name).collect();
    assert_eq!(names, ["set_tx_freq", "tx", "reset", "help"]);
}

#[test]
fn test_dispatch_blank_line() {
    let registry = default_registry();
    assert_eq!(registry.dispatch(""), Ok(None));
    assert_eq!(registry.dispatch("   \t "), Ok(None));
}

#[test]
fn test_dispatch_unknown_command() {
    let registry = default_registry();
    assert_eq!(registry.dispatch("foobar 12"), Err(CliError::UnknownCommand));
    assert_eq!(CliError::UnknownCommand.to_string(), "unknown command");
}

#[test]
fn test_dispatch_missing_argument() {
    let registry = default_registry();
    let err = registry.dispatch("set_tx_freq").unwrap_err();
    assert_eq!(err.message(), "set_tx_freq requires 1 argument (frequency in Hz)");
}

#[test]
fn test_dispatch_splits_arguments() {
    let registry = default_registry();
    let inv = registry.dispatch("  set_tx_freq   868100000 ").unwrap().unwrap();
    assert_eq!(inv.kind(), CommandKind::SetTxFreq);
    assert_eq!(inv.arg(0), Some("868100000"));
    assert_eq!(inv.arg(1), None);
    assert_eq!(inv.single_arg(), Ok("868100000"));
}

#[test]
fn test_single_arg_rejects_extra_tokens() {
    let registry = default_registry();
    let inv = registry.dispatch("set_tx_freq 1 2").unwrap().unwrap();
    assert!(matches!(inv.single_arg(), Err(CliError::TooManyArguments { .. })));
}

#[test]
fn test_dispatch_too_many_tokens() {
    let registry = default_registry();
    let result = registry.dispatch("help 1 2 3 4 5 6 7 8 9");
    assert!(matches!(
        result,
        Err(CliError::TooManyArguments { usage: "help takes at most 1 argument (command name)" })
    ));
}

#[test]
fn test_too_many_tokens_on_command_without_arguments() {
    let registry = default_registry();
    for (line, text) in [
        ("tx 1 2 3 4 5 6 7 8 9", "tx takes no argument"),
        ("reset a b c d e f g h i", "reset takes no argument"),
    ] {
        let err = registry.dispatch(line).unwrap_err();
        assert_eq!(err.to_string(), text);
    }
}

#[test]
fn test_optional_arguments() {
    let registry = default_registry();
    let inv = registry.dispatch("help").unwrap().unwrap();
    assert_eq!(inv.kind(), CommandKind::Help);
    assert!(inv.args.is_empty());
    let inv = registry.dispatch("help tx").unwrap().unwrap();
    assert_eq!(inv.arg(0), Some("tx"));
}
