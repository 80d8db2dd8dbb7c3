//! Integration tests for currency attribution, reloads and file configuration.

use std::sync::Arc;
use std::thread;

use coinage::{
    Amount, CoinageConfig, CoinageError, Currency, Denomination, DisplayStyle, Registry,
    RegistryHandle, RegistryWarning,
};

const CONFIG: &str = r##"
[[currencies]]
name = "coins"

[[currencies.denominations]]
multiplier = 1
full_name = "copper"
short_name = "cp"
abbreviation = "c"

[[currencies.denominations]]
multiplier = 100
full_name = "silver"
short_name = "sp"
abbreviation = "s"

[[currencies.denominations]]
multiplier = 10000
full_name = "gold"
short_name = "gp"
abbreviation = "g"
primary_color = "#ffd700"

[[currencies]]
name = "gems"

[[currencies.denominations]]
multiplier = 1
full_name = "shard"
short_name = "sh"
abbreviation = "sh"

[[currencies.denominations]]
multiplier = 50
full_name = "ruby"
short_name = "rb"
abbreviation = "rb"

[[overrides]]
currency = "gems"
key = "crown"
value = "3rb10sh"

[[overrides]]
currency = "gems"
key = "pebble"
value = "2"

[[overrides]]
currency = "gems"
key = "broken"
value = "a lot"
"##;

fn temp_config_path() -> std::path::PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_coinage_{id}.toml"))
}

#[test]
fn test_load_from_file_and_attribute() {
    let path = temp_config_path();
    std::fs::write(&path, CONFIG).unwrap();

    let config = CoinageConfig::from_toml_file(&path).unwrap();
    let registry = config.build_registry();
    std::fs::remove_file(&path).ok();

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.find_currency_for_amount_string("2g50s10c").unwrap().name(),
        "coins"
    );
    assert_eq!(
        registry.find_currency_for_amount_string("3rb 10sh").unwrap().name(),
        "gems"
    );
}

#[test]
fn test_cross_currency_rejection() {
    let registry = CoinageConfig::from_toml_str(CONFIG).unwrap().build_registry();

    // Gold from one currency concatenated with a ruby from another
    assert!(registry.find_currency_for_amount_string("2g3rb").is_none());
    assert!(registry.parse_money("2g3rb").is_none());

    // "sh" must win over "s" so shards are not mistaken for silver
    assert_eq!(
        registry.find_currency_for_amount_string("10sh").unwrap().name(),
        "gems"
    );
}

#[test]
fn test_full_names_attribute() {
    let registry = CoinageConfig::from_toml_str(CONFIG).unwrap().build_registry();
    assert_eq!(
        registry.find_currency_for_amount_string("4ruby").unwrap().name(),
        "gems"
    );
}

#[test]
fn test_overrides_from_config() {
    let config = CoinageConfig::from_toml_str(CONFIG).unwrap();
    let registry = config.build_registry();
    let gems = registry.get_by_name("gems").unwrap();

    let mut store = config.override_store("gems");
    assert_eq!(store.initialize(gems).unwrap(), 2);
    assert_eq!(store.try_get(&"crown".to_string()), Some(Amount::from_units(160)));
    assert_eq!(store.try_get(&"pebble".to_string()), Some(Amount::from_units(2)));
    assert_eq!(store.unresolved(), &["broken".to_string()]);
}

#[test]
fn test_collision_warning_recorded() {
    let coins = Currency::new("coins", vec![Denomination::new(1, "c").with_full_name("coin")]);
    let chips = Currency::new("chips", vec![Denomination::new(1, "c").with_full_name("chip")]);
    let registry = Registry::new(vec![coins, chips]);

    assert_eq!(registry.get_by_token("c").unwrap().name(), "chips");
    assert_eq!(registry.get_by_token("coin").unwrap().name(), "coins");
    assert_eq!(
        registry
            .warnings()
            .iter()
            .filter(|w| matches!(w, RegistryWarning::TokenCollision { .. }))
            .count(),
        1
    );
}

#[test]
fn test_stale_reference_after_reload() {
    let config = CoinageConfig::from_toml_str(CONFIG).unwrap();
    let handle = RegistryHandle::new(config.build_registry());

    let before = handle.current();
    let money = before.parse_money("3rb").unwrap();
    assert!(!money.is_stale(&before));

    // Reload with currencies in the opposite order: ids now mean something else
    let mut reversed = config.build_currencies();
    reversed.reverse();
    let after = handle.reload(reversed);

    assert!(money.is_stale(&after));
    assert!(matches!(
        after.format_money(&money, DisplayStyle::Abbreviation, true),
        Err(CoinageError::StaleReference { held: 0, current: 1 })
    ));

    // Re-attributing the same text under the new generation works
    let fresh = after.parse_money("3rb").unwrap();
    assert_eq!(after.get_by_id(fresh.currency).name(), "gems");
    assert_eq!(fresh.value, money.value);
}

#[test]
fn test_readers_never_see_partial_registry() {
    let config = CoinageConfig::from_toml_str(CONFIG).unwrap();
    let handle = Arc::new(RegistryHandle::new(config.build_registry()));

    let reader = {
        let handle = Arc::clone(&handle);
        thread::spawn(move || {
            for _ in 0..1_000 {
                let registry = handle.current();
                // Every snapshot is complete: both currencies and their tokens
                assert_eq!(registry.len(), 2);
                assert!(registry.get_by_token("rb").is_some());
                assert!(registry.get_by_token("g").is_some());
            }
        })
    };

    for _ in 0..50 {
        handle.reload(config.build_currencies());
    }
    reader.join().unwrap();
    assert_eq!(handle.generation(), 50);
}

#[test]
fn test_empty_currency_is_fatal_only_for_itself() {
    let registry = Registry::new(vec![
        Currency::new("void", Vec::new()),
        Currency::new("coins", vec![Denomination::new(1, "c")]),
    ]);

    assert!(registry
        .warnings()
        .iter()
        .any(|w| matches!(w, RegistryWarning::Invalid { currency, .. } if currency == "void")));
    assert!(registry.get_by_name("void").unwrap().converter().is_err());
    assert_eq!(registry.parse_money("7c").unwrap().value, Amount::from_units(7));
}

#[test]
fn test_bundled_sample_config_is_clean() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/currencies.toml");
    let config = CoinageConfig::from_toml_file(path).unwrap();
    let registry = config.build_registry();

    assert!(registry.warnings().is_empty(), "{:?}", registry.warnings());
    assert_eq!(config.display.style, DisplayStyle::Abbreviation);
    for (_, currency) in registry.iter() {
        let mut store = config.override_store(currency.name());
        store.initialize(currency).unwrap();
        assert!(store.unresolved().is_empty());
    }

    let money = registry.parse_money("1p 2g").unwrap();
    let text = registry
        .format_money(&money, DisplayStyle::FullName, true)
        .unwrap()
        .text;
    assert_eq!(text, "1platinum, 2gold, ");
}
