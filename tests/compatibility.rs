//! Integration tests for type compatibility of assembled chains.

use stagehand::builtin::{self, LINE, TEXT, WORD};
use stagehand::compat::{check_compatibility, is_compatible};
use stagehand::config::Config;
use stagehand::error::CompatibilityError;
use stagehand::pipeline::Stage;
use stagehand::plugin::{TypeTag, ANY};
use stagehand::registry::PluginMap;

static IMAGE: TypeTag = TypeTag::new("image");

fn chain(plugins: &PluginMap<Stage<String>>, names: &[&str]) -> Vec<Stage<String>> {
    names
        .iter()
        .map(|name| plugins[*name].instantiate().unwrap())
        .collect()
}

fn builtins() -> PluginMap<Stage<String>> {
    builtin::discover_plugins(&Config::default()).unwrap()
}

// =============================================================================
// TYPE SETS
// =============================================================================

#[test]
fn disjoint_types_are_incompatible() {
    assert!(!is_compatible(&[IMAGE], &[TEXT], &ANY));
    assert!(!is_compatible(&[TEXT], &[WORD], &ANY));
}

#[test]
fn wildcard_matches_unconditionally() {
    assert!(is_compatible(&[ANY], &[IMAGE], &ANY));
    assert!(is_compatible(&[IMAGE], &[ANY], &ANY));
}

#[test]
fn derived_types_match_their_parents() {
    assert!(is_compatible(&[LINE], &[TEXT], &ANY));
    assert!(is_compatible(&[IMAGE, WORD], &[TEXT], &ANY));
}

#[test]
fn custom_wildcard_is_honoured() {
    assert!(is_compatible(&[IMAGE], &[TEXT], &IMAGE));
    assert!(!is_compatible(&[ANY], &[TEXT], &IMAGE));
}

// =============================================================================
// CHAINS
// =============================================================================

#[test]
fn compatible_builtin_chain() {
    let plugins = builtins();
    let stages = chain(&plugins, &["from-lines", "split-words", "upper", "to-file"]);

    check_compatibility(&stages, &ANY).unwrap();
}

#[test]
fn single_plugin_and_empty_chain_are_valid() {
    let plugins = builtins();

    check_compatibility(&chain(&plugins, &["generate"]), &ANY).unwrap();
    check_compatibility::<Stage<String>>(&[], &ANY).unwrap();
}

#[test]
fn mismatched_builtin_chain_names_both_plugins() {
    let plugins = builtins();
    let stages = chain(&plugins, &["generate", "split-words", "split-words"]);

    let err = check_compatibility(&stages, &ANY).unwrap_err();

    match err {
        CompatibilityError::Incompatible {
            producer_index,
            consumer_index,
            generates,
            accepts,
            ..
        } => {
            assert_eq!((producer_index, consumer_index), (1, 2));
            assert_eq!(generates, "word");
            assert_eq!(accepts, "line");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn writer_cannot_feed_another_plugin() {
    let plugins = builtins();
    let stages = chain(&plugins, &["generate", "to-console", "upper"]);

    let err = check_compatibility(&stages, &ANY).unwrap_err();

    assert!(matches!(err, CompatibilityError::NotAProducer { index: 1, .. }));
}

#[test]
fn reader_cannot_consume() {
    let plugins = builtins();
    let stages = chain(&plugins, &["generate", "from-lines"]);

    let err = check_compatibility(&stages, &ANY).unwrap_err();

    assert!(matches!(err, CompatibilityError::NotAConsumer { index: 1, .. }));
}
