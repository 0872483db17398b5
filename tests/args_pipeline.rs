//! Integration tests: name resolution → argument groups → plugin instances.

mod common;

use std::sync::Arc;

use common::{args, Named};
use stagehand::args::{instantiate, split_args, NameResolver};
use stagehand::error::ConfigurationError;
use stagehand::registry::{InstantiationError, ModuleCatalog, PluginClass, PluginMap, PluginRegistry};

const MODULE: &str = "demo.plugins";

fn read_csv() -> Result<Named, InstantiationError> {
    Ok(Named::new("read-csv"))
}

fn read_json() -> Result<Named, InstantiationError> {
    Ok(Named::new("read-json"))
}

fn write_out() -> Result<Named, InstantiationError> {
    Ok(Named::new("write-out").with_aliases(&["out"]))
}

fn plugins() -> PluginMap<Named> {
    let catalog = ModuleCatalog::new().with_module(
        MODULE,
        vec![
            PluginClass::new(MODULE, "ReadCsv", &["Plugin"], read_csv),
            PluginClass::new(MODULE, "ReadJson", &["Plugin"], read_json),
            PluginClass::new(MODULE, "WriteOut", &["Plugin"], write_out),
        ],
    );
    let mut registry = PluginRegistry::new(Arc::new(catalog))
        .with_default_modules(vec![MODULE.to_string()])
        .with_env_lookup(Arc::new(|_: &str| -> Option<String> { None }));
    registry.plugins("demo", "Plugin").unwrap().clone()
}

// =============================================================================
// NAME RESOLUTION
// =============================================================================

#[test]
fn partial_names_resolve_only_when_unique() {
    let resolver = NameResolver::new(["read-csv", "read-json"]).partial(true);

    assert_eq!(resolver.resolve("read-"), None);
    assert_eq!(resolver.resolve("read-c"), Some("read-csv"));
    assert_eq!(resolver.resolve("read-json"), Some("read-json"));
}

#[test]
fn partial_names_ignored_unless_enabled() {
    let resolver = NameResolver::new(["read-csv", "read-json"]);

    assert_eq!(resolver.resolve("read-c"), None);
}

// =============================================================================
// SPLITTING
// =============================================================================

#[test]
fn split_into_global_and_plugin_groups() {
    let resolver = NameResolver::new(["reader-a", "writer-b"]);

    let groups = split_args(
        &args(&["--verbose", "reader-a", "--x", "1", "writer-b", "--y"]),
        &resolver,
    );

    assert_eq!(groups.keys(), vec!["", "0", "1"]);
    assert_eq!(groups.get(""), Some(&args(&["--verbose"])[..]));
    assert_eq!(groups.get("0"), Some(&args(&["reader-a", "--x", "1"])[..]));
    assert_eq!(groups.get("1"), Some(&args(&["writer-b", "--y"])[..]));
}

#[test]
fn split_stores_resolved_name() {
    let resolver = NameResolver::new(["read-csv", "read-json"]).partial(true);

    let groups = split_args(&args(&["read-c", "--value", "x"]), &resolver);

    assert_eq!(groups.plugin_names(), vec!["read-csv"]);
}

// =============================================================================
// INSTANTIATION
// =============================================================================

#[test]
fn instantiate_configures_each_plugin() {
    let plugins = plugins();
    let resolver = NameResolver::new(plugins.keys());
    let groups = split_args(
        &args(&["read-csv", "--value", "a.csv", "out", "--value", "b"]),
        &resolver,
    );

    let result = instantiate(&groups, &plugins, false, false).unwrap();

    let names: Vec<&str> = result.plugins.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["read-csv", "write-out"]);
    assert_eq!(result.plugins[0].value.as_deref(), Some("a.csv"));
    assert_eq!(result.plugins[1].value.as_deref(), Some("b"));
    assert!(result.unconsumed.is_empty());
}

#[test]
fn instances_are_fresh_and_independent() {
    let plugins = plugins();
    let resolver = NameResolver::new(plugins.keys());
    let groups = split_args(&args(&["read-csv", "--value", "1", "read-csv"]), &resolver);

    let result = instantiate(&groups, &plugins, false, false).unwrap();

    assert_eq!(result.plugins[0].value.as_deref(), Some("1"));
    assert_eq!(result.plugins[1].value, None);
    assert_eq!(plugins["read-csv"].prototype().value, None);
}

#[test]
fn global_options_rejected_unless_allowed() {
    let plugins = plugins();
    let resolver = NameResolver::new(plugins.keys());
    let groups = split_args(&args(&["-v", "read-csv"]), &resolver);

    let err = instantiate(&groups, &plugins, false, false).unwrap_err();
    assert!(matches!(err, ConfigurationError::GlobalOptionsNotAllowed(ref g) if g == &args(&["-v"])));

    assert_eq!(instantiate(&groups, &plugins, true, false).unwrap().plugins.len(), 1);
}

#[test]
fn unknown_arguments_rejected_unless_allowed() {
    let plugins = plugins();
    let resolver = NameResolver::new(plugins.keys());
    let groups = split_args(&args(&["read-csv", "--bogus", "x"]), &resolver);

    let err = instantiate(&groups, &plugins, false, false).unwrap_err();
    match err {
        ConfigurationError::UnknownArguments { plugin, args: rest } => {
            assert_eq!(plugin, "read-csv");
            assert_eq!(rest, args(&["--bogus", "x"]));
        }
        other => panic!("unexpected error: {}", other),
    }

    let lenient = instantiate(&groups, &plugins, false, true).unwrap();
    assert_eq!(lenient.plugins.len(), 1);
    assert_eq!(lenient.unconsumed, vec![("read-csv".to_string(), args(&["--bogus", "x"]))]);
}

#[test]
fn skipped_plugins_are_dropped() {
    let plugins = plugins();
    let resolver = NameResolver::new(plugins.keys());
    let groups = split_args(&args(&["read-csv", "read-json", "--skip", "write-out"]), &resolver);

    let result = instantiate(&groups, &plugins, false, false).unwrap();

    let names: Vec<&str> = result.plugins.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["read-csv", "write-out"]);
}

#[test]
fn unknown_plugin_in_group_is_an_error() {
    let plugins = plugins();
    let resolver = NameResolver::new(["read-csv", "missing"]);
    let groups = split_args(&args(&["missing"]), &resolver);

    let err = instantiate(&groups, &plugins, false, false).unwrap_err();

    assert!(matches!(err, ConfigurationError::UnknownPlugin(ref name) if name == "missing"));
}
