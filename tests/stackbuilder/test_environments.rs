use devx::core::stackbuilder::{new_environments, StackBuilder};
use devx_types::ConfigValue;
use serde_json::json;

fn builders(value: serde_json::Value) -> ConfigValue {
    ConfigValue::root(json!({ "platform": { "builders": value } }))
        .lookup_path("platform.builders")
        .unwrap()
}

#[test]
fn registry_has_one_entry_per_environment_keyed_by_last_segment() {
    let value = builders(json!({
        "dev": {"flows": []},
        "staging": {"flows": [{"pipeline": [{"resolve": {}}]}]},
        "prod": {"flows": [], "drivers": {"compose": {"name": "shop"}}}
    }));

    let environments = new_environments(&value).unwrap();
    assert_eq!(environments.len(), 3);
    assert_eq!(
        environments.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["dev", "staging", "prod"]
    );
    assert!(!environments.contains_key("platform.builders.dev"));
    assert_eq!(environments["staging"].flows.len(), 1);
}

#[test]
fn quoted_environment_labels_keep_their_last_segment() {
    let value = builders(json!({"eu.west": {"flows": []}}));
    let environments = new_environments(&value).unwrap();
    assert!(environments.contains_key("eu.west"));
}

#[test]
fn construction_failure_returns_partial_registry() {
    let value = builders(json!({
        "dev": {"flows": []},
        "broken": {"drivers": {}},
        "prod": {"flows": []}
    }));

    let err = new_environments(&value).unwrap_err();
    assert_eq!(err.error.code, "SB-FLOWS-001");
    assert_eq!(
        err.error.context.get("environment").map(String::as_str),
        Some("broken")
    );
    assert_eq!(err.partial.len(), 1);
    assert!(err.partial.contains_key("dev"));
}

#[test]
fn non_mapping_builders_value_is_rejected() {
    let value = builders(json!(["dev", "prod"]));
    let err = new_environments(&value).unwrap_err();
    assert_eq!(err.error.code, "VALUE-TYPE-001");
    assert!(err.partial.is_empty());
}

#[test]
fn non_string_driver_option_is_a_type_error() {
    let value = builders(json!({
        "dev": {"flows": [], "drivers": {"compose": {"path": "local", "replicas": 2}}}
    }));
    let dev = value.lookup_path("dev").unwrap();

    let err = StackBuilder::new(&dev).unwrap_err();
    assert_eq!(err.code, "SB-DRIVERS-002");
    assert!(err.message.contains("expected string, found int"));
    assert!(err.message.contains("drivers.compose.replicas"));
}

#[test]
fn string_driver_options_are_kept_verbatim() {
    let value = builders(json!({
        "dev": {"flows": [], "drivers": {"compose": {"path": "local", "replicas": "2"}}}
    }));
    let builder = StackBuilder::new(&value.lookup_path("dev").unwrap()).unwrap();

    assert_eq!(builder.driver_config["compose"]["path"], "local");
    assert_eq!(builder.driver_config["compose"]["replicas"], "2");
    assert_eq!(
        builder.driver_options("compose").map(|options| options.len()),
        Some(2)
    );
}

#[test]
fn missing_drivers_yield_empty_table() {
    let value = builders(json!({"dev": {"flows": []}}));
    let builder = StackBuilder::new(&value.lookup_path("dev").unwrap()).unwrap();
    assert!(builder.driver_config.is_empty());
}

#[test]
fn flow_failure_aborts_builder_construction() {
    let value = builders(json!({
        "dev": {"flows": [
            {"pipeline": [{"resolve": {}}]},
            {"pipeline": [{"render": {}}]}
        ]}
    }));
    let err = StackBuilder::new(&value.lookup_path("dev").unwrap()).unwrap_err();
    assert_eq!(err.code, "FLOW-DEF-001");
    assert!(err.message.contains("flows[1].pipeline[0]"));
}

#[test]
fn flows_keep_declaration_order() {
    let value = builders(json!({
        "dev": {"flows": [
            {"name": "defaults", "pipeline": [{"defaults": {"replicas": 1}}]},
            {"name": "wire", "pipeline": [{"resolve": {}}, {"patch": {"managed": true}}]}
        ]}
    }));
    let builder = StackBuilder::new(&value.lookup_path("dev").unwrap()).unwrap();
    let names: Vec<_> = builder.flows.iter().map(|flow| flow.name()).collect();
    assert_eq!(names, vec![Some("defaults"), Some("wire")]);
    assert_eq!(builder.pipeline_units(), 3);
}
