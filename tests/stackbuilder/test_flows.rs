use devx::core::flow::Flow;
use devx::core::progress::NoopProgress;
use devx::core::stack::Stack;
use devx::core::stackbuilder::StackBuilder;
use devx_types::ConfigValue;
use serde_json::json;

fn flow(definition: serde_json::Value) -> Flow {
    let root = ConfigValue::root(json!({ "flows": [definition] }));
    Flow::new(&root.lookup_path("flows[0]").unwrap()).unwrap()
}

fn stack(components: serde_json::Value) -> Stack {
    Stack::new(&ConfigValue::root(json!({ "components": components }))).unwrap()
}

#[test]
fn later_flows_observe_earlier_flow_output() {
    let builder = StackBuilder::new(&ConfigValue::root(json!({
        "flows": [
            {"name": "service", "match": {"traits": ["Service"]}, "pipeline": [
                {"patch": {"$metadata": {"labels": {"exposed": "true"}}}}
            ]},
            {"name": "expose", "match": {"labels": {"exposed": "true"}}, "pipeline": [
                {"patch": {"$resources": {"web": {"driver": "compose", "ports": ["80:80"]}}}}
            ]}
        ]
    })))
    .unwrap();
    let mut stack = stack(json!({
        "web": {"$metadata": {"traits": ["Service"]}, "image": "nginx"},
        "job": {"$metadata": {"traits": ["Job"]}, "image": "busybox"}
    }));

    builder.transform_stack(&mut stack, &mut NoopProgress).unwrap();

    let web = stack.get_component("web").unwrap();
    assert_eq!(
        web.lookup_path("$resources.web.driver").unwrap().value(),
        &json!("compose")
    );
    let job = stack.get_component("job").unwrap();
    assert!(job.lookup("$resources").is_none());
}

#[test]
fn patching_equal_values_is_a_no_op() {
    let flow = flow(json!({"pipeline": [{"patch": {"$metadata": {"traits": ["Service"]}}}]}));
    let stack = stack(json!({}));
    let component = ConfigValue::root(json!({"$metadata": {"traits": ["Service"]}}));
    let result = flow.run(&stack, "web", component.clone()).unwrap();
    assert_eq!(result, component);
}

#[test]
fn defaults_never_override_concrete_values() {
    let flow = flow(json!({"pipeline": [{"defaults": {
        "image": "busybox",
        "env": {"LOG_LEVEL": "info", "PORT": "8080"}
    }}]}));
    let stack = stack(json!({}));
    let component = ConfigValue::root(json!({
        "image": "nginx",
        "env": {"PORT": {"$abstract": "string"}, "MODE": "prod"}
    }));

    let result = flow.run(&stack, "web", component).unwrap();

    assert_eq!(result.lookup_path("image").unwrap().value(), &json!("nginx"));
    assert_eq!(
        result.lookup_path("env").unwrap().value(),
        &json!({"PORT": "8080", "MODE": "prod", "LOG_LEVEL": "info"})
    );
}

#[test]
fn incompatible_default_for_abstract_field_becomes_an_error() {
    let flow = flow(json!({"pipeline": [{"defaults": {"replicas": "two"}}]}));
    let stack = stack(json!({}));
    let component = ConfigValue::root(json!({"replicas": {"$abstract": "int"}}));

    let result = flow.run(&stack, "web", component).unwrap();

    assert!(result.lookup_path("replicas").unwrap().err().is_some());
    assert!(!result.is_concrete());
}

#[test]
fn resolve_uses_the_components_own_fields() {
    let flow = flow(json!({"pipeline": [{"resolve": {}}]}));
    let stack = stack(json!({"web": {}}));
    let component = ConfigValue::root(json!({
        "port": 8080,
        "healthcheck": {"url": {"$ref": "web.port"}}
    }));

    let result = flow.run(&stack, "web", component).unwrap();

    assert_eq!(
        result.lookup_path("healthcheck.url").unwrap().value(),
        &json!(8080)
    );
}

#[test]
fn resolve_copies_whole_subtrees() {
    let flow = flow(json!({"pipeline": [{"resolve": {}}]}));
    let stack = stack(json!({"db": {"credentials": {"user": "shop", "password": "secret"}}}));
    let component = ConfigValue::root(json!({"db": {"$ref": "db.credentials"}}));

    let result = flow.run(&stack, "app", component).unwrap();

    assert_eq!(
        result.lookup_path("db").unwrap().value(),
        &json!({"user": "shop", "password": "secret"})
    );
}

#[test]
fn exclude_wins_over_match() {
    let flow = flow(json!({
        "match": {"labels": {"tier": "web"}},
        "exclude": {"labels": {"canary": "true"}},
        "pipeline": [{"patch": {"replicas": 3}}]
    }));
    let stack = stack(json!({}));
    let canary = ConfigValue::root(json!({
        "$metadata": {"labels": {"tier": "web", "canary": "true"}}
    }));

    let result = flow.run(&stack, "web-canary", canary.clone()).unwrap();

    assert_eq!(result, canary);
}

#[test]
fn flow_without_selectors_applies_everywhere() {
    let flow = flow(json!({"pipeline": [{"patch": {"managed": true}}]}));
    let stack = stack(json!({}));
    let result = flow
        .run(&stack, "anything", ConfigValue::root(json!({})))
        .unwrap();
    assert_eq!(result.value(), &json!({"managed": true}));
}

#[test]
fn malformed_flow_definitions_are_rejected() {
    let root = ConfigValue::root(json!({"flows": [
        "not a mapping",
        {"pipeline": {"patch": {}}},
        {"match": {"traits": [1]}, "pipeline": []},
        {"pipeline": [], "when": "always"}
    ]}));
    for entry in root.lookup_path("flows").unwrap().list().unwrap() {
        let err = Flow::new(&entry).unwrap_err();
        assert_eq!(err.code, "FLOW-DEF-001", "{}", entry.path());
    }
}
