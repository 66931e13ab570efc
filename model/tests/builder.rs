use serde_json::json;
use swdsl_base::DEFAULT_NAMESPACE;
use swdsl_model::builder::WorkflowDefinitionBuilder;
use swdsl_model::definition::{FlowDirective, TaskKind, WorkflowDefinition};
use swdsl_model::{DefinitionError, TaskType};

fn greet() -> WorkflowDefinitionBuilder {
    WorkflowDefinition::builder()
        .with_name("greet")
        .and_then(|b| b.with_version("1.0.0"))
        .expect("valid document names")
}

#[test]
fn test_greet_end_to_end() {
    let workflow = greet()
        .do_("sayHello", |t| t.call("greet").with("name", json!("world")))
        .build()
        .unwrap();
    let yaml = serde_yaml::to_string(&workflow).unwrap();
    let parsed: WorkflowDefinition = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(parsed.document.name, "greet");
    assert_eq!(parsed.document.version, "1.0.0");
    assert_eq!(parsed.document.namespace, DEFAULT_NAMESPACE);
    assert_eq!(parsed.tasks().len(), 1);
    let (name, task) = parsed.tasks().get_index(0).unwrap();
    assert_eq!(name, "sayHello");
    let TaskKind::Call(call) = &task.kind else {
        panic!("expected a call task, got {}", task.kind_name());
    };
    assert_eq!(call.call, "greet");
    assert_eq!(
        serde_json::to_value(&call.with).unwrap(),
        json!({"name": "world"})
    );
    assert_eq!(parsed, workflow);
}

#[test]
fn test_document_names_checked_on_set() {
    assert!(matches!(
        WorkflowDefinition::builder().with_name("Not Valid"),
        Err(DefinitionError::InvalidFormat { field, .. }) if field == "document.name"
    ));
    assert!(matches!(
        WorkflowDefinition::builder().with_version("1.0"),
        Err(DefinitionError::InvalidFormat { field, .. }) if field == "document.version"
    ));
    assert!(WorkflowDefinition::builder().with_version("1.0.0-rc.1+build.5").is_ok());
}

#[test]
fn test_required_document_fields() {
    let err = WorkflowDefinition::builder()
        .with_name("only-name")
        .unwrap()
        .do_("a", |t| t.wait().duration("PT1S"))
        .build()
        .unwrap_err();
    assert!(matches!(err, DefinitionError::MissingField { field, .. } if field == "document.version"));

    let err = greet().build().unwrap_err();
    assert_eq!(err, DefinitionError::cardinality("do", 1, 0));
}

#[test]
fn test_composite_cardinality() {
    let err = greet()
        .do_("parallel", |t| {
            t.composite()
                .concurrently(|tasks| tasks.do_("only", |t| t.wait().duration("PT1S")))
        })
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Cardinality { field, min: 2, actual: 1 } if field == "do.parallel.fork.branches"
    ));

    let workflow = greet()
        .do_("parallel", |t| {
            t.composite().concurrently(|tasks| {
                tasks
                    .do_("a", |t| t.wait().duration("PT1S"))
                    .do_("b", |t| t.set().set("done", json!(true)))
            })
        })
        .build()
        .unwrap();
    assert_eq!(
        workflow.task("parallel").and_then(|t| t.task_type()),
        Some(TaskType::Fork)
    );
}

#[test]
fn test_nested_builders_three_levels_deep() {
    let workflow = greet()
        .do_("outer", |t| {
            t.try_()
                .do_("loop", |t| {
                    t.for_().each("item").in_("${ .items }").do_("branch", |t| {
                        t.fork()
                            .branch("left", |t| t.set().set("side", json!("left")))
                            .branch("right", |t| t.set().set("side", json!("right")))
                    })
                })
                .catch(|c| c.errors_with_status(500).do_("recover", |t| t.set().set("ok", json!(false))))
        })
        .do_("finish", |t| t.set().set("ok", json!(true)).then(FlowDirective::End))
        .build()
        .unwrap();
    let paths: Vec<String> = workflow.walk().into_iter().map(|(p, _)| p).collect();
    assert!(paths.contains(&"do.outer.try.loop.do.branch.fork.branches.left".to_string()));

    let text = serde_json::to_string(&workflow).unwrap();
    let back: WorkflowDefinition = serde_json::from_str(&text).unwrap();
    assert_eq!(back, workflow);
}

#[test]
fn test_unknown_references_fail_build() {
    let err = greet()
        .do_("get", |t| {
            t.call("http")
                .with("method", json!("get"))
                .with("endpoint", json!({"uri": "https://example.com", "authentication": "missing"}))
        })
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::InvalidFormat { field, value, .. }
            if field == "do.get.call.with.endpoint.authentication" && value == "missing"
    ));
}
