#![recursion_limit = "256"]

use serde_json::{Value, json};
use swdsl_model::definition::{TaskKind, WorkflowDefinition};
use swdsl_model::legacy::LegacyWorkflowDefinition;

/// One document holding every task kind, both shapes of the referenceable
/// fields and a `try > do > for > fork` nesting.
fn every_task_kind() -> Value {
    json!({
        "document": {
            "dsl": "1.0.0",
            "namespace": "samples",
            "name": "every-task",
            "version": "0.1.0",
            "tags": {"team": "platform"}
        },
        "input": {"schema": {"document": {"type": "object"}}},
        "use": {
            "authentications": {
                "petStore": {"basic": {"username": "admin", "password": "secret"}},
                "vault": {"use": "vaultSecret"}
            },
            "errors": {
                "notFound": {"type": "https://example.com/errors/not-found", "status": 404}
            },
            "retries": {
                "default": {
                    "delay": {"seconds": 3},
                    "backoff": {"exponential": {"factor": 2.0}},
                    "limit": {"attempt": {"count": 5}}
                }
            },
            "timeouts": {"short": {"after": "PT10S"}},
            "secrets": ["vaultSecret"]
        },
        "do": [
            {"fetch": {
                "call": "http",
                "with": {
                    "method": "get",
                    "endpoint": {"uri": "https://petstore.example.com/pets", "authentication": "petStore"}
                },
                "timeout": "short"
            }},
            {"fetchInline": {
                "call": "http",
                "with": {
                    "method": "get",
                    "endpoint": {
                        "uri": "https://petstore.example.com/pets/1",
                        "authentication": {"bearer": {"token": "${ .token }"}}
                    }
                },
                "timeout": {"after": {"minutes": 1}}
            }},
            {"fetchUri": {"call": "http", "with": {"method": "get", "endpoint": "https://example.com/status"}}},
            {"custom": {"call": "greet", "with": {"name": "world"}, "await": false}},
            {"notify": {"emit": {"event": {"with": {"type": "com.example.notified", "source": "https://example.com"}}}}},
            {"assign": {"set": {"count": 1, "flags": [true, false]}, "export": {"as": "${ $context + . }"}}},
            {"pause": {"wait": "PT1S"}},
            {"pauseInline": {"wait": {"seconds": 2, "milliseconds": 500}}},
            {"decide": {"switch": [
                {"big": {"when": "${ .count > 10 }", "then": "fail"}},
                {"fallback": {"then": "continue"}}
            ]}},
            {"guarded": {
                "try": [
                    {"nested": {"do": [
                        {"loop": {
                            "for": {"each": "pet", "in": "${ .pets }", "at": "index"},
                            "while": "${ .ok }",
                            "do": [
                                {"parallel": {"fork": {
                                    "compete": true,
                                    "branches": [
                                        {"left": {"wait": "PT1S"}},
                                        {"right": {"set": {"side": "right"}}}
                                    ]
                                }}}
                            ]
                        }}
                    ]}}
                ],
                "catch": {
                    "errors": {"with": {"status": 503}},
                    "as": "error",
                    "retry": "default",
                    "do": [{"log": {"set": {"failed": true}}}]
                }
            }},
            {"guardedInline": {
                "try": [{"step": {"wait": "PT1S"}}],
                "catch": {"retry": {"delay": "PT2S", "backoff": {"constant": {}}, "limit": {"attempt": {"count": 2}}}}
            }},
            {"await": {
                "listen": {"to": {"any": [{"with": {"type": "com.example.tick"}}], "until": "${ .done }"}},
                "foreach": {"item": "event", "do": [{"record": {"set": {"last": "${ $event }"}}}]}
            }},
            {"awaitAll": {"listen": {"to": {"all": [
                {"with": {"type": "com.example.a"}, "correlate": {"orderId": {"from": "${ .data.id }"}}},
                {"with": {"type": "com.example.b"}}
            ]}}}},
            {"container": {"run": {"container": {"image": "alpine:3", "command": "echo hi"}, "await": true}}},
            {"script": {"run": {"script": {"language": "js", "code": "log(1)"}, "return": "stdout"}}},
            {"scriptSource": {"run": {"script": {"language": "python", "source": {"endpoint": "https://example.com/s.py"}}}}},
            {"shell": {"run": {"shell": {"command": "ls", "arguments": {"-l": true}}}}},
            {"child": {"run": {"workflow": {"namespace": "samples", "name": "child", "version": "1.0.0"}}}},
            {"failInline": {"raise": {"error": {"type": "https://example.com/errors/bad", "status": 400, "title": "Bad"}}}},
            {"fail": {"raise": {"error": "notFound"}}}
        ],
        "timeout": "short",
        "x-owner": "platform-team"
    })
}

fn json_round_trip(workflow: &WorkflowDefinition) -> WorkflowDefinition {
    let text = serde_json::to_string_pretty(workflow).expect("serialize json");
    serde_json::from_str(&text).expect("deserialize json")
}

fn yaml_round_trip(workflow: &WorkflowDefinition) -> WorkflowDefinition {
    let text = serde_yaml::to_string(workflow).expect("serialize yaml");
    serde_yaml::from_str(&text).expect("deserialize yaml")
}

#[test]
fn test_every_task_kind_round_trips() {
    let workflow: WorkflowDefinition = serde_json::from_value(every_task_kind()).unwrap();
    assert!(workflow.validate().is_ok());
    assert_eq!(json_round_trip(&workflow), workflow);
    assert_eq!(yaml_round_trip(&workflow), workflow);
    assert_eq!(
        workflow.extension_data.get("x-owner"),
        Some(&json!("platform-team"))
    );

    let kinds: Vec<&str> = workflow.tasks().values().map(|t| t.kind_name()).collect();
    for kind in [
        "call", "emit", "set", "wait", "switch", "try", "listen", "run", "raise",
    ] {
        assert!(kinds.contains(&kind), "missing top level {kind} task");
    }
    let nested: Vec<String> = workflow.walk().into_iter().map(|(path, _)| path).collect();
    assert!(nested.contains(
        &"do.guarded.try.nested.do.loop.do.parallel.fork.branches.right".to_string()
    ));
}

#[test]
fn test_written_json_matches_input() {
    let node = every_task_kind();
    let workflow: WorkflowDefinition = serde_json::from_value(node.clone()).unwrap();
    assert_eq!(serde_json::to_value(&workflow).unwrap(), node);
}

#[test]
fn test_one_of_shapes_survive_yaml() {
    let workflow: WorkflowDefinition = serde_json::from_value(every_task_kind()).unwrap();
    let back = yaml_round_trip(&workflow);
    let timeout = |name: &str| back.task(name).and_then(|t| t.fields.timeout.clone());
    assert!(timeout("fetch").is_some_and(|t| t.is_second()));
    assert!(timeout("fetchInline").is_some_and(|t| t.is_first()));

    let raise = |name: &str| match back.task(name).map(|t| &t.kind) {
        Some(TaskKind::Raise(r)) => Some(r.raise.error.is_first()),
        _ => None,
    };
    assert_eq!(raise("failInline"), Some(true));
    assert_eq!(raise("fail"), Some(false));
}

#[test]
fn test_yaml_document_reads_like_json() {
    let yaml = r#"
document:
  dsl: '1.0.0'
  namespace: default
  name: yaml-sample
  version: '1.0.0'
do:
  - first:
      set:
        message: hello
  - second:
      wait:
        seconds: 1
      then: end
"#;
    let from_yaml: WorkflowDefinition = serde_yaml::from_str(yaml).unwrap();
    let from_json: WorkflowDefinition = serde_json::from_value(json!({
        "document": {"dsl": "1.0.0", "namespace": "default", "name": "yaml-sample", "version": "1.0.0"},
        "do": [
            {"first": {"set": {"message": "hello"}}},
            {"second": {"wait": {"seconds": 1}, "then": "end"}}
        ]
    }))
    .unwrap();
    assert_eq!(from_yaml, from_json);
}

#[test]
fn test_legacy_workflow_round_trips() {
    let node = json!({
        "id": "applicant",
        "name": "Applicant Request Decision",
        "version": "1.0",
        "specVersion": "0.8",
        "start": "CheckApplication",
        "expressionLang": "jq",
        "functions": [
            {"name": "sendRejection", "operation": "http://myapis.org/app.json#reject", "type": "rest"}
        ],
        "events": "https://example.com/events.json",
        "auth": [
            {"name": "basicAuth", "scheme": "basic", "properties": {"username": "u", "password": "p"}},
            {"name": "fromSecret", "properties": "authSecret"}
        ],
        "states": [
            {
                "type": "switch",
                "name": "CheckApplication",
                "dataConditions": [
                    {"condition": "${ .age >= 18 }", "transition": "Start"},
                    {"condition": "${ .age < 18 }", "transition": "Reject"}
                ],
                "defaultCondition": {"transition": "Reject"}
            },
            {"type": "inject", "name": "Start", "end": true, "data": {"ok": true}},
            {
                "type": "operation",
                "name": "Reject",
                "end": {"terminate": true},
                "actionMode": "sequential",
                "actions": [{"functionRef": {"refName": "sendRejection"}}]
            },
            {"type": "x-custom", "name": "Custom", "end": true, "payload": {"a": 1}}
        ]
    });
    let workflow: LegacyWorkflowDefinition = serde_json::from_value(node.clone()).unwrap();
    assert!(workflow.validate().is_ok());
    assert_eq!(serde_json::to_value(&workflow).unwrap(), node);

    let yaml = serde_yaml::to_string(&workflow).unwrap();
    let back: LegacyWorkflowDefinition = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, workflow);
}
