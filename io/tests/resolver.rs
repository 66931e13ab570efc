use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use swdsl_base::logging::tracing_init_test;
use swdsl_io::error::Result;
use swdsl_io::{
    ExternalReferenceResolver, HttpResourceFetcher, ReaderError, ReaderOptions, ResourceFetcher,
    WorkflowFormat, WorkflowReader,
};
use swdsl_model::legacy::LegacyWorkflowDefinition;
use tokio_util::sync::CancellationToken;
use url::Url;

mock! {
    pub Fetcher {}

    #[async_trait]
    impl ResourceFetcher for Fetcher {
        async fn fetch(&self, uri: &Url) -> Result<String>;
    }
}

const APPLICANT: &str = r#"
id: applicant
name: Applicant Request Decision
version: '1.0'
specVersion: '0.8'
start: Greet
functions: https://defs.example.com/functions.json
retries: https://defs.example.com/retries.yaml
events:
  - name: applicantReceived
    type: org.application.received
    source: /applications
states:
  - name: Greet
    type: operation
    actions:
      - functionRef:
          refName: greetingFunction
    end: true
"#;

fn applicant() -> LegacyWorkflowDefinition {
    serde_yaml::from_str(APPLICANT).unwrap()
}

fn resolver(fetcher: MockFetcher) -> ExternalReferenceResolver<MockFetcher> {
    ExternalReferenceResolver::new(Arc::new(fetcher), None)
}

#[tokio::test]
async fn test_resolves_uri_collections_by_field() {
    tracing_init_test(tracing::Level::DEBUG);
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .withf(|uri| uri.path() == "/functions.json")
        .times(1)
        .returning(|_| {
            Ok(json!({"functions": [
                {"name": "greetingFunction", "operation": "file://api.json#greet"}
            ]})
            .to_string())
        });
    fetcher
        .expect_fetch()
        .withf(|uri| uri.path() == "/retries.yaml")
        .times(1)
        .returning(|_| Ok("- name: default\n  delay: PT2S\n  maxAttempts: 3\n".to_string()));

    let workflow = applicant();
    let resolved = resolver(fetcher)
        .resolve_legacy(&workflow, &CancellationToken::new())
        .await
        .unwrap();

    let functions = resolved.inline_functions().unwrap();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "greetingFunction");
    let retries = resolved.retries.as_ref().and_then(|r| r.first()).unwrap();
    assert_eq!(retries[0].max_attempts(), Some(3));
    assert_eq!(resolved.events, workflow.events);
    assert!(resolved.validate().is_ok());
    // the input is never modified
    assert!(workflow.functions.as_ref().is_some_and(|f| f.is_second()));
}

#[tokio::test]
async fn test_inline_workflow_is_left_untouched() {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();
    let mut workflow = applicant();
    workflow.functions = None;
    workflow.retries = None;
    let resolved = resolver(fetcher)
        .resolve_legacy(&workflow, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(resolved, workflow);
}

#[tokio::test]
async fn test_fetch_failure_is_fatal() {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .times(1)
        .returning(|uri| Err(ReaderError::fetch(uri, "status: 404 Not Found")));
    let err = resolver(fetcher)
        .resolve_legacy(&applicant(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ReaderError::Fetch { uri, .. } if uri.ends_with("functions.json")));
}

#[tokio::test]
async fn test_cancelled_before_fetch() {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();
    let token = CancellationToken::new();
    token.cancel();
    let result = resolver(fetcher).resolve_legacy(&applicant(), &token).await;
    assert!(result.is_err_and(|e| e.is_cancelled()));
}

/// Answers after a delay, so cancellation lands while a fetch is in flight.
struct SlowFetcher;

#[async_trait]
impl ResourceFetcher for SlowFetcher {
    async fn fetch(&self, _uri: &Url) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("[]".to_string())
    }
}

#[tokio::test]
async fn test_cancelled_while_fetching() {
    tracing_init_test(tracing::Level::DEBUG);
    let resolver = ExternalReferenceResolver::new(Arc::new(SlowFetcher), None);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });
    let workflow = applicant();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        resolver.resolve_legacy(&workflow, &token),
    )
    .await
    .expect("cancellation should end resolution");
    assert!(matches!(result, Err(ReaderError::Cancelled)));
}

#[tokio::test]
async fn test_reader_loads_definitions_from_files() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join("functions.yaml"),
        "functions:\n  - name: greetingFunction\n    operation: file://api.json#greet\n",
    )
    .await
    .unwrap();
    tokio::fs::write(
        dir.path().join("constants.json"),
        r#"{"greeting": "Hello"}"#,
    )
    .await
    .unwrap();
    tokio::fs::create_dir(dir.path().join("schemas")).await.unwrap();
    tokio::fs::write(
        dir.path().join("schemas/input.json"),
        r#"{"type": "object", "required": ["name"]}"#,
    )
    .await
    .unwrap();

    let document = APPLICANT
        .replace("https://defs.example.com/functions.json", "functions.yaml")
        .replace("retries: https://defs.example.com/retries.yaml", "constants: constants.json")
        + "dataInputSchema: schemas/input.json\n";
    let reader = WorkflowReader::local(
        ReaderOptions::default()
            .with_base_directory(dir.path())
            .load_external_definitions(true),
    );
    let workflow = reader
        .read_legacy_str(&document, WorkflowFormat::Yaml)
        .await
        .unwrap();

    assert_eq!(workflow.inline_functions().map(|f| f.len()), Some(1));
    let constants = workflow.constants.as_ref().and_then(|c| c.first()).unwrap();
    assert_eq!(constants.get("greeting"), Some(&json!("Hello")));
    let schema = workflow.data_input_schema.as_ref().and_then(|s| s.first()).unwrap();
    assert_eq!(
        schema.schema.first().and_then(|s| s.get("required")),
        Some(&json!(["name"]))
    );
    assert!(schema.fail_on_validation_errors);
}

#[tokio::test]
async fn test_reader_inlines_external_schemas() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join("input.json"),
        r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#,
    )
    .await
    .unwrap();
    let document = r#"
document:
  dsl: 1.0.0
  namespace: default
  name: greet
  version: 0.1.0
input:
  schema:
    format: json
    resource:
      endpoint: input.json
do:
  - sayHello:
      set:
        greeting: ${ "Hello, " + .name }
"#;
    let reader = WorkflowReader::new(
        ReaderOptions::default()
            .with_base_directory(dir.path())
            .load_external_definitions(true),
        Arc::new(HttpResourceFetcher::new_local_only()),
    );
    let workflow = reader.read_str(document, WorkflowFormat::Yaml).await.unwrap();
    let schema = workflow.input.as_ref().and_then(|i| i.schema.as_ref()).unwrap();
    assert!(schema.resource.is_none());
    assert_eq!(
        schema.document.as_ref().and_then(|d| d.pointer("/properties/name/type")),
        Some(&json!("string"))
    );

    let missing = document.replace("input.json", "missing.json");
    assert!(matches!(
        reader.read_str(&missing, WorkflowFormat::Yaml).await,
        Err(ReaderError::Io(_))
    ));
}

#[tokio::test]
async fn test_task_payloads_stay_as_written() {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .withf(|uri| uri.as_str() == "https://flows.example.com/x/schemas/input.json")
        .times(1)
        .returning(|_| Ok(r#"{"type": "object"}"#.to_string()));
    let document = r#"
document:
  dsl: 1.0.0
  namespace: default
  name: notes
  version: 0.1.0
input:
  schema:
    resource:
      endpoint: schemas/input.json
do:
  - remember:
      set:
        source:
          endpoint: notes/readme.txt
        input:
          schema:
            resource:
              endpoint: data/not-a-schema.json
"#;
    let reader = WorkflowReader::new(
        ReaderOptions::default()
            .with_base_uri("https://flows.example.com/x/")
            .load_external_definitions(true),
        Arc::new(fetcher),
    );
    let workflow = reader.read_str(document, WorkflowFormat::Yaml).await.unwrap();

    let schema = workflow.input.as_ref().and_then(|i| i.schema.as_ref()).unwrap();
    assert_eq!(schema.document, Some(json!({"type": "object"})));
    let node = serde_json::to_value(&workflow).unwrap();
    assert_eq!(
        node.pointer("/do/0/remember/set"),
        Some(&json!({
            "source": {"endpoint": "notes/readme.txt"},
            "input": {"schema": {"resource": {"endpoint": "data/not-a-schema.json"}}}
        }))
    );
}
