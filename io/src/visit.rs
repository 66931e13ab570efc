use serde_json::Value;

/// Where an external resource sits in a workflow document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResourcePosition {
    /// JSON pointer of the resource object (the one holding `endpoint`).
    pub pointer: String,
    /// The resource of a data model schema (`input`, `output`, `export`).
    pub schema: bool,
}

const DATA_MODEL_KEYS: [&str; 3] = ["input", "output", "export"];

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

struct Collector {
    positions: Vec<ResourcePosition>,
}

impl Collector {
    fn push_if_resource(&mut self, node: &Value, pointer: String, schema: bool) {
        if node.get("endpoint").is_some() {
            self.positions.push(ResourcePosition { pointer, schema });
        }
    }

    fn data_models(&mut self, node: &Value, path: &str) {
        for key in DATA_MODEL_KEYS {
            if let Some(resource) = node.get(key).and_then(|m| m.get("schema")).and_then(|s| s.get("resource")) {
                self.push_if_resource(resource, format!("{path}/{key}/schema/resource"), true);
            }
        }
    }

    /// `[{name: task}, ..]`
    fn task_list(&mut self, node: Option<&Value>, path: String) {
        let Some(Value::Array(items)) = node else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            if let Value::Object(entry) = item {
                for (name, task) in entry {
                    self.task(task, format!("{path}/{i}/{}", escape_pointer(name)));
                }
            }
        }
    }

    fn task(&mut self, task: &Value, path: String) {
        if !task.is_object() {
            return;
        }
        self.data_models(task, &path);
        let with_resource = match task.get("call").and_then(Value::as_str) {
            Some("openapi") | Some("asyncapi") => Some("document"),
            Some("grpc") => Some("proto"),
            _ => None,
        };
        if let Some(key) = with_resource
            && let Some(resource) = task.get("with").and_then(|w| w.get(key))
        {
            self.push_if_resource(resource, format!("{path}/with/{key}"), false);
        }
        if let Some(source) = task
            .get("run")
            .and_then(|r| r.get("script"))
            .and_then(|s| s.get("source"))
        {
            self.push_if_resource(source, format!("{path}/run/script/source"), false);
        }
        self.task_list(task.get("do"), format!("{path}/do"));
        self.task_list(task.get("try"), format!("{path}/try"));
        self.task_list(
            task.get("fork").and_then(|f| f.get("branches")),
            format!("{path}/fork/branches"),
        );
        self.task_list(
            task.get("catch").and_then(|c| c.get("do")),
            format!("{path}/catch/do"),
        );
        self.task_list(
            task.get("foreach").and_then(|f| f.get("do")),
            format!("{path}/foreach/do"),
        );
    }

    fn workflow(&mut self, node: &Value) {
        self.data_models(node, "");
        if let Some(Value::Object(functions)) = node.get("use").and_then(|u| u.get("functions")) {
            for (name, task) in functions {
                self.task(task, format!("/use/functions/{}", escape_pointer(name)));
            }
        }
        if let Some(Value::Array(extensions)) = node.get("use").and_then(|u| u.get("extensions")) {
            for (i, item) in extensions.iter().enumerate() {
                let Value::Object(entry) = item else {
                    continue;
                };
                for (name, extension) in entry {
                    let path = format!("/use/extensions/{i}/{}", escape_pointer(name));
                    self.task_list(extension.get("before"), format!("{path}/before"));
                    self.task_list(extension.get("after"), format!("{path}/after"));
                }
            }
        }
        self.task_list(node.get("do"), "/do".to_string());
    }
}

/// Every external resource of a workflow document, found only where the
/// model places one: data model schemas, openapi/asyncapi documents, grpc
/// protos and script sources. Task payloads are never inspected.
pub(crate) fn resource_positions(node: &Value) -> Vec<ResourcePosition> {
    let mut collector = Collector {
        positions: Vec::new(),
    };
    collector.workflow(node);
    collector.positions
}

/// URI of a resource's endpoint, given as a string or as `{uri: ..}`.
pub(crate) fn resource_uri(resource: &Value) -> Option<&str> {
    match resource.get("endpoint")? {
        Value::String(uri) => Some(uri),
        Value::Object(endpoint) => endpoint.get("uri")?.as_str(),
        _ => None,
    }
}

fn endpoint_uri_mut(resource: &mut Value) -> Option<&mut String> {
    match resource.get_mut("endpoint")? {
        Value::String(uri) => Some(uri),
        Value::Object(endpoint) => match endpoint.get_mut("uri")? {
            Value::String(uri) => Some(uri),
            _ => None,
        },
        _ => None,
    }
}

/// Top-level legacy fields that may be the URI of a document.
pub(crate) const LEGACY_REFERENCE_FIELDS: [&str; 9] = [
    "dataInputSchema",
    "secrets",
    "constants",
    "timeouts",
    "errors",
    "events",
    "functions",
    "retries",
    "auth",
];

/// Relative references only: runtime expressions and URI templates are left
/// for the runtime.
pub(crate) fn is_relative_reference(uri: &str) -> bool {
    let uri = uri.trim();
    !uri.is_empty()
        && !uri.starts_with("${")
        && !uri.contains('{')
        && url::Url::parse(uri).is_err()
}

/// Rewrites every external resource endpoint URI that is relative.
pub(crate) fn rewrite_resource_uris(
    node: &mut Value,
    rewrite: &mut dyn FnMut(&str) -> Option<String>,
) {
    for position in resource_positions(node) {
        let Some(uri) = node.pointer_mut(&position.pointer).and_then(endpoint_uri_mut) else {
            continue;
        };
        if is_relative_reference(uri)
            && let Some(rewritten) = rewrite(uri)
        {
            tracing::debug!("rewrote relative uri {} to {}", uri, rewritten);
            *uri = rewritten;
        }
    }
}

/// Rewrites the legacy top-level references and inline schema URIs.
pub(crate) fn rewrite_legacy_uris(node: &mut Value, rewrite: &mut dyn FnMut(&str) -> Option<String>) {
    let Value::Object(obj) = node else {
        return;
    };
    for field in LEGACY_REFERENCE_FIELDS {
        let mut target = obj.get_mut(field);
        if field == "dataInputSchema" {
            target = match target {
                Some(Value::Object(schema)) => schema.get_mut("schema"),
                other => other,
            };
        }
        if let Some(Value::String(uri)) = target
            && is_relative_reference(uri)
            && let Some(rewritten) = rewrite(uri)
        {
            *uri = rewritten;
        }
    }
}
