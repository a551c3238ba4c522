//! OpenAPI 3.1 document generated from the route table.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::DocsConfig;
use crate::routing::{MethodFilter, PathPattern, Route, RouteTable};

pub const OPENAPI_VERSION: &str = "3.1.0";

/// Known tags, in the order they appear in the document.
const TAGS: &[(&str, &str)] = &[
    ("auth", "Authentication endpoints"),
    ("health", "Health check endpoints"),
];

/// Methods listed for a route that accepts any method.
const ANY_METHODS: &[&str] = &["get", "post", "put", "patch", "delete"];

#[derive(Debug, Clone, Serialize)]
pub struct OpenApi {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub paths: IndexMap<String, PathItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations on one path, keyed by lowercase method.
pub type PathItem = IndexMap<String, Operation>;

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: IndexMap<String, ResponseSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseSpec {
    pub description: String,
}

impl ResponseSpec {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
        }
    }
}

/// Build the document for every route in `routes`.
pub fn generate(routes: &RouteTable, config: &DocsConfig) -> OpenApi {
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    for route in routes.routes() {
        let item = paths.entry(document_path(route.path())).or_default();
        for method in method_keys(route.methods()) {
            item.insert(method, operation(route));
        }
    }

    let used: Vec<&str> = routes
        .routes()
        .iter()
        .filter_map(|route| route.doc().tag.as_deref())
        .collect();
    let tags = TAGS
        .iter()
        .filter(|(name, _)| used.contains(name))
        .map(|(name, description)| Tag {
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .collect();

    OpenApi {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: config.title.clone(),
            version: config.version.clone(),
            description: Some(config.description.clone()).filter(|d| !d.is_empty()),
        },
        tags,
        paths,
    }
}

/// `/api/auth/*` is documented as `/api/auth/{path}`.
fn document_path(pattern: &PathPattern) -> String {
    match pattern {
        PathPattern::Exact(path) => path.clone(),
        PathPattern::Wildcard(prefix) => format!("{}{{path}}", prefix),
    }
}

fn method_keys(filter: &MethodFilter) -> Vec<String> {
    match filter {
        MethodFilter::Any => ANY_METHODS.iter().map(|m| m.to_string()).collect(),
        MethodFilter::One(method) => vec![method.as_str().to_ascii_lowercase()],
    }
}

fn operation(route: &Route) -> Operation {
    let doc = route.doc();
    let mut responses = IndexMap::new();
    responses.insert("200".to_string(), ResponseSpec::new("Successful response"));

    let request_body = doc.body_schema.map(|name| {
        responses.insert("400".to_string(), ResponseSpec::new("Validation error"));
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: json!({ "type": "object", "title": name }),
            },
        );
        RequestBody {
            required: true,
            content,
        }
    });
    responses.insert("500".to_string(), ResponseSpec::new("Internal server error"));

    Operation {
        tags: doc.tag.iter().cloned().collect(),
        summary: doc.summary.clone(),
        description: doc.description.clone(),
        request_body,
        responses,
    }
}
