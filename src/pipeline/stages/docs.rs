//! Serves the API documentation page and its OpenAPI document.

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, Request};
use axum::response::{Html, IntoResponse};

use crate::config::DocsConfig;
use crate::docs::{generate, swagger_html};
use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::stage::{BoxFuture, Flow, Stage};
use crate::routing::RouteTable;

/// Answers `GET {path}` with the viewer and `GET {path}/json` with the
/// document. Both bodies are rendered once, at construction.
#[derive(Debug, Clone)]
pub struct DocsStage {
    page_path: String,
    json_path: String,
    page: Bytes,
    json: Bytes,
}

impl DocsStage {
    pub fn new(config: &DocsConfig, routes: &RouteTable) -> Result<Self, serde_json::Error> {
        let page_path = config.path.trim_end_matches('/').to_string();
        let json_path = format!("{}/json", page_path);
        let document = serde_json::to_vec(&generate(routes, config))?;
        let page = swagger_html(&config.title, &json_path);

        Ok(Self {
            page_path,
            json_path,
            page: Bytes::from(page),
            json: Bytes::from(document),
        })
    }

    pub fn json_path(&self) -> &str {
        &self.json_path
    }
}

impl Stage for DocsStage {
    fn name(&self) -> &'static str {
        "docs"
    }

    fn on_request<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        request: &'a mut Request<Body>,
    ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
        Box::pin(async move {
            if request.method() != Method::GET {
                return Ok(Flow::Continue);
            }
            let path = request.uri().path();
            let path = if path.len() > 1 {
                path.trim_end_matches('/')
            } else {
                path
            };

            if path == self.page_path {
                return Ok(Flow::Respond(Html(self.page.clone()).into_response()));
            }
            if path == self.json_path {
                let mut response = self.json.clone().into_response();
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                return Ok(Flow::Respond(response));
            }
            Ok(Flow::Continue)
        })
    }
}
