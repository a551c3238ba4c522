//! Attaches the shared resource handles to each request.

use axum::body::Body;
use axum::http::Request;

use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::stage::{BoxFuture, Flow, Stage};
use crate::resources::Resources;

#[derive(Debug, Clone)]
pub struct DecorateStage {
    resources: Resources,
}

impl DecorateStage {
    pub fn new(resources: Resources) -> Self {
        Self { resources }
    }
}

impl Stage for DecorateStage {
    fn name(&self) -> &'static str {
        "decorate"
    }

    fn on_request<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        _request: &'a mut Request<Body>,
    ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
        Box::pin(async move {
            ctx.decorate(self.resources.clone())?;
            Ok(Flow::Continue)
        })
    }
}
