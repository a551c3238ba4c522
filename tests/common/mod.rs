//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use shalom_api::config::ServiceConfig;
use shalom_api::http::HttpServer;
use shalom_api::lifecycle::{compose_with_routes, Shutdown};
use shalom_api::pipeline::{BoxError, Service};
use shalom_api::resources::{
    BoxFuture, CacheBackend, CacheHandle, DatabaseBackend, DatabaseHandle, ResourceError,
    Resources,
};
use shalom_api::routes::AuthDelegate;
use shalom_api::routing::Route;

/// Shared on/off switch and ping counter for a fake resource.
#[derive(Clone, Default)]
pub struct Switch {
    down: Arc<AtomicBool>,
    pings: Arc<AtomicUsize>,
}

impl Switch {
    pub fn down() -> Self {
        let switch = Self::default();
        switch.set_down(true);
        switch
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    fn ping(&self, what: &str) -> Result<(), ResourceError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            Err(ResourceError::Unavailable(format!("{} unreachable", what)))
        } else {
            Ok(())
        }
    }
}

pub struct FakeDatabase(pub Switch);

impl DatabaseBackend for FakeDatabase {
    fn ping(&self) -> BoxFuture<'_, Result<(), ResourceError>> {
        Box::pin(async move { self.0.ping("database") })
    }
}

pub struct FakeCache(pub Switch);

impl CacheBackend for FakeCache {
    fn ping(&self) -> BoxFuture<'_, Result<(), ResourceError>> {
        Box::pin(async move { self.0.ping("redis") })
    }
}

pub fn fake_resources(database: &Switch, cache: &Switch) -> Resources {
    Resources::new(
        DatabaseHandle::from_backend(FakeDatabase(database.clone())),
        CacheHandle::from_backend(FakeCache(cache.clone())),
    )
}

/// Defaults with static files off, so tests never touch `./uploads`.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.static_files.enabled = false;
    config
}

/// Auth delegate that answers `201` and mirrors the request: method and
/// URI in headers, body bytes unchanged.
pub fn echo_delegate() -> AuthDelegate {
    AuthDelegate::from_fn(|request: Request<Body>| async move {
        let method = request.method().to_string();
        let uri = request.uri().to_string();
        let cookie = request.headers().get("cookie").cloned();
        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await?;

        let mut response = (StatusCode::CREATED, body).into_response();
        let headers = response.headers_mut();
        headers.insert("x-echo-method", method.parse()?);
        headers.insert("x-echo-uri", uri.parse()?);
        if let Some(cookie) = cookie {
            headers.insert("x-echo-cookie", cookie);
        }
        headers.insert("set-cookie", "session=abc; HttpOnly".parse()?);
        Ok::<_, BoxError>(response)
    })
}

pub fn build_service(config: &ServiceConfig, resources: Resources, auth: AuthDelegate) -> Service {
    build_service_with_routes(config, resources, auth, Vec::new())
}

pub fn build_service_with_routes(
    config: &ServiceConfig,
    resources: Resources,
    auth: AuthDelegate,
    extra: Vec<Route>,
) -> Service {
    compose_with_routes(config, resources, auth, extra).unwrap()
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Serve `service` on an ephemeral port. Trigger the returned
/// [`Shutdown`] to stop it.
pub async fn spawn_server(service: Service) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(service));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a programmable HTTP/1.1 backend on an ephemeral port. `f` receives
/// the raw request (head and body) and returns the status and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut socket).await;
                let (status, body) = f(raw).await;
                let status_text = match status {
                    200 => "200 OK",
                    201 => "201 Created",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Read one request: the head, then `Content-Length` bytes of body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return raw;
        }
        raw.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = find(&raw, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&raw[..head_end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + length {
                return raw;
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
