//! End-to-end tests: a real server on an ephemeral port, an application
//! behind the static layer, and requests sent with a hyper client.

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use staticroots::server::{self, ServeOptions};
use staticroots::{Handler, Resolver, StaticFiles};
use std::fs;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

const ROOT_FILE: &str = "/robots.txt";
const ASSET_FILE: &str = "/some/test.js";

/// Stand-in for the web application behind the static layer
#[derive(Default)]
struct Application {
    calls: AtomicUsize,
}

#[async_trait]
impl<B: Send + 'static> Handler<B> for Application {
    async fn handle(&self, req: Request<B>) -> Response<Full<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = format!("application: {} {}", req.method(), req.uri());
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }
}

struct TestServer {
    addr: SocketAddr,
    app: Arc<Application>,
    shutdown: Option<oneshot::Sender<()>>,
    _tmp: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let tmp = TempDir::new().unwrap();
        let files: [(&str, &[u8]); 2] = [
            ("root/robots.txt", b"some text"),
            ("static/some/test.js", b"this is some javascript"),
        ];
        for (path, contents) in files {
            let path = tmp.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        let resolver = Resolver::new(
            tmp.path().join("static"),
            Some(tmp.path().join("root").as_path()),
        )
        .unwrap();
        let app = Arc::new(Application::default());
        let layer = StaticFiles::new(resolver, Arc::clone(&app));

        let listener = server::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(server::serve(
            listener,
            Arc::new(layer),
            ServeOptions::default(),
            async move {
                let _ = rx.await;
            },
        ));

        Self {
            addr,
            app,
            shutdown: Some(tx),
            _tmp: tmp,
        }
    }

    async fn request(&self, method: Method, path: &str) -> (StatusCode, hyper::HeaderMap, Bytes) {
        let stream = TcpStream::connect(self.addr).await.unwrap();
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, self.addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    async fn get(&self, path: &str) -> (StatusCode, hyper::HeaderMap, Bytes) {
        self.request(Method::GET, path).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[tokio::test]
async fn test_get_static_file() {
    let server = TestServer::start().await;
    let (status, headers, body) = server.get(&format!("/static{ASSET_FILE}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "this is some javascript");
    assert_eq!(headers[CONTENT_TYPE], "application/javascript");
    assert_eq!(headers[CONTENT_LENGTH], "23");
    assert_eq!(server.app.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_root_file() {
    let server = TestServer::start().await;
    let (status, headers, body) = server.get(ROOT_FILE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "some text");
    assert_eq!(headers[CONTENT_LENGTH], "9");
}

#[tokio::test]
async fn test_unknown_path_reaches_application() {
    let server = TestServer::start().await;
    let (status, _, body) = server.get("/does-not-exist.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "application: GET /does-not-exist.txt");
    assert_eq!(server.app.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_traversal_never_returns_content() {
    let server = TestServer::start().await;
    let (status, _, body) = server.get("/static/%2e%2e/root/robots.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_ne!(body, "some text");
    assert_eq!(server.app.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_gets_are_identical() {
    let server = TestServer::start().await;
    let path = format!("/static{ASSET_FILE}");
    let (_, first_headers, first_body) = server.get(&path).await;
    let (_, second_headers, second_body) = server.get(&path).await;
    assert_eq!(first_body, second_body);
    assert_eq!(first_headers[CONTENT_LENGTH], second_headers[CONTENT_LENGTH]);
    assert_eq!(first_headers["etag"], second_headers["etag"]);
}

#[tokio::test]
async fn test_head_request() {
    let server = TestServer::start().await;
    let (status, headers, body) = server.request(Method::HEAD, ROOT_FILE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_LENGTH], "9");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_post_to_unknown_path_reaches_application() {
    let server = TestServer::start().await;
    let (_, _, body) = server.request(Method::POST, "/form").await;
    assert_eq!(body, "application: POST /form");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() {
    let server = Arc::new(TestServer::start().await);
    let mut tasks = Vec::new();
    for i in 0..16 {
        let server = Arc::clone(&server);
        let path = if i % 2 == 0 {
            ROOT_FILE.to_string()
        } else {
            format!("/static{ASSET_FILE}")
        };
        tasks.push(tokio::spawn(async move { (server.get(&path).await, i) }));
    }
    for task in tasks {
        let ((status, _, body), i) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let expected: &[u8] = if i % 2 == 0 {
            b"some text"
        } else {
            b"this is some javascript"
        };
        assert_eq!(body.as_ref(), expected);
    }
}
