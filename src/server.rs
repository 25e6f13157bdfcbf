//! TCP front end: one request per connection, game routes answered with the
//! session as JSON, everything else served from the public directory.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::codec::{parse_request, Command, ReadLimits, Request};
use crate::config::ServerConfig;
use crate::error::GameError;
use crate::registry::SessionRegistry;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const CONTENT_TYPES: [(&str, &str); 4] = [
    ("html", "text/html"),
    ("txt", "text/plain"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
];

pub fn content_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, ty)| *ty)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

fn status_message(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into().into_bytes(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                Self::text(500, "Internal Server Error\n")
            }
        }
    }

    fn not_found() -> Self {
        Self::text(404, "File not found\n")
    }

    pub fn header(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            status_message(self.status),
            self.content_type,
            self.body.len()
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.header().into_bytes();
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// The game server: owns the shared registry and the transport settings.
pub struct GameServer {
    registry: Arc<SessionRegistry>,
    public_root: PathBuf,
    limits: ReadLimits,
}

impl GameServer {
    pub fn new(registry: Arc<SessionRegistry>, config: &ServerConfig) -> Self {
        Self {
            registry,
            public_root: config.public_root.clone(),
            limits: config.read_limits(),
        }
    }

    /// Accept connections forever, one task per connection.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.handle_connection(stream, peer).await {
                    tracing::warn!(%peer, error = %e, "connection failed");
                }
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) -> std::io::Result<()> {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let parsed =
            match tokio::time::timeout(self.limits.read_timeout, parse_request(&mut reader, &self.limits))
                .await
            {
                Ok(parsed) => parsed,
                Err(_) => {
                    tracing::warn!(%peer, "request read timed out");
                    return Ok(());
                }
            };

        let response = match parsed {
            Ok(request) => {
                tracing::info!(%peer, method = %request.method, path = %request.path, "request");
                self.respond(&request).await
            }
            Err(GameError::Io(e)) => return Err(e),
            Err(e) => {
                tracing::warn!(%peer, error = %e, "rejected request");
                Response::text(400, format!("{}\n", e))
            }
        };

        write_half.write_all(&response.to_bytes()).await?;
        write_half.shutdown().await
    }

    /// Produce the response for one parsed request.
    pub async fn respond(&self, request: &Request) -> Response {
        let outcome = Command::from_request(request).and_then(|cmd| cmd.execute(&self.registry));
        match outcome {
            Ok(session) => Response::json(&session),
            Err(GameError::UnknownRoute(path)) => self.serve_file(&path).await,
            Err(e @ GameError::SessionNotFound(_)) => {
                tracing::warn!(error = %e, "game request failed");
                Response::text(404, format!("{}\n", e))
            }
            Err(e) => {
                tracing::warn!(error = %e, "game request failed");
                Response::text(400, format!("{}\n", e))
            }
        }
    }

    fn resolve_path(&self, request_path: &str) -> Option<PathBuf> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.public_root.join(relative))
    }

    async fn serve_file(&self, request_path: &str) -> Response {
        let Some(mut path) = self.resolve_path(request_path) else {
            return Response::not_found();
        };
        if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            path.push("index.html");
        }
        match tokio::fs::read(&path).await {
            Ok(body) => Response {
                status: 200,
                content_type: content_type(&path),
                body,
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "file not found");
                Response::not_found()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_fields;

    fn server_with_root(root: &Path) -> GameServer {
        let config = ServerConfig {
            public_root: root.to_path_buf(),
            ..ServerConfig::default()
        };
        GameServer::new(Arc::new(SessionRegistry::new()), &config)
    }

    fn post(path: &str, body: &str) -> Request {
        Request {
            method: "POST".into(),
            path: path.into(),
            fields: decode_fields(body),
        }
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("a.html")), "text/html");
        assert_eq!(content_type(Path::new("b.txt")), "text/plain");
        assert_eq!(content_type(Path::new("c.png")), "image/png");
        assert_eq!(content_type(Path::new("d.jpg")), "image/jpeg");
        assert_eq!(content_type(Path::new("file.blah")), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_headers() {
        let ok = Response {
            status: 200,
            content_type: DEFAULT_CONTENT_TYPE,
            body: vec![0; 10],
        };
        assert_eq!(
            ok.header(),
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/octet-stream\r\n\
             Content-Length: 10\r\n\
             Connection: close\r\n"
        );
        let missing = Response::not_found();
        assert!(missing.header().starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(missing.to_bytes().ends_with(b"\r\n\r\nFile not found\n"));
    }

    #[test]
    fn test_serialization_failure_is_500() {
        struct Unserializable;
        impl Serialize for Unserializable {
            fn serialize<S>(&self, _: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                Err(serde::ser::Error::custom("refused"))
            }
        }
        let response = Response::json(&Unserializable);
        assert_eq!(response.status, 500);
        assert!(response
            .header()
            .starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert_eq!(response.body, b"Internal Server Error\n");
    }

    #[test]
    fn test_resolve_path_refuses_traversal() {
        let server = server_with_root(Path::new("/srv/public"));
        assert_eq!(
            server.resolve_path("/index.html"),
            Some(PathBuf::from("/srv/public/index.html"))
        );
        assert_eq!(server.resolve_path("/../etc/passwd"), None);
        assert_eq!(server.resolve_path("/a/./b"), Some(PathBuf::from("/srv/public/a/b")));
    }

    #[tokio::test]
    async fn test_respond_game_routes() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_with_root(dir.path());

        let created = server.respond(&post("/game/new", "mode=cpu&size=3x3")).await;
        assert_eq!(created.status, 200);
        let json: serde_json::Value = serde_json::from_slice(&created.body).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["mode"], "cpu");
        assert_eq!(json["size"], "3x3");
        assert_eq!(json["message"], "Welcome to the Fields of Strife");

        let moved = server.respond(&post("/game/move", "id=1&grid_position=b2")).await;
        let json: serde_json::Value = serde_json::from_slice(&moved.body).unwrap();
        assert_eq!(json["grid"]["b2"], "X");
        assert_eq!(json["grid"]["a1"], "O");
        assert_eq!(json["result"], serde_json::Value::Null);

        let missing = server.respond(&post("/game/move", "id=9&grid_position=b2")).await;
        assert_eq!(missing.status, 404);
        let bad = server.respond(&post("/game/new", "mode=cpu")).await;
        assert_eq!(bad.status, 400);
    }

    #[tokio::test]
    async fn test_respond_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Tic-Tac-Toe</h1>").unwrap();
        let server = server_with_root(dir.path());

        let index = server.respond(&post("/", "")).await;
        assert_eq!(index.status, 200);
        assert_eq!(index.content_type, "text/html");
        assert_eq!(index.body, b"<h1>Tic-Tac-Toe</h1>");

        let missing = server.respond(&post("/inaccessible.html", "")).await;
        assert_eq!(missing.status, 404);
    }
}
