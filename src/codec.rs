//! Request parsing: request line + headers + `Content-Length` body, form
//! field decoding, and routing into game commands.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::engine::models::{BoardSize, Mode, SessionId};
use crate::engine::session::GameSession;
use crate::error::{GameError, Result};
use crate::registry::SessionRegistry;

pub const NEW_GAME_PATH: &str = "/game/new";
pub const MOVE_PATH: &str = "/game/move";

const MAX_LINE_BYTES: u64 = 8 * 1024;
const MAX_HEADERS: usize = 100;

/// Decoded `key=value` pairs in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but a missing field is a malformed request.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| GameError::MalformedRequestBody(format!("missing field {:?}", key)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Re-join as `key=value&...` in key order.
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Split a form body on `&`, then each pair on its first `=`. Later
/// duplicates overwrite earlier values. Values are taken verbatim.
pub fn decode_fields(body: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for pair in body.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields.insert(key, value);
    }
    fields
}

/// Transport limits applied while reading a request.
#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    pub max_body_bytes: usize,
    pub read_timeout: Duration,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 8 * 1024,
            read_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Request target with any query string removed.
    pub path: String,
    /// Query-string fields overlaid with body fields.
    pub fields: FieldMap,
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(MAX_LINE_BYTES)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') && n as u64 == MAX_LINE_BYTES {
        return Err(GameError::MalformedRequestBody("header line too long".into()));
    }
    let line = String::from_utf8(buf)
        .map_err(|_| GameError::MalformedRequestBody("request is not valid UTF-8".into()))?;
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Read one request from `reader`: request line, headers up to the blank
/// line, then exactly `Content-Length` body bytes.
pub async fn parse_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    limits: &ReadLimits,
) -> Result<Request> {
    let request_line = read_line(reader)
        .await?
        .ok_or_else(|| GameError::MalformedRequestBody("empty request".into()))?;
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method.to_string(), target.to_string()),
        _ => {
            return Err(GameError::MalformedRequestBody(format!(
                "bad request line: {:?}",
                request_line
            )))
        }
    };

    let mut content_length: Option<usize> = None;
    let mut header_count = 0;
    loop {
        let line = read_line(reader)
            .await?
            .ok_or_else(|| GameError::MalformedRequestBody("unterminated headers".into()))?;
        if line.is_empty() {
            break;
        }
        header_count += 1;
        if header_count > MAX_HEADERS {
            return Err(GameError::MalformedRequestBody("too many headers".into()));
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(GameError::MalformedRequestBody(format!("bad header: {:?}", line)));
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let len = value.trim().parse::<usize>().map_err(|_| {
                GameError::MalformedRequestBody(format!("bad Content-Length: {:?}", value.trim()))
            })?;
            content_length = Some(len);
        }
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query)),
        None => (target.clone(), None),
    };
    let mut fields = query.map(decode_fields).unwrap_or_default();

    let body_len = match content_length {
        Some(len) => len,
        None if method.eq_ignore_ascii_case("POST") => {
            return Err(GameError::MalformedRequestBody("missing Content-Length".into()))
        }
        None => 0,
    };
    if body_len > limits.max_body_bytes {
        return Err(GameError::MalformedRequestBody(format!(
            "body of {} bytes exceeds limit of {}",
            body_len, limits.max_body_bytes
        )));
    }
    if body_len > 0 {
        let mut body = vec![0u8; body_len];
        reader.read_exact(&mut body).await.map_err(|e| {
            GameError::MalformedRequestBody(format!("short body: {}", e))
        })?;
        let body = String::from_utf8(body)
            .map_err(|_| GameError::MalformedRequestBody("body is not valid UTF-8".into()))?;
        for (key, value) in decode_fields(&body).iter() {
            fields.insert(key, value);
        }
    }

    Ok(Request {
        method,
        path,
        fields,
    })
}

/// A game request, decoded from its route and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewGame { mode: Mode, size: BoardSize },
    Move { id: SessionId, grid_position: String },
}

impl Command {
    /// Route by path. Paths outside the game routes are `UnknownRoute`; the
    /// game routes only accept `POST`.
    pub fn from_request(request: &Request) -> Result<Command> {
        let path = request.path.as_str();
        let game_route = matches!(path, NEW_GAME_PATH | MOVE_PATH);
        if game_route && !request.method.eq_ignore_ascii_case("POST") {
            return Err(GameError::MalformedRequestBody(format!(
                "{} requires POST, got {}",
                path, request.method
            )));
        }
        match path {
            NEW_GAME_PATH => Ok(Command::NewGame {
                mode: request.fields.require("mode")?.parse()?,
                size: request.fields.require("size")?.parse()?,
            }),
            MOVE_PATH => Ok(Command::Move {
                id: request.fields.require("id")?.to_string(),
                grid_position: request.fields.require("grid_position")?.to_string(),
            }),
            other => Err(GameError::UnknownRoute(other.to_string())),
        }
    }

    /// Apply the command to the registry and return the resulting session.
    pub fn execute(self, registry: &SessionRegistry) -> Result<GameSession> {
        match self {
            Command::NewGame { mode, size } => Ok(registry.create(size, mode)),
            Command::Move { id, grid_position } => registry.play(&id, &grid_position),
        }
    }
}
