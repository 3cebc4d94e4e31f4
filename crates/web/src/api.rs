use packsim_core::{
    filter_packs, Catalog, CatalogError, Pack, SelectedPack, Session, SimulationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Read;

/// Request bodies past this size are refused unread.
pub const MAX_BODY_BYTES: u64 = 1 << 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrawRequest {
    #[serde(default)]
    pub packs: Vec<SelectedPack>,
    /// Text or number; anything else is ignored.
    #[serde(default)]
    pub seed: Option<Value>,
}

impl DrawRequest {
    pub fn seed_text(&self) -> Option<String> {
        match &self.seed {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    pub text: String,
    pub pack_count: u64,
    pub card_count: u64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
struct PackListing<'a> {
    packs: Vec<&'a Pack>,
}

/// Status code plus JSON body, kept apart from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

pub fn route<C: Catalog>(session: &Session<C>, method: &str, url: &str, body: &str) -> ApiReply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    match (method, path) {
        ("GET", "/api/packs") => list_packs(session, &query_param(query, "q").unwrap_or_default()),
        ("POST", "/api/draw") => draw(session, body),
        ("OPTIONS", _) => ApiReply::ok(Value::Null),
        _ => ApiReply::error(404, format!("no route for {method} {path}")),
    }
}

fn list_packs<C: Catalog>(session: &Session<C>, query: &str) -> ApiReply {
    let packs = match session.catalog().packs() {
        Ok(packs) => packs,
        Err(err) => return ApiReply::error(500, err.to_string()),
    };
    let listing = PackListing {
        packs: filter_packs(&packs, query),
    };
    match serde_json::to_value(listing) {
        Ok(body) => ApiReply::ok(body),
        Err(err) => ApiReply::error(500, err.to_string()),
    }
}

fn draw<C: Catalog>(session: &Session<C>, body: &str) -> ApiReply {
    let request: DrawRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(err) => return ApiReply::error(400, format!("invalid draw request: {err}")),
    };
    let seed = request.seed_text();
    match session.open(&request.packs, seed.as_deref()) {
        Ok(report) => {
            let response = DrawResponse {
                text: report.text,
                pack_count: report.pack_count,
                card_count: report.card_count,
                seed: report.seed,
            };
            match serde_json::to_value(response) {
                Ok(body) => ApiReply::ok(body),
                Err(err) => ApiReply::error(500, err.to_string()),
            }
        }
        Err(err) => ApiReply::error(status_for(&err), err.to_string()),
    }
}

fn status_for(err: &SimulationError) -> u16 {
    match err {
        SimulationError::Catalog(CatalogError::UnknownPack(_)) => 400,
        SimulationError::Catalog(CatalogError::Source(_)) => 500,
        _ if err.is_validation() => 400,
        _ => 500,
    }
}

/// Reads at most `limit` bytes of UTF-8 body; anything larger is a 413.
pub fn read_body(reader: impl Read, limit: u64) -> Result<String, ApiReply> {
    let mut body = String::new();
    reader
        .take(limit + 1)
        .read_to_string(&mut body)
        .map_err(|err| ApiReply::error(400, format!("unreadable request body: {err}")))?;
    if body.len() as u64 > limit {
        return Err(body_too_large(limit));
    }
    Ok(body)
}

pub fn body_too_large(limit: u64) -> ApiReply {
    ApiReply::error(413, format!("request body exceeds {limit} bytes"))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode(value))
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'+' => out.push(b' '),
            b'%' if idx + 2 < bytes.len() => {
                match (hex_value(bytes[idx + 1]), hex_value(bytes[idx + 2])) {
                    (Some(high), Some(low)) => {
                        out.push(high << 4 | low);
                        idx += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        idx += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}
