//! Parser for the remote metadata query argument.
//!
//! The `-c` option accepts, besides plain cddb/cue files, a small query
//! language selecting the servers to search and fetch from:
//!
//! ```text
//! query
//! query[get=cddb_protocol://freedb.org:8880,search=cddb_cgi://freedb2.org/~cddb/cddb.cgi:80]
//! query[get=...]{search string}
//! query[get=...]{search string}(chosen result)
//! ```
//!
//! Deviations from the expected grammar are never fatal; they raise the
//! `ambiguous` flag and parsing continues with built-in defaults.

use serde::Serialize;

/// Metadata server used when an entry does not name one.
pub const DEFAULT_SERVER: &str = "freedb2.org/~cddb/cddb.cgi";

/// How the metadata server is spoken to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    CddbCgi,
    CddbProtocol,
    WebSearch,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::CddbProtocol => 8880,
            Protocol::CddbCgi | Protocol::WebSearch => 80,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Protocol::CddbCgi => "cddb_cgi",
            Protocol::CddbProtocol => "cddb_protocol",
            Protocol::WebSearch => "web_search",
        }
    }
}

/// One resolved server address; fields missing from the query fall back to
/// the defaults independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSpec {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

impl ServerSpec {
    fn with_protocol(protocol: Protocol) -> Self {
        ServerSpec {
            protocol,
            host: DEFAULT_SERVER.to_string(),
            port: protocol.default_port(),
        }
    }
}

impl Default for ServerSpec {
    fn default() -> Self {
        ServerSpec::with_protocol(Protocol::CddbCgi)
    }
}

/// The fully parsed query argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub search: ServerSpec,
    pub get: ServerSpec,
    pub search_string: Option<String>,
    pub chosen_result: Option<usize>,
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Get,
    Search,
}

impl Keyword {
    fn token(self) -> &'static str {
        match self {
            Keyword::Get => "get=",
            Keyword::Search => "search=",
        }
    }
}

/// Parse a `query...` argument into a descriptor plus the advisory warnings
/// collected on the way. The caller prints the warnings; nothing here is
/// fatal.
pub fn parse_query(arg: &str) -> (QueryDescriptor, Vec<String>) {
    let mut descriptor = QueryDescriptor::default();
    let mut warnings = Vec::new();

    let after_prefix = arg.strip_prefix("query").unwrap_or(arg);

    // optional [get=...,search=...] section
    let mut tail: &str = if after_prefix.starts_with('[') {
        match after_prefix.find(']') {
            Some(close) => {
                parse_entries(&after_prefix[1..close], &mut descriptor, &mut warnings);
                &after_prefix[close + 1..]
            }
            None => {
                descriptor.ambiguous = true;
                let body = &after_prefix[1..];
                let scanned = parse_entries(body, &mut descriptor, &mut warnings);
                &body[scanned..]
            }
        }
    } else {
        after_prefix
    };

    // optional {search string} section, taken verbatim
    if let Some(open) = tail.find('{') {
        match tail[open..].find('}') {
            Some(close) => {
                descriptor.search_string = Some(tail[open + 1..open + close].to_string());
                tail = &tail[open + close + 1..];
            }
            None => {
                descriptor.ambiguous = true;
                tail = "";
            }
        }
    }

    // Once the query looked ambiguous the chosen result is never read, even
    // when well formed; kept for compatibility with the historical parser.
    if descriptor.ambiguous {
        return (descriptor, warnings);
    }

    // optional (chosen result) section; pointless without a search string
    if descriptor.search_string.is_some() {
        if let Some(open) = tail.find('(') {
            match tail[open..].find(')') {
                Some(close) => {
                    descriptor.chosen_result = tail[open + 1..open + close].trim().parse().ok();
                }
                None => descriptor.ambiguous = true,
            }
        }
    }

    (descriptor, warnings)
}

/// Scan the bracket section for `get=`/`search=` entries, earliest first,
/// later entries for the same keyword overwriting earlier ones. Returns the
/// offset where scanning stopped inside `body`.
fn parse_entries(
    body: &str,
    descriptor: &mut QueryDescriptor,
    warnings: &mut Vec<String>,
) -> usize {
    let mut pos = 0;
    let mut last_end = 0;
    let mut found_entry = false;

    loop {
        let next_get = body[pos..].find("get=");
        let next_search = body[pos..].find("search=");
        let (offset, keyword) = match (next_get, next_search) {
            (None, None) => break,
            (Some(g), None) => (g, Keyword::Get),
            (None, Some(s)) => (s, Keyword::Search),
            (Some(g), Some(s)) if g <= s => (g, Keyword::Get),
            (Some(_), Some(s)) => (s, Keyword::Search),
        };

        pos += offset + keyword.token().len();
        found_entry = true;

        let server = parse_server(body, &mut pos, keyword, descriptor, warnings);
        match keyword {
            Keyword::Get => descriptor.get = server,
            Keyword::Search => descriptor.search = server,
        }

        // an entry must end at a comma or at the end of the section
        if let Some(next) = body[pos..].chars().next() {
            if next != ',' {
                descriptor.ambiguous = true;
            }
        }

        last_end = pos;
    }

    if !found_entry {
        descriptor.ambiguous = true;
    }

    last_end
}

/// Parse one `<proto>://<host>:<port>` value, every part optional, starting
/// at `pos` and advancing it past the consumed text.
fn parse_server(
    body: &str,
    pos: &mut usize,
    keyword: Keyword,
    descriptor: &mut QueryDescriptor,
    warnings: &mut Vec<String>,
) -> ServerSpec {
    let entry_end = body[*pos..].find(',').map(|i| *pos + i).unwrap_or(body.len());

    // Without a "://" the whole value is the protocol token and there is no
    // host or port to read.
    let (protocol_token, has_location) = match body[*pos..entry_end].find("://") {
        Some(i) => {
            let token = &body[*pos..*pos + i];
            *pos += i + 3;
            (token, true)
        }
        None => {
            let token = &body[*pos..entry_end];
            *pos = entry_end;
            (token, false)
        }
    };

    let protocol = if protocol_token.is_empty() {
        descriptor.ambiguous = true;
        Protocol::CddbCgi
    } else {
        match (keyword, protocol_token) {
            (Keyword::Get, "cddb_protocol") => Protocol::CddbProtocol,
            (Keyword::Get, "cddb_cgi") | (Keyword::Search, "cddb_cgi") => Protocol::CddbCgi,
            (Keyword::Search, "web_search") => {
                warnings
                    .push("web search not implemented yet! (switched to cddb_cgi)".to_string());
                Protocol::CddbCgi
            }
            (Keyword::Get, other) => {
                warnings.push(format!("unknown get protocol '{other}'! (switched to default)"));
                Protocol::CddbCgi
            }
            (Keyword::Search, other) => {
                warnings.push(format!(
                    "unknown search protocol '{other}'! (switched to default)"
                ));
                Protocol::CddbCgi
            }
        }
    };

    let mut server = ServerSpec::with_protocol(protocol);

    if has_location {
        let host_end = body[*pos..]
            .find(|c: char| c == ':' || c == ',')
            .map(|i| *pos + i)
            .unwrap_or(body.len());
        if host_end > *pos {
            server.host = body[*pos..host_end].to_string();
        }
        *pos = host_end;

        if body[*pos..].starts_with(':') {
            *pos += 1;
            let port_end = body[*pos..].find(',').map(|i| *pos + i).unwrap_or(body.len());
            let digits = &body[*pos..port_end];
            *pos = port_end;

            if !digits.is_empty() {
                if digits.bytes().all(|b| b.is_ascii_digit()) {
                    match digits.parse::<u16>() {
                        Ok(port) => server.port = port,
                        Err(_) => {
                            warnings.push("port out of range! (switched to default)".to_string())
                        }
                    }
                } else {
                    descriptor.ambiguous = true;
                    warnings.push(
                        "found non digit characters in port! (switched to default)".to_string(),
                    );
                }
            }
        }
    }

    server
}
