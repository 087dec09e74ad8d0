use once_cell::sync::Lazy;
use regex::bytes::Regex;

use super::error::HttpError;
use super::field_map::FieldMap;

// target is kept exactly as sent, absolute-form or origin-form, so the
// session state machine can decide how to rewrite it.
#[derive(Debug, Clone)]
pub struct RequestHeader {
    pub method: String,
    pub target: String,
    pub version: String,
    pub fields: FieldMap,
}

#[derive(Debug, Clone)]
pub struct ResponseHeader {
    pub version: String,
    pub status: String,
    pub reason: String,
    pub fields: FieldMap,
}

static REQUEST_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^([A-Z]*) ([^ ]*) HTTP/([^\r\n]*)\r\n")
        .expect("request start-line regex is a compile-time constant")
});

static RESPONSE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^HTTP/([^ ]*) ([0-9]*) ([^\r\n]*)\r\n")
        .expect("response start-line regex is a compile-time constant")
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^([^:\r\n]*): ([^\r\n]*)\r\n")
        .expect("field-line regex is a compile-time constant")
});

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// Stops at the first line that does not match the pattern; a missing or
// malformed colon silently ends field parsing.
fn parse_fields(mut rest: &[u8], fields: &mut FieldMap) {
    while let Some(caps) = FIELD_RE.captures(rest) {
        let name = lossy(&caps[1]);
        let value = lossy(&caps[2]);
        fields.append(name, value);
        let consumed = caps.get(0).expect("group 0 always present on match").end();
        rest = &rest[consumed..];
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    memchr::memmem::find(buffer, b"\r\n\r\n")
}

// Returns NotHttp if the end-of-header marker has not yet been received (the
// caller should read more bytes and retry), NoMatch if the start line does
// not match once the header is complete.
pub fn parse_request_header(buffer: &[u8]) -> Result<RequestHeader, HttpError> {
    let end = find_header_end(buffer).ok_or(HttpError::NotHttp)?;
    // Request slice stops after the CRLF terminating the last field line,
    // one CRLF short of the full blank-line marker.
    let header = &buffer[..end + 2];

    let caps = REQUEST_LINE_RE.captures(header).ok_or(HttpError::NoMatch)?;
    let method = lossy(&caps[1]);
    let target = lossy(&caps[2]);
    let version = lossy(&caps[3]);
    let consumed = caps.get(0).unwrap().end();

    let mut fields = FieldMap::new();
    parse_fields(&header[consumed..], &mut fields);

    Ok(RequestHeader {
        method,
        target,
        version,
        fields,
    })
}

// Same error contract as parse_request_header.
pub fn parse_response_header(buffer: &[u8]) -> Result<ResponseHeader, HttpError> {
    let end = find_header_end(buffer).ok_or(HttpError::NotHttp)?;
    let header = &buffer[..end + 4];

    let caps = RESPONSE_LINE_RE.captures(header).ok_or(HttpError::NoMatch)?;
    let version = lossy(&caps[1]);
    let status = lossy(&caps[2]);
    let reason = lossy(&caps[3]);
    let consumed = caps.get(0).unwrap().end();

    let mut fields = FieldMap::new();
    parse_fields(&header[consumed..], &mut fields);

    Ok(ResponseHeader {
        version,
        status,
        reason,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_header_is_not_http() {
        let buf = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
        assert!(matches!(
            parse_request_header(buf),
            Err(HttpError::NotHttp)
        ));
    }

    #[test]
    fn request_roundtrip_fields_in_order() {
        let buf = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n";
        let header = parse_request_header(buf).unwrap();
        assert_eq!(header.method, "GET");
        assert_eq!(header.target, "/index.html");
        assert_eq!(header.version, "1.1");
        assert_eq!(
            header.fields.iter().collect::<Vec<_>>(),
            vec![("Host", "example.com"), ("Accept", "*/*")]
        );
    }

    #[test]
    fn exactly_8192_byte_header_parses() {
        let prefix = b"GET / HTTP/1.1\r\nX-Pad: ";
        let suffix = b"\r\n\r\n";
        let pad_len = 8192 - prefix.len() - suffix.len();
        let mut buf = Vec::with_capacity(8192);
        buf.extend_from_slice(prefix);
        buf.extend(std::iter::repeat(b'a').take(pad_len));
        buf.extend_from_slice(suffix);
        assert_eq!(buf.len(), 8192);
        let header = parse_request_header(&buf).unwrap();
        assert_eq!(header.fields.get("X-Pad").unwrap().len(), pad_len);
    }

    #[test]
    fn response_parses_status_and_reason() {
        let buf = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html></html>";
        let header = parse_response_header(buf).unwrap();
        assert_eq!(header.version, "1.1");
        assert_eq!(header.status, "200");
        assert_eq!(header.reason, "OK");
        assert_eq!(header.fields.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn malformed_start_line_is_no_match() {
        let buf = b"not a request line\r\nHost: x\r\n\r\n";
        assert!(matches!(parse_request_header(buf), Err(HttpError::NoMatch)));
    }

    #[test]
    fn field_parsing_stops_at_first_malformed_line() {
        let buf = b"GET / HTTP/1.1\r\nHost: example.com\r\nno-colon-here\r\nAccept: */*\r\n\r\n";
        let header = parse_request_header(buf).unwrap();
        assert_eq!(header.fields.get("Host"), Some("example.com"));
        assert_eq!(header.fields.get("Accept"), None);
    }

    #[test]
    fn connect_request_target_is_host_port() {
        let buf = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n";
        let header = parse_request_header(buf).unwrap();
        assert_eq!(header.method, "CONNECT");
        assert_eq!(header.target, "example.com:443");
    }
}
