//! Re-serialization of a (possibly rewritten) request header back to wire form.

use super::parse::RequestHeader;

/// Exact byte length `serialize_request_header` would produce for `header`,
/// so callers can pre-size a buffer before serializing.
pub fn request_header_length(header: &RequestHeader) -> usize {
    let mut len = header.method.len() + 1 + header.target.len() + 6 + header.version.len() + 2;
    for (name, value) in header.fields.iter() {
        len += name.len() + 2 + value.len() + 2;
    }
    len + 2
}

/// Serialize `header` as `METHOD SP target SP HTTP/version CRLF`, followed by
/// each field in insertion order, terminated by a blank CRLF line.
pub fn serialize_request_header(header: &RequestHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(request_header_length(header));
    out.extend_from_slice(header.method.as_bytes());
    out.push(b' ');
    out.extend_from_slice(header.target.as_bytes());
    out.extend_from_slice(b" HTTP/");
    out.extend_from_slice(header.version.as_bytes());
    out.extend_from_slice(b"\r\n");

    for (name, value) in header.fields.iter() {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(b"\r\n");
    out
}
