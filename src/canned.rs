//! Byte-exact canned wire responses the session state machine sends to the
//! client in place of forwarding upstream bytes.

/// Sent when the request URL matches the keyword filter.
pub const URL_BLOCKED: &[u8] = b"HTTP/1.1 301 Moved Permanently\r\nLocation: http://www.ida.liu.se/~TDTS04/labs/2011/ass2/error1.html\r\n\r\n";

/// Sent when the response body matches the keyword filter.
pub const CONTENT_BLOCKED: &[u8] = b"HTTP/1.1 301 Moved Permanently\r\nLocation: http://www.ida.liu.se/~TDTS04/labs/2011/ass2/error2.html\r\nConnection: close\r\n\r\n";

/// Sent when the request header exceeds `MAX_HEADER_SIZE` without completing.
pub const ENTITY_TOO_LARGE: &[u8] = b"HTTP/1.1 413 Entity Too Large\r\n\r\n";

/// Sent to the client immediately on a `CONNECT` request, before tunneling.
pub const CONNECTION_ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection Established\r\n\r\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_blocked_is_byte_exact() {
        assert_eq!(
            URL_BLOCKED,
            b"HTTP/1.1 301 Moved Permanently\r\n\
Location: http://www.ida.liu.se/~TDTS04/labs/2011/ass2/error1.html\r\n\
\r\n"
        );
    }

    #[test]
    fn content_blocked_is_byte_exact() {
        assert_eq!(
            CONTENT_BLOCKED,
            b"HTTP/1.1 301 Moved Permanently\r\n\
Location: http://www.ida.liu.se/~TDTS04/labs/2011/ass2/error2.html\r\n\
Connection: close\r\n\
\r\n"
        );
    }

    #[test]
    fn entity_too_large_is_byte_exact() {
        assert_eq!(ENTITY_TOO_LARGE, b"HTTP/1.1 413 Entity Too Large\r\n\r\n");
    }

    #[test]
    fn connection_established_is_byte_exact() {
        assert_eq!(
            CONNECTION_ESTABLISHED,
            b"HTTP/1.1 200 Connection Established\r\n\r\n"
        );
    }
}
