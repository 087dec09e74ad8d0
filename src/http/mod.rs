//! HTTP header data model: field map, parser, and serializer.

pub mod error;
pub mod field_map;
pub mod parse;
pub mod serialize;

pub use error::HttpError;
pub use field_map::FieldMap;
pub use parse::{parse_request_header, parse_response_header, RequestHeader, ResponseHeader};
pub use serialize::{request_header_length, serialize_request_header};
