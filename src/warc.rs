//! The WARC mirror contract (§6, §9 GLOSSARY): an external archival-record
//! collaborator. The core mirrors bytes into its temp file but knows
//! nothing of its format — this crate ships only the trait.

use std::io::Write;

use crate::NetResult;

/// A WARC writer: a temp-file factory plus request/response record
/// emission. No implementation is provided. `RequestBuilder::send` and the
/// body writer never name this trait directly — they mirror bytes through
/// a plain `Write`, and a caller wires `temp_file()`'s output in as that
/// writer; `write_request_record`/`write_response_record` are for the
/// caller to invoke around the transaction, framing what the core mirrored
/// into whole WARC records.
pub trait WarcWriter {
    type TempFile: Write;

    fn temp_file(&mut self) -> NetResult<Self::TempFile>;

    fn write_request_record(&mut self, raw_request: &[u8]) -> bool;

    fn write_response_record(&mut self, raw_head: &[u8], body: &[u8]) -> bool;
}
