//! Minimal multipart/form-data encoder used by the upload endpoint.
//!
//! Parts are written in the order they are added. The upload server expects
//! `appid`, `original` and `file` in exactly that order, so the encoder never
//! reorders anything.

use uuid::Uuid;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
    parts: usize,
}

impl MultipartForm {
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
            parts: 0,
        }
    }

    /// Form with a fresh `Boundary-<uuid>` boundary.
    pub fn with_random_boundary() -> Self {
        Self::new(format!("Boundary-{}", Uuid::new_v4()))
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn part_count(&self) -> usize {
        self.parts
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"{CRLF}{CRLF}",
            name
        ));
        self.push_str(value);
        self.push_str(CRLF);
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.open_part();
        self.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{CRLF}",
            name, filename
        ));
        self.push_str(&format!("Content-Type: {}{CRLF}{CRLF}", content_type));
        self.body.extend_from_slice(bytes);
        self.push_str(CRLF);
        self
    }

    /// Append the closing boundary and return the encoded body.
    pub fn finish(mut self) -> Vec<u8> {
        let closing = format!("--{}--{CRLF}", self.boundary);
        self.push_str(&closing);
        self.body
    }

    fn open_part(&mut self) {
        let delimiter = format!("--{}{CRLF}", self.boundary);
        self.push_str(&delimiter);
        self.parts += 1;
    }

    fn push_str(&mut self, s: &str) {
        self.body.extend_from_slice(s.as_bytes());
    }
}
