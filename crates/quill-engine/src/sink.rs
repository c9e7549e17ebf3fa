//! Where generated text goes: a document on disk, or the console.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use quill_core::SessionError;
use tracing::info;

/// Prepended to the first request of a document session.
pub const DOCUMENT_PREAMBLE: &str = "\
1. You are a document writer and your job is to produce document content.
2. Each request gives you the current state of a document and an instruction from the user.
3. Respond with plain text content only.
4. Update the document according to the user instruction.
5. Respond with the entire raw content of the document and nothing else.
6. Put any remarks you want to add inside the document as comments, using the comment syntax of the document type. Prefer inline comments.
7. Your response is saved directly to the document, so it must be a valid document of its type.
8. Only respond with the raw plain text content.
9. Do not apply any formatting.
10. Always keep the integrity of the document contents.";

/// Shown when a document turn produced no text.
pub const FAILURE_MESSAGE: &str = "Failed to generate content. Please try again.";

/// Shown when a chat turn produced no text.
pub const CHAT_FAILURE_MESSAGE: &str = "Failed to generate content.";

/// Destination for a session's responses.
pub trait ResponseSink {
    /// Turn a raw instruction into the prompt handed to the session.
    fn frame(&self, instruction: &str) -> Result<String, SessionError>;

    /// Text prepended to the first request, if any.
    fn preamble(&self) -> Option<&str> {
        None
    }

    /// Printed when a turn produced no text.
    fn failure_notice(&self) -> &str {
        FAILURE_MESSAGE
    }

    /// Handle the text of a successful turn.
    fn deliver(&mut self, text: &str, out: &mut dyn Write) -> Result<(), SessionError>;

    /// Called once when the loop ends.
    fn finish(&mut self, _out: &mut dyn Write) -> Result<(), SessionError> {
        Ok(())
    }
}

/// The single output document, overwritten after every successful turn.
#[derive(Clone, Debug)]
pub struct DocumentSink {
    path: PathBuf,
}

impl DocumentSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> SessionError {
        SessionError::Document {
            path: self.path.clone(),
            source,
        }
    }

    /// Create the document if it does not exist. Existing content is kept.
    pub fn touch(&self) -> Result<(), SessionError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map(drop)
            .map_err(|e| self.io_err(e))
    }

    /// Current content; empty if the file does not exist.
    pub fn read(&self) -> Result<String, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    /// Replace the content with exactly `text`.
    pub fn write(&self, text: &str) -> Result<(), SessionError> {
        std::fs::write(&self.path, text).map_err(|e| self.io_err(e))?;
        info!(path = %self.path.display(), bytes = text.len(), "document written");
        Ok(())
    }
}

impl ResponseSink for DocumentSink {
    fn frame(&self, instruction: &str) -> Result<String, SessionError> {
        let document = self.read()?;
        Ok(format!(
            "DocumentName: {}\nDocument:\n{document}\n\nUser Instructions:\n{instruction}",
            self.path.display()
        ))
    }

    fn preamble(&self) -> Option<&str> {
        Some(DOCUMENT_PREAMBLE)
    }

    fn deliver(&mut self, text: &str, out: &mut dyn Write) -> Result<(), SessionError> {
        self.write(text)?;
        writeln!(out, "Document saved to {}", self.path.display()).map_err(SessionError::Console)
    }
}

/// Chat mode: instructions are sent as typed and responses printed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ResponseSink for ConsoleSink {
    fn frame(&self, instruction: &str) -> Result<String, SessionError> {
        Ok(instruction.to_string())
    }

    fn failure_notice(&self) -> &str {
        CHAT_FAILURE_MESSAGE
    }

    fn deliver(&mut self, text: &str, out: &mut dyn Write) -> Result<(), SessionError> {
        writeln!(out, "\nAI Response:\n{text}").map_err(SessionError::Console)
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<(), SessionError> {
        writeln!(out, "\nGoodbye!").map_err(SessionError::Console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn write_then_read_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DocumentSink::new(dir.path().join("doc.md"));
        let text = "# Title\n\n  indented line\ttab\n\n";
        sink.write(text).unwrap();
        assert_eq!(sink.read().unwrap(), text);
    }

    #[test]
    fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DocumentSink::new(dir.path().join("doc.md"));
        sink.write("a much longer first version").unwrap();
        sink.write("short").unwrap();
        assert_eq!(sink.read().unwrap(), "short");
    }

    #[test]
    fn missing_document_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DocumentSink::new(dir.path().join("absent.md"));
        assert_eq!(sink.read().unwrap(), "");
    }

    #[test]
    fn touch_creates_and_preserves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let sink = DocumentSink::new(&path);

        sink.touch().unwrap();
        assert!(path.exists());

        std::fs::write(&path, "kept").unwrap();
        sink.touch().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept");
    }

    #[test]
    fn touch_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DocumentSink::new(dir.path().join("no/such/dir/doc.md"));
        assert_matches!(sink.touch(), Err(SessionError::Document { .. }));
    }

    #[test]
    fn frame_includes_name_document_and_instruction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "line one").unwrap();
        let sink = DocumentSink::new(&path);

        let framed = sink.frame("add a second line").unwrap();
        assert_eq!(
            framed,
            format!(
                "DocumentName: {}\nDocument:\nline one\n\nUser Instructions:\nadd a second line",
                path.display()
            )
        );
    }

    #[test]
    fn deliver_reports_saved_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let mut sink = DocumentSink::new(&path);
        let mut out = Vec::new();

        sink.deliver("content", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Document saved to {}\n", path.display())
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn failure_notice_differs_by_mode() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentSink::new(dir.path().join("doc.md"));
        assert_eq!(doc.failure_notice(), "Failed to generate content. Please try again.");
        assert_eq!(ConsoleSink.failure_notice(), "Failed to generate content.");
    }

    #[test]
    fn console_prints_response_and_farewell() {
        let mut sink = ConsoleSink;
        let mut out = Vec::new();
        assert_eq!(sink.frame("as typed").unwrap(), "as typed");
        assert!(sink.preamble().is_none());
        sink.deliver("hello", &mut out).unwrap();
        sink.finish(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nAI Response:\nhello\n\nGoodbye!\n"
        );
    }

    #[test]
    fn preamble_lists_ten_rules() {
        assert!(DOCUMENT_PREAMBLE.starts_with("1. "));
        assert!(DOCUMENT_PREAMBLE.lines().last().unwrap().starts_with("10. "));
    }
}
