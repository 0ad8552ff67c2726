//! Newline-delimited JSON output.

use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

use super::{ForwardError, ForwardMessage, Forwarder};

/// Writes each message as one line of JSON
pub struct JsonLinesForwarder<W> {
    writer: Mutex<W>,
}

impl JsonLinesForwarder<std::io::Stdout> {
    /// Forwarder writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesForwarder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer, e.g. to inspect a buffer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W> std::fmt::Debug for JsonLinesForwarder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesForwarder").finish_non_exhaustive()
    }
}

#[async_trait]
impl<W: Write + Send> Forwarder for JsonLinesForwarder<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    async fn forward(&self, message: &ForwardMessage) -> Result<(), ForwardError> {
        let line = serde_json::to_string(message)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ForwardError::Transport("output writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeederSettings;
    use crate::models::DocumentBuilder;

    #[tokio::test]
    async fn test_writes_one_line_per_message() {
        let forwarder = JsonLinesForwarder::new(Vec::new());

        for title in ["First", "Second"] {
            let mut builder = DocumentBuilder::new();
            builder.title(title).author("Jane Q. Public");
            let message = ForwardMessage::from_document(
                &builder.build(),
                &FeederSettings::default(),
                "https://arxiv.org/abs/1234.5678",
            )
            .unwrap();
            forwarder.forward(&message).await.unwrap();
        }

        let output = String::from_utf8(forwarder.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ForwardMessage = serde_json::from_str(lines[0]).unwrap();
        let second: ForwardMessage = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.title.as_deref(), Some("First"));
        assert_eq!(second.title.as_deref(), Some("Second"));
        assert_eq!(first.author_names().unwrap()[0].surname, "Public");
    }
}
