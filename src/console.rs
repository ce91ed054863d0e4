use crate::error::SignalResult;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;

type BoxedReader = Pin<Box<dyn AsyncBufRead + Send>>;
type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Operator input, one line at a time. Line endings are stripped.
pub struct ConsoleIn {
    lines: Lines<BoxedReader>,
}

impl ConsoleIn {
    pub fn new(reader: impl AsyncBufRead + Send + 'static) -> Self {
        let reader: BoxedReader = Box::pin(reader);
        Self {
            lines: reader.lines(),
        }
    }

    /// `None` at end of input.
    pub async fn read_line(&mut self) -> SignalResult<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// Operator output, shared by the foreground and the receive task.
#[derive(Clone)]
pub struct ConsoleOut {
    inner: Arc<Mutex<BoxedWriter>>,
}

impl ConsoleOut {
    pub fn new(writer: impl AsyncWrite + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::pin(writer))),
        }
    }

    /// Writes `text` as-is and flushes, holding the lock for the whole block.
    pub async fn write(&self, text: &str) -> SignalResult<()> {
        let mut out = self.inner.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    pub async fn write_line(&self, line: &str) -> SignalResult<()> {
        self.write(&format!("{line}\n")).await
    }
}

pub struct Console {
    pub input: ConsoleIn,
    pub out: ConsoleOut,
}

impl Console {
    pub fn new(
        reader: impl AsyncBufRead + Send + 'static,
        writer: impl AsyncWrite + Send + 'static,
    ) -> Self {
        Self {
            input: ConsoleIn::new(reader),
            out: ConsoleOut::new(writer),
        }
    }

    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}
