use pastelink::console::Console;
use pastelink::signaling::LOCAL_INVITATION_HEADER;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::time::timeout;

/// Timeout for a single line of console output (ms).
pub const LINE_TIMEOUT_MS: u64 = 5000;

/// Timeout for a coordinator run to finish once its input is closed (ms).
pub const RUN_TIMEOUT_MS: u64 = 5000;

const PIPE_CAPACITY: usize = 64 * 1024;

/// The human at the keyboard: types into a coordinator's stdin, reads its stdout.
pub struct Operator {
    stdin: Option<DuplexStream>,
    stdout: Lines<BufReader<DuplexStream>>,
}

/// A console wired to in-memory pipes plus the operator holding the other ends.
pub fn console_pair() -> (Console, Operator) {
    let (app_in, op_in) = tokio::io::duplex(PIPE_CAPACITY);
    let (app_out, op_out) = tokio::io::duplex(PIPE_CAPACITY);

    let console = Console::new(BufReader::new(app_in), app_out);
    let operator = Operator {
        stdin: Some(op_in),
        stdout: BufReader::new(op_out).lines(),
    };
    (console, operator)
}

/// Formats an invitation the way an operator would paste it.
pub fn plain_block(candidate: &str, description: &str) -> String {
    let mut block = format!("{candidate}\n");
    for line in description.lines() {
        block.push_str(line);
        block.push('\n');
    }
    block.push('\n');
    block
}

impl Operator {
    /// Next output line, `None` once the coordinator has dropped its console.
    pub async fn next_line(&mut self) -> Option<String> {
        timeout(Duration::from_millis(LINE_TIMEOUT_MS), self.stdout.next_line())
            .await
            .expect("timed out waiting for console output")
            .expect("console output failed")
    }

    /// Skips output until `expected` shows up as a whole line.
    pub async fn expect_line(&mut self, expected: &str) {
        loop {
            match self.next_line().await {
                Some(line) if line == expected => return,
                Some(line) => tracing::debug!("[Operator] skipping {line:?}"),
                None => panic!("output ended before {expected:?}"),
            }
        }
    }

    /// Copies everything below the invitation header, blank terminator included.
    pub async fn copy_invitation(&mut self) -> String {
        self.expect_line(LOCAL_INVITATION_HEADER).await;
        let mut block = String::new();
        loop {
            let line = self
                .next_line()
                .await
                .expect("output ended inside an invitation");
            block.push_str(&line);
            block.push('\n');
            if line.is_empty() {
                return block;
            }
        }
    }

    pub async fn paste(&mut self, text: &str) {
        let stdin = self.stdin.as_mut().expect("input already closed");
        stdin
            .write_all(text.as_bytes())
            .await
            .expect("failed to write to console input");
    }

    pub async fn type_line(&mut self, line: &str) {
        self.paste(&format!("{line}\n")).await;
    }

    /// Ctrl-D.
    pub fn close_input(&mut self) {
        self.stdin = None;
    }

    /// Reads whatever is left until the coordinator drops its console.
    pub async fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await {
            lines.push(line);
        }
        lines
    }
}
