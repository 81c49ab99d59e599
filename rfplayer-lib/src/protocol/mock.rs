use std::collections::VecDeque;
use std::io;

use super::Transport;

/// In-memory transport: records frames written, replays queued reads.
///
/// An exhausted read queue behaves like a device that never answers.
#[derive(Default)]
pub struct MockTransport {
    pub sent: Vec<Vec<u8>>,
    pub discards: usize,
    pub fail_write: bool,
    replies: VecDeque<io::Result<Option<Vec<u8>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, line: &str) -> Self {
        self.replies.push_back(Ok(Some(line.as_bytes().to_vec())));
        self
    }

    pub fn silence(mut self) -> Self {
        self.replies.push_back(Ok(None));
        self
    }

    pub fn read_error(mut self, kind: io::ErrorKind) -> Self {
        self.replies.push_back(Err(kind.into()));
        self
    }

    pub fn sent_text(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|frame| String::from_utf8_lossy(frame).into_owned())
            .collect()
    }
}

impl Transport for MockTransport {
    fn discard_input(&mut self) -> io::Result<()> {
        self.discards += 1;
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.fail_write {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.replies.pop_front().unwrap_or(Ok(None))
    }
}
