use anyhow::anyhow;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{strip_reply_prefix, ProtocolError, Result, TERMINATOR};

/// Longest pushed frame kept while waiting for its terminator.
const MAX_FRAME_LEN: usize = 4096;

/// Background reader for frames the device pushes on its own, such as
/// received RF frames once `FORMAT` and `RECEIVER` are set.
///
/// Runs on a channel of its own, never on a connection used for commands.
/// Dropping the listener stops the reader too.
pub struct Listener {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<()>>,
}

impl Listener {
    /// Stops the reader, interrupting a pending read, and returns how it ended.
    pub async fn close(mut self) -> Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.map_err(|e| anyhow!("listener task failed: {}", e))?
    }

    /// Waits for the reader to end on its own (end of stream or error).
    pub async fn join(self) -> Result<()> {
        // dropping the sender would stop the reader
        let Listener { stop: _stop, handle } = self;
        handle.await.map_err(|e| anyhow!("listener task failed: {}", e))?
    }
}

/// Spawns a task delivering every non-empty line read from `reader` to
/// `handler`, reply prefix stripped and trimmed. Lines may end in `\r` or
/// `\r\n`.
pub fn spawn_listener<R, H>(reader: R, handler: H) -> Listener
where
    R: AsyncRead + Unpin + Send + 'static,
    H: FnMut(&str) + Send + 'static,
{
    let (stop, stopped) = oneshot::channel();
    let handle = tokio::spawn(listen(reader, handler, stopped));

    Listener {
        stop: Some(stop),
        handle,
    }
}

async fn listen<R, H>(
    mut reader: R,
    mut handler: H,
    mut stopped: oneshot::Receiver<()>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    H: FnMut(&str),
{
    let mut buf = [0u8; 256];
    let mut line: Vec<u8> = Vec::new();

    loop {
        let n = tokio::select! {
            _ = &mut stopped => {
                debug!("listener closed");
                return Ok(());
            }
            res = reader.read(&mut buf) => res.map_err(|source| ProtocolError::Transport {
                command: String::from("<listen>"),
                source,
            })?,
        };

        if n == 0 {
            debug!("listener: end of stream");
            return Ok(());
        }

        for &byte in &buf[..n] {
            if byte != TERMINATOR {
                if line.len() >= MAX_FRAME_LEN {
                    warn!("discarding oversized frame ({} bytes)", line.len());
                    line.clear();
                }
                line.push(byte);
                continue;
            }

            let text = String::from_utf8_lossy(&line).into_owned();
            line.clear();

            // a `\n` left over from the previous CRLF leads the line
            let frame = strip_reply_prefix(text.trim_start());
            if !frame.is_empty() {
                debug!("async frame {:?}", frame);
                handler(frame);
            }
        }
    }
}
