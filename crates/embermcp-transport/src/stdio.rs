//! Standard-stream carrier
//!
//! Newline-delimited JSON over stdin/stdout with a single implicit
//! connection. A read loop consumes whole lines from the input stream and
//! hands each non-empty line to the handler; replies are written through a
//! mutex-guarded framed writer so concurrent senders cannot interleave, with
//! the line codec appending the trailing newline. The loop terminates on
//! end-of-input, on a read error, or when the shutdown channel flips.
//!
//! Logging must never go to stdout here - that is the protocol channel.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{Mutex, watch};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, error, trace};

use embermcp_protocol::{MessageHandler, RequestContext};

use crate::{Carrier, TransportError, TransportResult};

/// Hard ceiling on a single inbound line. The dispatcher enforces the
/// protocol-level message limit; this only guards against unbounded input.
const MAX_LINE_LENGTH: usize = 4 * 1024 * 1024;

/// Carrier speaking newline-delimited JSON over the process streams
#[derive(Debug, Default)]
pub struct StdioCarrier {}

impl StdioCarrier {
    /// Create a stdio carrier over the current process's stdin/stdout
    pub fn new() -> Self {
        Self {}
    }

    /// Run the read/write loop over arbitrary async streams.
    ///
    /// Split out from [`Carrier::serve`] so tests can drive the carrier with
    /// in-memory duplex streams.
    pub async fn serve_streams<R, W>(
        &self,
        reader: R,
        writer: W,
        handler: Arc<dyn MessageHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> TransportResult<()>
    where
        R: AsyncRead + Send + Unpin,
        W: AsyncWrite + Send + Unpin,
    {
        let mut lines = FramedRead::new(
            BufReader::new(reader),
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        );
        let sink = Mutex::new(FramedWrite::new(
            writer,
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        ));

        debug!("stdio carrier started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("stdio carrier stopping on shutdown signal");
                    break;
                }
                line = lines.next() => match line {
                    Some(Ok(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        trace!(bytes = line.len(), "stdio message received");
                        let ctx = RequestContext::for_connection("stdio");
                        let outcome = handler.handle_message(&line, ctx).await;
                        if let Some(reply) = outcome.reply {
                            sink.lock()
                                .await
                                .send(reply)
                                .await
                                .map_err(|e| TransportError::Codec(e.to_string()))?;
                        }
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "stdio read error, terminating carrier");
                        return Err(TransportError::Codec(e.to_string()));
                    }
                    None => {
                        debug!("stdio input closed, terminating carrier");
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Carrier for StdioCarrier {
    async fn serve(
        &self,
        handler: Arc<dyn MessageHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> TransportResult<()> {
        self.serve_streams(tokio::io::stdin(), tokio::io::stdout(), handler, shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embermcp_protocol::DispatchOutcome;
    use tokio::io::AsyncWriteExt;

    /// Replies with the inbound message wrapped in brackets; stays silent
    /// for messages starting with '!'.
    struct EchoHandler;

    #[async_trait]
    impl MessageHandler for EchoHandler {
        async fn handle_message(&self, raw: &str, _ctx: RequestContext) -> DispatchOutcome {
            if raw.starts_with('!') {
                DispatchOutcome::none()
            } else {
                DispatchOutcome::reply(format!("[{raw}]"))
            }
        }
    }

    #[tokio::test]
    async fn delivers_lines_and_writes_replies() {
        let (mut client_in, server_in) = tokio::io::duplex(1024);
        let (server_out, mut client_out) = tokio::io::duplex(1024);
        let (_stop_tx, stop_rx) = watch::channel(false);

        let carrier = StdioCarrier::new();
        let task = tokio::spawn(async move {
            carrier
                .serve_streams(server_in, server_out, Arc::new(EchoHandler), stop_rx)
                .await
        });

        client_in.write_all(b"hello\n\n!quiet\nworld\n").await.unwrap();
        drop(client_in); // EOF terminates the read loop

        task.await.unwrap().unwrap();

        let mut received = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut client_out, &mut received)
            .await
            .unwrap();
        // Empty lines are skipped, the silent message produced no reply, and
        // replies arrive in request order with trailing newlines.
        assert_eq!(received, "[hello]\n[world]\n");
    }

    #[tokio::test]
    async fn stops_on_shutdown_signal() {
        let (_client_in, server_in) = tokio::io::duplex(64);
        let (server_out, _client_out) = tokio::io::duplex(64);
        let (stop_tx, stop_rx) = watch::channel(false);

        let carrier = StdioCarrier::new();
        let task = tokio::spawn(async move {
            carrier
                .serve_streams(server_in, server_out, Arc::new(EchoHandler), stop_rx)
                .await
        });

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }
}
