//! The line loop.

use crate::adapter::CommandAdapter;
use crate::config::{IdentityConfig, OutputFormat};
use crate::error::AppResult;
use crate::message::Message;
use crate::render::render;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::signal;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{error, info};

/// Read lines until end of input or Ctrl-C, writing one reply per command.
/// Returns the number of commands handled.
pub async fn run<R, W>(
    adapter: &CommandAdapter,
    identity: &IdentityConfig,
    output: OutputFormat,
    reader: R,
    mut writer: W,
) -> AppResult<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = LinesStream::new(reader.lines());
    let mut handled = 0;

    loop {
        tokio::select! {
            line = lines.next() => {
                let Some(line) = line else {
                    info!("Input closed");
                    break;
                };
                let message = Message::new(line?, identity);
                let Some(reply) = adapter.handle(&message) else {
                    continue;
                };
                handled += 1;

                let rendered = match render(&reply, output) {
                    Ok(rendered) => rendered,
                    Err(e) => {
                        error!("Failed to render reply: {}", e);
                        "Sorry, something went wrong.".to_string()
                    }
                };
                writer.write_all(rendered.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(handled)
}
