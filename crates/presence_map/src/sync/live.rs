//! WebSocket transport for the live count channel.
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;
use tracing::info;

use crate::error::{Error, Result};
use crate::sync::ChannelFrame;

/// Opens the channel at `url` and adapts incoming WebSocket messages into frames.
pub async fn connect(url: &str) -> Result<BoxStream<'static, Result<ChannelFrame>>> {
    let (socket, response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| Error::Channel(format!("cannot connect to '{url}': {e}")))?;
    info!(url, status = %response.status(), "count channel open");

    Ok(socket
        .map(|message| match message {
            Ok(Message::Text(text)) => Ok(ChannelFrame::Text(text)),
            Ok(Message::Close(_)) => Ok(ChannelFrame::Closed),
            Ok(_) => Ok(ChannelFrame::Other),
            Err(e) => Err(Error::Channel(e.to_string())),
        })
        .boxed())
}
