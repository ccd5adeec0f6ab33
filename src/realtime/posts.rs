use crate::realtime::hub::PostFeedHub;
use axum::{
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures_util::{Stream, StreamExt};
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Drops the hub registration when the client goes away.
struct ConnectionGuard {
    hub: PostFeedHub,
    conn_id: u64,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.conn_id);
        tracing::info!("Realtime connection {} closed", self.conn_id);
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/realtime/posts",
    responses(
        (status = 200, description = "Server-sent stream of post INSERT events", content_type = "text/event-stream"),
    ),
    tag = "realtime"
)]
pub async fn post_inserts(
    Extension(hub): Extension<PostFeedHub>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (conn_id, rx) = hub.subscribe();
    tracing::info!("Realtime connection {} opened", conn_id);
    let guard = ConnectionGuard { hub, conn_id };

    // The guard lives as long as the stream does.
    let stream = UnboundedReceiverStream::new(rx).map(move |payload| {
        let _held = &guard;
        Ok(Event::default().event("INSERT").data(payload))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
