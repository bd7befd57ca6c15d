// Server-sent change notifications

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::web::AppState;

/// Each notifier event is sent as one SSE message whose data is the event
/// type (`data` or `content`)
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.notifier.subscribe();

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let message = Event::default().data(event.as_str());
                    return Some((Ok(message), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Event stream lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
