//! Background removal capability abstraction
//!
//! The actual removal is done by an external engine. [`BackgroundRemover`]
//! mirrors its contract: one call per image, progress reported through a
//! callback, a PNG result or a failure at the end. [`submit`] turns that
//! callback protocol into an ordered stream the session can consume.

use crate::{
    error::Result,
    phase::ProgressEvent,
    types::{ImageFile, ProcessedImage},
};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, Instrument};

/// Callback receiving progress reports from a remover
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Trait for background removal engines
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Remove the background of `image`
    ///
    /// `progress` may be called any number of times before returning, with
    /// `current` non-decreasing per key.
    ///
    /// # Errors
    /// - The engine rejected the image or failed to produce a result
    async fn remove_background(
        &self,
        image: &ImageFile,
        progress: ProgressCallback,
    ) -> Result<ProcessedImage>;
}

/// One item of a [`Submission`] stream
#[derive(Debug)]
pub enum SubmissionEvent {
    Progress(ProgressEvent),
    /// Always the last item
    Finished(Result<ProcessedImage>),
}

/// Running removal, observed as a stream of events
///
/// Dropping the stream does not stop the remover; its remaining events are
/// discarded.
#[derive(Debug)]
pub struct Submission {
    events: UnboundedReceiverStream<SubmissionEvent>,
}

impl Stream for Submission {
    type Item = SubmissionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

/// Start `remover` on `image` in a background task
///
/// Must be called from within a tokio runtime.
pub fn submit(remover: Arc<dyn BackgroundRemover>, image: ImageFile) -> Submission {
    let (tx, rx) = mpsc::unbounded_channel();

    let progress_tx = tx.clone();
    let callback: ProgressCallback = Arc::new(move |event| {
        if progress_tx.send(SubmissionEvent::Progress(event)).is_err() {
            debug!("Progress reported after the submission was dropped");
        }
    });

    let span = tracing::info_span!(
        "removal",
        backend = %remover.name(),
        file_name = %image.name()
    );
    tokio::spawn(
        async move {
            let outcome = remover.remove_background(&image, callback).await;
            if tx.send(SubmissionEvent::Finished(outcome)).is_err() {
                debug!("Removal finished after the submission was dropped");
            }
        }
        .instrument(span),
    );

    Submission {
        events: UnboundedReceiverStream::new(rx),
    }
}
