use std::collections::{BTreeMap, HashSet};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tracing::warn;

use gamegen_core::{ContentPolicy, Frame, GeneratedFile, GenerationEvent};

use crate::session::GenerationStream;

const START_MESSAGE: &str = "starting game generation";
const FRAME_BUFFER_CAPACITY: usize = 64;

/// Turns a session's lifecycle events into gated, deduplicated transport
/// frames.
///
/// Every produced stream opens with a `start` frame and closes with exactly
/// one `end` frame, regardless of how the inner sequence terminates. Each
/// file name is delivered at most once per stream; per-file policy
/// rejections and decode faults degrade to warnings, a whole-set rejection
/// ends the stream in an error frame.
pub struct EventStreamAdapter {
    policy: Arc<dyn ContentPolicy>,
}

impl EventStreamAdapter {
    /// Creates an adapter gating files through the given policy.
    pub fn new(policy: Arc<dyn ContentPolicy>) -> Self {
        Self { policy }
    }

    /// Consumes the event sequence on a spawned task and returns the frame
    /// sequence. Per-stream state (the sent-name set) lives inside that
    /// task, so concurrent requests never share it.
    pub fn adapt(&self, events: GenerationStream) -> FrameStream {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER_CAPACITY);
        tokio::spawn(adapt_task(self.policy.clone(), events, tx));
        FrameStream { rx }
    }
}

/// Transport frame sequence for one streaming request.
pub struct FrameStream {
    rx: mpsc::Receiver<Frame>,
}

impl FrameStream {
    /// Waits for the next frame; `None` once the stream (including its
    /// `end` frame) is exhausted.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Drains the remaining frames into a vector.
    pub async fn collect_frames(mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.rx.recv().await {
            frames.push(frame);
        }
        frames
    }
}

impl futures::Stream for FrameStream {
    type Item = Frame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
        self.rx.poll_recv(cx)
    }
}

async fn adapt_task(
    policy: Arc<dyn ContentPolicy>,
    mut events: GenerationStream,
    tx: mpsc::Sender<Frame>,
) {
    if !send_frame(
        &tx,
        Frame::Start {
            message: START_MESSAGE.to_string(),
        },
    )
    .await
    {
        return;
    }

    let mut sent: HashSet<String> = HashSet::new();
    loop {
        match events.next_event().await {
            Some(GenerationEvent::Progress {
                message,
                chars_so_far,
            }) => {
                if !send_frame(
                    &tx,
                    Frame::Progress {
                        message,
                        length: chars_so_far,
                    },
                )
                .await
                {
                    return;
                }
            }
            Some(GenerationEvent::FileReady { file }) => {
                if sent.contains(&file.name) {
                    // at most one delivery per name
                    continue;
                }
                let frame = gate_file(policy.as_ref(), &file);
                let forwarded = matches!(frame, Frame::File { .. });
                if !send_frame(&tx, frame).await {
                    return;
                }
                if forwarded {
                    sent.insert(file.name);
                }
            }
            Some(GenerationEvent::Complete { files, summary }) => {
                if !finish_complete(policy.as_ref(), &tx, &sent, files, summary).await {
                    return;
                }
                break;
            }
            Some(GenerationEvent::Failure { message }) => {
                if !send_frame(&tx, Frame::Error { message }).await {
                    return;
                }
                break;
            }
            None => {
                // inner sequence died without a terminal event
                if !send_frame(
                    &tx,
                    Frame::Error {
                        message: "generation ended unexpectedly".to_string(),
                    },
                )
                .await
                {
                    return;
                }
                break;
            }
        }
    }

    let _ = send_frame(&tx, Frame::End).await;
}

/// Decodes and policy-checks one streamed file, producing either its file
/// frame or a warning frame.
fn gate_file(policy: &dyn ContentPolicy, file: &GeneratedFile) -> Frame {
    let decoded = match file.decoded() {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %file.name, error = %err, "failed to decode file content");
            return Frame::Warning {
                message: format!("failed to decode file {}", file.name),
            };
        }
    };
    let verdict = policy.check_file(&file.name, &decoded);
    if verdict.allowed {
        Frame::File {
            name: file.name.clone(),
            content: file.content.clone(),
        }
    } else {
        warn!(file = %file.name, reason = %verdict.reason, "file rejected by content policy");
        Frame::Warning {
            message: format!(
                "file {} was rejected by the content policy and skipped",
                file.name
            ),
        }
    }
}

/// Handles the terminal `Complete` event: whole-set policy check, late
/// delivery of files never individually streamed, then the completion frame.
async fn finish_complete(
    policy: &dyn ContentPolicy,
    tx: &mpsc::Sender<Frame>,
    sent: &HashSet<String>,
    files: BTreeMap<String, GeneratedFile>,
    summary: String,
) -> bool {
    if files.is_empty() {
        return send_frame(
            tx,
            Frame::Error {
                message: "no file content was produced".to_string(),
            },
        )
        .await;
    }

    let mut decoded: BTreeMap<String, String> = BTreeMap::new();
    for (name, file) in &files {
        match file.decoded() {
            Ok(text) => {
                decoded.insert(name.clone(), text);
            }
            Err(err) => {
                warn!(file = %name, error = %err, "failed to decode file in final payload");
            }
        }
    }
    if decoded.is_empty() {
        return send_frame(
            tx,
            Frame::Error {
                message: "no usable game files were produced".to_string(),
            },
        )
        .await;
    }

    let verdict = policy.check_file_set(&decoded);
    if !verdict.allowed {
        warn!(reason = %verdict.reason, "final payload rejected by content policy");
        return send_frame(
            tx,
            Frame::Error {
                message: format!("generated code failed the content policy: {}", verdict.reason),
            },
        )
        .await;
    }

    for (name, file) in &files {
        if sent.contains(name) {
            continue;
        }
        if !send_frame(
            tx,
            Frame::File {
                name: name.clone(),
                content: file.content.clone(),
            },
        )
        .await
        {
            return false;
        }
    }
    send_frame(
        tx,
        Frame::Complete {
            message: summary,
            file_count: files.len(),
        },
    )
    .await
}

async fn send_frame(tx: &mpsc::Sender<Frame>, frame: Frame) -> bool {
    tx.send(frame).await.is_ok()
}
