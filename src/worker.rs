//! Background worker running the upload pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use reqwest::Client;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::{
    compress,
    config::Config,
    encode,
    feedback::{FeedbackRequest, FeedbackSource, LocalFeedback},
    google::gemini::GeminiFeedback,
    google::webhook::{Transmit, UploadPayload, WebhookTransport},
    progress::UploadProgress,
    submission::{AttachedFile, Feedback, Submission, summarize_files},
    weeks,
};

/// Assumed throughput for the simulated per-file progress.
const SIM_BYTES_PER_SEC: f64 = 0.5 * 1024.0 * 1024.0;
/// Ceiling for simulated fractions while the transmit is still in flight.
const SIM_CAP: f64 = 0.9;
/// Tick period of the simulation.
const SIM_TICK: Duration = Duration::from_millis(200);

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Upload every file of a validated submission.
    Submit {
        /// Identifies this attempt so stale events can be dropped by the UI.
        attempt: Uuid,
        submission: Submission,
    },
    /// Persist and apply updated settings.
    SaveSettings(Config),
}

/// Events emitted by the worker for UI updates.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// Overall weighted percentage for an attempt.
    Progress { attempt: Uuid, pct: u8 },
    /// Terminal success with the feedback to show in the modal.
    Finished { attempt: Uuid, feedback: Feedback },
    /// Terminal failure; the whole attempt was abandoned.
    Failed { attempt: Uuid, error: String },
    /// Informational log message.
    Log(String),
}

/// Main worker loop: handle commands sequentially.
pub async fn run(
    mut rx: mpsc::Receiver<WorkerCmd>,
    tx: mpsc::Sender<WorkerEvent>,
    mut cfg: Config,
) {
    // Shared HTTP client for webhook and Gemini calls.
    let http = Client::new();
    tracing::info!("worker started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            WorkerCmd::SaveSettings(new_cfg) => {
                tracing::info!("settings updated");
                cfg = new_cfg;
                let _ = tx.send(WorkerEvent::Log("settings updated".into())).await;
            }

            WorkerCmd::Submit {
                attempt,
                submission,
            } => {
                tracing::info!(
                    "submit start: {attempt} ({} files)",
                    submission.files.len()
                );
                // The form blocks this too; re-check in case settings were
                // cleared while the submission was being prepared.
                if cfg.script_url_missing() {
                    tracing::warn!("submit aborted: script_url missing");
                    let _ = tx
                        .send(WorkerEvent::Failed {
                            attempt,
                            error: "script_url is not set".into(),
                        })
                        .await;
                    continue;
                }

                let transport =
                    WebhookTransport::new(http.clone(), cfg.upload.script_url.clone());
                // Without an API key the fixed local encouragement set is used.
                let source: Box<dyn FeedbackSource> = if cfg.gemini.api_key.trim().is_empty() {
                    Box::new(LocalFeedback)
                } else {
                    Box::new(GeminiFeedback::new(
                        http.clone(),
                        cfg.gemini.api_key.clone(),
                        cfg.gemini.model.clone(),
                    ))
                };

                match upload_all(&transport, source.as_ref(), &tx, attempt, &submission).await {
                    Ok(feedback) => {
                        tracing::info!("submit done: {attempt}");
                        let _ = tx.send(WorkerEvent::Finished { attempt, feedback }).await;
                    }
                    Err(e) => {
                        tracing::error!("submit failed: {attempt}: {e:#}");
                        let _ = tx
                            .send(WorkerEvent::Failed {
                                attempt,
                                error: e.to_string(),
                            })
                            .await;
                    }
                }
            }
        }
    }
}

/// Upload every attachment of one submission and produce its feedback.
///
/// The first file is delivered alone and awaited to completion so the
/// receiving script can run its one-time setup; the remaining files are then
/// in flight together with no ordering among themselves. Any transmit error
/// abandons the files still in flight and fails the whole attempt.
async fn upload_all(
    transport: &dyn Transmit,
    source: &dyn FeedbackSource,
    tx: &mpsc::Sender<WorkerEvent>,
    attempt: Uuid,
    submission: &Submission,
) -> Result<Feedback> {
    let week_label = weeks::label_by_id(&submission.week_id);
    let files = &submission.files;
    let first = files.first().ok_or_else(|| anyhow!("no files to upload"))?;

    let progress = Arc::new(Mutex::new(UploadProgress::new(
        files.iter().map(|f| f.size).collect(),
    )));
    publish_pct(tx, attempt, &progress).await;

    let first_payload = upload_one(
        transport,
        tx,
        attempt,
        &progress,
        0,
        &submission.name,
        week_label,
        first,
    )
    .await?;

    let rest = files.iter().enumerate().skip(1).map(|(index, file)| {
        upload_one(
            transport,
            tx,
            attempt,
            &progress,
            index,
            &submission.name,
            week_label,
            file,
        )
    });
    futures::future::try_join_all(rest).await?;

    // Rounding drift must not leave the bar short of full.
    let _ = tx.send(WorkerEvent::Progress { attempt, pct: 100 }).await;

    let summary = summarize_files(files);
    // The first attachment is handed to the feedback source when it ended up
    // as an image, so the model can look at the actual homework.
    let image = first_payload
        .mime_type
        .starts_with("image/")
        .then(|| (first_payload.file_data.as_str(), first_payload.mime_type.as_str()));
    let req = FeedbackRequest {
        name: &submission.name,
        week_label,
        file_summary: &summary,
        image,
    };
    Ok(source.feedback(&req).await)
}

/// Full pipeline for one attachment: read, shrink, encode, transmit.
/// Returns the payload so the caller can reuse the first file's content.
#[allow(clippy::too_many_arguments)]
async fn upload_one(
    transport: &dyn Transmit,
    tx: &mpsc::Sender<WorkerEvent>,
    attempt: Uuid,
    progress: &Arc<Mutex<UploadProgress>>,
    index: usize,
    name: &str,
    week_label: &str,
    file: &AttachedFile,
) -> Result<UploadPayload> {
    let bytes = encode::read_bytes(&file.path).await?;

    // Image shrinking is CPU work; keep it off the async threads.
    let mime = file.mime_type.clone();
    let compressed = tokio::task::spawn_blocking(move || compress::shrink(bytes, &mime)).await?;

    let payload = UploadPayload {
        name: name.to_string(),
        week: week_label.to_string(),
        file_name: file.name.clone(),
        mime_type: compressed.mime_type,
        file_data: encode::to_base64(&compressed.bytes),
    };

    // Simulated progress runs only while the real transmit is in flight; the
    // guard aborts the timer however the call ends.
    let ticker = SimTicker::spawn(tx.clone(), attempt, Arc::clone(progress), index, file.size);
    let sent = transport.send(&payload).await;
    drop(ticker);

    // Success or failure, the slot is pinned to done so the bar never stalls
    // below completion.
    progress.lock().await.finish(index);
    publish_pct(tx, attempt, progress).await;

    sent?;
    tracing::info!("file uploaded: {}", file.name);
    Ok(payload)
}

/// Recompute the weighted percentage and push it to the UI.
async fn publish_pct(
    tx: &mpsc::Sender<WorkerEvent>,
    attempt: Uuid,
    progress: &Arc<Mutex<UploadProgress>>,
) {
    let pct = progress.lock().await.percentage();
    let _ = tx.send(WorkerEvent::Progress { attempt, pct }).await;
}

/// Periodic progress estimator for one in-flight transmit. Aborts its task on
/// drop so the timer never outlives the real network call.
struct SimTicker {
    handle: tokio::task::JoinHandle<()>,
}

impl SimTicker {
    fn spawn(
        tx: mpsc::Sender<WorkerEvent>,
        attempt: Uuid,
        progress: Arc<Mutex<UploadProgress>>,
        index: usize,
        size: u64,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            // Expected duration at the assumed throughput, floored to one
            // tick so empty files cannot divide by zero.
            let expected = (size as f64 / SIM_BYTES_PER_SEC).max(SIM_TICK.as_secs_f64());
            let mut interval = tokio::time::interval(SIM_TICK);
            interval.tick().await;
            loop {
                interval.tick().await;
                let frac = (started.elapsed().as_secs_f64() / expected).min(SIM_CAP);
                let pct = {
                    let mut p = progress.lock().await;
                    p.set_fraction(index, frac);
                    p.percentage()
                };
                let _ = tx.send(WorkerEvent::Progress { attempt, pct }).await;
            }
        });
        Self { handle }
    }
}

impl Drop for SimTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Creates a real file on disk so the pipeline's read step works.
    async fn temp_attachment(name: &str, len: usize) -> AttachedFile {
        let dir = std::env::temp_dir().join(format!("homework-worker-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join(name);
        tokio::fs::write(&path, vec![b'x'; len]).await.unwrap();
        AttachedFile::from_path(&path).unwrap()
    }

    /// Transport that logs start/end markers around a short simulated
    /// network delay, and can fail a specific file.
    struct SequencedTransport {
        log: StdMutex<Vec<String>>,
        fail_file: Option<String>,
    }

    impl SequencedTransport {
        fn new(fail_file: Option<&str>) -> Self {
            Self {
                log: StdMutex::new(Vec::new()),
                fail_file: fail_file.map(str::to_string),
            }
        }
    }

    #[async_trait]
    impl Transmit for SequencedTransport {
        async fn send(&self, payload: &UploadPayload) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("start {}", payload.file_name));
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail_file.as_deref() == Some(payload.file_name.as_str()) {
                return Err(anyhow!("webhook unreachable"));
            }
            self.log
                .lock()
                .unwrap()
                .push(format!("end {}", payload.file_name));
            Ok(())
        }
    }

    /// Transport that records every delivered payload.
    struct RecordingTransport {
        sent: StdMutex<Vec<UploadPayload>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                sent: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transmit for RecordingTransport {
        async fn send(&self, payload: &UploadPayload) -> Result<()> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    /// Deterministic feedback so assertions do not depend on randomness.
    struct StubSource;

    #[async_trait]
    impl FeedbackSource for StubSource {
        async fn feedback(&self, req: &FeedbackRequest<'_>) -> Feedback {
            Feedback {
                message: req.file_summary.to_string(),
                encouragement: "화이팅!".into(),
            }
        }
    }

    /// Drains worker events into a shared vector until the channel closes.
    fn spawn_drain(
        mut rx: mpsc::Receiver<WorkerEvent>,
    ) -> (
        Arc<StdMutex<Vec<WorkerEvent>>>,
        tokio::task::JoinHandle<()>,
    ) {
        let store = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&store);
        let handle = tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                sink.lock().unwrap().push(ev);
            }
        });
        (store, handle)
    }

    fn submission(name: &str, week_id: &str, files: Vec<AttachedFile>) -> Submission {
        Submission {
            name: name.into(),
            week_id: week_id.into(),
            files,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_file_completes_before_the_rest_start() {
        let files = vec![
            temp_attachment("a.bin", 100).await,
            temp_attachment("b.bin", 50).await,
            temp_attachment("c.bin", 30).await,
        ];
        let transport = SequencedTransport::new(None);
        let (tx, rx) = mpsc::channel(64);
        let (events, drain) = spawn_drain(rx);
        let attempt = Uuid::new_v4();

        let fb = upload_all(
            &transport,
            &StubSource,
            &tx,
            attempt,
            &submission("홍길동", "week-1", files),
        )
        .await
        .unwrap();
        drop(tx);
        drain.await.unwrap();

        let log = transport.log.lock().unwrap().clone();
        assert_eq!(log[0], "start a.bin");
        assert_eq!(log[1], "end a.bin");
        assert_eq!(log.len(), 6);

        assert_eq!(fb.message, "a.bin 외 2건");

        let last_pct = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|ev| match ev {
                WorkerEvent::Progress { pct, .. } => Some(*pct),
                _ => None,
            })
            .last();
        assert_eq!(last_pct, Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_carries_week_label_and_encoded_bytes() {
        let files = vec![temp_attachment("note.bin", 5).await];
        let transport = RecordingTransport::new();
        let (tx, rx) = mpsc::channel(64);
        let (_events, drain) = spawn_drain(rx);

        upload_all(
            &transport,
            &StubSource,
            &tx,
            Uuid::new_v4(),
            &submission("홍길동", "week-1", files),
        )
        .await
        .unwrap();
        drop(tx);
        drain.await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "홍길동");
        assert_eq!(sent[0].week, weeks::label_by_id("week-1"));
        assert_eq!(sent[0].file_name, "note.bin");
        assert_eq!(sent[0].file_data, encode::to_base64(b"xxxxx"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transmit_failure_abandons_the_attempt() {
        let files = vec![
            temp_attachment("ok.bin", 10).await,
            temp_attachment("bad.bin", 10).await,
        ];
        let transport = SequencedTransport::new(Some("bad.bin"));
        let (tx, rx) = mpsc::channel(64);
        let (_events, drain) = spawn_drain(rx);

        let err = upload_all(
            &transport,
            &StubSource,
            &tx,
            Uuid::new_v4(),
            &submission("홍길동", "week-2", files),
        )
        .await
        .unwrap_err();
        drop(tx);
        drain.await.unwrap();

        assert!(err.to_string().contains("webhook unreachable"));
        let log = transport.log.lock().unwrap();
        assert!(!log.iter().any(|l| l == "end bad.bin"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_progress_caps_below_completion() {
        // 1 MiB at 0.5 MB/s gives a 2 s estimate; the transmit takes 10 s, so
        // the simulation saturates at the cap long before the call returns.
        let files = vec![temp_attachment("big.bin", 1024 * 1024).await];
        let (tx, rx) = mpsc::channel(256);
        let (events, drain) = spawn_drain(rx);

        // Network delay stretched well past the estimate.
        struct SlowTransport;
        #[async_trait]
        impl Transmit for SlowTransport {
            async fn send(&self, _payload: &UploadPayload) -> Result<()> {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            }
        }

        upload_all(
            &SlowTransport,
            &StubSource,
            &tx,
            Uuid::new_v4(),
            &submission("홍길동", "week-3", files),
        )
        .await
        .unwrap();
        drop(tx);
        drain.await.unwrap();

        let pcts: Vec<u8> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|ev| match ev {
                WorkerEvent::Progress { pct, .. } => Some(*pct),
                _ => None,
            })
            .collect();
        let in_flight_max = pcts.iter().copied().filter(|p| *p < 100).max().unwrap();
        assert_eq!(in_flight_max, 90);
        assert_eq!(*pcts.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_submit_without_endpoint_fails_fast() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ev_tx, mut ev_rx) = mpsc::channel(8);
        tokio::spawn(run(cmd_rx, ev_tx, Config::default()));

        let attempt = Uuid::new_v4();
        cmd_tx
            .send(WorkerCmd::Submit {
                attempt,
                submission: submission("홍길동", "week-1", vec![]),
            })
            .await
            .unwrap();

        match ev_rx.recv().await {
            Some(WorkerEvent::Failed { attempt: a, error }) => {
                assert_eq!(a, attempt);
                assert!(error.contains("script_url"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
