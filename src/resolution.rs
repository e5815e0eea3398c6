/// Result resolution: primary query, landmark fallback, and per-session
/// sequencing of committed envelopes.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::AppError;
use crate::geometry::NaturalImageDimensions;
use crate::postprocess::{extract_detections, Detection, Summary};
use crate::vision::model::{AnnotateImageResponse, Category, Feature};

/// Maximum entries kept per fallback list.
pub const FALLBACK_LIMIT: usize = 6;

/// Anything that can run a single detection feature over an image.
pub trait DetectionBackend: Send + Sync {
    fn annotate(
        &self,
        image: &[u8],
        feature: Feature,
    ) -> impl Future<Output = Result<AnnotateImageResponse, AppError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    Idle,
    Submitted,
    PrimaryPending,
    PrimaryFound,
    PrimaryEmpty,
    FallbackPending,
    FallbackResolved,
    Done,
}

impl ChainState {
    pub fn can_transition_to(self, next: ChainState) -> bool {
        use ChainState::*;
        matches!(
            (self, next),
            (Idle, Submitted)
                | (Submitted, PrimaryPending)
                | (PrimaryPending, PrimaryFound)
                | (PrimaryPending, PrimaryEmpty)
                | (PrimaryFound, Done)
                | (PrimaryEmpty, FallbackPending)
                | (PrimaryEmpty, Done)
                | (FallbackPending, FallbackResolved)
                | (FallbackResolved, Done)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal chain transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: ChainState,
    pub to: ChainState,
}

/// State of one submission's chain, with every state it passed through.
#[derive(Debug, Clone)]
pub struct Chain {
    submission: u64,
    state: ChainState,
    trace: Vec<ChainState>,
}

impl Chain {
    pub fn new(submission: u64) -> Self {
        Self {
            submission,
            state: ChainState::Idle,
            trace: vec![ChainState::Idle],
        }
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn trace(&self) -> &[ChainState] {
        &self.trace
    }

    pub fn advance(&mut self, next: ChainState) -> Result<(), IllegalTransition> {
        if !self.state.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(submission = self.submission, from = ?self.state, to = ?next, "chain transition");
        self.state = next;
        self.trace.push(next);
        Ok(())
    }

    /// Transitions `resolve` drives are always legal; a violation is logged, not fatal.
    fn step(&mut self, next: ChainState) {
        if let Err(e) = self.advance(next) {
            tracing::error!(submission = self.submission, error = %e, "chain out of sequence");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEntry {
    pub description: String,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Fallback {
    pub best_guess_label: Option<String>,
    pub web_entities: Vec<FallbackEntry>,
    pub labels: Vec<FallbackEntry>,
}

/// Outcome of one submission. Replaced wholesale on re-submission.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    pub submission: u64,
    pub category: Category,
    pub natural: NaturalImageDimensions,
    pub primary: Vec<Detection>,
    pub used_fallback: bool,
    pub fallback: Option<Fallback>,
    pub summary: Option<Summary>,
    /// User-visible message when the primary query itself failed.
    pub primary_error: Option<String>,
    pub trace: Vec<ChainState>,
    pub created_at: DateTime<Utc>,
}

/// Runs the chain for one submitted image. Never fails: query errors count as
/// empty results.
pub async fn resolve<B: DetectionBackend>(
    backend: &B,
    image: &[u8],
    category: Category,
    natural: NaturalImageDimensions,
    submission: u64,
) -> ResultEnvelope {
    let mut chain = Chain::new(submission);
    chain.step(ChainState::Submitted);

    chain.step(ChainState::PrimaryPending);
    let (response, primary_error) = match query(backend, image, category.feature()).await {
        Ok(response) => (response, None),
        Err(e) => (AnnotateImageResponse::default(), Some(e.to_string())),
    };
    let (primary, summary) = extract_detections(category, &response, natural);

    let mut fallback = None;
    if !primary.is_empty() {
        chain.step(ChainState::PrimaryFound);
    } else {
        chain.step(ChainState::PrimaryEmpty);
        if category.has_fallback() {
            chain.step(ChainState::FallbackPending);
            fallback = Some(run_fallback(backend, image).await);
            chain.step(ChainState::FallbackResolved);
        }
    }
    chain.step(ChainState::Done);

    tracing::info!(
        submission,
        category = category.segment(),
        detections = primary.len(),
        used_fallback = fallback.is_some(),
        primary_failed = primary_error.is_some(),
        "chain resolved"
    );

    ResultEnvelope {
        submission,
        category,
        natural,
        primary,
        used_fallback: fallback.is_some(),
        fallback,
        summary,
        primary_error,
        trace: chain.trace,
        created_at: Utc::now(),
    }
}

async fn query<B: DetectionBackend>(
    backend: &B,
    image: &[u8],
    feature: Feature,
) -> Result<AnnotateImageResponse, AppError> {
    backend.annotate(image, feature).await.inspect_err(|e| {
        tracing::warn!(?feature, error = %e, "detection query failed; treating as empty");
    })
}

/// Web and label queries run concurrently; both settle before merging.
async fn run_fallback<B: DetectionBackend>(backend: &B, image: &[u8]) -> Fallback {
    let (web, labels) = tokio::join!(
        query(backend, image, Feature::WebDetection),
        query(backend, image, Feature::LabelDetection),
    );
    let web = web.unwrap_or_default();
    let labels = labels.unwrap_or_default();

    let detection = web.web_detection.unwrap_or_default();
    let best_guess_label = detection
        .best_guess_labels
        .into_iter()
        .filter_map(|l| l.label)
        .find(|l| !l.is_empty());

    Fallback {
        best_guess_label,
        web_entities: top_entries(
            detection
                .web_entities
                .into_iter()
                .map(|e| (e.description, e.score)),
        ),
        labels: top_entries(
            labels
                .label_annotations
                .into_iter()
                .map(|l| (l.description, l.score)),
        ),
    }
}

fn top_entries(entries: impl Iterator<Item = (Option<String>, Option<f32>)>) -> Vec<FallbackEntry> {
    let mut entries: Vec<FallbackEntry> = entries
        .filter_map(|(description, score)| {
            Some(FallbackEntry {
                description: description.filter(|d| !d.is_empty())?,
                score: score.unwrap_or(0.0),
            })
        })
        .collect();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(FALLBACK_LIMIT);
    entries
}

/// Sessions kept by default before the least recent one is evicted.
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// Idle time after which a session is forgotten by default.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub session: String,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// A newer submission started after this one; the envelope was dropped.
    Superseded { latest: u64 },
}

struct SessionSlot {
    latest_started: u64,
    committed: Option<Arc<ResultEnvelope>>,
    last_seen: Instant,
}

impl SessionSlot {
    fn committed_submission(&self) -> u64 {
        self.committed.as_ref().map_or(0, |e| e.submission)
    }
}

/// Tracks submissions per page session so only the most recently started
/// chain can commit its envelope.
///
/// Sessions live in an LRU ordered by their last begin or commit. Past
/// `capacity` the least recent one is evicted, and sessions idle longer than
/// the TTL are dropped on the next `begin`. A ticket whose session was
/// evicted can no longer commit.
pub struct SubmissionTracker {
    next_sequence: AtomicU64,
    sessions: RwLock<LruCache<String, SessionSlot>>,
    ttl: Duration,
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL)
    }
}

impl SubmissionTracker {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            next_sequence: AtomicU64::new(1),
            sessions: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub async fn begin(&self, session: &str) -> SubmissionTicket {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(slot) = sessions.get_mut(session) {
            slot.latest_started = slot.latest_started.max(sequence);
            slot.last_seen = now;
        } else {
            let slot = SessionSlot {
                latest_started: sequence,
                committed: None,
                last_seen: now,
            };
            if let Some((evicted, _)) = sessions.push(session.to_string(), slot) {
                tracing::debug!(session = %evicted, "evicted least recent session");
            }
        }

        // The LRU end holds the oldest activity, so expiry stops at the first live slot.
        while let Some((name, slot)) = sessions.peek_lru() {
            if name == session || now.duration_since(slot.last_seen) <= self.ttl {
                break;
            }
            if let Some((expired, _)) = sessions.pop_lru() {
                tracing::debug!(session = %expired, "expired idle session");
            }
        }

        tracing::debug!(session, sequence, "submission started");
        SubmissionTicket {
            session: session.to_string(),
            sequence,
        }
    }

    pub async fn commit(&self, ticket: &SubmissionTicket, envelope: Arc<ResultEnvelope>) -> CommitOutcome {
        let mut sessions = self.sessions.write().await;
        let Some(slot) = sessions.get_mut(&ticket.session) else {
            tracing::info!(
                session = %ticket.session,
                sequence = ticket.sequence,
                "discarding submission for evicted session"
            );
            return CommitOutcome::Superseded { latest: 0 };
        };
        if ticket.sequence != slot.latest_started {
            tracing::info!(
                session = %ticket.session,
                sequence = ticket.sequence,
                latest = slot.latest_started,
                "discarding superseded submission"
            );
            return CommitOutcome::Superseded {
                latest: slot.latest_started,
            };
        }
        slot.committed = Some(envelope);
        slot.last_seen = Instant::now();
        CommitOutcome::Committed
    }

    /// Withdraws a submission that failed before producing an envelope.
    ///
    /// The committed envelope is left alone. If the ticket was still the
    /// latest, the session stops reporting work in flight; older tickets stay
    /// superseded.
    pub async fn abandon(&self, ticket: &SubmissionTicket) {
        let mut sessions = self.sessions.write().await;
        if let Some(slot) = sessions.peek_mut(&ticket.session) {
            if slot.latest_started == ticket.sequence {
                slot.latest_started = slot.committed_submission();
                tracing::debug!(
                    session = %ticket.session,
                    sequence = ticket.sequence,
                    "submission abandoned"
                );
            }
        }
    }

    pub async fn latest(&self, session: &str) -> Option<Arc<ResultEnvelope>> {
        let sessions = self.sessions.read().await;
        sessions.peek(session).and_then(|slot| slot.committed.clone())
    }

    /// Whether the most recent submission for `session` has yet to commit.
    pub async fn in_flight(&self, session: &str) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.peek(session) {
            Some(slot) => slot.committed_submission() != slot.latest_started,
            None => false,
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Canned responses per feature, recording calls and peak concurrency.
    #[derive(Default)]
    struct FakeBackend {
        responses: HashMap<Feature, Result<String, String>>,
        delay: Duration,
        calls: Mutex<Vec<Feature>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl FakeBackend {
        fn with(mut self, feature: Feature, json: &str) -> Self {
            self.responses.insert(feature, Ok(json.to_string()));
            self
        }

        fn failing(mut self, feature: Feature, message: &str) -> Self {
            self.responses.insert(feature, Err(message.to_string()));
            self
        }

        fn calls(&self) -> Vec<Feature> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DetectionBackend for FakeBackend {
        async fn annotate(
            &self,
            _image: &[u8],
            feature: Feature,
        ) -> Result<AnnotateImageResponse, AppError> {
            self.calls.lock().unwrap().push(feature);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            match self.responses.get(&feature) {
                Some(Ok(json)) => Ok(serde_json::from_str(json).unwrap()),
                Some(Err(message)) => Err(AppError::VisionApi(message.clone())),
                None => Ok(AnnotateImageResponse::default()),
            }
        }
    }

    const LANDMARK: &str = r#"{"landmarkAnnotations": [{"description": "Eiffel Tower", "score": 0.91,
        "boundingPoly": {"vertices": [{"x": 10, "y": 10}, {"x": 60, "y": 10}, {"x": 60, "y": 90}, {"x": 10, "y": 90}]}}]}"#;

    fn dims() -> NaturalImageDimensions {
        NaturalImageDimensions::new(100, 100)
    }

    fn web_entities(n: usize) -> String {
        let entities: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"description": "entity {i}", "score": {}}}"#, (i as f32) / 10.0))
            .collect();
        format!(
            r#"{{"webDetection": {{"webEntities": [{}], "bestGuessLabels": [{{"label": "paris"}}]}}}}"#,
            entities.join(",")
        )
    }

    #[test]
    fn legal_transitions() {
        use ChainState::*;
        let mut chain = Chain::new(1);
        for next in [Submitted, PrimaryPending, PrimaryEmpty, FallbackPending, FallbackResolved, Done] {
            chain.advance(next).unwrap();
        }
        assert_eq!(chain.state(), Done);
        assert_eq!(chain.trace().len(), 7);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        use ChainState::*;
        let mut chain = Chain::new(1);
        assert_eq!(
            chain.advance(Done),
            Err(IllegalTransition { from: Idle, to: Done })
        );
        chain.advance(Submitted).unwrap();
        chain.advance(PrimaryPending).unwrap();
        chain.advance(PrimaryFound).unwrap();
        assert!(chain.advance(FallbackPending).is_err());
        chain.advance(Done).unwrap();
        assert!(chain.advance(Done).is_err());
        assert_eq!(chain.state(), Done);
    }

    #[tokio::test]
    async fn found_primary_skips_fallback() {
        let backend = FakeBackend::default().with(Feature::LandmarkDetection, LANDMARK);
        let envelope = resolve(&backend, b"img", Category::Landmarks, dims(), 1).await;
        assert_eq!(backend.calls(), vec![Feature::LandmarkDetection]);
        assert!(!envelope.used_fallback);
        assert!(envelope.fallback.is_none());
        assert_eq!(envelope.primary.len(), 1);
        assert_eq!(
            envelope.trace,
            vec![
                ChainState::Idle,
                ChainState::Submitted,
                ChainState::PrimaryPending,
                ChainState::PrimaryFound,
                ChainState::Done
            ]
        );
    }

    #[tokio::test]
    async fn empty_primary_fires_both_fallbacks_and_keeps_top_six() {
        let backend = FakeBackend::default()
            .with(Feature::WebDetection, &web_entities(10))
            .with(
                Feature::LabelDetection,
                r#"{"labelAnnotations": [{"description": "Sky", "score": 0.7}, {"description": "Tower", "score": 0.95}, {"score": 0.99}]}"#,
            );
        let envelope = resolve(&backend, b"img", Category::Landmarks, dims(), 1).await;

        let mut calls = backend.calls();
        assert_eq!(calls.remove(0), Feature::LandmarkDetection);
        calls.sort_by_key(|f| format!("{f:?}"));
        assert_eq!(calls, vec![Feature::LabelDetection, Feature::WebDetection]);

        assert!(envelope.used_fallback);
        let fallback = envelope.fallback.unwrap();
        assert_eq!(fallback.best_guess_label.as_deref(), Some("paris"));
        assert_eq!(fallback.web_entities.len(), FALLBACK_LIMIT);
        assert_eq!(fallback.web_entities[0].description, "entity 9");
        assert!(fallback
            .web_entities
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert_eq!(
            fallback.labels.iter().map(|l| l.description.as_str()).collect::<Vec<_>>(),
            vec!["Tower", "Sky"]
        );
        assert_eq!(*envelope.trace.last().unwrap(), ChainState::Done);
    }

    #[tokio::test]
    async fn fallback_queries_run_concurrently() {
        let backend = FakeBackend {
            delay: Duration::from_millis(50),
            ..FakeBackend::default()
        };
        resolve(&backend, b"img", Category::Landmarks, dims(), 1).await;
        assert_eq!(backend.calls().len(), 3);
        assert_eq!(backend.max_active.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn primary_failure_still_runs_fallback() {
        let backend = FakeBackend::default()
            .failing(Feature::LandmarkDetection, "quota exceeded")
            .with(Feature::LabelDetection, r#"{"labelAnnotations": [{"description": "Sky", "score": 0.7}]}"#);
        let envelope = resolve(&backend, b"img", Category::Landmarks, dims(), 1).await;
        assert_eq!(
            envelope.primary_error.as_deref(),
            Some("Vision API error: quota exceeded")
        );
        assert!(envelope.used_fallback);
        assert_eq!(envelope.fallback.unwrap().labels.len(), 1);
    }

    #[tokio::test]
    async fn fallback_failure_keeps_the_other_half() {
        let backend = FakeBackend::default()
            .failing(Feature::WebDetection, "boom")
            .with(Feature::LabelDetection, r#"{"labelAnnotations": [{"description": "Sky", "score": 0.7}]}"#);
        let envelope = resolve(&backend, b"img", Category::Landmarks, dims(), 1).await;
        let fallback = envelope.fallback.unwrap();
        assert!(fallback.web_entities.is_empty());
        assert!(fallback.best_guess_label.is_none());
        assert_eq!(fallback.labels.len(), 1);
        assert!(envelope.primary_error.is_none());
    }

    #[tokio::test]
    async fn categories_without_fallback_finish_after_empty_primary() {
        let backend = FakeBackend::default();
        let envelope = resolve(&backend, b"img", Category::Faces, dims(), 1).await;
        assert_eq!(backend.calls(), vec![Feature::FaceDetection]);
        assert!(!envelope.used_fallback);
        assert_eq!(
            &envelope.trace[envelope.trace.len() - 2..],
            &[ChainState::PrimaryEmpty, ChainState::Done]
        );
    }

    fn envelope(submission: u64) -> Arc<ResultEnvelope> {
        Arc::new(ResultEnvelope {
            submission,
            category: Category::Landmarks,
            natural: dims(),
            primary: Vec::new(),
            used_fallback: false,
            fallback: None,
            summary: None,
            primary_error: None,
            trace: Vec::new(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn stale_submission_never_overwrites_newer() {
        let tracker = SubmissionTracker::default();
        let a = tracker.begin("page").await;
        let b = tracker.begin("page").await;
        assert!(b.sequence > a.sequence);

        assert_eq!(
            tracker.commit(&b, envelope(b.sequence)).await,
            CommitOutcome::Committed
        );
        assert_eq!(
            tracker.commit(&a, envelope(a.sequence)).await,
            CommitOutcome::Superseded { latest: b.sequence }
        );
        assert_eq!(tracker.latest("page").await.unwrap().submission, b.sequence);
    }

    #[tokio::test]
    async fn stale_submission_is_dropped_even_before_newer_commits() {
        let tracker = SubmissionTracker::default();
        let a = tracker.begin("page").await;
        let b = tracker.begin("page").await;
        assert!(matches!(
            tracker.commit(&a, envelope(a.sequence)).await,
            CommitOutcome::Superseded { .. }
        ));
        assert!(tracker.latest("page").await.is_none());
        assert!(tracker.in_flight("page").await);

        tracker.commit(&b, envelope(b.sequence)).await;
        assert!(!tracker.in_flight("page").await);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let tracker = SubmissionTracker::default();
        let a = tracker.begin("left").await;
        let b = tracker.begin("right").await;
        assert_eq!(tracker.commit(&a, envelope(a.sequence)).await, CommitOutcome::Committed);
        assert_eq!(tracker.commit(&b, envelope(b.sequence)).await, CommitOutcome::Committed);
        assert!(!tracker.in_flight("left").await);
        assert!(!tracker.in_flight("unknown").await);
    }

    #[tokio::test]
    async fn abandoned_submission_keeps_committed_envelope() {
        let tracker = SubmissionTracker::default();
        let good = tracker.begin("page").await;
        tracker.commit(&good, envelope(good.sequence)).await;

        let broken = tracker.begin("page").await;
        assert!(tracker.in_flight("page").await);
        tracker.abandon(&broken).await;

        assert!(!tracker.in_flight("page").await);
        assert_eq!(tracker.latest("page").await.unwrap().submission, good.sequence);
        assert!(matches!(
            tracker.commit(&broken, envelope(broken.sequence)).await,
            CommitOutcome::Superseded { .. }
        ));
    }

    #[tokio::test]
    async fn abandoning_an_older_ticket_leaves_the_newer_one_alone() {
        let tracker = SubmissionTracker::default();
        let a = tracker.begin("page").await;
        let b = tracker.begin("page").await;
        tracker.abandon(&a).await;
        assert!(tracker.in_flight("page").await);
        assert_eq!(tracker.commit(&b, envelope(b.sequence)).await, CommitOutcome::Committed);
    }

    #[tokio::test]
    async fn sessions_beyond_capacity_are_evicted_least_recent_first() {
        let tracker = SubmissionTracker::new(3, DEFAULT_SESSION_TTL);
        let mut tickets = Vec::new();
        for i in 0..10 {
            tickets.push(tracker.begin(&format!("page-{i}")).await);
        }
        assert_eq!(tracker.session_count().await, 3);

        assert!(matches!(
            tracker.commit(&tickets[0], envelope(tickets[0].sequence)).await,
            CommitOutcome::Superseded { latest: 0 }
        ));
        assert_eq!(tracker.session_count().await, 3);
        for ticket in &tickets[7..] {
            assert_eq!(
                tracker.commit(ticket, envelope(ticket.sequence)).await,
                CommitOutcome::Committed
            );
        }
    }

    #[tokio::test]
    async fn resubmitting_keeps_a_session_alive_under_capacity() {
        let tracker = SubmissionTracker::new(2, DEFAULT_SESSION_TTL);
        tracker.begin("a").await;
        tracker.begin("b").await;
        tracker.begin("a").await;
        tracker.begin("c").await;
        assert_eq!(tracker.session_count().await, 2);
        assert!(tracker.in_flight("a").await);
        assert!(!tracker.in_flight("b").await);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_expire() {
        let tracker = SubmissionTracker::new(100, Duration::from_secs(60));
        let old = tracker.begin("old").await;
        tracker.commit(&old, envelope(old.sequence)).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        tracker.begin("fresh").await;

        assert_eq!(tracker.session_count().await, 1);
        assert!(tracker.latest("old").await.is_none());
    }
}
