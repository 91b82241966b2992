//! End-to-end session flows against a mock remote service.
//!
//! These tests drive the same orchestration the app performs — run a
//! remote operation, then commit its output into the session — with an
//! in-memory [`ImageOps`] implementation, covering the behaviors that
//! span modules: retry after failure, the fresh-background contract,
//! and out-of-order adjustment responses.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::cell::RefCell;
use std::rc::Rc;

use passfoto_pipeline::adjust::AdjustmentParams;
use passfoto_pipeline::background::{BackgroundImage, BackgroundSpec, HexColor};
use passfoto_pipeline::coalescer::AdjustmentCoalescer;
use passfoto_pipeline::service::{ImageOps, RemoteError};
use passfoto_pipeline::session::{ArtifactKind, PipelineStage, Session};
use passfoto_pipeline::types::OutputFormat;

/// A scripted in-memory stand-in for the remote service.
///
/// Records every composite's background spec and can be told to fail
/// the next call with a given status.
#[derive(Default)]
struct MockService {
    fail_next: RefCell<Option<u16>>,
    composited_backgrounds: RefCell<Vec<BackgroundSpec>>,
    calls: RefCell<Vec<&'static str>>,
}

impl MockService {
    fn fail_next_with(&self, status: u16) {
        *self.fail_next.borrow_mut() = Some(status);
    }

    fn take_failure(&self) -> Option<RemoteError> {
        self.fail_next.borrow_mut().take().map(|status| RemoteError::Status {
            status,
            message: "injected failure".to_owned(),
        })
    }
}

impl ImageOps for MockService {
    async fn segment(&self, image: &[u8], _format: OutputFormat) -> Result<Vec<u8>, RemoteError> {
        self.calls.borrow_mut().push("segment");
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok([b"cut:", image].concat())
    }

    async fn composite(
        &self,
        image: &[u8],
        background: &BackgroundSpec,
        _format: OutputFormat,
    ) -> Result<Vec<u8>, RemoteError> {
        self.calls.borrow_mut().push("composite");
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.composited_backgrounds.borrow_mut().push(background.clone());
        Ok([b"comp:", image].concat())
    }

    async fn adjust(
        &self,
        image: &[u8],
        params: AdjustmentParams,
        _format: OutputFormat,
    ) -> Result<Vec<u8>, RemoteError> {
        self.calls.borrow_mut().push("adjust");
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let tag = format!("adj{}:", params.brightness);
        Ok([tag.as_bytes(), image].concat())
    }
}

/// Run segmentation for the current source and commit the result,
/// the way the app's upload handler does.
async fn segment_and_commit(session: &mut Session, service: &MockService) -> Result<(), RemoteError> {
    let source = session
        .artifact(ArtifactKind::Original)
        .map(|artifact| artifact.share_bytes())
        .unwrap();
    session.begin_work();
    let result = service.segment(&source, session.format()).await;
    session.finish_work();
    let bytes = result?;
    session.commit_cutout(bytes).unwrap();
    Ok(())
}

/// Composite against the session's *current* background spec.
async fn composite_and_commit(session: &mut Session, service: &MockService) -> Result<(), RemoteError> {
    let cutout = session
        .artifact(ArtifactKind::BackgroundRemoved)
        .map(|artifact| artifact.share_bytes())
        .unwrap();
    let background = session.background().clone();
    session.begin_work();
    let result = service.composite(&cutout, &background, session.format()).await;
    session.finish_work();
    let bytes = result?;
    session.commit_composite(bytes).unwrap();
    Ok(())
}

#[tokio::test]
async fn happy_path_reaches_adjust_with_all_artifacts() {
    let service = MockService::default();
    let mut session = Session::new();
    session.load_original(vec![1, 2, 3]);

    segment_and_commit(&mut session, &service).await.unwrap();
    composite_and_commit(&mut session, &service).await.unwrap();

    assert_eq!(session.stage(), PipelineStage::Adjust);
    assert!(session.artifact(ArtifactKind::Original).is_some());
    assert!(session.artifact(ArtifactKind::BackgroundRemoved).is_some());
    assert!(session.artifact(ArtifactKind::Composited).is_some());
    assert!(!session.is_busy());
    assert_eq!(service.calls.borrow().as_slice(), ["segment", "composite"]);
}

#[tokio::test]
async fn segment_failure_keeps_session_at_upload_and_is_retryable() {
    let service = MockService::default();
    let mut session = Session::new();
    session.load_original(vec![1]);

    service.fail_next_with(503);
    let err = segment_and_commit(&mut session, &service).await;
    assert!(matches!(err, Err(RemoteError::Status { status: 503, .. })));
    assert_eq!(session.stage(), PipelineStage::Upload);
    assert!(session.artifact(ArtifactKind::BackgroundRemoved).is_none());
    assert!(!session.is_busy(), "busy flag must clear on failure");

    // The same operation retried in full succeeds.
    segment_and_commit(&mut session, &service).await.unwrap();
    assert_eq!(session.stage(), PipelineStage::Background);
}

#[tokio::test]
async fn composite_failure_preserves_the_previous_composite() {
    let service = MockService::default();
    let mut session = Session::new();
    session.load_original(vec![1]);
    segment_and_commit(&mut session, &service).await.unwrap();
    composite_and_commit(&mut session, &service).await.unwrap();
    let first = session
        .artifact(ArtifactKind::Composited)
        .unwrap()
        .bytes()
        .to_vec();

    session.go_to(PipelineStage::Background).unwrap();
    service.fail_next_with(500);
    let err = composite_and_commit(&mut session, &service).await;
    assert!(err.is_err());
    assert_eq!(
        session.artifact(ArtifactKind::Composited).unwrap().bytes(),
        first.as_slice(),
        "a failed composite must not clobber the committed artifact",
    );
}

#[tokio::test]
async fn composite_always_sends_the_latest_background() {
    let service = MockService::default();
    let mut session = Session::new();
    session.load_original(vec![1]);
    segment_and_commit(&mut session, &service).await.unwrap();

    // The user picks a color, then uploads a background image right
    // before hitting Apply: the image must be what gets transmitted.
    session.set_background(BackgroundSpec::Color(HexColor::rgb(0x02, 0x84, 0xc7)));
    session.set_background(BackgroundSpec::Image(BackgroundImage::new(
        Rc::new(vec![9, 9, 9]),
        1.2,
        0.0,
        -0.5,
    )));
    composite_and_commit(&mut session, &service).await.unwrap();

    let sent = service.composited_backgrounds.borrow();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        BackgroundSpec::Image(image) => assert_eq!(*image.bytes, vec![9, 9, 9]),
        BackgroundSpec::Color(_) => panic!("stale background spec was transmitted"),
    }
}

#[tokio::test]
async fn out_of_order_adjust_responses_leave_the_newest_applied() {
    let service = MockService::default();
    let mut session = Session::new();
    session.load_original(vec![1]);
    segment_and_commit(&mut session, &service).await.unwrap();
    composite_and_commit(&mut session, &service).await.unwrap();

    let mut coalescer = AdjustmentCoalescer::new();
    let source = session.crop_source().unwrap().share_bytes();

    // Two settled windows produce two dispatched requests; the live
    // session parameters track the latest intent as the app does.
    session.set_adjustments(AdjustmentParams::new(5, 1.0, 1.0));
    let older_ticket = coalescer.schedule(session.adjustments());
    let older = coalescer.fire(older_ticket).unwrap();
    session.set_adjustments(AdjustmentParams::new(6, 1.0, 1.0));
    let newer_ticket = coalescer.schedule(session.adjustments());
    let newer = coalescer.fire(newer_ticket).unwrap();

    let older_response = service
        .adjust(&source, older.params, session.format())
        .await
        .unwrap();
    let newer_response = service
        .adjust(&source, newer.params, session.format())
        .await
        .unwrap();

    // The newer response resolves first; the older one arrives late.
    if coalescer.try_apply(newer.seq) {
        session.commit_adjusted(newer_response).unwrap();
    }
    if coalescer.try_apply(older.seq) {
        session.commit_adjusted(older_response).unwrap();
    }

    let applied = session.artifact(ArtifactKind::Adjusted).unwrap();
    assert!(applied.bytes().starts_with(b"adj6:"), "stale response overwrote the preview");
    assert_eq!(session.adjustments(), AdjustmentParams::new(6, 1.0, 1.0));
}
