//! The four-stage pipeline session.
//!
//! All per-session mutable state — current stage, the artifact
//! produced by each completed stage, the live adjustment parameters,
//! background spec, crop state, and the busy indicator — lives in one
//! [`Session`] value so the cross-stage invariants are enforced in one
//! place:
//!
//! - each stage's output is the next stage's required input;
//! - completing a stage never invalidates earlier artifacts;
//! - re-committing an earlier stage discards everything derived from
//!   its previous output;
//! - replacing the source image discards the whole session.
//!
//! Remote orchestration stays outside: callers run the
//! [`ImageOps`](crate::service::ImageOps) operation first and commit
//! its output here, so a failed call leaves the session untouched and
//! fully retryable.

use std::fmt;
use std::rc::Rc;

use crate::adjust::AdjustmentParams;
use crate::background::BackgroundSpec;
use crate::geometry::{self, CropRect};
use crate::types::{OutputFormat, PhysicalSize, PixelDimensions, PHOTO_SIZES};
use crate::units;

/// Fallback export filename when the user clears the input.
pub const DEFAULT_EXPORT_NAME: &str = "passport-photo";

/// The four user-facing pipeline stages, strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    /// Stage 1: choose a source image and remove its background.
    Upload,
    /// Stage 2: composite a new background behind the cutout.
    Background,
    /// Stage 3: tonal adjustment.
    Adjust,
    /// Stage 4: crop to the selected physical size and export.
    Crop,
}

impl PipelineStage {
    /// All stages in pipeline order.
    pub const ALL: [Self; 4] = [Self::Upload, Self::Background, Self::Adjust, Self::Crop];

    /// One-based stage number shown in the step indicator.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Upload => 1,
            Self::Background => 2,
            Self::Adjust => 3,
            Self::Crop => 4,
        }
    }

    /// Display label for the stage.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Background => "Background",
            Self::Adjust => "Adjust",
            Self::Crop => "Crop",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five artifact slots a session can hold.
///
/// There is one more artifact kind than there are stages: the Upload
/// stage produces both the original image and (via segmentation) the
/// background-removed cutout that gates entry to the Background stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The unmodified uploaded image.
    Original,
    /// Segmentation output with a transparent background.
    BackgroundRemoved,
    /// Cutout composited over the chosen background.
    Composited,
    /// Tonally adjusted composite.
    Adjusted,
    /// Final print-ready crop.
    Cropped,
}

impl ArtifactKind {
    /// All artifact slots in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Original,
        Self::BackgroundRemoved,
        Self::Composited,
        Self::Adjusted,
        Self::Cropped,
    ];
}

/// One committed stage output: opaque image bytes plus an optional
/// display reference (a Blob URL in the browser).
///
/// Bytes are reference-counted so in-flight remote calls can hold a
/// cheap handle while the session stays the single owner of record.
#[derive(Debug, Clone, PartialEq)]
pub struct StageArtifact {
    bytes: Rc<Vec<u8>>,
    display: Option<String>,
}

impl StageArtifact {
    /// Wrap freshly produced image bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Rc::new(bytes),
            display: None,
        }
    }

    /// The raw image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A shared handle to the bytes, for passing into async calls.
    #[must_use]
    pub fn share_bytes(&self) -> Rc<Vec<u8>> {
        Rc::clone(&self.bytes)
    }

    /// The display reference, if one has been attached.
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Attach a display reference, returning the previous one so the
    /// caller can revoke it.
    pub fn set_display(&mut self, url: String) -> Option<String> {
        self.display.replace(url)
    }
}

/// User-input and stage-ordering errors. The stage never advances on
/// these; they are surfaced inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No source image has been selected yet.
    #[error("no image selected")]
    NoImageSelected,

    /// Background removal has not completed for the current source.
    #[error("the background has not been removed yet")]
    NotSegmented,

    /// No background has been composited yet.
    #[error("a background has not been applied yet")]
    NotComposited,

    /// The crop rectangle has not been confirmed.
    #[error("the crop has not been completed yet")]
    CropNotReady,

    /// The requested stage has no artifact to show.
    #[error("the {0} stage has no result to return to")]
    StageUnavailable(PipelineStage),
}

/// All mutable state for one editing session.
#[derive(Debug)]
pub struct Session {
    stage: PipelineStage,
    format: OutputFormat,
    photo_size: PhysicalSize,
    export_name: String,

    original: Option<StageArtifact>,
    cutout: Option<StageArtifact>,
    composited: Option<StageArtifact>,
    adjusted: Option<StageArtifact>,
    cropped: Option<StageArtifact>,

    adjustments: AdjustmentParams,
    background: BackgroundSpec,
    crop: Option<CropRect>,
    crop_natural: Option<PixelDimensions>,

    /// Number of remote calls currently in flight.
    in_flight: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An empty session at the Upload stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Upload,
            format: OutputFormat::default(),
            photo_size: PHOTO_SIZES[0],
            export_name: DEFAULT_EXPORT_NAME.to_owned(),
            original: None,
            cutout: None,
            composited: None,
            adjusted: None,
            cropped: None,
            adjustments: AdjustmentParams::default(),
            background: BackgroundSpec::default(),
            crop: None,
            crop_natural: None,
            in_flight: 0,
        }
    }

    // --- configuration ---

    /// The current stage.
    #[must_use]
    pub const fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// The session output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Set the output format. Offered in the UI only before
    /// segmentation; the chosen value is threaded through every
    /// subsequent remote call and the export filename.
    pub const fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// The selected physical photo size.
    #[must_use]
    pub const fn photo_size(&self) -> &PhysicalSize {
        &self.photo_size
    }

    /// Select a physical photo size. Changing the size changes the
    /// target aspect ratio, so any crop state is discarded and will be
    /// recomputed on the next Crop entry.
    pub fn set_photo_size(&mut self, size: PhysicalSize) {
        if size != self.photo_size {
            self.photo_size = size;
            self.crop = None;
            self.cropped = None;
        }
    }

    /// Target aspect ratio (width over height).
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.photo_size.aspect_ratio()
    }

    /// Target print dimensions in pixels at 300 DPI.
    #[must_use]
    pub fn target_dimensions(&self) -> PixelDimensions {
        units::target_dimensions(&self.photo_size)
    }

    /// The export base name as typed by the user.
    #[must_use]
    pub fn export_name(&self) -> &str {
        &self.export_name
    }

    /// Set the export base name (may be empty; a fallback applies at
    /// filename time).
    pub fn set_export_name(&mut self, name: String) {
        self.export_name = name;
    }

    /// The full export filename: trimmed base name (or the default if
    /// empty) plus the session format extension.
    #[must_use]
    pub fn export_filename(&self) -> String {
        let base = self.export_name.trim();
        let base = if base.is_empty() {
            DEFAULT_EXPORT_NAME
        } else {
            base
        };
        format!("{base}.{}", self.format.extension())
    }

    // --- busy tracking ---

    /// Whether any remote call (or the local crop) is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Record the start of an operation.
    pub const fn begin_work(&mut self) {
        self.in_flight += 1;
    }

    /// Record the end of an operation (success or failure).
    pub const fn finish_work(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    // --- adjustment & background state ---

    /// The live adjustment parameters.
    #[must_use]
    pub const fn adjustments(&self) -> AdjustmentParams {
        self.adjustments
    }

    /// Update the live adjustment parameters (clamped into range).
    /// This records intent only; transmission is the coalescer's job.
    pub fn set_adjustments(&mut self, params: AdjustmentParams) {
        self.adjustments = AdjustmentParams::new(params.brightness, params.contrast, params.saturation);
    }

    /// The current background spec.
    #[must_use]
    pub const fn background(&self) -> &BackgroundSpec {
        &self.background
    }

    /// Replace the background spec. Compositing always reads this live
    /// value at call time, so a newly uploaded background image takes
    /// effect on the very next Apply.
    pub fn set_background(&mut self, background: BackgroundSpec) {
        self.background = background;
    }

    // --- artifacts ---

    /// The artifact in a given slot, if committed.
    #[must_use]
    pub const fn artifact(&self, kind: ArtifactKind) -> Option<&StageArtifact> {
        self.slot(kind).as_ref()
    }

    /// Mutable access to an artifact slot (e.g. to attach a display
    /// reference).
    pub const fn artifact_mut(&mut self, kind: ArtifactKind) -> Option<&mut StageArtifact> {
        self.slot_mut(kind).as_mut()
    }

    /// The image the Adjust stage previews and the Crop stage cuts
    /// from: the adjusted artifact when present, otherwise the
    /// composite (neutral adjustments need no remote round-trip).
    #[must_use]
    pub const fn crop_source(&self) -> Option<&StageArtifact> {
        match &self.adjusted {
            Some(artifact) => Some(artifact),
            None => self.composited.as_ref(),
        }
    }

    const fn slot(&self, kind: ArtifactKind) -> &Option<StageArtifact> {
        match kind {
            ArtifactKind::Original => &self.original,
            ArtifactKind::BackgroundRemoved => &self.cutout,
            ArtifactKind::Composited => &self.composited,
            ArtifactKind::Adjusted => &self.adjusted,
            ArtifactKind::Cropped => &self.cropped,
        }
    }

    const fn slot_mut(&mut self, kind: ArtifactKind) -> &mut Option<StageArtifact> {
        match kind {
            ArtifactKind::Original => &mut self.original,
            ArtifactKind::BackgroundRemoved => &mut self.cutout,
            ArtifactKind::Composited => &mut self.composited,
            ArtifactKind::Adjusted => &mut self.adjusted,
            ArtifactKind::Cropped => &mut self.cropped,
        }
    }

    // --- stage transitions ---

    /// Replace the source image, resetting the whole session back to
    /// the Upload stage. Every downstream artifact, the adjustment
    /// parameters, the background spec, and the crop state are
    /// discarded unconditionally. Output format, photo size, and
    /// export name are user configuration and survive.
    pub fn load_original(&mut self, bytes: Vec<u8>) {
        self.stage = PipelineStage::Upload;
        self.original = Some(StageArtifact::new(bytes));
        self.cutout = None;
        self.composited = None;
        self.adjusted = None;
        self.cropped = None;
        self.adjustments = AdjustmentParams::default();
        self.background = BackgroundSpec::default();
        self.crop = None;
        self.crop_natural = None;
    }

    /// Commit a successful segmentation and advance to the Background
    /// stage. Artifacts derived from any previous cutout are
    /// discarded.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoImageSelected`] when no source image is
    /// loaded.
    pub fn commit_cutout(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        if self.original.is_none() {
            return Err(SessionError::NoImageSelected);
        }
        self.cutout = Some(StageArtifact::new(bytes));
        self.composited = None;
        self.adjusted = None;
        self.cropped = None;
        self.crop = None;
        self.crop_natural = None;
        self.stage = PipelineStage::Background;
        Ok(())
    }

    /// Commit a successful composite and advance to the Adjust stage.
    /// Adjustments reset to neutral so the new composite is previewed
    /// unmodified; anything derived from a previous composite is
    /// discarded.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotSegmented`] when no cutout exists.
    pub fn commit_composite(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        if self.cutout.is_none() {
            return Err(SessionError::NotSegmented);
        }
        self.composited = Some(StageArtifact::new(bytes));
        self.adjusted = None;
        self.cropped = None;
        self.adjustments = AdjustmentParams::default();
        self.crop = None;
        self.crop_natural = None;
        self.stage = PipelineStage::Adjust;
        Ok(())
    }

    /// Commit a successful adjustment. The crop source image changed,
    /// so any crop rectangle is invalidated and will be recomputed on
    /// the next Crop entry.
    ///
    /// The live [`adjustments`](Self::adjustments) are untouched: they
    /// record the user's newest intent, which may already be ahead of
    /// the response being committed.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotComposited`] when no composite exists.
    pub fn commit_adjusted(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        if self.composited.is_none() {
            return Err(SessionError::NotComposited);
        }
        self.adjusted = Some(StageArtifact::new(bytes));
        self.cropped = None;
        self.crop = None;
        self.crop_natural = None;
        Ok(())
    }

    /// Commit the final cropped artifact.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotComposited`] without a crop source,
    /// [`SessionError::CropNotReady`] without a confirmed crop
    /// rectangle.
    pub fn commit_cropped(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        if self.crop_source().is_none() {
            return Err(SessionError::NotComposited);
        }
        if self.crop.is_none() {
            return Err(SessionError::CropNotReady);
        }
        self.cropped = Some(StageArtifact::new(bytes));
        Ok(())
    }

    /// Advance to the Crop stage. Requires at least the composited
    /// artifact; passing through Adjust untouched is fine because its
    /// defaults are neutral.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotComposited`] when no composite exists.
    pub fn enter_crop(&mut self) -> Result<(), SessionError> {
        if self.composited.is_none() {
            return Err(SessionError::NotComposited);
        }
        self.stage = PipelineStage::Crop;
        Ok(())
    }

    /// Navigate to a stage whose guard artifact already exists.
    /// Navigation never discards artifacts — returning to Adjust after
    /// visiting Crop leaves the crop state intact.
    ///
    /// # Errors
    ///
    /// [`SessionError::StageUnavailable`] when the stage's guard
    /// artifact is missing.
    pub fn go_to(&mut self, stage: PipelineStage) -> Result<(), SessionError> {
        let available = match stage {
            PipelineStage::Upload => true,
            PipelineStage::Background => self.cutout.is_some(),
            PipelineStage::Adjust | PipelineStage::Crop => self.composited.is_some(),
        };
        if !available {
            return Err(SessionError::StageUnavailable(stage));
        }
        self.stage = stage;
        Ok(())
    }

    // --- crop state ---

    /// The current crop rectangle, if one exists.
    #[must_use]
    pub const fn crop(&self) -> Option<&CropRect> {
        self.crop.as_ref()
    }

    /// Natural dimensions of the crop source, once probed.
    #[must_use]
    pub const fn crop_natural(&self) -> Option<PixelDimensions> {
        self.crop_natural
    }

    /// Record the crop source's natural dimensions and return a valid
    /// crop rectangle: the preserved one (re-clamped) when the source
    /// has not changed, otherwise a fresh centered initial crop for
    /// the target aspect ratio.
    pub fn prepare_crop(&mut self, natural: PixelDimensions) -> CropRect {
        if self.crop_natural != Some(natural) {
            self.crop = None;
        }
        self.crop_natural = Some(natural);
        let rect = self.crop.map_or_else(
            || geometry::initial_crop(natural, self.aspect_ratio()),
            |rect| geometry::clamp_to_bounds(&rect, natural),
        );
        self.crop = Some(rect);
        rect
    }

    /// Store a user-edited crop rectangle, clamped to the source
    /// bounds. Returns the clamped rectangle actually stored.
    pub fn set_crop(&mut self, rect: CropRect) -> CropRect {
        let clamped = self
            .crop_natural
            .map_or(rect, |natural| geometry::clamp_to_bounds(&rect, natural));
        self.crop = Some(clamped);
        clamped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::CropRect;

    fn bytes(tag: u8) -> Vec<u8> {
        vec![tag; 4]
    }

    /// Drive a fresh session through segment + composite commits.
    fn session_at_adjust() -> Session {
        let mut session = Session::new();
        session.load_original(bytes(1));
        session.commit_cutout(bytes(2)).unwrap();
        session.commit_composite(bytes(3)).unwrap();
        session
    }

    // --- stage ordering ---

    #[test]
    fn stages_are_strictly_ordered() {
        let numbers: Vec<u8> = PipelineStage::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(PipelineStage::Upload < PipelineStage::Crop);
    }

    #[test]
    fn new_session_starts_at_upload() {
        let session = Session::new();
        assert_eq!(session.stage(), PipelineStage::Upload);
        assert!(session.artifact(ArtifactKind::Original).is_none());
        assert!(!session.is_busy());
    }

    // --- forward guards ---

    #[test]
    fn cutout_requires_a_source_image() {
        let mut session = Session::new();
        assert_eq!(
            session.commit_cutout(bytes(2)),
            Err(SessionError::NoImageSelected),
        );
        assert_eq!(session.stage(), PipelineStage::Upload);
    }

    #[test]
    fn composite_requires_a_cutout() {
        let mut session = Session::new();
        session.load_original(bytes(1));
        assert_eq!(
            session.commit_composite(bytes(3)),
            Err(SessionError::NotSegmented),
        );
    }

    #[test]
    fn crop_entry_requires_a_composite() {
        let mut session = Session::new();
        session.load_original(bytes(1));
        session.commit_cutout(bytes(2)).unwrap();
        assert_eq!(session.enter_crop(), Err(SessionError::NotComposited));
        session.commit_composite(bytes(3)).unwrap();
        assert_eq!(session.enter_crop(), Ok(()));
        assert_eq!(session.stage(), PipelineStage::Crop);
    }

    #[test]
    fn successful_commits_advance_stages_in_order() {
        let mut session = Session::new();
        session.load_original(bytes(1));
        assert_eq!(session.stage(), PipelineStage::Upload);
        session.commit_cutout(bytes(2)).unwrap();
        assert_eq!(session.stage(), PipelineStage::Background);
        session.commit_composite(bytes(3)).unwrap();
        assert_eq!(session.stage(), PipelineStage::Adjust);
    }

    // --- artifact retention ---

    #[test]
    fn completing_a_stage_keeps_earlier_artifacts_addressable() {
        let session = session_at_adjust();
        assert!(session.artifact(ArtifactKind::Original).is_some());
        assert!(session.artifact(ArtifactKind::BackgroundRemoved).is_some());
        assert!(session.artifact(ArtifactKind::Composited).is_some());
    }

    #[test]
    fn adjustment_is_optional_for_cropping() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        // No adjusted artifact: the composite is the crop source.
        let source = session.crop_source().unwrap();
        assert_eq!(source.bytes(), bytes(3).as_slice());
    }

    #[test]
    fn adjusted_artifact_becomes_the_crop_source() {
        let mut session = session_at_adjust();
        session
            .commit_adjusted(bytes(4))
            .unwrap();
        assert_eq!(session.crop_source().unwrap().bytes(), bytes(4).as_slice());
    }

    // --- reset semantics ---

    #[test]
    fn new_source_image_resets_everything() {
        let mut session = session_at_adjust();
        session
            .commit_adjusted(bytes(4))
            .unwrap();
        session.enter_crop().unwrap();
        session.prepare_crop(PixelDimensions::new(400, 400));
        session.commit_cropped(bytes(5)).unwrap();
        assert_eq!(session.stage(), PipelineStage::Crop);

        session.load_original(bytes(9));

        assert_eq!(session.stage(), PipelineStage::Upload);
        assert!(session.artifact(ArtifactKind::BackgroundRemoved).is_none());
        assert!(session.artifact(ArtifactKind::Composited).is_none());
        assert!(session.artifact(ArtifactKind::Adjusted).is_none());
        assert!(session.artifact(ArtifactKind::Cropped).is_none());
        assert!(session.crop().is_none());
        assert!(session.adjustments().is_neutral());
        assert_eq!(*session.background(), BackgroundSpec::default());
        // Stages 2-4 are unreachable until their artifacts regenerate.
        assert_eq!(
            session.go_to(PipelineStage::Background),
            Err(SessionError::StageUnavailable(PipelineStage::Background)),
        );
        assert_eq!(
            session.go_to(PipelineStage::Crop),
            Err(SessionError::StageUnavailable(PipelineStage::Crop)),
        );
    }

    #[test]
    fn recommitting_a_cutout_discards_derived_artifacts() {
        let mut session = session_at_adjust();
        session
            .commit_adjusted(bytes(4))
            .unwrap();
        session.commit_cutout(bytes(7)).unwrap();
        assert!(session.artifact(ArtifactKind::Composited).is_none());
        assert!(session.artifact(ArtifactKind::Adjusted).is_none());
        assert_eq!(session.stage(), PipelineStage::Background);
    }

    #[test]
    fn new_composite_resets_adjustments_to_neutral() {
        let mut session = session_at_adjust();
        session.set_adjustments(AdjustmentParams::new(40, 2.0, 0.7));
        session.commit_composite(bytes(6)).unwrap();
        assert!(session.adjustments().is_neutral());
        assert!(session.artifact(ArtifactKind::Adjusted).is_none());
    }

    // --- backward navigation ---

    #[test]
    fn backward_navigation_preserves_later_artifacts() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        session.prepare_crop(PixelDimensions::new(500, 400));
        session.commit_cropped(bytes(5)).unwrap();

        session.go_to(PipelineStage::Background).unwrap();
        assert_eq!(session.stage(), PipelineStage::Background);
        assert!(session.artifact(ArtifactKind::Composited).is_some());
        assert!(session.artifact(ArtifactKind::Cropped).is_some());
    }

    #[test]
    fn revisiting_crop_preserves_the_rectangle() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        let natural = PixelDimensions::new(800, 600);
        session.prepare_crop(natural);
        let edited = session.set_crop(CropRect::from_pixels(10.0, 20.0, 300.0, 300.0));

        session.go_to(PipelineStage::Adjust).unwrap();
        session.go_to(PipelineStage::Crop).unwrap();
        assert_eq!(session.prepare_crop(natural), edited);
    }

    #[test]
    fn crop_rect_is_recomputed_when_adjusted_image_changes() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        session.prepare_crop(PixelDimensions::new(800, 600));
        session.set_crop(CropRect::from_pixels(1.0, 2.0, 300.0, 300.0));

        session.go_to(PipelineStage::Adjust).unwrap();
        session
            .commit_adjusted(bytes(4))
            .unwrap();
        assert!(session.crop().is_none());

        // Next Crop entry recomputes a centered initial crop.
        let natural = PixelDimensions::new(800, 600);
        let rect = session.prepare_crop(natural);
        assert_eq!(rect, geometry::initial_crop(natural, session.aspect_ratio()));
    }

    #[test]
    fn changing_photo_size_invalidates_the_crop() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        session.prepare_crop(PixelDimensions::new(800, 600));
        assert!(session.crop().is_some());

        session.set_photo_size(PHOTO_SIZES[1]);
        assert!(session.crop().is_none());
    }

    // --- crop state ---

    #[test]
    fn prepare_crop_produces_initial_rect_for_target_aspect() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        let natural = PixelDimensions::new(1200, 900);
        let rect = session.prepare_crop(natural);
        assert!(rect.matches_aspect(session.aspect_ratio()));
    }

    #[test]
    fn set_crop_clamps_to_source_bounds() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        session.prepare_crop(PixelDimensions::new(400, 400));
        let stored = session.set_crop(CropRect::from_pixels(380.0, 0.0, 100.0, 100.0));
        assert!((stored.x - 300.0).abs() < 1e-9);
        assert!((stored.width - 100.0).abs() < 1e-9);
    }

    #[test]
    fn commit_cropped_requires_a_confirmed_rectangle() {
        let mut session = session_at_adjust();
        session.enter_crop().unwrap();
        assert_eq!(session.commit_cropped(bytes(5)), Err(SessionError::CropNotReady));
        session.prepare_crop(PixelDimensions::new(400, 400));
        assert_eq!(session.commit_cropped(bytes(5)), Ok(()));
        assert!(session.artifact(ArtifactKind::Cropped).is_some());
    }

    // --- errors stay local ---

    #[test]
    fn failed_commit_leaves_existing_artifacts_valid() {
        let mut session = Session::new();
        session.load_original(bytes(1));
        session.commit_cutout(bytes(2)).unwrap();
        // A later-stage error (adjusting before compositing) must not
        // disturb the artifacts committed so far.
        let err = session.commit_adjusted(bytes(4));
        assert_eq!(err, Err(SessionError::NotComposited));
        assert!(session.artifact(ArtifactKind::BackgroundRemoved).is_some());
        assert_eq!(session.stage(), PipelineStage::Background);
    }

    // --- configuration ---

    #[test]
    fn export_filename_applies_fallback_and_extension() {
        let mut session = Session::new();
        assert_eq!(session.export_filename(), "passport-photo.png");
        session.set_export_name("  ".to_owned());
        assert_eq!(session.export_filename(), "passport-photo.png");
        session.set_export_name("visa-application".to_owned());
        session.set_format(OutputFormat::Jpeg);
        assert_eq!(session.export_filename(), "visa-application.jpeg");
    }

    #[test]
    fn busy_flag_tracks_nested_calls() {
        let mut session = Session::new();
        session.begin_work();
        session.begin_work();
        assert!(session.is_busy());
        session.finish_work();
        assert!(session.is_busy());
        session.finish_work();
        assert!(!session.is_busy());
        // Unbalanced finish never underflows.
        session.finish_work();
        assert!(!session.is_busy());
    }

    #[test]
    fn target_dimensions_follow_the_selected_size() {
        let mut session = Session::new();
        assert_eq!(session.target_dimensions(), PixelDimensions::new(600, 600));
        session.set_photo_size(PHOTO_SIZES[1]);
        assert_eq!(session.target_dimensions(), PixelDimensions::new(413, 532));
    }

    #[test]
    fn display_reference_can_be_attached_and_replaced() {
        let mut session = Session::new();
        session.load_original(bytes(1));
        let artifact = session.artifact_mut(ArtifactKind::Original).unwrap();
        assert_eq!(artifact.set_display("blob:a".to_owned()), None);
        assert_eq!(
            artifact.set_display("blob:b".to_owned()),
            Some("blob:a".to_owned()),
        );
        assert_eq!(
            session.artifact(ArtifactKind::Original).unwrap().display(),
            Some("blob:b"),
        );
    }
}
