use std::rc::Rc;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use passfoto_io::components::{
    AdjustPanel, BackgroundPanel, ColorPick, CropPanel, ExportPanel, FileUpload, StepIndicator,
};
use passfoto_io::remote::HttpImageOps;
use passfoto_io::{console, raster};
use passfoto_pipeline::adjust::AdjustmentParams;
use passfoto_pipeline::background::BackgroundSpec;
use passfoto_pipeline::coalescer::AdjustmentCoalescer;
use passfoto_pipeline::diagnostics::{OpTimer, Operation};
use passfoto_pipeline::geometry::CropRect;
use passfoto_pipeline::service::ImageOps;
use passfoto_pipeline::session::{
    ArtifactKind, PipelineStage, Session, SessionError, StageArtifact,
};
use passfoto_pipeline::types::{DisplaySize, OutputFormat, PixelDimensions, PHOTO_SIZES};
use passfoto_pipeline::{crop_to_target, natural_dimensions, pick_color};

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the pipeline session and the adjustment coalescer as Dioxus
/// signals and wires the stage panels to them. Remote work follows one
/// pattern throughout: snapshot the inputs, run the call in a spawned
/// task, and commit the output (or surface the error) when it
/// resolves — the session is never borrowed across an await.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let mut session = use_signal(Session::new);
    let mut coalescer = use_signal(AdjustmentCoalescer::new);
    let mut error = use_signal(|| Option::<String>::None);
    let service = use_hook(HttpImageOps::default);

    // --- Upload handler ---
    let on_upload = move |(bytes, name): (Vec<u8>, String)| {
        // Previews of the previous session become unreachable now.
        revoke_all_displays(&session.peek());
        let url = raster::bytes_to_blob_url_with_mime(&bytes, raster::mime_for_filename(&name));
        coalescer.write().reset();
        error.set(None);
        let mut s = session.write();
        s.load_original(bytes);
        if let Ok(url) = url {
            attach_display(&mut s, ArtifactKind::Original, url);
        }
    };

    // --- Stage 1 action: remove background ---
    let segment_service = service.clone();
    let on_remove_background = move |_| {
        if session.peek().is_busy() {
            return;
        }
        let Some(source) = share_artifact(&session.peek(), ArtifactKind::Original) else {
            error.set(Some(SessionError::NoImageSelected.to_string()));
            return;
        };
        let format = session.peek().format();
        let svc = segment_service.clone();
        error.set(None);
        spawn(async move {
            session.write().begin_work();
            let timer = OpTimer::start(Operation::Segment, source.len());
            let result = svc.segment(&source, format).await;
            session.write().finish_work();
            match result {
                Ok(bytes) => {
                    console::report(&timer.finish(bytes.len()));
                    commit(
                        &mut session,
                        &mut error,
                        format,
                        bytes,
                        Session::commit_cutout,
                        ArtifactKind::BackgroundRemoved,
                    );
                }
                Err(e) => {
                    console::report_failure("segment", &e.to_string());
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    // --- Stage 2 action: apply background ---
    let composite_service = service.clone();
    let on_apply_background = move |()| {
        if session.peek().is_busy() {
            return;
        }
        let Some(source) = share_artifact(&session.peek(), ArtifactKind::BackgroundRemoved) else {
            error.set(Some(SessionError::NotSegmented.to_string()));
            return;
        };
        // Read the spec at call time: a background uploaded a moment
        // ago must be the one transmitted.
        let background = session.peek().background().clone();
        let format = session.peek().format();
        let svc = composite_service.clone();
        error.set(None);
        spawn(async move {
            session.write().begin_work();
            let timer = OpTimer::start(Operation::Composite, source.len());
            let result = svc.composite(&source, &background, format).await;
            session.write().finish_work();
            match result {
                Ok(bytes) => {
                    console::report(&timer.finish(bytes.len()));
                    coalescer.write().reset();
                    commit(
                        &mut session,
                        &mut error,
                        format,
                        bytes,
                        Session::commit_composite,
                        ArtifactKind::Composited,
                    );
                }
                Err(e) => {
                    console::report_failure("composite", &e.to_string());
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    // --- Stage 2: eyedropper pick ---
    let on_pick = move |pick: ColorPick| {
        let source = {
            let s = session.peek();
            s.artifact(ArtifactKind::Composited)
                .or_else(|| s.artifact(ArtifactKind::BackgroundRemoved))
                .map(StageArtifact::share_bytes)
        };
        let Some(bytes) = source else { return };
        let displayed = DisplaySize::new(pick.display_width, pick.display_height);
        match pick_color(&bytes, displayed, pick.x, pick.y) {
            Ok(color) => session.write().set_background(BackgroundSpec::Color(color)),
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    // --- Stage 3: coalesced adjustments ---
    let adjust_service = service.clone();
    let on_adjust_change = move |params: AdjustmentParams| {
        session.write().set_adjustments(params);
        // Fresh snapshot per schedule call; the trailing-edge window
        // replaces any pending set instead of queueing a second call.
        let ticket = coalescer.write().schedule(session.peek().adjustments());
        let window = coalescer.peek().window();
        let svc = adjust_service.clone();
        spawn(async move {
            #[allow(clippy::cast_possible_truncation)]
            TimeoutFuture::new(window.as_millis() as u32).await;
            let Some(request) = coalescer.write().fire(ticket) else {
                // Superseded inside the window; a later timer owns it.
                return;
            };
            let Some(source) = share_artifact(&session.peek(), ArtifactKind::Composited) else {
                return;
            };
            let format = session.peek().format();
            session.write().begin_work();
            let timer = OpTimer::start(Operation::Adjust, source.len()).with_seq(request.seq);
            let result = svc.adjust(&source, request.params, format).await;
            session.write().finish_work();
            match result {
                Ok(bytes) => {
                    // Admit strictly by sequence: a slow response to an
                    // earlier request is dropped on arrival.
                    if coalescer.write().try_apply(request.seq) {
                        console::report(&timer.finish(bytes.len()));
                        commit(
                            &mut session,
                            &mut error,
                            format,
                            bytes,
                            Session::commit_adjusted,
                            ArtifactKind::Adjusted,
                        );
                    }
                }
                Err(e) => {
                    console::report_failure("adjust", &e.to_string());
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    // --- Stage 3 -> 4 ---
    let on_continue_to_crop = move |()| {
        if session.peek().is_busy() {
            return;
        }
        if let Err(e) = session.write().enter_crop() {
            error.set(Some(e.to_string()));
            return;
        }
        error.set(None);
        prepare_crop(&mut session, &mut error);
    };

    // --- Step navigation ---
    let on_stage_select = move |stage: PipelineStage| {
        match session.write().go_to(stage) {
            Ok(()) => error.set(None),
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        }
        if stage == PipelineStage::Crop {
            prepare_crop(&mut session, &mut error);
        }
    };

    // --- Stage 4: crop editing + processing ---
    let on_crop_edit = move |rect: CropRect| {
        session.write().set_crop(rect);
    };

    let on_crop_confirm = move |()| {
        if session.peek().is_busy() {
            return;
        }
        let snapshot = {
            let s = session.peek();
            (
                s.crop_source().map(StageArtifact::share_bytes),
                s.crop().copied(),
                s.crop_natural(),
                s.target_dimensions(),
                s.format(),
            )
        };
        let (Some(source), Some(crop), Some(natural), target, format) = snapshot else {
            error.set(Some(SessionError::CropNotReady.to_string()));
            return;
        };
        error.set(None);
        spawn(async move {
            session.write().begin_work();
            // Yield so the busy state paints before the synchronous
            // decode/resample work blocks the thread.
            TimeoutFuture::new(0).await;
            let timer = OpTimer::start(Operation::Crop, source.len());
            let displayed = DisplaySize::new(f64::from(natural.width), f64::from(natural.height));
            let result = crop_to_target(&source, &crop, displayed, target, format);
            session.write().finish_work();
            match result {
                Ok(bytes) => {
                    console::report(&timer.finish(bytes.len()));
                    commit(
                        &mut session,
                        &mut error,
                        format,
                        bytes,
                        Session::commit_cropped,
                        ArtifactKind::Cropped,
                    );
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    // --- Configuration handlers ---
    let on_size_change = move |e: FormEvent| {
        if let Some(size) = e.value().parse::<usize>().ok().and_then(|i| PHOTO_SIZES.get(i)) {
            session.write().set_photo_size(*size);
        }
    };
    let on_format_change = move |e: FormEvent| {
        let format = if e.value() == "jpeg" {
            OutputFormat::Jpeg
        } else {
            OutputFormat::Png
        };
        session.write().set_format(format);
    };
    let on_basename_change = move |name: String| {
        session.write().set_export_name(name);
    };

    // --- View-state snapshot ---
    let view = {
        let s = session.read();
        ViewState::capture(&s)
    };
    let error_message = error();

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/theme.css") }
        link { rel: "preconnect", href: "https://fonts.googleapis.com" }
        link {
            rel: "stylesheet",
            href: "https://fonts.googleapis.com/css2?family=Noto+Sans:wght@400;600&display=swap",
        }

        div { class: "min-h-screen flex flex-col",
            header { class: "px-6 py-4 border-b border-[var(--border)]",
                h1 { class: "text-2xl font-semibold", "passfoto" }
                p { class: "text-[var(--muted)] text-sm",
                    "Print-ready passport and visa photos at 300 DPI"
                }
            }

            div { class: "flex-1 flex flex-col gap-4 p-6 max-w-3xl mx-auto w-full",
                StepIndicator {
                    current: view.stage,
                    reachable: view.reachable.clone(),
                    on_select: on_stage_select,
                }

                if let Some(ref err) = error_message {
                    div { class: "bg-[var(--error-bg)] border border-[var(--error-border)] rounded p-3",
                        p { class: "text-[var(--text-error)] text-sm", "{err}" }
                    }
                }

                match view.stage {
                    PipelineStage::Upload => rsx! {
                        div { class: "space-y-4",
                            // Photo size
                            div { class: "flex flex-col gap-1",
                                label { r#for: "size-select",
                                    class: "text-sm font-medium text-[var(--text-heading)]",
                                    "Passport Photo Size"
                                }
                                select {
                                    id: "size-select",
                                    class: "px-2 py-1 rounded border border-[var(--border)] bg-[var(--surface)] text-sm",
                                    onchange: on_size_change,
                                    for (index, size) in PHOTO_SIZES.iter().enumerate() {
                                        option {
                                            value: "{index}",
                                            selected: index == view.size_index,
                                            "{size.label}"
                                        }
                                    }
                                }
                            }

                            FileUpload { on_upload: on_upload }

                            if let Some(ref url) = view.original_preview {
                                div { class: "flex justify-center",
                                    img { src: "{url}", class: "max-h-64 rounded shadow-md" }
                                }
                            }

                            // Output format
                            div { class: "flex flex-col gap-1",
                                label { r#for: "format-select",
                                    class: "text-sm font-medium text-[var(--text-heading)]",
                                    "Output Format"
                                }
                                select {
                                    id: "format-select",
                                    class: "px-2 py-1 rounded border border-[var(--border)] bg-[var(--surface)] text-sm",
                                    onchange: on_format_change,
                                    option { value: "png", selected: view.format == OutputFormat::Png, "PNG" }
                                    option { value: "jpeg", selected: view.format == OutputFormat::Jpeg, "JPEG" }
                                }
                            }

                            button {
                                class: if view.can_segment {
                                    "px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium cursor-pointer"
                                } else {
                                    "px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-not-allowed"
                                },
                                disabled: !view.can_segment,
                                onclick: on_remove_background,
                                if view.busy { "Processing..." } else { "Remove Background" }
                            }
                        }
                    },

                    PipelineStage::Background => rsx! {
                        BackgroundPanel {
                            spec: view.background.clone(),
                            preview: view.background_preview.clone(),
                            busy: view.busy,
                            on_change: move |spec| session.write().set_background(spec),
                            on_apply: on_apply_background,
                            on_pick: on_pick,
                        }
                    },

                    PipelineStage::Adjust => rsx! {
                        AdjustPanel {
                            params: view.adjustments,
                            preview: view.adjust_preview.clone(),
                            busy: view.busy,
                            on_change: on_adjust_change,
                            on_continue: on_continue_to_crop,
                        }
                    },

                    PipelineStage::Crop => rsx! {
                        if let Some((natural, crop)) = view.crop_state {
                            CropPanel {
                                preview: view.crop_preview.clone(),
                                natural: natural,
                                crop: crop,
                                aspect: view.aspect,
                                size_label: view.size_label.clone(),
                                target: view.target,
                                busy: view.busy,
                                on_crop: on_crop_edit,
                                on_confirm: on_crop_confirm,
                            }
                        }

                        if view.result.is_some() {
                            div { class: "bg-[var(--surface)] rounded-lg border border-[var(--border)] p-4",
                                ExportPanel {
                                    result: view.result.clone(),
                                    preview: view.result_preview.clone(),
                                    basename: view.basename.clone(),
                                    download_name: view.download_name.clone(),
                                    format: view.format,
                                    on_basename_change: on_basename_change,
                                }
                            }
                        }
                    },
                }
            }
        }
    }
}

/// Everything the view reads from the session, captured in one place
/// so no borrow outlives the snapshot.
struct ViewState {
    stage: PipelineStage,
    busy: bool,
    reachable: Vec<PipelineStage>,
    format: OutputFormat,
    size_index: usize,
    size_label: String,
    aspect: f64,
    target: PixelDimensions,
    background: BackgroundSpec,
    adjustments: AdjustmentParams,
    can_segment: bool,
    original_preview: Option<String>,
    background_preview: Option<String>,
    adjust_preview: Option<String>,
    crop_preview: Option<String>,
    crop_state: Option<(PixelDimensions, CropRect)>,
    result: Option<Rc<Vec<u8>>>,
    result_preview: Option<String>,
    basename: String,
    download_name: String,
}

impl ViewState {
    fn capture(s: &Session) -> Self {
        let display_of = |kind: ArtifactKind| {
            s.artifact(kind)
                .and_then(StageArtifact::display)
                .map(str::to_owned)
        };
        let reachable = PipelineStage::ALL
            .into_iter()
            .filter(|&stage| match stage {
                PipelineStage::Upload => true,
                PipelineStage::Background => s.artifact(ArtifactKind::BackgroundRemoved).is_some(),
                PipelineStage::Adjust | PipelineStage::Crop => {
                    s.artifact(ArtifactKind::Composited).is_some()
                }
            })
            .collect();
        let size_index = PHOTO_SIZES
            .iter()
            .position(|size| size == s.photo_size())
            .unwrap_or(0);

        Self {
            stage: s.stage(),
            busy: s.is_busy(),
            reachable,
            format: s.format(),
            size_index,
            size_label: s.photo_size().label.to_owned(),
            aspect: s.aspect_ratio(),
            target: s.target_dimensions(),
            background: s.background().clone(),
            adjustments: s.adjustments(),
            can_segment: s.artifact(ArtifactKind::Original).is_some() && !s.is_busy(),
            original_preview: display_of(ArtifactKind::Original),
            background_preview: display_of(ArtifactKind::Composited)
                .or_else(|| display_of(ArtifactKind::BackgroundRemoved)),
            adjust_preview: display_of(ArtifactKind::Adjusted)
                .or_else(|| display_of(ArtifactKind::Composited)),
            crop_preview: s
                .crop_source()
                .and_then(StageArtifact::display)
                .map(str::to_owned),
            crop_state: s.crop_natural().zip(s.crop().copied()),
            result: s.artifact(ArtifactKind::Cropped).map(StageArtifact::share_bytes),
            result_preview: display_of(ArtifactKind::Cropped),
            basename: s.export_name().to_owned(),
            download_name: s.export_filename(),
        }
    }
}

/// Shared bytes of an artifact slot, if committed.
fn share_artifact(s: &Session, kind: ArtifactKind) -> Option<Rc<Vec<u8>>> {
    s.artifact(kind).map(StageArtifact::share_bytes)
}

/// Commit stage output and attach its preview URL, surfacing any
/// stage-guard error inline.
fn commit(
    session: &mut Signal<Session>,
    error: &mut Signal<Option<String>>,
    format: OutputFormat,
    bytes: Vec<u8>,
    apply: fn(&mut Session, Vec<u8>) -> Result<(), SessionError>,
    kind: ArtifactKind,
) {
    let url = raster::bytes_to_blob_url(&bytes, format);
    let mut s = session.write();
    match apply(&mut s, bytes) {
        Ok(()) => {
            if let Ok(url) = url {
                attach_display(&mut s, kind, url);
            }
        }
        Err(e) => error.set(Some(e.to_string())),
    }
}

/// Attach a preview URL to an artifact, revoking the one it replaces.
fn attach_display(s: &mut Session, kind: ArtifactKind, url: String) {
    if let Some(artifact) = s.artifact_mut(kind) {
        if let Some(old) = artifact.set_display(url) {
            raster::revoke_blob_url(&old);
        }
    }
}

/// Revoke every preview URL the session currently holds.
fn revoke_all_displays(s: &Session) {
    for kind in ArtifactKind::ALL {
        if let Some(url) = s.artifact(kind).and_then(StageArtifact::display) {
            raster::revoke_blob_url(url);
        }
    }
}

/// Probe the crop source's natural size and make the session's crop
/// rectangle valid for it (preserved if the image is unchanged,
/// recomputed otherwise).
fn prepare_crop(session: &mut Signal<Session>, error: &mut Signal<Option<String>>) {
    let Some(source) = session.peek().crop_source().map(StageArtifact::share_bytes) else {
        error.set(Some(SessionError::NotComposited.to_string()));
        return;
    };
    match natural_dimensions(&source) {
        Ok(natural) => {
            session.write().prepare_crop(natural);
        }
        Err(e) => error.set(Some(e.to_string())),
    }
}
