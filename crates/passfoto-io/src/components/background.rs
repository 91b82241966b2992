//! Background composition panel: solid color or positioned image.

use std::rc::Rc;

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{LdPaintbrush, LdPipette};
use dioxus_free_icons::Icon;
use passfoto_pipeline::background::{
    BackgroundImage, BackgroundSpec, HexColor, BACKGROUND_PRESETS, BG_OFFSET_RANGE, BG_SCALE_RANGE,
};

use crate::components::controls::{action_class, render_radio, render_slider};

/// DOM id of the preview image, used to resolve eyedropper clicks.
const PREVIEW_IMG_ID: &str = "background-preview";

/// An eyedropper click on the preview: position and rendered size, in
/// CSS pixels. The application maps it to a natural pixel and samples
/// the color there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPick {
    /// Click x within the preview element.
    pub x: f64,
    /// Click y within the preview element.
    pub y: f64,
    /// Rendered width of the preview element.
    pub display_width: f64,
    /// Rendered height of the preview element.
    pub display_height: f64,
}

/// Props for the [`BackgroundPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct BackgroundPanelProps {
    /// The session's current background spec.
    spec: BackgroundSpec,
    /// Display URL of the image being previewed (latest composite, or
    /// the cutout before the first Apply).
    preview: Option<String>,
    /// Whether a remote call is in flight (disables Apply).
    busy: bool,
    /// Fired on every spec edit (color, image, placement).
    on_change: EventHandler<BackgroundSpec>,
    /// Fired when the user clicks Apply.
    on_apply: EventHandler<()>,
    /// Fired when the user eyedropper-clicks the preview.
    on_pick: EventHandler<ColorPick>,
}

/// Background chooser: preset colors, a custom color, an eyedropper
/// that samples the preview, or an uploaded image with scale/position
/// controls. Nothing is transmitted until Apply; compositing always
/// reads the spec as it stands at that moment.
#[component]
#[allow(clippy::too_many_lines)]
pub fn BackgroundPanel(props: BackgroundPanelProps) -> Element {
    let spec = props.spec.clone();
    let (current_color, current_image) = match &spec {
        BackgroundSpec::Color(color) => (*color, None),
        BackgroundSpec::Image(image) => (HexColor::WHITE, Some(image.clone())),
    };

    let mut picking = use_signal(|| false);
    // Which radio is selected. Tracked locally because the user can
    // switch to "Image" before any background has been uploaded.
    let mut image_mode = use_signal(|| current_image.is_some());
    // The last color and image chosen survive toggling between modes.
    let mut last_color = use_signal(|| current_color);
    let mut stored_image = use_signal(|| Option::<Rc<Vec<u8>>>::None);
    let mut upload_error = use_signal(|| Option::<String>::None);

    let on_change = props.on_change;
    let on_pick = props.on_pick;

    // Route color edits through one place so the remembered color
    // stays in sync with what the session holds.
    let mut set_color = move |color: HexColor| {
        last_color.set(color);
        on_change.call(BackgroundSpec::Color(color));
    };

    let handle_bg_upload = move |evt: FormEvent| async move {
        let files: Vec<FileData> = evt.files();
        let Some(file) = files.first() else { return };
        match file.read_bytes().await {
            Ok(bytes) => {
                let bytes = Rc::new(bytes.to_vec());
                stored_image.set(Some(Rc::clone(&bytes)));
                upload_error.set(None);
                image_mode.set(true);
                on_change.call(BackgroundSpec::Image(BackgroundImage::new(
                    bytes, 1.0, 0.0, 0.0,
                )));
            }
            Err(e) => upload_error.set(Some(format!("Failed to read file: {e}"))),
        }
    };

    let handle_preview_click = move |evt: MouseEvent| {
        if !picking() {
            return;
        }
        let point = evt.element_coordinates();
        // The rendered size comes from the DOM: the displayed image is
        // responsive, so its CSS size is only known at click time.
        let Some(rect) = preview_rect() else { return };
        picking.set(false);
        on_pick.call(ColorPick {
            x: point.x,
            y: point.y,
            display_width: rect.0,
            display_height: rect.1,
        });
    };

    rsx! {
        div { class: "space-y-4",
            h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "Change Background" }
            p { class: "text-sm text-[var(--text-secondary)]",
                "Choose a background color or upload an image to place behind the cutout."
            }

            // Preview
            if let Some(ref url) = props.preview {
                div { class: "bg-[var(--surface)] border border-[var(--border)] rounded-lg p-4 flex justify-center",
                    img {
                        id: PREVIEW_IMG_ID,
                        src: "{url}",
                        class: if picking() { "max-h-64 cursor-crosshair" } else { "max-h-64" },
                        onclick: handle_preview_click,
                    }
                }
            }

            // Background type
            div { class: "flex gap-4",
                {render_radio("bg-color-type", "background-type", "Solid Color", !image_mode(), {
                    move |()| {
                        let mut picking = picking;
                        let mut image_mode = image_mode;
                        picking.set(false);
                        image_mode.set(false);
                        on_change.call(BackgroundSpec::Color(last_color()));
                    }
                })}
                {render_radio("bg-image-type", "background-type", "Image", image_mode(), {
                    move |()| {
                        let mut picking = picking;
                        let mut image_mode = image_mode;
                        picking.set(false);
                        image_mode.set(true);
                        // Restore the previously uploaded background,
                        // if there is one; otherwise the spec changes
                        // only once an image is uploaded.
                        if let Some(bytes) = stored_image() {
                            on_change.call(BackgroundSpec::Image(BackgroundImage::new(
                                bytes, 1.0, 0.0, 0.0,
                            )));
                        }
                    }
                })}
            }

            if image_mode() {
                // Placement controls, once a background image exists.
                if let Some(placement) = current_image.clone() {
                    div { class: "space-y-2",
                        {render_slider(
                            "bg-scale",
                            "Scale",
                            f64::from(placement.scale),
                            f64::from(*BG_SCALE_RANGE.start()),
                            f64::from(*BG_SCALE_RANGE.end()),
                            0.1,
                            1,
                            {
                                let placement = placement.clone();
                                move |v: f64| {
                                    #[allow(clippy::cast_possible_truncation)]
                                    let scale = v as f32;
                                    on_change.call(BackgroundSpec::Image(BackgroundImage::new(
                                        Rc::clone(&placement.bytes),
                                        scale,
                                        placement.offset_x,
                                        placement.offset_y,
                                    )));
                                }
                            },
                        )}
                        {render_slider(
                            "bg-offset-x",
                            "Horizontal Position",
                            f64::from(placement.offset_x),
                            f64::from(*BG_OFFSET_RANGE.start()),
                            f64::from(*BG_OFFSET_RANGE.end()),
                            0.1,
                            1,
                            {
                                let placement = placement.clone();
                                move |v: f64| {
                                    #[allow(clippy::cast_possible_truncation)]
                                    let offset_x = v as f32;
                                    on_change.call(BackgroundSpec::Image(BackgroundImage::new(
                                        Rc::clone(&placement.bytes),
                                        placement.scale,
                                        offset_x,
                                        placement.offset_y,
                                    )));
                                }
                            },
                        )}
                        {render_slider(
                            "bg-offset-y",
                            "Vertical Position",
                            f64::from(placement.offset_y),
                            f64::from(*BG_OFFSET_RANGE.start()),
                            f64::from(*BG_OFFSET_RANGE.end()),
                            0.1,
                            1,
                            {
                                let placement = placement.clone();
                                move |v: f64| {
                                    #[allow(clippy::cast_possible_truncation)]
                                    let offset_y = v as f32;
                                    on_change.call(BackgroundSpec::Image(BackgroundImage::new(
                                        Rc::clone(&placement.bytes),
                                        placement.scale,
                                        placement.offset_x,
                                        offset_y,
                                    )));
                                }
                            },
                        )}
                    }
                }

                // Background image upload
                if let Some(ref err) = upload_error() {
                    p { class: "text-[var(--text-error)] text-sm", "{err}" }
                }
                label {
                    class: "inline-block px-4 py-2 bg-[var(--surface-active)] hover:bg-[var(--surface)] rounded cursor-pointer text-sm text-[var(--text)] border border-dashed border-[var(--border-muted)]",
                    input {
                        r#type: "file",
                        accept: ".png,.jpg,.jpeg,.bmp,.webp",
                        class: "hidden",
                        onchange: handle_bg_upload,
                    }
                    "Upload background image"
                }
            } else {
                // Color presets
                div { class: "flex flex-wrap gap-2",
                    for (name, color) in BACKGROUND_PRESETS {
                        button {
                            key: "{name}",
                            title: "{name}",
                            class: if color == current_color {
                                "h-8 w-8 rounded-full ring-2 ring-offset-2 ring-[var(--btn-primary)]"
                            } else {
                                "h-8 w-8 rounded-full"
                            },
                            style: "background-color: {color}",
                            onclick: move |_| set_color(color),
                        }
                    }
                }

                // Custom color + eyedropper
                div { class: "flex items-center gap-3",
                    input {
                        r#type: "color",
                        value: "{current_color}",
                        class: "h-8 w-8 p-0 border-0",
                        oninput: move |e| {
                            if let Ok(color) = e.value().parse::<HexColor>() {
                                set_color(color);
                            }
                        },
                    }
                    span { class: "text-sm text-[var(--text-secondary)]", "{current_color}" }
                    button {
                        class: "inline-flex items-center gap-1 px-3 py-1.5 text-sm font-medium rounded text-[var(--btn-primary)] bg-[var(--surface-active)]",
                        onclick: move |_| picking.set(!picking()),
                        Icon { icon: LdPipette, width: 14, height: 14 }
                        if picking() { "Cancel picking" } else { "Pick color from image" }
                    }
                }
            }

            // Apply
            button {
                class: action_class(!props.busy),
                disabled: props.busy,
                onclick: move |_| props.on_apply.call(()),
                Icon { icon: LdPaintbrush, width: 16, height: 16 }
                if props.busy { "Processing..." } else { "Apply Background" }
            }
        }
    }
}

/// Rendered (width, height) of the preview image element, if mounted.
fn preview_rect() -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(PREVIEW_IMG_ID)?;
    let rect = element.get_bounding_client_rect();
    Some((rect.width(), rect.height()))
}
