//! Crop panel: aspect-locked rectangle over the adjusted image.
//!
//! The crop rectangle lives in *natural* (full-resolution) pixel
//! space; the overlay renders it with percent positioning so no
//! displayed-size bookkeeping is needed until a drag starts, at which
//! point the rendered size is measured once to convert pointer deltas
//! back to natural pixels.

use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::LdScissors;
use dioxus_free_icons::Icon;
use passfoto_pipeline::geometry::CropRect;
use passfoto_pipeline::types::PixelDimensions;

use crate::components::controls::{action_class, render_slider};

/// DOM id of the crop preview image, measured during drags.
const CROP_IMG_ID: &str = "crop-preview";

/// Smallest selectable crop, as a fraction of the maximum fit.
const MIN_SIZE_FRACTION: f64 = 0.1;

/// One in-progress drag of the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    /// Pointer position at drag start, in client coordinates.
    start: (f64, f64),
    /// Crop origin at drag start, in natural pixels.
    origin: (f64, f64),
    /// Natural pixels per displayed pixel, per axis.
    scale: (f64, f64),
}

/// Props for the [`CropPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CropPanelProps {
    /// Display URL of the crop source image.
    preview: Option<String>,
    /// Natural dimensions of the crop source.
    natural: PixelDimensions,
    /// Current crop rectangle in natural pixel space.
    crop: CropRect,
    /// Target aspect ratio (locked while resizing).
    aspect: f64,
    /// Human-readable size label, e.g. "35x45 mm (UK, Europe, ...)".
    size_label: String,
    /// Exact output dimensions at 300 DPI.
    target: PixelDimensions,
    /// Whether processing is in flight.
    busy: bool,
    /// Fired with every rectangle edit (the session clamps and stores).
    on_crop: EventHandler<CropRect>,
    /// Fired when the user confirms the crop.
    on_confirm: EventHandler<()>,
}

/// Aspect-locked crop editor: drag the selection to move it, resize it
/// with the size slider, confirm to produce the print-ready photo.
#[component]
#[allow(clippy::too_many_lines)]
pub fn CropPanel(props: CropPanelProps) -> Element {
    let mut drag = use_signal(|| Option::<DragState>::None);

    let natural = props.natural;
    let crop = props.crop;
    let aspect = props.aspect;
    let on_crop = props.on_crop;

    // Overlay geometry as percentages of the image box.
    let left = crop.x / f64::from(natural.width) * 100.0;
    let top = crop.y / f64::from(natural.height) * 100.0;
    let width = crop.width / f64::from(natural.width) * 100.0;
    let height = crop.height / f64::from(natural.height) * 100.0;

    // Size slider value: the crop height as a fraction of the largest
    // height that still fits the target aspect inside the image.
    let max_height = f64::from(natural.height).min(f64::from(natural.width) / aspect);
    let size_fraction = (crop.height / max_height).clamp(MIN_SIZE_FRACTION, 1.0);

    let begin_drag = move |evt: PointerEvent| {
        evt.prevent_default();
        let Some((display_width, display_height)) = preview_rect() else {
            return;
        };
        let client = evt.client_coordinates();
        drag.set(Some(DragState {
            start: (client.x, client.y),
            origin: (crop.x, crop.y),
            scale: (
                f64::from(natural.width) / display_width,
                f64::from(natural.height) / display_height,
            ),
        }));
    };

    let move_drag = move |evt: PointerEvent| {
        let Some(state) = drag() else { return };
        let client = evt.client_coordinates();
        let x = (client.x - state.start.0).mul_add(state.scale.0, state.origin.0);
        let y = (client.y - state.start.1).mul_add(state.scale.1, state.origin.1);
        on_crop.call(CropRect::from_pixels(x, y, crop.width, crop.height));
    };

    let end_drag = move |_| drag.set(None);

    let resize = move |fraction: f64| {
        let new_height = max_height * fraction;
        let new_width = new_height * aspect;
        // Keep the selection centered where it was.
        let center_x = crop.x + crop.width / 2.0;
        let center_y = crop.y + crop.height / 2.0;
        on_crop.call(CropRect::from_pixels(
            center_x - new_width / 2.0,
            center_y - new_height / 2.0,
            new_width,
            new_height,
        ));
    };

    rsx! {
        div { class: "space-y-4",
            h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "Crop Photo" }
            p { class: "text-sm text-[var(--text-secondary)]",
                "Position the selection for your {props.size_label}. The person's eyes should sit about two thirds from the bottom."
            }

            if let Some(ref url) = props.preview {
                div {
                    class: "relative inline-block select-none",
                    onpointermove: move_drag,
                    onpointerup: end_drag,
                    onpointerleave: end_drag,

                    img {
                        id: CROP_IMG_ID,
                        src: "{url}",
                        draggable: false,
                        class: "max-w-full max-h-[500px] rounded",
                    }
                    div {
                        class: "absolute border-2 border-[var(--btn-primary)] bg-[var(--btn-primary)]/10 cursor-move",
                        style: "left: {left}%; top: {top}%; width: {width}%; height: {height}%;",
                        onpointerdown: begin_drag,
                    }
                }
            }

            {render_slider(
                "crop-size",
                "Selection Size",
                size_fraction,
                MIN_SIZE_FRACTION,
                1.0,
                0.01,
                2,
                resize,
            )}

            p { class: "text-sm text-[var(--text-secondary)]",
                "Output: {props.target} px at 300 DPI"
            }

            button {
                class: action_class(!props.busy),
                disabled: props.busy,
                onclick: move |_| props.on_confirm.call(()),
                Icon { icon: LdScissors, width: 16, height: 16 }
                if props.busy { "Processing..." } else { "Crop & Process" }
            }
        }
    }
}

/// Rendered (width, height) of the crop preview element, if mounted.
fn preview_rect() -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(CROP_IMG_ID)?;
    let rect = element.get_bounding_client_rect();
    ((rect.width() > 0.0) && (rect.height() > 0.0)).then(|| (rect.width(), rect.height()))
}
