//! Tonal adjustment panel: brightness, contrast, saturation sliders.

use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{LdRefreshCw, LdScissors};
use dioxus_free_icons::Icon;
use passfoto_pipeline::adjust::{
    AdjustmentParams, BRIGHTNESS_RANGE, CONTRAST_RANGE, SATURATION_RANGE,
};

use crate::components::controls::{action_class, render_slider};

/// Props for the [`AdjustPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct AdjustPanelProps {
    /// The live adjustment parameters.
    params: AdjustmentParams,
    /// Display URL of the image being previewed (latest adjusted
    /// result, or the composite before any adjustment lands).
    preview: Option<String>,
    /// Whether a stage-advancing call is in flight.
    busy: bool,
    /// Fired on every slider movement with the full parameter set.
    /// Transmission is coalesced by the caller; this only records
    /// intent.
    on_change: EventHandler<AdjustmentParams>,
    /// Fired when the user continues to the Crop stage.
    on_continue: EventHandler<()>,
}

/// Slider panel for tonal correction. Every movement reports the full
/// parameter snapshot; the application's coalescer collapses the
/// stream into at most one remote call per settling window.
#[component]
pub fn AdjustPanel(props: AdjustPanelProps) -> Element {
    let params = props.params;
    let on_change = props.on_change;

    rsx! {
        div { class: "space-y-4",
            h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "Adjust Photo" }
            p { class: "text-sm text-[var(--text-secondary)]",
                "Fine-tune the photo. Leaving everything neutral is fine — the composite passes through unmodified."
            }

            if let Some(ref url) = props.preview {
                div { class: "bg-[var(--surface)] border border-[var(--border)] rounded-lg p-4 flex justify-center",
                    img { src: "{url}", class: "max-h-64" }
                }
            }

            div { class: "space-y-2",
                {render_slider(
                    "brightness",
                    "Brightness",
                    f64::from(params.brightness),
                    f64::from(*BRIGHTNESS_RANGE.start()),
                    f64::from(*BRIGHTNESS_RANGE.end()),
                    1.0,
                    0,
                    move |v: f64| {
                        #[allow(clippy::cast_possible_truncation)]
                        let brightness = v.round() as i32;
                        on_change.call(AdjustmentParams::new(
                            brightness,
                            params.contrast,
                            params.saturation,
                        ));
                    },
                )}
                {render_slider(
                    "contrast",
                    "Contrast",
                    f64::from(params.contrast),
                    f64::from(*CONTRAST_RANGE.start()),
                    f64::from(*CONTRAST_RANGE.end()),
                    0.05,
                    2,
                    move |v: f64| {
                        #[allow(clippy::cast_possible_truncation)]
                        let contrast = v as f32;
                        on_change.call(AdjustmentParams::new(
                            params.brightness,
                            contrast,
                            params.saturation,
                        ));
                    },
                )}
                {render_slider(
                    "saturation",
                    "Saturation",
                    f64::from(params.saturation),
                    f64::from(*SATURATION_RANGE.start()),
                    f64::from(*SATURATION_RANGE.end()),
                    0.05,
                    2,
                    move |v: f64| {
                        #[allow(clippy::cast_possible_truncation)]
                        let saturation = v as f32;
                        on_change.call(AdjustmentParams::new(
                            params.brightness,
                            params.contrast,
                            saturation,
                        ));
                    },
                )}
            }

            button {
                class: "inline-flex items-center gap-1 px-3 py-1.5 text-sm font-medium rounded text-[var(--btn-primary)] bg-[var(--surface-active)]",
                onclick: move |_| on_change.call(AdjustmentParams::default()),
                Icon { icon: LdRefreshCw, width: 14, height: 14 }
                "Reset All Adjustments"
            }

            div {
                button {
                    class: action_class(!props.busy),
                    disabled: props.busy,
                    onclick: move |_| props.on_continue.call(()),
                    Icon { icon: LdScissors, width: 16, height: 16 }
                    if props.busy { "Processing..." } else { "Continue to Crop" }
                }
            }
        }
    }
}
