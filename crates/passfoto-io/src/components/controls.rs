//! Shared form-control render helpers.
//!
//! Renders labeled sliders and radio rows in the panel style used
//! across the Background, Adjust, and Crop panels.

use dioxus::prelude::*;

/// Render a labeled range slider with a live value readout.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_slider(
    id: &str,
    label: &str,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    decimals: usize,
    on_input: impl Fn(f64) + 'static,
) -> Element {
    let display = format!("{value:.decimals$}");
    let id = id.to_string();
    let label = label.to_string();

    rsx! {
        div { class: "flex flex-col gap-1",
            div { class: "flex justify-between text-sm",
                label { r#for: "{id}",
                    class: "text-[var(--text-heading)] font-medium",
                    "{label}"
                }
                span { class: "text-[var(--text-secondary)] tabular-nums",
                    "{display}"
                }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                class: "w-full accent-[var(--btn-primary)]",
                oninput: move |e| {
                    match e.value().parse::<f64>() {
                        Ok(v) => on_input(v),
                        Err(err) => {
                            web_sys::console::warn_1(
                                &format!("slider parse failure: {err:?} from {:?}", e.value())
                                    .into(),
                            );
                        }
                    }
                },
            }
        }
    }
}

/// Render one radio option in a horizontal group.
pub(crate) fn render_radio(
    id: &str,
    group: &str,
    label: &str,
    checked: bool,
    on_select: impl Fn(()) + 'static,
) -> Element {
    let id = id.to_string();
    let group = group.to_string();
    let label = label.to_string();

    rsx! {
        div { class: "flex items-center gap-2",
            input {
                r#type: "radio",
                id: "{id}",
                name: "{group}",
                checked: checked,
                class: "w-4 h-4 accent-[var(--btn-primary)]",
                onchange: move |_| on_select(()),
            }
            label { r#for: "{id}",
                class: "text-sm text-[var(--text)]",
                "{label}"
            }
        }
    }
}

/// Primary action button class, switching to the disabled style when
/// `enabled` is false.
pub(crate) const fn action_class(enabled: bool) -> &'static str {
    if enabled {
        "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer"
    } else {
        "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-not-allowed"
    }
}
