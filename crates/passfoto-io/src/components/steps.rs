//! Step indicator for the four pipeline stages.

use dioxus::prelude::*;
use passfoto_pipeline::session::PipelineStage;

/// Props for the [`StepIndicator`] component.
#[derive(Props, Clone, PartialEq)]
pub struct StepIndicatorProps {
    /// The stage currently shown.
    current: PipelineStage,
    /// Stages whose guard artifact exists and can be navigated to.
    reachable: Vec<PipelineStage>,
    /// Fired when the user clicks a reachable stage.
    on_select: EventHandler<PipelineStage>,
}

/// Numbered step header. The current stage is highlighted; stages with
/// an existing artifact are clickable for backward (or re-forward)
/// navigation, which never discards later results.
#[component]
pub fn StepIndicator(props: StepIndicatorProps) -> Element {
    rsx! {
        ol { class: "flex gap-2",
            for stage in PipelineStage::ALL {
                {render_step(stage, &props)}
            }
        }
    }
}

fn render_step(stage: PipelineStage, props: &StepIndicatorProps) -> Element {
    let current = stage == props.current;
    let reachable = props.reachable.contains(&stage);
    let on_select = props.on_select;

    let badge_class = if current {
        "bg-[var(--btn-primary)] text-white"
    } else if reachable {
        "bg-[var(--surface-active)] text-[var(--text)]"
    } else {
        "bg-[var(--surface)] text-[var(--text-disabled)]"
    };
    let button_class = if reachable && !current {
        "flex items-center gap-2 cursor-pointer"
    } else {
        "flex items-center gap-2 cursor-default"
    };

    rsx! {
        li { class: "flex-1",
            button {
                class: "{button_class}",
                disabled: !reachable,
                onclick: move |_| {
                    if reachable {
                        on_select.call(stage);
                    }
                },
                span {
                    class: "w-7 h-7 rounded-full flex items-center justify-center text-sm font-semibold {badge_class}",
                    "{stage.number()}"
                }
                span { class: "text-sm text-[var(--text)] hidden sm:inline",
                    "{stage.label()}"
                }
            }
        }
    }
}
