//! Export panel: result preview, filename input, download button.

use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::LdDownload;
use dioxus_free_icons::Icon;
use passfoto_pipeline::types::OutputFormat;

use crate::components::controls::action_class;
use crate::download;

/// Props for the [`ExportPanel`] component.
#[derive(Props, Clone)]
pub struct ExportPanelProps {
    /// The print-ready image bytes. `None` disables the download.
    /// Wrapped in `Rc` to avoid copying the payload on each render.
    result: Option<Rc<Vec<u8>>>,
    /// Display URL of the result preview.
    preview: Option<String>,
    /// Editable filename base (no extension).
    basename: String,
    /// Full download filename including the session extension.
    download_name: String,
    /// Session output format (sets the Blob MIME type).
    format: OutputFormat,
    /// Fired when the user edits the filename base.
    on_basename_change: EventHandler<String>,
}

impl PartialEq for ExportPanelProps {
    fn eq(&self, other: &Self) -> bool {
        let results_eq = match (&self.result, &other.result) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        results_eq
            && self.preview == other.preview
            && self.basename == other.basename
            && self.download_name == other.download_name
            && self.format == other.format
    }
}

/// Shows the processed photo with a user-editable filename and a
/// download button that saves the bytes through a temporary Blob URL.
#[component]
pub fn ExportPanel(props: ExportPanelProps) -> Element {
    let has_result = props.result.is_some();
    let mut export_error = use_signal(|| Option::<String>::None);

    let download_click = {
        let result = props.result.clone();
        let download_name = props.download_name.clone();
        let format = props.format;
        move |_| {
            if let Some(ref bytes) = result {
                match download::trigger_download(bytes, &download_name, format.mime_type()) {
                    Ok(()) => export_error.set(None),
                    Err(e) => export_error.set(Some(format!("Download failed: {e}"))),
                }
            }
        }
    };

    rsx! {
        div { class: "space-y-3",
            h3 { class: "text-lg font-semibold text-[var(--text-heading)]", "Processed Photo" }

            if let Some(ref err) = export_error() {
                p { class: "text-[var(--text-error)] text-sm", "{err}" }
            }

            if let Some(ref url) = props.preview {
                div { class: "bg-white p-2 rounded-lg shadow-sm border border-[var(--border)]",
                    img { src: "{url}", class: "mx-auto max-h-96" }
                }
            }

            // Filename input with the fixed extension suffix.
            div { class: "flex rounded overflow-hidden border border-[var(--border)]",
                input {
                    r#type: "text",
                    value: "{props.basename}",
                    placeholder: "Enter filename without extension",
                    class: "flex-1 px-2 py-1 text-sm bg-[var(--surface)] text-[var(--text)]",
                    oninput: move |e| props.on_basename_change.call(e.value()),
                }
                span { class: "px-3 py-1 text-sm bg-[var(--surface-active)] text-[var(--text-secondary)]",
                    ".{props.format.extension()}"
                }
            }

            button {
                class: action_class(has_result),
                disabled: !has_result,
                onclick: download_click,
                Icon { icon: LdDownload, width: 16, height: 16 }
                "Download Photo"
            }
        }
    }
}
