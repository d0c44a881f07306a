use eframe::egui::{self, Button, Color32, RichText, ScrollArea, Ui};

use crate::api::models::UploadKind;
use crate::data::projector::display_label;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the toolbar and the message banners below it.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        let idle = state.uploading.is_none();
        ui.menu_button("Upload", |ui: &mut Ui| {
            for kind in [UploadKind::Battery, UploadKind::Strain] {
                let label = format!("{kind} data (CSV)…");
                if ui.add_enabled(idle, Button::new(label)).clicked() {
                    open_upload_dialog(state, kind);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if ui
            .add_enabled(state.has_data(), Button::new("Filter by Date & Time"))
            .clicked()
        {
            state.filter_window_open = true;
        }
        if state.filter_active() && ui.button("Clear filter").clicked() {
            state.clear_filter();
        }
        if ui.button("Reload").clicked() {
            state.reload();
        }

        ui.separator();

        if ui.selectable_label(state.compact, "Compact").clicked() {
            state.compact = !state.compact;
        }

        if let Some(kind) = state.uploading {
            ui.separator();
            ui.spinner();
            ui.label(format!("Uploading {} data…", kind.to_string().to_lowercase()));
        }

        if state.has_data() {
            ui.separator();
            ui.label(format!(
                "{} of {} samples shown",
                state.projector.view().primary.len(),
                state.projector.source().primary.len()
            ));
        }
    });

    banner(ui, &mut state.error_message, Color32::from_rgb(220, 38, 38));
    banner(ui, &mut state.success_message, Color32::from_rgb(22, 163, 74));
    banner(ui, &mut state.filter_notice, Color32::from_rgb(202, 138, 4));
}

/// A dismissable one-line message.
fn banner(ui: &mut Ui, message: &mut Option<String>, color: Color32) {
    let mut dismissed = false;
    if let Some(text) = message.as_deref() {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(text).color(color));
            dismissed = ui.small_button("✕").clicked();
        });
    }
    if dismissed {
        *message = None;
    }
}

// ---------------------------------------------------------------------------
// Left side panel – channel selector and data summary
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Strain channel");
    ui.separator();

    let options = state.channel_options.clone();
    let mut picked: Option<String> = None;

    ScrollArea::vertical()
        .id_salt("channel_list")
        .max_height(ui.available_height() * 0.55)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for name in &options {
                let count = state.projector.source().channel(name).len();
                let mut text = RichText::new(format!("{name}  ({count})"));
                if count > 0 {
                    text = text.color(state.palette.color_for(name));
                } else {
                    text = text.weak();
                }
                if ui
                    .selectable_label(state.selected_channel == *name, text)
                    .clicked()
                {
                    picked = Some(name.clone());
                }
            }
        });

    if let Some(name) = picked {
        state.select_channel(&name);
    }

    ui.add_space(8.0);
    ui.heading("Database");
    ui.separator();
    match &state.summary {
        Some(summary) => {
            ui.label(format!("Battery rows: {}", summary.battery_data_count));
            ui.label(format!("Strain rows: {}", summary.strain_total()));
        }
        None => {
            ui.label(RichText::new("No summary yet.").weak());
        }
    }
    if let Some(status) = &state.backend_status {
        ui.label(RichText::new(status).small().weak());
    }

    ui.add_space(8.0);
    ui.heading("Time range");
    ui.separator();
    let zone = state.projector.zone();
    match state.projector.extent() {
        Some((first, last)) => {
            ui.label(format!("Data: {}", display_label(first, zone)));
            ui.label(format!("  to {}", display_label(last, zone)));
        }
        None => {
            ui.label("No data loaded.");
        }
    }
    match state.projector.window() {
        Some(window) if window.start.is_finite() && window.end.is_finite() => {
            ui.label(format!("Filter: {}", display_label(window.start, zone)));
            ui.label(format!("  to {}", display_label(window.end, zone)));
        }
        Some(_) => {
            ui.label("Filter: invalid time entered");
        }
        None => {
            ui.label(RichText::new("Filter: none").weak());
        }
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_upload_dialog(state: &mut AppState, kind: UploadKind) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Upload {} data", kind.to_string().to_lowercase()))
        .add_filter("CSV", &["csv", "CSV"])
        .pick_file();

    if let Some(path) = file {
        state.begin_upload(&path, kind);
    }
}
