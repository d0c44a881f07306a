use chrono::NaiveDate;
use eframe::egui::{self, RichText, TextEdit, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Date & time filter dialog
// ---------------------------------------------------------------------------

/// Render the filter dialog while it is open. Apply pushes the form into the
/// projector; Cancel or closing keeps the form but changes nothing.
pub fn filter_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.filter_window_open {
        return;
    }

    let (default_start, default_end) = state.default_dates();
    let mut open = true;
    let mut apply = false;
    let mut cancel = false;

    egui::Window::new("Filter by Date & Time")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("filter_grid")
                .num_columns(3)
                .spacing([12.0, 8.0])
                .show(ui, |ui: &mut Ui| {
                    bound_row(
                        ui,
                        "Start",
                        &mut state.draft.start_date,
                        &mut state.draft.start_clock,
                        default_start,
                    );
                    ui.end_row();
                    bound_row(
                        ui,
                        "End",
                        &mut state.draft.end_date,
                        &mut state.draft.end_clock,
                        default_end,
                    );
                    ui.end_row();
                });

            ui.label(
                RichText::new("Times are optional (HH:MM). Both dates are needed to filter.")
                    .small()
                    .weak(),
            );
            ui.separator();
            ui.horizontal(|ui: &mut Ui| {
                apply = ui.button("Apply").clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });

    if apply {
        state.apply_filter();
    } else if cancel || !open {
        state.filter_window_open = false;
    }
}

/// One bound: enable checkbox, date picker and clock field.
fn bound_row(
    ui: &mut Ui,
    label: &str,
    date: &mut Option<NaiveDate>,
    clock: &mut String,
    default: NaiveDate,
) {
    let mut enabled = date.is_some();
    if ui.checkbox(&mut enabled, label).changed() {
        *date = enabled.then_some(default);
    }

    match date {
        Some(date) => {
            ui.add(DatePickerButton::new(date).id_salt(label));
        }
        None => {
            ui.label(RichText::new("not set").weak());
        }
    }

    ui.add(
        TextEdit::singleline(clock)
            .hint_text("HH:MM")
            .desired_width(60.0),
    );
}
