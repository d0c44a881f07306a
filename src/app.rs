use std::sync::Arc;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{filter_window, insights, panels, plot};
use crate::worker::{Backend, Worker};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BridgeDashboardApp {
    pub state: AppState,
    worker: Worker,
}

impl BridgeDashboardApp {
    pub fn new(config: &Config, backend: Arc<dyn Backend>, ctx: egui::Context) -> Self {
        let mut state = AppState::new(config);
        state.startup();
        Self {
            state,
            worker: Worker::new(backend, ctx),
        }
    }

    fn dispatch(&mut self) {
        for job in self.state.take_jobs() {
            log::debug!("Submitting {} job", job.name());
            self.worker.submit(job);
        }
    }
}

impl eframe::App for BridgeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for event in self.worker.drain() {
            self.state.apply_event(event);
        }

        // ---- Top panel: toolbar and banners ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: channels and summary ----
        egui::SidePanel::left("channel_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        filter_window::filter_window(ctx, &mut self.state);

        // ---- Central panel: charts and insights ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });

        self.dispatch();
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    if !state.has_data() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data loaded. Upload battery or strain CSV files to get started.");
        });
        return;
    }

    let height = if state.compact { 200.0 } else { 320.0 };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.columns(2, |columns| {
            let ui = &mut columns[0];
            ui.heading("Battery Voltage");
            plot::battery_plot(ui, state, height);
            ui.add_space(8.0);
            insights::prediction_panel(ui, "Battery prediction", state.battery_prediction());

            let ui = &mut columns[1];
            ui.heading(RichText::new(format!("Strain {}", state.selected_channel)));
            plot::strain_plot(ui, state, height);
            ui.add_space(8.0);
            insights::prediction_panel(ui, "Strain prediction", state.strain_prediction());
            ui.add_space(8.0);
            insights::anomaly_panel(
                ui,
                state.selected_anomalies(),
                state.anomaly_points().len(),
            );
        });
    });
}
