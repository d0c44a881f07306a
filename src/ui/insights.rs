use eframe::egui::{Color32, ProgressBar, RichText, Ui};

use crate::api::models::Prediction;
use crate::color::{ANOMALY_COLOR, BATTERY_COLOR, PREDICTION_COLOR};
use crate::state::AnomalyView;

// ---------------------------------------------------------------------------
// Prediction metrics
// ---------------------------------------------------------------------------

/// R² gauge, RMSE bar and the next predicted steps for one series.
pub fn prediction_panel(ui: &mut Ui, title: &str, prediction: Option<&Prediction>) {
    ui.strong(title);

    let result = match prediction {
        None => {
            ui.label(RichText::new("No prediction available.").weak());
            return;
        }
        Some(Prediction::Ready(result)) => result,
        Some(failed) => {
            let text = failed.failure_text().unwrap_or_default();
            ui.label(RichText::new(text).color(ANOMALY_COLOR));
            return;
        }
    };

    let r2 = result.r2_score.clamp(0.0, 1.0) as f32;
    ui.add(
        ProgressBar::new(r2)
            .fill(BATTERY_COLOR)
            .text(format!("R² {:.1}%", result.r2_score * 100.0)),
    );

    // An RMSE of 0 fills the bar; 10 or more empties it.
    let rmse_score = ((100.0 - result.rmse * 10.0).clamp(0.0, 100.0) / 100.0) as f32;
    ui.add(
        ProgressBar::new(rmse_score)
            .fill(PREDICTION_COLOR)
            .text(format!("RMSE {:.3}", result.rmse)),
    );

    if let Some(quality) = &result.model_quality {
        ui.label(format!("Model quality: {quality}"));
    }

    if !result.future_predictions.is_empty() {
        let steps: Vec<String> = result
            .future_predictions
            .iter()
            .map(|v| format!("{v:.3}"))
            .collect();
        ui.label(format!("Next steps: {}", steps.join(", ")));
    }
}

// ---------------------------------------------------------------------------
// Anomaly report
// ---------------------------------------------------------------------------

pub fn anomaly_panel(ui: &mut Ui, report: Option<&AnomalyView>, markers_in_view: usize) {
    ui.strong("Anomaly detection");

    let Some(report) = report else {
        ui.label(RichText::new("No anomaly report for this channel.").weak());
        return;
    };

    ui.label(format!(
        "{} of {} windows flagged, {markers_in_view} in view",
        report.annotation.flagged_count(),
        report.annotation.flags().len()
    ));
    if let Some(threshold) = report.threshold {
        ui.label(format!("Threshold: {threshold:.4}"));
    }

    if report.anomaly_dates.is_empty() {
        ui.label(RichText::new("No anomalous days.").color(Color32::from_rgb(22, 163, 74)));
    } else {
        ui.label("Anomalous days:");
        for date in &report.anomaly_dates {
            ui.label(RichText::new(date).color(ANOMALY_COLOR));
        }
    }
}
