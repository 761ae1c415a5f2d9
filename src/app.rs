use eframe::egui;

use hospital_review_dashboard::config::DashboardConfig;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and open the configured dataset if it exists.
    pub fn new(config: DashboardConfig) -> Self {
        let dataset_path = config.dataset_path.clone();
        let mut state = AppState::new(config);
        if dataset_path.is_file() {
            state.load(&dataset_path);
        } else {
            log::info!(
                "{} not found, waiting for File → Open",
                dataset_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation and filters ----
        egui::SidePanel::left("nav_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current view ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::view_panel(ui, &mut self.state);
        });
    }
}
