use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use hospital_review_dashboard::data::model::Field;
use hospital_review_dashboard::views::VIEWS;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analisis Rumah Sakit");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Navigation ----
            ui.strong("Navigasi");
            for entry in VIEWS {
                if ui
                    .selectable_label(state.view == entry.view, entry.title)
                    .clicked()
                {
                    state.set_view(entry.view);
                }
            }
            ui.separator();

            if state.dataset.is_none() {
                ui.label("No dataset loaded.");
                return;
            }

            // ---- Chained selectbox filters ----
            ui.strong("Filter");
            filter_combo(ui, state, Field::HospitalType, "Tipe RS");
            filter_combo(ui, state, Field::Hospital, "Rumah Sakit");
        });
}

/// A selectbox for one column; "Semua" clears the constraint.
fn filter_combo(ui: &mut Ui, state: &mut AppState, field: Field, label: &str) {
    let options = state.filter_options(field);
    let current = state.params.filter.get(&field).cloned();
    let mut selected = current.clone();

    ui.label(label);
    egui::ComboBox::from_id_salt(field.as_str())
        .selected_text(current.as_deref().unwrap_or("Semua"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut selected, None, "Semua");
            for opt in &options {
                ui.selectable_value(&mut selected, Some(opt.clone()), opt);
            }
        });

    if selected != current {
        state.set_filter(field, selected);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let source = ds
                .source()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!("{source}: {} ulasan", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open review dataset")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

/// Ask for a destination file; `None` when the user cancels.
pub fn save_file_dialog(title: &str, file_name: &str, ext: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(file_name)
        .add_filter(ext.to_uppercase(), &[ext])
        .save_file()
}
