use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use hospital_review_dashboard::classify::PredictionResult;
use hospital_review_dashboard::color::{generate_palette, ColorMap};
use hospital_review_dashboard::data::aggregate::PercentResult;
use hospital_review_dashboard::data::model::Field;
use hospital_review_dashboard::report::ReportSummary;
use hospital_review_dashboard::views::{Chart, ChartStyle, View, ViewOutput};

use crate::state::AppState;
use crate::ui::panels::save_file_dialog;

// ---------------------------------------------------------------------------
// Central panel – dispatch on the current view's output
// ---------------------------------------------------------------------------

/// Render the current view in the central panel.
pub fn view_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.view.title());
    ui.separator();

    if state.view == View::ManualPrediction {
        prediction_panel(ui, state);
        return;
    }

    let Some(output) = state.output.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match output {
            ViewOutput::Home {
                total_reviews,
                hospitals,
                hospital_types,
            } => {
                ui.label("Dataset: Google Maps Reviews");
                ui.label(format!("Total ulasan: {total_reviews}"));
                ui.label(format!("Jumlah rumah sakit: {hospitals}"));
                ui.label(format!("Tipe RS: {}", hospital_types.join(", ")));
                ui.add_space(8.0);
                ui.label("Silakan pilih menu di sidebar untuk melihat analisis.");
            }
            ViewOutput::Charts(charts) => {
                for chart in &charts {
                    chart_plot(ui, state, chart);
                    ui.add_space(12.0);
                }
            }
            ViewOutput::WordCloud {
                label_field,
                label,
                options,
                corpus_words,
                terms,
            } => word_cloud(ui, state, label_field, label, &options, corpus_words, &terms),
            ViewOutput::HospitalType { chart, percentages } => {
                chart_plot(ui, state, &chart);
                ui.add_space(12.0);
                percent_table(ui, &percentages);
            }
            ViewOutput::Report(summary) => report_panel(ui, state, &summary),
            ViewOutput::ManualPrediction => {}
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Draw one aggregation as a bar chart. Single-column data gets one bar per
/// value; grouped data gets one series per secondary value.
fn chart_plot(ui: &mut Ui, state: &AppState, chart: &Chart) {
    ui.strong(&chart.title);
    for label in &chart.data.unknown_labels {
        ui.label(
            RichText::new(format!("Label tidak dikenal: {label}"))
                .color(egui::Color32::YELLOW),
        );
    }

    let vocabulary: Vec<String> = state
        .dataset
        .as_ref()
        .and_then(|t| t.vocabulary(chart.data.secondary.unwrap_or(chart.data.primary)))
        .map(|v| v.to_vec())
        .unwrap_or_default();

    let categories: Vec<String> = chart
        .data
        .primary_values()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut series: Vec<BarChart> = Vec::new();
    match chart.style {
        ChartStyle::Distribution => {
            let colors = ColorMap::with_extras(&vocabulary, &categories);
            let bars = chart
                .data
                .entries
                .iter()
                .enumerate()
                .map(|(i, (key, count))| {
                    Bar::new(i as f64, *count as f64)
                        .name(key.primary())
                        .fill(colors.color_for(key.primary()))
                })
                .collect();
            series.push(BarChart::new(bars).width(0.7));
        }
        ChartStyle::Grouped | ChartStyle::Stacked => {
            let labels = chart.data.secondary_values();
            let colors = ColorMap::with_extras(&vocabulary, &labels);
            let stacked = chart.style == ChartStyle::Stacked;
            let width = if stacked { 0.7 } else { 0.8 / labels.len().max(1) as f64 };

            for (j, label) in labels.iter().enumerate() {
                let offset = if stacked {
                    0.0
                } else {
                    (j as f64 - (labels.len() as f64 - 1.0) / 2.0) * width
                };
                // Stacking pairs bars by index, so every category gets a bar.
                let bars = categories
                    .iter()
                    .enumerate()
                    .map(|(i, category)| {
                        let count = chart
                            .data
                            .entries
                            .iter()
                            .find(|(k, _)| {
                                k.primary() == category.as_str() && k.secondary() == Some(*label)
                            })
                            .map(|(_, c)| *c)
                            .unwrap_or(0);
                        Bar::new(i as f64 + offset, count as f64).width(width)
                    })
                    .collect();
                let mut bar_chart = BarChart::new(bars)
                    .name(*label)
                    .color(colors.color_for(label));
                if stacked {
                    let below: Vec<&BarChart> = series.iter().collect();
                    bar_chart = bar_chart.stack_on(&below);
                }
                series.push(bar_chart);
            }
        }
    }

    Plot::new(chart.title.as_str())
        .legend(Legend::default())
        .height(320.0)
        .y_axis_label("Jumlah")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            categories.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.bar_chart(s);
            }
        });
}

fn percent_table(ui: &mut Ui, result: &PercentResult) {
    ui.strong("Persentase Sentimen per Tipe RS");
    TableBuilder::new(ui)
        .id_salt("percent_table")
        .striped(true)
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Tipe RS", "Sentimen", "Jumlah", "Persen"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for group in &result.groups {
                for share in &group.shares {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&group.primary);
                        });
                        row.col(|ui| {
                            ui.label(&share.label);
                        });
                        row.col(|ui| {
                            ui.label(share.count.to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.1}%", share.percent));
                        });
                    });
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Word cloud
// ---------------------------------------------------------------------------

fn word_cloud(
    ui: &mut Ui,
    state: &mut AppState,
    label_field: Field,
    label: Option<String>,
    options: &[String],
    corpus_words: usize,
    terms: &[(String, usize)],
) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Pilih tipe analisis:");
        let mut field = label_field;
        ui.selectable_value(&mut field, Field::Sentiment, "Sentimen");
        ui.selectable_value(&mut field, Field::Emotion, "Emosi");
        if field != label_field {
            state.set_cloud_label_field(field);
        }
    });

    let mut selected = label.clone();
    egui::ComboBox::from_id_salt("cloud_label")
        .selected_text(label.as_deref().unwrap_or("-"))
        .show_ui(ui, |ui: &mut Ui| {
            for opt in options {
                ui.selectable_value(&mut selected, Some(opt.clone()), opt);
            }
        });
    if selected != label {
        if let Some(s) = selected {
            state.set_cloud_label(s);
        }
    }

    ui.label(format!("{corpus_words} kata"));
    ui.separator();

    if terms.is_empty() {
        ui.label("Tidak ada teks untuk label ini.");
        return;
    }

    // Font size grows with frequency; placement is left to the text layout.
    let max = terms.first().map(|(_, c)| *c).unwrap_or(1).max(1) as f32;
    let colors = generate_palette(terms.len().min(12));
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (i, (term, count)) in terms.iter().enumerate() {
            let size = 12.0 + 28.0 * (*count as f32 / max);
            ui.label(
                RichText::new(term)
                    .size(size)
                    .color(colors[i % colors.len()]),
            )
            .on_hover_text(format!("{count}×"));
        }
    });
}

// ---------------------------------------------------------------------------
// Manual prediction
// ---------------------------------------------------------------------------

fn prediction_panel(ui: &mut Ui, state: &mut AppState) {
    ui.label("Masukkan teks ulasan:");
    ui.add(
        egui::TextEdit::multiline(&mut state.prediction_text)
            .desired_rows(6)
            .desired_width(f32::INFINITY),
    );
    if ui.button("Prediksi").clicked() {
        state.predict();
    }

    let Some(prediction) = &state.prediction else {
        return;
    };
    ui.separator();

    ui.columns(2, |cols| {
        top_prediction(&mut cols[0], "Sentimen", &prediction.sentiment);
        top_prediction(&mut cols[1], "Emosi Dominan", &prediction.emotion);
    });

    ui.add_space(8.0);
    ui.strong("Skor Semua Emosi");
    TableBuilder::new(ui)
        .id_salt("emotion_scores")
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Emosi");
            });
            header.col(|ui| {
                ui.strong("Skor");
            });
        })
        .body(|mut body| {
            for p in &prediction.emotion.predictions {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&p.label);
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.4}", p.score));
                    });
                });
            }
        });

    ui.add_space(8.0);
    if ui.button("Unduh Hasil Prediksi CSV").clicked() {
        if let Some(path) = save_file_dialog("Save prediction", "hasil_prediksi.csv", "csv") {
            state.export_prediction(&path);
        }
    }
}

fn top_prediction(ui: &mut Ui, title: &str, result: &PredictionResult) {
    ui.strong(title);
    if let Some(top) = result.top() {
        ui.label(format!("Label: {}", top.label));
        ui.label(format!("Confidence: {:.4}", top.score));
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn report_panel(ui: &mut Ui, state: &mut AppState, summary: &ReportSummary) {
    ui.strong(&summary.title);
    ui.label(format!("Total data: {} ulasan", summary.total_reviews));
    ui.label(format!("Jumlah rumah sakit: {}", summary.hospitals));
    ui.add_space(8.0);

    for (title, counts) in [
        ("Sentimen", &summary.sentiment_counts),
        ("Emosi", &summary.emotion_counts),
    ] {
        ui.strong(title);
        for (label, count) in counts {
            ui.label(format!("{label}: {count}"));
        }
        ui.add_space(4.0);
    }

    if !summary.unknown_labels.is_empty() {
        ui.label(format!(
            "Label tidak dikenal: {}",
            summary.unknown_labels.join(", ")
        ));
    }

    ui.add_space(8.0);
    if ui.button("Download Laporan").clicked() {
        if let Some(path) = save_file_dialog("Save report", "laporan_analisis.json", "json") {
            state.export_report(&path);
        }
    }
}
