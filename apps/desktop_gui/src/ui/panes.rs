//! Widgets projecting the view model: listing panes, register table, error section.

use client_core::ErrorSurface;
use eframe::egui;
use shared::{domain::Pane, error::ErrorKind};

/// Returns true when the copy button was clicked.
pub fn show_listing(ui: &mut egui::Ui, pane: Pane, content: &str) -> bool {
    let mut copy_clicked = false;
    ui.horizontal(|ui| {
        ui.heading(pane.label());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            copy_clicked = ui
                .small_button("Copy")
                .on_hover_text(format!("Copy the {} listing", pane.label()))
                .clicked();
        });
    });

    let mut text = content;
    egui::ScrollArea::vertical()
        .id_salt(("pane_scroll", pane.index()))
        .max_height((ui.available_height() / 2.0 - 24.0).max(80.0))
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .id_salt(("pane_text", pane.index()))
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        });
    copy_clicked
}

pub fn show_registers(ui: &mut egui::Ui, fragment: &str) {
    ui.heading(Pane::Registers.label());
    let rows = register_rows(fragment);
    if rows.is_empty() {
        let mut text = fragment;
        ui.add(
            egui::TextEdit::multiline(&mut text)
                .id_salt("registers_raw")
                .code_editor()
                .desired_width(f32::INFINITY),
        );
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("registers_scroll")
        .show(ui, |ui| {
            egui::Grid::new("registers_grid")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    for (name, value) in &rows {
                        ui.monospace(name);
                        ui.monospace(value);
                        ui.end_row();
                    }
                });
        });
}

pub fn show_error_section(ui: &mut egui::Ui, surface: &ErrorSurface) {
    let title = match surface.kind {
        Some(ErrorKind::Transport) => "Connection error",
        _ => "Emulator error",
    };
    egui::Frame::NONE
        .fill(egui::Color32::from_rgb(111, 53, 53))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(title).strong().color(egui::Color32::WHITE));
            let mut message = surface.message.as_str();
            ui.add(
                egui::TextEdit::multiline(&mut message)
                    .id_salt("error_message")
                    .code_editor()
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
        });
}

/// Extracts `(name, value)` pairs from the server's register table fragment.
pub fn register_rows(fragment: &str) -> Vec<(String, String)> {
    fragment
        .split("<tr>")
        .skip(1)
        .filter_map(|row| {
            let name = first_cell_text(row)?;
            let value = attr_value(row, "value").unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

fn first_cell_text(row: &str) -> Option<String> {
    let start = row.find("<td")?;
    let after_tag = start + row[start..].find('>')? + 1;
    let end = after_tag + row[after_tag..].find("</td>")?;
    Some(row[after_tag..end].trim().to_string())
}

fn attr_value(row: &str, attr: &str) -> Option<String> {
    let needle = format!(" {attr}=\"");
    let start = row.find(&needle)? + needle.len();
    let end = start + row[start..].find('"')?;
    Some(row[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::register_rows;

    #[test]
    fn parses_register_table_rows() {
        let fragment = concat!(
            "<table>",
            "<tr><td id=\"r0_name\">r0</td><td id=\"r0_content\">",
            "<input type=\"number\" class=\"regcont\" id=\"r0_cont\" value=\"5\" /></td></tr>",
            "<tr><td id=\"ECR_name\">ECR</td><td id=\"ECR_content\">",
            "<input type=\"number\" class=\"regcont\" id=\"ECR_cont\" value=\"0\" /></td></tr>",
            "</table>"
        );
        assert_eq!(
            register_rows(fragment),
            vec![
                ("r0".to_string(), "5".to_string()),
                ("ECR".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn non_table_text_yields_no_rows() {
        assert!(register_rows("error").is_empty());
        assert!(register_rows("").is_empty());
    }
}
