use std::{fs, path::Path};

use arboard::Clipboard;
use client_core::ViewModel;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::{Command, Pane};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::panes;

pub const SETTINGS_STORAGE_KEY: &str = "register_machine_gui_settings";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDesktopSettings {
    #[serde(default)]
    pub rom_source: String,
    #[serde(default)]
    pub flash_source: String,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceTarget {
    Rom,
    Flash,
}

impl SourceTarget {
    fn label(self) -> &'static str {
        match self {
            SourceTarget::Rom => "ROM",
            SourceTarget::Flash => "Flash",
        }
    }
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    connected_url: Option<String>,
    rom_source: String,
    flash_source: String,
    view: ViewModel,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<PersistedDesktopSettings>,
        startup: StartupConfig,
    ) -> Self {
        let persisted = persisted_settings.unwrap_or_default();
        Self {
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            connected_url: None,
            rom_source: persisted.rom_source,
            flash_source: persisted.flash_source,
            view: ViewModel::default(),
            status: "Connecting...".to_string(),
            status_banner: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Connected { server_url } => {
                    self.status = format!("Connected to {server_url}");
                    self.connected_url = Some(server_url);
                    self.status_banner = None;
                }
                UiEvent::ViewUpdated(view) => {
                    self.view = view;
                }
                UiEvent::Error(err) => self.show_error(err),
            }
        }
    }

    fn show_error(&mut self, err: UiError) {
        if err.context() == UiErrorContext::Connect {
            self.connected_url = None;
        }
        self.status = format!("{} error: {}", err_label(err.category()), err.message());
        self.status_banner = Some(StatusBanner {
            message: self.status.clone(),
        });
    }

    fn send(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn dispatch(&mut self, command: Command) {
        self.status = format!("Sent {}", command.name());
        self.send(BackendCommand::Dispatch(command));
    }

    fn load_source_file(&mut self, target: SourceTarget) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("assembly", &["asm", "s", "txt"])
            .pick_file()
        else {
            return;
        };
        match read_source(&path) {
            Ok(source) => {
                match target {
                    SourceTarget::Rom => self.rom_source = source,
                    SourceTarget::Flash => self.flash_source = source,
                }
                self.status = format!("Loaded {} source from {}", target.label(), path.display());
            }
            Err(err) => self.show_error(err),
        }
    }

    fn copy_pane(&mut self, pane: Pane) {
        let content = self.view.pane(pane).to_string();
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(content)) {
            Ok(()) => self.status = format!("Copied {} listing to clipboard", pane.label()),
            Err(err) => {
                self.status = format!("Clipboard unavailable: {err}");
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Server");
                let url_edit = ui.add(
                    egui::TextEdit::singleline(&mut self.server_url)
                        .id_salt("server_url")
                        .desired_width(260.0),
                );
                let submitted =
                    url_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Connect").clicked() || submitted {
                    let server_url = self.server_url.trim().to_string();
                    self.send(BackendCommand::Connect { server_url });
                }
                ui.separator();

                let connected = self.connected_url.is_some();
                ui.add_enabled_ui(connected, |ui| {
                    if ui.button("Run cycle").on_hover_text("F10").clicked() {
                        self.dispatch(Command::RunCycle);
                    }
                    if ui.button("Run").on_hover_text("F5").clicked() {
                        self.dispatch(Command::Run);
                    }
                    if ui.button("Reset").clicked() {
                        self.dispatch(Command::Reset);
                    }
                    if ui.button("Flush").clicked() {
                        self.dispatch(Command::Flush);
                    }
                    if ui.button("Refresh").clicked() {
                        self.send(BackendCommand::Refresh);
                    }
                });
            });
            ui.label(egui::RichText::new(&self.status).small().weak());
            self.show_status_banner(ui);
            ui.add_space(4.0);
        });
    }

    fn show_source_editor(&mut self, ui: &mut egui::Ui, target: SourceTarget) {
        ui.horizontal(|ui| {
            ui.heading(format!("{} assembly", target.label()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Open...").clicked() {
                    self.load_source_file(target);
                }
            });
        });

        let source = match target {
            SourceTarget::Rom => &mut self.rom_source,
            SourceTarget::Flash => &mut self.flash_source,
        };
        ui.add(
            egui::TextEdit::multiline(source)
                .id_salt(("source", target.label()))
                .code_editor()
                .desired_rows(14)
                .desired_width(f32::INFINITY),
        );

        let label = format!("Assemble {}", target.label());
        if ui
            .add_enabled(self.connected_url.is_some(), egui::Button::new(label))
            .clicked()
        {
            let command = match target {
                SourceTarget::Rom => Command::AssembleRom {
                    source: self.rom_source.clone(),
                },
                SourceTarget::Flash => Command::AssembleFlash {
                    source: self.flash_source.clone(),
                },
            };
            self.dispatch(command);
        }
    }

    fn show_workspace(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("assembly_panel")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_source_editor(ui, SourceTarget::Rom);
                    ui.separator();
                    self.show_source_editor(ui, SourceTarget::Flash);
                });
            });

        if self.view.error.visible {
            egui::TopBottomPanel::bottom("error_section").show(ctx, |ui| {
                ui.add_space(4.0);
                panes::show_error_section(ui, &self.view.error);
                ui.add_space(4.0);
            });
        }

        let mut copy_requests = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                if panes::show_listing(&mut columns[0], Pane::Rom, &self.view.rom) {
                    copy_requests.push(Pane::Rom);
                }
                columns[0].separator();
                if panes::show_listing(&mut columns[0], Pane::Flash, &self.view.flash) {
                    copy_requests.push(Pane::Flash);
                }
                if panes::show_listing(&mut columns[1], Pane::Ram, &self.view.ram) {
                    copy_requests.push(Pane::Ram);
                }
                columns[1].separator();
                panes::show_registers(&mut columns[1], &self.view.registers);
            });
        });
        for pane in copy_requests {
            self.copy_pane(pane);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.connected_url.is_none() {
            return;
        }
        let (step, run) = ctx.input(|i| (i.key_pressed(egui::Key::F10), i.key_pressed(egui::Key::F5)));
        if step {
            self.dispatch(Command::RunCycle);
        }
        if run {
            self.dispatch(Command::Run);
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_shortcuts(ctx);
        self.show_toolbar(ctx);
        self.show_workspace(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDesktopSettings {
            rom_source: self.rom_source.clone(),
            flash_source: self.flash_source.clone(),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

fn read_source(path: &Path) -> Result<String, UiError> {
    fs::read_to_string(path).map_err(|err| {
        UiError::from_message(
            UiErrorContext::SourceFile,
            format!("could not read '{}': {err}", path.display()),
        )
    })
}
