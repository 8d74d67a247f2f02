// src/gui/app.rs
use std::error::Error;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::controller::Controller;
use crate::core::dom::{Document, NodeId};
use crate::core::html::strip_tags;
use crate::engine::FetchWorker;
use crate::row;

pub fn run(
    doc: Document,
    worker: FetchWorker,
    realm_override: Option<i32>,
    options: eframe::NativeOptions,
) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        "SC Sidekick",
        options,
        Box::new(move |_cc| Ok(Box::new(App::new(doc, worker, realm_override)))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    doc: Document,
    controller: Controller,
    worker: FetchWorker,

    // mirrored input text <-> live DOM values
    price_text: String,
    qty_text: String,
    mirrored_row: Option<NodeId>,
}

impl App {
    pub fn new(doc: Document, worker: FetchWorker, realm_override: Option<i32>) -> Self {
        let mut controller = Controller::new();
        // offline snapshots can't resolve auth; pin the realm up front
        controller.state.auth.realm_id = realm_override;
        Self {
            doc,
            controller,
            worker,
            price_text: String::new(),
            qty_text: String::new(),
            mirrored_row: None,
        }
    }

    /// Distinct sale rows in document order, with display names.
    fn sale_rows(&self) -> Vec<(NodeId, String)> {
        let root = self.doc.root();
        let mut rows: Vec<(NodeId, String)> = Vec::new();
        for n in self.doc.subtree(root) {
            if !self.doc.is_input_named(n, "price") {
                continue;
            }
            if let Some(r) = row::sell_row_from_target(&self.doc, n) {
                if !rows.iter().any(|(id, _)| *id == r) {
                    rows.push((r, row::product_name(&self.doc, r)));
                }
            }
        }
        rows
    }

    fn production_rows(&self) -> Vec<(NodeId, String)> {
        let root = self.doc.root();
        let mut rows: Vec<(NodeId, String)> = Vec::new();
        for n in self.doc.subtree(root) {
            if !self.doc.is_input_named(n, "amount") {
                continue;
            }
            if let Some(r) = row::production_row_from_target(&self.doc, n) {
                if !rows.iter().any(|(id, _)| *id == r) {
                    rows.push((r, row::product_name(&self.doc, r)));
                }
            }
        }
        rows
    }

    /// Reload the mirrored edit buffers when the selection moves.
    fn sync_mirrors(&mut self) {
        let selected = self.controller.selected_row();
        if selected == self.mirrored_row {
            return;
        }
        self.mirrored_row = selected;
        if let Some((price, qty)) = self.controller.selected_inputs() {
            self.price_text = self.doc.value(price).to_string();
            self.qty_text = self.doc.value(qty).to_string();
        } else {
            self.price_text.clear();
            self.qty_text.clear();
        }
    }

    fn draw_row_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Sale rows");
        let selected = self.controller.selected_row();
        for (r, name) in self.sale_rows() {
            let is_sel = selected == Some(r);
            if ui.selectable_label(is_sel, &name).clicked() {
                if let Some(input) =
                    self.doc.find_descendant(r, |d, n| d.is_input_named(n, "price"))
                {
                    self.doc.focus(input);
                }
            }
        }

        let production = self.production_rows();
        if !production.is_empty() {
            ui.separator();
            ui.heading("Production");
            for (r, name) in production {
                if ui.button(&name).clicked() {
                    if let Some(input) =
                        self.doc.find_descendant(r, |d, n| d.is_input_named(n, "amount"))
                    {
                        self.doc.focus(input);
                    }
                }
            }
        }
    }

    fn draw_inputs(&mut self, ui: &mut egui::Ui) {
        let Some((price, qty)) = self.controller.selected_inputs() else {
            ui.label("No row selected.");
            return;
        };

        ui.horizontal(|ui| {
            ui.label("Price");
            if ui.text_edit_singleline(&mut self.price_text).changed() {
                self.doc.set_value(price, &self.price_text);
            }
        });
        ui.horizontal(|ui| {
            ui.label("Quantity");
            if ui.text_edit_singleline(&mut self.qty_text).changed() {
                self.doc.set_value(qty, &self.qty_text);
            }
        });
    }

    fn draw_sections(&mut self, ui: &mut egui::Ui, now: Instant) {
        let mut toggle: Option<&'static str> = None;
        for section in self.controller.sections.sections() {
            let arrow = if section.collapsed { "▸" } else { "▾" };
            let header = format!("{arrow} {} {}", section.icon, section.title);
            if ui.button(header).clicked() {
                toggle = Some(section.id);
            }
            if !section.collapsed {
                ui.label(strip_tags(&section.markup));
            }
            ui.separator();
        }
        if let Some(id) = toggle {
            self.controller.toggle_section(id, &self.doc, now);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        for outcome in self.worker.drain() {
            self.controller.apply_outcome(outcome, now);
        }

        egui::SidePanel::left("rows").show(ctx, |ui| {
            self.draw_row_list(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_inputs(ui);
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_sections(ui, now);
            });
        });

        for job in self.controller.tick(&mut self.doc, now) {
            self.worker.submit(job);
        }
        self.sync_mirrors();

        // keep ticking for fetch completions and the labor/cashflow timers
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
