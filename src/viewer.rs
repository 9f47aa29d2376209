use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use log::{error, info};
use tokio::sync::oneshot;

use crate::gateway::{SolveError, SolveGateway};
use crate::precursor::Square;
use crate::session::{Session, SolveTicket};
use crate::solution::{Pigment, Solution};
use crate::store::Subscription;
use crate::toast::{Toast, ToastQueue};

/// Screen size of one grid cell at zoom 1.
const BASE_CELL_SIZE: f32 = 20.0;
const ZOOM_PER_SCROLL_POINT: f32 = 0.0015;

struct PendingSolve {
    ticket: SolveTicket,
    receiver: oneshot::Receiver<Result<Solution, SolveError>>,
}

pub struct ViewerApp {
    session: Session,
    gateway: Arc<SolveGateway>,
    runtime: tokio::runtime::Runtime,
    pending: Vec<PendingSolve>,
    toasts: ToastQueue,
    frame_index: Rc<Cell<usize>>,
    _subscriptions: Vec<Subscription>,
}

impl ViewerApp {
    pub fn new(session: Session, gateway: SolveGateway) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("eyespot-solve")
            .enable_all()
            .build()?;

        // Jump to the last frame whenever a new solution lands.
        let frame_index = Rc::new(Cell::new(0));
        let slot = Rc::clone(&frame_index);
        let on_solution = session.solution.subscribe(move |solution| {
            let last = solution
                .as_ref()
                .map_or(0, |s| s.frame_count().saturating_sub(1));
            slot.set(last);
        });

        Ok(Self {
            session,
            gateway: Arc::new(gateway),
            runtime,
            pending: Vec::new(),
            toasts: ToastQueue::default(),
            frame_index,
            _subscriptions: vec![on_solution],
        })
    }

    fn start_solve(&mut self, ctx: &egui::Context) {
        let (ticket, request) = self.session.begin_solve();
        let (sender, receiver) = oneshot::channel();
        let gateway = Arc::clone(&self.gateway);
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let result = gateway.solve(&request).await;
            // The receiver is gone if the window closed meanwhile.
            let _ = sender.send(result);
            ctx.request_repaint();
        });

        self.pending.push(PendingSolve { ticket, receiver });
    }

    fn poll_solves(&mut self) {
        let mut still_pending = Vec::new();

        for mut pending in std::mem::take(&mut self.pending) {
            match pending.receiver.try_recv() {
                Ok(result) => match self.session.complete_solve(pending.ticket, result) {
                    Ok(true) => self.toasts.push(Toast::success("Solve finished")),
                    Ok(false) => info!("discarded result of a superseded solve"),
                    Err(e) => {
                        error!("solve failed: {e}");
                        self.toasts.push(Toast::from(&e));
                    }
                },
                Err(oneshot::error::TryRecvError::Empty) => still_pending.push(pending),
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.toasts.push(Toast::error("Solve task stopped unexpectedly"));
                }
            }
        }

        self.pending = still_pending;
    }

    fn parameter_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let current = self.session.parameters.get();
        let mut params = (*current).clone();

        ui.heading("Simulation");
        ui.add(
            egui::DragValue::new(&mut params.grid_size)
                .clamp_range(1..=401)
                .prefix("grid size: "),
        );
        ui.horizontal(|ui| {
            ui.label("time span");
            ui.add(egui::DragValue::new(&mut params.time_span.0).speed(0.1));
            ui.add(egui::DragValue::new(&mut params.time_span.1).speed(0.1));
        });
        coefficient(ui, "time step", &mut params.time_step, 0.01);
        match params.frame_count() {
            0 => ui.colored_label(egui::Color32::YELLOW, "no frames for this time span"),
            n => ui.label(format!("{n} frames")),
        };
        ui.checkbox(&mut params.grid, "grid lines");

        ui.separator();
        ui.heading("Kinetics");
        coefficient(ui, "k1", &mut params.k1, 0.01);
        coefficient(ui, "k2", &mut params.k2, 0.01);
        coefficient(ui, "k3", &mut params.k3, 0.01);
        coefficient(ui, "k4", &mut params.k4, 0.001);
        coefficient(ui, "k5", &mut params.k5, 0.01);
        coefficient(ui, "D1", &mut params.d1, 0.0001);
        coefficient(ui, "D2", &mut params.d2, 0.0001);

        ui.separator();
        ui.heading("Initial conditions");
        coefficient(ui, "A_0", &mut params.a_0, 0.1);
        coefficient(ui, "M1_0", &mut params.m1_0, 0.1);
        coefficient(ui, "M2_0", &mut params.m2_0, 0.1);
        coefficient(ui, "P0_0", &mut params.p0_0, 0.01);
        coefficient(ui, "P1_0", &mut params.p1_0, 0.01);
        coefficient(ui, "P2_0", &mut params.p2_0, 0.01);
        coefficient(ui, "P0_0 precursor", &mut params.p0_0_with_precursor, 0.01);
        coefficient(ui, "A0_0 precursor", &mut params.a0_0_with_precursor, 0.1);

        if params != *current {
            self.session.parameters.set(params);
        }

        ui.separator();
        ui.horizontal(|ui| {
            let label = if self.pending.is_empty() {
                "Solve"
            } else {
                "Solving..."
            };
            if ui.button(label).clicked() {
                self.start_solve(ctx);
            }
            if ui.button("Reset parameters").clicked() {
                self.session.parameters.reset();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Clear precursors").clicked() {
                self.session.precursor_squares.reset();
            }
            if ui.button("Reset view").clicked() {
                self.session.camera.reset();
            }
            if ui.button("Reset all").clicked() {
                self.session.reset_all();
            }
        });
        ui.label(format!(
            "{} precursor squares",
            self.session.precursor_squares.get().len()
        ));
    }

    fn timeline(&mut self, ui: &mut egui::Ui) {
        let solution = self.session.solution.get();
        let Some(solution) = (*solution).as_ref() else {
            ui.label("No solution yet: mark precursor squares and press Solve.");
            return;
        };
        if solution.frame_count() == 0 {
            ui.label("The solver returned no frames.");
            return;
        }

        let mut index = self.frame_index.get().min(solution.frame_count() - 1);
        ui.horizontal(|ui| {
            let last = solution.frame_count() - 1;
            ui.add(egui::Slider::new(&mut index, 0..=last).text("frame"));
            if let Some(t) = solution.t.get(index) {
                ui.label(format!("t = {t:.2}"));
            }
        });
        self.frame_index.set(index);
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let origin = Vec2::new(rect.left(), rect.top());

        // Pan with primary drag, zoom under the cursor with the wheel.
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.session.camera.pan(Vec2::new(delta.x, delta.y));
        }
        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                let factor = (scroll * ZOOM_PER_SCROLL_POINT).exp();
                let pivot = Vec2::new(hover.x, hover.y) - origin;
                self.session.camera.zoom_about(factor, pivot);
            }
        }

        let camera = *self.session.camera.get();
        let params = self.session.parameters.get();
        let grid_size = params.grid_size;

        // Click toggles the precursor mark of the cell under the cursor.
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let world =
                    camera.screen_to_world(Vec2::new(pos.x, pos.y) - origin) / BASE_CELL_SIZE;
                if world.x >= 0.0 && world.y >= 0.0 {
                    let square = Square::new(world.y as usize, world.x as usize);
                    if square.is_within(grid_size) {
                        self.session.precursor_squares.toggle(square);
                    }
                }
            }
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));

        let cell_rect = |row: usize, col: usize| {
            let min = camera.world_to_screen(Vec2::new(col as f32, row as f32) * BASE_CELL_SIZE);
            let size = BASE_CELL_SIZE * camera.zoom;
            egui::Rect::from_min_size(
                egui::Pos2::new(rect.left() + min.x, rect.top() + min.y),
                egui::Vec2::splat(size),
            )
        };

        let solution = self.session.solution.get();
        let pigments = (*solution).as_ref().and_then(|s| {
            let frame = s.frame(self.frame_index.get())?;
            (s.grid_size == grid_size).then(|| frame.pigments())
        });

        for row in 0..grid_size {
            for col in 0..grid_size {
                let cell = cell_rect(row, col);
                if !rect.intersects(cell) {
                    continue;
                }
                let pigment = pigments
                    .as_ref()
                    .and_then(|p| p.get(row * grid_size + col).copied())
                    .unwrap_or(Pigment::None);
                let [r, g, b] = pigment.rgb();
                painter.rect_filled(cell, 0.0, egui::Color32::from_rgb(r, g, b));
                if params.grid {
                    painter.rect_stroke(
                        cell,
                        0.0,
                        egui::Stroke::new(0.5, egui::Color32::from_gray(160)),
                    );
                }
            }
        }

        for square in self.session.precursor_squares.get().iter() {
            if square.is_within(grid_size) {
                painter.rect_stroke(
                    cell_rect(square.row, square.col).shrink(1.0),
                    0.0,
                    egui::Stroke::new(2.0, egui::Color32::from_rgb(220, 40, 40)),
                );
            }
        }

        if pigments.is_none() {
            painter.text(
                rect.center_top() + egui::vec2(0.0, 16.0),
                egui::Align2::CENTER_TOP,
                "No solution to display",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(220),
            );
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                for toast in self.toasts.visible(Instant::now()) {
                    let [r, g, b] = toast.color.rgb();
                    egui::Frame::none()
                        .fill(egui::Color32::from_rgb(r, g, b))
                        .rounding(4.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.colored_label(egui::Color32::WHITE, &toast.message);
                        });
                }
            });

        // Keep repainting so expired toasts disappear.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

fn coefficient(ui: &mut egui::Ui, label: &str, value: &mut f64, speed: f64) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(value).speed(speed).max_decimals(4));
    });
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_solves();

        egui::SidePanel::left("parameters")
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.parameter_panel(ui, ctx);
                });
            });

        egui::TopBottomPanel::bottom("timeline").show(ctx, |ui| {
            self.timeline(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas(ui);
        });

        self.show_toasts(ctx);
    }
}

/// Window options for the viewer.
pub fn native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("eyespot - Reaction-Diffusion Viewer"),
        ..Default::default()
    }
}

