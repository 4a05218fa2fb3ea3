//! Interactive vine grid viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`PlantSim`] together with
//! everything the simulation leaves to its host: terrain rocks, the seed
//! wallet, bugs, and the camera. It implements [`eframe::App`] to render
//! and control the simulation through an egui UI.

use crate::wallet::{BRANCH_COST, LEAF_COST, LogSounds, Wallet};
use eframe::App;
use glam::Vec2;
use rand::{Rng, rng, rngs::ThreadRng};
use vine_core::{
    config::Config,
    grid::adjacent_node_position,
    growth::{LeafGrowth, direction_for_angle},
    sim::{PlantSim, StepReport},
    types::{BranchType, Direction, GridPos, HazardId, LeafType, WorldRect},
};

const WORLD_SIZE: Vec2 = Vec2::new(960.0, 640.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tool {
    Branch,
    Leaf,
    Upgrade,
    Destroy,
    Bug,
}

/// A hazard owned by the viewer, sitting on a leaf.
#[derive(Clone, Copy, Debug)]
struct Bug {
    id: HazardId,
    pos: GridPos,
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input (the active tool acts on clicks).
/// 2. If `running` is `true` and `step_interval` has passed, call
///    [`Viewer::step_once`].
/// 3. Render terrain, lattice, plant, bugs and tool hints.
///
/// ### Fields
/// - `sim` - The plant simulation, with the wallet and sound log injected.
/// - `cfg` - Configuration being edited in the side panel; applied on demand.
/// - `rocks` - Static terrain, probed only when the grid is rebuilt.
/// - `bugs` - Hazards currently feeding on leaves.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` / `pan` - Camera.
///
/// - `step_interval` - Simulated seconds per step, also the wall-clock pacing.
/// - `last_step_time` - Time stamp of the last step (egui time).
pub struct Viewer {
    sim: PlantSim<Wallet, LogSounds>,
    cfg: Config,
    world_size: Vec2,
    rocks: Vec<WorldRect>,
    rock_count: usize,
    bugs: Vec<Bug>,
    next_bug: u32,

    rng: ThreadRng,

    tool: Tool,
    upgrade_kind: BranchType,
    leaf_width: f32,
    /// Leaf health eaten per bug per second.
    bite_rate: f32,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    message: String,
}

/// Random boxes scattered over the world; some land on the ground and
/// disable anchors.
fn scatter_rocks(world: Vec2, count: usize, rng: &mut impl Rng) -> Vec<WorldRect> {
    (0..count)
        .map(|_| {
            let center = Vec2::new(rng.random_range(0.0..world.x), rng.random_range(0.0..world.y));
            let half = Vec2::new(rng.random_range(8.0..40.0), rng.random_range(8.0..30.0));
            WorldRect::from_center_half_extents(center, half)
        })
        .collect()
}

fn rock_probe(rocks: &[WorldRect]) -> impl Fn(WorldRect) -> bool + '_ {
    move |rect| rocks.iter().any(|rock| rock.intersects(&rect))
}

fn branch_color(kind: BranchType) -> egui::Color32 {
    match kind {
        BranchType::Normal => egui::Color32::from_rgb(110, 190, 80),
        BranchType::Thorny => egui::Color32::from_rgb(170, 60, 90),
        BranchType::Reinforced => egui::Color32::from_rgb(150, 110, 60),
    }
}

impl Viewer {
    /// Creates a viewer over a fresh grid with a random rock layout.
    pub fn new() -> Self {
        let mut rng = rng();
        let cfg = Config::default();
        let rock_count = 6;
        let rocks = scatter_rocks(WORLD_SIZE, rock_count, &mut rng);
        let sim = PlantSim::new(
            cfg,
            WORLD_SIZE,
            &rock_probe(&rocks),
            Wallet::default(),
            LogSounds::default(),
        );

        Self {
            sim,
            cfg,
            world_size: WORLD_SIZE,
            rocks,
            rock_count,
            bugs: Vec::new(),
            next_bug: 0,
            rng,
            tool: Tool::Branch,
            upgrade_kind: BranchType::Reinforced,
            leaf_width: 14.0,
            bite_rate: 0.2,
            running: false,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 1.0 / 30.0,
            last_step_time: 0.0,
            message: String::new(),
        }
    }

    /// Scatters new rocks and rebuilds the grid around them.
    ///
    /// Keeps `cfg` and the camera; the plant, bugs and wallet start over and
    /// auto-running stops.
    fn reset(&mut self) {
        self.rocks = scatter_rocks(self.world_size, self.rock_count, &mut self.rng);
        self.rebuild();
        self.running = false;
    }

    /// Rebuilds the grid with the current rocks and the edited config.
    fn rebuild(&mut self) {
        self.sim.set_config(self.cfg);
        self.sim.reset(self.world_size, &rock_probe(&self.rocks));
        *self.sim.resources_mut() = Wallet::default();
        self.bugs.clear();
        self.message.clear();
    }

    /// Advances the simulation by `dt` simulated seconds.
    ///
    /// Bugs bite first, so a leaf eaten to nothing this step releases its
    /// bug in the same step.
    fn step_once(&mut self, dt: f32) {
        self.sim.resources_mut().regenerate(dt);
        for bug in &self.bugs {
            let _ = self.sim.consume_leaf(bug.pos, self.bite_rate * dt);
        }
        let report = self.sim.step(dt);
        self.apply_report(report);
    }

    fn apply_report(&mut self, report: StepReport) {
        if report.wave_drained {
            let _ = self.sim.recalculate_max_plant_position();
        }

        self.bugs
            .retain(|bug| !report.destroyed_hazards.contains(&bug.id));

        // A bug that finished its leaf hops to another one, or flies off.
        for id in report.eaten_hazards {
            match self.sim.land_hazard(id, &mut self.rng) {
                Some(pos) => {
                    if let Some(bug) = self.bugs.iter_mut().find(|bug| bug.id == id) {
                        bug.pos = pos;
                    }
                }
                None => {
                    log::info!("bug {} found no leaf and left", id.0);
                    self.bugs.retain(|bug| bug.id != id);
                }
            }
        }
    }

    /// Node and branch slot the cursor at `world` points at.
    fn slot_under(&self, world: Vec2) -> Option<(GridPos, Direction)> {
        let grid = self.sim.grid();
        let pos = grid.world_to_grid(world);
        let rel = world - grid.grid_to_world(pos);
        direction_for_angle(rel.y.atan2(rel.x)).map(|dir| (pos, dir))
    }

    /// Runs the active tool at `world`.
    fn apply_tool(&mut self, world: Vec2) {
        self.message = match self.tool {
            Tool::Branch => match self.sim.grow_branch(world) {
                Ok(branch) => {
                    self.sim.resources_mut().spend(BRANCH_COST);
                    format!("branch {:?} from {:?}", branch.dir, branch.pos)
                }
                Err(err) => err.to_string(),
            },

            Tool::Leaf => match self.sim.grow_leaf(world, LeafType::Normal, self.leaf_width) {
                Ok(LeafGrowth::Planted(pos)) => {
                    self.sim.resources_mut().spend(LEAF_COST);
                    format!("leaf at {pos:?}")
                }
                Ok(LeafGrowth::Upgraded(pos)) => format!("bouncy leaf at {pos:?}"),
                Err(err) => err.to_string(),
            },

            Tool::Upgrade => match self.slot_under(world) {
                Some((pos, dir)) => match self.sim.upgrade_branch(pos, dir, self.upgrade_kind) {
                    Ok(branch) => format!("{:?} branch at {:?}", branch.kind, branch.pos),
                    Err(err) => err.to_string(),
                },
                None => "aim above a node".to_owned(),
            },

            Tool::Destroy => match self.sim.destroy_at(world) {
                Some(pos) => format!("cutting {pos:?}"),
                None => "nothing to cut".to_owned(),
            },

            Tool::Bug => {
                let id = HazardId(self.next_bug);
                let pos = self.sim.grid().world_to_grid(world);
                let landed = if self.sim.grid().leaf(pos).is_some() && self.sim.set_hazard(pos, id)
                {
                    Some(pos)
                } else {
                    self.sim.land_hazard(id, &mut self.rng)
                };
                match landed {
                    Some(pos) => {
                        self.next_bug += 1;
                        self.bugs.push(Bug { id, pos });
                        format!("bug {} on {pos:?}", id.0)
                    }
                    None => "no free leaf for a bug".to_owned(),
                }
            }
        };
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The world's center lands on the center of `rect`, scaled by `zoom`
    /// and offset by `pan`. The y-axis is flipped so that positive y goes up
    /// in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let p = p - self.world_size * 0.5;
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`], up to floating point rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y) + self.world_size * 0.5
    }

    fn world_rect_to_screen(&self, r: &WorldRect, rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_two_pos(self.world_to_screen(r.min, rect), self.world_to_screen(r.max, rect))
    }

    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt = ")
                        .range(0.005..=0.5)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    self.step_once(self.step_interval as f32);
                    self.last_step_time = ctx.input(|i| i.time);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Recompute height").clicked() {
                    let _ = self.sim.recalculate_max_plant_position();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.2..=5.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (plant size, collapse queue, wallet).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let grid = self.sim.grid();
        let wallet = self.sim.resources();
        let destruction = self.sim.destruction();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let seeds = format!("seeds = {:.1}  upgrades = {}", wallet.seeds, wallet.upgrades);
                if wallet.insufficient_flash > 0.0 {
                    ui.colored_label(egui::Color32::LIGHT_RED, seeds);
                } else {
                    ui.label(seeds);
                }
                ui.separator();
                match self.sim.highest_point() {
                    Some(pos) => ui.label(format!("highest = ({}, {})", pos.col, pos.row)),
                    None => ui.label("highest = -"),
                };
                ui.label(format!(
                    "queued = {}  waves = {}",
                    destruction.pending().len(),
                    destruction.waves_drained()
                ));
                ui.label(format!(
                    "branches = {}  leaves = {}  bugs = {}",
                    grid.branch_count(),
                    grid.leaf_count(),
                    self.bugs.len()
                ));
                ui.separator();
                if let Some(sound) = self.sim.sounds().last {
                    ui.label(format!("♪ {sound:?}"));
                }
                ui.label(self.message.as_str());
            });
        });
    }

    /// Builds the right-hand configuration panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Lattice (applied on rebuild)");
                Self::labeled_drag_f32(ui, "tile_size:", &mut self.cfg.tile_size, 12.0..=128.0, 0.5);
                Self::labeled_drag_usize(ui, "row_buffer:", &mut self.cfg.row_buffer, 1..=10, 1.0);
                Self::labeled_drag_f32(
                    ui,
                    "probe_half_extent:",
                    &mut self.cfg.probe_half_extent,
                    0.0..=16.0,
                    0.1,
                );
                Self::labeled_drag_f32(
                    ui,
                    "ground_probe_depth:",
                    &mut self.cfg.ground_probe_depth,
                    0.0..=64.0,
                    0.5,
                );

                ui.separator();
                ui.label("Simulation");
                Self::labeled_drag_f32(
                    ui,
                    "propagation_delay:",
                    &mut self.cfg.propagation_delay,
                    0.0..=3.0,
                    0.01,
                );
                Self::labeled_drag_f32(ui, "leaf_health:", &mut self.cfg.leaf_health, 0.1..=10.0, 0.05);
                if ui.button("Apply").clicked() {
                    self.sim.set_config(self.cfg);
                }

                ui.separator();
                ui.label("World");
                Self::labeled_drag_usize(ui, "rocks:", &mut self.rock_count, 0..=40, 1.0);
                if ui.button("Rebuild grid").clicked() {
                    self.rebuild();
                }

                ui.separator();
                ui.label("Tools");
                Self::labeled_drag_f32(ui, "leaf_width:", &mut self.leaf_width, 2.0..=40.0, 0.5);
                Self::labeled_drag_f32(ui, "bite_rate:", &mut self.bite_rate, 0.0..=5.0, 0.01);
                egui::ComboBox::from_label("upgrade to")
                    .selected_text(format!("{:?}", self.upgrade_kind))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.upgrade_kind, BranchType::Reinforced, "Reinforced");
                        ui.selectable_value(&mut self.upgrade_kind, BranchType::Thorny, "Thorny");
                        ui.selectable_value(&mut self.upgrade_kind, BranchType::Normal, "Normal");
                    });

                ui.separator();
                ui.label("Wallet");
                let wallet = self.sim.resources_mut();
                Self::labeled_drag_f32(ui, "seed_rate:", &mut wallet.seed_rate, 0.0..=10.0, 0.05);
                if ui.button("+1 upgrade").clicked() {
                    wallet.upgrades += 1;
                }

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });
    }

    /// Builds the small floating toolbar for choosing the active tool.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        const TOOLS: [(Tool, &str); 5] = [
            (Tool::Branch, "╱ Branch"),
            (Tool::Leaf, "❦ Leaf"),
            (Tool::Upgrade, "⬆ Upgrade"),
            (Tool::Destroy, "✂ Destroy"),
            (Tool::Bug, "🐞 Bug"),
        ];

        egui::Area::new("toolbar".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 100.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            for (tool, label) in TOOLS {
                                if ui.selectable_label(self.tool == tool, label).clicked() {
                                    self.tool = tool;
                                }
                            }
                        });
                    });
            });
    }

    /// Draws the hint for the active tool at the hovered world position.
    fn ui_tool_hint(&self, painter: &egui::Painter, rect: egui::Rect, hover_world: Option<Vec2>) {
        let Some(world) = hover_world else {
            return;
        };
        let grid = self.sim.grid();

        match self.tool {
            Tool::Branch => {
                for pos in grid.growable_anchors() {
                    let p = self.world_to_screen(grid.grid_to_world(pos), rect);
                    painter.circle_filled(
                        p,
                        5.0 * self.zoom,
                        egui::Color32::from_rgba_unmultiplied(255, 230, 90, 40),
                    );
                }
                if let Some(branch) = self.sim.preview_branch(world) {
                    let a = self.world_to_screen(grid.grid_to_world(branch.pos), rect);
                    let b = self.world_to_screen(
                        grid.grid_to_world(adjacent_node_position(branch.pos, branch.dir)),
                        rect,
                    );
                    painter.line_segment(
                        [a, b],
                        egui::Stroke::new(
                            3.0,
                            egui::Color32::from_rgba_unmultiplied(110, 190, 80, 90),
                        ),
                    );
                }
            }

            Tool::Upgrade => {
                if let Some((pos, dir)) = self.slot_under(world)
                    && grid.branch_exists(pos, dir)
                {
                    let a = self.world_to_screen(grid.grid_to_world(pos), rect);
                    let b = self.world_to_screen(
                        grid.grid_to_world(adjacent_node_position(pos, dir)),
                        rect,
                    );
                    painter.line_segment([a, b], egui::Stroke::new(5.0, egui::Color32::YELLOW));
                }
            }

            Tool::Leaf | Tool::Destroy | Tool::Bug => {
                let pos = grid.world_to_grid(world);
                if grid.in_bounds(pos) {
                    let p = self.world_to_screen(grid.grid_to_world(pos), rect);
                    painter.circle_stroke(
                        p,
                        6.0 * self.zoom,
                        egui::Stroke::new(1.5, egui::Color32::YELLOW),
                    );
                }
            }
        }
    }

    /// Draws terrain, lattice, plant and bugs.
    fn draw_world(&self, painter: &egui::Painter, rect: egui::Rect) {
        let grid = self.sim.grid();

        for rock in &self.rocks {
            painter.rect_filled(
                self.world_rect_to_screen(rock, rect),
                0.0,
                egui::Color32::from_gray(70),
            );
        }

        let ground = [
            self.world_to_screen(Vec2::ZERO, rect),
            self.world_to_screen(Vec2::new(self.world_size.x, 0.0), rect),
        ];
        painter.line_segment(ground, egui::Stroke::new(2.0, egui::Color32::from_rgb(120, 90, 60)));

        // Lattice dots; disabled nodes in red.
        for (pos, node) in grid.iter() {
            let p = self.world_to_screen(grid.grid_to_world(pos), rect);
            let color = if node.enabled() {
                egui::Color32::from_gray(90)
            } else {
                egui::Color32::from_rgb(120, 40, 40)
            };
            painter.circle_filled(p, 1.5, color);
        }

        for (pos, node) in grid.iter() {
            let from = self.world_to_screen(grid.grid_to_world(pos), rect);
            for dir in Direction::ALL {
                if let Some(kind) = node.branch(dir) {
                    let to = self.world_to_screen(
                        grid.grid_to_world(adjacent_node_position(pos, dir)),
                        rect,
                    );
                    let width = if kind == BranchType::Reinforced { 4.0 } else { 2.5 };
                    painter.line_segment([from, to], egui::Stroke::new(width, branch_color(kind)));
                }
            }
        }

        for (pos, node) in grid.iter() {
            let Some(leaf) = node.leaf() else {
                continue;
            };
            let p = self.world_to_screen(grid.grid_to_world(pos), rect);
            let alpha = (leaf.health / self.cfg.leaf_health.max(f32::EPSILON)).clamp(0.2, 1.0);
            let base = match leaf.kind {
                LeafType::Normal => egui::Color32::from_rgb(60, 170, 60),
                LeafType::Bouncy => egui::Color32::from_rgb(80, 170, 220),
            };
            painter.circle_filled(p, leaf.width * 0.5 * self.zoom, base.gamma_multiply(alpha));
        }

        for bug in &self.bugs {
            let p = self.world_to_screen(grid.grid_to_world(bug.pos), rect);
            painter.circle_filled(p + egui::vec2(0.0, -4.0 * self.zoom), 3.0 * self.zoom, egui::Color32::RED);
        }

        for pos in self.sim.destruction().pending() {
            let p = self.world_to_screen(grid.grid_to_world(*pos), rect);
            painter.circle_stroke(p, 5.0 * self.zoom, egui::Stroke::new(1.5, egui::Color32::ORANGE));
        }

        if let Some(top) = self.sim.highest_point() {
            let y = grid.grid_to_world(top).y;
            let line = [
                self.world_to_screen(Vec2::new(0.0, y), rect),
                self.world_to_screen(Vec2::new(self.world_size.x, y), rect),
            ];
            painter.line_segment(
                line,
                egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 215, 0, 120)),
            );
        }
    }

    /// Builds the central panel where the grid is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if response.dragged() {
                self.pan += response.drag_delta();
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            if response.clicked()
                && let Some(world) = hover_world
            {
                self.apply_tool(world);
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.2, 5.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            self.draw_world(&painter, rect);
            self.ui_tool_hint(&painter, rect, hover_world);

            if self.running {
                let now = ctx.input(|i| i.time);
                if now - self.last_step_time >= self.step_interval {
                    self.step_once(self.step_interval as f32);
                    self.last_step_time = now;
                }
                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);
    }
}
