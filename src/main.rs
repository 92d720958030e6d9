use arboard::Clipboard;
use macroquad::prelude::*;
use pathsim::input::{InputController, Key, PointerButton};
use pathsim::{CellStatus, Config, Coord, RenderCell, SessionController, SessionPhase};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static CONFIG: OnceLock<Config> = OnceLock::new();

fn config() -> &'static Config {
    CONFIG.get_or_init(Config::load)
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba(r, g, b, 255)
}

/// Visualization state
struct App {
    session: SessionController,
    input: InputController,
    cell_size: f32,
    /// Seconds of simulation owed to the fixed-rate update loop
    lag: f64,
}

impl App {
    fn new(config: &Config) -> Self {
        let session = SessionController::new(config.grid.width, config.grid.height)
            .with_visit_delay(config.search.visit_delay());
        App {
            session,
            input: InputController::new(config.input.double_click_updates),
            cell_size: config.grid.cell_size as f32,
            lag: 0.0,
        }
    }

    fn cell_under(&self, (mouse_x, mouse_y): (f32, f32)) -> Option<Coord> {
        if mouse_x < 0.0 || mouse_y < 0.0 {
            return None;
        }
        let col = (mouse_x / self.cell_size) as i32;
        let row = (mouse_y / self.cell_size) as i32;
        let coord = Coord::new(col, row);
        self.session.grid().in_bounds(coord).then_some(coord)
    }

    fn handle_input(&mut self) {
        let pointer = self.cell_under(mouse_position());
        self.input.handle_pointer_move(pointer);

        let buttons = [
            (MouseButton::Left, PointerButton::Primary),
            (MouseButton::Right, PointerButton::Secondary),
            (MouseButton::Middle, PointerButton::Middle),
        ];
        if let Some(coord) = pointer {
            for (mouse, button) in buttons {
                if is_mouse_button_pressed(mouse) {
                    self.input.handle_pointer_down(button, coord);
                }
                if is_mouse_button_released(mouse) {
                    self.input.handle_pointer_up(button, coord);
                }
            }
        } else {
            // Releasing outside the board must still let go of the button
            for (mouse, button) in buttons {
                if is_mouse_button_released(mouse) {
                    self.input.handle_pointer_up(button, Coord::new(-1, -1));
                }
            }
        }

        if is_key_pressed(KeyCode::Space) {
            self.input.handle_key(&mut self.session, Key::Space);
        }
        if is_key_pressed(KeyCode::Escape) {
            self.input.handle_key(&mut self.session, Key::Escape);
        }
        if is_key_pressed(KeyCode::C) {
            self.copy_to_clipboard();
        }
    }

    /// Run as many fixed updates as the elapsed frame time owes, capped
    fn update(&mut self, config: &Config) {
        let step = config.timing.update_step().as_secs_f64();
        self.lag += get_frame_time() as f64;
        let mut updates = 0;
        while self.lag >= step && updates < config.timing.max_updates_per_frame {
            self.session.poll();
            self.input.update(&mut self.session);
            self.lag -= step;
            updates += 1;
        }
        if updates == config.timing.max_updates_per_frame {
            self.lag = self.lag.min(step);
        }
    }

    fn copy_to_clipboard(&self) {
        let text = self.session.render_text();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(&text) {
                    tracing::warn!("failed to copy to clipboard: {}", e);
                } else {
                    tracing::info!("board copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => tracing::warn!("failed to access clipboard: {}", e),
        }
    }

    fn cell_color(&self, cell: &RenderCell, config: &Config) -> (Color, bool) {
        let visual = &config.visual;
        match cell.status {
            CellStatus::Tracked => (rgb(visual.tracked), true),
            CellStatus::Blocked => (rgb(visual.blocked), true),
            CellStatus::Open if cell.is_route => (rgb(visual.route), true),
            CellStatus::Open if cell.is_frontier => (rgb(visual.frontier), true),
            CellStatus::Open => (rgb(visual.open), false),
        }
    }

    fn draw(&self, config: &Config) {
        clear_background(rgb(config.visual.background));
        let size = self.cell_size;

        for cell in self.session.renderable_cells() {
            let px = cell.coord.col as f32 * size;
            let py = cell.coord.row as f32 * size;
            let (color, filled) = self.cell_color(&cell, config);
            if filled {
                draw_rectangle(px, py, size, size, color);
            } else {
                draw_rectangle_lines(px, py, size, size, 1.0, color);
            }
        }

        if self.session.phase() != SessionPhase::Running {
            if let Some(coord) = self.input.pointer() {
                let hover = rgb(config.visual.hover);
                draw_rectangle(coord.col as f32 * size, coord.row as f32 * size, size, size, hover);
            }
        }

        let status = match (self.session.phase(), self.session.route_cost()) {
            (SessionPhase::Completed, Some(cost)) => {
                format!("Route: {} cells, cost {:.2}", self.session.route().len(), cost)
            }
            (SessionPhase::Running, _) => {
                format!("Searching... {} visited", self.session.frontier().len())
            }
            (phase, _) => format!("{:?}", phase),
        };
        draw_text(&status, 6.0, screen_height() - 8.0, 20.0, WHITE);
    }
}

fn window_conf() -> Conf {
    let config = config();
    let (width, height) = config.window_size();
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: width,
        window_height: height,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = config();
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(
        width = config.grid.width,
        height = config.grid.height,
        cell_size = config.grid.cell_size,
        "board ready: drag to paint, double-click for endpoints, Space to search"
    );

    let mut app = App::new(config);

    loop {
        if is_key_pressed(KeyCode::Q) {
            break;
        }

        app.handle_input();
        app.update(config);
        app.draw(config);

        next_frame().await
    }
}
