mod markdown;
mod state;

use eframe::egui;
use parking_lot::Mutex;
use shared::agent_api::Role;
use shared::settings::ClientSettings;
use shared::Mode;
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const USER_COLOR: egui::Color32 = egui::Color32::from_rgb(30, 64, 175);
const ASSISTANT_COLOR: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let settings = ClientSettings::from_env();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 900.0])
            .with_min_inner_size([480.0, 600.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "AI Career Mentor",
        options,
        Box::new(move |_cc| {
            Box::new(CareerMentorApp {
                state: Arc::new(Mutex::new(AppState::new(&settings))),
            })
        }),
    )
}

struct CareerMentorApp {
    state: Arc<Mutex<AppState>>,
}

impl eframe::App for CareerMentorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut s = self.state.lock();

        // Poll for the generation result (non-blocking)
        s.poll_response();
        if s.session.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| ui.heading("AI Career Mentor Agent"));
                ui.add_space(12.0);

                if let Some(err) = &s.startup_error {
                    ui.colored_label(ERROR_COLOR, format!("Client not configured: {}", err));
                    ui.add_space(8.0);
                }

                render_form(ui, &mut s);
                render_error(ui, &s);
                render_result(ui, &s);
                render_history(ui, &s);
            });
        });
    }
}

fn render_form(ui: &mut egui::Ui, s: &mut AppState) {
    ui.label("Your Skills");
    ui.add(
        egui::TextEdit::singleline(&mut s.form.skills)
            .hint_text("Example: Python, JavaScript, Data Analysis")
            .desired_width(f32::INFINITY),
    );
    ui.add_space(6.0);

    ui.label("Your Interests");
    ui.add(
        egui::TextEdit::singleline(&mut s.form.interests)
            .hint_text("Example: Web Development, AI, Cybersecurity")
            .desired_width(f32::INFINITY),
    );
    ui.add_space(6.0);

    ui.label("Your Career Goals");
    ui.add(
        egui::TextEdit::multiline(&mut s.form.goals)
            .hint_text("Example: Become a Full-stack Developer in 2 years")
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(6.0);

    let mut mode = s.session.mode();
    egui::ComboBox::from_label("Roadmap Type")
        .selected_text(mode.label())
        .show_ui(ui, |ui| {
            for m in Mode::ALL {
                ui.selectable_value(&mut mode, m, m.label());
            }
        });
    if mode != s.session.mode() {
        s.session.set_mode(mode);
    }
    ui.add_space(8.0);

    let label = if s.session.is_loading() {
        "Generating..."
    } else {
        "Generate User Selection"
    };
    let button = egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 32.0));
    if ui.add_enabled(s.can_submit(), button).clicked() {
        s.submit();
    }
}

fn render_error(ui: &mut egui::Ui, s: &AppState) {
    if let Some(err) = s.session.error() {
        ui.add_space(10.0);
        egui::Frame::group(ui.style())
            .fill(egui::Color32::from_rgb(254, 242, 242))
            .show(ui, |ui| {
                ui.colored_label(ERROR_COLOR, err);
            });
    }
}

fn render_result(ui: &mut egui::Ui, s: &AppState) {
    let Some(result) = s.session.result() else {
        return;
    };
    ui.add_space(14.0);
    ui.heading("Your Career Roadmap:");
    if ui.link("Copy to Clipboard").clicked() {
        let text = result.to_string();
        ui.output_mut(|o| o.copied_text = text);
    }
    egui::Frame::group(ui.style()).show(ui, |ui| {
        markdown::render_markdown(ui, result, ASSISTANT_COLOR);
    });
}

fn render_history(ui: &mut egui::Ui, s: &AppState) {
    let conversation = s.session.conversation();
    if conversation.is_empty() {
        return;
    }
    ui.add_space(14.0);
    ui.heading("Chat History:");
    for turn in conversation.turns() {
        let (who, color) = match turn.role {
            Role::User => ("You", USER_COLOR),
            _ => ("AI", ASSISTANT_COLOR),
        };
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(format!("{}:", who)).strong().color(color));
            markdown::render_markdown(ui, &turn.content, color);
        });
        ui.add_space(4.0);
    }
}
