/*!
 * Desktop window for gdp-viewer: pick a country and a year range, then view
 * GDP, GDP per capita and (optionally) population as stacked line charts.
 *
 * Network calls run on the UI thread. Each one is queued for a frame so the status
 * line shows what is being fetched before the window blocks.
 *
 * Platform support: Windows, macOS, Linux
 */

use chrono::Datelike;
use eframe::egui;
use gdp_viewer::models::FIRST_DATA_YEAR;
use gdp_viewer::{Client, ClientConfig, CountryProfile, HttpTransport, Transport, YearRange};
use gdp_viewer::{storage, viz};
use std::path::PathBuf;

const CHART_WIDTH: u32 = 860;
const CHART_HEIGHT: u32 = 600;

fn main() -> Result<(), eframe::Error> {
    // RUST_LOG=info shows request diagnostics
    env_logger::init();

    let client = match Client::new(&ClientConfig::from_env()) {
        Ok(client) => client,
        Err(err) => {
            log::error!("cannot create HTTP client: {}", err);
            eprintln!("gdpv-gui: {}", err);
            std::process::exit(1);
        }
    };
    let app = GdpApp::new(client);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("GDP Viewer"),
        ..Default::default()
    };

    eframe::run_native("GDP Viewer", options, Box::new(|_cc| Ok(Box::new(app))))
}

/// What the chart currently shows.
struct Shown {
    country_name: String,
    profile: CountryProfile,
}

/// Blocking work queued by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    LoadCountries,
    Query,
}

/// A job waits one frame so its status line is painted before the call blocks.
#[derive(Debug, Clone, Copy)]
struct Pending {
    job: Job,
    painted: bool,
}

/// Main application state
struct GdpApp<T: Transport = HttpTransport> {
    client: Client<T>,

    // Input fields
    countries: Vec<String>,
    selected: String,
    start_year: i32,
    end_year: i32,
    with_population: bool,

    // UI state
    status_message: String,
    error_message: String,
    shown: Option<Shown>,
    chart: Option<egui::TextureHandle>,
    pending: Option<Pending>,
}

fn latest_year() -> i32 {
    chrono::Local::now().year()
}

impl<T: Transport> GdpApp<T> {
    fn new(client: Client<T>) -> Self {
        let mut app = Self {
            client,
            countries: Vec::new(),
            selected: String::new(),
            start_year: 1990,
            end_year: 2022.min(latest_year()),
            with_population: false,
            status_message: String::new(),
            error_message: String::new(),
            shown: None,
            chart: None,
            pending: None,
        };
        app.queue(Job::LoadCountries);
        app
    }

    fn queue(&mut self, job: Job) {
        self.status_message = match job {
            Job::LoadCountries => "Loading the country list…".to_string(),
            Job::Query => format!("Fetching data for {}…", self.selected.trim()),
        };
        self.pending = Some(Pending {
            job,
            painted: false,
        });
    }

    fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance the queued job: the first call only marks its status as painted,
    /// the next one runs it.
    fn poll_pending(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if !pending.painted {
            pending.painted = true;
            ctx.request_repaint();
            return;
        }
        let job = pending.job;
        self.pending = None;
        match job {
            Job::LoadCountries => self.load_countries(),
            Job::Query => self.fetch_and_show(ctx),
        }
    }

    fn clear_chart(&mut self) {
        self.chart = None;
        self.shown = None;
    }

    fn load_countries(&mut self) {
        self.countries = self.client.list_countries();
        if self.countries.is_empty() {
            self.status_message = "Loading the country list failed".to_string();
            self.error_message =
                "Could not load the country list. Check the network connection or proxy settings."
                    .to_string();
        } else {
            self.status_message = format!("Loaded {} countries", self.countries.len());
            self.error_message.clear();
        }
    }

    /// Soft checks before any request: a selection, a known name, an ordered range.
    fn validate_query(&self) -> Result<(String, YearRange), String> {
        let name = self.selected.trim();
        if name.is_empty() {
            return Err("Please select a country".to_string());
        }
        let Some(code) = self.client.code_for_name(name) else {
            return Err(format!("No country code found for {}", name));
        };
        let range = YearRange::new(self.start_year, self.end_year);
        range.validate(latest_year())?;
        Ok((code.to_string(), range))
    }

    fn fetch_and_show(&mut self, ctx: &egui::Context) {
        let (code, range) = match self.validate_query() {
            Ok(q) => q,
            Err(msg) => {
                self.status_message.clear();
                self.error_message = msg;
                return;
            }
        };
        let country_name = self.selected.trim().to_string();

        let profile = self
            .client
            .fetch_country_profile(&code, range, self.with_population);
        if !profile.is_complete() {
            let missing: Vec<&str> = profile.missing().iter().map(|i| i.label()).collect();
            self.clear_chart();
            self.status_message = "Fetching data failed".to_string();
            self.error_message = format!(
                "Could not fetch data for {} ({})",
                country_name,
                missing.join(", ")
            );
            return;
        }

        match viz::render_profile_rgb(&profile, &country_name, CHART_WIDTH, CHART_HEIGHT) {
            Ok(buf) => {
                let image = egui::ColorImage::from_rgb(
                    [CHART_WIDTH as usize, CHART_HEIGHT as usize],
                    &buf,
                );
                self.chart =
                    Some(ctx.load_texture("profile-chart", image, egui::TextureOptions::LINEAR));
                self.status_message = format!(
                    "Showing {} from {} to {}",
                    country_name, range.start, range.end
                );
                self.error_message.clear();
                self.shown = Some(Shown {
                    country_name,
                    profile,
                });
            }
            Err(err) => {
                self.clear_chart();
                self.status_message = "Drawing the chart failed".to_string();
                self.error_message = format!("Failed to draw chart: {}", err);
            }
        }
    }

    fn save_chart(&mut self) {
        let Some(shown) = &self.shown else { return };
        let Some(path) = save_dialog("gdp_chart.png")
            .add_filter("PNG image", &["png"])
            .add_filter("SVG image", &["svg"])
            .save_file()
        else {
            return;
        };
        match viz::render_profile(
            &shown.profile,
            &shown.country_name,
            &path,
            CHART_WIDTH,
            CHART_HEIGHT,
        ) {
            Ok(()) => self.status_message = format!("Wrote chart to {}", path.display()),
            Err(err) => self.error_message = format!("Failed to save chart: {}", err),
        }
    }

    fn export_csv(&mut self) {
        let Some(shown) = &self.shown else { return };
        let Some(path) = save_dialog("gdp_data.csv")
            .add_filter("CSV", &["csv"])
            .save_file()
        else {
            return;
        };
        match storage::save_csv(&shown.profile, &path) {
            Ok(()) => self.status_message = format!("Saved data to {}", path.display()),
            Err(err) => self.error_message = format!("Failed to save CSV: {}", err),
        }
    }
}

fn save_dialog(file_name: &str) -> rfd::FileDialog {
    let start_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    rfd::FileDialog::new()
        .set_directory(start_dir)
        .set_file_name(file_name)
}

impl<T: Transport> eframe::App for GdpApp<T> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_pending(ctx);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status_message);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Country:");
                egui::ComboBox::from_id_salt("country")
                    .width(220.0)
                    .height(320.0)
                    .selected_text(self.selected.as_str())
                    .show_ui(ui, |ui| {
                        for name in &self.countries {
                            ui.selectable_value(&mut self.selected, name.clone(), name.as_str());
                        }
                    });

                ui.label("From:");
                ui.add(egui::DragValue::new(&mut self.start_year).range(FIRST_DATA_YEAR..=latest_year()));
                ui.label("To:");
                ui.add(egui::DragValue::new(&mut self.end_year).range(FIRST_DATA_YEAR..=latest_year()));

                ui.checkbox(&mut self.with_population, "Population");

                let idle = !self.is_busy();
                if ui.add_enabled(idle, egui::Button::new("Query")).clicked() {
                    self.queue(Job::Query);
                    ctx.request_repaint();
                }
                if self.countries.is_empty()
                    && ui
                        .add_enabled(idle, egui::Button::new("Reload countries"))
                        .clicked()
                {
                    self.queue(Job::LoadCountries);
                    ctx.request_repaint();
                }
            });

            ui.horizontal(|ui| {
                let has_data = self.shown.is_some();
                if ui.add_enabled(has_data, egui::Button::new("Save chart…")).clicked() {
                    self.save_chart();
                }
                if ui.add_enabled(has_data, egui::Button::new("Export CSV…")).clicked() {
                    self.export_csv();
                }
            });

            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }

            ui.separator();

            if let Some(texture) = &self.chart {
                egui::ScrollArea::both().show(ui, |ui| {
                    ui.add(
                        egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                            .shrink_to_fit(),
                    );
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdp_viewer::{ApiError, Indicator, RawResponse, Series};
    use std::collections::BTreeMap;

    /// Serves a one-country directory; every indicator request fails.
    struct OfflineIndicators;

    impl Transport for OfflineIndicators {
        fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<RawResponse, ApiError> {
            if url.ends_with("/country") {
                let body = r#"[{"page":1,"pages":1,"per_page":"300","total":1},
                    [{"id":"DEU","name":"Germany",
                      "region":{"id":"ECS","value":"Europe & Central Asia"},
                      "incomeLevel":{"id":"HIC","value":"High income"}}]]"#;
                return Ok(RawResponse {
                    status: 200,
                    body: body.to_string(),
                });
            }
            Err(ApiError::Shape(format!("connection refused: {url}")))
        }
    }

    fn app() -> GdpApp<OfflineIndicators> {
        GdpApp::new(Client::with_transport("http://offline.test/v2", OfflineIndicators))
    }

    #[test]
    fn country_list_loads_after_status_is_painted() {
        let ctx = egui::Context::default();
        let mut app = app();
        assert!(app.is_busy());
        assert!(app.countries.is_empty());
        assert_eq!(app.status_message, "Loading the country list…");

        app.poll_pending(&ctx);
        assert!(app.countries.is_empty(), "first frame only paints the status");
        assert_eq!(app.status_message, "Loading the country list…");

        app.poll_pending(&ctx);
        assert!(!app.is_busy());
        assert_eq!(app.countries, vec!["Germany"]);
        assert_eq!(app.status_message, "Loaded 1 countries");
    }

    #[test]
    fn failed_query_clears_previous_chart() {
        let ctx = egui::Context::default();
        let mut app = app();
        app.poll_pending(&ctx);
        app.poll_pending(&ctx);

        let mut series = BTreeMap::new();
        series.insert(Indicator::Gdp, Some(Series::new()));
        app.shown = Some(Shown {
            country_name: "Germany".to_string(),
            profile: CountryProfile {
                country_code: "DEU".to_string(),
                range: YearRange::new(2000, 2001),
                series,
            },
        });

        app.selected = "Germany".to_string();
        app.start_year = 2000;
        app.end_year = 2010;
        app.queue(Job::Query);
        assert_eq!(app.status_message, "Fetching data for Germany…");

        app.poll_pending(&ctx);
        assert!(app.shown.is_some(), "nothing runs before the status is painted");
        app.poll_pending(&ctx);

        assert!(app.shown.is_none());
        assert!(app.chart.is_none());
        assert_eq!(app.status_message, "Fetching data failed");
        assert!(app.error_message.contains("Could not fetch data for Germany"));
        assert!(!app.is_busy());
    }
}
