mod logging;

use clap::{Parser, Subcommand};
use colored::Colorize;
use image::Rgba;
use std::path::{Path, PathBuf};
use std::process;

use payscan_core::keypad::{replay, Key};
use payscan_core::qr::{self, ErrorCorrection, Overlay, QrStyle};
use payscan_core::{
    normalize_display, parse_amount, Error, Generator, JsonFileStore, Settings, SettingsStore,
};

/// PayScan: turn an amount into a scannable pay request
///
/// Save the payee once, then generate a QR code per payment.
#[derive(Parser)]
#[command(name = "payscan", version, about, long_about = None)]
struct Cli {
    /// Settings file (local key-value store)
    #[arg(
        long,
        global = true,
        env = "PAYSCAN_SETTINGS",
        default_value = "payscan-settings.json"
    )]
    settings: PathBuf,

    /// Suppress confirmations
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the payee (name + IBAN)
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Normalize raw amount input the way the amount field does
    Normalize {
        /// Raw input
        raw: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay keypad taps (0-9, 00, C, ⌫/back, `,` or `.`) from an empty field
    Keypad {
        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },

    /// Build the pay URL and render it as a QR code
    Generate {
        /// Amount as typed
        amount: String,
        /// URL of the app page; the pay page sits next to it
        #[arg(long, env = "PAYSCAN_APP_URL", default_value = "http://localhost:8080/app/")]
        app_url: String,
        /// PNG file to write
        #[arg(long, short, default_value = "payscan-qr.png")]
        output: PathBuf,
        /// Logo composited at the center of the code
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Canvas side in pixels
        #[arg(
            long,
            default_value_t = 300,
            value_parser = clap::value_parser!(u32).range(1..=qr::MAX_CANVAS_SIDE as i64)
        )]
        size: u32,
        /// Module colour
        #[arg(long, default_value = "#ffffff", value_parser = parse_color)]
        dark: Rgba<u8>,
        /// Background colour
        #[arg(long, default_value = "#0f1117", value_parser = parse_color)]
        light: Rgba<u8>,
        /// Error-correction level (L, M, Q, H)
        #[arg(long, default_value = "H")]
        ecc: ErrorCorrection,
        /// Print the URL only, skip rendering
        #[arg(long)]
        no_qr: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the saved settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate and save name + IBAN
    Set {
        #[arg(long)]
        name: String,
        #[arg(long)]
        iban: String,
    },
}

struct RenderOptions {
    output: PathBuf,
    logo: Option<PathBuf>,
    style: QrStyle,
    skip: bool,
}

fn parse_color(text: &str) -> Result<Rgba<u8>, String> {
    qr::parse_hex_color(text).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging();

    let store = JsonFileStore::new(&cli.settings);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Settings { action } => match action {
            SettingsAction::Show { json } => show_settings(&store, json),
            SettingsAction::Set { name, iban } => save_settings(&store, &name, &iban, quiet),
        },
        Commands::Normalize { raw, json } => {
            print_normalized(&raw, json);
            Ok(())
        }
        Commands::Keypad { keys } => {
            println!("{}", replay_keys(&keys));
            Ok(())
        }
        Commands::Generate {
            amount,
            app_url,
            output,
            logo,
            size,
            dark,
            light,
            ecc,
            no_qr,
            json,
        } => {
            let render = RenderOptions {
                output,
                logo,
                style: QrStyle {
                    size,
                    dark,
                    light,
                    ecc,
                    ..QrStyle::default()
                },
                skip: no_qr,
            };
            generate(store, &amount, &app_url, &render, json, quiet)
        }
        Commands::Version => {
            println!(
                "payscan {} (payscan-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        }
    };

    process::exit(exit_code(result));
}

/// 0 on success, 1 for user-input notices, 2 for everything else
fn exit_code(result: payscan_core::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) if e.is_notice() => {
            eprintln!("{} {}", "notice:".yellow().bold(), e);
            1
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            2
        }
    }
}

// ── Settings ──────────────────────────────────────────────

fn show_settings(store: &JsonFileStore, json: bool) -> payscan_core::Result<()> {
    let settings = store.load();
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let or_unset = |value: &str| {
        if value.is_empty() {
            "(not set)".dimmed().to_string()
        } else {
            value.to_string()
        }
    };
    println!("name: {}", or_unset(&settings.name));
    println!("iban: {}", or_unset(&settings.iban));
    Ok(())
}

fn save_settings(
    store: &JsonFileStore,
    name: &str,
    iban: &str,
    quiet: bool,
) -> payscan_core::Result<()> {
    let settings = Settings::validated(name, iban)?;
    store.save(&settings)?;
    if !quiet {
        println!("{} {}", "✓".green().bold(), "Settings saved.");
    }
    Ok(())
}

// ── Amount field ──────────────────────────────────────────

fn print_normalized(raw: &str, json: bool) {
    let display = normalize_display(raw);
    if json {
        let output = serde_json::json!({
            "input": raw,
            "display": display,
            "value": parse_amount(&display),
        });
        println!("{}", output);
    } else {
        println!("{}", display);
    }
}

fn replay_keys(labels: &[String]) -> String {
    let keys = labels.iter().filter_map(|label| {
        let key = Key::parse(label);
        if key.is_none() {
            tracing::warn!("ignoring unknown key {:?}", label);
        }
        key
    });
    replay(keys)
}

// ── Generation ────────────────────────────────────────────

fn generate(
    store: JsonFileStore,
    amount: &str,
    app_url: &str,
    render: &RenderOptions,
    json: bool,
    quiet: bool,
) -> payscan_core::Result<()> {
    let generator = Generator::for_app_url(store, app_url)?;
    let display = normalize_display(amount);
    let (request, url) = generator.generate(&display)?;

    let qr_path = if render.skip {
        None
    } else {
        write_qr(url.as_str(), render)?;
        Some(render.output.as_path())
    };

    if json {
        let output = serde_json::json!({
            "url": url.as_str(),
            "request": request,
            "qr": qr_path.map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", url);
    if !quiet {
        eprintln!("{} {} {}", "amount:".bold(), request.amount, request.reference.dimmed());
        if let Some(path) = qr_path {
            eprintln!("{} QR code written to {}", "✓".green().bold(), path.display());
        }
    }
    Ok(())
}

fn write_qr(text: &str, render: &RenderOptions) -> payscan_core::Result<()> {
    let logo = render.logo.as_deref().and_then(qr::load_logo);
    let canvas = qr::render_with_logo(text, &render.style, logo.as_ref(), &Overlay::default())?;
    save_qr(&canvas, &render.output)
}

fn save_qr(canvas: &image::RgbaImage, path: &Path) -> payscan_core::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(Error::from)?;
        }
    }
    qr::save_png(canvas, path)
}
