// SpecHack
// copyright zipxing@hotmail.com 2022～2025

/// spechack command line tool...
///
/// Usage:
/// spechack card "ada lovelace"
/// spechack card "ada lovelace" --json
/// spechack export "ada lovelace" -o out --font assets/Orbitron.ttf
/// spechack export "ada lovelace" --back
/// spechack challenge "ada lovelace" --origin https://spechack.404tf.com --locale en
/// spechack open es mar%C3%ADa
/// spechack register --name "Ada" --email ada@x.io --city Lima --track hub --locale es
/// spechack ambassador --name "Ada" --email ada@x.io --city Lima --community "..." --locale es
/// spechack reveal "ada lovelace" --seconds 4
/// spechack reveal "ada lovelace" --fail-3d
///
/// every command reads spechack.toml, or the file given by --config
use clap::{Parser, Subcommand};
use log::info;
use spechack::{
    analytics::AnalyticsClient,
    card::{generate_deterministic_card, CardData, Locale},
    config::{get_config, init_config, SpechackConfig, CONFIG_FILE},
    error::{ExportError, RenderError},
    log::{init_log, level_from_str},
    registration::{
        submit_ambassador, AmbassadorInput, JsonAmbassadorStore, JsonFileStore, Registrar,
        RegistrationInput, RegistrationOutcome,
    },
    render::{export_card, CardSide, FlatCard, TextRenderer},
    scene::{mount_card_view, CardView, FailingBackend, HeadlessBackend, RenderBackend},
    share::{resolve_challenge, CardActions, ChallengeResolution},
    storage::CardStorage,
    REVEAL_FRAME,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "spechack")]
#[command(author = "zipxing@hotmail.com")]
#[command(about = "SpecHack agent credential cards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the deterministic card of a name
    Card {
        name: String,
        #[arg(long)]
        json: bool,
        #[arg(long, default_value = "es")]
        locale: String,
    },

    /// Rasterize a card to png
    Export {
        name: String,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// export the back face instead of the front
        #[arg(long)]
        back: bool,
        /// ttf/otf font for the card text, overrides font_path of the config
        #[arg(long)]
        font: Option<String>,
        #[arg(long, default_value = "es")]
        locale: String,
    },

    /// Share links of a card
    Challenge {
        name: String,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long, default_value = "es")]
        locale: String,
    },

    /// Resolve a challenge path segment like a visitor would
    Open { locale: String, segment: String },

    /// Register a participant
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "virtual")]
        track: String,
        #[arg(long, default_value = "es")]
        locale: String,
        /// participants json, overrides store_path of the config
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Apply as hub ambassador
    Ambassador {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        community: String,
        #[arg(long, default_value = "es")]
        locale: String,
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Run the reveal sequence headless and report its phases
    Reveal {
        name: String,
        #[arg(long, default_value_t = REVEAL_FRAME)]
        fps: u32,
        #[arg(long, default_value_t = 4.0)]
        seconds: f64,
        /// pretend no 3d context is available
        #[arg(long)]
        fail_3d: bool,
        /// probe a real gpu
        #[cfg(wgpu_backend)]
        #[arg(long)]
        gpu: bool,
        #[arg(long, default_value = "es")]
        locale: String,
    },
}

fn locale_arg(s: &str) -> Result<Locale, String> {
    Locale::parse(s).ok_or_else(|| format!("unknown locale '{}', use es or en", s))
}

fn print_card(card: &CardData, locale: Locale) {
    for line in FlatCard::new(card, locale).lines() {
        println!("  {}", line);
    }
}

fn load_font(path: Option<&str>) -> Result<Option<TextRenderer>, ExportError> {
    match path {
        Some(p) => Ok(Some(TextRenderer::from_file(p)?)),
        None => Ok(None),
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let cfg = get_config();
    match cli.command {
        Commands::Card { name, json, locale } => {
            let card = generate_deterministic_card(&name);
            if json {
                let s = serde_json::to_string_pretty(&card).map_err(|e| e.to_string())?;
                println!("{}", s);
            } else {
                print_card(&card, locale_arg(&locale)?);
            }
        }
        Commands::Export {
            name,
            out,
            back,
            font,
            locale,
        } => {
            let card = generate_deterministic_card(&name);
            let font = font.or_else(|| cfg.font_path.clone());
            let text = load_font(font.as_deref()).map_err(|e| e.to_string())?;
            let side = if back { CardSide::Back } else { CardSide::Front };
            let path = export_card(&card, locale_arg(&locale)?, side, &out, text.as_ref())
                .map_err(|e| e.to_string())?;
            println!("🍭 Card saved to {}", path.display());
        }
        Commands::Challenge {
            name,
            origin,
            locale,
        } => {
            let card = generate_deterministic_card(&name);
            let origin = origin.unwrap_or_else(|| cfg.origin.clone());
            let actions = CardActions::new(&card, locale_arg(&locale)?, &origin);
            println!("link      {}", actions.challenge_link());
            println!("x         {}", actions.tweet_url());
            println!("whatsapp  {}", actions.whatsapp_url());
            println!("linkedin  {}", actions.linkedin_url());
            println!("download  {}", actions.download_name());
        }
        Commands::Open { locale, segment } => {
            let locale = locale_arg(&locale)?;
            let storage = CardStorage::open(&cfg.storage_path);
            match resolve_challenge(locale, &segment, &storage) {
                ChallengeResolution::Redirect(to) => println!("redirect → {}", to),
                ChallengeResolution::Preview(page) => {
                    println!("challenged by {}", page.display_name);
                    print_card(&page.challenger, locale);
                    if let Some(own) = page.returning {
                        println!("your card:");
                        print_card(&own, locale);
                    }
                }
            }
        }
        Commands::Register {
            name,
            email,
            city,
            track,
            locale,
            store,
        } => {
            let path = store.unwrap_or_else(|| PathBuf::from(&cfg.store_path));
            let mut registrar =
                Registrar::new(JsonFileStore::open(path), AnalyticsClient::from_config(cfg));
            let input = RegistrationInput {
                name,
                email,
                city,
                track,
                locale,
            };
            let mut storage = CardStorage::open(&cfg.storage_path);
            match registrar.submit_from_device(&input, &mut storage) {
                RegistrationOutcome::Returning(card) => {
                    println!("🍭 Card already on this device, registration skipped");
                    print_card(&card, locale_arg(&input.locale).unwrap_or_default());
                }
                RegistrationOutcome::Submitted { response, card } => {
                    let s = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
                    println!("{}", s);
                    if let Some(card) = card {
                        print_card(&card, locale_arg(&input.locale).unwrap_or_default());
                    }
                    if !response.success {
                        return Err(response.message);
                    }
                }
            }
        }
        Commands::Ambassador {
            name,
            email,
            city,
            community,
            locale,
            store,
        } => {
            let path = store.unwrap_or_else(|| PathBuf::from(&cfg.ambassador_path));
            let resp = submit_ambassador(
                &mut JsonAmbassadorStore::open(path),
                &AmbassadorInput {
                    name,
                    email,
                    city,
                    community,
                    locale,
                },
            );
            let s = serde_json::to_string_pretty(&resp).map_err(|e| e.to_string())?;
            println!("{}", s);
            if !resp.success {
                return Err(resp.message);
            }
        }
        Commands::Reveal {
            name,
            fps,
            seconds,
            fail_3d,
            #[cfg(wgpu_backend)]
            gpu,
            locale,
        } => {
            let card = generate_deterministic_card(&name);
            let locale = locale_arg(&locale)?;
            #[cfg(wgpu_backend)]
            let use_gpu = gpu;
            #[cfg(not(wgpu_backend))]
            let use_gpu = false;
            let mut backend: Box<dyn RenderBackend> = match (fail_3d, use_gpu) {
                (true, _) => Box::new(FailingBackend(RenderError::NoAdapter)),
                #[cfg(wgpu_backend)]
                (false, true) => Box::new(spechack::scene::WgpuBackend),
                _ => Box::new(HeadlessBackend),
            };
            reveal(&card, locale, backend.as_mut(), fps.max(1), seconds)?;
        }
    }
    Ok(())
}

fn reveal(
    card: &CardData,
    locale: Locale,
    backend: &mut dyn RenderBackend,
    fps: u32,
    seconds: f64,
) -> Result<(), String> {
    let view = mount_card_view(card, locale, backend, get_config().reveal);
    let actions = view.actions(&get_config().origin);
    match view {
        CardView::Flat(flat) => {
            println!("3d unavailable, flat card:");
            for line in flat.lines() {
                println!("  {}", line);
            }
        }
        CardView::Scene3D(mut scene) => {
            scene.on_reveal_complete(|| println!("✔ reveal complete"));
            let dt = 1.0 / fps as f64;
            let frames = (seconds * fps as f64).ceil() as u64;
            let mut phase = scene.phase();
            println!("{:>6.2}s {}", 0.0, phase);
            for i in 1..=frames {
                scene.on_tick(dt);
                if scene.phase() != phase {
                    phase = scene.phase();
                    println!("{:>6.2}s {}", i as f64 * dt, phase);
                }
            }
            scene.unmount();
        }
    }
    println!("share: {}", actions.challenge_link());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let cfg = match SpechackConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_log(level_from_str(&cfg.log_level), &cfg.log_file) {
        eprintln!("log disabled: {}", e);
    }
    init_config(cfg);
    info!("spechack started");
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
