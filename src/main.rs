use colored::*;
use gamericon::{
    logger, models::decode_data_uri, Config, Dispatch, GeminiImageClient, GenerationStatus,
    IconSession, STYLES,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    logger::init_with_config(config.logger.clone())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    logger::log_config_info(&config);
    if !config.gemini.has_api_key() {
        log::warn!("⚠️  GEMINI_API_KEY is not set; every generation will fail until it is");
    }

    let client = GeminiImageClient::new(config.gemini.clone());
    let session = IconSession::new(Arc::new(client));

    println!("{}", "Gamer Icon Generator".bright_cyan().bold());
    println!("{}", "Turn your nickname into an epic icon with AI!".bright_black());
    println!("{}", "Press Ctrl-D or type :q to quit.".bright_black());

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        println!("{}", "1. Choose a style".bold());
        let current = session.snapshot().selected_style;
        for (index, style) in STYLES.iter().enumerate() {
            let marker = if style.name == current.name { "●" } else { " " };
            println!("  {} {}. {}", marker.cyan(), index + 1, style.name);
        }

        let choice = match read_line(&mut input, &format!("Style [{}]: ", current.name)).await? {
            Some(line) => line,
            None => break,
        };
        if is_quit(&choice) {
            break;
        }
        let choice = choice.trim();
        if !choice.is_empty() {
            let name = match choice.parse::<usize>() {
                Ok(n) if (1..=STYLES.len()).contains(&n) => STYLES[n - 1].name,
                _ => choice,
            };
            if !session.select_style(name) {
                println!("{}", format!("Unknown style: {}", choice).red());
                continue;
            }
        }

        println!("{}", "2. Type your nickname".bold());
        let nickname = match read_line(&mut input, "Nickname: ").await? {
            Some(line) => line,
            None => break,
        };
        if is_quit(&nickname) {
            break;
        }
        session.set_nickname(nickname);

        if run_generation(&session).await == Dispatch::Ignored {
            println!("{}", "Type a nickname to generate an icon.".yellow());
            continue;
        }

        let state = session.snapshot();
        match &state.status {
            GenerationStatus::Succeeded(uri) => {
                println!("{}", "✨ Your icon is ready!".green().bold());
                let filename = state.download_filename();
                let answer = read_line(&mut input, &format!("Save as {}? [Y/n]: ", filename))
                    .await?
                    .unwrap_or_default();
                if !answer.trim().eq_ignore_ascii_case("n") {
                    match save_icon(uri, &filename).await {
                        Ok(()) => println!("💾 Saved {}", filename.bold()),
                        Err(e) => {
                            log::error!("Failed to save {}: {}", filename, e);
                            println!("{}", format!("Could not save the icon: {}", e).red());
                        }
                    }
                }
            }
            GenerationStatus::Failed(message) => {
                println!("{}", "Oops! Something went wrong.".red().bold());
                println!("{}", message.red());
            }
            GenerationStatus::Idle | GenerationStatus::InFlight => {}
        }
    }

    println!();
    println!("{}", "Powered by the Gemini API".bright_black());
    Ok(())
}

async fn read_line(
    input: &mut Lines<BufReader<Stdin>>,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    input.next_line().await
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), ":q" | ":quit")
}

/// Drives the session while drawing a spinner until the attempt settles.
async fn run_generation(session: &IconSession) -> Dispatch {
    let generation = session.submit();
    futures::pin_mut!(generation);

    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let mut frame = 0usize;

    loop {
        tokio::select! {
            dispatch = &mut generation => {
                if frame > 0 {
                    print!("\r\x1b[2K");
                    let _ = std::io::stdout().flush();
                }
                return dispatch;
            }
            _ = ticker.tick() => {
                let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()].to_string();
                print!("\r{} Creating your masterpiece...", glyph.cyan());
                let _ = std::io::stdout().flush();
                frame += 1;
            }
        }
    }
}

async fn save_icon(uri: &str, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (mime, bytes) = decode_data_uri(uri)?;
    if mime != "image/png" {
        log::debug!("Saving {} payload under a .png name", mime);
    }
    tokio::fs::write(filename, bytes).await?;
    Ok(())
}
