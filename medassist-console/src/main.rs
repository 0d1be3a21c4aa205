use clap::Parser;
use medassist_console::{Console, Flow, parse};
use medassist_flow::{Assistant, ClientConfig, Language, PanelContext};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bilingual medical assistant, console edition
#[derive(Parser, Debug)]
#[command(name = "medassist")]
#[command(about = "Symptom and skin image analysis from the terminal", long_about = None)]
struct Args {
    /// YAML client configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Interface language (en or ar), overrides the configuration
    #[arg(long)]
    language: Option<Language>,
}

/// Logs go to stderr so they never mix with the rendered screens.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medassist_console=info,medassist_flow=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(language) = args.language {
        config.language = language;
    }
    let client = config.build_client()?;
    info!(language = %config.language, "Medical assistant console starting");

    let mut console = Console::new(Assistant::new(client, PanelContext::new(config.language)));
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(console.render().as_bytes()).await?;
    stdout.write_all(b"\n(type 'help' for commands)\n").await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let output = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse(&line) {
                    Ok(Some(command)) => {
                        let (flow, output) = console.execute(command);
                        if flow == Flow::Quit {
                            break;
                        }
                        output
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("{}", e);
                        e.to_string()
                    }
                }
            }
            Some((panel, applied)) = console.next_completion() => {
                match console.completed(panel, applied) {
                    Some(screen) => format!("\n{screen}"),
                    None => continue,
                }
            }
        };

        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    info!("Medical assistant console exiting");
    Ok(())
}
