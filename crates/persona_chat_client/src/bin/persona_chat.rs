//! persona-chat: terminal front-end for the persona chat service.
//! Reads config, sends messages and PDF uploads to `POST /chat`, and prints
//! the transcript to stdout as it grows.

use clap::Parser;
use persona_chat_client::config::{self, Config, ConfigError};
use persona_chat_client::render::{render_entry, render_panel};
use persona_chat_client::{ChatClient, ChatWidget, Entry, EntryId, PdfFile};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_ENV: &str = "PERSONA_CHAT_CONFIG";

#[derive(Parser)]
#[command(name = "persona-chat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with the characters of an uploaded book")]
struct Cli {
    /// Config file (default: $PERSONA_CHAT_CONFIG or ~/.persona-chat/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service base URL, overriding server.base_url
    #[arg(long)]
    url: Option<String>,

    /// PDF to upload before sending the message (repeatable)
    #[arg(long = "upload", value_name = "PATH")]
    uploads: Vec<PathBuf>,

    /// Message to send; without one, lines are read from stdin
    message: Vec<String>,
}

/// Explicit paths must exist; a missing default file means built-in defaults.
fn load_config(explicit: Option<PathBuf>) -> Result<Config, ConfigError> {
    let explicit = explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    if let Some(path) = explicit {
        return config::load(&path);
    }
    let path = config::default_config_path().ok_or(ConfigError::NoHomeDir)?;
    if path.exists() {
        config::load(&path)
    } else {
        Ok(Config::default())
    }
}

fn init_tracing(cfg: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.log_filter()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

/// Prints entries appended since the last flush, and the character panel
/// whenever it was rebuilt.
#[derive(Default)]
struct Printer {
    last: Option<EntryId>,
    panel_revision: u64,
}

impl Printer {
    fn flush(&mut self, widget: &ChatWidget, out: &mut impl Write) {
        let transcript = widget.transcript();
        for (_, entry) in transcript.since(self.last) {
            if matches!(entry, Entry::Typing) {
                continue;
            }
            let _ = writeln!(out, "{}", render_entry(entry));
        }
        if let Some(last) = transcript.last_id() {
            self.last = Some(last);
        }
        if let Some(panel) = widget.character_panel() {
            if panel.revision() != self.panel_revision {
                self.panel_revision = panel.revision();
                let _ = writeln!(out, "{}", render_panel(panel));
            }
        }
        let _ = out.flush();
    }
}

async fn upload(client: &ChatClient, path: &Path) {
    match PdfFile::from_path(path) {
        Ok(file) => client.select_file(Some(file)).await,
        Err(e) => eprintln!("Error: cannot read {}: {}", path.display(), e),
    }
}

async fn send(client: &ChatClient, text: &str) {
    client.with_widget(|w| w.set_input(text));
    client.handle_key("Enter").await;
}

async fn run(client: ChatClient, cli: Cli) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printer = Printer::default();

    if !cli.uploads.is_empty() || !cli.message.is_empty() {
        for path in &cli.uploads {
            upload(&client, path).await;
            printer.flush(&client.snapshot(), &mut out);
        }
        if !cli.message.is_empty() {
            send(&client, &cli.message.join(" ")).await;
            printer.flush(&client.snapshot(), &mut out);
        }
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error: failed to read stdin: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed == "/quit" {
            break;
        }
        if let Some(path) = trimmed.strip_prefix("/upload ") {
            upload(&client, Path::new(path.trim())).await;
        } else {
            send(&client, &line).await;
        }
        printer.flush(&client.snapshot(), &mut out);
    }
}

fn main() {
    let cli = Cli::parse();

    let mut cfg = match load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            process::exit(1);
        }
    };
    if let Some(url) = &cli.url {
        cfg.server.base_url = Some(url.clone());
    }
    init_tracing(&cfg);

    let widget = ChatWidget::default();
    let client = match ChatClient::with_timeout(cfg.base_url(), widget, cfg.request_timeout()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing::info!(endpoint = client.endpoint(), "persona-chat starting");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    rt.block_on(run(client, cli));
}
