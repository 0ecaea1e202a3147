mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use url::Url;

use monaco_element_frame::headless::TextBufferLibrary;
use monaco_element_frame::loader::FsLoader;
use monaco_element_frame::Phase;
use monaco_element_host::config::{default_config_path, ElementConfig};
use monaco_element_host::proxy::HostEvent;
use monaco_element_protocol::envelope_schema;

use crate::session::Session;

/// Run a host proxy and its editor frame headlessly and print what the
/// element's owner would observe.
#[derive(Debug, Parser)]
#[command(name = "monaco-element-demo", version)]
struct Args {
    /// JSON file with the element configuration (defaults to the user
    /// config directory when present).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    name: Option<String>,

    /// Initial editor content.
    #[arg(long)]
    value: Option<String>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    theme: Option<String>,

    /// Directory containing Monaco's loader.js.
    #[arg(long, env = "MONACO_LIB_PATH")]
    lib_path: Option<String>,

    #[arg(long)]
    read_only: bool,

    /// URL of the host document; the frame shares its origin.
    #[arg(long, default_value = "http://localhost:8080/index.html")]
    location: String,

    /// Text to type into the editor once it is ready.
    #[arg(long)]
    edit: Option<String>,

    /// Print the envelope JSON Schema and exit.
    #[arg(long)]
    print_schema: bool,
}

fn resolve_config(args: &Args) -> Result<ElementConfig, String> {
    let mut config = match &args.config {
        Some(path) => ElementConfig::load(path).map_err(|e| e.to_string())?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => ElementConfig::load(&path).unwrap_or_else(|e| {
                log::warn!("{}; using defaults", e);
                ElementConfig::default()
            }),
            None => ElementConfig::default(),
        },
    };

    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(value) = &args.value {
        config.value = value.clone();
    }
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(theme) = &args.theme {
        config.theme = theme.clone();
    }
    if let Some(lib_path) = &args.lib_path {
        config.lib_path = lib_path.clone();
    }
    if args.read_only {
        config.read_only = true;
    }
    Ok(config)
}

fn print_events(session: &Session) {
    for event in session.drain_events() {
        match event {
            HostEvent::ValueChanged { value, name } => {
                println!("value-changed [{}]: {:?}", name, value)
            }
            HostEvent::LoadingChanged { loading } => println!("loading: {}", loading),
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.print_schema {
        match serde_json::to_string_pretty(&envelope_schema()) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                log::error!("Failed to render schema: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    let config = match resolve_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };
    let location = match Url::parse(&args.location) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: invalid --location {:?}: {}", args.location, e);
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        log::info!("Starting editor session for {}", location);
        let mut session = Session::new(config, location);
        if let Some(document) = session.host.frame().and_then(|f| f.document()) {
            log::debug!("Frame bootstrap document:\n{}", document);
        }
        let loader = FsLoader::new(TextBufferLibrary::new());

        match session.load(&loader).await {
            Phase::Ready => {}
            phase => {
                if let Some(e) = session.load_error() {
                    println!("editor failed to load: {}", e);
                } else {
                    println!("editor did not become ready ({:?})", phase);
                }
                println!("loading: {} (host is still waiting)", session.host.loading());
                return ExitCode::FAILURE;
            }
        }
        print_events(&session);

        if let Some(text) = &args.edit {
            if !session.type_text(text) {
                println!("edit refused (editor is read-only)");
            }
            print_events(&session);
        }

        println!("final value: {:?}", session.host.value());
        ExitCode::SUCCESS
    })
}
