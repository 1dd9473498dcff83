use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetchart::chart::ChartKind;
use sheetchart::registry::SelectorRole;
use sheetchart::server::{self, ServerConfig};
use sheetchart::session::{selector_roles, Session};
use sheetchart::transport::{HttpTransport, LocalTransport, SelectedFile};
use sheetchart::{OutputFormat, RenderOptions};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sheetchart")]
#[command(about = "Chart spreadsheet data from CSV and XLSX files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a file and render a chart from it
    Render {
        /// .csv or .xlsx file
        file: PathBuf,
        #[arg(long, default_value_t = ChartKind::Bar)]
        kind: ChartKind,
        /// Category column (x-axis or pie label)
        #[arg(long)]
        key: Option<String>,
        /// Value column (y-axis or pie value)
        #[arg(long)]
        value: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Png)]
        format: Format,
        /// Write here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 800)]
        width: u32,
        #[arg(long, default_value_t = 600)]
        height: u32,
        /// Upload to a running server (e.g. http://127.0.0.1:5000) instead of parsing locally
        #[arg(long)]
        server: Option<String>,
    },
    /// Upload a file and print its columns and inferred types
    Inspect {
        file: PathBuf,
        #[arg(long)]
        server: Option<String>,
    },
    /// Run the upload endpoint
    Serve {
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
        #[arg(long, default_value_t = 16)]
        max_upload_mb: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Svg,
    /// Chart configuration as JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Render {
            file,
            kind,
            key,
            value,
            format,
            output,
            width,
            height,
            server,
        } => {
            let mut session = load(&file, server.as_deref()).await?;
            session.set_chart_kind(kind);

            let (key_role, value_role) = selector_roles(kind);
            if let Some(key) = key {
                session.select(key_role, &key)?;
            }
            if let Some(value) = value {
                session.select(value_role, &value)?;
            }

            let chart = session
                .generate()
                .context("Failed to generate chart")?
                .ok_or_else(|| anyhow!("'{}' has no rows to chart", file.display()))?;

            let bytes = match format {
                Format::Json => chart.to_json()?.into_bytes(),
                Format::Png | Format::Svg => {
                    let options = RenderOptions {
                        width,
                        height,
                        format: match format {
                            Format::Svg => OutputFormat::Svg,
                            Format::Png | Format::Json => OutputFormat::Png,
                        },
                    };
                    chart.to_image(&options).context("Failed to render chart")?
                }
            };

            write_output(output.as_deref(), &bytes)
        }
        Command::Inspect { file, server } => {
            let session = load(&file, server.as_deref()).await?;
            let registry = session.registry();

            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for badge in registry.badges() {
                writeln!(handle, "{}\t{}", badge.column, badge.label().unwrap_or("?"))?;
            }
            if let Some(data) = session.data() {
                writeln!(handle, "rows: {}", data.dataset.len())?;
            }
            for (name, role) in [
                ("x-axis", SelectorRole::XAxis),
                ("y-axis", SelectorRole::YAxis),
                ("pie label", SelectorRole::PieLabel),
                ("pie value", SelectorRole::PieValue),
            ] {
                let current = registry.selector(role).current().unwrap_or("-");
                writeln!(handle, "default {}: {}", name, current)?;
            }
            Ok(())
        }
        Command::Serve { bind, max_upload_mb } => {
            let config = ServerConfig {
                bind,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
            };
            server::run(config).await
        }
    }
}

/// Select `path` in a fresh session and upload it
async fn load(path: &Path, server: Option<&str>) -> Result<Session> {
    let file = SelectedFile::from_path(path)?;
    let mut session = Session::new();
    session.select_file(Some(file));

    let uploaded = match server {
        Some(url) => session.upload(&HttpTransport::new(url)?).await,
        None => session.upload(&LocalTransport).await,
    };
    uploaded.with_context(|| format!("Failed to upload '{}'", path.display()))?;

    Ok(session)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write '{}'", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(bytes)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
            Ok(())
        }
    }
}
