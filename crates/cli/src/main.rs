use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue HTTP service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending PostgreSQL migrations and exit
    Migrate,
    /// Print every documented route
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => bookshelf_app::serve(&settings).await,
        Command::Migrate => {
            let applied = bookshelf_app::migrate(&settings).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Routes => {
            let registry = bookshelf_app::build_registry(bookshelf_app::Backend::in_memory(false).store);
            for line in route_lines(&bookshelf_http::router::merged_openapi(&registry)) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// `METHOD path` pairs from an OpenAPI document, sorted by path.
fn route_lines(spec: &serde_json::Value) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(paths) = spec["paths"].as_object() {
        for (path, item) in paths {
            if let Some(operations) = item.as_object() {
                for method in operations.keys() {
                    lines.push(format!("{:<7} {}", method.to_uppercase(), path));
                }
            }
        }
    }
    lines.sort_by(|a, b| a[8..].cmp(&b[8..]).then_with(|| a.cmp(b)));
    lines
}
