//! Entry point for the `moss` submission tool.
//!
//! Parses CLI arguments, builds a [`MossClient`] and performs one submission.
//! All protocol work lives in the library; `main.rs` owns only process setup
//! (logging, argument parsing) and output.

use anyhow::{bail, Result};
use clap::Parser;

use moss_client::{MossClient, MOSS_PORT, MOSS_SERVER};

/// Submit source files to the MOSS plagiarism-detection service.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// MOSS user id (usually a 9-digit number).
    #[arg(short, long)]
    user_id: String,

    /// Source language of the submitted files.
    #[arg(short, long, default_value = "c")]
    language: String,

    /// Treat each submitted directory as one program.
    #[arg(short, long)]
    directory: bool,

    /// Route the submission to the experimental server.
    #[arg(short = 'x', long)]
    experimental: bool,

    /// Occurrences of a passage above this limit are ignored.
    #[arg(short = 'm', long, default_value_t = 10)]
    max_matches: u32,

    /// Number of matched files shown in the result.
    #[arg(short = 'n', long, default_value_t = 250)]
    show: u32,

    /// Comment shown on the result page.
    #[arg(short, long, default_value = "")]
    comment: String,

    /// Base file excluded from pairwise matching (repeatable).
    #[arg(short, long)]
    base_file: Vec<String>,

    /// Server hostname.
    #[arg(long, default_value = MOSS_SERVER)]
    server: String,

    /// Server port.
    #[arg(long, default_value_t = MOSS_PORT)]
    port: u16,

    /// Files or glob patterns to submit.
    #[arg(required = true)]
    files: Vec<String>,
}

fn main() -> Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    let mut client = MossClient::with_server(&cli.user_id, &cli.server, cli.port);
    client.set_language(&cli.language)?;
    client.set_directory_mode(cli.directory);
    client.set_experimental_server(cli.experimental);
    client.set_ignore_limit(cli.max_matches)?;
    client.set_result_limit(cli.show)?;
    client.set_comment(&cli.comment);

    for base in &cli.base_file {
        client.add_base_file(base)?;
    }
    for arg in &cli.files {
        if arg.contains(['*', '?', '[']) {
            client.add_by_wildcard(arg)?;
        } else {
            client.add_file(arg)?;
        }
    }

    log::info!(
        "submitting {} files ({} base) to {}:{}",
        client.file_count(),
        client.base_file_count(),
        client.server(),
        client.port()
    );

    let result = client.send(|msg| log::info!("{}", msg.trim_end()))?;
    match result {
        Some(url) => {
            println!("{}", url.trim_end());
            Ok(())
        }
        None => bail!("submission aborted before the server returned a result"),
    }
}
