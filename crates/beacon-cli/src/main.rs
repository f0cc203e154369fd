pub(crate) mod cli;
pub(crate) mod error;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::new();

    if let Err(e) = cli.execute().await {
        eprintln!("\x1b[91m[Error] {e}\x1b[0m");
        if let Some(hint) = e.hint() {
            eprintln!("{hint}");
        }
        std::process::exit(e.exit_code());
    }
}
