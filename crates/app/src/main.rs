use clap::Parser;
use survey_server::{Args, logging, startup};

async fn run(args: Args) -> anyhow::Result<()> {
    args.validate()?;
    startup::serve(args).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_logging(&args);

    if let Err(err) = run(args).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
