use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ragloop_ask::Args::parse();

	ragloop_ask::run(args).await
}
