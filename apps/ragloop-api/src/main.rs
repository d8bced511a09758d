use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ragloop_api::Args::parse();

	ragloop_api::run(args).await
}
