use anyhow::Result;
use nova_vectors::{
    cli::Cli,
    fixtures::{self, VectorObject},
    load_api,
};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // stdout carries only the vectors
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.list {
        print!("{}", fixtures::usage());
        return Ok(());
    }
    let Some(object) = cli.object.as_deref().and_then(VectorObject::from_name) else {
        if let Some(name) = &cli.object {
            tracing::warn!(%name, "unsupported object");
        }
        print!("{}", fixtures::usage());
        return Ok(());
    };

    let api = load_api(cli.params.as_deref())?;
    let mut rng = match cli.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };
    tracing::info!(object = object.name(), seed = ?cli.seed, network = %api.params().network_name, "generating");

    let report = fixtures::generate(object, &api, &mut rng)?;
    tracing::debug!(bytes = report.as_str().len(), "report rendered");
    print!("{}", report.as_str());
    Ok(())
}
