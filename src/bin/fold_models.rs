use clap::Parser;
use fold_models::{load_registry_config, AuthEnvironment, LoggingSystem, ModelDatabase};
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the registry configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Directory of collection description files, overrides the configuration
    #[arg(long)]
    collections_dir: Option<PathBuf>,

    /// Auth environment, overrides the configuration
    #[arg(long)]
    env: Option<AuthEnvironment>,

    /// Give up waiting for collections after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_registry_config(cli.config.as_deref())?;
    LoggingSystem::init_with_config(config.logging.clone())?;

    if let Some(dir) = cli.collections_dir {
        config.collections_dir = Some(dir);
    }
    if let Some(environment) = cli.env {
        config.auth.environment = environment;
    }

    let db = ModelDatabase::open(config)?;
    info!(
        "Auth service running in {} mode with {} system models",
        db.auth().environment(),
        db.registry().len()?
    );

    let models = match tokio::time::timeout(
        Duration::from_secs(cli.timeout_secs),
        db.collection_models(),
    )
    .await
    {
        Ok(models) => models?,
        Err(_) => {
            error!(
                "No collections arrived within {} seconds",
                cli.timeout_secs
            );
            return Err("timed out waiting for collections".into());
        }
    };

    let mut names: Vec<_> = models.keys().cloned().collect();
    names.sort();
    for name in names {
        if let Some(model) = models.get(&name) {
            println!("{}: {}", name, model.schema().field_names().join(", "));
        }
    }
    println!("auth environment: {}", db.auth().environment());

    Ok(())
}
