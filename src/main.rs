use clap::Parser;
use clawboot::boot::BootSequence;
use clawboot::cli::{Cli, Commands, PathOpts};
use clawboot::config::BootConfig;
use clawboot::env::Env;
use clawboot::error::BootError;
use clawboot::logging;
use clawboot::onboarding::{build_auth_choice, CommandOnboarder};
use clawboot::patch::resolve_proxy_credentials;
use clawboot::providers::{ModelCatalogResolver, ResolvedCatalog};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let env = Env::from_process();
    let load = |paths: &PathOpts| -> anyhow::Result<BootConfig> {
        let mut config = BootConfig::load(cli.config.as_deref())?;
        paths.apply(&mut config);
        Ok(config)
    };

    match &cli.command {
        Commands::Boot(opts) => {
            let config = load(&opts.paths)?;
            let onboarder = CommandOnboarder::new(&config.gateway_bin);
            let boot = BootSequence::new(config, env.clone(), &onboarder);

            let outcome = match boot.run().await {
                Ok(outcome) => outcome,
                Err(e) => return Ok(fatal(e)),
            };

            if opts.no_launch {
                println!("{}", outcome.launch.display_command());
                return Ok(ExitCode::SUCCESS);
            }

            let status = outcome.launch.run().await?;
            info!(%status, "gateway exited");
            Ok(status
                .code()
                .map(|code| ExitCode::from(code.clamp(0, 255) as u8))
                .unwrap_or(ExitCode::FAILURE))
        }
        Commands::Restore(paths) => {
            let config = load(paths)?;
            let onboarder = CommandOnboarder::new(&config.gateway_bin);
            let reports = BootSequence::new(config, env.clone(), &onboarder).restore();
            println!("{}", serde_json::to_string_pretty(&reports)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Patch(paths) => {
            let config = load(paths)?;
            let onboarder = CommandOnboarder::new(&config.gateway_bin);
            let boot = BootSequence::new(config, env.clone(), &onboarder);
            let report = match boot.patch().await {
                Ok(report) => report,
                Err(e) => return Ok(fatal(e)),
            };
            println!(
                "{} ({} rules fired, repaired: {})",
                boot.config().config_file().display(),
                report.rules_fired.len(),
                report.repaired
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Models(opts) => {
            let config = load(&PathOpts::default())?;
            let proxy = resolve_proxy_credentials(&env);
            let base_url = opts
                .base_url
                .as_deref()
                .or(proxy.as_ref().map(|p| p.base_url.as_str()));
            let api_key = opts
                .api_key
                .as_deref()
                .or(proxy.as_ref().map(|p| p.api_key.as_str()));

            let catalog = match (base_url, api_key) {
                (Some(base_url), Some(api_key)) => {
                    ModelCatalogResolver::new(config.catalog_timeout())
                        .resolve(base_url, api_key)
                        .await
                }
                _ => {
                    info!("no catalog endpoint configured; showing fallback models");
                    ResolvedCatalog::fallback()
                }
            };
            println!("{}", serde_json::to_string_pretty(&catalog.models)?);
            println!("default: {} ({:?})", catalog.default_model, catalog.source);
            Ok(ExitCode::SUCCESS)
        }
        Commands::AuthChoice => match build_auth_choice(&env) {
            Some(choice) => {
                println!("{}: {:?}", choice.kind(), choice);
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(fatal(BootError::NoCredentials)),
        },
        Commands::Version => {
            println!("clawboot {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn fatal(e: BootError) -> ExitCode {
    error!("{e}");
    eprintln!("error: {e}");
    ExitCode::FAILURE
}
