use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use zenodo_bib::{
    cli::{Cli, Command},
    config::{Config, DatasetSupport},
    fetch::HttpFetcher,
    output, resolver,
    select::{ItemSelector, PromptSelector, SelectAll},
    translator::Harvest,
};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Fetch {
            from,
            format,
            all,
            no_dataset_type,
            timeout,
        } => {
            let config = Config {
                dataset_support: dataset_support(no_dataset_type),
                timeout: std::time::Duration::from_secs(timeout),
                ..Config::default()
            };
            let fetcher = HttpFetcher::new(&config);
            let mut selector: Box<dyn ItemSelector> = if all {
                Box::new(SelectAll)
            } else {
                Box::new(PromptSelector)
            };

            let mut harvest = Harvest::default();
            for source in &from {
                let urls = match source.urls() {
                    Ok(urls) => urls,
                    Err(err) => {
                        harvest.failures.push((source.to_string(), err));
                        continue;
                    }
                };
                for url in urls {
                    let url = match url {
                        Ok(url) => url,
                        Err(err) => {
                            harvest.failures.push((source.to_string(), err));
                            continue;
                        }
                    };
                    match resolver::resolve(&url, &config, &fetcher, selector.as_mut()) {
                        Ok(h) => harvest.extend(h),
                        Err(err) => harvest.failures.push((url.to_string(), err)),
                    }
                }
            }

            output::write_items(&mut harvest, format, &mut std::io::stdout().lock())?;
            for (url, err) in &harvest.failures {
                eprintln!("{} {url}: {err:#}", "✗".red());
            }
            eprintln!(
                "{} {}  {} {}",
                "✓".green(),
                harvest.items.len(),
                "✗".red(),
                harvest.failures.len()
            );
        }
        Command::Detect {
            url,
            no_dataset_type,
        } => {
            let config = Config {
                dataset_support: dataset_support(no_dataset_type),
                ..Config::default()
            };
            let fetcher = HttpFetcher::new(&config);
            match resolver::detect(&url, &config, &fetcher)? {
                Some(kind) => println!("{kind}"),
                None => println!("none"),
            }
        }
    }
    Ok(())
}

fn dataset_support(no_dataset_type: bool) -> DatasetSupport {
    if no_dataset_type {
        DatasetSupport::Fallback
    } else {
        DatasetSupport::Native
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
