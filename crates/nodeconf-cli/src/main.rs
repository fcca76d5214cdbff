mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nodeconf::{
    reformat_configs, ConfigIndex, Depth, NodesConfig, RefreshReport, Settings, TypeCatalog,
};
use tracing_subscriber::EnvFilter;

use output::{print_json, LookupRow};

#[derive(Parser, Debug)]
#[command(name = "nodeconf", about = "Index typed JSON node-tree configs")]
struct Args {
    /// Settings file (defaults to $NODECONF_SETTINGS or ~/.nodeconf/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the index and print the refresh report
    Refresh,
    /// Print the path prefixes of a type at a depth
    Paths {
        #[arg(long = "type")]
        type_name: String,
        /// Zero-based depth, or -1 for the deepest level
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        depth: i64,
    },
    /// List the loaded records of a type and their files
    Lookup {
        #[arg(long = "type")]
        type_name: String,
    },
    /// Stamp Version and rewrite every config file
    Reformat {
        #[arg(long)]
        indented: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };
    tracing::debug!(
        "Using settings {:?} ({} roots, {} types)",
        settings.source,
        settings.configs_paths.as_ref().map_or(0, Vec::len),
        settings.types.len()
    );

    match args.command {
        Command::Refresh => {
            let (_, report) = refresh_index(&settings).await?;
            print_json(&report)
        }
        Command::Paths { type_name, depth } => {
            let Some(depth) = Depth::from_signed(depth) else {
                anyhow::bail!("invalid depth {}; use -1 for the deepest level", depth);
            };
            let (index, _) = refresh_index(&settings).await?;
            match index.get_paths(&type_name, depth).await {
                Some(paths) => print_json(&paths),
                None => anyhow::bail!("no paths for type '{}' at {:?}", type_name, depth),
            }
        }
        Command::Lookup { type_name } => {
            let (index, _) = refresh_index(&settings).await?;
            let rows: Vec<LookupRow> = index
                .lookup_by_type(&type_name)
                .await
                .iter()
                .map(LookupRow::from_entry)
                .collect();
            print_json(&rows)
        }
        Command::Reformat { indented } => {
            let report = reformat_configs(&settings.config_roots()?, indented)?;
            print_json(&report)
        }
    }
}

async fn refresh_index(settings: &Settings) -> anyhow::Result<(ConfigIndex, RefreshReport)> {
    let index = ConfigIndex::new(catalog_for(settings));
    let report = index.refresh(Some(settings)).await?;
    Ok((index, report))
}

/// Every type named in the settings uses the built-in node schema
fn catalog_for(settings: &Settings) -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    for name in &settings.types {
        catalog.register_type::<NodesConfig>(name.clone());
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths_deepest() {
        let args = Args::try_parse_from(["nodeconf", "paths", "--type", "T", "--depth", "-1"]).unwrap();
        match args.command {
            Command::Paths { type_name, depth } => {
                assert_eq!(type_name, "T");
                assert_eq!(Depth::from_signed(depth), Some(Depth::Deepest));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_settings() {
        let args =
            Args::try_parse_from(["nodeconf", "reformat", "--indented", "--settings", "s.json"]).unwrap();
        assert_eq!(args.settings, Some(PathBuf::from("s.json")));
        assert!(matches!(args.command, Command::Reformat { indented: true }));
    }

    #[test]
    fn test_catalog_from_settings() {
        let settings = Settings {
            types: vec!["Items".to_string(), "Shop".to_string()],
            ..Default::default()
        };
        let catalog = catalog_for(&settings);
        assert_eq!(catalog.names(), vec!["Items", "Shop"]);
    }
}
