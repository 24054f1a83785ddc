//! Command-line definitions.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "esicache")]
#[command(about = "Cached, paginated fetches against ESI and the SDE", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one resource through the cache and print the body
    Fetch {
        /// Resource URL
        url: String,

        /// Cache namespace: script, document or user (defaults to config)
        #[arg(short, long)]
        scope: Option<String>,

        /// HTTP method
        #[arg(short, long, default_value = "get")]
        method: String,

        /// Request body, sent as JSON
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// Fetch every page of a paginated resource and print one JSON array
    Pages {
        /// URL up to and including `page=`
        base_url: String,
    },

    /// Resolve an id against the SDE reference tables
    Lookup {
        /// Which lookup to perform
        #[arg(value_enum)]
        kind: LookupKind,

        /// Type, group, market group, category or activity id
        id: i64,
    },

    /// Remove expired entries from the configured cache backend
    Purge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupKind {
    TypeName,
    GroupId,
    GroupName,
    MarketGroupId,
    MarketGroupName,
    CategoryId,
    CategoryName,
    ActivityName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_with_options() {
        let cli = Cli::try_parse_from([
            "esicache",
            "fetch",
            "https://esi.evetech.net/latest/universe/names/",
            "--method",
            "post",
            "--payload",
            "[34]",
            "--scope",
            "user",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch { method, payload, scope, .. } => {
                assert_eq!(method, "post");
                assert_eq!(payload.as_deref(), Some("[34]"));
                assert_eq!(scope.as_deref(), Some("user"));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_lookup_kind() {
        let cli = Cli::try_parse_from(["esicache", "lookup", "market-group-name", "1857"]).unwrap();
        assert!(matches!(cli.command, Commands::Lookup { kind: LookupKind::MarketGroupName, id: 1857 }));
    }

    #[test]
    fn test_unknown_lookup_kind_rejected() {
        assert!(Cli::try_parse_from(["esicache", "lookup", "planet-name", "1"]).is_err());
    }
}
