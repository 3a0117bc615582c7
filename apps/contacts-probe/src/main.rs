//! contacts-probe - exercise the team directory against a live LDAP server
//!
//! Loads the directory settings from `TEAM_LDAP_*` variables (or a JSON
//! settings document), connects once and prints the result as JSON:
//! - `count [SEARCH]` - number of matching directory contacts
//! - `list [SEARCH]` - one sorted page of list rows
//! - `get <UID>` - the full record of one contact

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xavyo_contacts::{
    AuthenticatedUser, ContactsError, ContactsRequest, SortField, SortOrder, StorageType,
    TenantId, UserId,
};
use xavyo_contacts_ldap::{TeamDirectoryConfig, TeamDirectoryStorage};

/// Team directory probe
#[derive(Parser)]
#[command(name = "contacts-probe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings document; TEAM_LDAP_* variables are used when absent
    #[arg(long, env = "TEAM_LDAP_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Identity the requests are made as, used to flag the caller's own contact
    #[arg(long = "as", default_value = "")]
    public_id: String,

    /// E-mail of the requesting identity
    #[arg(long)]
    email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count matching contacts
    Count {
        /// Free-text search over name and e-mail
        #[arg(default_value = "")]
        search: String,
    },

    /// List one page of contacts
    List {
        /// Free-text search over name and e-mail
        #[arg(default_value = "")]
        search: String,

        /// Sort field: name or email
        #[arg(long, default_value = "name")]
        sort: SortField,

        /// Sort order: asc or desc
        #[arg(long, default_value = "asc")]
        order: SortOrder,

        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Fetch one contact by uid
    Get { uid: String },
}

fn load_config(path: Option<&PathBuf>) -> Result<TeamDirectoryConfig, String> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            TeamDirectoryConfig::from_json(&json).map_err(|e| e.to_string())
        }
        None => TeamDirectoryConfig::from_env().map_err(|e| e.to_string()),
    }
}

fn fail(err: ContactsError) -> ! {
    eprintln!("{} ({})", err, err.error_code());
    std::process::exit(2);
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Output error: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,xavyo_contacts_ldap=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_ref()).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    tracing::info!(config = ?config.redacted(), "starting contacts probe");

    let storage = TeamDirectoryStorage::with_ldap3(config).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    let mut user = AuthenticatedUser::new(UserId::new(), TenantId::new(), cli.public_id);
    if let Some(email) = cli.email {
        user = user.with_email(email);
    }

    match cli.command {
        Commands::Count { search } => {
            let count = storage.try_count(&search).await.unwrap_or_else(|e| fail(e));
            print_json(&serde_json::json!({ "ContactCount": count }));
        }
        Commands::List {
            search,
            sort,
            order,
            offset,
            limit,
        } => {
            let request = ContactsRequest::new(StorageType::Team)
                .with_search(search)
                .with_sort(sort, order)
                .with_page(offset, limit);
            let (count, list) = storage
                .try_page(&user, &request)
                .await
                .unwrap_or_else(|e| fail(e));
            print_json(&serde_json::json!({ "ContactCount": count, "List": list }));
        }
        Commands::Get { uid } => {
            match storage
                .try_get_by_id(&uid, &user)
                .await
                .unwrap_or_else(|e| fail(e))
            {
                Some(contact) => print_json(&contact),
                None => {
                    eprintln!("No team directory contact with uid '{uid}'");
                    std::process::exit(3);
                }
            }
        }
    }
}
