//! # scim-audit
//!
//! Lists the members of a GitHub organization that have no SCIM identity,
//! and the members without any organization-verified email.
//!
//! ## Usage
//!
//! ```bash
//! export GH_APP_ID=12345 GH_INSTALL_ID=67890 GH_ORG=acme
//! export GH_PEM_KEY_PATH=./app.pem        # or GH_PEM_KEY=<base64 PEM>
//! export GH_PAT_TOKEN=ghp_...             # optional, used for the GraphQL query
//! cargo run --bin scim-audit -- --out-format txt
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: The audit ran (whether or not members are missing)
//! - `1`: Configuration, authentication or fetch failure

use clap::Parser;
use env_logger::{Env, WriteStyle};
use scim_audit::config::{DEFAULT_API_BASE_URL, DEFAULT_GRAPHQL_URL};
use scim_audit::{
    AuditConfig, Auditor, ConfigurationError, Credentials, OutputFormat, PrivateKeySource,
    RetryPolicy, report,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Find all the users that do not have a SCIM ID in the organization
#[derive(Parser, Debug)]
#[command(name = "scim-audit", version, about)]
struct Cli {
    /// Organization to audit
    #[arg(long, env = "GH_ORG")]
    org: String,

    /// GitHub App ID
    #[arg(long, env = "GH_APP_ID", hide_env_values = true)]
    app_id: String,

    /// GitHub App installation ID
    #[arg(long, env = "GH_INSTALL_ID")]
    install_id: String,

    /// Private key, PEM or base64-encoded PEM (takes precedence over --pem-key-path)
    #[arg(long, env = "GH_PEM_KEY", hide_env_values = true)]
    pem_key: Option<String>,

    /// Path to the private key PEM file
    #[arg(long, env = "GH_PEM_KEY_PATH")]
    pem_key_path: Option<PathBuf>,

    /// Token for the GraphQL membership query (defaults to the app token)
    #[arg(long, env = "GH_PAT_TOKEN", hide_env_values = true)]
    pat_token: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    out_format: OutputFormat,

    /// Disable color output
    #[arg(long)]
    no_color: bool,

    /// REST API root
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// GraphQL endpoint
    #[arg(long, default_value = DEFAULT_GRAPHQL_URL)]
    graphql_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Retries for transient listing failures
    #[arg(long, default_value_t = 2)]
    max_retries: u32,
}

impl Cli {
    fn into_config(self) -> Result<AuditConfig, ConfigurationError> {
        let private_key = match (self.pem_key, self.pem_key_path) {
            (Some(inline), _) => PrivateKeySource::Inline(inline),
            (None, Some(path)) => PrivateKeySource::File(path),
            (None, None) => {
                return Err(ConfigurationError::missing("GH_PEM_KEY or GH_PEM_KEY_PATH"));
            }
        };
        let credentials = Credentials::new(self.app_id, self.install_id, private_key);

        let mut builder = AuditConfig::builder(self.org, credentials)
            .with_api_base_url(self.api_url)
            .with_graphql_url(self.graphql_url)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry_policy(RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            });
        if let Some(token) = self.pat_token {
            builder = builder.with_directory_token(token);
        }

        builder.build()
    }
}

fn init_logging(no_color: bool) {
    let default_level = if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "info"
    };

    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_secs();
    if no_color {
        builder.write_style(WriteStyle::Never);
    }
    builder.init();
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let format = cli.out_format;
    let color = !cli.no_color;

    let auditor = Auditor::new(cli.into_config()?)?;
    let report = auditor.run().await?;

    Ok(report::render(&report, format, color)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.no_color);
    log::debug!("Arguments: org={}, format={}", cli.org, cli.out_format);

    match run(cli).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
