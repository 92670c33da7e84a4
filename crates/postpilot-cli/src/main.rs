use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use postpilot_core::{AccountCredential, AppConfig};
use postpilot_instagram::{InstagramClient, PublishRequest};
use postpilot_signing::StateSigner;

#[derive(Debug, Parser)]
#[command(name = "postpilot-cli")]
#[command(about = "postpilot command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Issue a signed state token for the OAuth redirect.
    State {
        #[arg(long)]
        account_id: Uuid,
    },
    /// Verify a signed state token and print the embedded account id.
    VerifyState {
        #[arg(long)]
        state: String,
    },
    /// Exchange an authorization code for a long-lived token bound to an account.
    Login {
        #[arg(long)]
        account_id: Uuid,
        #[arg(long)]
        code: String,
    },
    /// Create, publish, and resolve the permalink of an image post.
    Publish {
        #[arg(long)]
        account_id: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        caption: String,
    },
    /// Resolve the business account profile for a token.
    Profile {
        #[arg(long)]
        token: String,
    },
    /// List the account's published posts.
    Posts {
        #[arg(long)]
        account_id: String,
        #[arg(long)]
        token: String,
    },
    /// List comments on a post.
    Comments {
        #[arg(long)]
        media_id: String,
        #[arg(long)]
        token: String,
    },
    /// Fetch account-level metrics and demographics.
    AccountInsights {
        #[arg(long)]
        account_id: String,
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "day")]
        period: String,
    },
    /// Fetch the fixed metric set for a single post.
    PostInsights {
        #[arg(long)]
        media_id: String,
        #[arg(long)]
        token: String,
    },
    /// Fetch user-level insights over a date window.
    UserInsights {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "day")]
        period: String,
        #[arg(long)]
        since: Option<NaiveDate>,
        #[arg(long)]
        until: Option<NaiveDate>,
    },
}

fn build_client(config: &AppConfig) -> anyhow::Result<InstagramClient> {
    let client = InstagramClient::with_base_urls(
        &config.instagram_client_id,
        &config.instagram_client_secret,
        &config.instagram_redirect_uri,
        config.request_timeout_secs,
        &config.graph_api_base,
        &config.oauth_api_base,
    )?
    .with_max_concurrent_requests(config.max_concurrent_requests);
    Ok(client)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = postpilot_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::State { account_id } => {
            let signer = StateSigner::new(&config.state_signing_secret);
            println!("{}", signer.issue(account_id));
        }
        Commands::VerifyState { state } => {
            let signer = StateSigner::new(&config.state_signing_secret);
            println!("{}", signer.verify(&state)?);
        }
        Commands::Login { account_id, code } => {
            let client = build_client(&config)?;
            let token = client.exchange_code(&code).await?;
            let credential =
                AccountCredential::issue(account_id, token.access_token, token.issued_at);
            print_json(&credential)?;
        }
        Commands::Publish {
            account_id,
            token,
            image_url,
            caption,
        } => {
            let client = build_client(&config)?;
            let post = client
                .publish(&PublishRequest {
                    image_url,
                    caption,
                    account_id,
                    access_token: token,
                })
                .await?;
            println!("{}", post.permalink);
            println!("{}", post.media_id);
        }
        Commands::Profile { token } => {
            let client = build_client(&config)?;
            print_json(&client.fetch_business_account(&token).await?)?;
        }
        Commands::Posts { account_id, token } => {
            let client = build_client(&config)?;
            print_json(&client.fetch_all_posts(&account_id, &token).await?)?;
        }
        Commands::Comments { media_id, token } => {
            let client = build_client(&config)?;
            print_json(&client.fetch_comments(&media_id, &token).await?)?;
        }
        Commands::AccountInsights {
            account_id,
            token,
            period,
        } => {
            let client = build_client(&config)?;
            print_json(
                &client
                    .fetch_account_insights(&account_id, &token, &period)
                    .await?,
            )?;
        }
        Commands::PostInsights { media_id, token } => {
            let client = build_client(&config)?;
            print_json(&client.fetch_post_insights(&media_id, &token).await?)?;
        }
        Commands::UserInsights {
            user_id,
            token,
            period,
            since,
            until,
        } => {
            let client = build_client(&config)?;
            print_json(
                &client
                    .fetch_user_insights(&user_id, &token, &period, since, until)
                    .await?,
            )?;
        }
    }

    Ok(())
}
