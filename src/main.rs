use anyhow::{Context, Result};
use auth9_mailer::{
    config::MailerConfig, telemetry, Connector, ConnectorMessage, CustomMailData, MailAttachment,
    RegLogMailData,
};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "auth9-mailer", version, about = "Send Auth9 transactional mail")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the configured backend accepts connections
    Check,
    /// Print the template table as JSON
    Templates,
    /// Send a literal subject and body
    SendCustom {
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "custom")]
        process: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        attachment: Option<String>,
    },
    /// Render and send a registration, reset or credentials mail
    SendEvent {
        #[arg(long)]
        process: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        app_name: String,
        #[arg(long)]
        app_address: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        reset_code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = MailerConfig::from_env()?;
    telemetry::init(&config.telemetry);

    let connector = Connector::from_config(&config)
        .await
        .context("Failed to build mail connector")?;

    info!(
        module_id = %connector.module_id(),
        backend = connector.backend_name(),
        lang = %connector.lang(),
        "Auth9 mailer ready"
    );

    let message = match cli.command {
        Command::Check => {
            connector
                .test_connection()
                .await
                .context("Backend connection check failed")?;
            println!("{} backend reachable", connector.backend_name());
            return Ok(());
        }
        Command::Templates => {
            println!("{}", serde_json::to_string_pretty(connector.templates())?);
            return Ok(());
        }
        Command::SendCustom {
            to,
            subject,
            body,
            process,
            username,
            attachment,
        } => {
            let mut data = CustomMailData::new(process, to, subject, body);
            if let Some(username) = username {
                data = data.with_username(username);
            }
            if let Some(path) = attachment {
                data = data.with_attachment(MailAttachment::new(path));
            }
            ConnectorMessage::custom_mail(data)
        }
        Command::SendEvent {
            process,
            to,
            username,
            app_name,
            app_address,
            password,
            reset_code,
        } => {
            let mut data = RegLogMailData::new(process, username, to, app_name, app_address);
            data.password = password;
            data.reset_code = reset_code;
            ConnectorMessage::reglog_mail(data)
        }
    };

    let result = connector.dispatch(message).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
