//! `mailsend-sample` - sends one mail through `mailsend` and logs the outcome.
//!
//! Credentials never live in code: the username comes from the command line
//! or the settings file, the password from `MAILSEND_PASSWORD` or the system
//! keyring (see the `set-password` subcommand).

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mailsend::{
    Attachment, CallbackQueue, Error, Mail, MailProvider, MailSender, Recipient, SendListener,
    SmtpProvider, TransportConfig, credentials, dispatch, provider_for_address,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::{ProviderSetting, Settings};

#[derive(Debug, Parser)]
#[command(name = "mailsend-sample", version, about = "Send a mail through mailsend")]
struct Cli {
    /// Settings file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one mail in the background and wait for the result.
    Send(SendArgs),
    /// Save the account and relay to the settings file.
    Configure(ConfigureArgs),
    /// Store the account password in the system keyring.
    SetPassword {
        /// Account name; defaults to the configured username.
        #[arg(long)]
        username: Option<String>,
    },
    /// Remove the account password from the system keyring.
    ForgetPassword {
        /// Account name; defaults to the configured username.
        #[arg(long)]
        username: Option<String>,
    },
}

#[derive(Debug, Args)]
struct SendArgs {
    /// Account to send as; defaults to the configured username.
    #[arg(long)]
    username: Option<String>,
    /// Password or app password; falls back to the keyring.
    #[arg(long, env = "MAILSEND_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Primary recipient (repeatable).
    #[arg(long, required = true)]
    to: Vec<String>,
    /// Carbon-copy recipient (repeatable).
    #[arg(long)]
    cc: Vec<String>,
    /// Blind carbon-copy recipient (repeatable).
    #[arg(long)]
    bcc: Vec<String>,
    /// Subject line.
    #[arg(long, default_value = "")]
    subject: String,
    /// Plain-text body.
    #[arg(long)]
    text: Option<String>,
    /// HTML body.
    #[arg(long)]
    html: Option<String>,
    /// File to attach, as PATH or PATH=NAME (repeatable).
    #[arg(long = "attach", value_name = "PATH[=NAME]")]
    attachments: Vec<String>,
}

#[derive(Debug, Args)]
struct ConfigureArgs {
    /// Account to authenticate as.
    #[arg(long)]
    username: String,
    /// Relay host; detected from the address domain when omitted.
    #[arg(long)]
    host: Option<String>,
    /// Relay port; the security mode's standard port when omitted.
    #[arg(long)]
    port: Option<u16>,
    /// Connection security for a custom host.
    #[arg(long, value_enum, default_value_t = SecurityArg::Tls)]
    security: SecurityArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SecurityArg {
    Tls,
    Starttls,
    None,
}

impl From<SecurityArg> for mailsend::Security {
    fn from(arg: SecurityArg) -> Self {
        match arg {
            SecurityArg::Tls => Self::Tls,
            SecurityArg::Starttls => Self::StartTls,
            SecurityArg::None => Self::None,
        }
    }
}

/// Logs the outcome and remembers whether the send failed.
#[derive(Debug, Default)]
struct LogListener {
    failed: AtomicBool,
}

impl SendListener for LogListener {
    fn on_success(&self) {
        info!("Mail sent!");
    }

    fn on_error(&self, error: Error) {
        error!("Error sending mail: {error}");
        self.failed.store(true, Ordering::SeqCst);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailsend=debug,mailsend_sample=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(settings::default_path);
    let settings = settings::load(&config_path).await?;

    match cli.command {
        Command::Send(args) => send(args, &settings).await,
        Command::Configure(args) => configure(args, &config_path).await,
        Command::SetPassword { username } => {
            let username = resolve_username(username, &settings)?;
            let password = read_password()?;
            credentials::store_password(&username, &password)?;
            info!("Password stored for {username}");
            Ok(())
        }
        Command::ForgetPassword { username } => {
            let username = resolve_username(username, &settings)?;
            credentials::delete_password(&username)?;
            info!("Password removed for {username}");
            Ok(())
        }
    }
}

async fn send(args: SendArgs, settings: &Settings) -> anyhow::Result<()> {
    let username = resolve_username(args.username.clone(), settings)?;
    let password = match args.password.clone() {
        Some(password) => password,
        None => credentials::get_password(&username)?.with_context(|| {
            format!("no password for {username}; set MAILSEND_PASSWORD or run set-password")
        })?,
    };

    let provider = settings.provider.provider();
    info!("Sending as {username} via {}", provider.name());
    let sender = MailSender::with_provider(username.clone(), &password, provider.as_ref())?;
    debug!("Relay settings: {}", describe_relay(sender.config()));
    let mail = build_mail(&username, args);

    let (dispatcher, queue) = dispatch::channel();
    let listener = Arc::new(LogListener::default());
    let task = sender.send_mail_async(mail, &listener, &dispatcher);
    drop(dispatcher);

    wait_for_outcome(task, queue, &listener).await
}

/// Drains completions until the background send has reported back.
///
/// The queue only closes once the task has dropped its dispatcher, so a task
/// that panics still ends the wait; its join error is returned instead of a
/// silent success.
async fn wait_for_outcome(
    task: JoinHandle<()>,
    queue: CallbackQueue,
    listener: &LogListener,
) -> anyhow::Result<()> {
    queue.run().await;
    task.await.context("background send did not finish")?;

    if listener.failed.load(Ordering::SeqCst) {
        bail!("mail was not sent");
    }
    Ok(())
}

/// Relay properties as `key=value` pairs in key order.
fn describe_relay(config: &TransportConfig) -> String {
    config
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn configure(args: ConfigureArgs, path: &std::path::Path) -> anyhow::Result<()> {
    let provider = match (args.host, provider_for_address(&args.username)) {
        (Some(host), _) => {
            let provider = SmtpProvider::new("Custom", host, args.security.into());
            let provider = match args.port {
                Some(port) => provider.with_port(port),
                None => provider,
            };
            ProviderSetting::Custom {
                properties: provider.properties()?,
            }
        }
        (None, Some(known)) if known.name == "Gmail" => ProviderSetting::Gmail,
        (None, Some(known)) => ProviderSetting::Custom {
            properties: known.properties()?,
        },
        (None, None) => bail!(
            "cannot detect a relay for {}; pass --host",
            args.username
        ),
    };

    let settings = Settings {
        username: Some(args.username),
        provider,
    };
    settings::save(path, &settings).await
}

fn resolve_username(username: Option<String>, settings: &Settings) -> anyhow::Result<String> {
    username
        .or_else(|| settings.username.clone())
        .context("no username; pass --username or run configure")
}

fn read_password() -> anyhow::Result<String> {
    if let Ok(password) = std::env::var("MAILSEND_PASSWORD") {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("empty password");
    }
    Ok(password)
}

fn build_mail(username: &str, args: SendArgs) -> Mail {
    let mut builder = Mail::builder().sender(username).subject(args.subject);

    for to in args.to {
        builder = builder.recipient(Recipient::to(to));
    }
    for cc in args.cc {
        builder = builder.recipient(Recipient::cc(cc));
    }
    for bcc in args.bcc {
        builder = builder.recipient(Recipient::bcc(bcc));
    }

    if args.text.is_none() && args.html.is_none() {
        builder = builder
            .text("Ciao")
            .html("<h1 style=\"color:red;\">Ciao</h1>");
    }
    if let Some(text) = args.text {
        builder = builder.text(text);
    }
    if let Some(html) = args.html {
        builder = builder.html(html);
    }

    for spec in &args.attachments {
        builder = builder.attachment(parse_attachment(spec));
    }

    builder.build()
}

/// Parses `PATH` or `PATH=NAME`.
fn parse_attachment(spec: &str) -> Attachment {
    match spec.rsplit_once('=') {
        Some((path, name)) if !path.is_empty() && !name.is_empty() => Attachment::new(path, name),
        _ => Attachment::from_path(spec),
    }
}
