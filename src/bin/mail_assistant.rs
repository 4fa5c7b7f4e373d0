use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use mail_assistant::auth::{GoogleIdentity, Session, token_store};
use mail_assistant::config::{Config, load_config};
use mail_assistant::flow::{Dispatcher, FlowKind};
use mail_assistant::remote::{RemoteActionClient, RemoteActions};
use mail_assistant::terminal::run_tui;

#[derive(Parser)]
#[command(name = "mail_assistant")]
#[command(about = "Find duplicate mail and mass-unsubscribe via a hosted script", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum FlowArg {
    Duplicates,
    Unsubscribe,
}

impl From<FlowArg> for FlowKind {
    fn from(f: FlowArg) -> Self {
        match f {
            FlowArg::Duplicates => FlowKind::Duplicates,
            FlowArg::Unsubscribe => FlowKind::Unsubscribe,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive UI (restores the previous session if any)
    Tui,

    /// Sign in with Google and grant mail access
    SignIn,

    /// Forget the stored session
    SignOut,

    /// Show the signed-in account
    Whoami,

    /// Fetch and print the records of a flow
    List {
        #[arg(value_enum)]
        flow: FlowArg,
    },

    /// Submit message ids to a flow and print the server's answer
    Submit {
        #[arg(value_enum)]
        flow: FlowArg,

        /// Comma-separated message ids; may be empty
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },

    /// Store the OAuth client secret in keyring
    SetClientSecret {
        #[arg(long)]
        client_id: String,
    },
}

fn open_session(cfg: &Config) -> Result<Session<GoogleIdentity>> {
    Ok(Session::new(GoogleIdentity::from_config(cfg)?))
}

fn signed_in_email(cfg: &Config) -> Result<String> {
    let mut session = open_session(cfg)?;
    let id = session.restore();
    if !id.is_authenticated {
        return Err(anyhow!("Not signed in. Run: mail_assistant sign-in"));
    }
    Ok(id.email.clone())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if let Command::SetClientSecret { client_id } = &cli.cmd {
        eprintln!("Paste client secret (end with Ctrl-D):");
        let mut secret = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut secret)?;
        let secret = secret.trim();
        token_store::save_client_secret(client_id, secret)?;
        println!("Saved client secret for client_id {}", client_id);
        return Ok(());
    }

    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let remote = RemoteActionClient::new(cfg.endpoint_url())?;

    match cli.cmd {
        Command::SetClientSecret { .. } => Ok(()),

        Command::Tui => {
            let mut session = open_session(&cfg)?;
            session.restore();
            let (dispatcher, completions) = Dispatcher::new(Arc::new(remote));
            run_tui(&mut session, &dispatcher, &completions, cfg.post_submit())
                .map_err(|e| anyhow!("{e}"))
        }

        Command::SignIn => {
            let mut session = open_session(&cfg)?;
            let id = session.sign_in()?;
            println!("You are signed in as: {}", id.email);
            Ok(())
        }

        Command::SignOut => {
            let mut session = open_session(&cfg)?;
            session.sign_out();
            println!("Signed out.");
            Ok(())
        }

        Command::Whoami => {
            let mut session = open_session(&cfg)?;
            let id = session.restore();
            if id.is_authenticated {
                println!("{}", id.email);
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }

        Command::List { flow } => {
            let kind = FlowKind::from(flow);
            let email = signed_in_email(&cfg)?;
            let records = remote.fetch_list(kind.list_action(), &email)?;
            for r in &records {
                println!(
                    "{}\t{}\t{}\t{}",
                    r.message_id,
                    r.from,
                    r.subject.as_deref().unwrap_or("-"),
                    r.detail
                );
            }
            eprintln!("{} record(s)", records.len());
            Ok(())
        }

        Command::Submit { flow, ids } => {
            let kind = FlowKind::from(flow);
            let email = signed_in_email(&cfg)?;
            let ids: Vec<String> = ids.into_iter().filter(|s| !s.is_empty()).collect();
            let status = remote.submit_selection(kind.submit_action(), &email, &ids)?;
            println!("{status}");
            Ok(())
        }
    }
}
