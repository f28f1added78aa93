use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use winturn::config::{default_profile_path, default_settings_path, state_dir};
use winturn::{
    validate_profile, ControlConfig, Dispatcher, HostProfile, JsonProfileStore, PowerAction,
    ProfileStore, SshConnector,
};

#[derive(Parser)]
#[command(name = "winturn", version, about = "Turn your Windows PCs on and off remotely")]
struct Cli {
    /// Profile store (defaults to .mwt/config.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Control settings (defaults to .mwt/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct HostArg {
    /// PC host or IP, as saved with `add`
    host: String,
}

#[derive(Subcommand)]
enum Command {
    /// Save settings for a PC
    Add {
        #[arg(long)]
        host: String,
        #[arg(long)]
        mac: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value_t = 22)]
        port: u32,
    },
    /// List saved PCs
    List,
    /// Forget all saved PCs
    Reset,
    /// Test the SSH connection to a PC
    Status(HostArg),
    /// Send a Wake-on-LAN packet
    Wake(HostArg),
    /// Suspend to RAM
    Sleep(HostArg),
    /// Suspend to disk
    Hibernate(HostArg),
    /// Power off
    Shutdown(HostArg),
    /// Restart
    Reboot(HostArg),
    /// Lock the signed-in session
    Lock(HostArg),
}

async fn resolve(store: &JsonProfileStore, host: &str) -> Result<HostProfile> {
    store
        .get(host)
        .await?
        .ok_or_else(|| anyhow!("No PC {} settings", host.trim()))
}

fn dispatcher(settings: Option<PathBuf>) -> Result<Dispatcher> {
    let config = ControlConfig::load(&settings.unwrap_or_else(default_settings_path))?;
    Ok(Dispatcher::new(
        Arc::new(SshConnector::new()),
        config.session_settings()?,
    ))
}

async fn power(
    store: &JsonProfileStore,
    settings: Option<PathBuf>,
    host: &str,
    action: PowerAction,
) -> Result<()> {
    let profile = resolve(store, host).await?;
    let outcome = dispatcher(settings)?.dispatch(&profile, action).await;
    if let Some(status) = outcome.status {
        println!("Status: {}", status);
    }
    if !outcome.is_success() {
        bail!(outcome.message);
    }
    println!("{}", outcome.message);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let store = JsonProfileStore::new(cli.store.unwrap_or_else(default_profile_path));
    let settings = cli.settings;

    match cli.command {
        Command::Add {
            host,
            mac,
            user,
            password,
            port,
        } => {
            let profile = validate_profile(&host, &mac, &user, &password, port)?;
            store.put(&profile).await?;
            println!("Saved PC {}", profile.host);
        }
        Command::List => {
            let profiles = store.list().await?;
            if profiles.is_empty() {
                println!("No PCs configured");
            }
            for profile in profiles {
                println!(
                    "{}\tMAC {}\t{}@{}:{}",
                    profile.host, profile.mac, profile.user, profile.host, profile.port
                );
            }
        }
        Command::Reset => {
            store.reset_all().await?;
            println!("All PC settings reset");
        }
        Command::Status(HostArg { host }) => {
            let profile = resolve(&store, &host).await?;
            let status = dispatcher(settings)?.check_status(&profile).await;
            println!("Status: {}", status);
            println!("Host: {}", profile.host);
            println!("MAC: {}", profile.mac);
            println!("Username: {}", profile.user);
        }
        Command::Wake(HostArg { host }) => {
            power(&store, settings, &host, PowerAction::Wake).await?
        }
        Command::Sleep(HostArg { host }) => {
            power(&store, settings, &host, PowerAction::Sleep).await?
        }
        Command::Hibernate(HostArg { host }) => {
            power(&store, settings, &host, PowerAction::Hibernate).await?
        }
        Command::Shutdown(HostArg { host }) => {
            power(&store, settings, &host, PowerAction::Shutdown).await?
        }
        Command::Reboot(HostArg { host }) => {
            power(&store, settings, &host, PowerAction::Reboot).await?
        }
        Command::Lock(HostArg { host }) => {
            power(&store, settings, &host, PowerAction::Lock).await?
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    winturn::logger::init_logger(&state_dir());

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_subcommands_take_a_host() {
        let cli = Cli::try_parse_from(["winturn", "hibernate", "10.0.0.5"]).unwrap();
        match cli.command {
            Command::Hibernate(HostArg { host }) => assert_eq!(host, "10.0.0.5"),
            _ => panic!("expected hibernate"),
        }

        assert!(Cli::try_parse_from(["winturn", "shutdown"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["winturn", "list", "--store", "/tmp/pcs.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/pcs.json")));
        assert!(matches!(cli.command, Command::List));
    }

    #[tokio::test]
    async fn power_action_on_unknown_host_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path().join("config.json"));

        let err = power(&store, None, "desk", PowerAction::Shutdown)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No PC desk settings");
    }

    #[test]
    fn add_defaults_to_ssh_port() {
        let cli = Cli::try_parse_from([
            "winturn", "add", "--host", "desk", "--mac", "AA:BB:CC:DD:EE:FF", "--user", "u",
            "--password", "p",
        ])
        .unwrap();
        match cli.command {
            Command::Add { port, .. } => assert_eq!(port, 22),
            _ => panic!("expected add"),
        }
    }

    #[tokio::test]
    async fn unknown_host_reports_missing_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path().join("config.json"));

        let err = resolve(&store, " laptop ").await.unwrap_err();
        assert_eq!(err.to_string(), "No PC laptop settings");
    }
}
