//! CLI runner - executes commands

use crate::auth::{PinAuthenticator, PORTAL_URL};
use crate::cli::commands::{Cli, Commands};
use crate::config::Settings;
use crate::ecobee::EcobeeClient;
use crate::engine::{ArchiveConfig, ArchiveEngine, Stage};
use crate::error::Result;
use crate::output::{ArchiveWriter, ElasticClient};
use crate::partition::DateWindowRouter;
use crate::state::{AppContext, CredentialStore};
use anyhow::Context;
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let settings = self.settings()?;

        match &self.cli.command {
            Commands::Pin => self.pin(&settings).await,
            Commands::Token { code } => self.token(&settings, code).await,
            Commands::Refresh => self.refresh(&settings).await,
            Commands::Archive { start, .. } => self.archive(&settings, start).await,
        }
    }

    /// Run the CLI command with the subcommand named in the error chain
    pub async fn execute(&self) -> anyhow::Result<()> {
        let command = self.cli.command.name();
        self.run()
            .await
            .with_context(|| format!("{command} failed"))
    }

    /// Settings file merged with command-line overrides
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.cli.config.as_deref())?;

        if let Some(path) = &self.cli.credentials {
            settings.ecobee.credentials.clone_from(path);
        }

        if let Commands::Archive {
            elasticsearch,
            index,
            archive_dir,
            pause,
            ..
        } = &self.cli.command
        {
            if let Some(host) = elasticsearch {
                settings.elasticsearch.host.clone_from(host);
            }
            if let Some(index) = index {
                settings.elasticsearch.index.clone_from(index);
            }
            if let Some(dir) = archive_dir {
                settings.archive.dir.clone_from(dir);
            }
            if let Some(pause) = pause {
                settings.archive.pause_seconds = *pause;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load the stored credentials
    async fn context(settings: &Settings) -> Result<(CredentialStore, AppContext)> {
        let store = CredentialStore::new(&settings.ecobee.credentials);
        let ctx = store.load().await?;
        Ok((store, ctx))
    }

    fn authenticator(settings: &Settings, ctx: &AppContext) -> Result<PinAuthenticator> {
        PinAuthenticator::new(
            &settings.ecobee.api_base,
            &ctx.app_key,
            settings.ecobee.auth_timeout(),
        )
    }

    fn ecobee(settings: &Settings, ctx: &AppContext, store: CredentialStore) -> Result<EcobeeClient> {
        EcobeeClient::new(
            &settings.ecobee.api_base,
            &ctx.app_key,
            settings.ecobee.api_timeout(),
            settings.ecobee.auth_timeout(),
            store,
        )
    }

    /// Request a PIN; on a terminal wait for the user and fetch tokens
    async fn pin(&self, settings: &Settings) -> Result<()> {
        let (store, mut ctx) = Self::context(settings).await?;
        let pin = Self::authenticator(settings, &ctx)?.request_pin().await?;

        if !std::io::stdout().is_terminal() {
            println!("Pin: {}\nCode: {}", pin.pin, pin.code);
            return Ok(());
        }

        println!(
            "Please visit {PORTAL_URL} and enter the Pin code: {}",
            pin.pin
        );

        if !std::io::stdin().is_terminal() {
            println!("When finished, run: elastibee token {}", pin.code);
            return Ok(());
        }

        print!("Press enter when finished...");
        std::io::stdout().flush()?;
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        Self::exchange(settings, &store, &mut ctx, &pin.code).await
    }

    /// Exchange an authorization code and store the tokens
    async fn token(&self, settings: &Settings, code: &str) -> Result<()> {
        let (store, mut ctx) = Self::context(settings).await?;
        Self::exchange(settings, &store, &mut ctx, code).await
    }

    async fn exchange(
        settings: &Settings,
        store: &CredentialStore,
        ctx: &mut AppContext,
        code: &str,
    ) -> Result<()> {
        let token = Self::authenticator(settings, ctx)?
            .exchange_code(code)
            .await?;
        ctx.set_tokens(token.access_token, token.refresh_token);
        store.save(ctx).await?;

        info!(path = %store.path().display(), "Stored tokens");
        println!("tokens saved to {}", store.path().display());
        Ok(())
    }

    /// Refresh and store the access token
    async fn refresh(&self, settings: &Settings) -> Result<()> {
        let (store, mut ctx) = Self::context(settings).await?;
        Self::ecobee(settings, &ctx, store)?
            .refresh(&mut ctx)
            .await?;
        println!("refresh successful");
        Ok(())
    }

    /// Archive every window from `start` up to today
    async fn archive(&self, settings: &Settings, start: &str) -> Result<()> {
        let windows =
            DateWindowRouter::from_str_until_today(start, settings.archive.window_days)?.windows();
        let (store, mut ctx) = Self::context(settings).await?;

        let ecobee = Self::ecobee(settings, &ctx, store)?;
        let elastic =
            ElasticClient::new(&settings.elasticsearch.host, settings.elasticsearch.timeout())?;
        let writer = ArchiveWriter::new(&settings.archive.dir);

        let config = ArchiveConfig::new()
            .with_index(&settings.elasticsearch.index)
            .with_mapping(&settings.elasticsearch.mapping)
            .with_pause(settings.archive.pause());

        let mut engine = ArchiveEngine::new(ecobee, elastic, writer).with_config(config);
        if std::io::stdout().is_terminal() {
            engine = engine.with_progress(|window, stage| {
                if stage == Stage::Fetching {
                    println!("Date range {window}");
                }
                println!("  {stage}");
            });
        }

        let stats = engine.run(&mut ctx, &windows).await?;
        println!(
            "archive done: {} windows, {} records ({} skipped rows)",
            stats.windows,
            stats.records(),
            stats.rows_skipped
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_settings_apply_overrides() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("elastibee.yaml");
        std::fs::write(
            &config,
            "elasticsearch:\n  host: http://from-file:9200\n  index: file-index\n",
        )
        .unwrap();

        let args: Vec<OsString> = vec![
            "elastibee".into(),
            "--config".into(),
            config.into_os_string(),
            "--credentials".into(),
            "creds.json".into(),
            "archive".into(),
            "2019-01-01".into(),
            "--elasticsearch".into(),
            "http://flag:9200".into(),
            "--archive-dir".into(),
            "out".into(),
            "--pause".into(),
            "3".into(),
        ];
        let cli = Cli::parse_from(args);

        let settings = Runner::new(cli).settings().unwrap();
        assert_eq!(settings.elasticsearch.host, "http://flag:9200");
        assert_eq!(settings.elasticsearch.index, "file-index");
        assert_eq!(settings.ecobee.credentials, PathBuf::from("creds.json"));
        assert_eq!(settings.archive.dir, PathBuf::from("out"));
        assert_eq!(settings.archive.pause_seconds, 3);
    }

    #[test]
    fn test_settings_defaults_without_file() {
        let cli = Cli::parse_from(["elastibee", "refresh"]);
        let settings = Runner::new(cli).settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_archive_rejects_bad_start_date() {
        let cli = Cli::parse_from(["elastibee", "archive", "01/01/2019"]);
        let err = Runner::new(cli).run().await.unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn test_missing_credentials_file() {
        let dir = tempdir().unwrap();
        let creds = dir.path().join("app.json");
        let args: Vec<OsString> = vec![
            "elastibee".into(),
            "--credentials".into(),
            creds.into_os_string(),
            "refresh".into(),
        ];
        let cli = Cli::parse_from(args);

        let err = Runner::new(cli).run().await.unwrap_err();
        assert!(matches!(err, crate::Error::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_execute_names_failed_command() {
        let dir = tempdir().unwrap();
        let creds = dir.path().join("app.json");
        let args: Vec<OsString> = vec![
            "elastibee".into(),
            "--credentials".into(),
            creds.into_os_string(),
            "refresh".into(),
        ];
        let cli = Cli::parse_from(args);

        let err = Runner::new(cli).execute().await.unwrap_err();
        assert_eq!(err.to_string(), "refresh failed");
        assert!(format!("{err:#}").starts_with("refresh failed: File not found: "));
        assert!(matches!(
            err.downcast_ref::<crate::Error>(),
            Some(crate::Error::FileNotFound { .. })
        ));
    }
}
