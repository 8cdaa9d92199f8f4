use std::{
    env, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use log::{info, warn};
use toplist_core::config::{Config, SharedConfig};

use crate::{
    console::{Console, ConsoleChat},
    dispatch::TopList,
    i18n::{Localizer, Translations},
    services::Services,
    store::{ScoreStore, SqliteStore},
    tui::{DEFAULT_WIDTH, TermMenu},
};

mod console;
mod dispatch;
mod i18n;
mod present;
mod query;
mod services;
mod store;
#[cfg(test)]
mod testutil;
mod tui;

const DEFAULT_CONFIG: &str = "config/toplist.json";

/// Provided by the store economy, overrides the configured database
const DATABASE_ENV: &str = "TOPLIST_DATABASE";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::load(&config_path)?;

    let services = Services::new(
        open_store(&config),
        Arc::new(ConsoleChat::new(io::stdout())),
        Arc::new(TermMenu::new(io::stdout(), DEFAULT_WIDTH)),
        load_translations(&config),
    );
    let toplist = TopList::new(SharedConfig::new(config.display.clone()), services);

    let mut console = Console::new();
    let added = toplist.register_triggers(console.table_mut());
    info!("Top list ready with {added} command(s)");

    console.run(io::stdin().lock(), |table| {
        let newer = Config::read(&config_path)?;
        for section in config.restart_required(&newer) {
            warn!("`{section}` changed in {}, restart to apply it", config_path.display());
        }
        let added = toplist.reload(newer.display, table);
        info!("Config reloaded from {}, {added} new command(s)", config_path.display());
        Ok(())
    })
}

fn open_store(config: &Config) -> Option<Arc<dyn ScoreStore>> {
    let Some(database) = env::var(DATABASE_ENV).ok().or_else(|| config.store.database.clone())
    else {
        warn!("No score database configured, set {DATABASE_ENV} or store.database");
        return None;
    };

    match SqliteStore::connect(database.as_str(), &config.store) {
        Ok(store) => {
            info!("Reading scores from {database} ({} connections)", store.size());
            Some(Arc::new(store))
        }
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}

fn load_translations(config: &Config) -> Arc<dyn Localizer> {
    let Some(path) = config.language_file.as_deref() else {
        return Arc::new(Translations::builtin());
    };
    Arc::new(translations_or_builtin(path))
}

fn translations_or_builtin(path: &Path) -> Translations {
    Translations::load(path).unwrap_or_else(|e| {
        warn!("{e:#}, using built-in strings");
        Translations::builtin()
    })
}
