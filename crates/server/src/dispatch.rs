use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use log::{error, info, warn};
use toplist_core::{
    config::{DisplayConfig, SharedConfig},
    error::{TopListError, TopListResult},
    types::Recipient,
};

use crate::{present::Presenter, query::RankedQueryService, services::Services};

const DESCRIPTION: &str = "Shows top list by credits";

/// Called with whoever triggered the command, if anyone.
pub type TriggerHandler = Arc<dyn Fn(Option<&Recipient>) + Send + Sync>;

pub trait CommandRegistry {
    fn add_command(&mut self, name: &str, description: &str, handler: TriggerHandler);
}

/// Binds the configured commands to the query and presentation pipeline.
pub struct TopList {
    config: SharedConfig,
    query: Option<RankedQueryService>,
    presenter: Presenter,
    registered: Mutex<BTreeSet<String>>,
}

impl TopList {
    pub fn new(config: SharedConfig, services: Services) -> Arc<Self> {
        let Services {
            store,
            chat,
            menu,
            localizer,
        } = services;

        Arc::new(Self {
            config,
            query: store.map(RankedQueryService::new),
            presenter: Presenter::new(chat, menu, localizer),
            registered: Mutex::new(BTreeSet::new()),
        })
    }

    /// Registers every configured command not registered yet. Returns how many were added.
    ///
    /// Nothing gets registered without a store.
    pub fn register_triggers(self: &Arc<Self>, registry: &mut dyn CommandRegistry) -> usize {
        if self.query.is_none() {
            warn!("Score store unavailable, top list commands are not registered");
            return 0;
        }

        let config = self.config.snapshot();
        let handler = self.handler();
        let mut registered = self.registered.lock().unwrap_or_else(|e| e.into_inner());
        let mut added = 0;

        for name in &config.trigger_names {
            let name = name.trim();
            if name.is_empty() {
                warn!("Ignoring empty command name");
                continue;
            }
            if !registered.insert(name.to_string()) {
                continue;
            }
            registry.add_command(name, DESCRIPTION, handler.clone());
            info!("Registered command {name}");
            added += 1;
        }

        added
    }

    /// Swaps in a new display config. Commands are only ever added, never removed.
    pub fn reload(
        self: &Arc<Self>,
        config: DisplayConfig,
        registry: &mut dyn CommandRegistry,
    ) -> usize {
        self.config.replace(config);
        self.register_triggers(registry)
    }

    /// Fetches the top list and shows it to `invoker`. Without an invoker this does nothing.
    pub fn on_trigger(&self, invoker: Option<&Recipient>) -> TopListResult<()> {
        let Some(recipient) = invoker else {
            return Ok(());
        };

        let query = self.query.as_ref().ok_or_else(|| {
            TopListError::StoreUnavailable("score store could not be located".into())
        })?;

        let config = self.config.snapshot();
        let board = query.fetch_top(config.limit.get())?;
        self.presenter.present(&board, &config, recipient);
        Ok(())
    }

    fn handler(self: &Arc<Self>) -> TriggerHandler {
        let toplist = Arc::clone(self);
        Arc::new(move |invoker: Option<&Recipient>| {
            if let Err(e) = toplist.on_trigger(invoker) {
                error!("Top list request failed: {e}");
            }
        })
    }
}
