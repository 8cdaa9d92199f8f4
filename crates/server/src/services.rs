use std::sync::Arc;

use crate::{
    i18n::Localizer,
    present::{ChatPrinter, MenuPresenter},
    store::ScoreStore,
};

/// Collaborators handed to the top list at startup.
#[derive(Clone)]
pub struct Services {
    /// None when the store could not be reached at startup
    pub store: Option<Arc<dyn ScoreStore>>,
    pub chat: Arc<dyn ChatPrinter>,
    pub menu: Arc<dyn MenuPresenter>,
    pub localizer: Arc<dyn Localizer>,
}

impl Services {
    pub(crate) fn new(
        store: Option<Arc<dyn ScoreStore>>,
        chat: Arc<dyn ChatPrinter>,
        menu: Arc<dyn MenuPresenter>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Services {
            store,
            chat,
            menu,
            localizer,
        }
    }
}
