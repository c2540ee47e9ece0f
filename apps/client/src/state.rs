use std::sync::Arc;

use crate::backend::auth::AuthClient;
use crate::backend::DocStoreClient;
use crate::bookmarks::BookmarkService;
use crate::catalog::loader::CatalogLoader;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::feedback::FeedbackService;
use crate::profile::schools::SchoolDirectory;
use crate::profile::service::ProfileService;
use crate::storage::PhotoStore;

/// Shared application state: one client per remote surface, one service per
/// domain concern, all behind `Arc` so screens share the same instances.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub photos: PhotoStore,
    pub catalog: Arc<Catalog>,
    pub loader: Arc<CatalogLoader>,
    pub bookmarks: Arc<BookmarkService>,
    pub profile: Arc<ProfileService>,
    pub feedback: Arc<FeedbackService>,
    pub schools: Arc<SchoolDirectory>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        docstore: DocStoreClient,
        auth: AuthClient,
        photos: PhotoStore,
        schools: SchoolDirectory,
    ) -> AppState {
        let docstore = Arc::new(docstore);
        let schools = Arc::new(schools);
        let catalog = Arc::new(Catalog::new());

        AppState {
            auth,
            photos,
            catalog: catalog.clone(),
            loader: Arc::new(CatalogLoader::new(docstore.clone(), catalog)),
            bookmarks: Arc::new(BookmarkService::new(docstore.clone())),
            profile: Arc::new(ProfileService::new(docstore.clone(), schools.clone())),
            feedback: Arc::new(FeedbackService::new(docstore)),
            schools,
            config,
        }
    }
}
