//! Application state management for the storefront TUI.
//!
//! This module contains the core `App` struct that owns the services (API
//! client, session store, route guard, cache), the navigation stack, all
//! per-screen UI state, and the channel through which spawned API tasks report
//! back to the main loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use storefront_core::api::{user_message, ApiClient};
use storefront_core::auth::{Credentials, FileStorage, SessionState, SessionStore};
use storefront_core::cache::CacheManager;
use storefront_core::catalog::{FormField, ProductForm, ValidationErrors, CATEGORY_GROUPS};
use storefront_core::config::Config;
use storefront_core::guard::{route_for, Navigator, Route, RouteGuard};
use storefront_core::models::Product;
use storefront_core::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a product form field.
const MAX_FORM_FIELD_LENGTH: usize = 500;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variable pre-filling the login username.
pub const USERNAME_ENV: &str = "STOREFRONT_USERNAME";

/// Environment variable supplying the password for `--login`.
pub const PASSWORD_ENV: &str = "STOREFRONT_PASSWORD";

// ============================================================================
// Navigation
// ============================================================================

/// A screen on the navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
    ProductDetail(i64),
    /// Create (`None`) or edit (`Some(id)`) a product
    ProductForm(Option<i64>),
}

/// Navigation stack. User actions push and pop; the route guard replaces the
/// top entry.
#[derive(Debug, Default)]
pub struct Router {
    stack: Vec<Screen>,
}

impl Router {
    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Login)
    }

    pub fn push(&mut self, screen: Screen) {
        self.stack.push(screen);
    }

    /// Pop the top screen. The bottom screen is never popped.
    pub fn back(&mut self) -> bool {
        if self.depth() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Navigator for Router {
    fn replace(&mut self, route: Route) {
        let screen = match route {
            Route::Login => Screen::Login,
            Route::Home => Screen::Home,
        };
        match self.stack.last_mut() {
            Some(top) => *top = screen,
            None => self.stack.push(screen),
        }
    }
}

// ============================================================================
// UI State Types
// ============================================================================

/// Tabs of the home screen: one per category group, then settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeTab {
    Category(usize),
    Settings,
}

impl HomeTab {
    pub fn all() -> Vec<HomeTab> {
        (0..CATEGORY_GROUPS.len())
            .map(HomeTab::Category)
            .chain(std::iter::once(HomeTab::Settings))
            .collect()
    }

    pub fn title(&self) -> &'static str {
        match self {
            HomeTab::Category(i) => CATEGORY_GROUPS.get(*i).map(|g| g.label).unwrap_or("?"),
            HomeTab::Settings => "Settings",
        }
    }

    fn position(&self) -> usize {
        match self {
            HomeTab::Category(i) => *i,
            HomeTab::Settings => CATEGORY_GROUPS.len(),
        }
    }

    fn from_position(position: usize) -> Self {
        if position < CATEGORY_GROUPS.len() {
            HomeTab::Category(position)
        } else {
            HomeTab::Settings
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        Self::from_position((self.position() + 1) % (CATEGORY_GROUPS.len() + 1))
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        let count = CATEGORY_GROUPS.len() + 1;
        Self::from_position((self.position() + count - 1) % count)
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingDelete,
    ConfirmingLogout,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned API tasks.
///
/// Errors are already rendered into user-facing text by the task.
#[derive(Debug)]
enum TaskResult {
    /// Product list for the category group at the given index, fetched
    /// during the given session generation
    Products {
        group: usize,
        generation: u64,
        result: Result<Vec<Product>, String>,
    },
    /// Fresh copy of a single product
    Product {
        id: i64,
        result: Result<Product, String>,
    },
    /// Outcome of creating (`id: None`) or updating a product
    Saved {
        id: Option<i64>,
        result: Result<Product, String>,
    },
    Deleted {
        id: i64,
        result: Result<Product, String>,
    },
    /// The session changed in memory but could not be written to disk
    SessionNotSaved(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionStore,
    pub cache: CacheManager,
    guard: RouteGuard,
    pub router: Router,

    // UI State
    pub state: AppState,
    pub home_tab: HomeTab,
    pub search_query: String,
    pub status_message: Option<String>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Product list
    pub products: Vec<Product>,
    pub products_loading: bool,
    pub products_error: bool,
    pub products_age: Option<String>,
    pub product_selection: usize,

    // Product detail
    pub detail: Option<Product>,
    pub detail_loading: bool,
    pub detail_error: Option<String>,

    // Product form
    pub form: ProductForm,
    pub form_focus: FormField,
    pub form_errors: ValidationErrors,
    pub form_saving: bool,

    /// Bumped on every redirect; results from older generations are dropped
    session_generation: u64,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

/// Build the API client and rehydrate the persisted session.
///
/// An unreadable session file is discarded rather than blocking startup.
pub fn open_session(config: &Config) -> Result<(ApiClient, SessionStore, PathBuf)> {
    let cache_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

    let api = ApiClient::new(config.api_base_url()).context("Failed to create API client")?;
    let storage = Arc::new(FileStorage::new(cache_dir.clone()));

    let session = match SessionStore::rehydrate(Arc::new(api.clone()), storage.clone()) {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Discarding unreadable saved session");
            SessionStore::new(Arc::new(api.clone()), storage)
        }
    };

    Ok((api, session, cache_dir))
}

impl App {
    /// Create the application from the on-disk configuration and session
    pub fn new(config: Config) -> Result<Self> {
        let (api, session, cache_dir) = open_session(&config)?;
        debug!(base_url = api.base_url(), ?cache_dir, "Services opened");
        let cache = CacheManager::new(cache_dir).context("Failed to open cache")?;

        let mut app = Self::with_services(config, api, session, cache);
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            if app.login_username.is_empty() && !username.is_empty() {
                app.login_username = username;
                app.login_focus = LoginFocus::Password;
            }
        }
        Ok(app)
    }

    /// Create the application around already-built services and mount the
    /// route guard.
    pub fn with_services(
        config: Config,
        api: ApiClient,
        session: SessionStore,
        cache: CacheManager,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut router = Router::default();
        let guard = RouteGuard::mount(&session, &mut router);
        let initial = route_for(guard.session());

        let login_username = config.last_username.clone().unwrap_or_default();

        let mut app = Self {
            config,
            api,
            session,
            cache,
            guard,
            router,
            state: AppState::Normal,
            home_tab: HomeTab::Category(0),
            search_query: String::new(),
            status_message: None,
            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,
            products: Vec::new(),
            products_loading: false,
            products_error: false,
            products_age: None,
            product_selection: 0,
            detail: None,
            detail_loading: false,
            detail_error: None,
            form: ProductForm::default(),
            form_focus: FormField::Title,
            form_errors: ValidationErrors::default(),
            form_saving: false,
            session_generation: 0,
            task_rx,
            task_tx,
        };
        app.enter_route(initial);
        app
    }

    /// Latest session state observed by the route guard
    pub fn session_state(&self) -> &SessionState {
        self.guard.session()
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Apply any redirect caused by a session change since the last call
    pub fn sync_route(&mut self) {
        if let Some(route) = self.guard.poll(&mut self.router) {
            self.enter_route(route);
        }
    }

    fn enter_route(&mut self, route: Route) {
        info!(?route, "Entering route");
        self.session_generation += 1;
        match route {
            Route::Home => {
                match self.session_state().token.clone() {
                    Some(token) => self.api.set_token(token),
                    None => self.api.clear_token(),
                }
                self.login_password.clear();
                self.login_error = None;
                self.state = AppState::Normal;
                self.home_tab = HomeTab::Category(0);
                self.load_products();
            }
            Route::Login => {
                self.api.clear_token();
                self.state = AppState::Normal;
                self.search_query.clear();
                self.products.clear();
                self.products_age = None;
                self.product_selection = 0;
                self.detail = None;
                self.login_focus = if self.login_username.is_empty() {
                    LoginFocus::Username
                } else {
                    LoginFocus::Password
                };
            }
        }
    }

    /// Pop the current screen, if there is one to go back to
    pub fn go_back(&mut self) {
        if self.router.back() {
            self.form_errors = ValidationErrors::default();
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Validate the login form and start a login in the background
    pub fn submit_login(&mut self) {
        let username = self.login_username.trim().to_string();
        if username.is_empty() {
            self.login_error = Some("Username is required".to_string());
            self.login_focus = LoginFocus::Username;
            return;
        }
        if self.login_password.is_empty() {
            self.login_error = Some("Password is required".to_string());
            self.login_focus = LoginFocus::Password;
            return;
        }
        self.login_error = None;

        self.remember_username(&username);

        let credentials = Credentials::new(username, self.login_password.clone());
        let store = self.session.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = store.login(credentials).await {
                Self::send_result(&tx, TaskResult::SessionNotSaved(e.to_string())).await;
            }
        });
    }

    fn remember_username(&mut self, username: &str) {
        if self.config.last_username.as_deref() == Some(username) {
            return;
        }
        self.config.last_username = Some(username.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Clear the session and cached lists. The guard redirects on next sync.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            error!(error = %e, "Failed to persist logout");
            self.status_message = Some(format!("Session not saved: {}", e));
        }
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear product cache");
        }
    }

    // =========================================================================
    // Product list
    // =========================================================================

    pub fn category_index(&self) -> Option<usize> {
        match self.home_tab {
            HomeTab::Category(i) if i < CATEGORY_GROUPS.len() => Some(i),
            _ => None,
        }
    }

    /// Switch home tab, loading the group's products when it is a category
    pub fn select_tab(&mut self, tab: HomeTab) {
        if tab == self.home_tab {
            return;
        }
        self.home_tab = tab;
        self.search_query.clear();
        self.product_selection = 0;
        if self.category_index().is_some() {
            self.load_products();
        }
    }

    /// Show cached products for the current group, refreshing when the cache
    /// is missing or stale.
    pub fn load_products(&mut self) {
        let Some(index) = self.category_index() else {
            return;
        };
        let group = &CATEGORY_GROUPS[index];

        self.products_error = false;
        let stale = match self.cache.products_or_none(group) {
            Some(cached) => {
                let stale = cached.is_stale();
                self.products_age = Some(cached.age_display());
                self.products = cached.data;
                stale
            }
            None => {
                self.products_age = None;
                self.products.clear();
                true
            }
        };
        self.clamp_selection();

        if stale {
            self.refresh_products();
        }
    }

    /// Fetch the current group's products from the API
    pub fn refresh_products(&mut self) {
        let Some(index) = self.category_index() else {
            return;
        };
        info!(group = CATEGORY_GROUPS[index].label, "Refreshing products");

        self.products_loading = true;
        self.products_error = false;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session_generation;
        tokio::spawn(async move {
            let group = &CATEGORY_GROUPS[index];
            let result = api.fetch_products(group.categories).await.map_err(|e| {
                error!(error = %e, group = group.label, "Failed to fetch products");
                user_message(&e)
            });
            Self::send_result(
                &tx,
                TaskResult::Products {
                    group: index,
                    generation,
                    result,
                },
            )
            .await;
        });
    }

    /// Products of the current group matching the search query
    pub fn visible_products(&self) -> Vec<&Product> {
        let query = self.search_query.trim();
        self.products
            .iter()
            .filter(|p| query.is_empty() || contains_ignore_case(&p.title, query))
            .collect()
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.visible_products().get(self.product_selection).copied()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_products().len();
        self.product_selection = self.product_selection.min(len.saturating_sub(1));
    }

    // =========================================================================
    // Product detail
    // =========================================================================

    pub fn open_selected_product(&mut self) {
        if let Some(product) = self.selected_product().cloned() {
            self.open_product(product);
        }
    }

    fn open_product(&mut self, product: Product) {
        let id = product.id;
        self.detail = Some(product);
        self.detail_error = None;
        self.router.push(Screen::ProductDetail(id));
        self.fetch_product(id);
    }

    /// Fetch a fresh copy of a product for the detail screen
    pub fn fetch_product(&mut self, id: i64) {
        self.detail_loading = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_product(id).await.map_err(|e| {
                warn!(error = %e, product_id = id, "Failed to fetch product");
                user_message(&e)
            });
            Self::send_result(&tx, TaskResult::Product { id, result }).await;
        });
    }

    /// Ask the API to delete the product shown on the detail screen
    pub fn delete_current_product(&mut self) {
        self.state = AppState::Normal;
        let Screen::ProductDetail(id) = self.router.current() else {
            return;
        };
        info!(product_id = id, "Deleting product");

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.delete_product(id).await.map_err(|e| {
                error!(error = %e, product_id = id, "Failed to delete product");
                user_message(&e)
            });
            Self::send_result(&tx, TaskResult::Deleted { id, result }).await;
        });
    }

    // =========================================================================
    // Product form
    // =========================================================================

    pub fn open_new_form(&mut self) {
        self.form = ProductForm::default();
        self.form_focus = FormField::Title;
        self.form_errors = ValidationErrors::default();
        self.router.push(Screen::ProductForm(None));
    }

    pub fn open_edit_form(&mut self) {
        let Some(ref product) = self.detail else {
            return;
        };
        self.form = ProductForm::from_product(product);
        self.form_focus = FormField::Title;
        self.form_errors = ValidationErrors::default();
        self.router.push(Screen::ProductForm(Some(product.id)));
    }

    /// Validate the form and, when it passes, create or update the product
    pub fn submit_form(&mut self) {
        if self.form_saving {
            return;
        }

        let draft = match self.form.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                if let Some(first) = FormField::ALL.iter().find(|f| errors.get(**f).is_some()) {
                    self.form_focus = *first;
                }
                self.form_errors = errors;
                return;
            }
        };
        self.form_errors = ValidationErrors::default();
        self.form_saving = true;

        let editing = match self.router.current() {
            Screen::ProductForm(id) => id,
            _ => None,
        };

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match editing {
                Some(id) => api.update_product(id, &draft).await,
                None => api.add_product(&draft).await,
            };
            let result = result.map_err(|e| {
                error!(error = %e, product_id = ?editing, "Failed to save product");
                user_message(&e)
            });
            Self::send_result(&tx, TaskResult::Saved { id: editing, result }).await;
        });
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Products { generation, .. } if generation != self.session_generation => {
                debug!(generation, "Dropping products fetched for an earlier session");
            }
            TaskResult::Products { group, result, .. } => {
                let current = self.category_index() == Some(group);
                match result {
                    Ok(products) => {
                        if let Err(e) = self.cache.save_products(&CATEGORY_GROUPS[group], &products) {
                            warn!(error = %e, "Failed to cache products");
                        }
                        if current {
                            debug!(count = products.len(), "Products loaded");
                            self.products = products;
                            self.products_age = Some("just now".to_string());
                            self.products_loading = false;
                            self.products_error = false;
                            self.clamp_selection();
                        }
                    }
                    Err(_) if current => {
                        self.products_loading = false;
                        self.products_error = true;
                    }
                    Err(_) => {}
                }
            }
            TaskResult::Product { id, result } => {
                if self.router.current() != Screen::ProductDetail(id) {
                    return;
                }
                self.detail_loading = false;
                match result {
                    Ok(product) => {
                        self.detail = Some(product);
                        self.detail_error = None;
                    }
                    // Keep the list copy when the refetch fails
                    Err(_) if self.detail.as_ref().is_some_and(|p| p.id == id) => {}
                    Err(message) => self.detail_error = Some(message),
                }
            }
            TaskResult::Saved { id, result } => {
                self.form_saving = false;
                match result {
                    Ok(product) => {
                        info!(product_id = product.id, "Product saved");
                        self.apply_saved(product);
                        if matches!(self.router.current(), Screen::ProductForm(_)) {
                            self.go_back();
                        }
                        self.status_message = Some(
                            if id.is_some() {
                                "Product updated successfully!"
                            } else {
                                "Product created successfully!"
                            }
                            .to_string(),
                        );
                    }
                    Err(message) => {
                        self.status_message =
                            Some(format!("Could not save the product. Details: {}", message));
                    }
                }
            }
            TaskResult::Deleted { id, result } => match result {
                Ok(_) => {
                    self.products.retain(|p| p.id != id);
                    self.clamp_selection();
                    if self.detail.as_ref().is_some_and(|p| p.id == id) {
                        self.detail = None;
                    }
                    if self.router.current() == Screen::ProductDetail(id) {
                        self.go_back();
                    }
                    self.status_message = Some("Product deleted successfully!".to_string());
                }
                Err(_) => {
                    self.status_message = Some("Error deleting the product!".to_string());
                }
            },
            TaskResult::SessionNotSaved(message) => {
                self.status_message = Some(format!("Session not saved: {}", message));
            }
        }
    }

    /// Merge a created or updated product into the list and the detail view
    fn apply_saved(&mut self, product: Product) {
        if self.detail.as_ref().is_some_and(|p| p.id == product.id) {
            self.detail = Some(product.clone());
        }
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.insert(0, product),
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a product form character should be accepted
pub fn can_add_form_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FORM_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use storefront_core::api::{ApiError, ErrorBody};
    use storefront_core::auth::{
        AuthenticatedUser, Authenticator, KeyValueStorage, MemoryStorage, STORE_NAME,
    };

    use super::*;

    /// Accepts `emilys` / `emilyspass`, rejects everything else with a message
    struct FixedAuthenticator;

    #[async_trait]
    impl Authenticator for FixedAuthenticator {
        async fn authenticate(
            &self,
            credentials: &Credentials,
        ) -> Result<AuthenticatedUser, ApiError> {
            if credentials.username == "emilys" && credentials.password == "emilyspass" {
                Ok(AuthenticatedUser {
                    profile: serde_json::from_value(json!({
                        "id": 1, "username": "emilys", "firstName": "Emily", "lastName": "Johnson"
                    }))
                    .unwrap(),
                    token: "token-1".to_string(),
                })
            } else {
                Err(ApiError::BadRequest(ErrorBody::parse(
                    r#"{"message": "Invalid credentials"}"#,
                )))
            }
        }
    }

    fn product(id: i64, title: &str) -> Product {
        serde_json::from_value(json!({
            "id": id, "title": title, "description": "d", "price": 10.0,
            "thumbnail": "https://x/y.png"
        }))
        .unwrap()
    }

    fn build_app(storage: Arc<MemoryStorage>, dir: &tempfile::TempDir) -> App {
        let config = Config {
            api_base_url: None,
            last_username: Some("emilys".to_string()),
        };
        // Nothing listens here; product fetches fail fast and are ignored
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let session = SessionStore::rehydrate(Arc::new(FixedAuthenticator), storage).unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        App::with_services(config, api, session, cache)
    }

    fn signed_in_storage() -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        let state = SessionState {
            user: Some(serde_json::from_value(json!({"id": 1, "username": "emilys"})).unwrap()),
            token: Some("token-1".to_string()),
            ..Default::default()
        };
        storage
            .set_item(STORE_NAME, &state.to_persisted().unwrap())
            .unwrap();
        storage
    }

    async fn wait_for_screen(app: &mut App, screen: Screen) {
        for _ in 0..100 {
            app.sync_route();
            if app.router.current() == screen && !app.session_state().is_loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("never reached {:?}", screen);
    }

    // -------------------------------------------------------------------------
    // Router Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_router_replace_never_grows_stack() {
        let mut router = Router::default();
        router.replace(Route::Login);
        assert_eq!(router.current(), Screen::Login);
        assert_eq!(router.depth(), 1);

        router.replace(Route::Home);
        assert_eq!(router.current(), Screen::Home);
        assert_eq!(router.depth(), 1);

        router.push(Screen::ProductDetail(3));
        router.replace(Route::Login);
        assert_eq!(router.current(), Screen::Login);
        assert_eq!(router.depth(), 2);
    }

    #[test]
    fn test_router_back_keeps_bottom_screen() {
        let mut router = Router::default();
        router.replace(Route::Home);
        router.push(Screen::ProductDetail(1));
        router.push(Screen::ProductForm(Some(1)));

        assert!(router.back());
        assert_eq!(router.current(), Screen::ProductDetail(1));
        assert!(router.back());
        assert!(!router.back());
        assert_eq!(router.current(), Screen::Home);
    }

    // -------------------------------------------------------------------------
    // HomeTab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_home_tab_next() {
        assert_eq!(HomeTab::Category(0).next(), HomeTab::Category(1));
        assert_eq!(HomeTab::Category(1).next(), HomeTab::Settings);
        assert_eq!(HomeTab::Settings.next(), HomeTab::Category(0)); // Wraps around
    }

    #[test]
    fn test_home_tab_prev() {
        assert_eq!(HomeTab::Category(0).prev(), HomeTab::Settings); // Wraps around
        assert_eq!(HomeTab::Settings.prev(), HomeTab::Category(1));
        assert_eq!(HomeTab::all().len(), CATEGORY_GROUPS.len() + 1);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_form_char() {
        assert!(can_add_form_char(0, 'ç'));
        assert!(!can_add_form_char(500, 'a'));
        assert!(!can_add_form_char(0, '\x00'));
    }

    // -------------------------------------------------------------------------
    // Session Flow Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_starts_on_login_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(Arc::new(MemoryStorage::new()), &dir);

        assert_eq!(app.router.current(), Screen::Login);
        assert_eq!(app.router.depth(), 1);
        assert_eq!(app.login_username, "emilys");
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[tokio::test]
    async fn test_starts_on_home_with_saved_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(signed_in_storage(), &dir);

        assert_eq!(app.router.current(), Screen::Home);
        assert_eq!(app.home_tab, HomeTab::Category(0));
        assert!(app.products_loading);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(Arc::new(MemoryStorage::new()), &dir);

        app.login_username.clear();
        app.submit_login();
        assert_eq!(app.login_error.as_deref(), Some("Username is required"));
        assert_eq!(app.login_focus, LoginFocus::Username);

        app.login_username = "emilys".to_string();
        app.submit_login();
        assert_eq!(app.login_error.as_deref(), Some("Password is required"));
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(!app.session.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_successful_login_redirects_home() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(Arc::new(MemoryStorage::new()), &dir);

        app.login_password = "emilyspass".to_string();
        app.submit_login();
        wait_for_screen(&mut app, Screen::Home).await;

        assert_eq!(app.router.depth(), 1);
        assert!(app.login_password.is_empty());
        assert_eq!(app.session_state().token.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_rejected_login_stays_on_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(Arc::new(MemoryStorage::new()), &dir);

        app.login_password = "wrong".to_string();
        app.submit_login();
        for _ in 0..100 {
            app.sync_route();
            if app.session_state().error.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(app.router.current(), Screen::Login);
        assert_eq!(app.session_state().error.as_deref(), Some("Invalid credentials"));
        assert!(app.session_state().user.is_none());
    }

    #[tokio::test]
    async fn test_logout_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let storage = signed_in_storage();
        let mut app = build_app(storage.clone(), &dir);
        app.products = vec![product(1, "Shirt")];

        app.logout();
        app.sync_route();

        assert_eq!(app.router.current(), Screen::Login);
        assert_eq!(app.router.depth(), 1);
        assert!(app.products.is_empty());
        let saved = storage.get_item(STORE_NAME).unwrap().unwrap();
        assert!(SessionState::from_persisted(&saved).unwrap().token.is_none());
    }

    #[tokio::test]
    async fn test_products_from_before_logout_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);
        let signed_in_generation = app.session_generation;

        app.logout();
        app.sync_route();
        assert_eq!(app.router.current(), Screen::Login);

        app.process_task_result(TaskResult::Products {
            group: 0,
            generation: signed_in_generation,
            result: Ok(vec![product(1, "Shirt")]),
        });

        assert!(app.products.is_empty());
        assert!(app.cache.load_products(&CATEGORY_GROUPS[0]).unwrap().is_none());
    }

    // -------------------------------------------------------------------------
    // Product Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_visible_products_filters_by_title() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);
        app.products = vec![product(1, "Leather Watch"), product(2, "Running Shoe")];

        app.search_query = "WATCH".to_string();
        let visible = app.visible_products();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);

        app.search_query.clear();
        assert_eq!(app.visible_products().len(), 2);
    }

    #[tokio::test]
    async fn test_products_for_other_group_are_not_shown() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);
        app.products = vec![product(1, "Shirt")];

        app.process_task_result(TaskResult::Products {
            group: 1,
            generation: app.session_generation,
            result: Ok(vec![product(9, "Bag")]),
        });
        assert_eq!(app.products[0].id, 1);
        assert!(app.cache.load_products(&CATEGORY_GROUPS[1]).unwrap().is_some());

        app.process_task_result(TaskResult::Products {
            group: 0,
            generation: app.session_generation,
            result: Err("boom".to_string()),
        });
        assert!(app.products_error);
        assert!(!app.products_loading);
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);

        app.open_new_form();
        app.form.title = "Watch".to_string();
        app.submit_form();

        assert!(!app.form_saving);
        assert_eq!(app.form_errors.len(), 4);
        assert_eq!(app.form_focus, FormField::Description);
        assert_eq!(app.router.current(), Screen::ProductForm(None));
    }

    #[tokio::test]
    async fn test_saved_product_updates_list_and_pops_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);
        app.products = vec![product(1, "Shirt")];
        app.product_selection = 0;
        app.open_selected_product();
        app.open_edit_form();
        app.form_saving = true;

        app.process_task_result(TaskResult::Saved {
            id: Some(1),
            result: Ok(product(1, "Better Shirt")),
        });

        assert!(!app.form_saving);
        assert_eq!(app.router.current(), Screen::ProductDetail(1));
        assert_eq!(app.products[0].title, "Better Shirt");
        assert_eq!(app.detail.as_ref().unwrap().title, "Better Shirt");
        assert_eq!(app.status_message.as_deref(), Some("Product updated successfully!"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_form_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);
        app.open_new_form();

        app.process_task_result(TaskResult::Saved {
            id: None,
            result: Err("Server error".to_string()),
        });

        assert_eq!(app.router.current(), Screen::ProductForm(None));
        assert_eq!(
            app.status_message.as_deref(),
            Some("Could not save the product. Details: Server error")
        );
    }

    #[tokio::test]
    async fn test_delete_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = build_app(signed_in_storage(), &dir);
        app.products = vec![product(1, "Shirt"), product(2, "Shoe")];
        app.open_selected_product();

        app.process_task_result(TaskResult::Deleted {
            id: 1,
            result: Err("Not found".to_string()),
        });
        assert_eq!(app.router.current(), Screen::ProductDetail(1));
        assert_eq!(app.status_message.as_deref(), Some("Error deleting the product!"));

        app.process_task_result(TaskResult::Deleted {
            id: 1,
            result: Ok(product(1, "Shirt")),
        });
        assert_eq!(app.router.current(), Screen::Home);
        assert_eq!(app.products.len(), 1);
        assert!(app.detail.is_none());
        assert_eq!(app.status_message.as_deref(), Some("Product deleted successfully!"));
    }
}
