//! Application state.

use std::sync::Arc;
use std::time::Duration;

use storefront_core::{Coupon, Order, Product, Review, User};
use storefront_store::{Collection, DocumentStore, ObjectStore};

use crate::cache::{InvalidationRouter, KeyStore, PopulateMode, ReadThrough};
use crate::payments::PaymentGateway;
use crate::settings::{CatalogSettings, Settings};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    users: Collection<User>,
    products: Collection<Product>,
    reviews: Collection<Review>,
    orders: Collection<Order>,
    coupons: Collection<Coupon>,
    objects: Arc<dyn ObjectStore>,
    key_store: Arc<dyn KeyStore>,
    cache: ReadThrough,
    invalidator: InvalidationRouter,
    payments: Arc<dyn PaymentGateway>,
    catalog: CatalogSettings,
    search_ttl: Duration,
    currency: String,
}

impl AppState {
    /// Creates the state with default catalog and cache settings.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        key_store: Arc<dyn KeyStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let settings = Settings::default();
        Self {
            users: Collection::new(Arc::clone(&documents)),
            products: Collection::new(Arc::clone(&documents)),
            reviews: Collection::new(Arc::clone(&documents)),
            orders: Collection::new(Arc::clone(&documents)),
            coupons: Collection::new(documents),
            objects,
            cache: ReadThrough::new(Arc::clone(&key_store)),
            invalidator: InvalidationRouter::new(Arc::clone(&key_store)),
            key_store,
            payments,
            catalog: settings.catalog,
            search_ttl: settings.cache.search_ttl(),
            currency: settings.payments.currency,
        }
    }

    /// Applies the catalog, cache and payment settings.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.catalog = settings.catalog.clone();
        self.search_ttl = settings.cache.search_ttl();
        self.currency = settings.payments.currency.clone();
        self.with_populate_mode(settings.cache.populate)
    }

    pub fn with_populate_mode(mut self, mode: PopulateMode) -> Self {
        self.cache = self.cache.with_mode(mode);
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogSettings) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn users(&self) -> &Collection<User> {
        &self.users
    }

    pub fn products(&self) -> &Collection<Product> {
        &self.products
    }

    pub fn reviews(&self) -> &Collection<Review> {
        &self.reviews
    }

    pub fn orders(&self) -> &Collection<Order> {
        &self.orders
    }

    pub fn coupons(&self) -> &Collection<Coupon> {
        &self.coupons
    }

    /// Object storage for product photos.
    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn key_store(&self) -> &dyn KeyStore {
        self.key_store.as_ref()
    }

    pub fn cache(&self) -> &ReadThrough {
        &self.cache
    }

    pub fn invalidator(&self) -> &InvalidationRouter {
        &self.invalidator
    }

    pub fn payments(&self) -> &dyn PaymentGateway {
        self.payments.as_ref()
    }

    pub fn catalog(&self) -> &CatalogSettings {
        &self.catalog
    }

    /// Lifetime of cached search pages.
    pub fn search_ttl(&self) -> Duration {
        self.search_ttl
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}
