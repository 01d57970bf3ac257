//! Observable catalog + cart container.
//!
//! [`ShopStore`] owns the Catalog View, the Cart and the checkout state, and is
//! the only place they change. State lives inside a `tokio::sync::watch`
//! channel: every mutation is one atomic `send_if_modified` step, and
//! subscribers are only woken when the state really changed. Requests that
//! hit a stock ceiling leave the state untouched and wake nobody.
//!
//! The only suspending operations are the two Shop Service calls. No lock is
//! held across them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stockcart_core::{Cart, CartItem, Catalog, CheckoutState, Price};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::{CheckoutError, FetchError};
use crate::service::ShopService;

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub catalog: Catalog,
    pub cart: Cart,
    pub checkout: CheckoutState,
}

impl StoreState {
    /// Units of `code` that can still be added; zero for unknown products.
    #[must_use]
    pub fn available_stock(&self, code: &str) -> u32 {
        self.catalog
            .find(code)
            .map_or(0, |product| self.cart.available_stock(product))
    }
}

/// Result of a checkout attempt that did not fail.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The cart was empty; nothing was submitted.
    EmptyCart,
    /// The service accepted the sale.
    Completed(CheckoutReceipt),
}

/// Details of an accepted sale.
#[derive(Debug)]
pub struct CheckoutReceipt {
    /// Lines as submitted.
    pub lines: Vec<CartItem>,
    /// Sum of the submitted lines.
    pub total: Price,
    /// When the submission started.
    pub submitted_at: DateTime<Utc>,
    /// Catalog refresh started after the sale. The cart is already empty
    /// whether or not this succeeds.
    pub refresh: JoinHandle<Result<(), FetchError>>,
}

/// Observable state container over a [`ShopService`].
///
/// Cheaply cloneable via `Arc`; clones share state.
pub struct ShopStore<S> {
    inner: Arc<ShopStoreInner<S>>,
}

struct ShopStoreInner<S> {
    service: S,
    state: watch::Sender<StoreState>,
}

impl<S> Clone for ShopStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ShopService> ShopStore<S> {
    /// Create a store with an empty catalog and cart.
    ///
    /// Call [`ShopStore::refresh_catalog`] to perform the initial load.
    #[must_use]
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(ShopStoreInner { service, state }),
        }
    }

    /// The underlying Shop Service.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.inner.service
    }

    // =========================================================================
    // Read Models
    // =========================================================================

    /// Receive a notification whenever the state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    /// Copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.inner.state.borrow().catalog.clone()
    }

    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().cart.clone()
    }

    #[must_use]
    pub fn checkout_state(&self) -> CheckoutState {
        self.inner.state.borrow().checkout
    }

    #[must_use]
    pub fn quantity_in_cart(&self, code: &str) -> u32 {
        self.inner.state.borrow().cart.quantity_of(code)
    }

    /// `remain - quantity in cart` for `code`.
    #[must_use]
    pub fn available_stock(&self, code: &str) -> u32 {
        self.inner.state.borrow().available_stock(code)
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.inner.state.borrow().cart.total()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replace the catalog with the service's current product list.
    ///
    /// On failure the previous catalog stays in place.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the service call fails or returns an invalid
    /// product list.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&self) -> Result<(), FetchError> {
        let products = self.inner.service.get_products().await.map_err(|e| {
            warn!(error = %e, "Catalog refresh failed, keeping previous catalog");
            e
        })?;

        let catalog = Catalog::try_from_products(products).map_err(|e| {
            warn!(error = %e, "Rejected malformed catalog");
            FetchError::from(e)
        })?;

        let count = catalog.len();
        self.inner.state.send_if_modified(|state| {
            if state.catalog == catalog {
                return false;
            }
            state.catalog = catalog;
            true
        });

        info!(products = count, "Catalog refreshed");
        Ok(())
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Add one unit of the catalog product `code`.
    ///
    /// Returns `false` (and changes nothing) when the product is unknown,
    /// sold out, or already at its ceiling in the cart.
    pub fn add_to_cart(&self, code: &str) -> bool {
        let changed = self.mutate(|state| {
            let StoreState { catalog, cart, .. } = state;
            catalog.find(code).is_some_and(|product| cart.add(product))
        });
        debug!(code, changed, "add_to_cart");
        changed
    }

    /// Change the quantity of the line for `code` by `delta`.
    ///
    /// A quantity above the catalog ceiling is rejected; zero or below
    /// removes the line.
    pub fn update_quantity(&self, code: &str, delta: i64) -> bool {
        let changed = self.mutate(|state| {
            let StoreState { catalog, cart, .. } = state;
            cart.update_quantity(code, delta, catalog)
        });
        debug!(code, delta, changed, "update_quantity");
        changed
    }

    /// Remove the line for `code`.
    pub fn remove_item(&self, code: &str) -> bool {
        let changed = self.mutate(|state| state.cart.remove(code));
        debug!(code, changed, "remove_item");
        changed
    }

    /// Empty the cart if `confirm` approves.
    ///
    /// `confirm` is the caller's yes/no prompt. It is not asked when the cart
    /// is already empty and runs without any store lock held.
    pub fn clear_cart(&self, confirm: impl FnOnce() -> bool) -> bool {
        if self.inner.state.borrow().cart.is_empty() {
            return false;
        }
        if !confirm() {
            debug!("clear_cart declined");
            return false;
        }
        let changed = self.mutate(|state| state.cart.clear());
        debug!(changed, "clear_cart");
        changed
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submit the cart to the Shop Service.
    ///
    /// - Empty cart: returns [`CheckoutOutcome::EmptyCart`] without calling
    ///   the service.
    /// - Success: the cart is cleared immediately, a catalog refresh is
    ///   spawned, and the receipt carries its handle.
    /// - Failure: the cart is left exactly as it was.
    ///
    /// The state passes through `Submitting` and `Succeeded`/`Failed` and is
    /// back at `Idle` when this returns.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InProgress` if another submission is pending,
    /// or the service's error if it refused the sale.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<CheckoutOutcome, CheckoutError> {
        let mut in_progress = false;
        let mut submitted: Option<Cart> = None;
        self.inner.state.send_if_modified(|state| {
            if state.checkout.is_submitting() {
                in_progress = true;
                return false;
            }
            if state.cart.is_empty() {
                return false;
            }
            submitted = Some(state.cart.clone());
            state.checkout = CheckoutState::Submitting;
            true
        });

        if in_progress {
            warn!("Checkout requested while another is in flight");
            return Err(CheckoutError::InProgress);
        }
        let Some(cart) = submitted else {
            debug!("Cart is empty, nothing to submit");
            return Ok(CheckoutOutcome::EmptyCart);
        };

        let submitted_at = Utc::now();
        let total = cart.total();
        info!(lines = cart.len(), total = total.minor(), "Submitting checkout");

        match self.inner.service.checkout(cart.items()).await {
            Ok(()) => {
                self.inner.state.send_modify(|state| {
                    state.cart.clear();
                    state.checkout = CheckoutState::Succeeded;
                });
                info!("Checkout succeeded");

                let store = self.clone();
                let refresh = tokio::spawn(async move { store.refresh_catalog().await });

                self.set_checkout_state(CheckoutState::Idle);
                Ok(CheckoutOutcome::Completed(CheckoutReceipt {
                    lines: cart.items().to_vec(),
                    total,
                    submitted_at,
                    refresh,
                }))
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed, cart retained");
                self.set_checkout_state(CheckoutState::Failed);
                self.set_checkout_state(CheckoutState::Idle);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Apply `f` atomically; subscribers are woken only if it returns `true`.
    fn mutate(&self, f: impl FnOnce(&mut StoreState) -> bool) -> bool {
        self.inner.state.send_if_modified(f)
    }

    fn set_checkout_state(&self, next: CheckoutState) {
        self.mutate(|state| {
            if state.checkout == next {
                return false;
            }
            state.checkout = next;
            true
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use stockcart_core::{Product, ProductCode};
    use tokio::sync::Notify;

    use super::*;

    /// Shop Service whose answers are scripted per test.
    #[derive(Default)]
    struct ScriptedShop {
        products: Mutex<Vec<Product>>,
        fail_fetch: AtomicBool,
        hold_fetch: AtomicBool,
        fetch_release: Notify,
        reject_with: Mutex<Option<String>>,
        hold_checkout: AtomicBool,
        checkout_release: Notify,
        fetches: AtomicUsize,
        submitted: Mutex<Vec<Vec<CartItem>>>,
    }

    impl ScriptedShop {
        fn with_products(products: Vec<Product>) -> Arc<Self> {
            let shop = Self::default();
            *shop.products.lock().unwrap() = products;
            Arc::new(shop)
        }

        fn set_products(&self, products: Vec<Product>) {
            *self.products.lock().unwrap() = products;
        }

        fn submissions(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
    }

    impl ShopService for ScriptedShop {
        async fn get_products(&self) -> Result<Vec<Product>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.hold_fetch.load(Ordering::SeqCst) {
                self.fetch_release.notified().await;
            }
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(FetchError::RateLimited(5));
            }
            let products = self.products.lock().unwrap().clone();
            Ok(products)
        }

        async fn checkout(&self, items: &[CartItem]) -> Result<(), CheckoutError> {
            self.submitted.lock().unwrap().push(items.to_vec());
            if self.hold_checkout.load(Ordering::SeqCst) {
                self.checkout_release.notified().await;
            }
            let rejection = self.reject_with.lock().unwrap().clone();
            match rejection {
                Some(message) => Err(CheckoutError::Rejected(message)),
                None => Ok(()),
            }
        }
    }

    fn product(code: &str, price: i64, remain: u32) -> Product {
        Product::new(code, format!("Product {code}"), Price::from_minor(price), remain)
    }

    async fn loaded_store(
        products: Vec<Product>,
    ) -> (ShopStore<Arc<ScriptedShop>>, Arc<ScriptedShop>) {
        let shop = ScriptedShop::with_products(products);
        let store = ShopStore::new(Arc::clone(&shop));
        store.refresh_catalog().await.unwrap();
        (store, shop)
    }

    #[tokio::test]
    async fn test_refresh_replaces_catalog() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;
        assert_eq!(store.catalog().len(), 1);

        shop.set_products(vec![product("B", 5, 1), product("C", 5, 1)]);
        store.refresh_catalog().await.unwrap();

        let catalog = store.catalog();
        assert!(catalog.find("A").is_none());
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;
        shop.fail_fetch.store(true, Ordering::SeqCst);

        let result = store.refresh_catalog().await;

        assert!(matches!(result, Err(FetchError::RateLimited(5))));
        assert_eq!(store.catalog().remain_of("A"), 2);
    }

    #[tokio::test]
    async fn test_malformed_catalog_rejected() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;
        shop.set_products(vec![product("X", 1, 1), product("X", 2, 2)]);

        let result = store.refresh_catalog().await;

        assert!(matches!(result, Err(FetchError::Malformed(_))));
        assert_eq!(store.catalog().remain_of("A"), 2);
    }

    #[tokio::test]
    async fn test_add_resolves_product_from_catalog() {
        let (store, _shop) = loaded_store(vec![product("A", 10, 2)]).await;

        assert!(store.add_to_cart("A"));
        assert!(store.add_to_cart("A"));
        assert!(!store.add_to_cart("A"));
        assert!(!store.add_to_cart("UNKNOWN"));

        assert_eq!(store.quantity_in_cart("A"), 2);
        assert_eq!(store.available_stock("A"), 0);
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_notify() {
        let (store, _shop) = loaded_store(vec![product("A", 10, 1)]).await;
        store.add_to_cart("A");

        let mut rx = store.subscribe();
        rx.mark_unchanged();

        assert!(!store.add_to_cart("A"));
        assert!(!store.update_quantity("A", 1));
        assert!(!store.remove_item("B"));
        assert!(!rx.has_changed().unwrap());

        assert!(store.update_quantity("A", -1));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear_cart_requires_confirmation() {
        let (store, _shop) = loaded_store(vec![product("A", 10, 3)]).await;
        store.add_to_cart("A");

        assert!(!store.clear_cart(|| false));
        assert_eq!(store.cart().len(), 1);

        assert!(store.clear_cart(|| true));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_cart_total() {
        let (store, _shop) = loaded_store(vec![product("A", 33, 5), product("B", 250, 5)]).await;
        store.add_to_cart("A");
        store.update_quantity("A", 2);
        store.add_to_cart("B");

        assert_eq!(store.cart_total(), Price::from_minor(99 + 250));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_noop() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;

        let outcome = store.checkout().await.unwrap();

        assert!(matches!(outcome, CheckoutOutcome::EmptyCart));
        assert_eq!(shop.submissions(), 0);
        assert_eq!(store.checkout_state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart_before_refresh_completes() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;
        store.add_to_cart("A");
        store.add_to_cart("A");

        shop.hold_fetch.store(true, Ordering::SeqCst);
        shop.set_products(vec![product("A", 10, 0)]);

        let outcome = store.checkout().await.unwrap();
        let CheckoutOutcome::Completed(receipt) = outcome else {
            panic!("expected a completed checkout");
        };

        assert!(store.cart().is_empty());
        assert_eq!(store.checkout_state(), CheckoutState::Idle);
        assert_eq!(receipt.total, Price::from_minor(20));
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(store.catalog().remain_of("A"), 2, "refresh still pending");

        shop.fetch_release.notify_one();
        receipt.refresh.await.unwrap().unwrap();
        assert_eq!(store.catalog().remain_of("A"), 0);
    }

    #[tokio::test]
    async fn test_checkout_success_survives_failed_refresh() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;
        store.add_to_cart("A");
        shop.fail_fetch.store(true, Ordering::SeqCst);

        let CheckoutOutcome::Completed(receipt) = store.checkout().await.unwrap() else {
            panic!("expected a completed checkout");
        };

        assert!(receipt.refresh.await.unwrap().is_err());
        assert!(store.cart().is_empty());
        assert_eq!(store.catalog().remain_of("A"), 2);
    }

    #[tokio::test]
    async fn test_checkout_failure_keeps_cart() {
        let (store, shop) = loaded_store(vec![product("A", 10, 3), product("B", 7, 3)]).await;
        store.add_to_cart("A");
        store.add_to_cart("B");
        store.update_quantity("B", 1);
        let before = store.cart();

        *shop.reject_with.lock().unwrap() = Some("insufficient stock for B".to_string());
        let err = store.checkout().await.unwrap_err();

        assert!(matches!(err, CheckoutError::Rejected(ref m) if m == "insufficient stock for B"));
        assert_eq!(store.cart(), before);
        assert_eq!(store.checkout_state(), CheckoutState::Idle);
        assert_eq!(shop.fetches.load(Ordering::SeqCst), 1, "no refresh after failure");
    }

    #[tokio::test]
    async fn test_second_checkout_while_submitting_is_refused() {
        let (store, shop) = loaded_store(vec![product("A", 10, 2)]).await;
        store.add_to_cart("A");
        shop.hold_checkout.store(true, Ordering::SeqCst);

        let mut rx = store.subscribe();
        let first = tokio::spawn({
            let store = store.clone();
            async move { store.checkout().await }
        });
        rx.wait_for(|state| state.checkout.is_submitting()).await.unwrap();

        let second = store.checkout().await;
        assert!(matches!(second, Err(CheckoutError::InProgress)));
        assert_eq!(shop.submissions(), 1);

        shop.checkout_release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_submitted_snapshot_matches_cart() {
        let (store, shop) = loaded_store(vec![product("A", 10, 5)]).await;
        store.add_to_cart("A");
        store.update_quantity("A", 2);

        store.checkout().await.unwrap();

        let submitted = shop.submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        let lines = submitted.first().unwrap();
        assert_eq!(lines.first().map(|l| l.code.clone()), Some(ProductCode::from("A")));
        assert_eq!(lines.first().map(|l| l.quantity), Some(3));
    }

    #[tokio::test]
    async fn test_checkout_rejected_when_stock_sold_elsewhere() {
        let shop = crate::MemoryShop::new(vec![product("A", 10, 2)]).unwrap();
        let store = ShopStore::new(shop);
        store.refresh_catalog().await.unwrap();
        assert!(store.add_to_cart("A"));
        assert!(store.add_to_cart("A"));
        let before = store.cart();

        // Another register sells one unit; the local catalog is now stale
        assert!(store.service().set_remain("A", 1));

        let err = store.checkout().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Rejected(ref m) if m.contains("insufficient stock for A")));
        assert_eq!(store.cart(), before);
        assert_eq!(store.checkout_state(), CheckoutState::Idle);
        assert_eq!(store.service().remain_of("A"), Some(1));
    }
}
