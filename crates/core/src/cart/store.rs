//! Cart Store

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tokio::sync::broadcast;

use crate::{
    cart::{Cart, CartError, CartEvent, CartItem},
    products::{Product, ProductUuid},
};

/// Key the serialized cart lives under.
pub const CART_STORAGE_KEY: &str = "cart";

/// Capacity of the change-notification channel. Slow observers that fall
/// further behind than this only miss intermediate counts; the next event or a
/// re-read brings them up to date.
const EVENT_CAPACITY: usize = 64;

/// Client-local key-value persistence.
pub trait CartStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, CartError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the store cannot be written.
    fn save(&self, key: &str, value: String) -> Result<(), CartError>;

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), CartError>;
}

/// In-process key-value store.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryCartStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> CartError {
    CartError::Storage("storage lock poisoned".to_string())
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartError> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn save(&self, key: &str, value: String) -> Result<(), CartError> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value);

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CartError> {
        self.entries.lock().map_err(poisoned)?.remove(key);

        Ok(())
    }
}

/// Session cart persisted under [`CART_STORAGE_KEY`], broadcasting a
/// [`CartEvent`] to every subscriber before each mutation returns.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    events: broadcast::Sender<CartEvent>,
    write_lock: Mutex<()>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            storage,
            events,
            write_lock: Mutex::new(()),
        }
    }

    /// Receive a [`CartEvent`] after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Current cart contents.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Corrupt`] when the stored payload cannot be decoded
    /// or holds an empty or repeated line, or [`CartError::Storage`] when the
    /// store fails.
    pub fn cart(&self) -> Result<Cart, CartError> {
        match self.storage.load(CART_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(CartError::Corrupt),
            None => Ok(Cart::new()),
        }
    }

    /// Current lines.
    ///
    /// # Errors
    ///
    /// See [`CartStore::cart`].
    pub fn list(&self) -> Result<Vec<CartItem>, CartError> {
        Ok(self.cart()?.items().to_vec())
    }

    /// Total units in the cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::cart`].
    pub fn item_count(&self) -> Result<u32, CartError> {
        Ok(self.cart()?.item_count())
    }

    /// Add `quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Propagates [`Cart::add`] and storage errors.
    pub fn add(&self, product: &Product, quantity: u32) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.add(product, quantity))
    }

    /// Set a line's quantity, clamping below 1.
    ///
    /// # Errors
    ///
    /// Propagates [`Cart::set_quantity`] and storage errors.
    pub fn set_quantity(&self, product: ProductUuid, quantity: u32) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.set_quantity(product, quantity))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Propagates [`Cart::remove`] and storage errors.
    pub fn remove(&self, product: ProductUuid) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.remove(product).map(drop))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the store fails.
    pub fn clear(&self) -> Result<(), CartError> {
        let _guard = self.write_lock.lock().map_err(poisoned)?;

        self.storage.remove(CART_STORAGE_KEY)?;
        self.publish(CartEvent::Cleared);

        Ok(())
    }

    fn mutate<F>(&self, apply: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let _guard = self.write_lock.lock().map_err(poisoned)?;

        let mut cart = self.cart()?;

        apply(&mut cart)?;

        let raw = serde_json::to_string(&cart).map_err(CartError::Encode)?;

        self.storage.save(CART_STORAGE_KEY, raw)?;
        self.publish(CartEvent::for_cart(&cart));

        Ok(cart)
    }

    fn publish(&self, event: CartEvent) {
        // Nobody listening is fine: no badge is on screen.
        let _delivered = self.events.send(event);
    }
}
