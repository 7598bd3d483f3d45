//! Cart
//!
//! The customer's cart as held by the storefront. Unit prices are snapshotted when an
//! item is added and never recomputed afterwards.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    ids::{CategoryUuid, ProductUuid},
    pricing::{self, PricingError},
};

/// Errors raised while editing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Items must be added with a quantity of at least one.
    #[error("quantity must be at least one")]
    ZeroQuantity,

    /// Item price is not in the cart's currency.
    #[error("item currency {item} does not match cart currency {cart}")]
    CurrencyMismatch {
        /// Cart currency code
        cart: &'static str,

        /// Item currency code
        item: &'static str,
    },

    /// Quantity overflowed while merging items.
    #[error("quantity overflowed")]
    QuantityOverflow,
}

/// A line of the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    /// Product identifier
    pub product: ProductUuid,

    /// Category the product belongs to
    pub category: CategoryUuid,

    /// Product name at add time
    pub name: String,

    /// Variety name, e.g. "500g"
    pub variety: String,

    /// Discount-adjusted unit price at add time
    pub unit_price: Money<'a, Currency>,

    /// Quantity, at least one
    pub quantity: u32,
}

impl<'a> CartItem<'a> {
    /// `unit_price * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        pricing::line_total(self.unit_price, self.quantity)
    }

    fn is_same_line(&self, product: ProductUuid, variety: &str) -> bool {
        self.product == product && self.variety == variety
    }
}

/// A product and its category, one per cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    /// Product identifier
    pub product: ProductUuid,

    /// Category identifier
    pub category: CategoryUuid,
}

/// A cart of items in a single currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart<'a> {
    currency: &'a Currency,
    items: Vec<CartItem<'a>>,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
        }
    }

    /// Build a cart from existing items, merging duplicate lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if any item is invalid.
    pub fn with_items(
        currency: &'a Currency,
        items: impl IntoIterator<Item = CartItem<'a>>,
    ) -> Result<Self, CartError> {
        let mut cart = Self::new(currency);

        for item in items {
            cart.add(item)?;
        }

        Ok(cart)
    }

    /// Cart currency
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Cart items in insertion order
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Whether the cart has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item. Adding the same product and variety again increases its quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] for a zero quantity, a foreign currency or quantity overflow.
    pub fn add(&mut self, item: CartItem<'a>) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if item.unit_price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch {
                cart: self.currency.iso_alpha_code,
                item: item.unit_price.currency().iso_alpha_code,
            });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.is_same_line(item.product, &item.variety))
        {
            existing.quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or(CartError::QuantityOverflow)?;

            return Ok(());
        }

        self.items.push(item);

        Ok(())
    }

    /// Set the quantity of a line. A quantity of zero removes it.
    ///
    /// Returns `false` if no such line exists.
    pub fn update_quantity(&mut self, product: ProductUuid, variety: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product, variety);
        }

        match self
            .items
            .iter_mut()
            .find(|item| item.is_same_line(product, variety))
        {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `false` if no such line exists.
    pub fn remove(&mut self, product: ProductUuid, variety: &str) -> bool {
        let before = self.items.len();

        self.items.retain(|item| !item.is_same_line(product, variety));

        self.items.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.items
            .iter()
            .try_fold(pricing::zero(self.currency), |acc, item| {
                Ok(acc.add(item.line_total()?)?)
            })
    }

    /// Product/category pairs, one per line.
    pub fn lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .map(|item| CartLine {
                product: item.product,
                category: item.category,
            })
            .collect()
    }
}
