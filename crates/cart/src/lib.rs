//! Cart domain module.
//!
//! This crate contains the cart snapshot and its transitions, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage). Every transition
//! returns a new snapshot and leaves its input untouched.

pub mod cart;
pub mod entry;
pub mod product;
pub mod stock;

pub use cart::Cart;
pub use entry::{CartEntry, Quantity};
pub use product::Product;
pub use stock::{OutOfStock, StockLevel};
