use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cartkit_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

use crate::product::Product;

/// Requested quantity of a cart entry. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        Ok(Self(value))
    }

    /// Convert a signed UI amount. Zero, negative and out-of-range values fail.
    pub fn from_signed(value: i64) -> DomainResult<Self> {
        let value = u32::try_from(value)
            .map_err(|_| DomainError::validation(format!("quantity {value} is out of range")))?;
        Self::new(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn incremented(self) -> DomainResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))
    }
}

impl ValueObject for Quantity {}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One line of the cart: a product plus its requested amount.
///
/// Serialized flat as `{ "id": .., <product fields>.., "amount": .. }`; the
/// field names `id` and `amount` are stable across versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    id: ProductId,
    #[serde(flatten)]
    attributes: Map<String, Value>,
    amount: Quantity,
}

impl CartEntry {
    /// Build an entry from catalog details. Attributes that would shadow the
    /// stable `id`/`amount` fields are dropped.
    pub fn from_product(product: Product, amount: Quantity) -> Self {
        let Product { id, mut attributes } = product;
        attributes.remove("id");
        attributes.remove("amount");
        Self {
            id,
            attributes,
            amount,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.id
    }

    pub fn amount(&self) -> Quantity {
        self.amount
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }

    /// Same entry with a different amount.
    pub fn with_amount(&self, amount: Quantity) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

impl Entity for CartEntry {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
