use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use qm_common::Price;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------        Role        ----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::User => write!(f, "User"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "User" => Ok(Self::User),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid role: {value}. But this conversion cannot fail. Defaulting to User");
            Role::User
        })
    }
}

//--------------------------------------   ProductCategory   ---------------------------------------------------------
/// The closed set of storefront categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ProductCategory {
    Appliances,
    Electronics,
    Furniture,
    #[sqlx(rename = "Home & Kitchen")]
    #[serde(rename = "Home & Kitchen")]
    HomeAndKitchen,
    Fitness,
    Fashion,
    #[sqlx(rename = "Home Automation")]
    #[serde(rename = "Home Automation")]
    HomeAutomation,
    Accessories,
    #[sqlx(rename = "Home & Storage")]
    #[serde(rename = "Home & Storage")]
    HomeAndStorage,
    #[sqlx(rename = "Home & Office")]
    #[serde(rename = "Home & Office")]
    HomeAndOffice,
}

impl Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Appliances => "Appliances",
            Self::Electronics => "Electronics",
            Self::Furniture => "Furniture",
            Self::HomeAndKitchen => "Home & Kitchen",
            Self::Fitness => "Fitness",
            Self::Fashion => "Fashion",
            Self::HomeAutomation => "Home Automation",
            Self::Accessories => "Accessories",
            Self::HomeAndStorage => "Home & Storage",
            Self::HomeAndOffice => "Home & Office",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ProductCategory {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Appliances" => Ok(Self::Appliances),
            "Electronics" => Ok(Self::Electronics),
            "Furniture" => Ok(Self::Furniture),
            "Home & Kitchen" => Ok(Self::HomeAndKitchen),
            "Fitness" => Ok(Self::Fitness),
            "Fashion" => Ok(Self::Fashion),
            "Home Automation" => Ok(Self::HomeAutomation),
            "Accessories" => Ok(Self::Accessories),
            "Home & Storage" => Ok(Self::HomeAndStorage),
            "Home & Office" => Ok(Self::HomeAndOffice),
            s => Err(ConversionError(format!("Please select a valid category: {s}"))),
        }
    }
}

//--------------------------------------        User        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new user record, ready for insertion. The password has already been hashed by the time this exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    pub fn new<S: Into<String>>(first_name: S, last_name: S, email: S, password_hash: S) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into().trim().to_lowercase(),
            password_hash: password_hash.into(),
            role: Role::User,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

/// A user record together with its password hash. Only the auth flow ever sees this.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

//--------------------------------------       Product      ----------------------------------------------------------
pub const DEFAULT_PRODUCT_IMAGE: &str = "/img/products/default.jpg";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub category: ProductCategory,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    pub category: ProductCategory,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<ProductCategory>,
    pub image: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image.is_none()
    }
}

//--------------------------------------      CartItem      ----------------------------------------------------------
/// A client-submitted cart entry. Deliberately carries no price: unit prices are always re-derived from the
/// catalog, both when building a checkout session and again when reconciling the completed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: u32,
}

//--------------------------------------        Order       ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// The payment processor's session id. Unique: this is the idempotency key that suppresses duplicate
    /// webhook deliveries at the storage layer.
    pub payment_session_id: String,
    pub user_id: i64,
    pub total_price: Price,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// `None` once the referenced product has been removed from the catalog.
    pub product_id: Option<i64>,
    pub quantity: i64,
    /// The catalog price captured at reconciliation time.
    pub unit_price: Price,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub payment_session_id: String,
    pub user_id: i64,
    pub total_price: Price,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: Price,
}
