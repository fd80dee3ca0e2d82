use std::fmt::Display;

use qm_common::Price;
use serde::{Deserialize, Serialize};

use crate::db_types::ProductCategory;

pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Filter and pagination criteria for catalog reads. Every field is optional; an empty filter returns the
/// first page of the whole catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQueryFilter {
    pub category: Option<ProductCategory>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    /// Substring match against the product name.
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.name.is_none()
    }

    pub fn with_category(mut self, category: ProductCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

impl Display for ProductQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut criteria = vec![];
        if let Some(c) = &self.category {
            criteria.push(format!("category={c}"));
        }
        if let Some(p) = &self.min_price {
            criteria.push(format!("min_price={p}"));
        }
        if let Some(p) = &self.max_price {
            criteria.push(format!("max_price={p}"));
        }
        if let Some(n) = &self.name {
            criteria.push(format!("name~{n}"));
        }
        if let Some(l) = &self.limit {
            criteria.push(format!("limit={l}"));
        }
        if let Some(o) = &self.offset {
            criteria.push(format!("offset={o}"));
        }
        write!(f, "{}", criteria.join(","))
    }
}
