//! Product browsing: filtering, sorting and related-item lookup over an
//! in-memory menu snapshot.

use super::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

const SIMILAR_ITEMS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub category: String,
    pub title: String,
    pub brand: String,
    /// Free-form strain label, e.g. `"Indica"` or `"Hybrid I/S"`.
    #[serde(default)]
    pub strain_type: Option<String>,
    /// Potency label such as `"23.5% THC"`.
    #[serde(default)]
    pub thc: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    /// Monotonic POS identifier, higher is newer.
    #[serde(default)]
    pub pos_product_id: u64,
}

impl Product {
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }

    /// THC percentage parsed from the potency label; zero when absent or
    /// unparseable.
    pub fn thc_percent(&self) -> Decimal {
        self.thc
            .as_deref()
            .map(|label| label.replace("% THC", "").replace('%', ""))
            .and_then(|number| number.trim().parse::<Decimal>().ok())
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    Recent,
    Price,
    Thc,
    Alphabetical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortMethod {
    pub criterion: SortCriterion,
    pub direction: SortDirection,
}

impl Default for SortMethod {
    fn default() -> Self {
        Self {
            criterion: SortCriterion::Recent,
            direction: SortDirection::Desc,
        }
    }
}

/// Shopper-selected menu filters. Empty lists match everything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductFilters {
    /// Upper-case strain tokens, e.g. `INDICA`, `I/S`.
    pub strains: Vec<String>,
    pub brands: Vec<String>,
    pub weights: Vec<String>,
    pub sort_method: SortMethod,
}

impl ProductFilters {
    fn matches(&self, product: &Product) -> bool {
        let brand_ok = self.brands.is_empty() || self.brands.contains(&product.brand);

        let strain_ok = match product.strain_type.as_deref() {
            None | Some("") => true,
            Some(_) if self.strains.is_empty() => true,
            Some(strain) => {
                let upper = strain.to_uppercase();
                upper
                    .split_whitespace()
                    .any(|token| self.strains.iter().any(|s| s == token))
            }
        };

        let weight_ok = match product.weight.as_deref() {
            None | Some("") => true,
            Some(_) if self.weights.is_empty() => true,
            Some(weight) => self.weights.iter().any(|w| w == weight),
        };

        brand_ok && strain_ok && weight_ok
    }
}

fn compare(a: &Product, b: &Product, criterion: SortCriterion) -> Ordering {
    match criterion {
        SortCriterion::Recent => a.pos_product_id.cmp(&b.pos_product_id),
        SortCriterion::Price => a.effective_price().cmp(&b.effective_price()),
        SortCriterion::Thc => a.thc_percent().cmp(&b.thc_percent()),
        SortCriterion::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// Applies search, category and shopper filters, then the chosen sort.
///
/// A non-blank `search` matches titles case-insensitively across all
/// categories; otherwise only products in `category` are kept.
pub fn filter_products<'a>(
    products: &'a [Product],
    filters: &ProductFilters,
    category: &str,
    search: &str,
) -> Vec<&'a Product> {
    let query = search.trim().to_lowercase();

    let mut matching: Vec<&Product> = products
        .iter()
        .filter(|p| {
            if query.is_empty() {
                p.category == category
            } else {
                p.title.to_lowercase().contains(&query)
            }
        })
        .filter(|p| filters.matches(p))
        .collect();

    let SortMethod { criterion, direction } = filters.sort_method;
    matching.sort_by(|a, b| match direction {
        SortDirection::Asc => compare(a, b, criterion),
        SortDirection::Desc => compare(b, a, criterion),
    });
    matching
}

/// A selectable filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOptions {
    pub brands: Vec<FilterOption>,
    pub weights: Vec<FilterOption>,
}

/// Distinct brands and weights offered in `category`.
pub fn filter_options(products: &[Product], category: &str) -> FilterOptions {
    let mut brands = BTreeSet::new();
    let mut weights = BTreeSet::new();

    for product in products.iter().filter(|p| p.category == category) {
        if !product.brand.is_empty() {
            brands.insert(product.brand.clone());
        }
        if let Some(weight) = product.weight.as_ref().filter(|w| !w.is_empty()) {
            weights.insert(weight.clone());
        }
    }

    let to_options = |values: BTreeSet<String>| -> Vec<FilterOption> {
        values
            .into_iter()
            .map(|v| FilterOption {
                label: v.clone(),
                value: v,
            })
            .collect()
    };

    FilterOptions {
        brands: to_options(brands),
        weights: to_options(weights),
    }
}

/// Up to five other products from the same brand and category.
pub fn similar_items<'a>(products: &'a [Product], current: &Product) -> Vec<&'a Product> {
    if current.category.is_empty() || current.brand.is_empty() {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| p.category == current.category && p.brand == current.brand && p.id != current.id)
        .take(SIMILAR_ITEMS_LIMIT)
        .collect()
}

/// Menu order as fetched: products without a title dropped, A to Z.
pub fn sorted_by_title(mut products: Vec<Product>) -> Vec<Product> {
    products.retain(|p| !p.title.trim().is_empty());
    products.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    products
}
