//! Best-effort totals from a possibly incomplete extracted receipt.
//!
//! Reconciliation never rewrites what was extracted. Disagreements between the
//! components, the item lines and the printed total are reported as advisory
//! issues and left for the user to resolve.

use chrono::{DateTime, Utc};

use crate::{
    model::{Item, ItemId, Receipt},
    money::{Money, parse_to_cents},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedItem {
    pub label: String,
    pub quantity: u32,
    /// Line total with the quantity already applied.
    pub cents: Money,
}

/// Fast first-phase result: enough to start splitting equally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiptHeadline {
    pub merchant: Option<String>,
    pub total: Option<Money>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedReceipt {
    pub merchant: Option<String>,
    pub subtotal: Option<Money>,
    pub tax: Option<Money>,
    pub fees: Option<Money>,
    pub tip: Option<Money>,
    pub discount: Option<Money>,
    pub total: Option<Money>,
    pub items: Vec<ExtractedItem>,
    pub issues: Vec<String>,
}

impl ExtractedReceipt {
    pub fn headline(&self) -> ReceiptHeadline {
        ReceiptHeadline {
            merchant: self.merchant.clone(),
            total: self.total,
        }
    }

    fn net_extras(&self) -> i64 {
        let component = |value: Option<Money>| value.unwrap_or_default().cents();
        component(self.tax)
            .saturating_add(component(self.fees))
            .saturating_add(component(self.tip))
            .saturating_sub(component(self.discount))
    }

    fn has_components(&self) -> bool {
        [self.subtotal, self.tax, self.fees, self.tip, self.discount]
            .iter()
            .any(Option::is_some)
    }

    fn component_total(&self) -> Money {
        let subtotal = self.subtotal.unwrap_or_default().cents();
        Money::from_cents(subtotal.saturating_add(self.net_extras())).floor_zero()
    }

    /// The printed total when there is one, otherwise the components summed
    /// with missing ones counted as zero.
    pub fn best_total(&self) -> Money {
        match self.total {
            Some(total) => total.floor_zero(),
            None => self.component_total(),
        }
    }

    /// The printed subtotal when there is one, otherwise backed out of
    /// [`ExtractedReceipt::best_total`].
    pub fn best_subtotal(&self) -> Money {
        match self.subtotal {
            Some(subtotal) => subtotal.floor_zero(),
            None => Money::from_cents(self.best_total().cents().saturating_sub(self.net_extras()))
                .floor_zero(),
        }
    }

    pub fn item_sum(&self) -> Money {
        self.items.iter().map(|item| item.cents).sum()
    }

    /// Extractor-reported issues followed by reconciliation advisories.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = self.issues.clone();

        if self.total.is_none() && !self.has_components() {
            issues.push("No total or price breakdown was found on the receipt".to_owned());
        }

        if !self.items.is_empty() {
            let item_sum = self.item_sum();
            let subtotal = self.best_subtotal();
            if item_sum != subtotal {
                issues.push(format!(
                    "Item prices add up to {item_sum}, but the subtotal is {subtotal}"
                ));
            }
        }

        if let Some(total) = self.total.filter(|_| self.has_components()) {
            let components = self.component_total();
            if components != total {
                issues.push(format!(
                    "Subtotal and charges add up to {components}, but the total is {total}"
                ));
            }
        }

        issues
    }

    /// Converts the extraction into an editable receipt with unassigned items.
    pub fn into_receipt(self, title_fallback: &str, created_at: DateTime<Utc>) -> Receipt {
        let subtotal = self.best_subtotal();
        let total = self.best_total();
        let title = self
            .merchant
            .as_deref()
            .map(str::trim)
            .filter(|merchant| !merchant.is_empty())
            .unwrap_or(title_fallback)
            .to_owned();

        let mut receipt = Receipt::new(title, created_at);
        receipt.subtotal = subtotal;
        receipt.tax = self.tax.unwrap_or_default().floor_zero();
        receipt.fees = self.fees.unwrap_or_default().floor_zero();
        receipt.tip = self.tip.unwrap_or_default().floor_zero();
        receipt.discount = self.discount.unwrap_or_default().floor_zero();
        receipt.total = total;
        receipt.items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                let label = if item.quantity > 1 {
                    format!("{} × {}", item.quantity, item.label.trim())
                } else {
                    item.label.trim().to_owned()
                };
                Item::new(ItemId(idx as u64 + 1), label, Some(item.cents.floor_zero()))
            })
            .collect();
        receipt
    }
}

/// Receipt fields as typed into the manual entry form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualEntry {
    pub title: String,
    pub subtotal: String,
    pub tax: String,
    pub fees: String,
    pub tip: String,
    pub discount: String,
    pub total: String,
}

impl ManualEntry {
    /// Blank fields count as absent; a blank total is derived from the rest.
    pub fn into_receipt(self, title_fallback: &str, created_at: DateTime<Utc>) -> Receipt {
        let field = |text: &str| {
            if text.trim().is_empty() {
                None
            } else {
                Some(parse_to_cents(text))
            }
        };

        let extracted = ExtractedReceipt {
            merchant: Some(self.title),
            subtotal: field(&self.subtotal),
            tax: field(&self.tax),
            fees: field(&self.fees),
            tip: field(&self.tip),
            discount: field(&self.discount),
            total: field(&self.total),
            items: Vec::new(),
            issues: Vec::new(),
        };
        extracted.into_receipt(title_fallback, created_at)
    }
}
