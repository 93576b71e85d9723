//! Shapes the vision model is asked to return.
//!
//! Every field is optional and amounts may arrive as numbers or as strings
//! with currency symbols, so decoding only fails on text that is not JSON.

use billsplit_domain::{ExtractedItem, ExtractedReceipt, Money, ReceiptHeadline, parse_to_cents};
use serde::Deserialize;
use serde_json::{Number, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HeadlineDto {
    #[serde(alias = "store", alias = "vendor")]
    pub merchant: Option<String>,
    #[serde(alias = "grand_total")]
    pub total: Option<Value>,
}

impl HeadlineDto {
    pub fn into_headline(self) -> ReceiptHeadline {
        ReceiptHeadline {
            merchant: clean_text(self.merchant),
            total: self.total.as_ref().and_then(amount),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemDto {
    #[serde(alias = "label", alias = "description")]
    pub name: Option<String>,
    #[serde(alias = "qty")]
    pub quantity: Option<Value>,
    /// Line total.
    #[serde(alias = "amount", alias = "line_total")]
    pub price: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetailsDto {
    #[serde(alias = "store", alias = "vendor")]
    pub merchant: Option<String>,
    pub subtotal: Option<Value>,
    pub tax: Option<Value>,
    #[serde(alias = "service_charge")]
    pub fees: Option<Value>,
    #[serde(alias = "gratuity")]
    pub tip: Option<Value>,
    pub discount: Option<Value>,
    #[serde(alias = "grand_total")]
    pub total: Option<Value>,
    pub items: Option<Vec<ItemDto>>,
    pub issues: Option<Vec<String>>,
}

impl DetailsDto {
    /// Lines without a readable price are dropped and noted as issues.
    pub fn into_extracted(self, known_total: Option<Money>) -> ExtractedReceipt {
        let mut issues: Vec<String> = self
            .issues
            .unwrap_or_default()
            .into_iter()
            .map(|issue| issue.trim().to_owned())
            .filter(|issue| !issue.is_empty())
            .collect();

        let mut items = Vec::new();
        for item in self.items.unwrap_or_default() {
            let label = clean_text(item.name);
            match (label, item.price.as_ref().and_then(amount)) {
                (Some(label), Some(cents)) => items.push(ExtractedItem {
                    label,
                    quantity: item.quantity.as_ref().map_or(1, quantity),
                    cents,
                }),
                (label, _) => issues.push(format!(
                    "Skipped unreadable line: {}",
                    label.as_deref().unwrap_or("(no name)")
                )),
            }
        }

        ExtractedReceipt {
            merchant: clean_text(self.merchant),
            subtotal: self.subtotal.as_ref().and_then(amount),
            tax: self.tax.as_ref().and_then(amount),
            fees: self.fees.as_ref().and_then(amount),
            tip: self.tip.as_ref().and_then(amount),
            discount: self.discount.as_ref().and_then(amount),
            total: self.total.as_ref().and_then(amount).or(known_total),
            items,
            issues,
        }
    }
}

fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Dollar amount from a JSON number or string. `null`, blanks and other
/// shapes read as absent.
pub fn amount(value: &Value) -> Option<Money> {
    match value {
        Value::Number(number) => Some(number_to_cents(number)),
        Value::String(text) if !text.trim().is_empty() => Some(parse_to_cents(text)),
        _ => None,
    }
}

/// Reads the number itself; its text form may use an exponent.
fn number_to_cents(number: &Number) -> Money {
    let cents = match number.as_i64() {
        Some(dollars) => dollars.saturating_mul(100),
        None => number
            .as_f64()
            .filter(|dollars| dollars.is_finite())
            .map_or(0, |dollars| (dollars * 100.0).round() as i64),
    };
    Money::from_cents(cents).floor_zero()
}

fn quantity(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().map(|float| float.round().max(0.0) as u64)),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(1)
        .max(1)
}
