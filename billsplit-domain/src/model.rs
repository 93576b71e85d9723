use chrono::{DateTime, Utc};
use fxhash::FxHashSet;

use crate::money::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    /// May be empty; presenters fall back to "Me" or "Guest N".
    pub display_name: String,
    pub is_me: bool,
    pub is_included: bool,
}

impl Participant {
    pub fn me(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_me: true,
            is_included: true,
        }
    }

    pub fn guest(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_me: false,
            is_included: true,
        }
    }
}

/// A receipt line. `price` is the line total (quantity already applied) and is
/// `None` while the row is an empty placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub label: String,
    pub price: Option<Money>,
    pub assigned: FxHashSet<ParticipantId>,
}

impl Item {
    pub fn new(id: ItemId, label: impl Into<String>, price: Option<Money>) -> Self {
        Self {
            id,
            label: label.into(),
            price,
            assigned: FxHashSet::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.label.trim().is_empty() && self.price.is_some()
    }

    /// Price of a complete item, `None` for placeholder rows.
    pub fn countable_price(&self) -> Option<Money> {
        if self.is_complete() { self.price } else { None }
    }

    /// Assignees restricted to `roster`, in roster order.
    pub fn assignees_in<'a>(
        &'a self,
        roster: &'a [ParticipantId],
    ) -> impl Iterator<Item = ParticipantId> + 'a {
        roster
            .iter()
            .copied()
            .filter(|id| self.assigned.contains(id))
    }
}

/// Sum of the prices of complete items.
pub fn complete_item_total(items: &[Item]) -> Money {
    items.iter().filter_map(Item::countable_price).sum()
}

/// Fees, tax, tip and discount tracked at the receipt/draft level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extras {
    pub fees: Money,
    pub tax: Money,
    pub tip: Money,
    pub discount: Money,
}

impl Extras {
    /// `fees + tax + tip - discount`; negative when the discount dominates.
    pub fn net_cents(self) -> i64 {
        self.fees
            .cents()
            .saturating_add(self.tax.cents())
            .saturating_add(self.tip.cents())
            .saturating_sub(self.discount.cents())
    }

    /// Grand total for a given subtotal, floored at zero.
    pub fn apply_to(self, subtotal: Money) -> Money {
        Money::from_cents(subtotal.cents().saturating_add(self.net_cents())).floor_zero()
    }

    /// Inverse of [`Extras::apply_to`], floored at zero.
    pub fn subtotal_of(self, total: Money) -> Money {
        Money::from_cents(total.cents().saturating_sub(self.net_cents())).floor_zero()
    }

    pub fn is_empty(self) -> bool {
        self.fees.is_zero() && self.tax.is_zero() && self.tip.is_zero() && self.discount.is_zero()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub subtotal: Money,
    pub fees: Money,
    pub tax: Money,
    pub tip: Money,
    pub discount: Money,
    pub total: Money,
    pub items: Vec<Item>,
}

impl Receipt {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            created_at,
            subtotal: Money::ZERO,
            fees: Money::ZERO,
            tax: Money::ZERO,
            tip: Money::ZERO,
            discount: Money::ZERO,
            total: Money::ZERO,
            items: Vec::new(),
        }
    }

    pub fn extras(&self) -> Extras {
        Extras {
            fees: self.fees,
            tax: self.tax,
            tip: self.tip,
            discount: self.discount,
        }
    }

    pub fn set_extras(&mut self, extras: Extras) {
        self.fees = extras.fees;
        self.tax = extras.tax;
        self.tip = extras.tip;
        self.discount = extras.discount;
    }

    /// Whether `subtotal + extras == total` holds.
    pub fn is_balanced(&self) -> bool {
        self.extras().apply_to(self.subtotal) == self.total
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplitMode {
    #[default]
    Equally,
    Custom,
    ByItems,
}

/// Who carries fees, tax, tip and discount in by-items mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtrasPolicy {
    /// Distributed in proportion to each participant's item subtotal.
    #[default]
    ProRata,
    /// Charged to the payer's own line.
    PayerAbsorbs,
}

/// Who carries complete items nobody was assigned to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnassignedPolicy {
    #[default]
    SplitEqually,
    Payer,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitPolicy {
    pub extras: ExtrasPolicy,
    pub unassigned: UnassignedPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::complete("Coffee", Some(450), true)]
    #[case::blank_label("   ", Some(450), false)]
    #[case::missing_price("Coffee", None, false)]
    #[case::zero_price_counts("Water", Some(0), true)]
    fn completeness_requires_label_and_price(
        #[case] label: &str,
        #[case] price: Option<i64>,
        #[case] expected: bool,
    ) {
        let item = Item::new(ItemId(1), label, price.map(Money::from_cents));
        assert_eq!(item.is_complete(), expected);
    }

    #[test]
    fn complete_item_total_skips_placeholders() {
        let items = [
            Item::new(ItemId(1), "Pasta", Some(Money::from_cents(1500))),
            Item::new(ItemId(2), "", Some(Money::from_cents(900))),
            Item::new(ItemId(3), "Wine", None),
            Item::new(ItemId(4), "Salad", Some(Money::from_cents(800))),
        ];
        assert_eq!(complete_item_total(&items), Money::from_cents(2300));
    }

    #[test]
    fn assignees_follow_roster_order() {
        let mut item = Item::new(ItemId(1), "Nachos", Some(Money::from_cents(900)));
        item.assigned.insert(ParticipantId(3));
        item.assigned.insert(ParticipantId(1));
        let roster = [ParticipantId(1), ParticipantId(2), ParticipantId(3)];

        let assignees: Vec<_> = item.assignees_in(&roster).collect();

        assert_eq!(assignees, vec![ParticipantId(1), ParticipantId(3)]);
    }

    #[test]
    fn extras_apply_and_invert() {
        let extras = Extras {
            fees: Money::from_cents(100),
            tax: Money::from_cents(80),
            tip: Money::from_cents(150),
            discount: Money::from_cents(30),
        };
        assert_eq!(extras.net_cents(), 300);
        assert_eq!(
            extras.apply_to(Money::from_cents(1000)),
            Money::from_cents(1300)
        );
        assert_eq!(
            extras.subtotal_of(Money::from_cents(1300)),
            Money::from_cents(1000)
        );
        assert_eq!(extras.subtotal_of(Money::from_cents(100)), Money::ZERO);
    }

    #[test]
    fn discount_larger_than_subtotal_floors_total() {
        let extras = Extras {
            discount: Money::from_cents(5000),
            ..Extras::default()
        };
        assert_eq!(extras.apply_to(Money::from_cents(1200)), Money::ZERO);
    }
}
