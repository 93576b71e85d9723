use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    model::{Extras, ExtrasPolicy, Item, ItemId, ParticipantId, SplitPolicy, UnassignedPolicy},
    money::Money,
    services::distribution::{equal_split, prorate, split_evenly},
};

/// Splits one item's price among its assignees, remainder cents to the
/// earliest assignees in `assignees` order.
pub fn item_shares(price: Money, assignees: &[ParticipantId]) -> Vec<(ParticipantId, Money)> {
    split_evenly(price, assignees)
}

/// Item-derived subtotals for the included roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemSubtotals {
    pub per_participant: IndexMap<ParticipantId, Money>,
    pub unassigned_total: Money,
    pub unassigned_items: Vec<ItemId>,
}

impl ItemSubtotals {
    pub fn assigned_total(&self) -> Money {
        self.per_participant.values().sum()
    }
}

/// Sums each included participant's share of every complete item.
///
/// Assignments to participants outside `included` are ignored; an item left
/// without an included assignee is reported as unassigned.
pub fn item_subtotals(included: &[ParticipantId], items: &[Item]) -> ItemSubtotals {
    let mut subtotals = ItemSubtotals {
        per_participant: included.iter().map(|id| (*id, Money::ZERO)).collect(),
        ..ItemSubtotals::default()
    };

    for item in items {
        let Some(price) = item.countable_price() else {
            continue;
        };
        let assignees: Vec<ParticipantId> = item.assignees_in(included).collect();
        if assignees.is_empty() {
            subtotals.unassigned_total += price;
            subtotals.unassigned_items.push(item.id);
            continue;
        }
        for (participant, share) in item_shares(price, &assignees) {
            *subtotals
                .per_participant
                .entry(participant)
                .or_insert(Money::ZERO) += share;
        }
    }

    subtotals
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantShare {
    pub id: ParticipantId,
    /// Shares of items this participant is assigned to.
    pub item_subtotal: Money,
    /// Portion of unassigned items carried under the unassigned policy.
    pub unassigned_share: Money,
    /// Signed fees/tax/tip/discount portion, `owed - item_subtotal - unassigned_share`.
    pub extras_cents: i64,
    pub owed: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByItemsAllocation {
    pub shares: Vec<ParticipantShare>,
    pub item_total: Money,
    pub unassigned_total: Money,
    pub unassigned_items: Vec<ItemId>,
    pub grand_total: Money,
}

impl ByItemsAllocation {
    pub fn owed_for(&self, participant: ParticipantId) -> Option<Money> {
        self.shares
            .iter()
            .find(|share| share.id == participant)
            .map(|share| share.owed)
    }

    pub fn owed_total(&self) -> Money {
        self.shares.iter().map(|share| share.owed).sum()
    }
}

/// Computes what each included participant owes in by-items mode.
///
/// `grand_total` is the complete-item total plus extras, floored at zero, and
/// the owed amounts always add up to it exactly.
pub fn allocate_by_items(
    included: &[ParticipantId],
    payer: ParticipantId,
    items: &[Item],
    extras: Extras,
    policy: SplitPolicy,
) -> ByItemsAllocation {
    let subtotals = item_subtotals(included, items);
    let item_total = subtotals.assigned_total() + subtotals.unassigned_total;
    let grand_total = extras.apply_to(item_total);

    if included.is_empty() {
        return ByItemsAllocation {
            shares: Vec::new(),
            item_total,
            unassigned_total: subtotals.unassigned_total,
            unassigned_items: subtotals.unassigned_items,
            grand_total,
        };
    }

    let payer_included = included.contains(&payer);
    let unassigned_shares: Vec<Money> = match policy.unassigned {
        UnassignedPolicy::Payer if payer_included => included
            .iter()
            .map(|id| {
                if *id == payer {
                    subtotals.unassigned_total
                } else {
                    Money::ZERO
                }
            })
            .collect(),
        UnassignedPolicy::Payer => {
            tracing::debug!(
                payer = payer.0,
                "Payer is excluded; splitting unassigned items equally"
            );
            equal_split(subtotals.unassigned_total, included.len())
        }
        UnassignedPolicy::SplitEqually => equal_split(subtotals.unassigned_total, included.len()),
    };

    let bases: Vec<Money> = included
        .iter()
        .zip(&unassigned_shares)
        .map(|(id, unassigned)| subtotals.per_participant[id] + *unassigned)
        .collect();

    let owed = match policy.extras {
        ExtrasPolicy::PayerAbsorbs if payer_included => {
            payer_absorbs(included, payer, &bases, extras, grand_total)
                .unwrap_or_else(|| prorate(grand_total, &bases))
        }
        ExtrasPolicy::PayerAbsorbs | ExtrasPolicy::ProRata => prorate(grand_total, &bases),
    };

    let shares = included
        .iter()
        .zip(unassigned_shares)
        .zip(owed)
        .map(|((id, unassigned_share), owed)| {
            let item_subtotal = subtotals.per_participant[id];
            ParticipantShare {
                id: *id,
                item_subtotal,
                unassigned_share,
                extras_cents: owed.cents() - item_subtotal.cents() - unassigned_share.cents(),
                owed,
            }
        })
        .collect();

    ByItemsAllocation {
        shares,
        item_total,
        unassigned_total: subtotals.unassigned_total,
        unassigned_items: subtotals.unassigned_items,
        grand_total,
    }
}

/// Everyone pays their base; the payer also carries the net extras. `None`
/// when that would leave the payer's line negative.
fn payer_absorbs(
    included: &[ParticipantId],
    payer: ParticipantId,
    bases: &[Money],
    extras: Extras,
    grand_total: Money,
) -> Option<Vec<Money>> {
    let owed: Vec<Money> = included
        .iter()
        .zip(bases)
        .map(|(id, base)| {
            if *id == payer {
                Money::from_cents(base.cents().saturating_add(extras.net_cents()))
            } else {
                *base
            }
        })
        .collect();

    let consistent = owed.iter().all(|amount| amount.cents() >= 0)
        && owed.iter().sum::<Money>() == grand_total;
    consistent.then_some(owed)
}

/// `part` as a percentage of `total`, rounded half up to one decimal place.
/// Zero when `total` is not positive.
pub fn percentage_of(part: Money, total: Money) -> Decimal {
    if !total.is_positive() {
        return Decimal::ZERO;
    }
    (Decimal::from(part.cents()) * Decimal::ONE_HUNDRED / Decimal::from(total.cents()))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Each participant's share of the grand total, per [`percentage_of`].
pub fn share_percentages(allocation: &ByItemsAllocation) -> Vec<(ParticipantId, Decimal)> {
    allocation
        .shares
        .iter()
        .map(|share| (share.id, percentage_of(share.owed, allocation.grand_total)))
        .collect()
}
