use rust_decimal::Decimal;

use crate::{
    model::{
        Extras, Item, ItemId, Participant, ParticipantId, Receipt, SplitMode, SplitPolicy,
        complete_item_total,
    },
    money::{Money, parse_to_cents},
    services::{Allocation, ByItemsAllocation, DialDrag, allocate_by_items, tip_for_percentage},
};

/// Settings a draft is created with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftConfig {
    /// Seeded participant count, including the local user.
    pub party_size: usize,
    pub my_name: String,
    pub policy: SplitPolicy,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            party_size: 2,
            my_name: String::new(),
            policy: SplitPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DraftEvent {
    SelectMode(SplitMode),
    AddGuest {
        name: String,
    },
    RemoveParticipant(ParticipantId),
    SetIncluded {
        participant: ParticipantId,
        included: bool,
    },
    SetPayer(ParticipantId),
    Rename {
        participant: ParticipantId,
        name: String,
    },
    SetTotal(Money),
    SetExtras(Extras),
    SetTipPercentage(Decimal),
    SetCustomAmount {
        participant: ParticipantId,
        amount: Money,
    },
    AddItem {
        label: String,
        price: String,
    },
    RemoveItem(ItemId),
    EditItemLabel {
        item: ItemId,
        label: String,
    },
    EditItemPrice {
        item: ItemId,
        price: String,
    },
    ToggleAssignment {
        item: ItemId,
        participant: ParticipantId,
    },
    AssignToEveryone(ItemId),
    ClearAssignments(ItemId),
    ReplaceReceipt(Receipt),
}

/// One participant's line in a finalized split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryParticipant {
    pub id: ParticipantId,
    pub name: String,
    pub is_me: bool,
    pub is_included: bool,
    pub is_payer: bool,
    pub owed: Money,
}

/// Everything a shared view of the split needs, in roster order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSummary {
    pub title: String,
    pub mode: SplitMode,
    pub participants: Vec<SummaryParticipant>,
    pub total: Money,
    pub allocated: Money,
    pub unallocated: Money,
    pub unassigned_total: Money,
    pub unassigned_items: usize,
}

/// In-progress split. Mutated only through [`SplitDraft::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitDraft {
    participants: Vec<Participant>,
    me_id: ParticipantId,
    payer_id: ParticipantId,
    mode: SplitMode,
    total: Money,
    /// Pre-extras base; `total` is re-derived from it whenever extras change.
    subtotal: Money,
    equal: Allocation,
    custom: Allocation,
    items: Vec<Item>,
    extras: Extras,
    items_seeded: bool,
    receipt: Receipt,
    policy: SplitPolicy,
    next_participant: u64,
    next_item: u64,
}

impl SplitDraft {
    pub fn new(receipt: Receipt, config: &DraftConfig) -> Self {
        let me_id = ParticipantId(1);
        let party_size = config.party_size.max(1) as u64;
        let mut participants = vec![Participant::me(me_id, config.my_name.trim())];
        participants.extend((2..=party_size).map(|id| Participant::guest(ParticipantId(id), "")));

        let total = receipt.total.floor_zero();
        let extras = receipt.extras();
        let included: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();

        Self {
            participants,
            me_id,
            payer_id: me_id,
            mode: SplitMode::Equally,
            total,
            subtotal: extras.subtotal_of(total),
            equal: Allocation::equal(total, &included),
            custom: Allocation::zeroed(total, &included),
            items: Vec::new(),
            extras,
            items_seeded: false,
            receipt,
            policy: config.policy,
            next_participant: party_size + 1,
            next_item: 1,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.id == id)
    }

    pub fn me_id(&self) -> ParticipantId {
        self.me_id
    }

    pub fn payer_id(&self) -> ParticipantId {
        self.payer_id
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    /// Total used by the equal and custom modes.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Total before fees, tax, tip and discount.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn extras(&self) -> Extras {
        self.extras
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items_seeded(&self) -> bool {
        self.items_seeded
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    pub fn included_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|participant| participant.is_included)
            .map(|participant| participant.id)
            .collect()
    }

    pub fn equal_allocation(&self) -> &Allocation {
        &self.equal
    }

    pub fn custom_allocation(&self) -> &Allocation {
        &self.custom
    }

    pub fn by_items(&self) -> ByItemsAllocation {
        allocate_by_items(
            &self.included_ids(),
            self.payer_id,
            &self.items,
            self.extras,
            self.policy,
        )
    }

    /// Amount the whole split covers in the current mode.
    pub fn effective_total(&self) -> Money {
        match self.mode {
            SplitMode::ByItems => self.by_items().grand_total,
            SplitMode::Equally | SplitMode::Custom => self.total,
        }
    }

    /// Custom-mode headroom; zero in the other modes.
    pub fn unallocated(&self) -> Money {
        match self.mode {
            SplitMode::Custom => self.custom.unallocated(),
            SplitMode::Equally | SplitMode::ByItems => Money::ZERO,
        }
    }

    pub fn remaining_capacity(&self, participant: ParticipantId) -> Money {
        self.custom.remaining_capacity(participant)
    }

    /// Starts a dial drag on a participant's custom amount.
    pub fn begin_dial(&self, participant: ParticipantId, angle: f64) -> Option<DialDrag> {
        DialDrag::begin(&self.custom, participant, angle)
    }

    pub fn apply(mut self, event: DraftEvent) -> Self {
        match event {
            DraftEvent::SelectMode(mode) => self.select_mode(mode),
            DraftEvent::AddGuest { name } => self.add_guest(name),
            DraftEvent::RemoveParticipant(id) => self.remove_participant(id),
            DraftEvent::SetIncluded {
                participant,
                included,
            } => self.set_included(participant, included),
            DraftEvent::SetPayer(id) => {
                if self.participant(id).is_some() {
                    self.payer_id = id;
                } else {
                    tracing::debug!(participant = id.0, "Refusing unknown payer");
                }
            }
            DraftEvent::Rename { participant, name } => {
                match self.participants.iter_mut().find(|p| p.id == participant) {
                    Some(found) => found.display_name = name.trim().to_owned(),
                    None => tracing::debug!(participant = participant.0, "Rename of unknown participant"),
                }
            }
            DraftEvent::SetTotal(total) => {
                self.total = total.floor_zero();
                self.subtotal = self.extras.subtotal_of(self.total);
                self.recompute();
            }
            DraftEvent::SetExtras(extras) => self.set_extras(extras),
            DraftEvent::SetTipPercentage(percent) => {
                let base = match self.mode {
                    SplitMode::ByItems => complete_item_total(&self.items),
                    SplitMode::Equally | SplitMode::Custom => {
                        self.total.saturating_sub(self.extras.tip)
                    }
                };
                let tip = tip_for_percentage(base, percent);
                tracing::debug!(%percent, base = base.cents(), tip = tip.cents(), "Applying tip percentage");
                self.set_extras(Extras { tip, ..self.extras });
            }
            DraftEvent::SetCustomAmount {
                participant,
                amount,
            } => {
                self.custom.set_amount(participant, amount);
            }
            DraftEvent::AddItem { label, price } => {
                let id = self.next_item_id();
                self.items
                    .push(Item::new(id, label.trim(), parse_price_text(&price)));
            }
            DraftEvent::RemoveItem(id) => {
                let before = self.items.len();
                self.items.retain(|item| item.id != id);
                if self.items.len() == before {
                    tracing::debug!(item = id.0, "Removal of unknown item");
                }
            }
            DraftEvent::EditItemLabel { item, label } => {
                if let Some(found) = self.item_mut(item) {
                    found.label = label;
                }
            }
            DraftEvent::EditItemPrice { item, price } => {
                if let Some(found) = self.item_mut(item) {
                    found.price = parse_price_text(&price);
                }
            }
            DraftEvent::ToggleAssignment { item, participant } => {
                if self.participant(participant).is_none() {
                    tracing::debug!(participant = participant.0, "Assignment to unknown participant");
                } else if let Some(found) = self.item_mut(item) {
                    if !found.assigned.remove(&participant) {
                        found.assigned.insert(participant);
                    }
                }
            }
            DraftEvent::AssignToEveryone(item) => {
                let included = self.included_ids();
                if let Some(found) = self.item_mut(item) {
                    found.assigned = included.into_iter().collect();
                }
            }
            DraftEvent::ClearAssignments(item) => {
                if let Some(found) = self.item_mut(item) {
                    found.assigned.clear();
                }
            }
            DraftEvent::ReplaceReceipt(receipt) => self.replace_receipt(receipt),
        }
        self
    }

    /// Freezes the draft into the receipt and summary that get shared.
    pub fn finalize(&self) -> (Receipt, SplitSummary) {
        let mut receipt = Receipt::new(self.receipt.title.clone(), self.receipt.created_at);
        receipt.set_extras(self.extras);

        let (owed, unassigned_total, unassigned_items): (Vec<Money>, Money, usize) = match self
            .mode
        {
            SplitMode::ByItems => {
                let allocation = self.by_items();
                let included = self.included_ids();
                receipt.items = self
                    .items
                    .iter()
                    .filter(|item| item.is_complete())
                    .map(|item| {
                        let mut item = item.clone();
                        item.label = item.label.trim().to_owned();
                        item.assigned.retain(|id| included.contains(id));
                        item
                    })
                    .collect();
                receipt.subtotal = allocation.item_total;
                receipt.total = allocation.grand_total;
                let owed = self
                    .participants
                    .iter()
                    .map(|p| allocation.owed_for(p.id).unwrap_or(Money::ZERO))
                    .collect();
                (
                    owed,
                    allocation.unassigned_total,
                    allocation.unassigned_items.len(),
                )
            }
            SplitMode::Equally | SplitMode::Custom => {
                let source = if self.items_seeded {
                    &self.items
                } else {
                    &self.receipt.items
                };
                receipt.items = source
                    .iter()
                    .filter(|item| item.is_complete())
                    .map(|item| {
                        let mut item = item.clone();
                        item.label = item.label.trim().to_owned();
                        item.assigned.clear();
                        item
                    })
                    .collect();
                receipt.total = self.total;
                receipt.subtotal = self.subtotal;
                let allocation = if self.mode == SplitMode::Custom {
                    &self.custom
                } else {
                    &self.equal
                };
                let owed = self
                    .participants
                    .iter()
                    .map(|p| allocation.amount(p.id).unwrap_or(Money::ZERO))
                    .collect();
                (owed, Money::ZERO, 0)
            }
        };

        let participants: Vec<SummaryParticipant> = self
            .participants
            .iter()
            .zip(owed)
            .map(|(participant, owed)| SummaryParticipant {
                id: participant.id,
                name: participant.display_name.clone(),
                is_me: participant.is_me,
                is_included: participant.is_included,
                is_payer: participant.id == self.payer_id,
                owed,
            })
            .collect();
        let allocated: Money = participants.iter().map(|p| p.owed).sum();

        let summary = SplitSummary {
            title: receipt.title.clone(),
            mode: self.mode,
            participants,
            total: receipt.total,
            allocated,
            unallocated: receipt.total.saturating_sub(allocated),
            unassigned_total,
            unassigned_items,
        };
        (receipt, summary)
    }

    fn select_mode(&mut self, mode: SplitMode) {
        let previous = self.mode;
        match mode {
            SplitMode::Equally => {
                self.equal = Allocation::equal(self.total, &self.included_ids());
            }
            SplitMode::Custom if previous == SplitMode::Equally => {
                self.custom = Allocation::zeroed(self.total, &self.included_ids());
            }
            SplitMode::Custom => self.recompute(),
            SplitMode::ByItems => {
                if !self.items_seeded {
                    self.seed_items();
                    self.recompute();
                }
            }
        }
        self.mode = mode;
        tracing::debug!(from = ?previous, to = ?mode, "Split mode changed");
    }

    fn add_guest(&mut self, name: String) {
        let id = ParticipantId(self.next_participant);
        self.next_participant += 1;
        self.participants.push(Participant::guest(id, name.trim()));
        self.recompute();
    }

    fn remove_participant(&mut self, id: ParticipantId) {
        let Some(position) = self.participants.iter().position(|p| p.id == id) else {
            tracing::debug!(participant = id.0, "Removal of unknown participant");
            return;
        };
        if id == self.me_id {
            tracing::debug!(participant = id.0, "Refusing to remove the local participant");
            return;
        }
        let leaves_someone_included = self
            .participants
            .iter()
            .any(|p| p.id != id && p.is_included);
        if !leaves_someone_included {
            tracing::debug!(participant = id.0, "Refusing to remove the last included participant");
            return;
        }

        self.participants.remove(position);
        for item in &mut self.items {
            item.assigned.remove(&id);
        }
        if self.payer_id == id {
            self.payer_id = self.me_id;
        }
        self.recompute();
    }

    fn set_included(&mut self, id: ParticipantId, included: bool) {
        if self.participant(id).is_none() {
            tracing::debug!(participant = id.0, "Inclusion change for unknown participant");
            return;
        }
        if !included
            && !self
                .participants
                .iter()
                .any(|p| p.id != id && p.is_included)
        {
            tracing::debug!(participant = id.0, "Refusing to exclude the last included participant");
            return;
        }
        if let Some(participant) = self.participants.iter_mut().find(|p| p.id == id) {
            participant.is_included = included;
        }
        self.recompute();
    }

    fn set_extras(&mut self, extras: Extras) {
        self.extras = Extras {
            fees: extras.fees.floor_zero(),
            tax: extras.tax.floor_zero(),
            tip: extras.tip.floor_zero(),
            discount: extras.discount.floor_zero(),
        };
        self.total = self.extras.apply_to(self.subtotal);
        self.recompute();
    }

    fn replace_receipt(&mut self, receipt: Receipt) {
        self.total = receipt.total.floor_zero();
        self.extras = receipt.extras();
        self.subtotal = self.extras.subtotal_of(self.total);
        self.receipt = receipt;
        self.items_seeded = false;
        self.items.clear();
        if self.mode == SplitMode::ByItems {
            self.seed_items();
        }
        self.recompute();
    }

    /// Copies receipt items in as unassigned rows and picks up non-zero
    /// receipt charges.
    fn seed_items(&mut self) {
        let receipt_items: Vec<(String, Option<Money>)> = self
            .receipt
            .items
            .iter()
            .map(|item| (item.label.clone(), item.price))
            .collect();
        for (label, price) in receipt_items {
            let id = self.next_item_id();
            self.items.push(Item::new(id, label, price));
        }

        let from_receipt = self.receipt.extras();
        let pick = |receipt: Money, current: Money| {
            if receipt.is_zero() { current } else { receipt }
        };
        self.extras = Extras {
            fees: pick(from_receipt.fees, self.extras.fees),
            tax: pick(from_receipt.tax, self.extras.tax),
            tip: pick(from_receipt.tip, self.extras.tip),
            discount: pick(from_receipt.discount, self.extras.discount),
        };
        self.total = self.extras.apply_to(self.subtotal);
        self.items_seeded = true;
        tracing::debug!(items = self.items.len(), "Seeded items from receipt");
    }

    /// Re-keys both allocations to the current roster and total.
    fn recompute(&mut self) {
        let included = self.included_ids();
        self.equal = Allocation::equal(self.total, &included);
        self.custom.retain_roster(&included);
        self.custom.set_total(self.total);
    }

    fn next_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        id
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        let found = self.items.iter_mut().find(|item| item.id == id);
        if found.is_none() {
            tracing::debug!(item = id.0, "Edit of unknown item");
        }
        found
    }
}

/// Blank price text leaves the row a placeholder.
fn parse_price_text(text: &str) -> Option<Money> {
    if text.trim().is_empty() {
        None
    } else {
        Some(parse_to_cents(text))
    }
}
