use std::f64::consts::{PI, TAU};

use indexmap::IndexMap;

use crate::{model::ParticipantId, money::Money, services::distribution::equal_split};

/// Per-participant amounts for one total, in roster order.
///
/// Every mutation keeps `sum(amounts) <= total`; requests that would break it
/// are clamped before they are stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    total: Money,
    amounts: IndexMap<ParticipantId, Money>,
}

impl Allocation {
    /// Every included participant at zero.
    pub fn zeroed(total: Money, included: &[ParticipantId]) -> Self {
        Self {
            total: total.floor_zero(),
            amounts: included.iter().map(|id| (*id, Money::ZERO)).collect(),
        }
    }

    /// Equal split of `total` over `included`, earliest participants first.
    pub fn equal(total: Money, included: &[ParticipantId]) -> Self {
        let total = total.floor_zero();
        Self {
            total,
            amounts: included
                .iter()
                .copied()
                .zip(equal_split(total, included.len()))
                .collect(),
        }
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn amounts(&self) -> &IndexMap<ParticipantId, Money> {
        &self.amounts
    }

    pub fn amount(&self, participant: ParticipantId) -> Option<Money> {
        self.amounts.get(&participant).copied()
    }

    pub fn allocated(&self) -> Money {
        self.amounts.values().sum()
    }

    pub fn unallocated(&self) -> Money {
        self.total.saturating_sub(self.allocated())
    }

    /// Largest amount `participant` may hold given everyone else's amounts.
    pub fn remaining_capacity(&self, participant: ParticipantId) -> Money {
        let others: Money = self
            .amounts
            .iter()
            .filter(|(id, _)| **id != participant)
            .map(|(_, amount)| *amount)
            .sum();
        self.total.saturating_sub(others)
    }

    /// Stores `requested` clamped to `[0, remaining_capacity]` and returns the
    /// stored value. Participants outside the allocation are ignored.
    pub fn set_amount(&mut self, participant: ParticipantId, requested: Money) -> Option<Money> {
        if !self.amounts.contains_key(&participant) {
            tracing::debug!(
                participant = participant.0,
                "Ignoring amount for participant outside the allocation"
            );
            return None;
        }

        let capacity = self.remaining_capacity(participant);
        let stored = requested.clamp(Money::ZERO, capacity);
        if stored != requested {
            tracing::debug!(
                participant = participant.0,
                requested = requested.cents(),
                stored = stored.cents(),
                capacity = capacity.cents(),
                "Clamped custom amount"
            );
        }
        self.amounts.insert(participant, stored);
        Some(stored)
    }

    /// Re-keys the allocation to `included`: known participants keep their
    /// amounts, new ones start at zero, the rest are dropped.
    pub fn retain_roster(&mut self, included: &[ParticipantId]) {
        let amounts = included
            .iter()
            .map(|id| (*id, self.amounts.get(id).copied().unwrap_or(Money::ZERO)))
            .collect();
        self.amounts = amounts;
    }

    /// Changes the total. When the amounts no longer fit they are trimmed,
    /// starting from the last participant.
    pub fn set_total(&mut self, total: Money) {
        self.total = total.floor_zero();
        let mut excess = self.allocated().saturating_sub(self.total);
        for amount in self.amounts.values_mut().rev() {
            if excess.is_zero() {
                break;
            }
            let cut = excess.min(*amount);
            *amount = amount.saturating_sub(cut);
            excess = excess.saturating_sub(cut);
        }
    }
}

/// Transient state of one drag on the allocation dial.
///
/// The dial maps a full revolution to the whole total. Readings are angles in
/// radians; the delta between consecutive readings is unwrapped into
/// `(-π, π]` before it is accumulated, and only the accumulated position is
/// clamped, so crossing the 0/2π seam or making several revolutions never
/// resets the position.
#[derive(Clone, Debug, PartialEq)]
pub struct DialDrag {
    participant: ParticipantId,
    total: Money,
    capacity: Money,
    last_angle: f64,
    position: f64,
}

impl DialDrag {
    /// Starts a drag for `participant` at `angle`. Returns `None` when the
    /// participant is not part of the allocation.
    pub fn begin(allocation: &Allocation, participant: ParticipantId, angle: f64) -> Option<Self> {
        let current = allocation.amount(participant)?;
        Some(Self {
            participant,
            total: allocation.total(),
            capacity: allocation.remaining_capacity(participant),
            last_angle: normalize_angle(angle).unwrap_or(0.0),
            position: current.cents() as f64,
        })
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn capacity(&self) -> Money {
        self.capacity
    }

    /// Current position in whole cents.
    pub fn amount(&self) -> Money {
        Money::from_cents(self.position.round() as i64).clamp(Money::ZERO, self.capacity)
    }

    /// Feeds a new reading and returns the resulting amount.
    pub fn update(&mut self, angle: f64) -> Money {
        let Some(angle) = normalize_angle(angle) else {
            return self.amount();
        };

        let mut delta = angle - self.last_angle;
        if delta > PI {
            delta -= TAU;
        } else if delta <= -PI {
            delta += TAU;
        }
        self.last_angle = angle;

        let delta_cents = delta / TAU * self.total.cents() as f64;
        self.position = (self.position + delta_cents).clamp(0.0, self.capacity.cents() as f64);
        self.amount()
    }
}

fn normalize_angle(angle: f64) -> Option<f64> {
    angle.is_finite().then(|| angle.rem_euclid(TAU))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const A: ParticipantId = ParticipantId(1);
    const B: ParticipantId = ParticipantId(2);
    const C: ParticipantId = ParticipantId(3);

    #[fixture]
    fn allocation() -> Allocation {
        Allocation::zeroed(Money::from_cents(1000), &[A, B, C])
    }

    #[rstest]
    fn second_request_is_clamped_to_remaining_capacity(mut allocation: Allocation) {
        assert_eq!(
            allocation.set_amount(A, Money::from_cents(700)),
            Some(Money::from_cents(700))
        );
        assert_eq!(
            allocation.set_amount(B, Money::from_cents(500)),
            Some(Money::from_cents(300))
        );
        assert_eq!(allocation.allocated(), Money::from_cents(1000));
        assert_eq!(allocation.unallocated(), Money::ZERO);
    }

    #[rstest]
    fn lowering_an_amount_frees_capacity(mut allocation: Allocation) {
        allocation.set_amount(A, Money::from_cents(900));
        assert_eq!(allocation.remaining_capacity(B), Money::from_cents(100));
        allocation.set_amount(A, Money::from_cents(400));
        assert_eq!(allocation.remaining_capacity(B), Money::from_cents(600));
    }

    #[rstest]
    fn unknown_participant_is_ignored(mut allocation: Allocation) {
        assert_eq!(allocation.set_amount(ParticipantId(9), Money::from_cents(10)), None);
        assert_eq!(allocation.allocated(), Money::ZERO);
    }

    #[rstest]
    fn retain_roster_keeps_amounts_by_identity(mut allocation: Allocation) {
        allocation.set_amount(A, Money::from_cents(200));
        allocation.set_amount(C, Money::from_cents(300));

        allocation.retain_roster(&[C, A, ParticipantId(4)]);

        let amounts: Vec<_> = allocation
            .amounts()
            .iter()
            .map(|(id, amount)| (*id, amount.cents()))
            .collect();
        assert_eq!(amounts, vec![(C, 300), (A, 200), (ParticipantId(4), 0)]);
    }

    #[rstest]
    fn shrinking_total_trims_from_the_end(mut allocation: Allocation) {
        allocation.set_amount(A, Money::from_cents(500));
        allocation.set_amount(B, Money::from_cents(300));
        allocation.set_amount(C, Money::from_cents(200));

        allocation.set_total(Money::from_cents(600));

        assert_eq!(allocation.amount(A), Some(Money::from_cents(500)));
        assert_eq!(allocation.amount(B), Some(Money::from_cents(100)));
        assert_eq!(allocation.amount(C), Some(Money::ZERO));
        assert_eq!(allocation.allocated(), Money::from_cents(600));
    }

    #[test]
    fn equal_allocation_sums_to_total() {
        let allocation = Allocation::equal(Money::from_cents(1000), &[A, B, C]);
        assert_eq!(allocation.amount(A), Some(Money::from_cents(334)));
        assert_eq!(allocation.amount(B), Some(Money::from_cents(333)));
        assert_eq!(allocation.amount(C), Some(Money::from_cents(333)));
        assert_eq!(allocation.unallocated(), Money::ZERO);
    }

    #[rstest]
    fn dial_quarter_turns_map_to_quarters_of_total(allocation: Allocation) {
        let mut drag = DialDrag::begin(&allocation, A, 0.0).expect("participant in allocation");
        assert_eq!(drag.update(PI / 2.0), Money::from_cents(250));
        assert_eq!(drag.update(PI), Money::from_cents(500));
        assert_eq!(drag.update(PI / 2.0), Money::from_cents(250));
    }

    #[rstest]
    fn dial_crossing_the_seam_keeps_accumulating(allocation: Allocation) {
        let mut drag = DialDrag::begin(&allocation, A, 0.0).expect("participant in allocation");
        for step in 1..=7 {
            drag.update(f64::from(step) * PI / 4.0);
        }
        assert_eq!(drag.amount(), Money::from_cents(875));

        // 2π wraps to 0 but is still a forward eighth of a turn.
        assert_eq!(drag.update(TAU), Money::from_cents(1000));
    }

    #[rstest]
    fn dial_position_is_clamped_not_wound_up(allocation: Allocation) {
        let mut drag = DialDrag::begin(&allocation, A, 0.0).expect("participant in allocation");
        for turn in 0..3 {
            for step in 1..=4 {
                drag.update(f64::from(turn) * TAU + f64::from(step) * PI / 2.0);
            }
        }
        assert_eq!(drag.amount(), Money::from_cents(1000));

        // Backing off a quarter turn responds immediately.
        assert_eq!(drag.update(TAU - PI / 2.0), Money::from_cents(750));
    }

    #[rstest]
    fn dial_backward_across_seam_stops_at_zero(mut allocation: Allocation) {
        allocation.set_amount(A, Money::from_cents(100));
        let mut drag = DialDrag::begin(&allocation, A, 0.1).expect("participant in allocation");
        assert_eq!(drag.update(TAU - 1.0), Money::ZERO);
    }

    #[rstest]
    fn dial_respects_other_participants(mut allocation: Allocation) {
        allocation.set_amount(B, Money::from_cents(600));
        let mut drag = DialDrag::begin(&allocation, A, 0.0).expect("participant in allocation");
        assert_eq!(drag.capacity(), Money::from_cents(400));
        drag.update(PI / 2.0);
        drag.update(PI);
        assert_eq!(drag.amount(), Money::from_cents(400));
    }

    #[rstest]
    fn dial_ignores_non_finite_readings(allocation: Allocation) {
        let mut drag = DialDrag::begin(&allocation, A, 0.0).expect("participant in allocation");
        drag.update(PI / 2.0);
        assert_eq!(drag.update(f64::NAN), Money::from_cents(250));
        assert_eq!(drag.update(PI), Money::from_cents(500));
    }
}
