//! Compact, URL-safe encoding of a finalized split.
//!
//! The payload is JSON with short keys, encoded as unpadded URL-safe base64.
//! Item assignments are stored as indices into the participant list, so a
//! decoded payload gets fresh sequential ids. Decoding is total: anything
//! malformed yields `None`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use billsplit_domain::{
    Item, ItemId, Money, ParticipantId, Receipt, SplitDraft, SplitMode, SplitSummary,
    SummaryParticipant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PAYLOAD_VERSION: u32 = 1;
const QUERY_KEY: &str = "p";

#[derive(Debug, thiserror::Error)]
pub enum ShareLinkError {
    #[error("Failed to serialize share payload")]
    Serialize(#[from] serde_json::Error),
}

/// What a share link carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub version: u32,
    pub receipt: Receipt,
    pub split: SplitSummary,
}

impl SharePayload {
    pub fn new(receipt: Receipt, split: SplitSummary) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            receipt,
            split,
        }
    }

    pub fn from_draft(draft: &SplitDraft) -> Self {
        let (receipt, split) = draft.finalize();
        Self::new(receipt, split)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PayloadWire {
    v: u32,
    r: ReceiptWire,
    s: SplitWire,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReceiptWire {
    t: String,
    at: DateTime<Utc>,
    #[serde(default)]
    st: u64,
    #[serde(default)]
    f: u64,
    #[serde(default)]
    tx: u64,
    #[serde(default)]
    tp: u64,
    #[serde(default)]
    d: u64,
    tot: u64,
    #[serde(default)]
    i: Vec<ItemWire>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemWire {
    l: String,
    p: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    a: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SplitWire {
    m: ModeWire,
    p: Vec<ParticipantWire>,
    #[serde(default)]
    u: u64,
    #[serde(default)]
    ui: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum ModeWire {
    #[serde(rename = "e")]
    Equally,
    #[serde(rename = "c")]
    Custom,
    #[serde(rename = "i")]
    ByItems,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParticipantWire {
    #[serde(default)]
    n: String,
    o: u64,
    #[serde(default, skip_serializing_if = "is_false")]
    me: bool,
    #[serde(default = "included_by_default", skip_serializing_if = "is_true")]
    inc: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pay: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

fn included_by_default() -> bool {
    true
}

fn cents(amount: Money) -> u64 {
    u64::try_from(amount.cents()).unwrap_or(0)
}

impl From<SplitMode> for ModeWire {
    fn from(mode: SplitMode) -> Self {
        match mode {
            SplitMode::Equally => ModeWire::Equally,
            SplitMode::Custom => ModeWire::Custom,
            SplitMode::ByItems => ModeWire::ByItems,
        }
    }
}

impl From<ModeWire> for SplitMode {
    fn from(mode: ModeWire) -> Self {
        match mode {
            ModeWire::Equally => SplitMode::Equally,
            ModeWire::Custom => SplitMode::Custom,
            ModeWire::ByItems => SplitMode::ByItems,
        }
    }
}

impl PayloadWire {
    fn from_payload(payload: &SharePayload) -> Self {
        let participants = &payload.split.participants;
        let index_of = |id: &ParticipantId| participants.iter().position(|p| p.id == *id);

        let items = payload
            .receipt
            .items
            .iter()
            .map(|item| {
                let mut assigned: Vec<usize> = item.assigned.iter().filter_map(index_of).collect();
                assigned.sort_unstable();
                ItemWire {
                    l: item.label.clone(),
                    p: cents(item.price.unwrap_or(Money::ZERO)),
                    a: assigned,
                }
            })
            .collect();

        let receipt = &payload.receipt;
        Self {
            v: payload.version,
            r: ReceiptWire {
                t: receipt.title.clone(),
                at: receipt.created_at,
                st: cents(receipt.subtotal),
                f: cents(receipt.fees),
                tx: cents(receipt.tax),
                tp: cents(receipt.tip),
                d: cents(receipt.discount),
                tot: cents(receipt.total),
                i: items,
            },
            s: SplitWire {
                m: payload.split.mode.into(),
                p: participants
                    .iter()
                    .map(|participant| ParticipantWire {
                        n: participant.name.clone(),
                        o: cents(participant.owed),
                        me: participant.is_me,
                        inc: participant.is_included,
                        pay: participant.is_payer,
                    })
                    .collect(),
                u: cents(payload.split.unassigned_total),
                ui: payload.split.unassigned_items,
            },
        }
    }

    fn into_payload(self) -> Option<SharePayload> {
        if self.v != PAYLOAD_VERSION {
            tracing::debug!(version = self.v, "Unsupported share payload version");
            return None;
        }

        let participant_count = self.s.p.len();
        let participants: Vec<SummaryParticipant> = self
            .s
            .p
            .into_iter()
            .enumerate()
            .map(|(idx, wire)| SummaryParticipant {
                id: ParticipantId(idx as u64 + 1),
                name: wire.n,
                is_me: wire.me,
                is_included: wire.inc,
                is_payer: wire.pay,
                owed: Money::from_u64(wire.o),
            })
            .collect();

        let mut items = Vec::with_capacity(self.r.i.len());
        for (idx, wire) in self.r.i.into_iter().enumerate() {
            let mut item = Item::new(
                ItemId(idx as u64 + 1),
                wire.l,
                Some(Money::from_u64(wire.p)),
            );
            for participant in wire.a {
                if participant >= participant_count {
                    tracing::debug!(
                        item = idx,
                        participant,
                        "Share payload assignment out of range"
                    );
                    return None;
                }
                item.assigned.insert(ParticipantId(participant as u64 + 1));
            }
            items.push(item);
        }

        let mut receipt = Receipt::new(self.r.t, self.r.at);
        receipt.subtotal = Money::from_u64(self.r.st);
        receipt.fees = Money::from_u64(self.r.f);
        receipt.tax = Money::from_u64(self.r.tx);
        receipt.tip = Money::from_u64(self.r.tp);
        receipt.discount = Money::from_u64(self.r.d);
        receipt.total = Money::from_u64(self.r.tot);
        receipt.items = items;

        let allocated: Money = participants.iter().map(|p| p.owed).sum();
        let split = SplitSummary {
            title: receipt.title.clone(),
            mode: self.s.m.into(),
            participants,
            total: receipt.total,
            allocated,
            unallocated: receipt.total.saturating_sub(allocated),
            unassigned_total: Money::from_u64(self.s.u),
            unassigned_items: self.s.ui,
        };

        Some(SharePayload {
            version: self.v,
            receipt,
            split,
        })
    }
}

pub fn encode_payload(payload: &SharePayload) -> Result<String, ShareLinkError> {
    let json = serde_json::to_vec(&PayloadWire::from_payload(payload))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// `base` with the encoded payload appended as the `p` query parameter.
pub fn share_url(base: &str, payload: &SharePayload) -> Result<String, ShareLinkError> {
    let encoded = encode_payload(payload)?;
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{base}{separator}{QUERY_KEY}={encoded}"))
}

pub fn decode_payload(encoded: Option<&str>) -> Option<SharePayload> {
    let encoded = encoded.map(str::trim).filter(|value| !value.is_empty())?;
    let json = match URL_SAFE_NO_PAD.decode(encoded) {
        Ok(json) => json,
        Err(err) => {
            tracing::debug!(error = %err, "Share payload is not valid base64");
            return None;
        }
    };
    let wire: PayloadWire = match serde_json::from_slice(&json) {
        Ok(wire) => wire,
        Err(err) => {
            tracing::debug!(error = %err, "Share payload is not a valid split");
            return None;
        }
    };
    wire.into_payload()
}

/// Pulls the `p` parameter out of a share URL and decodes it.
pub fn decode_share_url(url: &str) -> Option<SharePayload> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let (_, query) = without_fragment.split_once('?')?;
    let value = query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == QUERY_KEY).then_some(value)
    });
    decode_payload(value)
}
