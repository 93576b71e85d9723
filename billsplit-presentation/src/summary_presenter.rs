use crate::{
    labels::participant_label,
    svg_table::{Alignment, RenderedTable, RowStyle, SvgTable, stack},
};
use billsplit_domain::{
    Item, Money, Receipt, SplitMode, SplitSummary, SummaryParticipant, percentage_of,
};
use billsplit_i18n as i18n;
use std::borrow::Cow;

pub struct SummaryPresenter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryView {
    pub caption: String,
    pub table_svg: String,
}

impl SummaryPresenter {
    pub fn render(summary: &SplitSummary, local_name: &str) -> SummaryView {
        let table = Self::participants_table(summary, local_name);
        SummaryView {
            caption: Self::caption(summary),
            table_svg: table.map(|table| table.to_svg()).unwrap_or_default(),
        }
    }

    /// Like [`SummaryPresenter::render`], with the receipt's items stacked
    /// under the participants when the split was made by items.
    pub fn render_with_items(
        summary: &SplitSummary,
        receipt: &Receipt,
        local_name: &str,
    ) -> SummaryView {
        let mut tables: Vec<RenderedTable> =
            Self::participants_table(summary, local_name).into_iter().collect();
        if summary.mode == SplitMode::ByItems {
            tables.extend(Self::items_table(summary, receipt, local_name));
        }
        SummaryView {
            caption: Self::caption(summary),
            table_svg: stack(&tables)
                .map(|table| table.to_svg())
                .unwrap_or_default(),
        }
    }

    pub fn caption(summary: &SplitSummary) -> String {
        let total = summary.total.to_string();
        i18n::split_caption(&summary.title, &total, mode_label(summary.mode)).to_string()
    }

    fn participants_table(summary: &SplitSummary, local_name: &str) -> Option<RenderedTable> {
        let mut table = SvgTable::new()
            .column(i18n::PARTICIPANT, Alignment::Left)
            .column(i18n::OWES, Alignment::Right)
            .column(i18n::SHARE, Alignment::Right);

        for (idx, participant) in summary.participants.iter().enumerate() {
            let style = if participant.is_payer {
                RowStyle::Highlight
            } else if !participant.is_included {
                RowStyle::Muted
            } else {
                RowStyle::Plain
            };
            table = table.styled_row(
                [
                    row_label(participant, idx + 1, local_name),
                    participant.owed.to_string(),
                    format_percentage(participant.owed, summary.total),
                ],
                style,
            );
        }

        if summary.unallocated.is_positive() {
            table = table.styled_row(
                [
                    i18n::UNALLOCATED.to_owned(),
                    summary.unallocated.to_string(),
                    format_percentage(summary.unallocated, summary.total),
                ],
                RowStyle::Muted,
            );
        }

        table = table.styled_row(
            [
                Cow::Borrowed(i18n::TOTAL),
                Cow::Owned(summary.total.to_string()),
                Cow::Borrowed(""),
            ],
            RowStyle::Footer,
        );

        table.render()
    }

    fn items_table(
        summary: &SplitSummary,
        receipt: &Receipt,
        local_name: &str,
    ) -> Option<RenderedTable> {
        if receipt.items.is_empty() {
            return None;
        }

        let mut table = SvgTable::new()
            .column(i18n::ITEM, Alignment::Left)
            .column(i18n::PRICE, Alignment::Right)
            .column(i18n::SHARED_BY, Alignment::Left);
        for item in &receipt.items {
            let style = if item.assigned.is_empty() {
                RowStyle::Muted
            } else {
                RowStyle::Plain
            };
            table = table.styled_row(
                [
                    item.label.clone(),
                    item.price.unwrap_or(Money::ZERO).to_string(),
                    shared_by(item, summary, local_name),
                ],
                style,
            );
        }
        table.render()
    }
}

fn mode_label(mode: SplitMode) -> &'static str {
    match mode {
        SplitMode::Equally => i18n::MODE_EQUALLY,
        SplitMode::Custom => i18n::MODE_CUSTOM,
        SplitMode::ByItems => i18n::MODE_BY_ITEMS,
    }
}

fn row_label(participant: &SummaryParticipant, position: usize, local_name: &str) -> String {
    let mut label = participant_label(participant, position, local_name);
    if participant.is_payer {
        label.push(' ');
        label.push_str(i18n::PAID_MARKER);
    }
    if !participant.is_included {
        label.push(' ');
        label.push_str(i18n::EXCLUDED_MARKER);
    }
    label
}

fn shared_by(item: &Item, summary: &SplitSummary, local_name: &str) -> String {
    if item.assigned.is_empty() {
        return i18n::UNASSIGNED.to_owned();
    }

    let included = summary
        .participants
        .iter()
        .filter(|participant| participant.is_included);
    let everyone = included.clone().count() > 1
        && included
            .clone()
            .all(|participant| item.assigned.contains(&participant.id));
    if everyone {
        return i18n::EVERYONE.to_owned();
    }

    summary
        .participants
        .iter()
        .enumerate()
        .filter(|(_, participant)| item.assigned.contains(&participant.id))
        .map(|(idx, participant)| participant_label(participant, idx + 1, local_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_percentage(part: Money, total: Money) -> String {
    format!("{:.1}%", percentage_of(part, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsplit_domain::{DraftConfig, DraftEvent, ParticipantId, SplitDraft};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn receipt(total: i64) -> Receipt {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 19, 30, 0)
            .single()
            .expect("valid timestamp");
        let mut receipt = Receipt::new("Taqueria", created_at);
        receipt.total = Money::from_cents(total);
        receipt
    }

    fn draft(total: i64, party_size: usize) -> SplitDraft {
        let config = DraftConfig {
            party_size,
            ..DraftConfig::default()
        };
        SplitDraft::new(receipt(total), &config)
    }

    #[test]
    fn equal_split_caption_and_rows() {
        let (_, summary) = draft(1000, 3).finalize();

        let view = SummaryPresenter::render(&summary, "");

        assert_eq!(view.caption, "Taqueria: $10.00 split equally");
        assert!(view.table_svg.contains(">Me (paid)</text>"));
        assert!(view.table_svg.contains(">Guest 2</text>"));
        assert!(view.table_svg.contains(">$3.34</text>"));
        assert!(view.table_svg.contains(">33.4%</text>"));
        assert!(view.table_svg.contains(">Total</text>"));
        assert!(!view.table_svg.contains(">Unallocated</text>"));
    }

    #[test]
    fn local_name_replaces_me() {
        let (_, summary) = draft(1000, 2).finalize();
        let view = SummaryPresenter::render(&summary, "Robin");
        assert!(view.table_svg.contains(">Robin (paid)</text>"));
    }

    #[test]
    fn custom_split_shows_unallocated_remainder() {
        let draft = draft(1000, 2)
            .apply(DraftEvent::SelectMode(SplitMode::Custom))
            .apply(DraftEvent::SetCustomAmount {
                participant: ParticipantId(2),
                amount: Money::from_cents(700),
            });
        let (_, summary) = draft.finalize();

        let view = SummaryPresenter::render(&summary, "");

        assert_eq!(view.caption, "Taqueria: $10.00 split by custom amounts");
        assert!(view.table_svg.contains(">Unallocated</text>"));
        assert!(view.table_svg.contains(">$3.00</text>"));
        assert!(view.table_svg.contains(">70.0%</text>"));
    }

    #[test]
    fn excluded_participants_are_marked() {
        let draft = draft(900, 3).apply(DraftEvent::SetIncluded {
            participant: ParticipantId(3),
            included: false,
        });
        let (_, summary) = draft.finalize();

        let view = SummaryPresenter::render(&summary, "");

        assert!(view.table_svg.contains(">Guest 3 (not splitting)</text>"));
        assert!(view.table_svg.contains(">$4.50</text>"));
    }

    #[test]
    fn by_items_stacks_item_table() {
        let draft = draft(0, 2)
            .apply(DraftEvent::SelectMode(SplitMode::ByItems))
            .apply(DraftEvent::AddItem {
                label: "Tacos".to_owned(),
                price: "12.00".to_owned(),
            })
            .apply(DraftEvent::AddItem {
                label: "Horchata".to_owned(),
                price: "3.00".to_owned(),
            });
        let tacos = draft.items()[0].id;
        let draft = draft.apply(DraftEvent::AssignToEveryone(tacos));
        let (receipt, summary) = draft.finalize();

        let view = SummaryPresenter::render_with_items(&summary, &receipt, "");

        assert_eq!(view.caption, "Taqueria: $15.00 split by items");
        assert!(view.table_svg.contains(">Everyone</text>"));
        assert!(view.table_svg.contains(">Unassigned</text>"));
        assert!(view.table_svg.contains(">Horchata</text>"));
        assert!(view.table_svg.contains("translate("));
    }

    #[test]
    fn items_are_not_stacked_outside_by_items() {
        let mut source = receipt(1500);
        source.items.push(Item::new(
            billsplit_domain::ItemId(1),
            "Tacos",
            Some(Money::from_cents(1500)),
        ));
        let (receipt, summary) = SplitDraft::new(source, &DraftConfig::default()).finalize();

        let view = SummaryPresenter::render_with_items(&summary, &receipt, "");

        assert!(!view.table_svg.contains(">Tacos</text>"));
        assert!(!view.table_svg.contains("translate("));
        assert_eq!(view, SummaryPresenter::render(&summary, ""));
    }

    #[rstest]
    #[case::third(334, 1000, "33.4%")]
    #[case::half_rounds_away(5, 1000, "0.5%")]
    #[case::whole(500, 1000, "50.0%")]
    #[case::zero_total(0, 0, "0.0%")]
    fn percentages(#[case] part: i64, #[case] total: i64, #[case] expected: &str) {
        assert_eq!(
            format_percentage(Money::from_cents(part), Money::from_cents(total)),
            expected
        );
    }
}
