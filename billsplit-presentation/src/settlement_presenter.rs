use crate::text_table::{Alignment, TextTableBuilder, combine_sections};
use billsplit_application::MemberDirectory;
use billsplit_domain::{
    EventBalance, EventSettlement, Money, Settlement, SettlementContext, model::MemberId,
    services::RoundingMode,
};
use billsplit_i18n as i18n;
use std::borrow::Cow;

/// Renders computed settlements as terminal tables.
#[derive(Clone, Copy, Debug)]
pub struct SettlementPresenter {
    scale: u32,
}

pub struct SettlementView {
    pub balance_table: String,
    pub transfer_table: Option<String>,
}

impl Default for SettlementPresenter {
    fn default() -> Self {
        Self::new(SettlementContext::default().scale)
    }
}

impl SettlementPresenter {
    /// `scale` is the number of decimal places every amount is shown with.
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    pub fn render(&self, settlement: &EventSettlement) -> SettlementView {
        self.render_with_members(settlement, &EmptyMemberDirectory)
    }

    pub fn render_with_members(
        &self,
        settlement: &EventSettlement,
        member_directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let balance_table = self.build_balance_table(&settlement.balances, member_directory);
        let transfer_table = (!settlement.settlements.is_empty())
            .then(|| self.build_transfer_table(&settlement.settlements, member_directory));

        SettlementView {
            balance_table,
            transfer_table,
        }
    }

    /// Both tables under their headings, ready to print.
    pub fn render_text(
        &self,
        settlement: &EventSettlement,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let view = self.render_with_members(settlement, member_directory);
        let no_transfers = format!("{}\n", i18n::NO_SETTLEMENTS_NEEDED);
        let transfers = view.transfer_table.as_deref().unwrap_or(&no_transfers);

        combine_sections(&[
            (i18n::BALANCES_HEADING, view.balance_table.as_str()),
            (i18n::SETTLEMENTS_HEADING, transfers),
        ])
        .unwrap_or_default()
    }

    pub fn build_balance_table(
        &self,
        balances: &[EventBalance],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::MEMBER),
                Cow::Borrowed(i18n::PAID),
                Cow::Borrowed(i18n::SHOULD_PAY),
                Cow::Borrowed(i18n::BALANCE),
            ]);

        for row in balances {
            let sign = if row.balance.is_negative() { "" } else { "+" };
            builder = builder.row([
                format_member_label(row.member_id, member_directory),
                Cow::Owned(self.format_amount(row.paid)),
                Cow::Owned(self.format_amount(row.should_pay)),
                Cow::Owned(format!("{sign}{}", self.format_amount(row.balance))),
            ]);
        }

        builder.build()
    }

    pub fn build_transfer_table(
        &self,
        settlements: &[Settlement],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::FROM),
                Cow::Borrowed(i18n::TO),
                Cow::Borrowed(i18n::AMOUNT),
            ]);

        for settlement in settlements {
            builder = builder.row([
                format_member_label(settlement.from_member, member_directory),
                format_member_label(settlement.to_member, member_directory),
                Cow::Owned(self.format_amount(settlement.amount)),
            ]);
        }

        builder.build()
    }

    fn format_amount(&self, amount: Money) -> String {
        let rounded = amount.round_dp(self.scale, RoundingMode::HalfUp);
        format!("{:.prec$}", rounded.as_decimal(), prec = self.scale as usize)
    }
}

struct EmptyMemberDirectory;

impl MemberDirectory for EmptyMemberDirectory {
    fn display_name(&self, _member_id: MemberId) -> Option<&str> {
        None
    }
}

fn format_member_label<'a>(
    member_id: MemberId,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    match member_directory.display_name(member_id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(i18n::unknown_member(member_id.0)),
    }
}
