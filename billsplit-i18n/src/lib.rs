#[cfg(all(feature = "vi", feature = "en"))]
compile_error!("Cannot enable both 'vi' and 'en' features at the same time");

#[cfg(feature = "vi")]
pub mod strings {
    pub const MEMBER: &str = "Thành viên";
    pub const PAID: &str = "Đã trả";
    pub const SHOULD_PAY: &str = "Phải trả";
    pub const BALANCE: &str = "Số dư";
    pub const FROM: &str = "Người trả";
    pub const TO: &str = "Người nhận";
    pub const AMOUNT: &str = "Số tiền";
    pub const BALANCES_HEADING: &str = "Số dư";
    pub const SETTLEMENTS_HEADING: &str = "Thanh toán";
    pub const NO_SETTLEMENTS_NEEDED: &str = "Không cần thanh toán.";
    pub const SETTLEMENT_CALCULATION_FAILED: &str = "Tính toán thanh toán thất bại";
}

#[cfg(not(feature = "vi"))]
pub mod strings {
    pub const MEMBER: &str = "Member";
    pub const PAID: &str = "Paid";
    pub const SHOULD_PAY: &str = "Should pay";
    pub const BALANCE: &str = "Balance";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const BALANCES_HEADING: &str = "Balances";
    pub const SETTLEMENTS_HEADING: &str = "Settlements";
    pub const NO_SETTLEMENTS_NEEDED: &str = "No settlements needed.";
    pub const SETTLEMENT_CALCULATION_FAILED: &str = "Settlement calculation failed";
}

pub use strings::*;

#[cfg(feature = "vi")]
pub fn unknown_member(id: u64) -> String {
    format!("Thành viên #{id}")
}

#[cfg(not(feature = "vi"))]
pub fn unknown_member(id: u64) -> String {
    format!("Member #{id}")
}

#[cfg(feature = "vi")]
pub fn budget_alert_summary(
    icon: impl std::fmt::Display,
    category: impl std::fmt::Display,
    budget: impl std::fmt::Display,
    exceeded: impl std::fmt::Display,
    start: impl std::fmt::Display,
    end: impl std::fmt::Display,
) -> String {
    format!("{icon} {category}: vượt {exceeded} so với ngân sách {budget} ({start} - {end})")
}

#[cfg(not(feature = "vi"))]
pub fn budget_alert_summary(
    icon: impl std::fmt::Display,
    category: impl std::fmt::Display,
    budget: impl std::fmt::Display,
    exceeded: impl std::fmt::Display,
    start: impl std::fmt::Display,
    end: impl std::fmt::Display,
) -> String {
    format!("{icon} {category}: {exceeded} over the {budget} budget ({start} - {end})")
}
