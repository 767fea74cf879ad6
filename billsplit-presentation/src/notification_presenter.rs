use billsplit_i18n as i18n;
use billsplit_parser::{BudgetAlert, parse_budget_alert};
use rust_decimal::Decimal;
use std::borrow::Cow;

const DATE_FORMAT: &str = "%d/%m/%Y";
const CURRENCY_SUFFIX: &str = "₫";

pub struct NotificationPresenter;

impl NotificationPresenter {
    /// One-line summary of a budget alert, or `message` untouched when it
    /// does not follow the alert template.
    pub fn render(message: &str) -> Cow<'_, str> {
        match parse_budget_alert(message) {
            Ok(alert) => Cow::Owned(Self::summarize(&alert)),
            Err(err) => {
                tracing::debug!(error = %err, "Notification left unformatted");
                Cow::Borrowed(message)
            }
        }
    }

    pub fn summarize(alert: &BudgetAlert<'_>) -> String {
        i18n::budget_alert_summary(
            alert.category.icon,
            alert.category.name,
            format_vnd(alert.budget),
            format_vnd(alert.exceeded),
            alert.period.start.format(DATE_FORMAT),
            alert.period.end.format(DATE_FORMAT),
        )
    }
}

/// Vietnamese grouping: `.` between thousands, `,` before the fraction.
fn format_vnd(amount: Decimal) -> String {
    let text = amount.normalize().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", integer),
    };

    let mut formatted = String::with_capacity(text.len() + digits.len() / 3 + 4);
    formatted.push_str(sign);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(digit);
    }
    if let Some(fraction) = fraction {
        formatted.push(',');
        formatted.push_str(fraction);
    }
    formatted.push_str(CURRENCY_SUFFIX);
    formatted
}
