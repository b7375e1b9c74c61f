//! 展示用格式化：金额、日期、账号掩码、账单到期
//!
//! 日期按 RFC 3339 解析，也接受不带时区的日期时间与纯日期（按 UTC 处理），解析失败显示 "Invalid date"。涉及「现在」的函数都显式传入 now，方便测试。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::banking::{Bill, BillStatus, TransactionType};

const INVALID_DATE: &str = "Invalid date";

/// 美元金额，两位小数、千分位："$1,234.50"
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

fn parse(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(date) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(d.and_utc());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// "Oct 20, 2024"
pub fn format_date(date: &str) -> String {
    parse(date)
        .map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// "Oct 20, 2024 10:30"
pub fn format_date_time(date: &str) -> String {
    parse(date)
        .map(|d| d.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// Today / Yesterday / "N days ago"，一周以上显示日期
pub fn format_relative_time(date: &str, now: DateTime<Utc>) -> String {
    let Some(parsed) = parse(date) else {
        return INVALID_DATE.to_string();
    };
    match (now - parsed).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if (2..7).contains(&d) => format!("{} days ago", d),
        _ => format_date(date),
    }
}

/// 只露后 4 位："****3456"
pub fn format_account_number(account_number: &str) -> String {
    let chars: Vec<char> = account_number.chars().collect();
    if chars.len() <= 4 {
        return account_number.to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

pub fn transaction_symbol(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Credit => "+",
        TransactionType::Debit => "-",
    }
}

/// 距到期的天数（向上取整；已过期为负）。日期无法解析时返回 None
pub fn days_until_due(due_date: &str, now: DateTime<Utc>) -> Option<i64> {
    let due = parse(due_date)?;
    let ms = (due - now).num_milliseconds();
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    Some(ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0))
}

/// 待缴且 3 天内到期
pub fn is_bill_urgent(bill: &Bill, now: DateTime<Utc>) -> bool {
    bill.status == BillStatus::Pending
        && days_until_due(&bill.due_date, now).is_some_and(|d| d <= 3)
}

/// "N days overdue" / "Due today" / "Due in N days"
pub fn bill_due_label(bill: &Bill, now: DateTime<Utc>) -> String {
    let Some(days) = days_until_due(&bill.due_date, now) else {
        return INVALID_DATE.to_string();
    };
    if bill.status == BillStatus::Overdue {
        format!("{} days overdue", days.abs())
    } else if days <= 0 {
        "Due today".to_string()
    } else {
        format!("Due in {} days", days)
    }
}

/// 按到期日升序；无法解析的排在最后
pub fn sort_bills_by_due(bills: &[Bill]) -> Vec<Bill> {
    let mut sorted = bills.to_vec();
    sorted.sort_by_key(|b| parse(&b.due_date).map_or(i64::MAX, |d| d.timestamp_millis()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::fixtures;

    fn now() -> DateTime<Utc> {
        parse("2024-11-03T12:00:00Z").unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(8750.0), "$8,750.00");
        assert_eq!(format_currency(125.5), "$125.50");
        assert_eq!(format_currency(2_000_000.0), "$2,000,000.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-45.0), "-$45.00");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date("2024-10-20T10:30:00Z"), "Oct 20, 2024");
        assert_eq!(format_date_time("2024-10-20T10:30:00Z"), "Oct 20, 2024 10:30");
        assert_eq!(format_date("yesterday"), "Invalid date");
    }

    #[test]
    fn test_dates_without_timezone() {
        assert_eq!(format_date("2024-11-15"), "Nov 15, 2024");
        assert_eq!(format_date("2024-11-15T10:00:00"), "Nov 15, 2024");
        assert_eq!(format_date_time("2024-11-15T10:00:00"), "Nov 15, 2024 10:00");
        assert_eq!(format_date_time("2024-11-15T10:00:00.250"), "Nov 15, 2024 10:00");
        assert_eq!(format_date("2024-13-40"), "Invalid date");
    }

    #[test]
    fn test_plain_due_dates_keep_urgency_and_order() {
        let mut bills = fixtures::bills();
        bills[2].due_date = "2024-11-04".to_string();
        bills[1].due_date = "2024-11-05T10:00:00".to_string();

        assert_eq!(days_until_due("2024-11-04", now()), Some(1));
        assert!(is_bill_urgent(&bills[2], now()));
        assert_eq!(bill_due_label(&bills[2], now()), "Due in 1 days");
        assert!(is_bill_urgent(&bills[1], now()));

        let ids: Vec<String> = sort_bills_by_due(&bills).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_relative_time() {
        assert_eq!(format_relative_time("2024-11-03T08:00:00Z", now()), "Today");
        assert_eq!(format_relative_time("2024-11-02T08:00:00Z", now()), "Yesterday");
        assert_eq!(format_relative_time("2024-10-30T12:00:00Z", now()), "4 days ago");
        assert_eq!(format_relative_time("2024-10-20T10:30:00Z", now()), "Oct 20, 2024");
    }

    #[test]
    fn test_account_mask() {
        assert_eq!(format_account_number("1234567890123456"), "****3456");
        assert_eq!(format_account_number("4567"), "4567");
    }

    #[test]
    fn test_bill_urgency_and_labels() {
        let bills = fixtures::bills();
        // 电费 11-05 到期：3 天内且待缴，紧急
        assert!(is_bill_urgent(&bills[0], now()));
        assert_eq!(bill_due_label(&bills[0], now()), "Due in 3 days");
        assert!(!is_bill_urgent(&bills[1], now()));
        assert_eq!(bill_due_label(&bills[1], now()), "Due in 10 days");

        let mut overdue = bills[2].clone();
        overdue.status = BillStatus::Overdue;
        let later = parse("2024-11-20T12:00:00Z").unwrap();
        assert_eq!(bill_due_label(&overdue, later), "4 days overdue");
        assert!(!is_bill_urgent(&overdue, later));

        let due_day = parse("2024-11-16T00:00:00Z").unwrap();
        assert_eq!(bill_due_label(&bills[2], due_day), "Due today");
    }

    #[test]
    fn test_sort_bills() {
        let mut bills = fixtures::bills();
        bills.reverse();
        let sorted = sort_bills_by_due(&bills);
        let ids: Vec<&str> = sorted.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
