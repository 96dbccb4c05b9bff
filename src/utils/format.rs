use chrono::{Datelike, NaiveDateTime, Timelike};

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// 以美元格式顯示金額，例如 `$1,045.50`；無法解析時原樣回傳
pub fn format_currency(amount: &str) -> String {
    let value: f64 = match amount.trim().parse() {
        Ok(v) => v,
        Err(_) => return amount.to_string(),
    };

    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        fraction
    )
}

/// 西班牙文長日期，例如 `1 de junio de 2025, 10:00`
pub fn format_date(date: &NaiveDateTime) -> String {
    format!(
        "{} de {} de {}, {:02}:{:02}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year(),
        date.hour(),
        date.minute()
    )
}
