/*
 * Responsibility
 * - PUT /inventory/{id} の request DTO
 * - `updatedQtty` は数値でも数値文字列でも受け付ける（先頭の整数部分を採用）
 */
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(rename = "updatedQtty")]
    pub updated_qtty: Value,
}

impl UpdateQuantityRequest {
    pub fn quantity(&self) -> Result<i64, &'static str> {
        match &self.updated_qtty {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or("updatedQtty is out of range"),
            Value::String(s) => leading_integer(s).ok_or("updatedQtty must be an integer"),
            _ => Err("updatedQtty must be an integer"),
        }
    }
}

// "12 boxes" -> 12, " -3" -> -3, "abc" -> None
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
