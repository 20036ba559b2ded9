//! Template filters for cadastral values

use std::collections::HashMap;
use tera::{Tera, Value};

/// Register every filter on a Tera instance
pub fn register(tera: &mut Tera) {
    tera.register_filter("moneda", money);
    tera.register_filter("metros", square_meters);
}

/// `{{ impuesto.suma | moneda }}` renders `1234.5` as `$1,234.50`
pub fn money(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::Number(n) => {
            let amount = n
                .as_f64()
                .ok_or_else(|| tera::Error::msg(format!("moneda: {} is not representable", n)))?;
            Ok(Value::String(format_money(amount)))
        }
        other => Err(tera::Error::msg(format!(
            "moneda: expected a number, got {}",
            other
        ))),
    }
}

/// `{{ terreno.metros_terreno_propio | metros }}` renders `120.5` as `120.50 m²`
pub fn square_meters(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::Number(n) => {
            let area = n
                .as_f64()
                .ok_or_else(|| tera::Error::msg(format!("metros: {} is not representable", n)))?;
            Ok(Value::String(format!("{:.2} m²", area)))
        }
        other => Err(tera::Error::msg(format!(
            "metros: expected a number, got {}",
            other
        ))),
    }
}

pub fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}
