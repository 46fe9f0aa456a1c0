pub const CURRENCY_SYMBOL: &str = "R$";

pub fn format_amount(amount: f64) -> String {
    format!("{} {:.2}", CURRENCY_SYMBOL, amount)
}

/// Parses a user-typed amount. Accepts a comma as decimal separator.
/// Sign and range checks are left to the server.
pub fn parse_amount(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");

    if normalized.is_empty() {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|a| a.is_finite())
}
