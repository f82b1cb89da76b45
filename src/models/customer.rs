/// Customer IDs are canonically 10 digits without dashes.
const CUSTOMER_ID_LEN: usize = 10;

/// Strip every non-digit and left-pad with zeros to 10 characters.
///
/// `"123-456-7890"` becomes `"1234567890"` and `"42"` becomes `"0000000042"`.
/// Longer inputs are kept whole rather than truncated.
pub fn normalize_customer_id(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{:0>width$}", digits, width = CUSTOMER_ID_LEN)
}
