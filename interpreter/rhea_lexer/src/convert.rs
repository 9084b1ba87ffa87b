//! Numeric literal image to IEEE-754 double conversion.
//!
//! Multi-base integer literals (`0b`, `0t`, `0c`, `0x`) are expanded digit
//! by digit; everything else goes through the standard float parser.

fn digit_value(ch: char) -> Option<u32> {
    if ch.is_ascii_digit() {
        Some(ch as u32 - '0' as u32)
    } else if ch.is_ascii_alphabetic() {
        Some(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 10)
    } else {
        None
    }
}

fn parse_radix(digits: &str, base: u32, image: &str, what: &str) -> Result<f64, String> {
    if digits.is_empty() {
        return Err(format!("Invalid {what} literal: '{image}'"));
    }

    let mut value = 0.0_f64;
    for ch in digits.chars() {
        let digit = digit_value(ch).filter(|&d| d < base);
        match digit {
            Some(d) => value = value * f64::from(base) + f64::from(d),
            None => return Err(format!("Invalid {what} literal: '{image}'")),
        }
    }
    Ok(value)
}

/// Convert a digit-token image to its numeric value.
pub fn translate_digit(image: &str) -> Result<f64, String> {
    if image.is_empty() {
        return Err("Empty numeric literal".to_string());
    }

    if let Some(digits) = image.strip_prefix("0b") {
        return parse_radix(digits, 2, image, "binary");
    }
    if let Some(digits) = image.strip_prefix("0t") {
        return parse_radix(digits, 3, image, "trinary");
    }
    if let Some(digits) = image.strip_prefix("0c") {
        return parse_radix(digits, 8, image, "octal");
    }
    if let Some(digits) = image.strip_prefix("0x") {
        return parse_radix(digits, 16, image, "hexadecimal");
    }

    image
        .parse::<f64>()
        .map_err(|_| format!("Invalid numeric literal: '{image}'"))
}
