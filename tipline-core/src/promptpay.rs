//! PromptPay merchant-presented QR payloads.
//!
//! Builds the EMVCo TLV payload a banking app scans to pre-fill a transfer:
//! payload format indicator, point-of-initiation method (static for a
//! reusable code, dynamic when an amount is embedded), the Bank of Thailand
//! merchant template with the PromptPay application ID and the transfer
//! target, country and currency, the optional amount, and a
//! CRC-16/CCITT-FALSE checksum over everything before it.

use rust_decimal::Decimal;
use thiserror::Error;

const ID_PAYLOAD_FORMAT: &str = "00";
const ID_POI_METHOD: &str = "01";
const ID_MERCHANT_INFO_BOT: &str = "29";
const ID_TRANSACTION_CURRENCY: &str = "53";
const ID_TRANSACTION_AMOUNT: &str = "54";
const ID_COUNTRY_CODE: &str = "58";
const ID_CRC: &str = "63";

const PAYLOAD_FORMAT_EMV_MERCHANT: &str = "01";
const POI_METHOD_STATIC: &str = "11";
const POI_METHOD_DYNAMIC: &str = "12";

const TEMPLATE_ID_GUID: &str = "00";
const BOT_ID_PHONE_NUMBER: &str = "01";
const BOT_ID_TAX_ID: &str = "02";
const BOT_ID_EWALLET_ID: &str = "03";
const GUID_PROMPTPAY: &str = "A000000677010111";

const CURRENCY_THB: &str = "764";
const COUNTRY_TH: &str = "TH";

/// Errors from [`build_payload`].
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    /// The transfer target contained no digits at all.
    #[error("PromptPay target contains no digits")]
    EmptyTarget,

    /// The embedded amount was zero or negative.
    #[error("PromptPay amount must be positive, got {0}")]
    InvalidAmount(Decimal),
}

/// Build the payload string for a PromptPay target.
///
/// `target` may be a mobile number (any punctuation tolerated), a 13-digit
/// national/tax ID, or a 15-digit e-wallet ID. With `amount` the code is
/// dynamic (single-use, amount pre-filled); without, it is static.
pub fn build_payload(target: &str, amount: Option<Decimal>) -> Result<String, PayloadError> {
    let digits: String = target.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(PayloadError::EmptyTarget);
    }

    let merchant_info = match digits.len() {
        n if n >= 15 => field(BOT_ID_EWALLET_ID, &digits),
        n if n >= 13 => field(BOT_ID_TAX_ID, &digits),
        _ => field(BOT_ID_PHONE_NUMBER, &format_phone_target(&digits)),
    };

    let poi_method = if amount.is_some() {
        POI_METHOD_DYNAMIC
    } else {
        POI_METHOD_STATIC
    };

    let mut payload = String::new();
    payload.push_str(&field(ID_PAYLOAD_FORMAT, PAYLOAD_FORMAT_EMV_MERCHANT));
    payload.push_str(&field(ID_POI_METHOD, poi_method));
    payload.push_str(&field(
        ID_MERCHANT_INFO_BOT,
        &format!("{}{merchant_info}", field(TEMPLATE_ID_GUID, GUID_PROMPTPAY)),
    ));
    payload.push_str(&field(ID_COUNTRY_CODE, COUNTRY_TH));
    payload.push_str(&field(ID_TRANSACTION_CURRENCY, CURRENCY_THB));

    if let Some(amount) = amount {
        if amount <= Decimal::ZERO {
            return Err(PayloadError::InvalidAmount(amount));
        }
        let rounded = amount.round_dp(2);
        payload.push_str(&field(ID_TRANSACTION_AMOUNT, &format!("{rounded:.2}")));
    }

    // The CRC covers everything up to and including its own id + length.
    payload.push_str(ID_CRC);
    payload.push_str("04");
    let crc = crc16_ccitt_false(payload.as_bytes());
    payload.push_str(&format!("{crc:04X}"));

    Ok(payload)
}

/// One TLV field: two-digit id, two-digit length, value.
fn field(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

/// Mobile numbers go on the wire in the `0066…` international form:
/// the leading zero becomes the country code, zero-padded to 13 digits.
fn format_phone_target(digits: &str) -> String {
    let international = match digits.strip_prefix('0') {
        Some(rest) => format!("66{rest}"),
        None => digits.to_owned(),
    };
    format!("{international:0>13}")
}

/// CRC-16/CCITT-FALSE: polynomial 0x1021, initial value 0xFFFF,
/// no reflection, no final xor.
fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn crc_matches_the_reference_check_value() {
        // Standard CRC-16/CCITT-FALSE check input.
        assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
    }

    #[test]
    fn static_payload_for_a_mobile_number() {
        let payload = build_payload("081-540-4297", None).unwrap();

        assert!(payload.starts_with("000201010211"));
        assert!(payload.contains("29370016A000000677010111011300668154042975802TH5303764"));

        // Trailing CRC is consistent with the body it covers.
        let (body, crc) = payload.split_at(payload.len() - 4);
        assert_eq!(crc, format!("{:04X}", crc16_ccitt_false(body.as_bytes())));
    }

    #[test]
    fn dynamic_payload_embeds_a_two_decimal_amount() {
        let payload = build_payload("0815404297", Some(dec("50.1"))).unwrap();

        assert!(payload.starts_with("000201010212"));
        assert!(payload.contains("540550.10"));
    }

    #[test]
    fn amount_is_rounded_to_satang() {
        let payload = build_payload("0815404297", Some(dec("99.999"))).unwrap();
        assert!(payload.contains("5406100.00"));
    }

    #[test]
    fn thirteen_digits_are_treated_as_a_tax_id() {
        let payload = build_payload("1-2345-67890-12-3", None).unwrap();
        assert!(payload.contains("02131234567890123"));
    }

    #[test]
    fn garbage_targets_are_rejected() {
        assert_eq!(build_payload("not a number", None), Err(PayloadError::EmptyTarget));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert_eq!(
            build_payload("0815404297", Some(Decimal::ZERO)),
            Err(PayloadError::InvalidAmount(Decimal::ZERO))
        );
    }
}
