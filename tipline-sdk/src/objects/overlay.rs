//! Frames pushed to overlay viewers and the overlay appearance config.
//!
//! The `GET /overlay/ws` endpoint upgrades to a WebSocket and pushes
//! [`OverlayFrame`] JSON frames to every connected viewer (OBS browser
//! sources, the dashboard, the donor page).
//!
//! # Protocol
//!
//! 1. Alert frames (`donate`, `alert_repeat`, `alert_test`) come out of the
//!    server's paced queue — one at a time, never overlapping on screen.
//! 2. `config_update` and `payment_done` are pushed immediately, outside
//!    the pacing queue.
//! 3. The server never reads frames from the client; anything received is
//!    ignored except a close frame.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-to-viewer WebSocket frame.
///
/// Serialized as an internally-tagged JSON object so the overlay can
/// dispatch on the `"type"` field:
///
/// ```json
/// {"type":"donate","name":"Alice","amount":"50.1","comment":"go team","time":"2026-08-06T12:00:00Z"}
/// {"type":"config_update","config":{ ... }}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayFrame {
    /// A confirmed donation alert (paced).
    Donate {
        name: String,
        amount: Decimal,
        comment: String,
        /// When the donation was confirmed.
        #[serde(with = "time::serde::rfc3339")]
        time: time::OffsetDateTime,
    },

    /// A past alert replayed from the dashboard (paced).
    AlertRepeat {
        name: String,
        amount: Decimal,
        comment: String,
    },

    /// An appearance-preview alert from the customization page (paced).
    AlertTest {
        name: String,
        amount: Decimal,
        comment: String,
        color: String,
        effect: String,
    },

    /// The overlay appearance config changed (immediate).
    ConfigUpdate { config: OverlayConfig },

    /// A donor's pending payment was matched (immediate); lets the donor
    /// page close the QR code without waiting for the alert queue.
    PaymentDone { name: String, amount: Decimal },
}

impl OverlayFrame {
    /// The wire tag of this frame, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayFrame::Donate { .. } => "donate",
            OverlayFrame::AlertRepeat { .. } => "alert_repeat",
            OverlayFrame::AlertTest { .. } => "alert_test",
            OverlayFrame::ConfigUpdate { .. } => "config_update",
            OverlayFrame::PaymentDone { .. } => "payment_done",
        }
    }
}

/// Overlay appearance settings, editable from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Alert sound file served from the overlay assets.
    #[serde(default = "default_sound")]
    pub sound: String,
    /// Popup image shown with each alert.
    #[serde(default = "default_popup_image")]
    pub popup_image: String,
    /// Accent color as a CSS hex string.
    #[serde(default = "default_color")]
    pub color: String,
    /// Entry animation name.
    #[serde(default = "default_animation")]
    pub animation: String,
    /// Donations below this amount are shown without sound.
    #[serde(default = "default_min_amount")]
    pub min_amount: Decimal,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            sound: default_sound(),
            popup_image: default_popup_image(),
            color: default_color(),
            animation: default_animation(),
            min_amount: default_min_amount(),
        }
    }
}

fn default_sound() -> String {
    "alert.mp3".to_owned()
}

fn default_popup_image() -> String {
    "images/default.png".to_owned()
}

fn default_color() -> String {
    "#69eaff".to_owned()
}

fn default_animation() -> String {
    "pop".to_owned()
}

fn default_min_amount() -> Decimal {
    Decimal::from(10)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn frames_carry_a_type_tag() {
        let frame = OverlayFrame::PaymentDone {
            name: "Alice".to_owned(),
            amount: Decimal::new(501, 1),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "payment_done");
        assert_eq!(json["name"], "Alice");
    }

    #[test]
    fn overlay_config_fills_missing_fields_with_defaults() {
        let config: OverlayConfig = serde_json::from_str(r##"{"color":"#ff0000"}"##).unwrap();
        assert_eq!(config.color, "#ff0000");
        assert_eq!(config.sound, "alert.mp3");
        assert_eq!(config.min_amount, Decimal::from(10));
    }
}
