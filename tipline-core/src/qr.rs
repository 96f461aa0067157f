//! QR code rendering for payment payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;
use thiserror::Error;

/// Errors from [`render_data_url`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// Render a payload as an SVG QR code wrapped in a base64 data URL.
///
/// Deterministic for a given payload; a failure aborts only the one
/// request-creation attempt that asked for it.
pub fn render_data_url(payload: &str) -> Result<String, RenderError> {
    let code = QrCode::new(payload.as_bytes())?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn renders_a_data_url() {
        let url = render_data_url("00020101021129370016A000000677010111").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_data_url("same payload").unwrap();
        let b = render_data_url("same payload").unwrap();
        assert_eq!(a, b);
    }
}
