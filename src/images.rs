use crate::errors::ImageError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::LazyLock;

/// Quick picks offered next to the discount value input.
pub const DISCOUNT_PRESETS: [&str; 4] = ["2x1", "3x2", "15%", "30%"];

const PRESET_PALETTE: [(&str, &str, &str); 4] = [
    ("#18b7c9", "#ff7a7a", "#fff"),
    ("#18b7c9", "#ffd36a", "#fff"),
    ("#18b7c9", "#9bffb0", "#fff"),
    ("#18b7c9", "#b9b9ff", "#fff"),
];

static PRESET_IMAGES: LazyLock<Vec<String>> = LazyLock::new(|| {
    PRESET_PALETTE
        .iter()
        .map(|(background, accent, body)| {
            format!(
                "data:image/svg+xml;utf8,{}",
                urlencoding::encode(&storefront_svg(background, accent, body))
            )
        })
        .collect()
});

pub fn preset_images() -> &'static [String] {
    &PRESET_IMAGES
}

pub fn preset_image(index: usize) -> Option<&'static str> {
    PRESET_IMAGES.get(index).map(String::as_str)
}

pub fn default_image() -> String {
    PRESET_IMAGES[0].clone()
}

fn storefront_svg(background: &str, accent: &str, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="128" height="128">
    <rect width="128" height="128" rx="24" fill="{background}"/>
    <rect x="20" y="48" width="88" height="60" rx="12" fill="{body}"/>
    <rect x="20" y="32" width="88" height="20" rx="10" fill="{accent}"/>
    <rect x="30" y="60" width="30" height="24" fill="{accent}"/>
    <rect x="66" y="60" width="32" height="40" fill="{accent}"/>
  </svg>"#
    )
}

/// Builds an embeddable `data:` URI for an uploaded image.
pub fn data_uri(content_type: &str, bytes: &[u8]) -> Result<String, ImageError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(ImageError::UnsupportedType(content_type.to_string()));
    }
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

pub async fn ingest(content_type: String, bytes: Vec<u8>) -> Result<String, ImageError> {
    tokio::task::spawn_blocking(move || data_uri(&content_type, &bytes))
        .await
        .map_err(|err| ImageError::Interrupted(err.to_string()))?
}
