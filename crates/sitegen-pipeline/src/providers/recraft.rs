//! Recraft image and SVG generation client
//!
//! One synchronous POST per generation; a fixed style tag distinguishes
//! vector requests from raster requests. Recraft answers in several payload
//! shapes, so `normalize_result` reduces them with explicit fallback chains
//! rather than ad hoc parsing at the call sites.

use crate::providers::{
    build_agent, error_message, is_success, parse_json_body, truncate, NormalizedResult,
};
use sitegen_core::{Result, SitegenError};

const RECRAFT_BASE_URL: &str = "https://external.api.recraft.ai/v1";
const VECTOR_STYLE: &str = "vector_illustration";
const IMAGE_STYLE: &str = "digital_illustration";
const SVG_SIZE: &str = "1024x1024";
const PAYLOAD_SNIPPET_LEN: usize = 360;

/// Recraft provider for image and SVG generation
pub struct RecraftClient {
    api_token: String,
    base_url: String,
}

impl RecraftClient {
    /// Create a client from the environment. Fails fast, before any
    /// network call, when the credential is absent.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("RECRAFT_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(SitegenError::MissingCredential("RECRAFT_API_TOKEN"))?;

        Ok(Self {
            api_token,
            base_url: RECRAFT_BASE_URL.to_string(),
        })
    }

    /// Generate vector art (logos, icons).
    pub fn generate_svg(&self, prompt: &str) -> Result<NormalizedResult> {
        self.generate(prompt, VECTOR_STYLE, SVG_SIZE)
    }

    /// Generate a raster marketing image at the given size (e.g. `1536x1024`).
    pub fn generate_image(&self, prompt: &str, size: &str) -> Result<NormalizedResult> {
        self.generate(prompt, IMAGE_STYLE, size)
    }

    fn generate(&self, prompt: &str, style: &str, size: &str) -> Result<NormalizedResult> {
        let payload = serde_json::json!({
            "prompt": prompt,
            "style": style,
            "response_format": "url",
            "size": size
        });

        let url = format!("{}/images/generations", self.base_url);
        let agent = build_agent();
        let mut response = agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .send_json(&payload)
            .map_err(|e| {
                SitegenError::ProviderError(format!("Recraft request failed: {}", e))
            })?;

        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string().map_err(|e| {
            SitegenError::ProviderError(format!("Failed to read Recraft response: {}", e))
        })?;

        let body = parse_json_body(&text, status, "Recraft")?;

        if !is_success(status) {
            let message = error_message(&body, "Unknown Recraft error");
            return Err(SitegenError::ProviderError(format!(
                "Recraft request failed ({}): {}",
                status, message
            )));
        }

        normalize_result(body)
    }
}

/// Reduce a raw Recraft payload to the normalized shape.
///
/// The result object is the first element of `data`, `output`, or `result`,
/// or the bare payload when none of those arrays is present. Field fallback
/// chains are ordered lists so new response variants can be added here
/// without touching call sites.
pub fn normalize_result(payload: serde_json::Value) -> Result<NormalizedResult> {
    let first = ["data", "output", "result"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(|v| v.get(0)))
        .unwrap_or(&payload);

    if !first.is_object() {
        return Err(SitegenError::ProviderError(format!(
            "Unexpected Recraft payload shape: {}",
            truncate(&payload.to_string(), PAYLOAD_SNIPPET_LEN)
        )));
    }

    let pick = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| first.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
    };

    Ok(NormalizedResult {
        url: pick(&["url", "image_url", "output_url"]),
        base64: pick(&["b64_json", "base64", "data"]),
        svg: pick(&["svg", "svg_text"]),
        mime_type: pick(&["mime_type", "mimeType"]),
        raw: first.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_data_array_url() {
        let payload = serde_json::json!({"data":[{"url":"https://x/y.png"}]});
        let result = normalize_result(payload).unwrap();
        assert_eq!(result.url.as_deref(), Some("https://x/y.png"));
        assert!(result.base64.is_none());
        assert!(result.svg.is_none());
    }

    #[test]
    fn test_normalize_output_and_result_arrays() {
        let payload = serde_json::json!({"output":[{"image_url":"https://x/a.png"}]});
        let result = normalize_result(payload).unwrap();
        assert_eq!(result.url.as_deref(), Some("https://x/a.png"));

        let payload = serde_json::json!({"result":[{"output_url":"https://x/b.png"}]});
        let result = normalize_result(payload).unwrap();
        assert_eq!(result.url.as_deref(), Some("https://x/b.png"));
    }

    #[test]
    fn test_normalize_bare_payload() {
        let payload = serde_json::json!({"svg":"<svg></svg>", "mime_type":"image/svg+xml"});
        let result = normalize_result(payload).unwrap();
        assert_eq!(result.svg.as_deref(), Some("<svg></svg>"));
        assert_eq!(result.mime_type.as_deref(), Some("image/svg+xml"));
        assert!(result.url.is_none());
    }

    #[test]
    fn test_normalize_base64_spellings() {
        let payload = serde_json::json!({"data":[{"b64_json":"QUJD"}]});
        assert_eq!(
            normalize_result(payload).unwrap().base64.as_deref(),
            Some("QUJD")
        );

        let payload = serde_json::json!({"data":[{"base64":"QUJD"}]});
        assert_eq!(
            normalize_result(payload).unwrap().base64.as_deref(),
            Some("QUJD")
        );
    }

    #[test]
    fn test_normalize_svg_text_fallback() {
        let payload = serde_json::json!({"data":[{"svg_text":"<svg/>"}]});
        assert_eq!(
            normalize_result(payload).unwrap().svg.as_deref(),
            Some("<svg/>")
        );
    }

    #[test]
    fn test_normalize_empty_data_falls_through() {
        // An empty `data` array has no first element, so the bare payload
        // (an object) is used as the result, with every field absent.
        let payload = serde_json::json!({"data": []});
        let result = normalize_result(payload).unwrap();
        assert!(result.url.is_none());
        assert!(result.svg.is_none());
    }

    #[test]
    fn test_normalize_non_object_fails_with_snippet() {
        let payload = serde_json::json!({"data": ["just-a-string"]});
        let err = normalize_result(payload).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Unexpected Recraft payload shape:"));
        assert!(message.contains("just-a-string"));
    }

    #[test]
    fn test_normalize_keeps_raw_result_object() {
        let payload = serde_json::json!({"data":[{"url":"https://x/y.png","extra":42}]});
        let result = normalize_result(payload).unwrap();
        assert_eq!(result.raw.get("extra"), Some(&serde_json::json!(42)));
    }
}
