//! Persisting generated payloads into the public content directory
//!
//! Each job writes to its own file stem, so concurrent jobs never contend
//! on a path. Returned paths are public-facing: forward-slash separated and
//! rooted at the public directory (`/generated/hero-image.png`).

use crate::providers::runway::CompletedTask;
use crate::providers::{build_agent, is_success, NormalizedResult};
use crate::svg::post_process_svg;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sitegen_core::{Result, SitegenError};
use std::path::{Path, PathBuf};

/// Byte-prefix signatures checked top to bottom; `.png` is the fallback.
const IMAGE_SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x89, 0x50], ".png"),
    (&[0xFF, 0xD8], ".jpg"),
    (b"RIFF", ".webp"),
];

/// Writes asset files under `<public>/<subdir>` and maps them to public
/// paths.
pub struct AssetStore {
    public_dir: PathBuf,
    output_dir: PathBuf,
}

impl AssetStore {
    /// `subdir` is relative to the public root, e.g. `generated` or
    /// `mood-boards`.
    pub fn new(public_dir: impl Into<PathBuf>, subdir: &str) -> Self {
        let public_dir = public_dir.into();
        let output_dir = public_dir.join(subdir);
        Self {
            public_dir,
            output_dir,
        }
    }

    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Persist a Recraft result. SVG text takes precedence (written after
    /// post-processing), then a base64 payload, then a remote URL; the
    /// binary branches sniff the extension from the decoded bytes.
    pub fn persist_recraft_result(
        &self,
        result: &NormalizedResult,
        file_stem: &str,
        theme_text_color: &str,
    ) -> Result<String> {
        if let Some(svg) = &result.svg {
            let processed = post_process_svg(svg, theme_text_color);
            return self.write_file(&format!("{}.svg", file_stem), processed.as_bytes());
        }

        if let Some(encoded) = &result.base64 {
            let bytes = STANDARD.decode(encoded).map_err(|e| {
                SitegenError::PersistError(format!("Failed to decode base64 payload: {}", e))
            })?;
            let ext = detect_image_extension(&bytes);
            return self.write_file(&format!("{}{}", file_stem, ext), &bytes);
        }

        if let Some(url) = &result.url {
            let bytes = fetch_bytes(url, |status| {
                format!("Failed to download generated asset {} ({}).", url, status)
            })?;
            let ext = detect_image_extension(&bytes);
            return self.write_file(&format!("{}{}", file_stem, ext), &bytes);
        }

        Err(SitegenError::PersistError(
            "Recraft result does not contain url, base64, or svg data.".to_string(),
        ))
    }

    /// Persist a completed Runway task: download the output verbatim, with
    /// the extension taken from the URL's path suffix (`.mp4` fallback).
    pub fn persist_runway_result(&self, task: &CompletedTask, file_stem: &str) -> Result<String> {
        let ext = infer_extension_from_url(&task.output_url, ".mp4");
        let bytes = fetch_bytes(&task.output_url, |status| {
            format!(
                "Failed to download Runway output {} ({}).",
                task.output_url, status
            )
        })?;
        self.write_file(&format!("{}{}", file_stem, ext), &bytes)
    }

    /// Mood-board variant: a remote URL takes precedence over base64, and
    /// there is no SVG branch.
    pub fn persist_mood_board_result(
        &self,
        result: &NormalizedResult,
        file_stem: &str,
    ) -> Result<String> {
        if let Some(url) = &result.url {
            let bytes = fetch_bytes(url, |status| {
                format!("Failed to download mood board image ({}).", status)
            })?;
            let ext = detect_image_extension(&bytes);
            return self.write_file(&format!("{}{}", file_stem, ext), &bytes);
        }

        if let Some(encoded) = &result.base64 {
            let bytes = STANDARD.decode(encoded).map_err(|e| {
                SitegenError::PersistError(format!("Failed to decode base64 payload: {}", e))
            })?;
            let ext = detect_image_extension(&bytes);
            return self.write_file(&format!("{}{}", file_stem, ext), &bytes);
        }

        Err(SitegenError::PersistError(
            "Recraft result does not contain url or base64 data.".to_string(),
        ))
    }

    fn write_file(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        self.ensure_output_dir()?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(self.to_public_path(&path))
    }

    fn to_public_path(&self, file_path: &Path) -> String {
        let relative = file_path.strip_prefix(&self.public_dir).unwrap_or(file_path);
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", segments.join("/"))
    }
}

/// Extension from a byte signature, checked against the ordered table.
pub fn detect_image_extension(bytes: &[u8]) -> &'static str {
    IMAGE_SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, ext)| *ext)
        .unwrap_or(".png")
}

/// Extension from a URL's path suffix, ignoring query and fragment.
/// Unparseable URLs and extension-less paths yield the fallback.
pub fn infer_extension_from_url(url: &str, fallback: &str) -> String {
    let path = url
        .split_once("://")
        .and_then(|(_, rest)| rest.split_once('/'))
        .map(|(_, path)| path.split(['?', '#']).next().unwrap_or(""))
        .unwrap_or("");

    let file_name = path.rsplit('/').next().unwrap_or("");
    match file_name.rfind('.') {
        Some(i) if i > 0 => file_name[i..].to_string(),
        _ => fallback.to_string(),
    }
}

fn fetch_bytes(url: &str, on_status: impl FnOnce(u16) -> String) -> Result<Vec<u8>> {
    let agent = build_agent();
    let response = agent.get(url).call().map_err(|e| {
        SitegenError::PersistError(format!("Failed to download {}: {}", url, e))
    })?;

    let status = response.status().as_u16();
    if !is_success(status) {
        return Err(SitegenError::PersistError(on_status(status)));
    }

    let mut reader = response.into_body().into_reader();
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut reader, &mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (PathBuf, AssetStore) {
        let dir = std::env::temp_dir().join(format!("sitegen_persist_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = AssetStore::new(dir.join("public"), "generated");
        (dir, store)
    }

    fn result_with(
        url: Option<&str>,
        base64: Option<&str>,
        svg: Option<&str>,
    ) -> NormalizedResult {
        NormalizedResult {
            url: url.map(str::to_string),
            base64: base64.map(str::to_string),
            svg: svg.map(str::to_string),
            mime_type: None,
            raw: serde_json::json!({}),
        }
    }

    #[test]
    fn test_detect_image_extension_table() {
        assert_eq!(detect_image_extension(&[0x89, 0x50, 0x4E, 0x47]), ".png");
        assert_eq!(detect_image_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), ".jpg");
        assert_eq!(detect_image_extension(b"RIFF\x00\x00\x00\x00WEBP"), ".webp");
        assert_eq!(detect_image_extension(&[0x00, 0x01]), ".png");
        assert_eq!(detect_image_extension(&[]), ".png");
    }

    #[test]
    fn test_infer_extension_from_url() {
        assert_eq!(
            infer_extension_from_url("https://cdn.example.com/video/out.mp4", ".mp4"),
            ".mp4"
        );
        assert_eq!(
            infer_extension_from_url("https://cdn.example.com/v/out.webm?sig=abc#t=0", ".mp4"),
            ".webm"
        );
        assert_eq!(
            infer_extension_from_url("https://cdn.example.com/v/noext", ".mp4"),
            ".mp4"
        );
        assert_eq!(infer_extension_from_url("not a url", ".mp4"), ".mp4");
        assert_eq!(infer_extension_from_url("https://host", ".mp4"), ".mp4");
    }

    #[test]
    fn test_persist_svg_takes_precedence() {
        let (dir, store) = temp_store();
        let result = result_with(
            Some("https://x/ignored.png"),
            Some("aWdub3JlZA=="),
            Some(r##"<svg><path fill="#000000" d="M0 0"/></svg>"##),
        );

        let path = store
            .persist_recraft_result(&result, "logo", "#eef1f5")
            .unwrap();
        assert_eq!(path, "/generated/logo.svg");

        let written =
            std::fs::read_to_string(dir.join("public").join("generated").join("logo.svg"))
                .unwrap();
        // dark fill rewritten on the way to disk
        assert!(written.contains(r##"fill="#eef1f5""##));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_persist_base64_sniffs_extension() {
        let (dir, store) = temp_store();

        let png = STANDARD.encode([0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]);
        let result = result_with(None, Some(&png), None);
        let path = store
            .persist_recraft_result(&result, "hero-image", "#eef1f5")
            .unwrap();
        assert_eq!(path, "/generated/hero-image.png");

        let jpeg = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);
        let result = result_with(None, Some(&jpeg), None);
        let path = store
            .persist_recraft_result(&result, "portfolio-0", "#eef1f5")
            .unwrap();
        assert_eq!(path, "/generated/portfolio-0.jpg");

        let webp = STANDARD.encode(b"RIFF0000WEBP");
        let result = result_with(None, Some(&webp), None);
        let path = store
            .persist_recraft_result(&result, "portfolio-1", "#eef1f5")
            .unwrap();
        assert_eq!(path, "/generated/portfolio-1.webp");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_persist_invalid_base64_fails() {
        let (dir, store) = temp_store();
        let result = result_with(None, Some("not base64!!!"), None);
        let err = store
            .persist_recraft_result(&result, "bad", "#eef1f5")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to decode base64 payload"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_persist_no_usable_data() {
        let (dir, store) = temp_store();
        let result = result_with(None, None, None);
        let err = store
            .persist_recraft_result(&result, "empty", "#eef1f5")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Recraft result does not contain url, base64, or svg data."
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_persist_mood_board_base64_and_error_message() {
        let (dir, store) = temp_store();

        let png = STANDARD.encode([0x89, 0x50, 0x4E, 0x47]);
        let result = result_with(None, Some(&png), None);
        let path = store
            .persist_mood_board_result(&result, "noir-luxe")
            .unwrap();
        assert_eq!(path, "/generated/noir-luxe.png");

        let empty = result_with(None, None, None);
        let err = store
            .persist_mood_board_result(&empty, "noir-luxe")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Recraft result does not contain url or base64 data."
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_public_path_is_forward_slash() {
        let (dir, store) = temp_store();
        let png = STANDARD.encode([0x89, 0x50]);
        let result = result_with(None, Some(&png), None);
        let path = store
            .persist_recraft_result(&result, "scroll-sequence-3", "#eef1f5")
            .unwrap();
        assert_eq!(path, "/generated/scroll-sequence-3.png");
        assert!(!path.contains('\\'));
        std::fs::remove_dir_all(&dir).ok();
    }
}
