//! Runway video generation client
//!
//! Runway is an asynchronous task API: create a task, then poll
//! `GET /tasks/{id}` until it reaches a terminal state. The poll loop is a
//! free function over an injectable fetch closure and a [`Clock`] so tests
//! can drive it without real network calls or five-second sleeps.

use crate::providers::{build_agent, error_message, is_success, parse_json_body};
use serde::Serialize;
use sitegen_core::{Result, SitegenError};
use std::time::{Duration, Instant};

const RUNWAY_BASE_URL: &str = "https://api.dev.runwayml.com/v1";
const RUNWAY_VERSION: &str = "2024-11-06";
const DEFAULT_MODEL: &str = "veo3";
const DEFAULT_RATIO: &str = "1280:720";
const DEFAULT_DURATION_SECS: u64 = 8;
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Polling cadence and overall wall-clock budget for one task.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// A video generation request. `prompt_image` switches the endpoint from
/// text-to-video to image-to-video.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub prompt_text: String,
    pub prompt_image: Option<String>,
    pub model: String,
    pub ratio: String,
    pub duration: u64,
}

impl VideoRequest {
    pub fn text(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            prompt_image: None,
            model: DEFAULT_MODEL.to_string(),
            ratio: DEFAULT_RATIO.to_string(),
            duration: DEFAULT_DURATION_SECS,
        }
    }

    pub fn image(prompt_text: impl Into<String>, prompt_image: impl Into<String>) -> Self {
        Self {
            prompt_image: Some(prompt_image.into()),
            ..Self::text(prompt_text)
        }
    }
}

/// A freshly created task, before any polling.
#[derive(Debug, Clone)]
pub struct CreatedTask {
    pub task_id: String,
    pub status: String,
    pub raw: serde_json::Value,
}

/// A task that reached `SUCCEEDED` with a usable output URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub task_id: String,
    pub status: String,
    pub output_url: String,
    pub raw: serde_json::Value,
}

/// Clock/sleep seam for the poll loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The real thing: `Instant::now` and `std::thread::sleep`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Runway provider for AI video generation
pub struct RunwayClient {
    api_key: String,
    base_url: String,
}

impl RunwayClient {
    /// Create a client from the environment. Fails fast, before any
    /// network call, when the credential is absent.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("RUNWAY_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(SitegenError::MissingCredential("RUNWAY_API_KEY"))?;

        Ok(Self {
            api_key,
            base_url: RUNWAY_BASE_URL.to_string(),
        })
    }

    /// Submit a video generation task and return its id.
    pub fn create_video_task(&self, request: &VideoRequest) -> Result<CreatedTask> {
        let endpoint = if request.prompt_image.is_some() {
            "/image_to_video"
        } else {
            "/text_to_video"
        };

        let mut body = serde_json::json!({
            "model": request.model,
            "ratio": request.ratio,
            "duration": request.duration,
            "promptText": request.prompt_text,
        });
        if let Some(image) = &request.prompt_image {
            body["promptImage"] = serde_json::json!(image);
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let payload = self.post_json(&url, &body, "Runway create task failed")?;

        let task_id = extract_task_id(&payload).ok_or_else(|| {
            SitegenError::ProviderError(format!(
                "Runway create task response did not include a task id: {}",
                payload
            ))
        })?;

        let status = payload
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("PENDING")
            .to_string();

        Ok(CreatedTask {
            task_id,
            status,
            raw: payload,
        })
    }

    /// One status fetch for the given task.
    pub fn fetch_task(&self, task_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/tasks/{}", self.base_url, task_id);
        self.get_json(&url, "Runway poll failed")
    }

    /// Poll the task until it terminates or the timeout budget elapses.
    pub fn poll_task(&self, task_id: &str, options: &PollOptions) -> Result<CompletedTask> {
        poll_until_terminal(task_id, || self.fetch_task(task_id), options, &SystemClock)
    }

    /// Create a task and poll it to completion.
    pub fn generate_video(
        &self,
        request: &VideoRequest,
        options: &PollOptions,
    ) -> Result<CompletedTask> {
        let task = self.create_video_task(request)?;
        self.poll_task(&task.task_id, options)
    }

    pub fn generate_text_to_video(
        &self,
        prompt_text: &str,
        options: &PollOptions,
    ) -> Result<CompletedTask> {
        self.generate_video(&VideoRequest::text(prompt_text), options)
    }

    pub fn generate_image_to_video(
        &self,
        prompt_text: &str,
        prompt_image: &str,
        options: &PollOptions,
    ) -> Result<CompletedTask> {
        self.generate_video(&VideoRequest::image(prompt_text, prompt_image), options)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        context: &str,
    ) -> Result<serde_json::Value> {
        let agent = build_agent();
        let mut response = agent
            .post(url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("X-Runway-Version", RUNWAY_VERSION)
            .header("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| SitegenError::ProviderError(format!("{}: {}", context, e)))?;

        self.read_payload(&mut response, context)
    }

    fn get_json(&self, url: &str, context: &str) -> Result<serde_json::Value> {
        let agent = build_agent();
        let mut response = agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("X-Runway-Version", RUNWAY_VERSION)
            .call()
            .map_err(|e| SitegenError::ProviderError(format!("{}: {}", context, e)))?;

        self.read_payload(&mut response, context)
    }

    fn read_payload(
        &self,
        response: &mut ureq::http::Response<ureq::Body>,
        context: &str,
    ) -> Result<serde_json::Value> {
        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string().map_err(|e| {
            SitegenError::ProviderError(format!("Failed to read Runway response: {}", e))
        })?;

        let payload = parse_json_body(&text, status, "Runway")?;

        if !is_success(status) {
            let message = error_message(&payload, "Unknown Runway error");
            return Err(SitegenError::ProviderError(format!(
                "{} ({}): {}",
                context, status, message
            )));
        }

        Ok(payload)
    }
}

/// Drive the poll loop over an injectable fetch and clock.
///
/// Non-terminal statuses (`PENDING`, `RUNNING`, anything unrecognized) keep
/// polling; the elapsed budget is cumulative wall-clock, checked at the top
/// of each iteration before the fetch.
pub fn poll_until_terminal<F, C>(
    task_id: &str,
    mut fetch: F,
    options: &PollOptions,
    clock: &C,
) -> Result<CompletedTask>
where
    F: FnMut() -> Result<serde_json::Value>,
    C: Clock,
{
    let started = clock.now();
    let budget = Duration::from_millis(options.timeout_ms);

    while clock.now().duration_since(started) < budget {
        let payload = fetch()?;

        let status = payload
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("UNKNOWN")
            .to_uppercase();
        let output_url = extract_output_url(&payload);

        if status == "SUCCEEDED" {
            if let Some(url) = output_url {
                return Ok(CompletedTask {
                    task_id: task_id.to_string(),
                    status,
                    output_url: url,
                    raw: payload,
                });
            }
            // SUCCEEDED without an output URL is not yet usable; keep
            // polling until the URL shows up or the budget runs out.
        } else if status == "FAILED" || status == "CANCELLED" {
            return Err(SitegenError::ProviderError(format!(
                "Runway task {} ended with status {}.",
                task_id, status
            )));
        }

        clock.sleep(Duration::from_millis(options.poll_interval_ms));
    }

    Err(SitegenError::ProviderError(format!(
        "Runway task {} timed out after {}s.",
        task_id,
        (options.timeout_ms as f64 / 1000.0).round() as u64
    )))
}

/// Task id from a create-task response: `id`, `taskId`, or `task_id`.
pub fn extract_task_id(payload: &serde_json::Value) -> Option<String> {
    ["id", "taskId", "task_id"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Output URL from a poll response. Observed shapes: a bare string, a list
/// whose first element is a string or carries `url`/`outputUrl`, or a
/// singular object carrying `url`.
pub fn extract_output_url(payload: &serde_json::Value) -> Option<String> {
    let output = payload.get("output")?;

    if let Some(s) = output.as_str() {
        return Some(s.to_string());
    }

    if let Some(first) = output.as_array().and_then(|a| a.first()) {
        if let Some(s) = first.as_str() {
            return Some(s.to_string());
        }
        for key in ["url", "outputUrl"] {
            if let Some(s) = first.get(key).and_then(|v| v.as_str()) {
                return Some(s.to_string());
            }
        }
    }

    output
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_options(timeout_ms: u64) -> PollOptions {
        PollOptions {
            poll_interval_ms: 10,
            timeout_ms,
        }
    }

    #[test]
    fn test_extract_output_url_shapes() {
        let bare = serde_json::json!({"output": "https://v/a.mp4"});
        assert_eq!(extract_output_url(&bare).as_deref(), Some("https://v/a.mp4"));

        let list_of_strings = serde_json::json!({"output": ["https://v/b.mp4"]});
        assert_eq!(
            extract_output_url(&list_of_strings).as_deref(),
            Some("https://v/b.mp4")
        );

        let list_of_objects = serde_json::json!({"output": [{"url": "https://v/c.mp4"}]});
        assert_eq!(
            extract_output_url(&list_of_objects).as_deref(),
            Some("https://v/c.mp4")
        );

        let camel = serde_json::json!({"output": [{"outputUrl": "https://v/d.mp4"}]});
        assert_eq!(
            extract_output_url(&camel).as_deref(),
            Some("https://v/d.mp4")
        );

        let object = serde_json::json!({"output": {"url": "https://v/e.mp4"}});
        assert_eq!(
            extract_output_url(&object).as_deref(),
            Some("https://v/e.mp4")
        );
    }

    #[test]
    fn test_extract_output_url_absent() {
        assert!(extract_output_url(&serde_json::json!({})).is_none());
        assert!(extract_output_url(&serde_json::json!({"output": []})).is_none());
        assert!(extract_output_url(&serde_json::json!({"output": [{"name": "x"}]})).is_none());
        assert!(extract_output_url(&serde_json::json!({"output": 42})).is_none());
    }

    #[test]
    fn test_extract_task_id_spellings() {
        let payload = serde_json::json!({"id": "t-1"});
        assert_eq!(extract_task_id(&payload).as_deref(), Some("t-1"));

        let payload = serde_json::json!({"taskId": "t-2"});
        assert_eq!(extract_task_id(&payload).as_deref(), Some("t-2"));

        let payload = serde_json::json!({"task_id": "t-3"});
        assert_eq!(extract_task_id(&payload).as_deref(), Some("t-3"));

        assert!(extract_task_id(&serde_json::json!({})).is_none());
    }

    #[test]
    fn test_poll_succeeded_with_all_output_shapes() {
        for output in [
            serde_json::json!("https://v/out.mp4"),
            serde_json::json!(["https://v/out.mp4"]),
            serde_json::json!([{"url": "https://v/out.mp4"}]),
            serde_json::json!({"url": "https://v/out.mp4"}),
        ] {
            let payload = serde_json::json!({"status": "SUCCEEDED", "output": output});
            let task = poll_until_terminal(
                "task-1",
                || Ok(payload.clone()),
                &fast_options(1_000),
                &SystemClock,
            )
            .unwrap();
            assert_eq!(task.output_url, "https://v/out.mp4");
            assert_eq!(task.status, "SUCCEEDED");
            assert_eq!(task.task_id, "task-1");
        }
    }

    #[test]
    fn test_poll_lowercase_status_is_normalized() {
        let payload = serde_json::json!({"status": "succeeded", "output": "https://v/x.mp4"});
        let task = poll_until_terminal(
            "task-lc",
            || Ok(payload.clone()),
            &fast_options(1_000),
            &SystemClock,
        )
        .unwrap();
        assert_eq!(task.status, "SUCCEEDED");
    }

    #[test]
    fn test_poll_terminal_failure() {
        for status in ["FAILED", "CANCELLED"] {
            let payload = serde_json::json!({"status": status});
            let err = poll_until_terminal(
                "task-2",
                || Ok(payload.clone()),
                &fast_options(1_000),
                &SystemClock,
            )
            .unwrap_err();
            let message = err.to_string();
            assert_eq!(
                message,
                format!("Runway task task-2 ended with status {}.", status)
            );
        }
    }

    #[test]
    fn test_poll_times_out_instead_of_hanging() {
        let polls = Cell::new(0u32);
        let err = poll_until_terminal(
            "task-3",
            || {
                polls.set(polls.get() + 1);
                Ok(serde_json::json!({"status": "RUNNING"}))
            },
            &fast_options(25),
            &SystemClock,
        )
        .unwrap_err();

        // 25ms budget / 10ms interval: a few polls, then the rounded
        // "0s" timeout message.
        assert!(polls.get() >= 1);
        assert_eq!(err.to_string(), "Runway task task-3 timed out after 0s.");
    }

    #[test]
    fn test_poll_unrecognized_status_keeps_polling() {
        let polls = Cell::new(0u32);
        let task = poll_until_terminal(
            "task-4",
            || {
                polls.set(polls.get() + 1);
                if polls.get() < 3 {
                    Ok(serde_json::json!({"status": "THROTTLED"}))
                } else {
                    Ok(serde_json::json!({
                        "status": "SUCCEEDED",
                        "output": "https://v/late.mp4"
                    }))
                }
            },
            &fast_options(1_000),
            &SystemClock,
        )
        .unwrap();

        assert_eq!(polls.get(), 3);
        assert_eq!(task.output_url, "https://v/late.mp4");
    }

    #[test]
    fn test_poll_succeeded_without_output_keeps_polling() {
        let polls = Cell::new(0u32);
        let task = poll_until_terminal(
            "task-5",
            || {
                polls.set(polls.get() + 1);
                if polls.get() < 2 {
                    Ok(serde_json::json!({"status": "SUCCEEDED"}))
                } else {
                    Ok(serde_json::json!({
                        "status": "SUCCEEDED",
                        "output": ["https://v/ready.mp4"]
                    }))
                }
            },
            &fast_options(1_000),
            &SystemClock,
        )
        .unwrap();

        assert_eq!(polls.get(), 2);
        assert_eq!(task.output_url, "https://v/ready.mp4");
    }

    #[test]
    fn test_poll_missing_status_treated_as_unknown() {
        let polls = Cell::new(0u32);
        let err = poll_until_terminal(
            "task-6",
            || {
                polls.set(polls.get() + 1);
                Ok(serde_json::json!({}))
            },
            &fast_options(25),
            &SystemClock,
        )
        .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_poll_fetch_error_propagates() {
        let err = poll_until_terminal(
            "task-7",
            || {
                Err(SitegenError::ProviderError(
                    "Runway poll failed (500): Unknown Runway error".to_string(),
                ))
            },
            &fast_options(1_000),
            &SystemClock,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Runway poll failed (500)"));
    }

    #[test]
    fn test_video_request_endpoints() {
        let text = VideoRequest::text("a skyline");
        assert!(text.prompt_image.is_none());
        assert_eq!(text.model, "veo3");
        assert_eq!(text.ratio, "1280:720");
        assert_eq!(text.duration, 8);

        let image = VideoRequest::image("a skyline", "data:image/png;base64,AAAA");
        assert_eq!(
            image.prompt_image.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_completed_task_serializes_camel_case() {
        let task = CompletedTask {
            task_id: "t-9".to_string(),
            status: "SUCCEEDED".to_string(),
            output_url: "https://v/z.mp4".to_string(),
            raw: serde_json::json!({}),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["taskId"], "t-9");
        assert_eq!(json["outputUrl"], "https://v/z.mp4");
    }
}
