//! HTTP client for the problem catalog, the judge and the tutor.
//!
//! All three live behind one base URL. Calls are instrumented and log sizes
//! and statuses, not contents. One attempt per call: no retries, and no
//! client-side timeout beyond what the transport enforces.

use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use async_trait::async_trait;

use crate::domain::{ProblemDescriptor, ProblemSummary, SubmissionRequest};
use crate::error::ConsoleError;
use crate::gateway::{Judge, ProblemSource, Tutor};
use crate::util::trunc_for_log;
use crate::wire::{JudgeReply, ProblemSummaryWire, ProblemWire, SubmitBody, VivaBody, VivaReply};

const UA: &str = "cognitive-console/0.1";

#[derive(Clone)]
pub struct BackendClient {
  pub client: reqwest::Client,
  pub base_url: Url,
}

impl BackendClient {
  pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConsoleError> {
    let base_url = Url::parse(base_url.as_ref())
      .map_err(|e| ConsoleError::TransientFetch(format!("invalid backend URL {:?}: {}", base_url.as_ref(), e)))?;
    if base_url.cannot_be_a_base() {
      return Err(ConsoleError::TransientFetch(format!("backend URL {} cannot take a path", base_url)));
    }
    let client = reqwest::Client::builder().user_agent(UA).build()?;
    Ok(Self { client, base_url })
  }

  /// Base URL plus path segments. Each segment is percent-encoded, so a slug
  /// holding `/`, `?` or `#` stays one segment.
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  /// GET and decode. A JSON `null` body decodes to `None`.
  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, (StatusCode, ConsoleError)> {
    let res = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| (StatusCode::BAD_GATEWAY, ConsoleError::from(e)))?;
    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      return Err((
        status,
        ConsoleError::TransientFetch(format!("HTTP {}: {}", status, trunc_for_log(&body, 200))),
      ));
    }
    res.json::<Option<T>>().await.map_err(|e| (status, ConsoleError::from(e)))
  }

  /// POST and decode; any non-2xx status is an error.
  async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    url: Url,
    body: &B,
  ) -> Result<T, ConsoleError> {
    let res = self.client.post(url).header(CONTENT_TYPE, "application/json").json(body).send().await?;
    let status = res.status();
    if !status.is_success() {
      let text = res.text().await.unwrap_or_default();
      return Err(ConsoleError::TransientFetch(format!("HTTP {}: {}", status, trunc_for_log(&text, 200))));
    }
    res.json::<T>().await.map_err(|e| ConsoleError::TransientFetch(format!("JSON parse error: {}", e)))
  }

  /// POST and decode the body whatever the status; only an undecodable body is an error.
  async fn post_json_lenient<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    url: Url,
    body: &B,
  ) -> Result<T, ConsoleError> {
    let res = self.client.post(url).header(CONTENT_TYPE, "application/json").json(body).send().await?;
    let status = res.status();
    // The judge reports code failures as `success: false` bodies, sometimes with a non-2xx status.
    let text = res.text().await?;
    match serde_json::from_str::<T>(&text) {
      Ok(v) => Ok(v),
      Err(e) if status.is_success() => Err(ConsoleError::TransientFetch(format!("JSON parse error: {}", e))),
      Err(_) => Err(ConsoleError::TransientFetch(format!("HTTP {}: {}", status, trunc_for_log(&text, 200)))),
    }
  }
}

#[async_trait]
impl ProblemSource for BackendClient {
  #[instrument(level = "info", skip(self), fields(%slug))]
  async fn fetch_problem(&self, slug: &str) -> Result<ProblemDescriptor, ConsoleError> {
    if slug.is_empty() || slug == "." || slug == ".." {
      return Err(ConsoleError::NotFound(slug.to_string()));
    }
    match self.get_json::<ProblemWire>(self.endpoint(&["problems", slug])).await {
      Ok(Some(p)) => {
        info!(target: "backend", %slug, hints = p.hints.len(), samples = p.test_cases.len(), "Problem fetched");
        Ok(p.into())
      }
      Ok(None) => Err(ConsoleError::NotFound(slug.to_string())),
      Err((status, _)) if status == StatusCode::NOT_FOUND => Err(ConsoleError::NotFound(slug.to_string())),
      Err((status, e)) => {
        error!(target: "backend", %slug, %status, error = %e, "Problem fetch failed");
        Err(e)
      }
    }
  }

  #[instrument(level = "info", skip(self))]
  async fn list_problems(&self) -> Result<Vec<ProblemSummary>, ConsoleError> {
    let rows = self
      .get_json::<Vec<ProblemSummaryWire>>(self.endpoint(&["problems"]))
      .await
      .map_err(|(_, e)| e)?
      .unwrap_or_default();
    debug!(target: "backend", count = rows.len(), "Catalog fetched");
    Ok(rows.into_iter().map(Into::into).collect())
  }
}

#[async_trait]
impl Judge for BackendClient {
  #[instrument(
    level = "info",
    skip(self, request),
    fields(mode = request.mode.as_str(), language_id = request.language_id, slug = %request.problem_slug, code_len = request.source_code.len())
  )]
  async fn execute(&self, request: &SubmissionRequest) -> Result<JudgeReply, ConsoleError> {
    let start = std::time::Instant::now();
    let result = self.post_json_lenient::<_, JudgeReply>(self.endpoint(&["submit"]), &SubmitBody::from(request)).await;
    let elapsed = start.elapsed();
    match &result {
      Ok(r) => info!(target: "backend", ?elapsed, success = r.success, "Judge replied"),
      Err(e) => error!(target: "backend", ?elapsed, error = %e, "Judge call failed"),
    }
    result
  }
}

#[async_trait]
impl Tutor for BackendClient {
  #[instrument(
    level = "info",
    skip(self, body),
    fields(topic = %body.topic, text_len = body.student_code.len(), history_len = body.conversation_history.len())
  )]
  async fn ask(&self, body: &VivaBody) -> Result<String, ConsoleError> {
    let reply = self
      .post_json::<_, VivaReply>(self.endpoint(&["viva"]), body)
      .await
      .map_err(|e| ConsoleError::TutorUnavailable(e.to_string()))?;
    let question = reply.question.unwrap_or_default();
    debug!(target: "backend", question_len = question.len(), "Tutor replied");
    Ok(question)
  }
}
