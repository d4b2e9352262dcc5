// src/chat.rs
//! Question answering over a stored report.
//!
//! The answer is built only from the report's summary, risks and
//! opportunities; the question text does not influence it. Citations are
//! the report's sources.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::Report;
use crate::store::ReportStore;

pub const NOT_FOUND_MESSAGE: &str = "Report not found";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatReply {
    Answer {
        answer: String,
        citations: Vec<String>,
    },
    /// Soft error: serialized as `{"error": "Report not found"}`.
    NotFound { error: String },
}

impl ChatReply {
    pub fn not_found() -> Self {
        ChatReply::NotFound {
            error: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatReply::NotFound { .. })
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("chat_requests_total", "Chat questions received.");
        describe_counter!(
            "chat_not_found_total",
            "Chat questions against an unknown report id."
        );
    });
}

/// Fixed-format answer text for a report.
pub fn compose_answer(report: &Report) -> String {
    format!(
        "Summary:\n{}\n\nKey Risks:\n{}\n\nKey Opportunities:\n{}",
        report.summary,
        report.risks.join(", "),
        report.opportunities.join(", ")
    )
    .trim()
    .to_string()
}

/// Look up `report_id` and answer. `question` is accepted but not consulted.
pub async fn answer(
    store: &dyn ReportStore,
    report_id: &str,
    question: &str,
) -> Result<ChatReply, StoreError> {
    ensure_metrics_described();
    counter!("chat_requests_total").increment(1);

    let Some(report) = store.get(report_id).await? else {
        counter!("chat_not_found_total").increment(1);
        tracing::info!(target: "api", %report_id, "chat on unknown report");
        return Ok(ChatReply::not_found());
    };

    tracing::debug!(
        target: "api",
        %report_id,
        question_len = question.len(),
        "chat answered from stored report"
    );
    Ok(ChatReply::Answer {
        answer: compose_answer(&report),
        citations: report.sources,
    })
}
