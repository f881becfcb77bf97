use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TracedeckError};
use crate::model::span::SpanStatus;
use crate::model::trace::Trace;

/// A `key=glob` pair matched against span tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub value_glob: String,
}

impl TagFilter {
    pub fn parse(input: &str) -> Result<Self> {
        let (key, value_glob) = input
            .split_once('=')
            .ok_or_else(|| TracedeckError::Parse(format!("invalid tag filter: {input}")))?;

        if key.trim().is_empty() || value_glob.trim().is_empty() {
            return Err(TracedeckError::Parse(format!("invalid tag filter: {input}")));
        }

        Ok(Self {
            key: key.trim().to_string(),
            value_glob: value_glob.trim().to_string(),
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        Pattern::new(&self.value_glob)
            .map(|p| p.matches(value))
            .unwrap_or(false)
    }
}

/// Explicit trace-list filtering inputs. What the original viewer kept
/// as transient view state is a plain parameter here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceFilter {
    /// Case-insensitive substring over trace id and service names.
    pub query: Option<String>,
    pub service: Option<String>,
    pub status: Option<SpanStatus>,
    pub tag_filters: Vec<TagFilter>,
}

impl TraceFilter {
    pub fn matches(&self, trace: &Trace) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let hit = trace.trace_id.to_lowercase().contains(&needle)
                || trace
                    .services
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(service) = &self.service
            && !trace.services.iter().any(|s| s == service)
        {
            return false;
        }

        if let Some(status) = self.status
            && trace.status != status
        {
            return false;
        }

        self.tag_filters.iter().all(|filter| {
            trace.spans.iter().any(|span| {
                span.tags
                    .get(&filter.key)
                    .is_some_and(|value| filter.matches(value))
            })
        })
    }
}
