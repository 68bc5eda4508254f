//! Adaptive grouping of transcript chunks.
//!
//! The extraction stage sends one LLM request per group, so the number of
//! groups bounds request count and the group size bounds prompt length.
//! `sample_size` steers that trade-off; 0 asks for the default of one
//! fifth of the chunk count.

use tracing::{info, warn};

use crate::chunking::Document;

/// How badly oversized groups are expected to hurt extraction quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityWarning {
    /// More than 5 documents per group.
    Moderate,
    /// 10 or more documents per group.
    Severe,
}

/// The resolved grouping parameters for one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingPlan {
    pub document_count: usize,
    pub sample_size: usize,
    pub docs_per_group: usize,
    pub group_count: usize,
    pub warning: Option<QualityWarning>,
}

/// Resolve `sample_size` against the document count.
///
/// A requested size of 0 defaults to `max(1, count / 5)`; anything larger
/// than the document count is clamped down to it. The group count can
/// exceed the resolved sample size when the division leaves a remainder.
pub fn plan_groups(document_count: usize, sample_size: usize, verbose: bool) -> GroupingPlan {
    if document_count == 0 {
        return GroupingPlan {
            document_count: 0,
            sample_size: 0,
            docs_per_group: 0,
            group_count: 0,
            warning: None,
        };
    }

    let mut resolved = sample_size;
    if resolved == 0 {
        resolved = (document_count / 5).max(1);
        if verbose {
            info!("No sample size specified. Setting sample size to: {}", resolved);
        }
    }
    resolved = resolved.min(document_count);

    let docs_per_group = (document_count / resolved).max(1);
    let group_count = document_count.div_ceil(docs_per_group);

    let warning = if docs_per_group >= 10 {
        warn!("⚠️ Each group has more than 10 documents, output quality may degrade.");
        Some(QualityWarning::Severe)
    } else if docs_per_group > 5 {
        warn!("⚠️ Each group has more than 5 documents, consider increasing the sample size.");
        Some(QualityWarning::Moderate)
    } else {
        None
    };

    GroupingPlan {
        document_count,
        sample_size: resolved,
        docs_per_group,
        group_count,
        warning,
    }
}

/// Partition `documents` into consecutive groups per [`plan_groups`].
///
/// Groups preserve document order and together cover every document
/// exactly once; the final group may be short.
pub fn group_documents(
    documents: &[Document],
    sample_size: usize,
    verbose: bool,
) -> (GroupingPlan, Vec<&[Document]>) {
    let plan = plan_groups(documents.len(), sample_size, verbose);
    if documents.is_empty() {
        return (plan, Vec::new());
    }
    let groups = documents.chunks(plan.docs_per_group).collect();
    (plan, groups)
}
