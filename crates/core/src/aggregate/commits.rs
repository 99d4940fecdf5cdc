use crate::model::{AggregatedTimes, CommitTotals, TraceFile};

/// Sum the commit timings of every root in one trace file.
pub fn aggregate_commit_times(file: &TraceFile) -> CommitTotals {
    let mut totals = CommitTotals::default();

    for root in &file.roots {
        totals.commit_count += root.commits.len();
        for commit in &root.commits {
            totals.times += AggregatedTimes {
                total_duration: commit.duration_ms(),
                total_effect_duration: commit.effect_duration_ms(),
                total_passive_effect_duration: commit.passive_effect_duration_ms(),
            };
        }
    }

    totals
}

/// Average of the per-file totals. Every file counts once, however many
/// commits it recorded.
pub fn calculate_average_times(files: &[TraceFile]) -> AggregatedTimes {
    if files.is_empty() {
        return AggregatedTimes::ZERO;
    }

    let mut sum = AggregatedTimes::ZERO;
    for file in files {
        sum += aggregate_commit_times(file).times;
    }
    sum.divided_by(files.len() as f64)
}
