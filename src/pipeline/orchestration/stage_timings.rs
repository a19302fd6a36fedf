use crate::pipeline::orchestration::text_stage::StageKind;
use indexmap::IndexMap;
use std::time::Duration;

/// Tracks how long each stage and each step of a run took
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    /// Total duration per stage, summed over variants
    stage_durations: IndexMap<StageKind, Duration>,
    /// Duration per step, keyed by stage and the artifact it produced
    step_durations: IndexMap<(StageKind, String), Duration>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished step and accumulate its stage total
    pub fn record(&mut self, stage: StageKind, step_name: impl Into<String>, duration: Duration) {
        *self.stage_durations.entry(stage).or_default() += duration;
        *self
            .step_durations
            .entry((stage, step_name.into()))
            .or_default() += duration;
    }

    pub fn stage_duration(&self, stage: StageKind) -> Duration {
        self.stage_durations
            .get(&stage)
            .copied()
            .unwrap_or_default()
    }

    pub fn step_duration(&self, stage: StageKind, step_name: &str) -> Duration {
        self.step_durations
            .get(&(stage, step_name.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn stages(&self) -> &IndexMap<StageKind, Duration> {
        &self.stage_durations
    }

    pub fn step_count(&self) -> usize {
        self.step_durations.len()
    }

    pub fn total(&self) -> Duration {
        self.stage_durations.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_time_accumulates_over_variants() {
        let mut timings = StageTimings::new();
        timings.record(StageKind::FactCorrection, "corrected", Duration::from_millis(30));
        timings.record(StageKind::MarkdownFormat, "primary_markdown", Duration::from_millis(10));
        timings.record(StageKind::MarkdownFormat, "translated_markdown", Duration::from_millis(15));

        assert_eq!(
            timings.stage_duration(StageKind::MarkdownFormat),
            Duration::from_millis(25)
        );
        assert_eq!(
            timings.step_duration(StageKind::MarkdownFormat, "translated_markdown"),
            Duration::from_millis(15)
        );
        assert_eq!(timings.stage_duration(StageKind::Translation), Duration::ZERO);
        assert_eq!(timings.step_count(), 3);
        assert_eq!(timings.total(), Duration::from_millis(55));
        assert_eq!(
            timings.stages().keys().copied().collect::<Vec<_>>(),
            vec![StageKind::FactCorrection, StageKind::MarkdownFormat]
        );
    }
}
