//! Stage-by-stage record of a filter run.

use serde::Serialize;

/// Row counts around one applied predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub label: String,
    pub condition: String,
    pub before: usize,
    pub after: usize,
    /// False when the predicate's column was absent and the stage was a no-op.
    pub applied: bool,
}

impl StageCount {
    pub fn excluded(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub initial: Option<usize>,
    pub stages: Vec<StageCount>,
}

impl FilterReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: StageCount) {
        if self.initial.is_none() {
            self.initial = Some(stage.before);
        }
        self.stages.push(stage);
    }

    pub fn final_count(&self) -> Option<usize> {
        self.stages.last().map(|stage| stage.after)
    }

    pub fn total_excluded(&self) -> usize {
        self.stages.iter().map(StageCount::excluded).sum()
    }

    /// `(before, after)` pairs in stage order.
    pub fn counts(&self) -> Vec<(usize, usize)> {
        self.stages
            .iter()
            .map(|stage| (stage.before, stage.after))
            .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.stages.len() + 2);
        if let Some(initial) = self.initial {
            lines.push(format!("元データ読み込み: {initial}件"));
        }
        for stage in &self.stages {
            lines.push(format!(
                "{}フィルタ後: {}件 (除外: {}件) [{}]",
                stage.label,
                stage.after,
                stage.excluded(),
                stage.condition
            ));
        }
        if let Some(count) = self.final_count() {
            lines.push(format!("最終処理結果: {count}件"));
        }
        lines
    }
}
