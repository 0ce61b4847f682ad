use crate::audio::Cue;
use crate::model::{ExperimentPhase, ExperimentState, ObservationRecord, Rules};

/// Milestones the logger watches for, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    HeatingStart,
    SublimationStart,
    IntenseSublimation,
    IceAdded,
    CrystallizationStart,
    DistinctCrystallization,
}

impl Stage {
    pub(crate) const ORDER: [Stage; 6] = [
        Stage::HeatingStart,
        Stage::SublimationStart,
        Stage::IntenseSublimation,
        Stage::IceAdded,
        Stage::CrystallizationStart,
        Stage::DistinctCrystallization,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Stage::HeatingStart => "Isıtma Başı",
            Stage::SublimationStart => "Süblimleşme Başlangıcı",
            Stage::IntenseSublimation => "Yoğun Süblimleşme",
            Stage::IceAdded => "Buz Eklendi",
            Stage::CrystallizationStart => "Kristalleşme Başlangıcı",
            Stage::DistinctCrystallization => "Belirgin Kristalleşme",
        }
    }

    fn observation(self) -> &'static str {
        match self {
            Stage::HeatingStart => "Naftalin katı halde, ısıtma başladı",
            Stage::SublimationStart => "Naftalin erimeden buharlaşmaya başladı",
            Stage::IntenseSublimation => "Naftalin hızla buharlaşıyor, yoğun buhar görülüyor",
            Stage::IceAdded => "Saat camına buz eklendi, soğutma başladı",
            Stage::CrystallizationStart => "Saat camında beyaz kristaller oluşmaya başladı",
            Stage::DistinctCrystallization => "Saat camında belirgin kristal yapıları görülüyor",
        }
    }

    fn explanation(self) -> &'static str {
        match self {
            Stage::HeatingStart => "Başlangıç durumu",
            Stage::SublimationStart => "Katı → Gaz hal değişimi",
            Stage::IntenseSublimation => "Süblimleşme hızlandı",
            Stage::IceAdded => "Kristalleşme için hazırlık",
            Stage::CrystallizationStart => "Gaz → Katı hal değişimi",
            Stage::DistinctCrystallization => "Kırağılaşma tamamlanıyor",
        }
    }

    fn is_met(self, st: &ExperimentState) -> bool {
        match self {
            Stage::HeatingStart => {
                st.heating_active && st.temperature > 25.0 && st.temperature < 30.0
            }
            Stage::SublimationStart => st.sublimation_level > 5.0 && st.sublimation_level < 10.0,
            Stage::IntenseSublimation => st.sublimation_level > 50.0,
            Stage::IceAdded => st.ice_added,
            Stage::CrystallizationStart => {
                st.crystallization_level > 5.0 && st.crystallization_level < 10.0
            }
            Stage::DistinctCrystallization => st.crystallization_level > 30.0,
        }
    }

    /// Experiment phase entered when this stage is first recorded.
    pub(crate) fn enters_phase(self) -> Option<ExperimentPhase> {
        match self {
            Stage::SublimationStart => Some(ExperimentPhase::Sublimation),
            Stage::IceAdded => Some(ExperimentPhase::Cooling),
            Stage::CrystallizationStart => Some(ExperimentPhase::Crystallization),
            Stage::DistinctCrystallization => Some(ExperimentPhase::Complete),
            _ => None,
        }
    }

    pub(crate) fn cue(self) -> Option<Cue> {
        match self {
            Stage::HeatingStart => Some(Cue::HeatingStarted),
            Stage::CrystallizationStart => Some(Cue::CrystallizationStarted),
            Stage::DistinctCrystallization => Some(Cue::Success),
            _ => None,
        }
    }
}

/// Append-only milestone log. A stage is recorded at most once per session,
/// even if the state later leaves and re-enters its range.
#[derive(Clone, Debug, Default)]
pub(crate) struct ObservationLog {
    records: Vec<ObservationRecord>,
    seen: Vec<Stage>,
}

impl ObservationLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub(crate) fn has(&self, stage: Stage) -> bool {
        self.seen.contains(&stage)
    }

    /// Checks every predicate against `st` and records the newly met ones.
    /// Returns the stages appended by this call.
    pub(crate) fn evaluate(&mut self, st: &ExperimentState, rules: &Rules) -> Vec<Stage> {
        let mut fired = Vec::new();
        for stage in Stage::ORDER {
            if self.has(stage) || !stage.is_met(st) {
                continue;
            }
            let record = ObservationRecord {
                stage: stage.label(),
                time: rules.elapsed_label(st.experiment_time),
                temperature: st.temperature.round() as i32,
                observation: stage.observation(),
                explanation: stage.explanation(),
            };
            log::info!(
                "observation {:?} at {} ({} °C)",
                stage,
                record.time,
                record.temperature
            );
            self.records.push(record);
            self.seen.push(stage);
            fired.push(stage);
        }
        fired
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ExperimentState {
        ExperimentState::new()
    }

    #[test]
    fn heating_start_needs_heat_and_range() {
        let rules = Rules::default();
        let mut log = ObservationLog::new();
        let mut st = state();
        st.temperature = 26.0;
        assert!(log.evaluate(&st, &rules).is_empty());

        st.heating_active = true;
        st.experiment_time = 12;
        let fired = log.evaluate(&st, &rules);
        assert_eq!(fired, vec![Stage::HeatingStart]);
        let rec = &log.records()[0];
        assert_eq!(rec.stage, "Isıtma Başı");
        assert_eq!(rec.time, "2s");
        assert_eq!(rec.temperature, 26);
    }

    #[test]
    fn stage_never_fires_twice() {
        let rules = Rules::default();
        let mut log = ObservationLog::new();
        let mut st = state();
        st.sublimation_level = 7.0;
        log.evaluate(&st, &rules);
        st.sublimation_level = 20.0;
        log.evaluate(&st, &rules);
        st.sublimation_level = 7.0;
        assert!(log.evaluate(&st, &rules).is_empty());
        assert_eq!(log.records().len(), 1);
    }

    #[test]
    fn range_skipped_in_one_jump_is_not_recorded() {
        let rules = Rules::default();
        let mut log = ObservationLog::new();
        let mut st = state();
        st.sublimation_level = 60.0;
        let fired = log.evaluate(&st, &rules);
        assert_eq!(fired, vec![Stage::IntenseSublimation]);
        assert!(!log.has(Stage::SublimationStart));
    }

    #[test]
    fn simultaneous_stages_follow_fixed_order() {
        let rules = Rules::default();
        let mut log = ObservationLog::new();
        let mut st = state();
        st.heating_active = true;
        st.temperature = 27.0;
        st.sublimation_level = 40.0;
        st.crystallization_level = 35.0;
        st.ice_added = true;
        let fired = log.evaluate(&st, &rules);
        assert_eq!(
            fired,
            vec![
                Stage::HeatingStart,
                Stage::IceAdded,
                Stage::DistinctCrystallization
            ]
        );
        let labels: Vec<_> = log.records().iter().map(|r| r.stage).collect();
        assert_eq!(labels, ["Isıtma Başı", "Buz Eklendi", "Belirgin Kristalleşme"]);
    }

    #[test]
    fn clear_allows_fresh_run() {
        let rules = Rules::default();
        let mut log = ObservationLog::new();
        let mut st = state();
        st.ice_added = true;
        log.evaluate(&st, &rules);
        log.clear();
        assert!(log.records().is_empty());
        assert_eq!(log.evaluate(&st, &rules), vec![Stage::IceAdded]);
    }
}
