use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub(crate) const AMBIENT_C: f32 = 25.0;
pub(crate) const SUBLIMATION_ONSET_C: f32 = 80.0;
/// Vapor needed before the watch glass can be iced.
pub(crate) const ICE_MIN_SUBLIMATION: f32 = 10.0;
pub(crate) const FLAME_MIN: u8 = 20;
pub(crate) const FLAME_MAX: u8 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PhysicsModel {
    /// Linear heating, linear sublimation above the onset.
    #[default]
    Simple,
    /// Heat balance with ambient loss, exponential vapor pressure.
    Extended,
}

/// Tuning for one physics formulation.
#[derive(Clone, Debug)]
pub(crate) struct Rules {
    pub(crate) model: PhysicsModel,
    pub(crate) tick_step_ms: u64,
    pub(crate) max_temp_c: f32,
    /// Mass lost per unit of sublimation gained.
    pub(crate) mass_per_sublimation: f32,
}

impl Rules {
    pub(crate) fn for_model(model: PhysicsModel) -> Self {
        match model {
            PhysicsModel::Simple => Self {
                model,
                tick_step_ms: 200,
                max_temp_c: 200.0,
                mass_per_sublimation: 0.8,
            },
            PhysicsModel::Extended => Self {
                model,
                tick_step_ms: 100,
                max_temp_c: 250.0,
                mass_per_sublimation: 1.0,
            },
        }
    }

    pub(crate) fn ticks_per_second(&self) -> u64 {
        (1000 / self.tick_step_ms.max(1)).max(1)
    }

    pub(crate) fn elapsed_label(&self, ticks: u64) -> String {
        format!("{}s", ticks / self.ticks_per_second())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::for_model(PhysicsModel::default())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ExperimentState {
    pub(crate) temperature: f32,
    pub(crate) heating_active: bool,
    pub(crate) cooling_active: bool,
    pub(crate) sublimation_level: f32,
    pub(crate) crystallization_level: f32,
    pub(crate) naphthalene_mass: f32,
    pub(crate) flame_intensity: u8,
    pub(crate) experiment_time: u64,
    pub(crate) ice_added: bool,
    pub(crate) setup_complete: bool,
    pub(crate) experiment_started: bool,
    pub(crate) ambient_temperature: f32,
    pub(crate) pressure_hpa: f32,
    pub(crate) humidity: f32,
    pub(crate) vapor_density: f32,
    pub(crate) heat_conduction: f32,
}

impl ExperimentState {
    pub(crate) fn new() -> Self {
        Self {
            temperature: AMBIENT_C,
            heating_active: false,
            cooling_active: false,
            sublimation_level: 0.0,
            crystallization_level: 0.0,
            naphthalene_mass: 100.0,
            flame_intensity: 50,
            experiment_time: 0,
            ice_added: false,
            setup_complete: false,
            experiment_started: false,
            ambient_temperature: AMBIENT_C,
            pressure_hpa: 1013.25,
            humidity: 60.0,
            vapor_density: 0.0,
            heat_conduction: 0.5,
        }
    }

    /// Crystal edge length shown next to the crystallization gauge.
    pub(crate) fn crystal_size_mm(&self) -> f32 {
        self.crystallization_level * 0.1
    }
}

impl Default for ExperimentState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EquipmentItem {
    Beaker,
    Sample,
    WatchGlass,
    Tripod,
    Burner,
    Ice,
}

impl EquipmentItem {
    pub(crate) const ALL: [EquipmentItem; 6] = [
        EquipmentItem::Beaker,
        EquipmentItem::Sample,
        EquipmentItem::WatchGlass,
        EquipmentItem::Tripod,
        EquipmentItem::Burner,
        EquipmentItem::Ice,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            EquipmentItem::Beaker => "Beher (250 mL)",
            EquipmentItem::Sample => "Naftalin parçası",
            EquipmentItem::WatchGlass => "Saat camı",
            EquipmentItem::Tripod => "Sacayak ve tel kafes",
            EquipmentItem::Burner => "İspirto ocağı",
            EquipmentItem::Ice => "Buz parçaları",
        }
    }
}

/// Placed apparatus. Every flag is a one-way latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Equipment {
    pub(crate) beaker: bool,
    pub(crate) sample: bool,
    pub(crate) watch_glass: bool,
    pub(crate) tripod: bool,
    pub(crate) burner: bool,
    pub(crate) ice: bool,
}

impl Equipment {
    pub(crate) fn is_placed(&self, item: EquipmentItem) -> bool {
        match item {
            EquipmentItem::Beaker => self.beaker,
            EquipmentItem::Sample => self.sample,
            EquipmentItem::WatchGlass => self.watch_glass,
            EquipmentItem::Tripod => self.tripod,
            EquipmentItem::Burner => self.burner,
            EquipmentItem::Ice => self.ice,
        }
    }

    pub(crate) fn place(&mut self, item: EquipmentItem) {
        match item {
            EquipmentItem::Beaker => self.beaker = true,
            EquipmentItem::Sample => self.sample = true,
            EquipmentItem::WatchGlass => self.watch_glass = true,
            EquipmentItem::Tripod => self.tripod = true,
            EquipmentItem::Burner => self.burner = true,
            EquipmentItem::Ice => self.ice = true,
        }
    }

    /// Ice is not part of the initial setup.
    pub(crate) fn setup_ready(&self) -> bool {
        self.beaker && self.sample && self.watch_glass && self.tripod && self.burner
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExperimentPhase {
    Heating,
    Sublimation,
    Cooling,
    Crystallization,
    Complete,
}

impl ExperimentPhase {
    pub(crate) fn label(self) -> &'static str {
        match self {
            ExperimentPhase::Heating => "Isıtma",
            ExperimentPhase::Sublimation => "Süblimleşme",
            ExperimentPhase::Cooling => "Soğutma",
            ExperimentPhase::Crystallization => "Kristalleşme",
            ExperimentPhase::Complete => "Tamamlandı",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LessonPhase {
    Theory,
    Materials,
    Safety,
    Variables,
    Setup,
    Hypothesis,
    Experiment,
    Observation,
    Analysis,
    Errors,
    Evaluation,
}

impl LessonPhase {
    pub(crate) const ALL: [LessonPhase; 11] = [
        LessonPhase::Theory,
        LessonPhase::Materials,
        LessonPhase::Safety,
        LessonPhase::Variables,
        LessonPhase::Setup,
        LessonPhase::Hypothesis,
        LessonPhase::Experiment,
        LessonPhase::Observation,
        LessonPhase::Analysis,
        LessonPhase::Errors,
        LessonPhase::Evaluation,
    ];

    pub(crate) fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub(crate) fn next(self) -> Option<LessonPhase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub(crate) fn prev(self) -> Option<LessonPhase> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            LessonPhase::Theory => "Kazanım ve Amaç",
            LessonPhase::Materials => "Malzemeler",
            LessonPhase::Safety => "Güvenlik",
            LessonPhase::Variables => "Değişkenler",
            LessonPhase::Setup => "Düzenek Kurma",
            LessonPhase::Hypothesis => "Hipotez",
            LessonPhase::Experiment => "Deney Prosedürü",
            LessonPhase::Observation => "Gözlemler",
            LessonPhase::Analysis => "Veri Analizi",
            LessonPhase::Errors => "Hata Kaynakları",
            LessonPhase::Evaluation => "Değerlendirme",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Hypothesis {
    MeltThenEvaporate,
    Sublimation,
    NoChange,
}

impl Hypothesis {
    pub(crate) const ALL: [Hypothesis; 3] = [
        Hypothesis::MeltThenEvaporate,
        Hypothesis::Sublimation,
        Hypothesis::NoChange,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Hypothesis::MeltThenEvaporate => "Önce eriyecek, sonra buharlaşacak",
            Hypothesis::Sublimation => "Doğrudan katıdan gaza geçecek (süblimleşecek)",
            Hypothesis::NoChange => "Hiçbir değişiklik olmayacak",
        }
    }

    pub(crate) fn is_correct(self) -> bool {
        matches!(self, Hypothesis::Sublimation)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ObservationRecord {
    pub(crate) stage: &'static str,
    pub(crate) time: String,
    pub(crate) temperature: i32,
    pub(crate) observation: &'static str,
    pub(crate) explanation: &'static str,
}
