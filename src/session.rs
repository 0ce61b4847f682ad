use rand::{rngs::SmallRng, SeedableRng};
use std::time::Duration;

use crate::audio::{Cue, CueSink};
use crate::error::Blocked;
use crate::model::{
    Equipment, EquipmentItem, ExperimentPhase, ExperimentState, Hypothesis, LessonPhase, Rules,
    FLAME_MAX, FLAME_MIN, ICE_MIN_SUBLIMATION,
};
use crate::observe::ObservationLog;
use crate::particles::ParticleField;
use crate::physics;
use crate::timer::Ticker;

pub(crate) const ANSWER_MAX: usize = 160;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    PlaceEquipment(EquipmentItem),
    StartHeating,
    StopHeating,
    AddIce,
    SetFlame(i32),
    AdjustFlame(i32),
    Reset,
    Next,
    Prev,
    Goto(LessonPhase),
    ChooseHypothesis(Hypothesis),
    FocusAnswer(usize),
    AnswerChar(char),
    AnswerBackspace,
    RevealAnswers,
    HelpToggle,
    ToggleSound,
    Quit,
}

/// Single owner of everything the lesson mutates.
pub(crate) struct Session {
    pub(crate) rules: Rules,
    pub(crate) state: ExperimentState,
    pub(crate) equipment: Equipment,
    pub(crate) log: ObservationLog,
    pub(crate) particles: ParticleField,
    pub(crate) lesson: LessonPhase,
    pub(crate) phase: ExperimentPhase,
    pub(crate) hypothesis: Option<Hypothesis>,
    pub(crate) answers: [String; 2],
    pub(crate) answer_focus: usize,
    pub(crate) answers_revealed: bool,
    pub(crate) show_help: bool,
    pub(crate) notice: Option<Blocked>,
    ticker: Ticker,
    rng: SmallRng,
    seed: u64,
}

impl Session {
    pub(crate) fn new(rules: Rules, seed: u64, particle_cap: usize) -> Self {
        let ticker = Ticker::new(Duration::from_millis(rules.tick_step_ms));
        Self {
            rules,
            state: ExperimentState::new(),
            equipment: Equipment::default(),
            log: ObservationLog::new(),
            particles: ParticleField::new(particle_cap),
            lesson: LessonPhase::Theory,
            phase: ExperimentPhase::Heating,
            hypothesis: None,
            answers: [String::new(), String::new()],
            answer_focus: 0,
            answers_revealed: false,
            show_help: false,
            notice: None,
            ticker,
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    pub(crate) fn timer_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Applies one user intent. A refusal is kept as the current notice and
    /// leaves the session as it was.
    pub(crate) fn apply(&mut self, intent: Intent, cues: &mut dyn CueSink) -> Result<(), Blocked> {
        let result = self.apply_inner(intent, cues);
        match result {
            Ok(()) => {
                log::debug!("intent {:?}", intent);
                self.notice = None;
            }
            Err(blocked) => {
                log::info!("intent {:?} blocked: {}", intent, blocked);
                self.notice = Some(blocked);
            }
        }
        self.observe(cues);
        self.sync_timer();
        result
    }

    fn apply_inner(&mut self, intent: Intent, cues: &mut dyn CueSink) -> Result<(), Blocked> {
        match intent {
            Intent::PlaceEquipment(EquipmentItem::Ice) => self.add_ice(cues),
            Intent::PlaceEquipment(item) => {
                if self.equipment.is_placed(item) {
                    return Err(Blocked::AlreadyPlaced);
                }
                self.equipment.place(item);
                if self.equipment.setup_ready() && !self.state.setup_complete {
                    self.state.setup_complete = true;
                    log::info!("apparatus complete");
                    cues.cue(Cue::Success);
                }
                Ok(())
            }
            Intent::StartHeating => {
                if !self.state.setup_complete {
                    return Err(Blocked::SetupIncomplete);
                }
                if self.state.heating_active {
                    return Ok(());
                }
                self.state.heating_active = true;
                self.state.experiment_started = true;
                self.phase = ExperimentPhase::Heating;
                log::info!("heating on at {:.1} °C", self.state.temperature);
                cues.cue(Cue::HeatingStarted);
                Ok(())
            }
            Intent::StopHeating => {
                if self.state.heating_active {
                    self.state.heating_active = false;
                    log::info!("heating off at {:.1} °C", self.state.temperature);
                }
                Ok(())
            }
            Intent::AddIce => self.add_ice(cues),
            Intent::SetFlame(v) => self.set_flame(v),
            Intent::AdjustFlame(delta) => self.set_flame(self.state.flame_intensity as i32 + delta),
            Intent::Reset => {
                self.reset();
                Ok(())
            }
            Intent::Next => match self.lesson.next() {
                Some(to) => self.goto(to),
                None => Ok(()),
            },
            Intent::Prev => {
                if let Some(to) = self.lesson.prev() {
                    self.lesson = to;
                }
                Ok(())
            }
            Intent::Goto(to) => self.goto(to),
            Intent::ChooseHypothesis(h) => {
                self.hypothesis = Some(h);
                Ok(())
            }
            Intent::FocusAnswer(i) => {
                self.answer_focus = i.min(self.answers.len() - 1);
                Ok(())
            }
            Intent::AnswerChar(ch) => {
                let answer = &mut self.answers[self.answer_focus];
                if answer.chars().count() < ANSWER_MAX {
                    answer.push(ch);
                }
                Ok(())
            }
            Intent::AnswerBackspace => {
                self.answers[self.answer_focus].pop();
                Ok(())
            }
            Intent::RevealAnswers => {
                self.answers_revealed = true;
                Ok(())
            }
            Intent::HelpToggle => {
                self.show_help = !self.show_help;
                Ok(())
            }
            // handled by the app loop
            Intent::ToggleSound | Intent::Quit => Ok(()),
        }
    }

    fn add_ice(&mut self, cues: &mut dyn CueSink) -> Result<(), Blocked> {
        if self.state.ice_added {
            return Err(Blocked::IceAlreadyAdded);
        }
        if self.state.sublimation_level < ICE_MIN_SUBLIMATION {
            return Err(Blocked::NotEnoughVapor);
        }
        self.state.ice_added = true;
        self.state.cooling_active = true;
        self.equipment.ice = true;
        log::info!("ice added at {:.1}% sublimation", self.state.sublimation_level);
        cues.cue(Cue::CrystallizationStarted);
        Ok(())
    }

    fn set_flame(&mut self, v: i32) -> Result<(), Blocked> {
        if !self.state.heating_active {
            return Err(Blocked::HeatingInactive);
        }
        self.state.flame_intensity = v.clamp(FLAME_MIN as i32, FLAME_MAX as i32) as u8;
        Ok(())
    }

    fn goto(&mut self, to: LessonPhase) -> Result<(), Blocked> {
        if to.index() > LessonPhase::Hypothesis.index() && self.hypothesis.is_none() {
            return Err(Blocked::HypothesisRequired);
        }
        self.lesson = to;
        Ok(())
    }

    /// Stops the ticker first, then swaps in a fresh session record.
    fn reset(&mut self) {
        self.ticker.stop();
        self.state = ExperimentState::new();
        self.equipment = Equipment::default();
        self.log.clear();
        self.particles.clear();
        self.lesson = LessonPhase::Theory;
        self.phase = ExperimentPhase::Heating;
        self.hypothesis = None;
        self.answers = [String::new(), String::new()];
        self.answer_focus = 0;
        self.answers_revealed = false;
        self.rng = SmallRng::seed_from_u64(self.seed);
        log::info!("experiment reset");
    }

    fn sync_timer(&mut self) {
        let active = self.lesson == LessonPhase::Experiment
            && (self.state.heating_active || self.state.cooling_active);
        if active {
            self.ticker.start();
        } else {
            self.ticker.stop();
        }
    }

    fn observe(&mut self, cues: &mut dyn CueSink) {
        for stage in self.log.evaluate(&self.state, &self.rules) {
            if let Some(phase) = stage.enters_phase() {
                self.phase = phase;
            }
            if let Some(cue) = stage.cue() {
                cues.cue(cue);
            }
        }
    }

    /// One physics tick. The new record replaces the old one in a single move.
    pub(crate) fn tick(&mut self, cues: &mut dyn CueSink) {
        let next = physics::step(&self.state, &self.rules);
        self.state = next;
        self.particles.emit_for(&mut self.rng, &self.state);
        self.observe(cues);
    }

    /// Feeds wall time to the ticker and runs whatever ticks fell due.
    pub(crate) fn advance(&mut self, dt: Duration, cues: &mut dyn CueSink) -> u32 {
        let due = self.ticker.advance(dt);
        for _ in 0..due {
            self.tick(cues);
        }
        due
    }

    /// Per-frame particle motion, only while the apparatus is on screen.
    pub(crate) fn animate(&mut self) {
        if self.lesson == LessonPhase::Experiment {
            self.particles.animate(&mut self.rng);
        }
    }

    pub(crate) fn tick_period(&self) -> Duration {
        self.ticker.period()
    }
}
