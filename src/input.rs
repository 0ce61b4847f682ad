use crate::model::{EquipmentItem, Hypothesis, LessonPhase};
use crate::session::{Intent, Session};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

const FLAME_STEP: i32 = 5;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_intent(session: &Session, ev: InputEvent) -> Option<Intent> {
    // Global
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(Intent::Quit);
    }
    match ev.key {
        KeyCode::Esc if session.show_help => return Some(Intent::HelpToggle),
        KeyCode::Esc => return Some(Intent::Quit),
        KeyCode::F(1) => return Some(Intent::HelpToggle),
        KeyCode::Left | KeyCode::PageUp => return Some(Intent::Prev),
        KeyCode::Right | KeyCode::PageDown => return Some(Intent::Next),
        _ => {}
    }

    // free text owns the letter keys on the evaluation page
    if session.lesson == LessonPhase::Evaluation {
        return match ev.key {
            KeyCode::Tab => Some(Intent::FocusAnswer((session.answer_focus + 1) % 2)),
            KeyCode::Enter => Some(Intent::RevealAnswers),
            KeyCode::Backspace => Some(Intent::AnswerBackspace),
            KeyCode::Char(ch) if !ch.is_control() => Some(Intent::AnswerChar(ch)),
            _ => None,
        };
    }

    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Intent::Quit),
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(Intent::HelpToggle),
        KeyCode::Char('r') | KeyCode::Char('R') => return Some(Intent::Reset),
        KeyCode::Char('m') | KeyCode::Char('M') => return Some(Intent::ToggleSound),
        _ => {}
    }

    match session.lesson {
        LessonPhase::Setup => match ev.key {
            KeyCode::Char(d @ '1'..='6') => {
                let i = d as usize - '1' as usize;
                Some(Intent::PlaceEquipment(EquipmentItem::ALL[i]))
            }
            _ => None,
        },
        LessonPhase::Hypothesis => match ev.key {
            KeyCode::Char(d @ '1'..='3') => {
                let i = d as usize - '1' as usize;
                Some(Intent::ChooseHypothesis(Hypothesis::ALL[i]))
            }
            KeyCode::Enter => Some(Intent::Next),
            _ => None,
        },
        LessonPhase::Experiment => match ev.key {
            KeyCode::Char(' ') => Some(if session.state.heating_active {
                Intent::StopHeating
            } else {
                Intent::StartHeating
            }),
            KeyCode::Char('i') | KeyCode::Char('I') => Some(Intent::AddIce),
            KeyCode::Up | KeyCode::Char('+') => Some(Intent::AdjustFlame(FLAME_STEP)),
            KeyCode::Down | KeyCode::Char('-') => Some(Intent::AdjustFlame(-FLAME_STEP)),
            KeyCode::Char('0') => Some(Intent::SetFlame(100)),
            KeyCode::Char(d @ '2'..='9') => Some(Intent::SetFlame((d as i32 - '0' as i32) * 10)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rules;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent {
            key: code,
            mods: KeyModifiers::NONE,
        }
    }

    fn session_on(phase: LessonPhase) -> Session {
        let mut s = Session::new(Rules::default(), 1, 8);
        s.lesson = phase;
        s
    }

    #[test]
    fn space_toggles_heating_on_experiment_page() {
        let mut s = session_on(LessonPhase::Experiment);
        assert_eq!(
            map_event_to_intent(&s, key(KeyCode::Char(' '))),
            Some(Intent::StartHeating)
        );
        s.state.heating_active = true;
        assert_eq!(
            map_event_to_intent(&s, key(KeyCode::Char(' '))),
            Some(Intent::StopHeating)
        );
        assert_eq!(
            map_event_to_intent(&s, key(KeyCode::Char('7'))),
            Some(Intent::SetFlame(70))
        );
    }

    #[test]
    fn evaluation_page_types_letters() {
        let s = session_on(LessonPhase::Evaluation);
        assert_eq!(
            map_event_to_intent(&s, key(KeyCode::Char('q'))),
            Some(Intent::AnswerChar('q'))
        );
        assert_eq!(map_event_to_intent(&s, key(KeyCode::Esc)), Some(Intent::Quit));
    }

    #[test]
    fn setup_digits_place_equipment() {
        let s = session_on(LessonPhase::Setup);
        assert_eq!(
            map_event_to_intent(&s, key(KeyCode::Char('3'))),
            Some(Intent::PlaceEquipment(EquipmentItem::WatchGlass))
        );
        assert_eq!(map_event_to_intent(&s, key(KeyCode::Char('7'))), None);
    }
}
