//! Per-round instruction generation
//!
//! An instruction is a prompt (direction, color, action or combo) plus the
//! set of answers that count as correct. Reversed prompts must be answered
//! with the opposite of what is shown.

use std::collections::BTreeSet;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::normalize_answer;
use crate::tuning::GeneratorConfig;

/// Instruction categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    Direction,
    Color,
    Action,
    /// A direction and a color shown together
    Combo,
}

impl InstructionKind {
    /// Short prefix used in instruction ids
    pub fn prefix(&self) -> &'static str {
        match self {
            InstructionKind::Direction => "DIR",
            InstructionKind::Color => "COL",
            InstructionKind::Action => "ACT",
            InstructionKind::Combo => "CMB",
        }
    }
}

/// A prompt value with a well-defined opposite
pub trait Token: Copy + Eq + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn opposite(self) -> Self;

    /// The value to answer with, given the reverse rule
    fn answer(self, reversed: bool) -> Self {
        if reversed { self.opposite() } else { self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Token for Direction {
    const ALL: &'static [Self] = &[Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    fn label(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Colors pair up as complements: red/green, blue/yellow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Token for Color {
    const ALL: &'static [Self] = &[Color::Red, Color::Green, Color::Blue, Color::Yellow];

    fn label(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
            Color::Yellow => "YELLOW",
        }
    }

    fn opposite(self) -> Self {
        match self {
            Color::Red => Color::Green,
            Color::Green => Color::Red,
            Color::Blue => Color::Yellow,
            Color::Yellow => Color::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Tap,
    Hold,
    Shake,
    Freeze,
}

impl Token for Action {
    const ALL: &'static [Self] = &[Action::Tap, Action::Hold, Action::Shake, Action::Freeze];

    fn label(self) -> &'static str {
        match self {
            Action::Tap => "TAP",
            Action::Hold => "HOLD",
            Action::Shake => "SHAKE",
            Action::Freeze => "FREEZE",
        }
    }

    fn opposite(self) -> Self {
        match self {
            Action::Tap => Action::Hold,
            Action::Hold => Action::Tap,
            Action::Shake => Action::Freeze,
            Action::Freeze => Action::Shake,
        }
    }
}

/// Look up the opposite of any prompt label (case-insensitive)
pub fn opposite_of(label: &str) -> Option<&'static str> {
    let label = normalize_answer(label);
    find_opposite::<Direction>(&label)
        .or_else(|| find_opposite::<Color>(&label))
        .or_else(|| find_opposite::<Action>(&label))
}

fn find_opposite<T: Token>(label: &str) -> Option<&'static str> {
    T::ALL
        .iter()
        .find(|t| t.label() == label)
        .map(|t| t.opposite().label())
}

fn pick<T: Token, R: Rng + ?Sized>(rng: &mut R) -> T {
    T::ALL[rng.random_range(0..T::ALL.len())]
}

/// One round's prompt and its correct-answer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: String,
    pub kind: InstructionKind,
    /// Text shown to the player
    pub display: String,
    /// When true the player must answer with the opposite
    pub is_reversed: bool,
    /// Normalized answers that count as correct
    pub acceptable_answers: BTreeSet<String>,
    pub difficulty_level: u32,
}

impl Instruction {
    fn single<T: Token>(kind: InstructionKind, token: T, reversed: bool, level: u32, id: String) -> Self {
        Self {
            id,
            kind,
            display: token.label().to_string(),
            is_reversed: reversed,
            acceptable_answers: BTreeSet::from([token.answer(reversed).label().to_string()]),
            difficulty_level: crate::clamp_level(level),
        }
    }

    pub fn direction(dir: Direction, reversed: bool, level: u32, id: String) -> Self {
        Self::single(InstructionKind::Direction, dir, reversed, level, id)
    }

    pub fn color(color: Color, reversed: bool, level: u32, id: String) -> Self {
        Self::single(InstructionKind::Color, color, reversed, level, id)
    }

    pub fn action(action: Action, reversed: bool, level: u32, id: String) -> Self {
        Self::single(InstructionKind::Action, action, reversed, level, id)
    }

    /// Either component (or either opposite, when reversed) is accepted
    pub fn combo(dir: Direction, color: Color, reversed: bool, level: u32, id: String) -> Self {
        Self {
            id,
            kind: InstructionKind::Combo,
            display: format!("{} + {}", dir.label(), color.label()),
            is_reversed: reversed,
            acceptable_answers: BTreeSet::from([
                dir.answer(reversed).label().to_string(),
                color.answer(reversed).label().to_string(),
            ]),
            difficulty_level: crate::clamp_level(level),
        }
    }

    /// Check a raw player answer against the acceptable set
    pub fn accepts(&self, answer: &str) -> bool {
        self.acceptable_answers.contains(&normalize_answer(answer))
    }

    /// Every answer button the UI offers for this instruction
    pub fn answer_pool(&self) -> Vec<&'static str> {
        fn labels<T: Token>() -> impl Iterator<Item = &'static str> {
            T::ALL.iter().map(|t| t.label())
        }
        match self.kind {
            InstructionKind::Direction => labels::<Direction>().collect(),
            InstructionKind::Color => labels::<Color>().collect(),
            InstructionKind::Action => labels::<Action>().collect(),
            InstructionKind::Combo => labels::<Direction>().chain(labels::<Color>()).collect(),
        }
    }
}

/// Generate a unique instruction ID from kind + rng
fn make_instruction_id<R: RngCore + ?Sized>(kind: InstructionKind, rng: &mut R) -> String {
    format!("{}-{:08X}", kind.prefix(), rng.next_u32())
}

/// Weighted kind selection. Locked kinds are skipped, and the previous kind
/// is skipped whenever something else is available. Kinds missing from the
/// rest of `recent` weigh double so the mix keeps rotating.
fn choose_kind<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    level: u32,
    recent: &[InstructionKind],
    rng: &mut R,
) -> InstructionKind {
    let mut table = vec![
        (InstructionKind::Direction, config.direction_weight),
        (InstructionKind::Color, config.color_weight),
    ];
    if level >= config.action_min_level {
        table.push((InstructionKind::Action, config.action_weight));
    }
    if level >= config.combo_min_level {
        table.push((InstructionKind::Combo, config.combo_weight));
    }
    table.retain(|(_, weight)| *weight > 0);

    let (last, earlier) = match recent.split_last() {
        Some((last, earlier)) => (Some(*last), earlier),
        None => (None, recent),
    };
    if let Some(last) = last {
        if table.iter().any(|(kind, _)| *kind != last) {
            table.retain(|(kind, _)| *kind != last);
        }
    }

    // Summed as u64 so large u32 weights cannot overflow
    let table: Vec<(InstructionKind, u64)> = table
        .into_iter()
        .map(|(kind, weight)| {
            let factor = if earlier.contains(&kind) { 1 } else { 2 };
            (kind, weight as u64 * factor)
        })
        .collect();
    let total: u64 = table.iter().map(|(_, weight)| weight).sum();
    if total == 0 {
        return InstructionKind::Direction;
    }

    let mut roll = rng.random_range(0..total);
    for (kind, weight) in table {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    InstructionKind::Direction
}

/// Produce the next round's instruction.
///
/// Pure in `(config, level, history, rng)`: the same seed yields the same
/// instruction. Out-of-range levels are clamped.
pub fn generate_instruction<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    level: u32,
    history: &[InstructionKind],
    rng: &mut R,
) -> Instruction {
    let level = crate::clamp_level(level);
    let kind = choose_kind(config, level, history, rng);
    let reversed = rng.random_bool(config.reverse_chance(level));
    let id = make_instruction_id(kind, rng);

    match kind {
        InstructionKind::Direction => Instruction::direction(pick(rng), reversed, level, id),
        InstructionKind::Color => Instruction::color(pick(rng), reversed, level, id),
        InstructionKind::Action => Instruction::action(pick(rng), reversed, level, id),
        InstructionKind::Combo => {
            let dir = pick(rng);
            let color = pick(rng);
            Instruction::combo(dir, color, reversed, level, id)
        }
    }
}
