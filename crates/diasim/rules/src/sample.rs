//! A toy language: nine features, twenty-one phones, an eleven-rule cascade
//! and ten etyma, one of them unattested.
//!
//! Stages: gold `Middle` after rule 5, black `Late` after rule 7 and gold
//! `Modern` at the end of the cascade. Both references attest a dark `ɫ` in
//! etymon 1 that the baseline cascade does not produce.

use std::sync::Arc;

use diasim_types::{
    Cascade, FeatureInventory, FeatureMatrix, Lexicon, RuleRef, Stage, Stages, TypesError,
};

use crate::compiler::PreparedCompiler;
use crate::rule::{ContextItem, PhoneRule};

pub const FEATURES: [&str; 9] = [
    "syl", "cons", "son", "voi", "cont", "nas", "cor", "lab", "back",
];

const SYMBOLS: &[(&str, &str)] = &[
    ("p", "-+-----+0"),
    ("t", "-+----+-0"),
    ("k", "-+------+"),
    ("b", "-+-+---+0"),
    ("d", "-+-+--+-0"),
    ("g", "-+-+----+"),
    ("m", "-+++-+-+0"),
    ("n", "-+++-++-0"),
    ("l", "-++++-+--"),
    ("ɫ", "-++++-+-+"),
    ("r", "-++++-+-0"),
    ("s", "-+--+-+-0"),
    ("z", "-+-++-+-0"),
    ("ʔ", "--------0"),
    ("ɾ", "-+++--+-0"),
    ("a", "+-+++---+"),
    ("e", "+-+++----"),
    ("i", "+-+++-0--"),
    ("o", "+-+++--++"),
    ("u", "+-+++-0++"),
    ("ə", "+-+++-000"),
];

const INPUT: [&str; 10] = [
    "# b i t ə n #",
    "# m o l t ə d #",
    "# b u t ə #",
    "# k e n #",
    "# b a s a #",
    "# s e n p o m #",
    "# l a b #",
    "# n a n k a #",
    "...",
    "# d o d ə #",
];

const MIDDLE: [&str; 10] = [
    "# b i ɾ ə n #",
    "# m o ɫ t ə d #",
    "# b u ɾ #",
    "# k e n #",
    "# b a z a #",
    "# s e m p o m #",
    "# l a b #",
    "# n a n g a #",
    "...",
    "# d o ɾ #",
];

const MODERN: [&str; 10] = [
    "# b i ɾ ə n #",
    "# m o ɫ ʔ ə d #",
    "# b u r #",
    "# k i n #",
    "# b a z a #",
    "# s e m p u m #",
    "# l a p #",
    "# n a n g a #",
    "...",
    "# d o r #",
];

pub const MIDDLE_POSITION: usize = 6;
pub const LATE_POSITION: usize = 8;

/// Velarization of `l` before consonants, absent from the baseline cascade.
pub const DARK_L: &str = "l > ɫ / __ [+cons]";

/// Everything needed to run the sample cascade.
#[derive(Clone, Debug)]
pub struct SampleLanguage {
    pub inventory: Arc<FeatureInventory>,
    pub lexicon: Lexicon,
    pub cascade: Cascade,
    pub stages: Stages,
    pub compiler: PreparedCompiler,
}

impl SampleLanguage {
    pub fn build() -> Result<Self, TypesError> {
        let inventory = SYMBOLS.iter().try_fold(
            FeatureInventory::new(FEATURES),
            |inv, (symbol, marks)| inv.with_symbol(*symbol, marks),
        )?;

        let lexicon = inventory.parse_lexicon(INPUT)?;
        let cascade_rules = cascade_rules(&inventory)?;
        let cascade: Cascade = cascade_rules.iter().cloned().map(RuleRef::new).collect();

        let stages = Stages::new()
            .with_stage(Stage::gold(
                "Middle",
                MIDDLE_POSITION,
                inventory.parse_lexicon(MIDDLE)?,
            ))?
            .with_stage(Stage::black("Late", LATE_POSITION))?
            .with_stage(Stage::gold(
                "Modern",
                cascade.len(),
                inventory.parse_lexicon(MODERN)?,
            ))?;

        let compiler = cascade_rules
            .into_iter()
            .chain(hypothesis_rules(&inventory)?)
            .fold(PreparedCompiler::new(), PreparedCompiler::with_rule);

        Ok(Self {
            inventory: Arc::new(inventory),
            lexicon,
            cascade,
            stages,
            compiler,
        })
    }
}

fn exact(inventory: &FeatureInventory, symbol: &str) -> Result<FeatureMatrix, TypesError> {
    Ok(FeatureMatrix::of_phone(&inventory.phone(symbol)?))
}

fn substitution(
    inventory: &FeatureInventory,
    notation: &str,
    from: &str,
    to: &str,
) -> Result<PhoneRule, TypesError> {
    Ok(PhoneRule::substitution(
        notation,
        exact(inventory, from)?,
        inventory.phone(to)?,
    ))
}

fn cascade_rules(inv: &FeatureInventory) -> Result<Vec<PhoneRule>, TypesError> {
    let syllabic = ContextItem::Features(inv.matrix("+syl")?);
    let phone = |s: &str| inv.phone(s).map(|p| ContextItem::phone(&p));

    Ok(vec![
        substitution(inv, "t > ɾ / [+syl] __ ə", "t", "ɾ")?
            .left(syllabic.clone())
            .right(phone("ə")?),
        substitution(inv, "d > ɾ / [+syl] __ ə", "d", "ɾ")?
            .left(syllabic.clone())
            .right(phone("ə")?),
        substitution(inv, "s > z / [+syl] __ [+syl]", "s", "z")?
            .left(syllabic.clone())
            .right(syllabic),
        PhoneRule::deletion("ə > ∅ / __ #", exact(inv, "ə")?).right(ContextItem::WordBoundary),
        substitution(inv, "k > g / n __", "k", "g")?.left(phone("n")?),
        substitution(inv, "n > m / __ p", "n", "m")?.right(phone("p")?),
        substitution(inv, "t > ʔ / __ ə", "t", "ʔ")?.right(phone("ə")?),
        substitution(inv, "e > i / __ n", "e", "i")?.right(phone("n")?),
        substitution(inv, "ɾ > r / __ #", "ɾ", "r")?.right(ContextItem::WordBoundary),
        substitution(inv, "o > u / __ m", "o", "u")?.right(phone("m")?),
        substitution(inv, "b > p / __ #", "b", "p")?.right(ContextItem::WordBoundary),
    ])
}

fn hypothesis_rules(inv: &FeatureInventory) -> Result<Vec<PhoneRule>, TypesError> {
    Ok(vec![substitution(inv, DARK_L, "l", "ɫ")?
        .right(ContextItem::Features(inv.matrix("+cons")?))])
}
