//! Shared fixtures for the DiaSim integration and property tests.

use diasim_hypothesis::{EngineConfig, HypothesisEngine};
use diasim_rules::sample::SampleLanguage;
use diasim_simulator::{Simulation, SimulationConfig};
use diasim_types::{EtymonId, Lexicon};

/// The sample language, built fresh.
pub fn sample() -> SampleLanguage {
    match SampleLanguage::build() {
        Ok(lang) => lang,
        Err(e) => panic!("sample language failed to build: {e}"),
    }
}

/// A single-threaded engine over the sample language.
pub fn sample_engine() -> (HypothesisEngine, SampleLanguage) {
    let lang = sample();
    let engine = HypothesisEngine::new(
        lang.lexicon.clone(),
        lang.cascade.clone(),
        lang.stages.clone(),
        EngineConfig::sequential(),
    );
    match engine {
        Ok(engine) => (engine, lang),
        Err(e) => panic!("engine rejected the sample language: {e}"),
    }
}

/// The sample cascade run to completion.
pub fn sample_run() -> Simulation {
    let lang = sample();
    match Simulation::run(
        lang.lexicon,
        lang.cascade,
        lang.stages,
        SimulationConfig::sequential(),
    ) {
        Ok(sim) => sim,
        Err(e) => panic!("sample run failed: {e}"),
    }
}

/// Forms of a lexicon as display strings, in etymon order.
pub fn rendered(lexicon: &Lexicon) -> Vec<String> {
    lexicon.forms().iter().map(ToString::to_string).collect()
}

/// Etymon ids from plain indices.
pub fn ids(indices: &[usize]) -> Vec<EtymonId> {
    indices.iter().copied().map(EtymonId).collect()
}

/// Final forms of the baseline sample cascade.
pub const BASELINE_FINALS: [&str; 10] = [
    "#biɾən#", "#molʔəd#", "#bur#", "#kin#", "#baza#", "#sempum#", "#lap#", "#nanga#", "...",
    "#dor#",
];
